//! # Gizmos — Debug Drawing Hook
//!
//! sprig doesn't render anything. Components describe their debug shapes
//! through [`Component::draw_gizmos`](crate::ecs::Component::draw_gizmos) and
//! a renderer implements [`Gizmos`] to receive them:
//!
//! ```text
//! renderer frame
//!   └─ world.draw_gizmos(&config, &mut renderer)
//!        └─ for each live entity active in the hierarchy
//!             └─ for each active, non-destroyed component
//!                  └─ component.draw_gizmos(ctx, renderer)
//! ```
//!
//! [`GizmoBuffer`] is a ready-made [`Gizmos`] that just records the shapes,
//! handy for tests or for batching into a line-list vertex buffer.

use crate::ecs::{ComponentId, World};
use crate::math::Vec2;

/// Sink for debug shapes, implemented by the renderer.
pub trait Gizmos {
    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]);
    fn wire_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
}

/// Toggle and style for debug drawing. Flip `enabled` at runtime (e.g. with F1).
#[derive(Debug, Clone)]
pub struct GizmoConfig {
    pub enabled: bool,
    pub color: [f32; 4],
    /// Radius of the circle drawn at every transform.
    pub transform_radius: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: [0.0, 0.0, 1.0, 1.0], // blue
            transform_radius: 5.0,
        }
    }
}

/// What a component's gizmo hook gets to look at.
pub struct GizmoContext<'w> {
    pub world: &'w World,
    /// The component being drawn.
    pub id: ComponentId,
    pub config: &'w GizmoConfig,
}

// ── Recording sink ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoLine {
    pub from: Vec2,
    pub to: Vec2,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoCircle {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
}

/// A [`Gizmos`] sink that keeps every shape until [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct GizmoBuffer {
    pub lines: Vec<GizmoLine>,
    pub circles: Vec<GizmoCircle>,
}

impl GizmoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.circles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.circles.is_empty()
    }
}

impl Gizmos for GizmoBuffer {
    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        self.lines.push(GizmoLine { from, to, color });
    }

    fn wire_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.circles.push(GizmoCircle {
            center,
            radius,
            color,
        });
    }
}

impl World {
    /// Run every eligible component's gizmo hook against `gizmos`.
    ///
    /// Returns the number of components visited. Does nothing when
    /// `config.enabled` is `false`.
    pub fn draw_gizmos(&self, config: &GizmoConfig, gizmos: &mut dyn Gizmos) -> usize {
        if !config.enabled {
            return 0;
        }
        let mut visited = 0;
        for entity in self.entities() {
            if !self.is_active_in_hierarchy(entity) {
                continue;
            }
            for &id in self.components(entity) {
                if !self.is_component_active(id) || self.is_component_destroyed(id) {
                    continue;
                }
                let Some(component) = self.component_dyn(id) else {
                    continue;
                };
                let ctx = GizmoContext {
                    world: self,
                    id,
                    config,
                };
                component.draw_gizmos(&ctx, gizmos);
                visited += 1;
            }
        }
        visited
    }
}
