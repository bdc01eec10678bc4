//! # Transform — Placement and the Scene Tree
//!
//! Every entity gets a [`Transform`] as its first component. It stores a
//! local position and a local rotation (degrees, counter-clockwise) relative to
//! an optional parent transform.
//!
//! ## Lazy World Space
//!
//! Nothing is cached. World-space values are recomputed by walking up the
//! parent chain on every query:
//!
//! ```text
//! world_rotation(t) = local_rotation + world_rotation(parent)
//! world_position(t) = rotate(local_position, world_rotation(parent)) + world_position(parent)
//! ```
//!
//! Only **live** parents count. A parent whose component was destroyed (or
//! whose entity is gone) is treated as absent: the child behaves like a root,
//! but its stored `parent` is left alone.
//!
//! ## Links
//!
//! `parent` and `children` mirror each other. [`World::set_parent`] is the
//! only way to change either side, which keeps them consistent. It also refuses
//! to make a transform its own ancestor, or an entity its own ancestor through
//! a second transform, so the recursive walks always end.
//!
//! ## Comparison
//!
//! - **bevy**: `Parent`/`Children` components plus a `GlobalTransform` that a
//!   propagation system writes each frame. We skip the cached global and
//!   compute on demand, which is fine for shallow 2D scenes.

use super::component::{Component, Handle};
use super::entity::Entity;
use super::error::WorldError;
use super::world::World;
use crate::gizmos::{GizmoContext, Gizmos};
use crate::math::{Vec2, rotate, signed_angle};

/// Local placement of an entity and its position in the scene tree.
#[derive(Debug, Default)]
pub struct Transform {
    pub local_position: Vec2,
    /// Degrees, counter-clockwise. Not normalized.
    pub local_rotation: f32,
    pub(crate) parent: Option<Handle<Transform>>,
    pub(crate) children: Vec<Handle<Transform>>,
}

impl Transform {
    /// A root transform at `(x, y)`.
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            local_position: Vec2::new(x, y),
            ..Default::default()
        }
    }

    /// Return a copy rotated by `degrees`.
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.local_rotation = degrees;
        self
    }

    /// The stored parent, which may have been destroyed since it was set.
    pub fn parent(&self) -> Option<Handle<Transform>> {
        self.parent
    }

    /// Transforms that currently name this one as their parent.
    pub fn children(&self) -> &[Handle<Transform>] {
        &self.children
    }
}

impl Component for Transform {
    fn draw_gizmos(&self, ctx: &GizmoContext<'_>, gizmos: &mut dyn Gizmos) {
        let Some(handle) = ctx.world.typed::<Transform>(ctx.id) else {
            return;
        };
        let (Some(position), Some(right), Some(up)) = (
            ctx.world.world_position(handle),
            ctx.world.right(handle),
            ctx.world.up(handle),
        ) else {
            return;
        };
        let radius = ctx.config.transform_radius;
        let color = ctx.config.color;
        gizmos.wire_circle(position, radius, color);
        gizmos.line(position - right * radius, position + right * radius, color);
        gizmos.line(position - up * radius, position + up * radius, color);
    }
}

// ── Hierarchy ─────────────────────────────────────────────────────────

impl World {
    /// The parent if it is set and not destroyed.
    pub fn live_parent(&self, transform: Handle<Transform>) -> Option<Handle<Transform>> {
        let parent = self.component(transform)?.parent?;
        (!self.is_component_destroyed(parent)).then_some(parent)
    }

    /// The entity owning the live parent of `entity`'s first transform.
    pub fn parent_entity(&self, entity: Entity) -> Option<Entity> {
        let parent = self.live_parent(self.transform(entity)?)?;
        self.owner(parent)
    }

    /// The stored parent, live or not.
    pub fn parent_of(&self, transform: Handle<Transform>) -> Option<Handle<Transform>> {
        self.component(transform)?.parent
    }

    /// Children that are still alive, in the order they were parented.
    pub fn children_of(&self, transform: Handle<Transform>) -> Vec<Handle<Transform>> {
        self.component(transform)
            .map(|t| {
                t.children
                    .iter()
                    .copied()
                    .filter(|&c| !self.is_component_destroyed(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reparent `child` under `parent`, or detach it with `None`.
    ///
    /// The child leaves its old parent's children (if that parent is live) and
    /// joins the new parent's children (if the new parent is live). A
    /// destroyed parent is stored but ignored by every world-space query.
    ///
    /// Fails with [`WorldError::HierarchyCycle`] if `parent` is `child` or one
    /// of its live descendants, or if `child` is its entity's first transform
    /// and `parent` belongs to that entity or one of its descendant entities.
    /// Nothing changes in that case.
    pub fn set_parent(
        &mut self,
        child: Handle<Transform>,
        parent: Option<Handle<Transform>>,
    ) -> Result<(), WorldError> {
        if self.component(child).is_none() {
            return Err(WorldError::StaleComponent(child.id()));
        }

        if let Some(parent) = parent {
            let mut ancestor = Some(parent);
            while let Some(current) = ancestor {
                if current == child {
                    log::warn!("rejected reparent of {child:?} under its descendant {parent:?}");
                    return Err(WorldError::HierarchyCycle {
                        child: child.id(),
                        parent: parent.id(),
                    });
                }
                ancestor = self.live_parent(current);
            }
        }

        // An entity's parent comes from its first transform alone, so a
        // second transform could still close a loop between entities.
        let child_owner = self
            .owner(child)
            .filter(|&owner| self.transform(owner) == Some(child));
        if let (Some(child_owner), Some(parent)) =
            (child_owner, parent.filter(|&p| !self.is_component_destroyed(p)))
        {
            let mut ancestor = self.owner(parent);
            while let Some(current) = ancestor {
                if current == child_owner {
                    log::warn!("rejected reparent of {child_owner} under its own subtree via {parent:?}");
                    return Err(WorldError::HierarchyCycle {
                        child: child.id(),
                        parent: parent.id(),
                    });
                }
                ancestor = self.parent_entity(current);
            }
        }

        if let Some(old) = self.live_parent(child) {
            if let Some(old) = self.component_mut(old) {
                old.children.retain(|&c| c != child);
            }
        }

        if let Some(transform) = self.component_mut(child) {
            transform.parent = parent;
        }

        if let Some(parent) = parent.filter(|&p| !self.is_component_destroyed(p)) {
            if let Some(parent) = self.component_mut(parent) {
                parent.children.push(child);
            }
        }
        Ok(())
    }

    /// Rotation in degrees relative to the scene root.
    pub fn world_rotation(&self, transform: Handle<Transform>) -> Option<f32> {
        let local = self.component(transform)?.local_rotation;
        Some(match self.live_parent(transform) {
            Some(parent) => local + self.world_rotation(parent)?,
            None => local,
        })
    }

    /// Position relative to the scene root.
    pub fn world_position(&self, transform: Handle<Transform>) -> Option<Vec2> {
        let local = self.component(transform)?.local_position;
        Some(match self.live_parent(transform) {
            Some(parent) => {
                rotate(local, self.world_rotation(parent)?) + self.world_position(parent)?
            }
            None => local,
        })
    }

    /// World-space unit X axis of the transform.
    pub fn right(&self, transform: Handle<Transform>) -> Option<Vec2> {
        Some(rotate(Vec2::X, self.world_rotation(transform)?))
    }

    /// World-space unit Y axis of the transform.
    pub fn up(&self, transform: Handle<Transform>) -> Option<Vec2> {
        Some(rotate(Vec2::Y, self.world_rotation(transform)?))
    }

    /// Rotate the transform so its world-space right axis points along
    /// `direction`. Writes `local_rotation`.
    pub fn set_right(
        &mut self,
        transform: Handle<Transform>,
        direction: Vec2,
    ) -> Result<(), WorldError> {
        let reference = match self.live_parent(transform) {
            Some(parent) => self.right(parent),
            None => Some(Vec2::X),
        };
        self.point_axis(transform, reference, direction)
    }

    /// Rotate the transform so its world-space up axis points along
    /// `direction`. Writes `local_rotation`.
    pub fn set_up(&mut self, transform: Handle<Transform>, direction: Vec2) -> Result<(), WorldError> {
        let reference = match self.live_parent(transform) {
            Some(parent) => self.up(parent),
            None => Some(Vec2::Y),
        };
        self.point_axis(transform, reference, direction)
    }

    fn point_axis(
        &mut self,
        transform: Handle<Transform>,
        reference: Option<Vec2>,
        direction: Vec2,
    ) -> Result<(), WorldError> {
        let stale = WorldError::StaleComponent(transform.id());
        let reference = reference.ok_or(stale.clone())?;
        let local = self.component_mut(transform).ok_or(stale)?;
        local.local_rotation = signed_angle(reference, direction);
        Ok(())
    }
}
