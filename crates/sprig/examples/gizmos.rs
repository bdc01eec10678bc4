//! Gizmos — feed debug shapes to a renderer that just logs them.
//!
//! Run with `RUST_LOG=info cargo run --example gizmos`.

use sprig::prelude::*;

/// Stand-in for a real line renderer.
struct LogRenderer {
    lines: usize,
    circles: usize,
}

impl Gizmos for LogRenderer {
    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        self.lines += 1;
        log::info!("line {from} -> {to} {color:?}");
    }

    fn wire_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.circles += 1;
        log::info!("circle at {center} r={radius} {color:?}");
    }
}

/// A box outline around its owner.
#[derive(Default)]
struct Bounds {
    half_extent: Vec2,
}

impl Component for Bounds {
    fn draw_gizmos(&self, ctx: &GizmoContext<'_>, gizmos: &mut dyn Gizmos) {
        let Some(center) = ctx
            .world
            .owner(ctx.id)
            .and_then(|e| ctx.world.transform(e))
            .and_then(|t| ctx.world.world_position(t))
        else {
            return;
        };
        let h = self.half_extent;
        let corners = [
            center + Vec2::new(-h.x, -h.y),
            center + Vec2::new(h.x, -h.y),
            center + Vec2::new(h.x, h.y),
            center + Vec2::new(-h.x, h.y),
        ];
        let color = [0.0, 1.0, 0.0, 1.0]; // green
        for i in 0..4 {
            gizmos.line(corners[i], corners[(i + 1) % 4], color);
        }
    }
}

fn main() -> Result<(), WorldError> {
    env_logger::init();

    let mut world = World::new();
    let ship = world.create_entity("ship");
    let turret = world.create_entity("turret");
    let (ship_t, turret_t) = (
        world.transform(ship).ok_or(WorldError::EntityNotFound(ship))?,
        world.transform(turret).ok_or(WorldError::EntityNotFound(turret))?,
    );
    world.set_parent(turret_t, Some(ship_t))?;
    if let Some(t) = world.component_mut(ship_t) {
        t.local_position = Vec2::new(50.0, 50.0);
        t.local_rotation = 45.0;
    }
    if let Some(t) = world.component_mut(turret_t) {
        t.local_position = Vec2::new(10.0, 0.0);
    }
    world.insert_component(
        ship,
        Bounds {
            half_extent: Vec2::new(16.0, 8.0),
        },
    );

    let mut config = GizmoConfig::default();
    let mut renderer = LogRenderer { lines: 0, circles: 0 };
    let drawn = world.draw_gizmos(&config, &mut renderer);
    println!(
        "{drawn} components drew {} lines and {} circles",
        renderer.lines, renderer.circles
    );

    // Hiding the ship hides its turret too.
    world.set_self_active(ship, false);
    println!("with the ship hidden: {} components", world.draw_gizmos(&config, &mut renderer));

    config.enabled = false;
    world.set_self_active(ship, true);
    println!("with gizmos off: {} components", world.draw_gizmos(&config, &mut renderer));
    Ok(())
}
