//! Orbit — a sun, a planet and a moon spun by a system.
//!
//! Run with `RUST_LOG=debug cargo run --example orbit` to see provisioning.

use sprig::prelude::*;

/// Degrees added to `local_rotation` each frame.
#[derive(Default)]
struct Spin(f32);
impl Component for Spin {}

#[derive(Default)]
struct SpinSystem {
    sets: ComponentSets,
}

impl System for SpinSystem {
    fn essential_types(&self) -> Vec<ComponentType> {
        vec![ComponentType::of::<Transform>(), ComponentType::of::<Spin>()]
    }

    fn sets(&self) -> &ComponentSets {
        &self.sets
    }

    fn sets_mut(&mut self) -> &mut ComponentSets {
        &mut self.sets
    }

    fn update(&mut self, world: &mut World) {
        for set in self.sets.iter() {
            let (Some(t), Some(spin)) = (world.typed::<Transform>(set[0]), world.typed::<Spin>(set[1]))
            else {
                continue;
            };
            if world.is_component_destroyed(t) || !world.is_component_active(spin) {
                continue;
            }
            let speed = world.component(spin).map_or(0.0, |s| s.0);
            if let Some(t) = world.component_mut(t) {
                t.local_rotation += speed;
            }
        }
    }
}

fn spawn(
    world: &mut World,
    name: &str,
    position: Vec2,
    parent: Option<Entity>,
) -> Result<(Entity, Handle<Transform>), WorldError> {
    let entity = world.create_entity(name);
    let transform = world
        .transform(entity)
        .ok_or(WorldError::EntityNotFound(entity))?;
    if let Some(t) = world.component_mut(transform) {
        t.local_position = position;
    }
    if let Some(parent) = parent.and_then(|p| world.transform(p)) {
        world.set_parent(transform, Some(parent))?;
    }
    Ok((entity, transform))
}

fn main() -> Result<(), WorldError> {
    env_logger::init();

    let mut world = World::new();
    world.register_component::<Spin>();

    let (sun, _) = spawn(&mut world, "sun", Vec2::ZERO, None)?;
    let (planet, _) = spawn(&mut world, "planet", Vec2::new(100.0, 0.0), Some(sun))?;
    let (_, moon) = spawn(&mut world, "moon", Vec2::new(20.0, 0.0), Some(planet))?;

    let mut schedule = Schedule::new();
    schedule.add_system(SpinSystem::default());
    for entity in [sun, planet] {
        schedule.register_entity(&mut world, entity)?;
    }

    // The registration added a default `Spin(0.0)`; give them real speeds.
    for (entity, speed) in [(sun, 3.0), (planet, 12.0)] {
        if let Some(spin) = world.get_component::<Spin>(entity) {
            if let Some(spin) = world.component_mut(spin) {
                spin.0 = speed;
            }
        }
    }

    for frame in 0..10 {
        schedule.run(&mut world);
        let position = world.world_position(moon).unwrap_or_default();
        let rotation = world.world_rotation(moon).unwrap_or_default();
        println!("frame {frame:2}: moon at ({:7.2}, {:7.2}), facing {rotation:6.1}°", position.x, position.y);
    }

    world.destroy_entity(sun);
    println!("after destroying the sun: {} entities left", world.entity_count());
    schedule.clean_up_all_sets();
    world.clean_up_all_entities();
    Ok(())
}
