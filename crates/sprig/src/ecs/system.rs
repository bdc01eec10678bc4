//! # System — Per-Frame Logic Over Component Sets
//!
//! A system declares the component types it needs (its **essential types**)
//! and keeps one [`ComponentSets`] row per entity it has registered. Each row
//! holds one [`ComponentId`] per essential type, in the declared order.
//!
//! ## Registration
//!
//! [`System::try_register_entity`] fills in whatever the entity is missing:
//!
//! ```text
//! essential: [Transform, Velocity, dyn Collider]
//! entity:    [Transform]
//!
//!   Transform     present              → reuse
//!   Velocity      missing, concrete    → add_component_dyn
//!   dyn Collider  missing, capability  → MissingAbstract(dyn Collider)
//! ```
//!
//! Types are provisioned in order, so `[CircleCollider, dyn Collider]` works:
//! the collider added for the first slot also fills the second. A
//! registration that ends in `MissingAbstract` or an error removes whatever
//! it added, leaving the entity with the components it started with.
//!
//! ## Schedule
//!
//! A [`Schedule`] is an ordered `Vec` of boxed systems. `run()` calls each
//! system's `update` once, in insertion order. Ordering between systems is
//! the caller's problem, same as the order of entries in a hand-written game
//! loop.

use super::component::{ComponentId, ComponentType};
use super::entity::Entity;
use super::error::WorldError;
use super::world::World;

/// Result of a registration attempt that didn't hit a construction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The entity now has every essential type; its set is at `index`.
    Registered { index: usize },
    /// The entity lacks this capability and capabilities can't be built.
    MissingAbstract(ComponentType),
}

impl RegisterOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegisterOutcome::Registered { .. })
    }

    /// The capability that blocked registration, if any.
    pub fn missing_type(&self) -> Option<ComponentType> {
        match self {
            RegisterOutcome::MissingAbstract(ty) => Some(*ty),
            RegisterOutcome::Registered { .. } => None,
        }
    }
}

/// The component rows a system has registered, in registration order.
#[derive(Debug, Default)]
pub struct ComponentSets {
    sets: Vec<Vec<ComponentId>>,
}

impl ComponentSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[ComponentId]> {
        self.sets.iter().map(Vec::as_slice)
    }

    pub fn get(&self, index: usize) -> Option<&[ComponentId]> {
        self.sets.get(index).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub(crate) fn push(&mut self, set: Vec<ComponentId>) -> usize {
        self.sets.push(set);
        self.sets.len() - 1
    }
}

/// Per-frame logic that runs over the entities registered with it.
///
/// Implementors store a [`ComponentSets`] and expose it through
/// [`sets`](Self::sets) / [`sets_mut`](Self::sets_mut); registration and
/// teardown are provided.
pub trait System {
    /// Component types (or capabilities) every registered entity must carry,
    /// in the order they appear in each set.
    fn essential_types(&self) -> Vec<ComponentType>;

    fn sets(&self) -> &ComponentSets;

    fn sets_mut(&mut self) -> &mut ComponentSets;

    /// Called once per frame. Iterate [`sets`](Self::sets) here.
    fn update(&mut self, world: &mut World) {
        let _ = world;
    }

    /// Register `entity`, adding any missing concrete essential types.
    ///
    /// Essential types are resolved in order. A component counts as present
    /// if the first one matching the type is not destroyed, so a type added
    /// earlier in the walk (or by its attach hook) can satisfy a later
    /// capability. Returns `Ok(MissingAbstract)` when a missing type is a
    /// capability, and `Err` when a missing concrete type can't be built or
    /// the entity is dead. In both cases every component added during the
    /// call is removed again.
    fn try_register_entity(
        &mut self,
        world: &mut World,
        entity: Entity,
    ) -> Result<RegisterOutcome, WorldError> {
        if !world.is_alive(entity) {
            return Err(WorldError::EntityNotFound(entity));
        }
        let essential = self.essential_types();
        let baseline = world.components(entity).len();

        let mut set = Vec::with_capacity(essential.len());
        for &ty in &essential {
            let id = match live_component(world, entity, ty) {
                Some(id) => id,
                None if ty.is_capability() => {
                    world.detach_components_from(entity, baseline);
                    log::warn!(
                        "entity {entity} can't join {}: no component provides `{ty}`",
                        short_system_name(std::any::type_name::<Self>())
                    );
                    return Ok(RegisterOutcome::MissingAbstract(ty));
                }
                None => {
                    log::debug!("provisioning `{ty}` on entity {entity}");
                    match world.add_component_dyn(entity, ty) {
                        Ok(id) => id,
                        Err(err) => {
                            world.detach_components_from(entity, baseline);
                            return Err(err);
                        }
                    }
                }
            };
            set.push(id);
        }
        let index = self.sets_mut().push(set);
        Ok(RegisterOutcome::Registered { index })
    }

    /// Forget every registered set. Components stay attached.
    fn clean_up_all_sets(&mut self) {
        self.sets_mut().clear();
    }
}

fn live_component(world: &World, entity: Entity, ty: ComponentType) -> Option<ComponentId> {
    world
        .get_component_dyn(entity, ty)
        .filter(|&id| !world.is_component_destroyed(id))
}

// ── Schedule ──────────────────────────────────────────────────────────

struct NamedSystem {
    #[cfg(any(feature = "diagnostics", test))]
    name: String,
    system: Box<dyn System>,
}

/// Time spent in one system's `update` during the last [`Schedule::run`].
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of systems.
pub struct Schedule {
    systems: Vec<NamedSystem>,
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// Add a system to the end of the schedule.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(NamedSystem {
            #[cfg(any(feature = "diagnostics", test))]
            name: short_system_name(std::any::type_name::<S>()).to_string(),
            system: Box::new(system),
        });
    }

    /// Call every system's `update` in order.
    pub fn run(&mut self, world: &mut World) {
        #[cfg(feature = "diagnostics")]
        {
            self.timings.clear();
            for ns in &mut self.systems {
                let start = std::time::Instant::now();
                ns.system.update(world);
                self.timings.push(SystemTiming {
                    name: ns.name.clone(),
                    duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
                });
            }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            for ns in &mut self.systems {
                ns.system.update(world);
            }
        }
    }

    /// Clear every system's registered sets, e.g. right before
    /// [`World::clean_up_all_entities`].
    pub fn clean_up_all_sets(&mut self) {
        for ns in &mut self.systems {
            ns.system.clean_up_all_sets();
        }
    }

    /// Register `entity` with every system, in order. Stops at the first
    /// construction error.
    pub fn register_entity(
        &mut self,
        world: &mut World,
        entity: Entity,
    ) -> Result<Vec<RegisterOutcome>, WorldError> {
        self.systems
            .iter_mut()
            .map(|ns| ns.system.try_register_entity(world, entity))
            .collect()
    }

    /// Per-system timings from the most recent `run()`.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path from a type name (`my_game::MoveSystem` →
/// `MoveSystem`).
fn short_system_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, Handle, Transform};

    trait Collider {}

    #[derive(Debug, Default, PartialEq)]
    struct Velocity(f32);
    impl Component for Velocity {}

    #[derive(Default)]
    struct Spin;
    impl Component for Spin {}

    #[derive(Default)]
    struct CircleCollider;
    impl Component for CircleCollider {
        fn capabilities() -> Vec<ComponentType> {
            vec![ComponentType::capability::<dyn Collider>()]
        }
    }

    struct Tag;
    impl Component for Tag {}

    /// Brings its own collider and velocity along when attached.
    #[derive(Default)]
    struct Rig;
    impl Component for Rig {
        fn on_attach(world: &mut World, handle: Handle<Self>) {
            if let Some(owner) = world.owner(handle) {
                world.insert_component(owner, Velocity(1.0));
                world.insert_component(owner, CircleCollider);
            }
        }
    }

    /// Brings a velocity along but no collider.
    #[derive(Default)]
    struct Ballast;
    impl Component for Ballast {
        fn on_attach(world: &mut World, handle: Handle<Self>) {
            if let Some(owner) = world.owner(handle) {
                world.insert_component(owner, Velocity(0.0));
            }
        }
    }

    /// Essential types chosen per test.
    struct Needs {
        types: Vec<ComponentType>,
        sets: ComponentSets,
    }

    impl Needs {
        fn new(types: Vec<ComponentType>) -> Self {
            Self {
                types,
                sets: ComponentSets::new(),
            }
        }
    }

    impl System for Needs {
        fn essential_types(&self) -> Vec<ComponentType> {
            self.types.clone()
        }

        fn sets(&self) -> &ComponentSets {
            &self.sets
        }

        fn sets_mut(&mut self) -> &mut ComponentSets {
            &mut self.sets
        }
    }

    #[derive(Default)]
    struct MoveSystem {
        sets: ComponentSets,
    }

    impl System for MoveSystem {
        fn essential_types(&self) -> Vec<ComponentType> {
            vec![ComponentType::of::<Transform>(), ComponentType::of::<Velocity>()]
        }

        fn sets(&self) -> &ComponentSets {
            &self.sets
        }

        fn sets_mut(&mut self) -> &mut ComponentSets {
            &mut self.sets
        }

        fn update(&mut self, world: &mut World) {
            for set in self.sets.iter() {
                let (Some(t), Some(v)) = (world.typed::<Transform>(set[0]), world.typed::<Velocity>(set[1]))
                else {
                    continue;
                };
                let speed = world.component(v).map_or(0.0, |v| v.0);
                if let Some(t) = world.component_mut(t) {
                    t.local_position.x += speed;
                }
            }
        }
    }

    /// Needs a concrete type first and a capability last.
    #[derive(Default)]
    struct CollisionSystem {
        sets: ComponentSets,
    }

    impl System for CollisionSystem {
        fn essential_types(&self) -> Vec<ComponentType> {
            vec![
                ComponentType::of::<Spin>(),
                ComponentType::capability::<dyn Collider>(),
            ]
        }

        fn sets(&self) -> &ComponentSets {
            &self.sets
        }

        fn sets_mut(&mut self) -> &mut ComponentSets {
            &mut self.sets
        }
    }

    /// Needs a type that was only ever inserted by value.
    #[derive(Default)]
    struct TagSystem {
        sets: ComponentSets,
    }

    impl System for TagSystem {
        fn essential_types(&self) -> Vec<ComponentType> {
            vec![ComponentType::of::<Tag>()]
        }

        fn sets(&self) -> &ComponentSets {
            &self.sets
        }

        fn sets_mut(&mut self) -> &mut ComponentSets {
            &mut self.sets
        }
    }

    #[test]
    fn registration_provisions_missing_components_in_order() {
        let mut world = World::new();
        world.register_component::<Velocity>();
        let e = world.create_entity("e");
        let mut system = MoveSystem::default();

        let outcome = system.try_register_entity(&mut world, e).unwrap();
        assert_eq!(outcome, RegisterOutcome::Registered { index: 0 });

        let set = system.sets().get(0).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0], world.transform(e).unwrap().id());
        assert_eq!(Some(set[1]), world.get_component::<Velocity>(e).map(|h| h.id()));
    }

    #[test]
    fn registration_reuses_live_components() {
        let mut world = World::new();
        let e = world.create_entity("e");
        let v = world.insert_component(e, Velocity(2.0));
        let mut system = MoveSystem::default();
        system.try_register_entity(&mut world, e).unwrap();
        assert_eq!(system.sets().get(0).unwrap()[1], v.id());
        assert_eq!(world.components(e).len(), 2);
    }

    #[test]
    fn destroyed_component_is_replaced() {
        let mut world = World::new();
        let e = world.create_entity("e");
        let old = world.add_component::<Velocity>(e);
        world.destroy_component(old);

        let mut system = MoveSystem::default();
        system.try_register_entity(&mut world, e).unwrap();
        let fresh = system.sets().get(0).unwrap()[1];
        assert_ne!(fresh, old.id());
        assert!(!world.is_component_destroyed(fresh));
    }

    #[test]
    fn capability_is_satisfied_by_implementer() {
        let mut world = World::new();
        let e = world.create_entity("e");
        let collider = world.add_component::<CircleCollider>(e);
        let mut system = CollisionSystem::default();
        let outcome = system.try_register_entity(&mut world, e).unwrap();
        assert!(outcome.is_registered());
        assert_eq!(system.sets().get(0).unwrap()[1], collider.id());
    }

    #[test]
    fn missing_capability_fails_without_side_effects() {
        let mut world = World::new();
        world.register_component::<Spin>();
        let e = world.create_entity("e");
        let mut system = CollisionSystem::default();

        let outcome = system.try_register_entity(&mut world, e).unwrap();
        assert_eq!(
            outcome.missing_type(),
            Some(ComponentType::capability::<dyn Collider>())
        );
        assert!(system.sets().is_empty());
        // Spin comes first and was added, then taken off again.
        assert!(world.get_component::<Spin>(e).is_none());
        assert_eq!(world.components(e).len(), 1);
    }

    #[test]
    fn provisioned_component_fills_a_later_capability() {
        let mut world = World::new();
        world.register_component::<CircleCollider>();
        let e = world.create_entity("e");
        let mut system = Needs::new(vec![
            ComponentType::of::<CircleCollider>(),
            ComponentType::capability::<dyn Collider>(),
        ]);

        let outcome = system.try_register_entity(&mut world, e).unwrap();
        assert_eq!(outcome, RegisterOutcome::Registered { index: 0 });

        let collider = world.get_component::<CircleCollider>(e).unwrap();
        assert_eq!(system.sets().get(0).unwrap(), &[collider.id(), collider.id()]);
        assert_eq!(world.components(e).len(), 2);
    }

    #[test]
    fn attach_hook_sibling_fills_a_later_capability() {
        let mut world = World::new();
        world.register_component::<Rig>();
        let e = world.create_entity("e");
        let mut system = Needs::new(vec![
            ComponentType::of::<Rig>(),
            ComponentType::capability::<dyn Collider>(),
        ]);

        assert!(system.try_register_entity(&mut world, e).unwrap().is_registered());
        let rig = world.get_component::<Rig>(e).unwrap();
        let collider = world.get_component::<CircleCollider>(e).unwrap();
        assert_eq!(system.sets().get(0).unwrap(), &[rig.id(), collider.id()]);
    }

    #[test]
    fn missing_capability_removes_hook_added_components() {
        let mut world = World::new();
        world.register_component::<Ballast>();
        world.register_component::<Spin>();
        let e = world.create_entity("e");
        let mut system = Needs::new(vec![
            ComponentType::of::<Ballast>(),
            ComponentType::of::<Spin>(),
            ComponentType::capability::<dyn Collider>(),
        ]);

        let outcome = system.try_register_entity(&mut world, e).unwrap();
        assert_eq!(
            outcome.missing_type(),
            Some(ComponentType::capability::<dyn Collider>())
        );
        assert_eq!(world.components(e), &[world.transform(e).unwrap().id()]);
        assert!(world.get_component::<Velocity>(e).is_none());
        assert!(system.sets().is_empty());
    }

    #[test]
    fn construction_error_removes_earlier_provisions() {
        let mut world = World::new();
        world.register_component::<Spin>();
        let e = world.create_entity("e");
        let velocity = world.insert_component(e, Velocity(3.0));
        let mut system = Needs::new(vec![
            ComponentType::of::<Velocity>(),
            ComponentType::of::<Spin>(),
            ComponentType::of::<Tag>(),
        ]);

        assert_eq!(
            system.try_register_entity(&mut world, e),
            Err(WorldError::UnregisteredComponent(ComponentType::of::<Tag>()))
        );
        // The velocity predates the call and stays.
        assert_eq!(world.components(e).len(), 2);
        assert_eq!(world.component(velocity), Some(&Velocity(3.0)));
        assert!(world.get_component::<Spin>(e).is_none());
        assert_eq!(world.component_count(), 2);
    }

    #[test]
    fn unconstructible_type_is_an_error() {
        let mut world = World::new();
        let e = world.create_entity("e");
        let mut system = TagSystem::default();
        assert_eq!(
            system.try_register_entity(&mut world, e),
            Err(WorldError::UnregisteredComponent(ComponentType::of::<Tag>()))
        );

        let other = world.create_entity("other");
        world.insert_component(other, Tag);
        assert_eq!(
            system.try_register_entity(&mut world, e),
            Err(WorldError::NoDefaultConstructor(ComponentType::of::<Tag>()))
        );
        assert!(system
            .try_register_entity(&mut world, other)
            .unwrap()
            .is_registered());
    }

    #[test]
    fn dead_entity_is_an_error() {
        let mut world = World::new();
        let e = world.create_entity("e");
        world.destroy_entity(e);
        let mut system = MoveSystem::default();
        assert_eq!(
            system.try_register_entity(&mut world, e),
            Err(WorldError::EntityNotFound(e))
        );
    }

    #[test]
    fn clean_up_all_sets_keeps_components() {
        let mut world = World::new();
        world.register_component::<Velocity>();
        let e = world.create_entity("e");
        let mut system = MoveSystem::default();
        system.try_register_entity(&mut world, e).unwrap();
        system.clean_up_all_sets();
        assert!(system.sets().is_empty());
        assert!(world.get_component::<Velocity>(e).is_some());
    }

    #[test]
    fn schedule_runs_updates_in_order() {
        let mut world = World::new();
        world.register_component::<Velocity>();
        world.register_component::<Spin>();
        let e = world.create_entity("e");
        let v = world.add_component::<Velocity>(e);
        world.component_mut(v).unwrap().0 = 1.5;

        let mut schedule = Schedule::new();
        schedule.add_system(MoveSystem::default());
        schedule.add_system(CollisionSystem::default());
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.systems[0].name, "MoveSystem");

        let outcomes = schedule.register_entity(&mut world, e).unwrap();
        assert!(outcomes[0].is_registered());
        assert!(!outcomes[1].is_registered());

        schedule.run(&mut world);
        schedule.run(&mut world);
        let t = world.transform(e).unwrap();
        assert_eq!(world.component(t).unwrap().local_position.x, 3.0);

        schedule.clean_up_all_sets();
        schedule.run(&mut world);
        assert_eq!(world.component(t).unwrap().local_position.x, 3.0);
    }
}
