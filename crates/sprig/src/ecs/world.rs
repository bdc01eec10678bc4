//! # World — The Entity Registry
//!
//! The [`World`] owns every entity and every component. It is the only place
//! entities are created (so it controls id assignment) and the only place they
//! are destroyed (so a cascading destroy and the removal from the registry
//! always happen together).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ World                                                    │
//! │                                                          │
//! │  ids: EntityIdAllocator      next id + reset epoch        │
//! │                                                          │
//! │  entities: BTreeMap<u32, EntityRecord>                   │
//! │    name, self_active, destroyed,                         │
//! │    components: Vec<ComponentId>  (attachment order)      │
//! │                                                          │
//! │  components: ComponentStorage  generational arena        │
//! │    owner, active, destroyed, Box<dyn Component>          │
//! │                                                          │
//! │  registry: ComponentRegistry   TypeId → constructor      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no global world. Create as many as you like; tests each get their
//! own.
//!
//! ## Destroy Order
//!
//! [`World::destroy_entity`] walks the transform tree depth-first:
//!
//! 1. mark the entity destroyed
//! 2. destroy every child entity (recursively)
//! 3. mark the entity's components destroyed
//! 4. remove the entity from the registry and free its component slots
//!
//! After step 4 every `Entity` and `ComponentId` pointing into the subtree is
//! stale: lookups return `None` and `is_*_destroyed` queries return `true`.

use std::collections::BTreeMap;

use super::component::{
    Component, ComponentEntry, ComponentId, ComponentStorage, ComponentType, Handle,
};
use super::entity::{Entity, EntityIdAllocator};
use super::error::WorldError;
use super::registry::ComponentRegistry;
use super::transform::Transform;

/// Name given to entities created without one.
pub const DEFAULT_ENTITY_NAME: &str = "New Entity";

/// Per-entity bookkeeping.
struct EntityRecord {
    name: String,
    self_active: bool,
    destroyed: bool,
    /// Attachment order. The first entry is always the entity's transform.
    components: Vec<ComponentId>,
    transform: Option<Handle<Transform>>,
}

/// The container for a scene: entities, their components, and the type
/// registry used to construct components on demand.
pub struct World {
    pub(crate) ids: EntityIdAllocator,
    entities: BTreeMap<u32, EntityRecord>,
    pub(crate) components: ComponentStorage,
    registry: ComponentRegistry,
    /// Entities created since the last stats snapshot (diagnostics only).
    #[cfg(feature = "diagnostics")]
    pub(crate) created_this_frame: u32,
    /// Entities destroyed since the last stats snapshot (diagnostics only).
    #[cfg(feature = "diagnostics")]
    pub(crate) destroyed_this_frame: u32,
}

impl World {
    pub fn new() -> Self {
        Self {
            ids: EntityIdAllocator::new(),
            entities: BTreeMap::new(),
            components: ComponentStorage::new(),
            registry: ComponentRegistry::new(),
            #[cfg(feature = "diagnostics")]
            created_this_frame: 0,
            #[cfg(feature = "diagnostics")]
            destroyed_this_frame: 0,
        }
    }

    // ── Entity Lifecycle ──────────────────────────────────────────────

    /// Create an entity with the next id. A [`Transform`] is attached
    /// immediately as its first component.
    pub fn create_entity(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.ids.allocate();
        self.entities.insert(
            entity.id,
            EntityRecord {
                name: name.into(),
                self_active: true,
                destroyed: false,
                components: Vec::new(),
                transform: None,
            },
        );
        let transform = self.add_component::<Transform>(entity);
        if let Some(record) = self.entities.get_mut(&entity.id) {
            record.transform = Some(transform);
        }
        #[cfg(feature = "diagnostics")]
        {
            self.created_this_frame += 1;
        }
        log::trace!("created entity {entity} ({:?})", self.name(entity));
        entity
    }

    /// Create an entity named [`DEFAULT_ENTITY_NAME`].
    pub fn create_entity_default(&mut self) -> Entity {
        self.create_entity(DEFAULT_ENTITY_NAME)
    }

    /// Destroy an entity and every descendant in its transform tree.
    ///
    /// The destroyed root is also removed from its parent's children.
    /// Returns `false` if the entity was already destroyed or stale.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        if let Some(transform) = self.transform(entity) {
            if let Some(parent) = self.live_parent(transform) {
                if let Some(parent) = self.component_mut(parent) {
                    parent.children.retain(|&c| c != transform);
                }
            }
        }

        self.destroy_recursive(entity);
        true
    }

    fn destroy_recursive(&mut self, entity: Entity) {
        let Some(record) = self.entities.get_mut(&entity.id) else {
            return;
        };
        if record.destroyed {
            return;
        }
        record.destroyed = true;
        let record = &*record;

        // Descendants go first, through the first transform unless it was
        // destroyed on its own.
        let children = record
            .transform
            .and_then(|t| self.components.get(t.id()))
            .filter(|e| !e.destroyed)
            .and_then(|e| e.downcast_ref::<Transform>())
            .map(|t| t.children.clone())
            .unwrap_or_default();
        for child in children {
            if let Some(owner) = self.owner(child) {
                self.destroy_recursive(owner);
            }
        }

        if let Some(record) = self.entities.get(&entity.id) {
            for &id in &record.components {
                if let Some(entry) = self.components.get_mut(id) {
                    entry.destroyed = true;
                }
            }
        }

        if let Some(record) = self.entities.remove(&entity.id) {
            for id in record.components {
                self.components.free(id);
            }
        }
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += 1;
        }
        log::debug!("destroyed entity {entity}");
    }

    /// Tear the whole world down: destroy every entity and component and
    /// restart ids at `0`. Every handle issued before the call goes stale.
    pub fn clean_up_all_entities(&mut self) {
        let count = self.entities.len();
        for record in self.entities.values_mut() {
            record.destroyed = true;
            for &id in &record.components {
                if let Some(entry) = self.components.get_mut(id) {
                    entry.destroyed = true;
                }
            }
        }
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += count as u32;
        }
        self.entities = BTreeMap::new();
        self.components.free_all();
        self.ids.reset();
        log::debug!(
            "cleaned up {count} entities, world epoch is now {}",
            self.ids.epoch()
        );
    }

    // ── Entity Lookup ─────────────────────────────────────────────────

    /// Look up a live entity by id. `None` is a normal outcome.
    pub fn get_entity(&self, id: u32) -> Option<Entity> {
        let entity = self.ids.handle(id);
        self.is_alive(entity).then_some(entity)
    }

    /// `true` while the entity hasn't been destroyed and the world hasn't been
    /// reset since it was created.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.record(entity).is_some()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of components across all live entities, destroyed-flagged ones
    /// included.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Live entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys().map(|&id| self.ids.handle(id))
    }

    /// The name given at creation.
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.record(entity).map(|r| r.name.as_str())
    }

    fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        if entity.epoch != self.ids.epoch() {
            return None;
        }
        self.entities.get(&entity.id).filter(|r| !r.destroyed)
    }

    // ── Activity ──────────────────────────────────────────────────────

    /// The entity's own activity flag, ignoring its ancestors.
    pub fn is_self_active(&self, entity: Entity) -> bool {
        self.record(entity).is_some_and(|r| r.self_active)
    }

    /// Set the entity's own activity flag. Ignored for dead entities.
    pub fn set_self_active(&mut self, entity: Entity, active: bool) {
        if entity.epoch != self.ids.epoch() {
            return;
        }
        if let Some(record) = self.entities.get_mut(&entity.id) {
            record.self_active = active;
        }
    }

    /// `self_active` AND-ed with every live ancestor's `self_active`.
    ///
    /// Computed on each call by walking up the transform tree; a destroyed
    /// parent ends the walk as if the entity were a root.
    pub fn is_active_in_hierarchy(&self, entity: Entity) -> bool {
        let Some(record) = self.record(entity) else {
            return false;
        };
        if !record.self_active {
            return false;
        }
        match self.parent_entity(entity) {
            Some(parent) => self.is_active_in_hierarchy(parent),
            None => true,
        }
    }

    // ── Component Attachment ──────────────────────────────────────────

    /// Register `T` so it can be constructed by type key, e.g. when a
    /// [`System`](super::system::System) provisions a missing component.
    pub fn register_component<T: Component + Default>(&mut self) {
        self.registry.register_default::<T>();
    }

    /// Attach a default-constructed `T` to `entity` and run its
    /// [`on_attach`](Component::on_attach) hook.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn add_component<T: Component + Default>(&mut self, entity: Entity) -> Handle<T> {
        self.registry.register_default::<T>();
        self.insert_component(entity, T::default())
    }

    /// Attach an already-built `T` to `entity` and run its
    /// [`on_attach`](Component::on_attach) hook.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert_component<T: Component>(&mut self, entity: Entity, value: T) -> Handle<T> {
        assert!(
            self.is_alive(entity),
            "Cannot attach component `{}` to dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );
        self.registry.register::<T>();
        let handle = Handle::new(self.attach_boxed(entity, ComponentType::of::<T>(), Box::new(value)));
        T::on_attach(self, handle);
        handle
    }

    /// Attach a component chosen at runtime by its type key.
    ///
    /// Fails if the entity is dead, the key is a capability, the type was
    /// never registered, or it was registered without a constructor.
    pub fn add_component_dyn(
        &mut self,
        entity: Entity,
        ty: ComponentType,
    ) -> Result<ComponentId, WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::EntityNotFound(entity));
        }
        let (ty, construct, attach) = self.registry.constructor_for(ty)?;
        let id = self.attach_boxed(entity, ty, construct());
        attach(self, id);
        Ok(id)
    }

    /// Check that `ty` could be built by [`add_component_dyn`](Self::add_component_dyn)
    /// without building it.
    pub fn can_construct(&self, ty: ComponentType) -> Result<(), WorldError> {
        self.registry.constructor_for(ty).map(|_| ())
    }

    /// Has `ty` been attached or registered in this world?
    pub fn is_component_registered(&self, ty: ComponentType) -> bool {
        self.registry.is_registered(ty)
    }

    /// Remove every component attached to `entity` at position `start` or
    /// later, freeing their slots. Removed transforms leave their parent.
    ///
    /// Used to undo a partial registration; the entity's own transform sits
    /// at position 0 and is never touched for `start > 0`.
    pub(crate) fn detach_components_from(&mut self, entity: Entity, start: usize) {
        if entity.epoch != self.ids.epoch() || start == 0 {
            return;
        }
        let Some(record) = self.entities.get_mut(&entity.id) else {
            return;
        };
        if start >= record.components.len() {
            return;
        }
        let removed = record.components.split_off(start);
        for id in removed {
            if let Some(transform) = self.typed::<Transform>(id) {
                let _ = self.set_parent(transform, None);
            }
            if let Some(ty) = self.component_type(id) {
                log::trace!("detached `{}` from entity {entity}", ty.short_name());
            }
            self.components.free(id);
        }
    }

    /// Store the component and append it to the entity's list. The owner is
    /// written here and never again.
    fn attach_boxed(
        &mut self,
        entity: Entity,
        ty: ComponentType,
        data: Box<dyn Component>,
    ) -> ComponentId {
        let id = self.components.insert(ComponentEntry {
            owner: entity,
            ty,
            active: true,
            destroyed: false,
            data,
        });
        if let Some(record) = self.entities.get_mut(&entity.id) {
            record.components.push(id);
        }
        log::trace!("attached `{}` to entity {entity}", ty.short_name());
        id
    }

    // ── Component Lookup ──────────────────────────────────────────────

    /// First component of concrete type `T`, in attachment order.
    ///
    /// Destroyed-flagged components are included; check
    /// [`is_component_destroyed`](Self::is_component_destroyed) if it matters.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<Handle<T>> {
        let wanted = ComponentType::of::<T>();
        self.record(entity)?
            .components
            .iter()
            .copied()
            .find(|&id| self.components.get(id).is_some_and(|e| e.ty == wanted))
            .map(Handle::new)
    }

    /// First component that is of type `ty` or provides capability `ty`, in
    /// attachment order. Destroyed-flagged components are included.
    pub fn get_component_dyn(&self, entity: Entity, ty: ComponentType) -> Option<ComponentId> {
        self.record(entity)?.components.iter().copied().find(|&id| {
            self.components
                .get(id)
                .is_some_and(|e| self.registry.satisfies(e.ty, ty))
        })
    }

    /// All components of the entity in attachment order.
    pub fn components(&self, entity: Entity) -> &[ComponentId] {
        self.record(entity)
            .map(|r| r.components.as_slice())
            .unwrap_or_default()
    }

    /// The transform attached when the entity was created.
    pub fn transform(&self, entity: Entity) -> Option<Handle<Transform>> {
        self.record(entity)?.transform
    }

    /// Turn an untyped id into a typed handle if the slot holds a `T`.
    pub fn typed<T: Component>(&self, id: ComponentId) -> Option<Handle<T>> {
        let entry = self.components.get(id)?;
        (entry.ty == ComponentType::of::<T>()).then(|| Handle::new(id))
    }

    pub fn component<T: Component>(&self, handle: Handle<T>) -> Option<&T> {
        self.components.get(handle.id())?.downcast_ref::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.components.get_mut(handle.id())?.downcast_mut::<T>()
    }

    /// Type-erased access to any live component slot.
    pub fn component_dyn(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id).map(|e| &*e.data)
    }

    /// The concrete type of a component.
    pub fn component_type(&self, id: ComponentId) -> Option<ComponentType> {
        self.components.get(id).map(|e| e.ty)
    }

    /// The entity a component was attached to.
    pub fn owner(&self, handle: impl Into<ComponentId>) -> Option<Entity> {
        self.components.get(handle.into()).map(|e| e.owner)
    }

    // ── Component State ───────────────────────────────────────────────

    /// The component's own activity flag. `false` for stale ids.
    pub fn is_component_active(&self, handle: impl Into<ComponentId>) -> bool {
        self.components.get(handle.into()).is_some_and(|e| e.active)
    }

    pub fn set_component_active(&mut self, handle: impl Into<ComponentId>, active: bool) {
        if let Some(entry) = self.components.get_mut(handle.into()) {
            entry.active = active;
        }
    }

    /// Flag a single component as destroyed. It stays attached and readable.
    /// Repeated calls have no further effect.
    pub fn destroy_component(&mut self, handle: impl Into<ComponentId>) {
        let id = handle.into();
        if let Some(entry) = self.components.get_mut(id) {
            if !entry.destroyed {
                entry.destroyed = true;
                log::trace!("destroyed component {id:?} on entity {}", entry.owner);
            }
        }
    }

    /// `true` once the component was destroyed, directly or with its entity.
    pub fn is_component_destroyed(&self, handle: impl Into<ComponentId>) -> bool {
        self.components.get(handle.into()).is_none_or(|e| e.destroyed)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
