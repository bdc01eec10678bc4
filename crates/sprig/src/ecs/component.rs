//! # Component — Data Attached to Entities
//!
//! A component is any `'static` type implementing [`Component`]. Every
//! component lives in exactly one entity, which is recorded once when it is
//! attached and never changes.
//!
//! ## Storage
//!
//! Components are boxed trait objects in a generational arena
//! ([`ComponentStorage`]). A [`ComponentId`] is `(index, generation)`:
//!
//! ```text
//! slots:     [ Transform g0 | Velocity g0 | <free> g1 | Transform g0 ]
//! free_list: [2]
//! ```
//!
//! When an entity is removed from the world its component slots are freed and
//! their generation bumps. Any `ComponentId` still held somewhere stops
//! resolving, so "was this destroyed?" is answered by the arena instead of by
//! every caller remembering to check a flag.
//!
//! A component can also be destroyed on its own
//! ([`World::destroy_component`](super::world::World::destroy_component)).
//! That only sets its `destroyed` flag: the component stays attached and stays
//! inspectable, but systems and the hierarchy treat it as gone.
//!
//! ## Capabilities
//!
//! Lookups by type accept either a concrete component type or a
//! **capability**: a trait (or any other `'static` marker type) that concrete
//! components declare through [`Component::capabilities`]. Capabilities can't
//! be constructed, which is what makes them "abstract" for system
//! registration.
//!
//! ```ignore
//! trait Collider {}
//!
//! impl Component for CircleCollider {
//!     fn capabilities() -> Vec<ComponentType> {
//!         vec![ComponentType::capability::<dyn Collider>()]
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use super::entity::Entity;
use super::world::World;
use crate::gizmos::{GizmoContext, Gizmos};

/// Upcast helper so boxed components can be downcast to their concrete type.
///
/// Implemented for every `'static` type; you never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The contract every attachable data unit satisfies.
///
/// All hooks default to no-ops, so a plain data struct only needs an empty
/// `impl Component for MyData {}`.
pub trait Component: AsAny {
    /// Capabilities this type provides, used by type lookups and system
    /// registration. Read once, when the type is first registered.
    fn capabilities() -> Vec<ComponentType>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Called once, right after the component is attached.
    ///
    /// By the time this runs the component's owner is set and the component
    /// is already in the entity's component list, so the hook may look at
    /// sibling components through `world`.
    fn on_attach(world: &mut World, handle: Handle<Self>)
    where
        Self: Sized,
    {
        let _ = (world, handle);
    }

    /// Debug-visualization hook, called by [`World::draw_gizmos`] once per
    /// frame for every active component of an entity active in the
    /// hierarchy. The renderer behind `gizmos` does the actual drawing.
    fn draw_gizmos(&self, ctx: &GizmoContext<'_>, gizmos: &mut dyn Gizmos) {
        let _ = (ctx, gizmos);
    }
}

// ── Type keys ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Concrete,
    Capability,
}

/// Runtime key for a component type or a capability.
///
/// Equality and hashing only look at the underlying [`TypeId`].
#[derive(Clone, Copy)]
pub struct ComponentType {
    type_id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl ComponentType {
    /// Key for a concrete component type.
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: TypeKind::Concrete,
        }
    }

    /// Key for a capability, usually `dyn SomeTrait`. Capabilities can be
    /// looked up but never constructed.
    pub fn capability<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            kind: TypeKind::Capability,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully-qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path (`my_game::Velocity` → `Velocity`).
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    /// `true` for keys built with [`ComponentType::capability`].
    pub fn is_capability(&self) -> bool {
        self.kind == TypeKind::Capability
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Concrete => write!(f, "ComponentType({})", self.short_name()),
            TypeKind::Capability => write!(f, "Capability({})", self.short_name()),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ── Handles ───────────────────────────────────────────────────────────

/// Untyped handle to a component slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({}v{})", self.index, self.generation)
    }
}

/// Typed handle to a component of type `T`.
///
/// Handles are only created by the world, so a `Handle<T>` always pointed at a
/// `T` when it was issued.
pub struct Handle<T> {
    id: ComponentId,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: ComponentId) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }

    /// The untyped id of this handle.
    pub fn id(self) -> ComponentId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.id.index, self.id.generation)
    }
}

impl<T> From<Handle<T>> for ComponentId {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}

// ── Arena ─────────────────────────────────────────────────────────────

/// One attached component plus its bookkeeping.
pub(crate) struct ComponentEntry {
    pub owner: Entity,
    pub ty: ComponentType,
    pub active: bool,
    pub destroyed: bool,
    pub data: Box<dyn Component>,
}

impl ComponentEntry {
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        let data: &dyn Component = &*self.data;
        data.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        let data: &mut dyn Component = &mut *self.data;
        data.as_any_mut().downcast_mut::<T>()
    }
}

struct Slot {
    generation: u32,
    entry: Option<ComponentEntry>,
}

/// Generational arena holding every component in a world.
pub(crate) struct ComponentStorage {
    slots: Vec<Slot>,
    /// Indices of freed slots, available for reuse.
    free_list: Vec<u32>,
}

impl ComponentStorage {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store a component, reusing a freed slot when one is available.
    pub fn insert(&mut self, entry: ComponentEntry) -> ComponentId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            ComponentId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            ComponentId {
                index,
                generation: 0,
            }
        }
    }

    pub fn get(&self, id: ComponentId) -> Option<&ComponentEntry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut ComponentEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Drop the component and invalidate every outstanding id for this slot.
    ///
    /// Returns `false` if the id was already stale.
    pub fn free(&mut self, id: ComponentId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation || slot.entry.is_none() {
            return false;
        }
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        true
    }

    /// Free every occupied slot.
    pub fn free_all(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(index as u32);
            }
        }
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Total number of slots ever allocated.
    #[cfg(any(feature = "diagnostics", test))]
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    #[cfg(any(feature = "diagnostics", test))]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }
}
