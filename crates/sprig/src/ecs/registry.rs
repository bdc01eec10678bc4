//! # Component Registry — Constructors Looked Up by Type
//!
//! Systems ask for components by [`ComponentType`] and expect missing ones to
//! be created on the spot. Rust can't build a value from a `TypeId`, so the
//! world keeps a table from type key to a constructor and an attach hook,
//! filled in as concrete types are first used:
//!
//! ```text
//! TypeId(Velocity)  → { constructor: Some(Velocity::default), attach, capabilities: [] }
//! TypeId(Sprite)    → { constructor: None,                    attach, capabilities: [dyn Drawable] }
//! ```
//!
//! - [`World::add_component`](super::world::World::add_component) and
//!   [`World::register_component`](super::world::World::register_component)
//!   register a `Default` constructor.
//! - [`World::insert_component`](super::world::World::insert_component) only
//!   records the type, so asking for it dynamically later fails with
//!   [`WorldError::NoDefaultConstructor`].

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{Component, ComponentId, ComponentType, Handle};
use super::error::WorldError;
use super::world::World;

pub(crate) type Constructor = fn() -> Box<dyn Component>;
pub(crate) type AttachHook = fn(&mut World, ComponentId);

pub(crate) struct ComponentInfo {
    pub ty: ComponentType,
    pub constructor: Option<Constructor>,
    pub attach: AttachHook,
    pub capabilities: Vec<ComponentType>,
}

fn construct<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

fn attach<T: Component>(world: &mut World, id: ComponentId) {
    T::on_attach(world, Handle::new(id));
}

#[derive(Default)]
pub(crate) struct ComponentRegistry {
    types: HashMap<TypeId, ComponentInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `T` without a constructor. No-op if already known.
    pub fn register<T: Component>(&mut self) {
        self.types
            .entry(TypeId::of::<T>())
            .or_insert_with(|| ComponentInfo {
                ty: ComponentType::of::<T>(),
                constructor: None,
                attach: attach::<T>,
                capabilities: T::capabilities(),
            });
    }

    /// Record `T` with its `Default` constructor.
    pub fn register_default<T: Component + Default>(&mut self) {
        self.register::<T>();
        if let Some(info) = self.types.get_mut(&TypeId::of::<T>()) {
            if info.constructor.is_none() {
                log::trace!("registered constructor for `{}`", info.ty.short_name());
                info.constructor = Some(construct::<T>);
            }
        }
    }

    pub fn is_registered(&self, ty: ComponentType) -> bool {
        self.types.contains_key(&ty.type_id())
    }

    /// Does a component of concrete type `concrete` satisfy a lookup for
    /// `requested`? True for the same type or a declared capability.
    pub fn satisfies(&self, concrete: ComponentType, requested: ComponentType) -> bool {
        concrete == requested
            || self
                .types
                .get(&concrete.type_id())
                .is_some_and(|info| info.capabilities.contains(&requested))
    }

    /// Resolve the constructor and attach hook for dynamic construction.
    pub fn constructor_for(
        &self,
        ty: ComponentType,
    ) -> Result<(ComponentType, Constructor, AttachHook), WorldError> {
        if ty.is_capability() {
            return Err(WorldError::AbstractComponent(ty));
        }
        let info = self
            .types
            .get(&ty.type_id())
            .ok_or(WorldError::UnregisteredComponent(ty))?;
        let constructor = info
            .constructor
            .ok_or(WorldError::NoDefaultConstructor(ty))?;
        Ok((info.ty, constructor, info.attach))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Drawable {}

    #[derive(Default)]
    struct Velocity;
    impl Component for Velocity {}

    struct Sprite;
    impl Component for Sprite {
        fn capabilities() -> Vec<ComponentType> {
            vec![ComponentType::capability::<dyn Drawable>()]
        }
    }

    #[test]
    fn default_registration_has_constructor() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Velocity>();
        assert!(registry.constructor_for(ComponentType::of::<Velocity>()).is_ok());
    }

    #[test]
    fn plain_registration_has_no_constructor() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Sprite>();
        assert!(registry.is_registered(ComponentType::of::<Sprite>()));
        assert_eq!(
            registry.constructor_for(ComponentType::of::<Sprite>()).err(),
            Some(WorldError::NoDefaultConstructor(ComponentType::of::<Sprite>()))
        );
    }

    #[test]
    fn later_default_registration_adds_constructor() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Velocity>();
        registry.register_default::<Velocity>();
        assert!(registry.constructor_for(ComponentType::of::<Velocity>()).is_ok());
    }

    #[test]
    fn unknown_and_abstract_types_fail() {
        let registry = ComponentRegistry::new();
        let velocity = ComponentType::of::<Velocity>();
        let drawable = ComponentType::capability::<dyn Drawable>();
        assert_eq!(
            registry.constructor_for(velocity).err(),
            Some(WorldError::UnregisteredComponent(velocity))
        );
        assert_eq!(
            registry.constructor_for(drawable).err(),
            Some(WorldError::AbstractComponent(drawable))
        );
    }

    #[test]
    fn capability_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Sprite>();
        let sprite = ComponentType::of::<Sprite>();
        let drawable = ComponentType::capability::<dyn Drawable>();
        assert!(registry.satisfies(sprite, sprite));
        assert!(registry.satisfies(sprite, drawable));
        assert!(!registry.satisfies(ComponentType::of::<Velocity>(), drawable));
    }
}
