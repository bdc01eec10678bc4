//! Errors reported by [`World`](super::world::World) operations.
//!
//! Absent lookups are not errors: `get_entity`, `get_component` and friends
//! return `Option`. A `WorldError` means the caller asked for something the
//! world can't do.

use std::fmt;

use super::component::{ComponentId, ComponentType};
use super::entity::Entity;

/// Errors that can occur while mutating a [`World`](super::world::World).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The entity handle is destroyed or from before a world reset.
    EntityNotFound(Entity),
    /// The component handle no longer resolves to a live slot.
    StaleComponent(ComponentId),
    /// Dynamic construction of a type the world has never seen.
    UnregisteredComponent(ComponentType),
    /// Dynamic construction of a capability, which has no constructor.
    AbstractComponent(ComponentType),
    /// Dynamic construction of a type registered without a `Default` constructor.
    NoDefaultConstructor(ComponentType),
    /// Reparenting would make a transform its own ancestor.
    HierarchyCycle {
        child: ComponentId,
        parent: ComponentId,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::EntityNotFound(e) => write!(f, "entity {e} is not alive"),
            WorldError::StaleComponent(id) => write!(f, "component {id:?} is no longer alive"),
            WorldError::UnregisteredComponent(ty) => {
                write!(f, "component type `{}` was never registered", ty.name())
            }
            WorldError::AbstractComponent(ty) => {
                write!(f, "capability `{}` cannot be constructed", ty.name())
            }
            WorldError::NoDefaultConstructor(ty) => {
                write!(f, "component type `{}` has no default constructor", ty.name())
            }
            WorldError::HierarchyCycle { child, parent } => write!(
                f,
                "parenting {child:?} under {parent:?} would create a cycle"
            ),
        }
    }
}

impl std::error::Error for WorldError {}
