//! # Entity-Component-System Core
//!
//! A small object-style ECS: each entity owns an ordered list of boxed
//! components, and systems keep their own lists of the components they care
//! about. No archetypes, no queries. That fits scene graphs where every entity
//! is different and there are only a few hundred of them.
//!
//! ## Module Overview
//!
//! - [`entity`] — Entity handles and id assignment
//! - [`component`] — The `Component` trait, type keys, handles, the arena
//! - [`world`] — Central container: create, destroy, attach, look up
//! - [`transform`] — Built-in `Transform` and the parent/child tree
//! - [`system`] — `System` trait, auto-provisioning registration, `Schedule`
//! - [`error`] — `WorldError`

pub mod component;
pub mod entity;
pub mod error;
pub(crate) mod registry;
pub mod system;
pub mod transform;
pub mod world;

pub use component::{AsAny, Component, ComponentId, ComponentType, Handle};
pub use entity::Entity;
pub use error::WorldError;
pub use system::{ComponentSets, RegisterOutcome, Schedule, System};
#[cfg(feature = "diagnostics")]
pub use system::SystemTiming;
pub use transform::Transform;
pub use world::{DEFAULT_ENTITY_NAME, World};
