//! # Sprig — A Tiny 2D Scene-Graph ECS
//!
//! Entities with ordered, heterogeneous components, a parent/child
//! [`Transform`](ecs::Transform) tree with on-demand world-space math, and
//! systems that add the components they need when an entity registers.
//!
//! Start with `use sprig::prelude::*` and create a [`World`](ecs::World).
//!
//! ```ignore
//! let mut world = World::new();
//! let ship = world.create_entity("ship");
//! let turret = world.create_entity("turret");
//! let (ship_t, turret_t) = (world.transform(ship).unwrap(), world.transform(turret).unwrap());
//! world.set_parent(turret_t, Some(ship_t))?;
//! let aim = world.world_position(turret_t);
//! ```

pub mod ecs;
pub mod gizmos;
pub mod math;
pub mod prelude;

#[cfg(feature = "diagnostics")]
pub mod diag;
