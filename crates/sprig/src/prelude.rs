//! Convenience re-exports — `use sprig::prelude::*` for the common items.

pub use crate::ecs::{
    Component, ComponentId, ComponentSets, ComponentType, Entity, Handle, RegisterOutcome,
    Schedule, System, Transform, World, WorldError,
};
pub use crate::gizmos::{GizmoBuffer, GizmoConfig, GizmoContext, Gizmos};
pub use crate::math::{Vec2, angle, rotate, signed_angle};
#[cfg(feature = "diagnostics")]
pub use crate::diag::EntityPoolStats;
