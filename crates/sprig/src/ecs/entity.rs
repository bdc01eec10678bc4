//! # Entity — Identity for Scene Objects
//!
//! An [`Entity`] is a small copyable handle. The [`World`](super::world::World)
//! owns everything the entity "has": its name, its activity flag and its
//! ordered list of components.
//!
//! ## Ids and Epochs
//!
//! Ids are handed out by a plain counter: `0, 1, 2, ...`. A destroyed entity's
//! id is never handed out again, so a stale handle can't silently start
//! pointing at somebody else's entity.
//!
//! The one exception is a full world reset
//! ([`World::clean_up_all_entities`](super::world::World::clean_up_all_entities)),
//! which restarts the counter at `0`. To keep old handles from aliasing the
//! new entities, every handle also carries the **epoch** it was created in.
//! The reset bumps the epoch:
//!
//! ```text
//! Entity { id: 0, epoch: 0 }  ← created before the reset
//! Entity { id: 0, epoch: 1 }  ← first entity after the reset
//! ```
//!
//! Lookups compare both fields, so the first handle is simply "not alive".
//!
//! ## Comparison
//!
//! - **Generational indices** (hecs, bevy_ecs): recycle slots eagerly and bump
//!   a per-slot generation. We don't recycle ids at all between resets, so a
//!   single world-wide epoch is enough.

use std::fmt;

/// A lightweight handle to an entity in a [`World`](super::world::World).
///
/// Only valid for the world that created it, and only until the entity is
/// destroyed or the world is reset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) epoch: u32,
    pub(crate) id: u32,
}

impl Entity {
    /// The id assigned at creation. Strictly increasing within an epoch.
    pub fn id(self) -> u32 {
        self.id
    }

    /// The world epoch this handle belongs to. Useful for diagnostics.
    pub fn epoch(self) -> u32 {
        self.epoch
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}@{})", self.id, self.epoch)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.epoch)
    }
}

/// Hands out entity ids.
///
/// ```text
/// next:  3      ← id for the next created entity
/// epoch: 1      ← bumped by every reset
/// ```
pub(crate) struct EntityIdAllocator {
    next: u32,
    epoch: u32,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self { next: 0, epoch: 0 }
    }

    /// Allocate the next [`Entity`] in the current epoch.
    pub fn allocate(&mut self) -> Entity {
        let id = self.next;
        self.next += 1;
        Entity {
            epoch: self.epoch,
            id,
        }
    }

    /// Restart ids at `0` in a fresh epoch.
    pub fn reset(&mut self) {
        self.next = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Build the handle an id would have in the current epoch.
    pub fn handle(&self, id: u32) -> Entity {
        Entity {
            epoch: self.epoch,
            id,
        }
    }

    /// Returns the id the next allocation will receive.
    #[cfg(any(feature = "diagnostics", test))]
    pub fn peek_next(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityIdAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!(e0.id(), 0);
        assert_eq!(e1.id(), 1);
        assert_eq!(e0.epoch(), 0);
        assert_eq!(alloc.peek_next(), 2);
    }

    #[test]
    fn reset_restarts_ids_in_new_epoch() {
        let mut alloc = EntityIdAllocator::new();
        let before = alloc.allocate();
        alloc.allocate();
        alloc.reset();
        let after = alloc.allocate();
        assert_eq!(after.id(), 0);
        assert_eq!(after.epoch(), 1);
        assert_ne!(before, after);
    }

    #[test]
    fn handle_uses_current_epoch() {
        let mut alloc = EntityIdAllocator::new();
        alloc.reset();
        assert_eq!(alloc.handle(7), Entity { epoch: 1, id: 7 });
    }

    #[test]
    fn debug_format() {
        let e = Entity { epoch: 2, id: 5 };
        assert_eq!(format!("{e:?}"), "Entity(5@2)");
        assert_eq!(e.to_string(), "5@2");
    }
}
