//! Diagnostics snapshots of a [`World`].
//!
//! Enabled by the `diagnostics` feature flag. Everything here is plain data
//! deriving `Serialize`, so a tool can ship it over whatever channel it likes
//! (`serde_json::to_string(&world.snapshot())`). sprig itself never sends it
//! anywhere.

use serde::Serialize;

use crate::ecs::World;
use crate::math::Vec2;

/// Entity and component pool counters.
///
/// `created_this_frame` and `destroyed_this_frame` count since the previous
/// [`World::entity_pool_stats`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPoolStats {
    pub alive_count: usize,
    pub created_this_frame: u32,
    pub destroyed_this_frame: u32,
    pub component_slots: usize,
    pub free_component_slots: usize,
    /// Bumped by every full reset.
    pub epoch: u32,
    pub next_id: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub epoch: u32,
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub name: String,
    pub self_active: bool,
    pub active_in_hierarchy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    pub world_position: Option<Vec2>,
    pub components: Vec<ComponentSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSnapshot {
    pub name: &'static str,
    pub active: bool,
    pub destroyed: bool,
}

impl World {
    /// Pool counters. Resets the per-frame created/destroyed counts.
    pub fn entity_pool_stats(&mut self) -> EntityPoolStats {
        let stats = EntityPoolStats {
            alive_count: self.entity_count(),
            created_this_frame: self.created_this_frame,
            destroyed_this_frame: self.destroyed_this_frame,
            component_slots: self.components.total_slots(),
            free_component_slots: self.components.free_count(),
            epoch: self.ids.epoch(),
            next_id: self.ids.peek_next(),
        };
        self.created_this_frame = 0;
        self.destroyed_this_frame = 0;
        stats
    }

    /// Every live entity with its components, in id order.
    pub fn snapshot(&self) -> WorldSnapshot {
        let entities = self
            .entities()
            .map(|entity| EntitySnapshot {
                id: entity.id(),
                name: self.name(entity).unwrap_or_default().to_string(),
                self_active: self.is_self_active(entity),
                active_in_hierarchy: self.is_active_in_hierarchy(entity),
                parent: self.parent_entity(entity).map(|e| e.id()),
                world_position: self
                    .transform(entity)
                    .and_then(|t| self.world_position(t)),
                components: self
                    .components(entity)
                    .iter()
                    .filter_map(|&id| {
                        Some(ComponentSnapshot {
                            name: self.component_type(id)?.short_name(),
                            active: self.is_component_active(id),
                            destroyed: self.is_component_destroyed(id),
                        })
                    })
                    .collect(),
            })
            .collect();
        WorldSnapshot {
            epoch: self.ids.epoch(),
            entities,
        }
    }
}
