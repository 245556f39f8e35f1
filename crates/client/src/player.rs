//! Player and world snapshot
//!
//! Mutated only by the session loop; observers read published copies through
//! [`ClientHandle::snapshot`](crate::ClientHandle::snapshot).

use std::collections::HashMap;

use realmlink_protocol::messages::data::{stat, Entity, Location, StatData, Status};
use realmlink_protocol::messages::incoming::{Aoe, NewTick, Update};
use serde::{Deserialize, Serialize};

use crate::services::ObjectDefinitions;

pub const INVENTORY_SLOTS: usize = 12;

/// Stats of the controlled character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub account_id: String,
    pub level: i32,
    pub exp: i32,
    pub next_level_exp: i32,
    pub max_hp: i32,
    pub hp: i32,
    pub max_mp: i32,
    pub mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub dexterity: i32,
    pub vitality: i32,
    pub wisdom: i32,
    pub stars: i32,
    pub account_fame: i32,
    pub character_fame: i32,
    pub guild_name: String,
    pub guild_rank: i32,
    /// Item type per slot, `-1` when empty
    pub inventory: [i32; INVENTORY_SLOTS],
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            name: String::new(),
            account_id: String::new(),
            level: 0,
            exp: 0,
            next_level_exp: 0,
            max_hp: 0,
            hp: 0,
            max_mp: 0,
            mp: 0,
            attack: 0,
            defense: 0,
            speed: 0,
            dexterity: 0,
            vitality: 0,
            wisdom: 0,
            stars: 0,
            account_fame: 0,
            character_fame: 0,
            guild_name: String::new(),
            guild_rank: 0,
            inventory: [-1; INVENTORY_SLOTS],
        }
    }
}

impl PlayerStats {
    /// Applies one stat entry; unknown ids are ignored
    pub fn apply(&mut self, data: &StatData) {
        if let Some(text) = data.text() {
            match data.stat_type {
                stat::NAME => self.name = text.to_string(),
                stat::ACCOUNT_ID => self.account_id = text.to_string(),
                stat::GUILD_NAME => self.guild_name = text.to_string(),
                stat::EXP => self.exp = text.parse().unwrap_or(self.exp),
                _ => {}
            }
            return;
        }

        let Some(value) = data.int() else {
            return;
        };
        match data.stat_type {
            stat::MAX_HP => self.max_hp = value,
            stat::HP => self.hp = value,
            stat::MAX_MP => self.max_mp = value,
            stat::MP => self.mp = value,
            stat::NEXT_LEVEL_EXP => self.next_level_exp = value,
            stat::LEVEL => self.level = value,
            stat::ATTACK => self.attack = value,
            stat::DEFENSE => self.defense = value,
            stat::SPEED => self.speed = value,
            stat::DEXTERITY => self.dexterity = value,
            stat::VITALITY => self.vitality = value,
            stat::WISDOM => self.wisdom = value,
            stat::STARS => self.stars = value,
            stat::ACCOUNT_FAME => self.account_fame = value,
            stat::CHARACTER_FAME => self.character_fame = value,
            stat::GUILD_RANK => self.guild_rank = value,
            id @ stat::INVENTORY_0..=stat::INVENTORY_11 => {
                self.inventory[usize::from(id - stat::INVENTORY_0)] = value;
            }
            _ => {}
        }
    }
}

/// Another object in view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub object_type: u16,
    pub position: Location,
    pub stats: Vec<StatData>,
    /// Hostile per the object definitions when the object entered view
    #[serde(default)]
    pub enemy: bool,
}

impl TrackedObject {
    fn merge(&mut self, status: &Status) {
        self.position = status.position;
        for data in &status.stats {
            match self.stats.iter_mut().find(|s| s.stat_type == data.stat_type) {
                Some(existing) => *existing = data.clone(),
                None => self.stats.push(data.clone()),
            }
        }
    }
}

/// Session-local view of the player and its surroundings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Object id of the controlled character, `0` until `CreateSuccess`
    pub object_id: i32,
    pub char_id: i32,
    pub position: Location,
    pub map_name: String,
    pub stats: PlayerStats,
    pub objects: HashMap<i32, TrackedObject>,
    pub last_tick_id: i32,
    pub last_tick_time: i32,
}

impl PlayerState {
    /// True once the server has told us where we are
    pub fn has_position(&self) -> bool {
        self.position.x != 0.0 || self.position.y != 0.0
    }

    pub fn is_own(&self, object_id: i32) -> bool {
        self.object_id != 0 && self.object_id == object_id
    }

    /// Forgets everything tied to the current map
    pub fn reset_world(&mut self) {
        self.objects.clear();
        self.position = Location::default();
        self.object_id = 0;
    }

    pub fn apply_status(&mut self, status: &Status) {
        if self.is_own(status.object_id) {
            if status.position.x != 0.0 || status.position.y != 0.0 {
                self.position = status.position;
            }
            for data in &status.stats {
                self.stats.apply(data);
            }
        } else if let Some(object) = self.objects.get_mut(&status.object_id) {
            object.merge(status);
        }
    }

    pub fn apply_entity(&mut self, entity: &Entity, definitions: &dyn ObjectDefinitions) {
        if self.is_own(entity.status.object_id) {
            self.apply_status(&entity.status);
            return;
        }
        self.objects.insert(
            entity.status.object_id,
            TrackedObject {
                object_type: entity.object_type,
                position: entity.status.position,
                stats: entity.status.stats.clone(),
                enemy: definitions.is_enemy(entity.object_type),
            },
        );
    }

    pub fn apply_update(&mut self, update: &Update, definitions: &dyn ObjectDefinitions) {
        if update.player_position.x != 0.0 || update.player_position.y != 0.0 {
            self.position = update.player_position;
        }
        for entity in &update.new_objects {
            self.apply_entity(entity, definitions);
        }
        for id in &update.drops {
            self.objects.remove(id);
        }
    }

    /// Tracked objects classified as enemies, keyed by object id
    pub fn enemies(&self) -> impl Iterator<Item = (i32, &TrackedObject)> {
        self.objects
            .iter()
            .filter(|(_, object)| object.enemy)
            .map(|(id, object)| (*id, object))
    }

    pub fn apply_tick(&mut self, tick: &NewTick) {
        self.last_tick_id = tick.tick_id;
        self.last_tick_time = tick.server_real_time_ms;
        for status in &tick.statuses {
            self.apply_status(status);
        }
    }

    /// True when the player stands inside the blast radius
    pub fn is_hit_by(&self, aoe: &Aoe) -> bool {
        aoe.location.distance_squared_to(&self.position) < aoe.radius * aoe.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MemoryObjectDefinitions, ObjectDefinition};
    use realmlink_protocol::messages::data::StatValue;

    fn int_stat(stat_type: u8, value: i32) -> StatData {
        StatData {
            stat_type,
            value: StatValue::Int(value),
            secondary: 0,
        }
    }

    fn text_stat(stat_type: u8, value: &str) -> StatData {
        StatData {
            stat_type,
            value: StatValue::Text(value.to_string()),
            secondary: 0,
        }
    }

    fn player(object_id: i32) -> PlayerState {
        PlayerState {
            object_id,
            ..PlayerState::default()
        }
    }

    #[test]
    fn test_stats_apply() {
        let mut stats = PlayerStats::default();
        stats.apply(&int_stat(stat::HP, 150));
        stats.apply(&int_stat(stat::LEVEL, 20));
        stats.apply(&int_stat(stat::INVENTORY_0 + 3, 2592));
        stats.apply(&text_stat(stat::NAME, "Wizard"));
        stats.apply(&int_stat(250, 1));

        assert_eq!(stats.hp, 150);
        assert_eq!(stats.level, 20);
        assert_eq!(stats.inventory[3], 2592);
        assert_eq!(stats.inventory[0], -1);
        assert_eq!(stats.name, "Wizard");
    }

    #[test]
    fn test_own_status_moves_player() {
        let mut state = player(7);
        state.apply_status(&Status {
            object_id: 7,
            position: Location::new(10.5, 20.5),
            stats: vec![int_stat(stat::MP, 40)],
        });
        assert_eq!(state.position, Location::new(10.5, 20.5));
        assert_eq!(state.stats.mp, 40);
    }

    #[test]
    fn test_update_tracks_and_drops_objects() {
        let mut state = player(7);
        let update = Update {
            player_position: Location::default(),
            unknown: 0,
            tiles: vec![],
            new_objects: vec![Entity {
                object_type: 0x0e1e,
                status: Status {
                    object_id: 99,
                    position: Location::new(1.0, 1.0),
                    stats: vec![int_stat(stat::HP, 10)],
                },
            }],
            drops: vec![],
        };
        state.apply_update(&update, &MemoryObjectDefinitions::new());
        assert_eq!(state.objects[&99].object_type, 0x0e1e);

        state.apply_status(&Status {
            object_id: 99,
            position: Location::new(2.0, 2.0),
            stats: vec![int_stat(stat::HP, 5)],
        });
        assert_eq!(state.objects[&99].position, Location::new(2.0, 2.0));
        assert_eq!(state.objects[&99].stats, vec![int_stat(stat::HP, 5)]);

        state.apply_update(
            &Update {
                drops: vec![99],
                new_objects: vec![],
                ..update
            },
            &MemoryObjectDefinitions::new(),
        );
        assert!(state.objects.is_empty());
    }

    #[test]
    fn test_update_classifies_enemies_from_definitions() {
        let definitions: MemoryObjectDefinitions = [
            ObjectDefinition {
                id: 0x0d50,
                name: "Pirate".into(),
                enemy: true,
                ..ObjectDefinition::default()
            },
            ObjectDefinition {
                id: 0x0734,
                name: "Wizard".into(),
                ..ObjectDefinition::default()
            },
        ]
        .into_iter()
        .collect();
        let entity = |object_type: u16, object_id: i32| Entity {
            object_type,
            status: Status {
                object_id,
                position: Location::new(4.0, 4.0),
                stats: vec![],
            },
        };

        let mut state = player(7);
        state.apply_update(
            &Update {
                player_position: Location::default(),
                unknown: 0,
                tiles: vec![],
                new_objects: vec![entity(0x0d50, 20), entity(0x0734, 21), entity(0x9999, 22)],
                drops: vec![],
            },
            &definitions,
        );

        assert_eq!(state.objects.len(), 3);
        assert!(state.objects[&20].enemy);
        assert!(!state.objects[&21].enemy);
        assert!(!state.objects[&22].enemy);
        let enemies: Vec<i32> = state.enemies().map(|(id, _)| id).collect();
        assert_eq!(enemies, vec![20]);
    }

    #[test]
    fn test_aoe_hit_test() {
        let mut state = player(1);
        state.position = Location::new(10.0, 10.0);

        let mut aoe = Aoe {
            location: Location::new(11.0, 10.0),
            radius: 2.0,
            damage: 50,
            effect: 0,
            effect_duration: 0.0,
            origin_type: 0,
            color: 0,
            armor_pierce: false,
        };
        assert!(state.is_hit_by(&aoe));

        aoe.location = Location::new(12.0, 10.0);
        assert!(!state.is_hit_by(&aoe));
    }
}
