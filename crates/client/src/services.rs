//! Collaborator services
//!
//! - [`ObjectDefinitions`]: static game object data keyed by type id
//! - [`PathFinder`]: route planning in world coordinates
//! - [`PathFollower`]: walks a planned route at a fixed speed, one tick at a time

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use realmlink_protocol::messages::data::Location;
use serde::{Deserialize, Serialize};

/// Static properties of one object type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectDefinition {
    pub id: u16,
    pub name: String,
    pub display_name: String,
    pub class: String,
    pub max_hp: i32,
    pub defense: i32,
    pub size: i32,
    pub enemy: bool,
    pub god: bool,
}

pub trait ObjectDefinitions: Send + Sync {
    fn definition(&self, object_type: u16) -> Option<&ObjectDefinition>;

    fn is_enemy(&self, object_type: u16) -> bool {
        self.definition(object_type).is_some_and(|def| def.enemy)
    }
}

/// Definitions held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectDefinitions {
    definitions: HashMap<u16, ObjectDefinition>,
}

impl MemoryObjectDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON array of definitions
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let list: Vec<ObjectDefinition> = serde_json::from_str(text)?;
        Ok(list.into_iter().collect())
    }

    pub fn insert(&mut self, definition: ObjectDefinition) -> Option<ObjectDefinition> {
        self.definitions.insert(definition.id, definition)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<ObjectDefinition> for MemoryObjectDefinitions {
    fn from_iter<I: IntoIterator<Item = ObjectDefinition>>(iter: I) -> Self {
        let mut definitions = Self::new();
        for definition in iter {
            definitions.insert(definition);
        }
        definitions
    }
}

impl ObjectDefinitions for MemoryObjectDefinitions {
    fn definition(&self, object_type: u16) -> Option<&ObjectDefinition> {
        self.definitions.get(&object_type)
    }
}

/// Route planner
///
/// Returns the waypoints to visit after `from`, ending at `to`. An empty
/// route means `to` is unreachable.
pub trait PathFinder: Send + Sync {
    fn find_path(&self, from: Location, to: Location) -> Vec<Location>;
}

/// Planner that walks straight at the target
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPath;

impl PathFinder for DirectPath {
    fn find_path(&self, _from: Location, to: Location) -> Vec<Location> {
        vec![to]
    }
}

/// Waypoint queue advanced by elapsed time
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    /// Tiles per second
    speed: f32,
    waypoints: VecDeque<Location>,
}

impl PathFollower {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            waypoints: VecDeque::new(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_path(&mut self, path: impl IntoIterator<Item = Location>) {
        self.waypoints = path.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn next_waypoint(&self) -> Option<Location> {
        self.waypoints.front().copied()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    /// Moves from `position` towards the route for `elapsed`
    ///
    /// Returns the new position, or `None` when there is nothing to walk.
    /// Reaching a waypoint consumes it; leftover distance carries on to the
    /// next one.
    pub fn advance(&mut self, position: Location, elapsed: Duration) -> Option<Location> {
        if self.waypoints.is_empty() {
            return None;
        }

        let mut budget = elapsed.as_secs_f32() * self.speed;
        let mut current = position;
        while let Some(target) = self.waypoints.front().copied() {
            let distance = current.distance_to(&target);
            if distance <= budget {
                current = target;
                budget -= distance;
                self.waypoints.pop_front();
                continue;
            }
            current = current.position_in_direction(current.angle_to(&target), budget);
            break;
        }
        Some(current)
    }
}
