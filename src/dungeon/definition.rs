//! Dungeon definition model
//!
//! Plain data describing a dungeon package. These structs are decoded from
//! hand-authored JSON files, so every container uses `#[serde(default)]`:
//! a missing field takes its zero value instead of failing the load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A grid coordinate (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (max of dx, dy)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// A complete dungeon package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DungeonDefinition {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub levels: Vec<LevelDefinition>,
    pub monsters: Vec<MonsterTemplate>,
    pub items: Vec<ItemTemplate>,
    pub events: Vec<EventDefinition>,
}

impl DungeonDefinition {
    /// Find a monster template by ID
    pub fn monster(&self, id: &str) -> Option<&MonsterTemplate> {
        self.monsters.iter().find(|m| m.id == id)
    }

    /// Find an item template by ID
    pub fn item(&self, id: &str) -> Option<&ItemTemplate> {
        self.items.iter().find(|i| i.id == id)
    }

    /// All events listening for the given trigger tag, in definition order
    pub fn events_for<'a>(&'a self, trigger: &'a str) -> impl Iterator<Item = &'a EventDefinition> {
        self.events.iter().filter(move |e| e.trigger == trigger)
    }
}

/// One floor of a dungeon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub width: usize,
    pub height: usize,
    /// Row-major ASCII rendering of the level in the legacy tile alphabet
    pub layout: Vec<String>,
    pub rooms: Vec<RoomDefinition>,
    pub encounters: Vec<EncounterSpawn>,
    pub items: Vec<ItemSpawn>,
    pub start_pos: Position,
    pub exit_pos: Position,
}

impl LevelDefinition {
    pub fn room(&self, id: &str) -> Option<&RoomDefinition> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

/// A named rectangular region of a level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub doors: Vec<Position>,
}

impl RoomDefinition {
    /// Whether the room has at least one cell inside its 1-cell border
    pub fn has_interior(&self) -> bool {
        self.width > 2 && self.height > 2
    }
}

/// Rule for placing monsters of one template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncounterSpawn {
    pub monster_id: String,
    pub count: u32,
    pub min_level: i32,
    pub max_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

/// Rule for placing a single item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemSpawn {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    /// Spawn probability in [0, 1]
    pub chance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonsterTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub symbol: String,
    pub color: String,
    pub health: i32,
    pub damage: i32,
    pub level_scale: f64,
    pub abilities: Vec<String>,
    pub loot_table: Vec<LootEntry>,
}

impl MonsterTemplate {
    /// Glyph stamped onto the grid
    pub fn glyph(&self) -> char {
        self.symbol.chars().next().unwrap_or('M')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LootEntry {
    pub item_id: String,
    pub chance: f64,
    pub min_count: u32,
    pub max_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub symbol: String,
    pub color: String,
    /// Item kind tag ("currency", "consumable", "weapon", "material", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i32,
    pub effects: Vec<ItemEffect>,
}

impl ItemTemplate {
    pub fn glyph(&self) -> char {
        self.symbol.chars().next().unwrap_or('$')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemEffect {
    #[serde(rename = "type")]
    pub effect_type: String,
    pub value: i32,
    pub duration: i32,
}

/// A scripted event. Interpreting triggers is left to the game loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Trigger tag, e.g. "level_start" or "monster_death"
    pub trigger: String,
    pub actions: Vec<EventAction>,
}

/// One step of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEventAction", into = "RawEventAction")]
pub struct EventAction {
    pub target: String,
    pub kind: ActionKind,
}

impl EventAction {
    pub fn message(text: impl Into<String>) -> Self {
        Self { target: String::new(), kind: ActionKind::Message(text.into()) }
    }

    pub fn sound(id: impl Into<String>) -> Self {
        Self { target: String::new(), kind: ActionKind::Sound(id.into()) }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// An empty target applies to every subject
    pub fn applies_to(&self, subject: &str) -> bool {
        self.target.is_empty() || self.target == subject
    }
}

/// Payload of an event action, keyed by the action's `type` tag
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Text shown in the message log
    Message(String),
    /// Sound effect identifier
    Sound(String),
    /// Any other action type, carried through untouched
    Other { kind: String, value: Value },
}

impl ActionKind {
    /// The `type` tag this payload is stored under
    pub fn tag(&self) -> &str {
        match self {
            ActionKind::Message(_) => "message",
            ActionKind::Sound(_) => "sound",
            ActionKind::Other { kind, .. } => kind,
        }
    }
}

/// Wire shape of an action: `{ "type", "target", "value" }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawEventAction {
    #[serde(rename = "type")]
    action_type: String,
    target: String,
    value: Value,
}

impl From<RawEventAction> for EventAction {
    fn from(raw: RawEventAction) -> Self {
        let kind = match (raw.action_type.as_str(), raw.value) {
            ("message", Value::String(text)) => ActionKind::Message(text),
            ("sound", Value::String(id)) => ActionKind::Sound(id),
            (_, value) => ActionKind::Other { kind: raw.action_type, value },
        };
        Self { target: raw.target, kind }
    }
}

impl From<EventAction> for RawEventAction {
    fn from(action: EventAction) -> Self {
        let (action_type, value) = match action.kind {
            ActionKind::Message(text) => ("message".to_string(), Value::String(text)),
            ActionKind::Sound(id) => ("sound".to_string(), Value::String(id)),
            ActionKind::Other { kind, value } => (kind, value),
        };
        Self { action_type, target: action.target, value }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
