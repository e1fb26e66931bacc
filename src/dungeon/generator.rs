//! Definition-driven level generation
//!
//! Turns one level of a [`DungeonDefinition`] into a character grid plus a
//! metadata record describing everything that was placed on it.
//!
//! Randomness comes from the caller-supplied RNG. Two calls with the same
//! inputs only produce the same level when the RNGs are seeded identically;
//! [`generate_with_thread_rng`] is never reproducible.

use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::definition::{
    DungeonDefinition, EncounterSpawn, ItemSpawn, LevelDefinition, Position, RoomDefinition,
};
use super::error::{DungeonError, Result};
use crate::world::TileType;

/// Row-major character grid, `height` rows of `width` cells
pub type Grid = Vec<Vec<char>>;

/// Symbol of a cell that spawns may be placed on
pub const OPEN_FLOOR: char = '.';

/// Attempts made by the random placement search before giving up
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Everything placed on a generated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMetadata {
    pub name: String,
    pub description: String,
    pub rooms: Vec<RoomDefinition>,
    pub start_pos: Position,
    pub exit_pos: Position,
    pub monsters: Vec<PlacedMonster>,
    pub items: Vec<PlacedItem>,
}

/// A monster instance with stats scaled to its level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedMonster {
    pub id: String,
    pub name: String,
    pub description: String,
    pub symbol: String,
    pub color: String,
    pub health: i32,
    pub damage: i32,
    pub level: i32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub symbol: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i32,
    pub position: Position,
}

/// Health of a monster at `level`; level 1 is unscaled
pub fn scaled_health(base: i32, level: i32, level_scale: f64) -> i32 {
    (base as f64 * (1.0 + (level - 1) as f64 * level_scale)).round() as i32
}

/// Damage of a monster at `level`, growing at half the health rate
pub fn scaled_damage(base: i32, level: i32, level_scale: f64) -> i32 {
    (base as f64 * (1.0 + (level - 1) as f64 * level_scale * 0.5)).round() as i32
}

/// Generate level `level_index` of `def`
pub fn generate<R: Rng + ?Sized>(
    def: &DungeonDefinition,
    level_index: usize,
    rng: &mut R,
) -> Result<(Grid, LevelMetadata)> {
    let level = def.levels.get(level_index).ok_or(DungeonError::InvalidLevelIndex {
        index: level_index,
        levels: def.levels.len(),
    })?;

    let mut grid = build_grid(level);
    let mut metadata = LevelMetadata {
        name: level.name.clone(),
        description: level.description.clone(),
        rooms: level.rooms.clone(),
        start_pos: level.start_pos,
        exit_pos: level.exit_pos,
        monsters: Vec::new(),
        items: Vec::new(),
    };

    for encounter in &level.encounters {
        place_encounter(def, level, encounter, &mut grid, &mut metadata, rng);
    }

    for spawn in &level.items {
        place_item(def, level, spawn, &mut grid, &mut metadata, rng);
    }

    // Start and exit always win over anything placed above
    set_cell(&mut grid, level.start_pos, TileType::Player.symbol());
    set_cell(&mut grid, level.exit_pos, TileType::Exit.symbol());

    log::debug!(
        "Generated level '{}' ({}x{}) with {} monsters and {} items",
        level.name,
        level.width,
        level.height,
        metadata.monsters.len(),
        metadata.items.len()
    );

    Ok((grid, metadata))
}

/// [`generate`] using the thread-local RNG
pub fn generate_with_thread_rng(def: &DungeonDefinition, level_index: usize) -> Result<(Grid, LevelMetadata)> {
    generate(def, level_index, &mut rand::thread_rng())
}

/// Wall-filled grid overlaid with the level's layout, clipped to its size
fn build_grid(level: &LevelDefinition) -> Grid {
    let mut grid = vec![vec![TileType::Wall.symbol(); level.width]; level.height];

    for (row, line) in grid.iter_mut().zip(&level.layout) {
        for (cell, ch) in row.iter_mut().zip(line.chars()) {
            *cell = ch;
        }
    }

    grid
}

fn place_encounter<R: Rng + ?Sized>(
    def: &DungeonDefinition,
    level: &LevelDefinition,
    encounter: &EncounterSpawn,
    grid: &mut Grid,
    metadata: &mut LevelMetadata,
    rng: &mut R,
) {
    let Some(monster) = def.monster(&encounter.monster_id) else {
        log::debug!("Skipping encounter with unknown monster '{}'", encounter.monster_id);
        return;
    };

    for _ in 0..encounter.count {
        let Some(position) = resolve_position(level, grid, encounter.position, encounter.room_id.as_deref(), rng)
        else {
            log::debug!("No placement found for monster '{}'", monster.id);
            continue;
        };

        let monster_level = if encounter.max_level > encounter.min_level {
            rng.gen_range(encounter.min_level..=encounter.max_level)
        } else {
            encounter.min_level
        };

        set_cell(grid, position, monster.glyph());
        metadata.monsters.push(PlacedMonster {
            id: monster.id.clone(),
            name: monster.name.clone(),
            description: monster.description.clone(),
            symbol: monster.symbol.clone(),
            color: monster.color.clone(),
            health: scaled_health(monster.health, monster_level, monster.level_scale),
            damage: scaled_damage(monster.damage, monster_level, monster.level_scale),
            level: monster_level,
            position,
        });
    }
}

fn place_item<R: Rng + ?Sized>(
    def: &DungeonDefinition,
    level: &LevelDefinition,
    spawn: &ItemSpawn,
    grid: &mut Grid,
    metadata: &mut LevelMetadata,
    rng: &mut R,
) {
    // A sample in [0, 1) never reaches 1.0 and never falls below 0.0
    if rng.gen::<f64>() >= spawn.chance {
        return;
    }

    let Some(item) = def.item(&spawn.item_id) else {
        log::debug!("Skipping spawn of unknown item '{}'", spawn.item_id);
        return;
    };

    let Some(position) = resolve_position(level, grid, spawn.position, spawn.room_id.as_deref(), rng) else {
        log::debug!("No placement found for item '{}'", item.id);
        return;
    };

    set_cell(grid, position, item.glyph());
    metadata.items.push(PlacedItem {
        id: item.id.clone(),
        name: item.name.clone(),
        description: item.description.clone(),
        symbol: item.symbol.clone(),
        color: item.color.clone(),
        kind: item.kind.clone(),
        value: item.value,
        position,
    });
}

/// Exact position, else a random open cell inside the named room, else a
/// random open cell anywhere on the level
fn resolve_position<R: Rng + ?Sized>(
    level: &LevelDefinition,
    grid: &Grid,
    exact: Option<Position>,
    room_id: Option<&str>,
    rng: &mut R,
) -> Option<Position> {
    if let Some(position) = exact {
        return in_bounds(grid, position).then_some(position);
    }

    match room_id {
        Some(id) => {
            let room = level.room(id)?;
            if !room.has_interior() {
                return None;
            }
            search_open_cell(
                grid,
                room.x + 1..room.x + room.width - 1,
                room.y + 1..room.y + room.height - 1,
                rng,
            )
        }
        None => search_open_cell(grid, 0..level.width as i32, 0..level.height as i32, rng),
    }
}

/// Uniformly sample cells in the given ranges until one is open floor
fn search_open_cell<R: Rng + ?Sized>(
    grid: &Grid,
    xs: Range<i32>,
    ys: Range<i32>,
    rng: &mut R,
) -> Option<Position> {
    if xs.is_empty() || ys.is_empty() {
        return None;
    }

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let position = Position::new(rng.gen_range(xs.clone()), rng.gen_range(ys.clone()));
        if cell(grid, position) == Some(OPEN_FLOOR) {
            return Some(position);
        }
    }
    None
}

fn in_bounds(grid: &Grid, pos: Position) -> bool {
    cell(grid, pos).is_some()
}

fn cell(grid: &Grid, pos: Position) -> Option<char> {
    let x = usize::try_from(pos.x).ok()?;
    let y = usize::try_from(pos.y).ok()?;
    grid.get(y)?.get(x).copied()
}

fn set_cell(grid: &mut Grid, pos: Position, symbol: char) {
    let (Ok(x), Ok(y)) = (usize::try_from(pos.x), usize::try_from(pos.y)) else {
        return;
    };
    if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
        *cell = symbol;
    }
}
