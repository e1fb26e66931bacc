//! Live level state
//!
//! Built from the `(Grid, LevelMetadata)` pair a generator returns. Terrain
//! lives in a tile grid; monsters and loose items are kept as separate
//! entities standing on top of it.

use std::collections::HashMap;

use rand::Rng;

use crate::dungeon::{DungeonDefinition, Grid, ItemEffect, LevelMetadata, Position};
use crate::world::{parse_hex_color, TileType};

/// Stats given to monsters found on the grid without a metadata record
pub const DEFAULT_MONSTER_HEALTH: i32 = 5;
pub const DEFAULT_MONSTER_DAMAGE: i32 = 2;

const DEFAULT_MONSTER_COLOR: (u8, u8, u8) = (255, 0, 0);
const DEFAULT_ITEM_COLOR: (u8, u8, u8) = (255, 255, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Monster {
    /// Template id, "monster" for anonymous grid monsters
    pub template_id: String,
    pub name: String,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    pub level: i32,
    pub position: Position,
}

impl Monster {
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// An item lying on the floor
#[derive(Debug, Clone, PartialEq)]
pub struct GroundItem {
    pub template_id: String,
    pub name: String,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub kind: String,
    pub value: i32,
    pub effects: Vec<ItemEffect>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub description: String,
    width: usize,
    height: usize,
    tiles: Vec<Vec<TileType>>,
    pub start: Position,
    pub exit: Position,
    pub monsters: Vec<Monster>,
    pub items: Vec<GroundItem>,
}

impl Level {
    /// Decode a generated grid into terrain and entities
    ///
    /// A metadata monster or item becomes an entity only when the grid still
    /// shows its glyph at its position; later placements overwrite earlier
    /// ones on the grid, so only the visible instance survives. Monster
    /// glyphs with no metadata record become default monsters. `definition`
    /// supplies item effects, which metadata does not carry.
    pub fn from_generated<R: Rng + ?Sized>(
        grid: &Grid,
        metadata: &LevelMetadata,
        definition: Option<&DungeonDefinition>,
        rng: &mut R,
    ) -> Self {
        let placed_monsters: HashMap<Position, _> = metadata.monsters.iter().map(|m| (m.position, m)).collect();
        let placed_items: HashMap<Position, _> = metadata.items.iter().map(|i| (i.position, i)).collect();

        let height = grid.len();
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let mut tiles = vec![vec![TileType::Empty; width]; height];
        let mut monsters = Vec::new();
        let mut items = Vec::new();
        let mut start = None;

        for (y, row) in grid.iter().enumerate() {
            for (x, &ch) in row.iter().enumerate() {
                let pos = Position::new(x as i32, y as i32);

                if let Some(item) = placed_items.get(&pos).filter(|i| glyph_of(&i.symbol, '$') == ch) {
                    let effects = definition
                        .and_then(|d| d.item(&item.id))
                        .map(|t| t.effects.clone())
                        .unwrap_or_default();
                    items.push(GroundItem {
                        template_id: item.id.clone(),
                        name: item.name.clone(),
                        glyph: ch,
                        color: parse_hex_color(&item.color).unwrap_or(DEFAULT_ITEM_COLOR),
                        kind: item.kind.clone(),
                        value: item.value,
                        effects,
                        position: pos,
                    });
                    continue;
                }

                if let Some(monster) = placed_monsters.get(&pos).filter(|m| glyph_of(&m.symbol, 'M') == ch) {
                    monsters.push(Monster {
                        template_id: monster.id.clone(),
                        name: monster.name.clone(),
                        glyph: ch,
                        color: parse_hex_color(&monster.color).unwrap_or(DEFAULT_MONSTER_COLOR),
                        health: monster.health,
                        max_health: monster.health,
                        damage: monster.damage,
                        level: monster.level,
                        position: pos,
                    });
                    continue;
                }

                match TileType::from_symbol(ch, rng) {
                    TileType::Player => start = Some(pos),
                    TileType::Monster => monsters.push(Monster {
                        template_id: "monster".to_string(),
                        name: "Monster".to_string(),
                        glyph: ch,
                        color: DEFAULT_MONSTER_COLOR,
                        health: DEFAULT_MONSTER_HEALTH,
                        max_health: DEFAULT_MONSTER_HEALTH,
                        damage: DEFAULT_MONSTER_DAMAGE,
                        level: 1,
                        position: pos,
                    }),
                    tile => tiles[y][x] = tile,
                }
            }
        }

        let start = start.unwrap_or(metadata.start_pos);
        log::debug!(
            "Built level '{}': {} monsters, {} items, start {:?}",
            metadata.name,
            monsters.len(),
            items.len(),
            start
        );

        Self {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            width,
            height,
            tiles,
            start,
            exit: metadata.exit_pos,
            monsters,
            items,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Terrain at `pos`; outside the level counts as wall
    pub fn tile(&self, pos: Position) -> TileType {
        if !self.in_bounds(pos) {
            return TileType::Wall;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
            .unwrap_or(TileType::Wall)
    }

    pub fn set_tile(&mut self, pos: Position, tile: TileType) {
        if self.in_bounds(pos) {
            self.tiles[pos.y as usize][pos.x as usize] = tile;
        }
    }

    pub fn monster_at(&self, pos: Position) -> Option<usize> {
        self.monsters.iter().position(|m| m.position == pos)
    }

    pub fn item_at(&self, pos: Position) -> Option<usize> {
        self.items.iter().position(|i| i.position == pos)
    }

    /// Terrain a monster may step onto
    pub fn monster_can_enter(&self, pos: Position) -> bool {
        matches!(
            self.tile(pos),
            TileType::Empty | TileType::Gold | TileType::Trap | TileType::Chest | TileType::Door
        ) && self.monster_at(pos).is_none()
    }
}

/// First character of a placed symbol, matching what the generator stamps
fn glyph_of(symbol: &str, fallback: char) -> char {
    symbol.chars().next().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{create_example, generate, PlacedItem, PlacedMonster};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid(rows: &[&str]) -> Grid {
        rows.iter().map(|r| r.chars().collect()).collect()
    }

    fn metadata() -> LevelMetadata {
        LevelMetadata {
            name: "Test".to_string(),
            description: String::new(),
            rooms: Vec::new(),
            start_pos: Position::new(1, 1),
            exit_pos: Position::new(3, 1),
            monsters: Vec::new(),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_plain_grid_conversion() {
        let mut rng = StdRng::seed_from_u64(0);
        let level = Level::from_generated(&grid(&["#####", "#@.E#", "#^?+#", "#####"]), &metadata(), None, &mut rng);

        assert_eq!(level.width(), 5);
        assert_eq!(level.height(), 4);
        assert_eq!(level.start, Position::new(1, 1));
        assert_eq!(level.tile(Position::new(1, 1)), TileType::Empty);
        assert_eq!(level.tile(Position::new(3, 1)), TileType::Exit);
        assert_eq!(level.tile(Position::new(1, 2)), TileType::Trap);
        assert_eq!(level.tile(Position::new(2, 2)), TileType::Chest);
        assert_eq!(level.tile(Position::new(3, 2)), TileType::Door);
        assert_eq!(level.tile(Position::new(-1, 0)), TileType::Wall);
        assert!(level.monsters.is_empty());
    }

    #[test]
    fn test_anonymous_monsters_get_defaults() {
        let mut rng = StdRng::seed_from_u64(0);
        let level = Level::from_generated(&grid(&["#####", "#@SW#", "#####"]), &metadata(), None, &mut rng);

        assert_eq!(level.monsters.len(), 2);
        for monster in &level.monsters {
            assert_eq!(monster.health, DEFAULT_MONSTER_HEALTH);
            assert_eq!(monster.damage, DEFAULT_MONSTER_DAMAGE);
            assert_eq!(level.tile(monster.position), TileType::Empty);
        }
        assert_eq!(level.monsters[1].glyph, 'W');
    }

    #[test]
    fn test_metadata_monster_keeps_scaled_stats() {
        let mut meta = metadata();
        meta.monsters.push(PlacedMonster {
            id: "zombie".to_string(),
            name: "Zombie".to_string(),
            description: String::new(),
            symbol: "Z".to_string(),
            color: "#00ff00".to_string(),
            health: 10,
            damage: 1,
            level: 2,
            position: Position::new(2, 1),
        });
        // Overwritten on the grid, so it must not come back to life
        meta.monsters.push(PlacedMonster { position: Position::new(1, 1), ..meta.monsters[0].clone() });

        let mut rng = StdRng::seed_from_u64(0);
        let level = Level::from_generated(&grid(&["#####", "#@ZE#", "#####"]), &meta, None, &mut rng);

        assert_eq!(level.monsters.len(), 1);
        let zombie = &level.monsters[0];
        assert_eq!(zombie.template_id, "zombie");
        assert_eq!(zombie.health, 10);
        assert_eq!(zombie.level, 2);
        assert_eq!(zombie.color, (0, 255, 0));
    }

    #[test]
    fn test_metadata_items_become_ground_items() {
        let mut meta = metadata();
        meta.items.push(PlacedItem {
            id: "health_potion".to_string(),
            name: "Health Potion".to_string(),
            description: String::new(),
            symbol: "!".to_string(),
            color: "#ff0000".to_string(),
            kind: "consumable".to_string(),
            value: 10,
            position: Position::new(2, 1),
        });
        meta.items.push(PlacedItem { id: "gold".to_string(), symbol: "$".to_string(), position: Position::new(3, 1), ..meta.items[0].clone() });

        let def = create_example();
        let mut rng = StdRng::seed_from_u64(0);
        let level = Level::from_generated(&grid(&["######", "#@!$.#", "######"]), &meta, Some(&def), &mut rng);

        assert_eq!(level.items.len(), 2);
        assert_eq!(level.items[0].effects[0].effect_type, "heal");
        // The item owns the cell, not a gold tile
        assert_eq!(level.tile(Position::new(3, 1)), TileType::Empty);
        assert_eq!(level.item_at(Position::new(3, 1)), Some(1));
    }

    #[test]
    fn test_example_level_conversion() {
        let def = create_example();
        let mut rng = StdRng::seed_from_u64(11);
        let (grid, meta) = generate(&def, 0, &mut rng).unwrap();
        let level = Level::from_generated(&grid, &meta, Some(&def), &mut rng);

        assert_eq!(level.start, def.levels[0].start_pos);
        assert_eq!(level.tile(level.exit), TileType::Exit);
        assert!(level.monsters.iter().all(|m| m.template_id == "skeleton" || m.template_id == "zombie"));
        assert!(level.monsters.len() <= 3);
    }

    #[test]
    fn test_monster_can_enter() {
        let mut rng = StdRng::seed_from_u64(0);
        let level = Level::from_generated(&grid(&["#####", "#@MS#", "#~$E#", "#####"]), &metadata(), None, &mut rng);

        assert!(!level.monster_can_enter(Position::new(0, 0)));
        assert!(!level.monster_can_enter(Position::new(3, 1)));
        assert!(!level.monster_can_enter(Position::new(1, 2)));
        assert!(level.monster_can_enter(Position::new(2, 2)));
        assert!(!level.monster_can_enter(Position::new(3, 2)));
    }
}
