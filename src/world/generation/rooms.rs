//! Room and corridor level generator
//!
//! Classic roguelike floor with rectangular rooms connected by L-shaped
//! corridors, used once a run goes deeper than the hand-authored levels.

use rand::Rng;

use crate::dungeon::generator::{scaled_damage, scaled_health, OPEN_FLOOR};
use crate::dungeon::{Grid, LevelMetadata, PlacedMonster, Position, RoomDefinition};
use crate::world::TileType;

pub const LEVEL_WIDTH: i32 = 80;
pub const LEVEL_HEIGHT: i32 = 24;

const MIN_ROOM_WIDTH: i32 = 5;
const MAX_ROOM_WIDTH: i32 = 12;
const MIN_ROOM_HEIGHT: i32 = 3;
const MAX_ROOM_HEIGHT: i32 = 7;
const ROOM_ATTEMPTS: usize = 100;

/// Base stats of procedurally placed monsters before depth scaling
const MONSTER_HEALTH: i32 = 4;
const MONSTER_DAMAGE: i32 = 1;
const MONSTER_LEVEL_SCALE: f64 = 0.25;

/// A rectangular room; x2/y2 are exclusive
#[derive(Debug, Clone)]
struct Room {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Room {
    fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x1: x, y1: y, x2: x + width, y2: y + height }
    }

    fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Overlap test keeping at least one wall between rooms
    fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(rng.gen_range(self.x1..self.x2), rng.gen_range(self.y1..self.y2))
    }
}

/// Generate a random floor for the given depth (1-based)
pub fn generate_level<R: Rng + ?Sized>(rng: &mut R, depth: u32) -> (Grid, LevelMetadata) {
    let mut grid = vec![vec![TileType::Wall.symbol(); LEVEL_WIDTH as usize]; LEVEL_HEIGHT as usize];
    let max_rooms = rng.gen_range(5..=10);

    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..ROOM_ATTEMPTS {
        if rooms.len() >= max_rooms {
            break;
        }

        let w = rng.gen_range(MIN_ROOM_WIDTH..=MAX_ROOM_WIDTH);
        let h = rng.gen_range(MIN_ROOM_HEIGHT..=MAX_ROOM_HEIGHT);
        let x = rng.gen_range(1..LEVEL_WIDTH - w - 1);
        let y = rng.gen_range(1..LEVEL_HEIGHT - h - 1);
        let new_room = Room::new(x, y, w, h);

        if rooms.iter().any(|r| new_room.intersects(r)) {
            continue;
        }

        carve_room(&mut grid, &new_room);
        if let Some(prev) = rooms.last() {
            let (from, to) = (prev.center(), new_room.center());
            carve_h_corridor(&mut grid, from.x, to.x, from.y);
            carve_v_corridor(&mut grid, from.y, to.y, to.x);
        }
        rooms.push(new_room);
    }

    if rooms.is_empty() {
        let room = Room::new(LEVEL_WIDTH / 2 - 4, LEVEL_HEIGHT / 2 - 2, 8, 4);
        carve_room(&mut grid, &room);
        rooms.push(room);
    }

    let start_pos = rooms[0].center();
    let exit_pos = match rooms.last() {
        Some(last) if rooms.len() > 1 => last.center(),
        // Single room: far corner
        _ => Position::new(rooms[0].x2 - 1, rooms[0].y2 - 1),
    };

    let mut monsters = Vec::new();
    let middle = rooms.len().saturating_sub(1);
    for room in rooms.iter().take(middle).skip(1) {
        for _ in 0..rng.gen_range(1..=3) {
            let pos = room.random_cell(rng);
            if grid[pos.y as usize][pos.x as usize] != OPEN_FLOOR {
                continue;
            }
            grid[pos.y as usize][pos.x as usize] = TileType::Monster.symbol();
            monsters.push(depth_monster(depth, pos));
        }

        for _ in 0..rng.gen_range(1..=5) {
            let pos = room.random_cell(rng);
            if grid[pos.y as usize][pos.x as usize] == OPEN_FLOOR {
                grid[pos.y as usize][pos.x as usize] = TileType::Gold.symbol();
            }
        }
    }

    // Start and exit win, same as definition levels
    grid[start_pos.y as usize][start_pos.x as usize] = TileType::Player.symbol();
    grid[exit_pos.y as usize][exit_pos.x as usize] = TileType::Exit.symbol();
    monsters.retain(|m| m.position != start_pos && m.position != exit_pos);

    let metadata = LevelMetadata {
        name: format!("Depth {}", depth),
        description: "Uncharted tunnels beyond the mapped crypt.".to_string(),
        rooms: rooms
            .iter()
            .enumerate()
            .map(|(i, r)| RoomDefinition {
                id: format!("room{}", i),
                name: format!("Chamber {}", i + 1),
                x: r.x1 - 1,
                y: r.y1 - 1,
                width: r.x2 - r.x1 + 2,
                height: r.y2 - r.y1 + 2,
                ..Default::default()
            })
            .collect(),
        start_pos,
        exit_pos,
        monsters,
        items: Vec::new(),
    };

    log::debug!("Generated procedural depth {} with {} rooms", depth, rooms.len());
    (grid, metadata)
}

fn depth_monster(depth: u32, position: Position) -> PlacedMonster {
    let level = depth.max(1) as i32;
    PlacedMonster {
        id: "monster".to_string(),
        name: "Monster".to_string(),
        description: "A dangerous monster.".to_string(),
        symbol: TileType::Monster.symbol().to_string(),
        color: "#ff0000".to_string(),
        health: scaled_health(MONSTER_HEALTH, level, MONSTER_LEVEL_SCALE),
        damage: scaled_damage(MONSTER_DAMAGE, level, MONSTER_LEVEL_SCALE),
        level,
        position,
    }
}

fn carve_room(grid: &mut Grid, room: &Room) {
    for y in room.y1..room.y2 {
        for x in room.x1..room.x2 {
            grid[y as usize][x as usize] = OPEN_FLOOR;
        }
    }
}

fn carve_h_corridor(grid: &mut Grid, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        grid[y as usize][x as usize] = OPEN_FLOOR;
    }
}

fn carve_v_corridor(grid: &mut Grid, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        grid[y as usize][x as usize] = OPEN_FLOOR;
    }
}
