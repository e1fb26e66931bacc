//! Built-in example dungeon
//!
//! Written to disk when an install has no definitions, and used as the
//! canonical fixture in tests.

use super::definition::*;

/// Create the "Forgotten Crypt" example definition
pub fn create_example() -> DungeonDefinition {
    DungeonDefinition {
        name: "The Forgotten Crypt".to_string(),
        description: "A dark and dangerous crypt filled with undead monsters and ancient treasures."
            .to_string(),
        author: "CryptCrawl".to_string(),
        version: "1.0.0".to_string(),
        levels: vec![entrance_hall()],
        monsters: vec![
            MonsterTemplate {
                id: "skeleton".to_string(),
                name: "Skeleton".to_string(),
                description: "A reanimated skeleton wielding a rusty sword.".to_string(),
                symbol: "S".to_string(),
                color: "#ffffff".to_string(),
                health: 5,
                damage: 2,
                level_scale: 1.5,
                abilities: Vec::new(),
                loot_table: vec![
                    loot("gold", 0.7, 1, 5),
                    loot("bone_shard", 0.3, 1, 3),
                ],
            },
            MonsterTemplate {
                id: "zombie".to_string(),
                name: "Zombie".to_string(),
                description: "A shambling corpse with rotting flesh.".to_string(),
                symbol: "Z".to_string(),
                color: "#00ff00".to_string(),
                health: 8,
                damage: 1,
                level_scale: 1.2,
                abilities: Vec::new(),
                loot_table: vec![
                    loot("gold", 0.5, 1, 3),
                    loot("rotten_flesh", 0.6, 1, 2),
                ],
            },
        ],
        items: vec![
            item("gold", "Gold", "Shiny gold coins.", "$", "#ffff00", "currency", 1, Vec::new()),
            item(
                "health_potion",
                "Health Potion",
                "A potion that restores health.",
                "!",
                "#ff0000",
                "consumable",
                10,
                vec![effect("heal", 5)],
            ),
            item(
                "rusty_sword",
                "Rusty Sword",
                "An old, rusty sword. Still sharp enough to cut.",
                "/",
                "#aaaaaa",
                "weapon",
                5,
                vec![effect("damage", 2)],
            ),
            item("bone_shard", "Bone Shard", "A sharp shard of bone.", "*", "#ffffff", "material", 2, Vec::new()),
            item(
                "rotten_flesh",
                "Rotten Flesh",
                "A piece of rotten flesh. Smells terrible.",
                "%",
                "#00aa00",
                "material",
                1,
                Vec::new(),
            ),
        ],
        events: vec![
            EventDefinition {
                id: "entrance_event".to_string(),
                name: "Entrance Event".to_string(),
                description: "An event that triggers when the player enters the dungeon.".to_string(),
                trigger: "level_start".to_string(),
                actions: vec![
                    EventAction::message("You enter the forgotten crypt. The air is stale and cold."),
                    EventAction::sound("door_creak"),
                ],
            },
            EventDefinition {
                id: "skeleton_death".to_string(),
                name: "Skeleton Death".to_string(),
                description: "An event that triggers when a skeleton dies.".to_string(),
                trigger: "monster_death".to_string(),
                actions: vec![
                    EventAction::message("The skeleton crumbles to dust!").with_target("skeleton"),
                    EventAction::sound("bone_crunch").with_target("skeleton"),
                ],
            },
        ],
    }
}

fn entrance_hall() -> LevelDefinition {
    let layout = [
        "####################",
        "#........#.........#",
        "#........#.........#",
        "#........+.........#",
        "#........#.........#",
        "#........#.........#",
        "#........#####.....#",
        "#................E.#",
        "#.S................#",
        "####################",
    ];

    LevelDefinition {
        id: "level1".to_string(),
        name: "Entrance Hall".to_string(),
        description: "The entrance to the crypt. Dusty and abandoned.".to_string(),
        width: 20,
        height: 10,
        layout: layout.iter().map(|row| row.to_string()).collect(),
        rooms: vec![
            RoomDefinition {
                id: "entrance".to_string(),
                name: "Entrance".to_string(),
                description: "The entrance to the crypt.".to_string(),
                x: 1,
                y: 1,
                width: 8,
                height: 6,
                doors: vec![Position::new(9, 3)],
            },
            RoomDefinition {
                id: "main_hall".to_string(),
                name: "Main Hall".to_string(),
                description: "The main hall of the crypt.".to_string(),
                x: 10,
                y: 1,
                width: 9,
                height: 8,
                doors: vec![Position::new(9, 3)],
            },
        ],
        encounters: vec![
            EncounterSpawn {
                monster_id: "skeleton".to_string(),
                count: 2,
                min_level: 1,
                max_level: 1,
                position: None,
                room_id: Some("main_hall".to_string()),
            },
            EncounterSpawn {
                monster_id: "zombie".to_string(),
                count: 1,
                min_level: 1,
                max_level: 2,
                position: Some(Position::new(15, 5)),
                room_id: None,
            },
        ],
        items: vec![
            ItemSpawn {
                item_id: "gold".to_string(),
                position: None,
                room_id: Some("entrance".to_string()),
                chance: 0.8,
            },
            ItemSpawn {
                item_id: "health_potion".to_string(),
                position: Some(Position::new(12, 2)),
                room_id: None,
                chance: 1.0,
            },
            ItemSpawn {
                item_id: "rusty_sword".to_string(),
                position: None,
                room_id: Some("main_hall".to_string()),
                chance: 0.5,
            },
        ],
        start_pos: Position::new(2, 8),
        exit_pos: Position::new(17, 7),
    }
}

fn loot(item_id: &str, chance: f64, min_count: u32, max_count: u32) -> LootEntry {
    LootEntry { item_id: item_id.to_string(), chance, min_count, max_count }
}

fn effect(effect_type: &str, value: i32) -> ItemEffect {
    ItemEffect { effect_type: effect_type.to_string(), value, duration: 0 }
}

#[allow(clippy::too_many_arguments)]
fn item(
    id: &str,
    name: &str,
    description: &str,
    symbol: &str,
    color: &str,
    kind: &str,
    value: i32,
    effects: Vec<ItemEffect>,
) -> ItemTemplate {
    ItemTemplate {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        symbol: symbol.to_string(),
        color: color.to_string(),
        kind: kind.to_string(),
        value,
        effects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_is_fully_populated() {
        let def = create_example();
        assert!(!def.name.is_empty());
        assert_eq!(def.levels.len(), 1);
        assert_eq!(def.monsters.len(), 2);
        assert_eq!(def.items.len(), 5);
        assert_eq!(def.events.len(), 2);
    }

    #[test]
    fn test_example_spawns_reference_known_templates() {
        let def = create_example();
        let level = &def.levels[0];
        for encounter in &level.encounters {
            assert!(def.monster(&encounter.monster_id).is_some(), "unknown monster {}", encounter.monster_id);
            if let Some(room) = &encounter.room_id {
                assert!(level.room(room).is_some());
            }
        }
        for spawn in &level.items {
            assert!(def.item(&spawn.item_id).is_some(), "unknown item {}", spawn.item_id);
        }
    }

    #[test]
    fn test_example_layout_matches_dimensions() {
        let level = &create_example().levels[0];
        assert_eq!(level.layout.len(), level.height);
        assert!(level.layout.iter().all(|row| row.chars().count() == level.width));
    }
}
