//! Turn rules
//!
//! One player action followed by one monster phase. Blocked moves and
//! moves that leave the level cost no turn.

use rand::Rng;

use super::level::{GroundItem, Monster};
use super::state::{Game, MessageCategory};
use crate::dungeon::Position;
use crate::world::{parse_hex_color, TileType};

/// Directions checked by the area attack
const NEIGHBORS: [(i32, i32); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// Chance a monster acts on a given turn
const MONSTER_MOVE_CHANCE: f64 = 0.5;

impl Game {
    /// Move the player one cell, bumping into whatever is there
    pub fn move_player(&mut self, dx: i32, dy: i32) {
        if !self.is_playing() {
            return;
        }
        let Some(level) = self.level.as_ref() else {
            return;
        };

        let target = Position::new(self.player.position.x + dx, self.player.position.y + dy);
        if !level.in_bounds(target) {
            return;
        }

        if let Some(index) = level.monster_at(target) {
            self.player_attack(index, true);
        } else {
            match level.tile(target) {
                TileType::Wall | TileType::Water | TileType::Lava => return,
                TileType::Exit => {
                    self.descend();
                    return;
                }
                TileType::Gold => {
                    let amount = self.rng.gen_range(1..=10);
                    self.player.gold += amount;
                    self.add_message(format!("You found {} gold!", amount), MessageCategory::Item);
                    self.clear_tile_and_step(target);
                }
                TileType::Chest => {
                    self.open_chest();
                    self.clear_tile_and_step(target);
                }
                TileType::Trap => {
                    let damage = self.rng.gen_range(1..=3);
                    self.add_message(format!("You triggered a trap! -{} HP", damage), MessageCategory::Combat);
                    if self.hurt_player(damage) {
                        return;
                    }
                    self.clear_tile_and_step(target);
                }
                _ => self.player.position = target,
            }
            self.pick_up_items();
        }

        if self.is_playing() {
            self.move_monsters();
        }
    }

    /// Hit every monster next to the player
    pub fn attack_adjacent(&mut self) {
        if !self.is_playing() {
            return;
        }
        let Some(level) = self.level.as_ref() else {
            return;
        };

        let origin = self.player.position;
        let targets: Vec<Position> = NEIGHBORS
            .iter()
            .map(|(dx, dy)| Position::new(origin.x + dx, origin.y + dy))
            .filter(|pos| level.monster_at(*pos).is_some())
            .collect();

        if targets.is_empty() {
            self.add_message("You swing at the air!", MessageCategory::Combat);
        }
        for pos in targets {
            if let Some(index) = self.level.as_ref().and_then(|l| l.monster_at(pos)) {
                self.player_attack(index, false);
            }
        }

        if self.is_playing() {
            self.move_monsters();
        }
    }

    /// Strike the monster at `index`; a surviving monster may strike back
    fn player_attack(&mut self, index: usize, retaliate: bool) {
        let damage = self.player.damage;
        let Some(monster) = self.level.as_mut().and_then(|l| l.monsters.get_mut(index)) else {
            return;
        };
        monster.health -= damage;
        let (name, dead, counter) = (monster.name.clone(), monster.is_dead(), monster.damage);

        self.add_message(format!("You hit the {} for {} damage!", name.to_lowercase(), damage), MessageCategory::Combat);
        if dead {
            self.kill_monster(index);
        } else if retaliate {
            self.add_message(
                format!("The {} hits you for {} damage!", name.to_lowercase(), counter),
                MessageCategory::Combat,
            );
            self.hurt_player(counter);
        }
    }

    fn kill_monster(&mut self, index: usize) {
        let Some(monster) = self.level.as_mut().map(|l| l.monsters.remove(index)) else {
            return;
        };
        log::debug!("Killed {} at {:?}", monster.template_id, monster.position);
        self.add_message(format!("You killed the {}!", monster.name.to_lowercase()), MessageCategory::Combat);

        self.drop_loot(&monster);
        self.fire_events("monster_death", &monster.template_id);
    }

    /// Roll the template's loot table onto the monster's cell
    fn drop_loot(&mut self, monster: &Monster) {
        let Some(template) = self.catalog.current().and_then(|d| d.monster(&monster.template_id)) else {
            return;
        };

        let mut drops = Vec::new();
        for entry in &template.loot_table {
            if self.rng.gen::<f64>() >= entry.chance {
                continue;
            }
            let Some(item) = self.catalog.current().and_then(|d| d.item(&entry.item_id)) else {
                log::debug!("Loot references unknown item '{}'", entry.item_id);
                continue;
            };
            let count = self.rng.gen_range(entry.min_count.min(entry.max_count)..=entry.max_count.max(entry.min_count));
            if count == 0 {
                continue;
            }
            drops.push(GroundItem {
                template_id: item.id.clone(),
                name: item.name.clone(),
                glyph: item.glyph(),
                color: parse_hex_color(&item.color).unwrap_or((255, 255, 0)),
                kind: item.kind.clone(),
                value: item.value * count as i32,
                effects: item.effects.clone(),
                position: monster.position,
            });
        }

        if let Some(level) = self.level.as_mut() {
            level.items.extend(drops);
        }
    }

    fn open_chest(&mut self) {
        match self.rng.gen_range(0..3) {
            0 => {
                let amount = self.rng.gen_range(10..30);
                self.player.gold += amount;
                self.add_message(format!("You found {} gold in the chest!", amount), MessageCategory::Item);
            }
            1 => {
                let amount = self.rng.gen_range(3..8);
                self.player.heal(amount);
                self.add_message(format!("You found a health potion! +{} HP", amount), MessageCategory::Item);
            }
            _ => {
                self.player.damage += 1;
                self.add_message("You found a weapon upgrade! +1 damage", MessageCategory::Item);
            }
        }
    }

    /// Collect everything lying under the player
    fn pick_up_items(&mut self) {
        let position = self.player.position;
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let (taken, left): (Vec<GroundItem>, Vec<GroundItem>) =
            level.items.drain(..).partition(|i| i.position == position);
        level.items = left;

        for item in taken {
            self.use_item(item);
        }
    }

    /// Apply an item: currency adds gold, known effects apply at once,
    /// anything else goes into the inventory
    fn use_item(&mut self, item: GroundItem) {
        if item.kind == "currency" {
            self.player.gold += item.value;
            self.add_message(format!("You picked up {} gold.", item.value), MessageCategory::Item);
            return;
        }

        let mut applied = false;
        for effect in &item.effects {
            match effect.effect_type.as_str() {
                "heal" => {
                    let gained = self.player.heal(effect.value);
                    self.add_message(format!("You use the {}. +{} HP", item.name, gained), MessageCategory::Item);
                    applied = true;
                }
                "damage" => {
                    self.player.damage += effect.value;
                    self.add_message(
                        format!("You wield the {}. +{} damage", item.name, effect.value),
                        MessageCategory::Item,
                    );
                    applied = true;
                }
                other => log::debug!("Unsupported item effect '{}' on {}", other, item.template_id),
            }
        }

        if !applied {
            self.add_message(format!("You pick up the {}.", item.name), MessageCategory::Item);
            self.player.inventory.push(item.name);
        }
    }

    fn clear_tile_and_step(&mut self, target: Position) {
        if let Some(level) = self.level.as_mut() {
            level.set_tile(target, TileType::Empty);
        }
        self.player.position = target;
    }

    /// Apply damage to the player; returns true when it was fatal
    fn hurt_player(&mut self, amount: i32) -> bool {
        self.player.health -= amount;
        if self.player.is_dead() {
            self.player_died();
            return true;
        }
        false
    }

    /// Each monster has an even chance to step one cell toward the player,
    /// attacking instead when that cell is the player's
    pub(super) fn move_monsters(&mut self) {
        let player = self.player.position;
        let Some(level) = self.level.as_mut() else {
            return;
        };

        let mut hits = Vec::new();
        for i in 0..level.monsters.len() {
            if !self.rng.gen_bool(MONSTER_MOVE_CHANCE) {
                continue;
            }

            let from = level.monsters[i].position;
            let mut dx = (player.x - from.x).signum();
            let mut dy = (player.y - from.y).signum();
            if self.rng.gen_bool(0.5) && dx != 0 {
                dy = 0;
            } else if dy != 0 {
                dx = 0;
            }

            let to = Position::new(from.x + dx, from.y + dy);
            if to == from {
                continue;
            }
            if to == player {
                let monster = &level.monsters[i];
                hits.push((monster.name.to_lowercase(), monster.damage));
            } else if level.monster_can_enter(to) {
                level.monsters[i].position = to;
            }
        }

        for (name, damage) in hits {
            self.add_message(format!("The {} hits you for {} damage!", name, damage), MessageCategory::Combat);
            if self.hurt_player(damage) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::tests::{test_definition, test_game};
    use super::super::state::{GameState, PLAYER_DAMAGE, PLAYER_MAX_HEALTH};
    use super::*;
    use crate::dungeon::{create_example, ItemEffect};

    fn monster(name: &str, x: i32, y: i32, health: i32, damage: i32) -> Monster {
        Monster {
            template_id: name.to_lowercase(),
            name: name.to_string(),
            glyph: 'M',
            color: (255, 0, 0),
            health,
            max_health: health,
            damage,
            level: 1,
            position: Position::new(x, y),
        }
    }

    fn ground_item(kind: &str, value: i32, effects: Vec<ItemEffect>, x: i32, y: i32) -> GroundItem {
        GroundItem {
            template_id: "thing".to_string(),
            name: "Thing".to_string(),
            glyph: '!',
            color: (255, 0, 0),
            kind: kind.to_string(),
            value,
            effects,
            position: Position::new(x, y),
        }
    }

    fn effect(effect_type: &str, value: i32) -> ItemEffect {
        ItemEffect { effect_type: effect_type.to_string(), value, duration: 0 }
    }

    #[test]
    fn test_move_onto_floor() {
        let mut game = test_game(test_definition(), 3);
        game.move_player(0, 1);
        assert_eq!(game.player().position, Position::new(1, 2));
    }

    #[test]
    fn test_walls_block() {
        let mut game = test_game(test_definition(), 3);
        game.move_player(-1, 0);
        game.move_player(0, -1);
        assert_eq!(game.player().position, Position::new(1, 1));
    }

    #[test]
    fn test_hazards_block() {
        let mut game = test_game(test_definition(), 3);
        game.level.as_mut().unwrap().set_tile(Position::new(2, 1), TileType::Lava);
        game.move_player(1, 0);
        assert_eq!(game.player().position, Position::new(1, 1));
    }

    #[test]
    fn test_collect_gold_tile() {
        let mut game = test_game(test_definition(), 3);
        game.move_player(1, 0);
        game.move_player(1, 0);

        assert_eq!(game.player().position, Position::new(3, 1));
        assert!((1..=10).contains(&game.player().gold));
        assert_eq!(game.level().unwrap().tile(Position::new(3, 1)), TileType::Empty);
    }

    #[test]
    fn test_bump_kills_weak_monster() {
        let mut game = test_game(test_definition(), 3);
        game.level.as_mut().unwrap().monsters.push(monster("Rat", 2, 1, PLAYER_DAMAGE, 1));

        game.move_player(1, 0);
        assert!(game.level().unwrap().monsters.is_empty());
        assert_eq!(game.player().position, Position::new(1, 1));
        assert_eq!(game.player().health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_surviving_monster_strikes_back() {
        let mut game = test_game(test_definition(), 3);
        game.level.as_mut().unwrap().monsters.push(monster("Ogre", 2, 1, 10, 3));

        game.move_player(1, 0);
        let ogre = &game.level().unwrap().monsters[0];
        assert_eq!(ogre.health, 10 - PLAYER_DAMAGE);
        // Counterattack, plus possibly the ogre's own turn
        assert!(game.player().health == 7 || game.player().health == 4);
    }

    #[test]
    fn test_skeleton_death_event_only_for_skeletons() {
        let mut game = test_game(create_example(), 3);
        let level = game.level.as_mut().unwrap();
        level.monsters.clear();
        level.items.clear();
        let start = game.player.position;

        let mut zombie = monster("Zombie", start.x + 1, start.y, 1, 1);
        zombie.template_id = "zombie".to_string();
        game.level.as_mut().unwrap().monsters.push(zombie);
        game.move_player(1, 0);
        assert!(!game.messages().iter().any(|m| m.text.contains("crumbles")));

        let mut skeleton = monster("Skeleton", start.x + 1, start.y, 1, 1);
        skeleton.template_id = "skeleton".to_string();
        game.level.as_mut().unwrap().items.clear();
        game.level.as_mut().unwrap().monsters.push(skeleton);
        game.move_player(1, 0);
        assert!(game
            .messages()
            .iter()
            .any(|m| m.text == "The skeleton crumbles to dust!" && m.category == MessageCategory::Lore));
    }

    #[test]
    fn test_attack_adjacent() {
        let mut game = test_game(test_definition(), 3);
        game.move_player(0, 1);
        let level = game.level.as_mut().unwrap();
        level.monsters.push(monster("Bat", 2, 1, 1, 1));
        level.monsters.push(monster("Rat", 2, 2, 1, 1));

        game.attack_adjacent();
        assert!(game.level().unwrap().monsters.is_empty());
    }

    #[test]
    fn test_attack_nothing() {
        let mut game = test_game(test_definition(), 3);
        game.attack_adjacent();
        assert_eq!(game.messages().last().unwrap().text, "You swing at the air!");
    }

    #[test]
    fn test_trap_can_kill() {
        let mut game = test_game(test_definition(), 3);
        game.level.as_mut().unwrap().set_tile(Position::new(2, 1), TileType::Trap);
        game.player.health = 1;

        game.move_player(1, 0);
        assert_eq!(game.state(), &GameState::GameOver { depth: 1, gold: 0 });
        assert_eq!(game.player().position, Position::new(1, 1));

        // Dead players stay put
        game.move_player(0, 1);
        assert_eq!(game.player().position, Position::new(1, 1));
    }

    #[test]
    fn test_trap_is_sprung_once() {
        let mut game = test_game(test_definition(), 3);
        game.level.as_mut().unwrap().set_tile(Position::new(2, 1), TileType::Trap);

        game.move_player(1, 0);
        assert!(game.player().health >= PLAYER_MAX_HEALTH - 3);
        assert_eq!(game.player().position, Position::new(2, 1));
        assert_eq!(game.level().unwrap().tile(Position::new(2, 1)), TileType::Empty);
    }

    #[test]
    fn test_chest_grants_reward() {
        let mut game = test_game(test_definition(), 3);
        game.level.as_mut().unwrap().set_tile(Position::new(2, 1), TileType::Chest);
        game.player.health = 2;

        game.move_player(1, 0);
        let player = game.player();
        assert!(player.gold >= 10 || player.health > 2 || player.damage == PLAYER_DAMAGE + 1);
        assert_eq!(game.level().unwrap().tile(Position::new(2, 1)), TileType::Empty);
    }

    #[test]
    fn test_exit_descends_then_wins() {
        let mut game = test_game(test_definition(), 2);
        game.player.position = Position::new(4, 2);
        game.move_player(1, 0);
        assert_eq!(game.depth(), 2);
        assert!(game.is_playing());

        let exit = game.level().unwrap().exit;
        game.level.as_mut().unwrap().monsters.clear();
        game.player.position = Position::new(exit.x - 1, exit.y);
        game.level.as_mut().unwrap().set_tile(game.player.position, TileType::Empty);
        game.move_player(1, 0);
        assert!(matches!(game.state(), GameState::Victory { .. }));
    }

    #[test]
    fn test_pick_up_items() {
        let mut game = test_game(test_definition(), 3);
        game.player.health = 4;
        let level = game.level.as_mut().unwrap();
        level.items.push(ground_item("currency", 12, Vec::new(), 1, 2));
        level.items.push(ground_item("consumable", 10, vec![effect("heal", 5)], 1, 2));
        level.items.push(ground_item("weapon", 5, vec![effect("damage", 2)], 1, 2));
        level.items.push(ground_item("material", 2, Vec::new(), 1, 2));
        level.items.push(ground_item("material", 2, Vec::new(), 5, 1));

        game.move_player(0, 1);
        let player = game.player();
        assert_eq!(player.gold, 12);
        assert_eq!(player.health, 9);
        assert_eq!(player.damage, PLAYER_DAMAGE + 2);
        assert_eq!(player.inventory, vec!["Thing".to_string()]);
        assert_eq!(game.level().unwrap().items.len(), 1);
    }

    #[test]
    fn test_monsters_close_in() {
        let mut game = test_game(test_definition(), 3);
        game.player.health = 1000;
        game.level.as_mut().unwrap().monsters.push(monster("Slug", 5, 2, 5, 1));

        for _ in 0..50 {
            game.move_monsters();
        }
        let slug = &game.level().unwrap().monsters[0];
        assert_eq!(slug.position.chebyshev_distance(&game.player().position), 1);
        assert!(game.player().health < 1000);
    }

    #[test]
    fn test_monsters_do_not_stack() {
        let mut game = test_game(test_definition(), 3);
        game.player.health = 1000;
        let level = game.level.as_mut().unwrap();
        level.monsters.push(monster("A", 3, 1, 5, 0));
        level.monsters.push(monster("B", 4, 1, 5, 0));

        for _ in 0..50 {
            game.move_monsters();
        }
        let monsters = &game.level().unwrap().monsters;
        assert_ne!(monsters[0].position, monsters[1].position);
    }

    #[test]
    fn test_loot_drops_on_death() {
        let mut def = create_example();
        def.monsters[0].loot_table = vec![crate::dungeon::definition::LootEntry {
            item_id: "bone_shard".to_string(),
            chance: 1.0,
            min_count: 1,
            max_count: 1,
        }];
        let mut game = test_game(def, 3);
        let level = game.level.as_mut().unwrap();
        level.monsters.clear();
        level.items.clear();
        let start = game.player.position;

        let mut skeleton = monster("Skeleton", start.x + 1, start.y, 1, 1);
        skeleton.template_id = "skeleton".to_string();
        game.level.as_mut().unwrap().monsters.push(skeleton);
        game.move_player(1, 0);

        let items = &game.level().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].template_id, "bone_shard");
        assert_eq!(items[0].position, Position::new(start.x + 1, start.y));
    }
}
