//! Game state machine
//!
//! Owns the run: which dungeon is being played, the current level, the
//! player and the message log. Turn rules live in `turn.rs`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::level::Level;
use crate::dungeon::{ActionKind, Catalog, DungeonDefinition, Position};
use crate::world::generation::generate_level;

pub const PLAYER_MAX_HEALTH: i32 = 10;
pub const PLAYER_DAMAGE: i32 = 2;

/// Oldest messages are dropped past this many
const MESSAGE_LOG_LIMIT: usize = 100;

/// The main game struct that holds all game data
pub struct Game {
    pub(super) state: GameState,
    /// Loaded dungeon definitions and the selected one
    pub(super) catalog: Catalog,
    pub(super) level: Option<Level>,
    pub(super) player: Player,
    pub(super) rng: StdRng,
    /// Current depth, 1-based
    pub(super) depth: u32,
    pub(super) max_depth: u32,
    pub(super) messages: Vec<GameMessage>,
}

/// All possible game states
#[derive(Debug, Clone, PartialEq)]
pub enum GameState {
    /// Dungeon selection screen
    Title,
    Playing,
    /// Player died
    GameOver { depth: u32, gold: i32 },
    /// Player cleared the final depth
    Victory { gold: i32 },
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    pub gold: i32,
    /// Names of carried items without an immediate use
    pub inventory: Vec<String>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            position: Position::default(),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            damage: PLAYER_DAMAGE,
            gold: 0,
            inventory: Vec::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Restore health up to the maximum, returning the amount gained
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq)]
pub struct GameMessage {
    pub text: String,
    pub category: MessageCategory,
}

/// Categories for message coloring
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageCategory {
    Combat,
    Item,
    System,
    /// Text authored in dungeon events
    Lore,
    Warning,
}

impl Game {
    pub fn new(catalog: Catalog, max_depth: u32) -> Self {
        Self::with_rng(catalog, max_depth, StdRng::from_entropy())
    }

    /// Game driven by a caller-supplied RNG
    pub fn with_rng(catalog: Catalog, max_depth: u32, rng: StdRng) -> Self {
        Self {
            state: GameState::Title,
            catalog,
            level: None,
            player: Player::new(),
            rng,
            depth: 0,
            max_depth: max_depth.max(1),
            messages: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn set_state(&mut self, state: GameState) {
        log::debug!("State transition: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn dungeon(&self) -> Option<&DungeonDefinition> {
        self.catalog.current()
    }

    /// Name shown in the status bar
    pub fn dungeon_name(&self) -> &str {
        self.dungeon().map_or("Uncharted Depths", |d| d.name.as_str())
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn messages(&self) -> &[GameMessage] {
        &self.messages
    }

    pub fn add_message(&mut self, text: impl Into<String>, category: MessageCategory) {
        self.messages.push(GameMessage { text: text.into(), category });
        if self.messages.len() > MESSAGE_LOG_LIMIT {
            let excess = self.messages.len() - MESSAGE_LOG_LIMIT;
            self.messages.drain(..excess);
        }
    }

    // Title screen

    pub fn select_next_dungeon(&mut self) {
        if let Some(def) = self.catalog.next() {
            log::debug!("Selected dungeon '{}'", def.name);
        }
    }

    pub fn select_previous_dungeon(&mut self) {
        if let Some(def) = self.catalog.previous() {
            log::debug!("Selected dungeon '{}'", def.name);
        }
    }

    /// Re-read definitions from disk, keeping the old ones on failure
    pub fn reload_dungeons(&mut self) {
        match self.catalog.reload() {
            Ok(()) => {
                let count = self.catalog.len();
                self.add_message(format!("Reloaded {} dungeons.", count), MessageCategory::System);
            }
            Err(e) => {
                log::warn!("Failed to reload dungeons: {}", e);
                self.add_message(format!("Reload failed: {}", e), MessageCategory::Warning);
            }
        }
    }

    // Run lifecycle

    /// Start a fresh run of the selected dungeon
    pub fn start_run(&mut self) {
        self.player = Player::new();
        self.depth = 1;
        self.messages.clear();
        self.add_message("Welcome to CryptCrawl! Use arrow keys to move.", MessageCategory::System);

        if let Some(def) = self.catalog.current() {
            let (name, description) = (def.name.clone(), def.description.clone());
            log::info!("Starting run in '{}'", name);
            self.add_message(format!("Loaded dungeon: {}", name), MessageCategory::System);
            self.add_message(description, MessageCategory::Lore);
        }

        self.enter_level();
        self.set_state(GameState::Playing);
    }

    /// Go one level deeper, or win when the final depth is cleared
    pub fn descend(&mut self) {
        if self.depth >= self.max_depth {
            self.player_won();
            return;
        }

        self.depth += 1;
        self.add_message(format!("You descend to level {}...", self.depth), MessageCategory::System);
        self.enter_level();
    }

    /// Build the level for the current depth and place the player on it
    ///
    /// Depths covered by the definition use its levels; deeper ones, or a
    /// definition level that fails to generate, get a procedural floor.
    fn enter_level(&mut self) {
        let index = self.depth.saturating_sub(1) as usize;
        let defined = self.catalog.current().map_or(0, |d| d.levels.len());

        let generated = if index < defined {
            match self.catalog.generate_current_level(index, &mut self.rng) {
                Ok(generated) => Some(generated),
                Err(e) => {
                    log::error!("Failed to generate level {}: {}", index, e);
                    None
                }
            }
        } else {
            None
        };
        let from_definition = generated.is_some();
        let (grid, metadata) = generated.unwrap_or_else(|| generate_level(&mut self.rng, self.depth));

        let level = Level::from_generated(&grid, &metadata, self.catalog.current(), &mut self.rng);
        log::info!("Entered depth {} ({})", self.depth, level.name);

        self.player.position = level.start;
        let name = level.name.clone();
        self.level = Some(level);
        self.add_message(format!("Level {}: {}", self.depth, name), MessageCategory::System);

        if from_definition {
            self.fire_events("level_start", &name);
        }
    }

    /// Run the actions of every event listening for `trigger`
    ///
    /// `subject` is what caused the trigger (level name, monster template
    /// id); actions targeting something else are skipped.
    pub(super) fn fire_events(&mut self, trigger: &str, subject: &str) {
        let Some(def) = self.catalog.current() else {
            return;
        };

        let mut texts = Vec::new();
        for event in def.events_for(trigger) {
            log::debug!("Event '{}' fired by {} ({})", event.id, trigger, subject);
            for action in event.actions.iter().filter(|a| a.applies_to(subject)) {
                match &action.kind {
                    ActionKind::Message(text) => texts.push(text.clone()),
                    ActionKind::Sound(id) => log::debug!("Sound cue: {}", id),
                    ActionKind::Other { kind, .. } => log::debug!("Unsupported event action '{}'", kind),
                }
            }
        }

        for text in texts {
            self.add_message(text, MessageCategory::Lore);
        }
    }

    pub fn player_died(&mut self) {
        self.add_message("You died!", MessageCategory::Combat);
        log::info!("Player died at depth {} with {} gold", self.depth, self.player.gold);
        self.set_state(GameState::GameOver { depth: self.depth, gold: self.player.gold });
    }

    pub fn player_won(&mut self) {
        self.add_message("You escaped the dungeon!", MessageCategory::System);
        log::info!("Player won with {} gold", self.player.gold);
        self.set_state(GameState::Victory { gold: self.player.gold });
    }

    /// Back to dungeon selection after a finished run
    pub fn return_to_title(&mut self) {
        self.level = None;
        self.set_state(GameState::Title);
    }

    pub fn quit(&mut self) {
        self.set_state(GameState::Quit);
    }
}
