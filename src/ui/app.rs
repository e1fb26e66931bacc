//! Main UI Application
//!
//! Routes key presses to the game and draws whichever screen the game
//! state calls for.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::dungeon::Position;
use crate::game::{Game, GameState, Level, MessageCategory};
use crate::world::TileType;

/// Cells around the player that are drawn when the map is not revealed
pub const VISIBILITY_RADIUS: i32 = 5;

/// Messages shown under the map
const VISIBLE_MESSAGES: usize = 3;

const PLAYER_COLOR: Color = Color::Rgb(255, 255, 0);

const HELP_LINES: [(&str, &str); 4] = [
    ("↑/w/k ↓/s/j ←/a/h →/d/l", "move / attack"),
    ("space", "attack adjacent monsters"),
    ("?", "toggle help"),
    ("q/ctrl+c", "quit"),
];

/// Main UI application
pub struct App {
    /// Draw the whole level instead of the area around the player
    reveal_map: bool,
    show_help: bool,
}

impl App {
    pub fn new(reveal_map: bool) -> Self {
        if reveal_map {
            log::info!("Map reveal enabled");
        }
        Self { reveal_map, show_help: false }
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Handle a key press; returns true when the application should exit
    pub fn handle_input(&mut self, key: KeyEvent, game: &mut Game) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            game.quit();
            return Ok(true);
        }

        let quit = match game.state().clone() {
            GameState::Title => self.handle_title_input(key, game)?,
            GameState::Playing => self.handle_playing_input(key, game)?,
            GameState::GameOver { .. } | GameState::Victory { .. } => self.handle_end_input(key, game)?,
            GameState::Quit => true,
        };
        Ok(quit || *game.state() == GameState::Quit)
    }

    fn handle_title_input(&mut self, key: KeyEvent, game: &mut Game) -> Result<bool> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('n') => game.start_run(),
            KeyCode::Char('[') => game.select_previous_dungeon(),
            KeyCode::Char(']') => game.select_next_dungeon(),
            KeyCode::Char('r') => game.reload_dungeons(),
            KeyCode::Char('q') | KeyCode::Esc => game.quit(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_playing_input(&mut self, key: KeyEvent, game: &mut Game) -> Result<bool> {
        match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => game.move_player(0, -1),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => game.move_player(0, 1),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => game.move_player(-1, 0),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => game.move_player(1, 0),
            KeyCode::Char(' ') => game.attack_adjacent(),
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('q') => game.quit(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_end_input(&mut self, key: KeyEvent, game: &mut Game) -> Result<bool> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => game.return_to_title(),
            KeyCode::Char('q') => game.quit(),
            _ => {}
        }
        Ok(false)
    }

    pub fn render(&self, frame: &mut Frame, game: &Game) {
        frame.render_widget(Clear, frame.area());

        match game.state() {
            GameState::Title => self.render_title(frame, game),
            GameState::Playing => self.render_playing(frame, game),
            GameState::GameOver { depth, gold } => self.render_game_over(frame, *depth, *gold),
            GameState::Victory { gold } => self.render_victory(frame, *gold),
            GameState::Quit => {}
        }
    }

    fn render_title(&self, frame: &mut Frame, game: &Game) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(8), Constraint::Length(3)])
            .split(frame.area());

        let banner = [
            r"  ___               _    ___                 _ ",
            r" / __|_ _ _  _ _ __| |_ / __|_ _ __ ___ __ _| |",
            r"| (__| '_| || | '_ \  _| (__| '_/ _` \ V  V / |",
            r" \___|_|  \_, | .__/\__|\___|_| \__,_|\_/\_/|_|",
            r"          |__/|_|                              ",
        ];
        let mut title: Vec<Line> = banner
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let shade = 200 - (i as u8) * 25;
                Line::from(Span::styled(*row, Style::default().fg(Color::Rgb(shade, shade, shade / 2))))
            })
            .collect();
        title.insert(0, Line::from(""));
        frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), chunks[0]);

        let catalog = game.catalog();
        let mut body = Vec::new();
        match game.dungeon() {
            Some(def) => {
                body.push(Line::from(Span::styled(
                    format!("< {} >", def.name),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )));
                body.push(Line::from(Span::styled(
                    format!("{} of {}", catalog.current_index() + 1, catalog.len()),
                    Style::default().fg(Color::DarkGray),
                )));
                body.push(Line::from(""));
                body.push(Line::from(def.description.as_str()));
                body.push(Line::from(""));
                let author = if def.author.is_empty() { "unknown" } else { def.author.as_str() };
                body.push(Line::from(Span::styled(
                    format!("by {} · v{} · {} levels", author, def.version, def.levels.len()),
                    Style::default().fg(Color::Gray),
                )));
            }
            None => body.push(Line::from(Span::styled(
                "No dungeons loaded",
                Style::default().fg(Color::LightRed),
            ))),
        }
        if let Some(msg) = game.messages().last() {
            body.push(Line::from(""));
            body.push(Line::from(Span::styled(msg.text.as_str(), Style::default().fg(message_color(msg.category)))));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Dungeons ({}) ", catalog.base_path().display()))
            .border_style(Style::default().fg(Color::DarkGray));
        let para = Paragraph::new(body).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(block);
        frame.render_widget(para, chunks[1]);

        let keys = Paragraph::new("[Enter] Start   [ / ] Select   [R] Reload   [Q] Quit")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        frame.render_widget(keys, chunks[2]);
    }

    fn render_playing(&self, frame: &mut Frame, game: &Game) {
        let help_height = if self.show_help { HELP_LINES.len() as u16 + 2 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(VISIBLE_MESSAGES as u16 + 2),
                Constraint::Length(help_height),
            ])
            .split(frame.area());

        self.render_map(frame, game, chunks[0]);
        self.render_status(frame, game, chunks[1]);
        self.render_messages(frame, game, chunks[2]);
        if self.show_help {
            self.render_help(frame, chunks[3]);
        }
    }

    fn render_map(&self, frame: &mut Frame, game: &Game, area: Rect) {
        let Some(level) = game.level() else {
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", level.name))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Center the camera on the player
        let player = game.player().position;
        let view_width = inner.width as i32;
        let view_height = inner.height as i32;
        let cam_x = player.x - view_width / 2;
        let cam_y = player.y - view_height / 2;

        let buf = frame.buffer_mut();
        for screen_y in 0..view_height {
            for screen_x in 0..view_width {
                let pos = Position::new(cam_x + screen_x, cam_y + screen_y);
                let cell = &mut buf[(inner.x + screen_x as u16, inner.y + screen_y as u16)];

                if !level.in_bounds(pos) || !is_visible(player, pos, self.reveal_map) {
                    cell.set_char(' ');
                    continue;
                }

                let (ch, fg, bg, bold) = cell_appearance(level, pos, player);
                cell.set_char(ch);
                cell.set_fg(fg);
                if let Some(bg) = bg {
                    cell.set_bg(bg);
                }
                if bold {
                    cell.set_style(Style::default().add_modifier(Modifier::BOLD));
                }
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, game: &Game, area: Rect) {
        let player = game.player();
        let status = Line::from(vec![
            Span::styled(
                format!("HP {}/{}", player.health, player.max_health),
                Style::default().fg(Color::Rgb(255, 0, 0)),
            ),
            Span::raw(" | "),
            Span::styled(format!("Gold {}", player.gold), Style::default().fg(Color::Rgb(255, 255, 0))),
            Span::raw(" | "),
            Span::styled(
                format!("Level {}/{}", game.depth(), game.max_depth()),
                Style::default().fg(Color::Rgb(0, 255, 0)),
            ),
            Span::raw(" | "),
            Span::styled(game.dungeon_name(), Style::default().fg(Color::Gray)),
            Span::styled(format!("   DMG {}", player.damage), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_messages(&self, frame: &mut Frame, game: &Game, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Messages ")
            .border_style(Style::default().fg(Color::DarkGray));

        let messages: Vec<Line> = game
            .messages()
            .iter()
            .rev()
            .take(VISIBLE_MESSAGES)
            .rev()
            .map(|msg| Line::from(Span::styled(&msg.text, Style::default().fg(message_color(msg.category)))))
            .collect();

        frame.render_widget(Paragraph::new(messages).block(block), area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = HELP_LINES
            .iter()
            .map(|(keys, action)| {
                Line::from(vec![
                    Span::styled(format!("{:>26}  ", keys), Style::default().fg(Color::Yellow)),
                    Span::raw(*action),
                ])
            })
            .collect();
        let block = Block::default().borders(Borders::ALL).title(" Keys ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_game_over(&self, frame: &mut Frame, depth: u32, gold: i32) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("You reached level {} and collected {} gold.", depth, gold)),
            Line::from(""),
            Line::from(Span::styled("Press [Enter] to continue, [Q] to quit", Style::default().fg(Color::Gray))),
        ];
        frame.render_widget(end_screen(text), frame.area());
    }

    fn render_victory(&self, frame: &mut Frame, gold: i32) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("VICTORY!", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("You escaped the dungeon with {} gold!", gold)),
            Line::from(""),
            Line::from(Span::styled("Press [Enter] to continue, [Q] to quit", Style::default().fg(Color::Gray))),
        ];
        frame.render_widget(end_screen(text), frame.area());
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Whether `pos` is drawn for a player standing at `player`
pub fn is_visible(player: Position, pos: Position, reveal_map: bool) -> bool {
    reveal_map || player.chebyshev_distance(&pos) <= VISIBILITY_RADIUS
}

/// Glyph, colors and boldness of one map cell; the player draws over
/// monsters, monsters over items, items over terrain
fn cell_appearance(level: &Level, pos: Position, player: Position) -> (char, Color, Option<Color>, bool) {
    let tile = level.tile(pos);
    let bg = tile.bg_color().map(rgb);

    if pos == player {
        return (TileType::Player.symbol(), PLAYER_COLOR, bg, true);
    }
    if let Some(monster) = level.monsters.iter().find(|m| m.position == pos) {
        return (monster.glyph, rgb(monster.color), bg, true);
    }
    if let Some(item) = level.items.iter().find(|i| i.position == pos) {
        return (item.glyph, rgb(item.color), bg, false);
    }
    (tile.symbol(), rgb(tile.fg_color()), bg, tile.is_emphasized())
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn message_color(category: MessageCategory) -> Color {
    match category {
        MessageCategory::Combat => Color::Red,
        MessageCategory::Item => Color::Yellow,
        MessageCategory::System => Color::Cyan,
        MessageCategory::Lore => Color::Magenta,
        MessageCategory::Warning => Color::LightRed,
    }
}

fn end_screen(text: Vec<Line<'_>>) -> Paragraph<'_> {
    Paragraph::new(text).alignment(Alignment::Center).block(Block::default().borders(Borders::ALL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{create_example, Catalog};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn game_with(names: &[&str]) -> Game {
        let defs = names
            .iter()
            .map(|name| {
                let mut def = create_example();
                def.name = name.to_string();
                def
            })
            .collect();
        Game::with_rng(Catalog::from_definitions("unused", defs), 3, StdRng::seed_from_u64(3))
    }

    fn screen_text(app: &App, game: &Game) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.render(frame, game)).unwrap();
        terminal.backend().buffer().content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_visibility_radius() {
        let player = Position::new(10, 10);
        assert!(is_visible(player, Position::new(15, 5), false));
        assert!(!is_visible(player, Position::new(16, 10), false));
        assert!(is_visible(player, Position::new(60, 2), true));
    }

    #[test]
    fn test_title_selection_keys() {
        let mut app = App::default();
        let mut game = game_with(&["First", "Second"]);

        app.handle_input(key(KeyCode::Char(']')), &mut game).unwrap();
        assert_eq!(game.dungeon_name(), "Second");
        app.handle_input(key(KeyCode::Char('[')), &mut game).unwrap();
        assert_eq!(game.dungeon_name(), "First");

        app.handle_input(key(KeyCode::Enter), &mut game).unwrap();
        assert!(game.is_playing());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::default();
        let mut game = game_with(&["Only"]);
        assert!(app.handle_input(key(KeyCode::Char('q')), &mut game).unwrap());

        let mut game = game_with(&["Only"]);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.handle_input(ctrl_c, &mut game).unwrap());
    }

    #[test]
    fn test_help_toggle() {
        let mut app = App::default();
        let mut game = game_with(&["Only"]);
        game.start_run();

        assert!(!app.show_help());
        app.handle_input(key(KeyCode::Char('?')), &mut game).unwrap();
        assert!(app.show_help());
        assert!(screen_text(&app, &game).contains("toggle help"));
    }

    #[test]
    fn test_render_title() {
        let app = App::default();
        let game = game_with(&["Bone Pit"]);
        let text = screen_text(&app, &game);
        assert!(text.contains("Bone Pit"));
        assert!(text.contains("[Enter] Start"));
    }

    #[test]
    fn test_render_playing_status() {
        let app = App::default();
        let mut game = game_with(&["Bone Pit"]);
        game.start_run();

        let text = screen_text(&app, &game);
        assert!(text.contains("HP 10/10"));
        assert!(text.contains("Gold 0"));
        assert!(text.contains("Level 1/3"));
        assert!(text.contains("Bone Pit"));
        assert!(text.contains('@'));
        // Last message of the level start
        assert!(text.contains("You enter the forgotten crypt."));
    }

    #[test]
    fn test_render_end_screens() {
        let mut app = App::default();
        let mut game = game_with(&["Only"]);
        game.start_run();

        game.set_state(GameState::GameOver { depth: 2, gold: 15 });
        assert!(screen_text(&app, &game).contains("You reached level 2 and collected 15 gold."));

        game.set_state(GameState::Victory { gold: 40 });
        assert!(screen_text(&app, &game).contains("You escaped the dungeon with 40 gold!"));

        app.handle_input(key(KeyCode::Enter), &mut game).unwrap();
        assert_eq!(game.state(), &GameState::Title);
    }
}
