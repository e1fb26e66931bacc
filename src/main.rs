//! CryptCrawl - Entry Point
//!
//! Initializes logging and the terminal, loads the dungeon catalog and runs
//! the main loop.

use std::fs::OpenOptions;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use cryptcrawl::dungeon::Catalog;
use cryptcrawl::game::{Game, GameState};
use cryptcrawl::ui::App;
use cryptcrawl::Config;

/// Target frames per second for the game loop
const TARGET_FPS: u64 = 30;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

fn main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    log::info!("Starting CryptCrawl v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Dungeon directory: {:?}", config.dungeon_dir);

    // Load content before touching the terminal so errors print normally
    let catalog = Catalog::bootstrap(&config.dungeon_dir)
        .with_context(|| format!("failed to load dungeons from {}", config.dungeon_dir.display()))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.debug);
    let mut game = Game::new(catalog, config.max_depth);

    let result = run_game_loop(&mut terminal, &mut app, &mut game);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Game exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("CryptCrawl shut down cleanly");
    result
}

/// Log to a file so output never lands on the game screen
fn init_logging(config: &Config) {
    let default_level = if config.debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    match OpenOptions::new().create(true).write(true).truncate(true).open(&config.log_file) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            // No usable log file: drop records rather than draw over the UI
            eprintln!("Cannot open log file {}: {}", config.log_file.display(), e);
            builder.target(env_logger::Target::Pipe(Box::new(io::sink())));
        }
    }
    builder.init();
}

/// Main game loop
fn run_game_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    game: &mut Game,
) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        // Handle input
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key, game) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }

        terminal.draw(|frame| {
            app.render(frame, game);
        })?;

        if matches!(game.state(), GameState::Quit) {
            break;
        }

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
