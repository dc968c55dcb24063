//! Terminal tile memory runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `tile_memory::term`.
//! When the adapter is enabled, remote clients drive the same session over TCP.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use tile_memory::adapter::{Adapter, JsonScoreStore, SessionBridge};
use tile_memory::core::{GameSession, SessionConfig};
use tile_memory::input::{handle_key_event, should_quit, GridCursor, UiAction};
use tile_memory::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tile_memory::types::{Difficulty, Level, TICK_MS};

struct App {
    session: GameSession,
    cursor: GridCursor,
    difficulty: Difficulty,
    adapter: Option<(Adapter, SessionBridge)>,
}

impl App {
    fn from_env() -> Result<Self> {
        let store = JsonScoreStore::from_env();
        let config = SessionConfig {
            seed: seed_from_env(),
            report_results: flag_from_env("TILE_MEMORY_LOGIN"),
            ..SessionConfig::default()
        };

        let mut session = GameSession::new(config, Box::new(store));
        let level = Level::default();
        let difficulty = Difficulty::default();
        session.load_level(level, difficulty)?;

        let adapter = Adapter::start_from_env()?.map(|a| (a, SessionBridge::new()));

        Ok(Self {
            session,
            cursor: GridCursor::new(level),
            difficulty,
            adapter,
        })
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Move(dir) => self.cursor.step(dir),
            UiAction::Select => {
                self.session.select(self.cursor.index());
            }
            UiAction::Restart => {
                if let Err(e) = self.session.restart() {
                    eprintln!("[Session] Cannot restart: {}", e);
                }
            }
            UiAction::LoadLevel(level) => self.load(level, self.difficulty),
            UiAction::SetDifficulty(difficulty) => {
                self.difficulty = difficulty;
                self.load(self.session.level(), difficulty);
            }
        }
    }

    fn load(&mut self, level: Level, difficulty: Difficulty) {
        if let Err(e) = self.session.load_level(level, difficulty) {
            eprintln!("[Session] Cannot load level {}: {}", level.display_number(), e);
            return;
        }
        self.cursor.resize(level);
    }

    /// Apply queued remote commands, then publish whatever the session emitted.
    fn pump_adapter(&mut self) {
        match self.adapter.as_mut() {
            Some((adapter, bridge)) => {
                while let Some(cmd) = adapter.try_recv() {
                    for msg in bridge.handle(&mut self.session, &cmd) {
                        adapter.send(msg);
                    }
                }
                for msg in bridge.drain(&mut self.session) {
                    adapter.send(msg);
                }
            }
            None => {
                self.session.take_events();
            }
        }

        // Remote loads may change the board shape.
        self.difficulty = self.session.difficulty();
        self.cursor.resize(self.session.level());

        if let Some(e) = self.session.take_store_error() {
            eprintln!("[Session] Best score not saved: {}", e);
        }
    }
}

fn main() -> Result<()> {
    let mut app = App::from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(u64::from(TICK_MS));

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(
            &app.session.snapshot(),
            app.session.pool(),
            Some(app.cursor.index()),
            Viewport::new(w, h),
            &mut fb,
        );
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        app.apply(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            app.session.tick(u64::from(TICK_MS));
        }

        app.pump_adapter();
    }
}

fn seed_from_env() -> u32 {
    std::env::var("TILE_MEMORY_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
}

fn flag_from_env(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
