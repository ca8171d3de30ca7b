use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogError, LineNo};
use crate::controller::{SessionController, SessionSettings};
use crate::runtime::{AppEvent, AppEventSource, Runner, Ticker};
use crate::session::Phase;
use crate::timer::Scheduler;
use crate::ui;

/// Lines moved by PgUp / PgDn
pub const PAGE_LINES: LineNo = 10;

/// Menu entry that picks a track at random
pub const RANDOM_TRACK: &str = "random";

pub struct App {
    pub controller: SessionController<Box<dyn Scheduler>>,
    menu_index: usize,
    cursor: LineNo,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(
        catalog: Arc<Catalog>,
        settings: SessionSettings,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            controller: SessionController::new(catalog, settings, scheduler),
            menu_index: 0,
            cursor: 1,
            status: None,
            should_quit: false,
        }
    }

    pub fn menu_index(&self) -> usize {
        self.menu_index
    }

    /// 1-based line under the cursor
    pub fn cursor(&self) -> LineNo {
        self.cursor
    }

    /// Last problem worth showing the player, e.g. a rejected track
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Pick a track by id, or any track for `"random"`
    pub fn choose_track(&mut self, id: &str) -> Result<bool, CatalogError> {
        let id = if id == RANDOM_TRACK {
            match self.controller.catalog().random(&mut rand::thread_rng()) {
                Some(track) => track.id().to_string(),
                None => return Err(CatalogError::UnknownTrack(id.to_string())),
            }
        } else {
            id.to_string()
        };

        match self.controller.select_track(&id) {
            Ok(selected) => {
                if selected {
                    self.cursor = 1;
                    self.status = None;
                    if let Some(pos) = self.controller.catalog().ids().iter().position(|i| *i == id)
                    {
                        self.menu_index = pos;
                    }
                }
                Ok(selected)
            }
            Err(err) => {
                self.status = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Apply one event from the runner. Returns true when a redraw is due.
    pub fn on_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => {
                self.on_key(key);
                true
            }
            AppEvent::Resize => true,
            AppEvent::Timer(ev) => self.controller.on_timer(ev),
            AppEvent::Idle => false,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            info!("quit requested");
            self.quit();
            return;
        }

        match self.controller.phase() {
            Phase::SelectingTrack => self.on_menu_key(key),
            Phase::Playing if !self.controller.session().started() => self.on_ready_key(key),
            Phase::Playing => self.on_play_key(key),
            Phase::Submitted => {
                self.move_cursor(key);
            }
            Phase::Finished => {
                if matches!(key.code, KeyCode::Char('r') | KeyCode::Enter) {
                    self.reset();
                } else {
                    self.move_cursor(key);
                }
            }
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        let count = self.controller.catalog().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = self.menu_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.menu_index + 1 < count {
                    self.menu_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.controller.catalog().ids().get(self.menu_index).cloned() {
                    let _ = self.choose_track(&id);
                }
            }
            KeyCode::Char('r') => {
                let _ = self.choose_track(RANDOM_TRACK);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                match self.controller.catalog().ids().get(idx).cloned() {
                    Some(id) => {
                        let _ = self.choose_track(&id);
                    }
                    None => debug!(key = %c, "no track for digit"),
                }
            }
            _ => {}
        }
    }

    fn on_ready_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('s') => {
                self.controller.start();
            }
            KeyCode::Backspace => self.reset(),
            _ => {}
        }
    }

    fn on_play_key(&mut self, key: KeyEvent) {
        if self.move_cursor(key) {
            return;
        }
        match key.code {
            KeyCode::Char(' ') => {
                self.controller.toggle_line(self.cursor);
            }
            KeyCode::Char('x') | KeyCode::Backspace => {
                if self.controller.is_selected(self.cursor) {
                    self.controller.toggle_line(self.cursor);
                }
            }
            KeyCode::Enter => {
                if self.controller.snapshot().selected_lines.is_empty() {
                    debug!("submit needs at least one selected line");
                } else {
                    self.controller.submit();
                }
            }
            _ => {}
        }
    }

    /// Cursor navigation shared by the play and review screens
    fn move_cursor(&mut self, key: KeyEvent) -> bool {
        let last = self.last_line();
        let next = match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.saturating_add(1),
            KeyCode::PageUp => self.cursor.saturating_sub(PAGE_LINES),
            KeyCode::PageDown => self.cursor.saturating_add(PAGE_LINES),
            KeyCode::Home => 1,
            KeyCode::End => last,
            _ => return false,
        };
        self.cursor = next.clamp(1, last);
        true
    }

    fn last_line(&self) -> LineNo {
        self.controller
            .track()
            .map_or(1, |t| (t.line_count() as LineNo).max(1))
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.cursor = 1;
        self.status = None;
    }
}

/// Drive the app until it asks to quit, redrawing after every event that
/// changed something
pub fn run<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> std::io::Result<()> {
    terminal.draw(|f| ui::draw(app, f))?;
    while !app.should_quit() {
        if app.on_event(runner.step()) {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }
    Ok(())
}

/// Resolve the configured track for launch, logging instead of failing
pub fn preselect(app: &mut App, id: &str) {
    if let Err(err) = app.choose_track(id) {
        warn!(track = %id, error = %err, "cannot preselect track");
    }
}
