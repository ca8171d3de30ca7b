use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::catalog::{Catalog, CatalogError, LineNo, Track};
use crate::config::Config;
use crate::scoring::{self, BugFinding, LineMark};
use crate::session::{Phase, Round, Session, Snapshot};
use crate::timer::{Scheduler, TimerEvent, TimerKind, TimerToken};
use crate::util::progress_percent;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 180;
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(3000);
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub time_limit_secs: u32,
    pub reveal_delay: Duration,
    pub tick_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            tick_interval: TICK_INTERVAL,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            time_limit_secs: cfg.time_limit_secs,
            reveal_delay: Duration::from_millis(cfg.reveal_delay_ms),
            tick_interval: TICK_INTERVAL,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubmitTrigger {
    Manual,
    TimeUp,
}

/// Owns the single play-through. Intents that make no sense in the current
/// phase are logged no-ops.
pub struct SessionController<S: Scheduler> {
    catalog: Arc<Catalog>,
    settings: SessionSettings,
    session: Session,
    scheduler: S,
    token: TimerToken,
}

impl<S: Scheduler> SessionController<S> {
    pub fn new(catalog: Arc<Catalog>, settings: SessionSettings, scheduler: S) -> Self {
        let settings = SessionSettings {
            time_limit_secs: settings.time_limit_secs.max(1),
            ..settings
        };
        Self {
            catalog,
            settings,
            session: Session::default(),
            scheduler,
            token: TimerToken::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn track(&self) -> Option<&Arc<Track>> {
        self.session.track()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.session
            .round()
            .map_or(self.settings.time_limit_secs, Round::remaining_secs)
    }

    /// Points scored, 0 until the round is submitted
    pub fn score(&self) -> u32 {
        self.session.score().map_or(0, |s| s.points())
    }

    pub fn is_selected(&self, line: LineNo) -> bool {
        self.session
            .round()
            .is_some_and(|r| r.selected().contains(&line))
    }

    pub fn line_mark(&self, line: LineNo) -> Option<LineMark> {
        self.session.line_mark(line)
    }

    /// Per-bug breakdown, empty until submitted
    pub fn findings(&self) -> Vec<BugFinding<'_>> {
        match &self.session {
            Session::Submitted { round, .. } | Session::Finished { round, .. } => {
                scoring::findings(round.track(), round.selected())
            }
            _ => Vec::new(),
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Token the next timer event must carry to be accepted
    pub fn timer_token(&self) -> TimerToken {
        self.token
    }

    pub fn snapshot(&self) -> Snapshot {
        let remaining_secs = self.remaining_secs();
        Snapshot {
            phase: self.phase(),
            track: self.track().cloned(),
            started: self.session.started(),
            remaining_secs,
            time_limit_secs: self.settings.time_limit_secs,
            selected_lines: self
                .session
                .round()
                .map(|r| r.selected().clone())
                .unwrap_or_default(),
            score: self.score(),
            result: self.session.score(),
            progress_percent: progress_percent(remaining_secs, self.settings.time_limit_secs),
        }
    }

    /// Pick the track for this session.
    ///
    /// Returns `Ok(false)` outside `SelectingTrack`: switching tracks needs a
    /// reset first. Unknown or invalid tracks leave the session untouched.
    pub fn select_track(&mut self, id: &str) -> Result<bool, CatalogError> {
        if self.phase() != Phase::SelectingTrack {
            debug!(track = %id, phase = %self.phase(), "select_track ignored");
            return Ok(false);
        }

        let track = self.catalog.lookup(id).inspect_err(|err| {
            warn!(track = %id, error = %err, "cannot start session for track");
        })?;

        info!(track = %id, bugs = track.bugs().len(), "track selected");
        self.session = Session::Playing {
            round: Round::new(track, self.settings.time_limit_secs),
            started: false,
        };
        Ok(true)
    }

    /// Start the countdown
    pub fn start(&mut self) -> bool {
        if !matches!(self.session, Session::Playing { started: false, .. }) {
            debug!(phase = %self.phase(), "start ignored");
            return false;
        }
        let time_limit = self.settings.time_limit_secs;
        let Session::Playing { round, started } = &mut self.session else {
            return false;
        };
        *started = true;
        round.remaining_secs = time_limit;

        info!(time_limit_secs = time_limit, "countdown started");
        self.arm(TimerKind::Tick, self.settings.tick_interval);
        true
    }

    /// Select `line` if unselected, deselect it otherwise
    pub fn toggle_line(&mut self, line: LineNo) -> bool {
        if !matches!(self.session, Session::Playing { started: true, .. }) {
            debug!(
                line,
                phase = %self.phase(),
                started = self.session.started(),
                "toggle_line ignored"
            );
            return false;
        }
        let Session::Playing { round, .. } = &mut self.session else {
            return false;
        };
        if line == 0 {
            return false;
        }

        if !round.selected.remove(&line) {
            round.selected.insert(line);
        }
        trace!(line, selected = round.selected.len(), "line toggled");
        true
    }

    /// Freeze the score. One-shot: later calls are no-ops.
    pub fn submit(&mut self) -> bool {
        self.submit_with(SubmitTrigger::Manual)
    }

    /// Throw the session away and go back to track selection
    pub fn reset(&mut self) {
        self.retire_timer();
        if self.phase() != Phase::SelectingTrack {
            info!(from = %self.phase(), "session reset");
        }
        self.session = Session::SelectingTrack;
    }

    /// Feed back an event from the scheduler. Stale events are discarded.
    pub fn on_timer(&mut self, event: TimerEvent) -> bool {
        if event.token != self.token {
            trace!(
                token = event.token.value(),
                live = self.token.value(),
                "stale timer event dropped"
            );
            return false;
        }

        match event.kind {
            TimerKind::Tick => self.on_tick(),
            TimerKind::Reveal => self.on_reveal(),
        }
    }

    fn on_tick(&mut self) -> bool {
        let Session::Playing {
            round,
            started: true,
        } = &mut self.session
        else {
            trace!("tick outside active play dropped");
            return false;
        };
        round.remaining_secs = round.remaining_secs.saturating_sub(1);
        let remaining = round.remaining_secs;

        if remaining == 0 {
            self.submit_with(SubmitTrigger::TimeUp)
        } else {
            self.arm(TimerKind::Tick, self.settings.tick_interval);
            true
        }
    }

    fn on_reveal(&mut self) -> bool {
        match std::mem::take(&mut self.session) {
            Session::Submitted { round, score } => {
                self.retire_timer();
                debug!(track = %round.track().id(), "results revealed");
                self.session = Session::Finished { round, score };
                true
            }
            other => {
                self.session = other;
                false
            }
        }
    }

    fn submit_with(&mut self, trigger: SubmitTrigger) -> bool {
        match std::mem::take(&mut self.session) {
            Session::Playing {
                round,
                started: true,
            } => {
                self.retire_timer();
                let score = scoring::score(round.track().defect_lines(), round.selected());
                info!(
                    track = %round.track().id(),
                    ?trigger,
                    found = score.found,
                    total = score.total,
                    points = score.points(),
                    remaining_secs = round.remaining_secs(),
                    "round submitted"
                );
                self.session = Session::Submitted { round, score };
                self.arm(TimerKind::Reveal, self.settings.reveal_delay);
                true
            }
            other => {
                debug!(
                    ?trigger,
                    phase = %other.phase(),
                    started = other.started(),
                    "submit ignored"
                );
                self.session = other;
                false
            }
        }
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.scheduler.schedule(
            delay,
            TimerEvent {
                token: self.token,
                kind,
            },
        );
    }

    /// Cancel whatever is armed and move to a fresh token
    fn retire_timer(&mut self) {
        self.scheduler.cancel(self.token);
        self.token = self.token.next();
    }
}
