use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::debug;

use crate::timer::{Scheduler, TimerEvent, TimerToken};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Timer(TimerEvent),
    /// nothing arrived within the poll interval
    Idle,
}

/// Source of application events (keyboard, resize, timers)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm. Timer events share the channel;
/// hand [`CrosstermEventSource::sender`] to a [`ChannelScheduler`].
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            let sent = match event::read() {
                // Windows reports both press and release
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    key_tx.send(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => key_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if sent.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Scheduler that sleeps on a helper thread and posts the timer event into
/// the app's event channel.
///
/// Cancelling a token suppresses delivery of anything armed with it or an
/// older token that has not fired yet.
#[derive(Clone, Debug)]
pub struct ChannelScheduler {
    tx: Sender<AppEvent>,
    /// lowest token value still allowed through
    live_from: Arc<AtomicU64>,
}

impl ChannelScheduler {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self {
            tx,
            live_from: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Scheduler for ChannelScheduler {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) {
        let tx = self.tx.clone();
        let live_from = Arc::clone(&self.live_from);

        std::thread::spawn(move || {
            std::thread::sleep(delay);
            if event.token.value() < live_from.load(Ordering::Acquire) {
                debug!(token = event.token.value(), "cancelled timer not delivered");
                return;
            }
            // receiver gone means the app is shutting down
            let _ = tx.send(AppEvent::Timer(event));
        });
    }

    fn cancel(&mut self, token: TimerToken) {
        self.live_from
            .fetch_max(token.value().saturating_add(1), Ordering::AcqRel);
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the poll interval and returns the next event, or Idle on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerKind;
    use std::sync::mpsc;

    fn tick(token: TimerToken) -> TimerEvent {
        TimerEvent {
            token,
            kind: TimerKind::Tick,
        }
    }

    #[test]
    fn step_returns_idle_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Idle
        match runner.step() {
            AppEvent::Idle => {}
            other => panic!("expected Idle on timeout, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            AppEvent::Resize => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn channel_scheduler_delivers_after_delay() {
        let (tx, rx) = mpsc::channel();
        let mut sched = ChannelScheduler::new(tx);
        let token = TimerToken::default();

        sched.schedule(Duration::from_millis(5), tick(token));

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(AppEvent::Timer(ev)) => assert_eq!(ev, tick(token)),
            other => panic!("expected timer event, got {other:?}"),
        }
    }

    #[test]
    fn channel_scheduler_suppresses_cancelled_tokens() {
        let (tx, rx) = mpsc::channel();
        let mut sched = ChannelScheduler::new(tx);
        let old = TimerToken::default();
        let live = old.next();

        sched.schedule(Duration::from_millis(20), tick(old));
        sched.cancel(old);
        sched.schedule(Duration::from_millis(40), tick(live));

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(AppEvent::Timer(ev)) => assert_eq!(ev.token, live),
            other => panic!("expected the live timer event, got {other:?}"),
        }
    }
}
