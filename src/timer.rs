use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn next(self) -> Self {
        TimerToken(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// one second of the countdown elapsed
    Tick,
    /// the post-submission results delay elapsed
    Reveal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerEvent {
    pub token: TimerToken,
    pub kind: TimerKind,
}

/// Delivers timer events back to the controller after a delay
pub trait Scheduler {
    /// Deliver `event` once `delay` has passed
    fn schedule(&mut self, delay: Duration, event: TimerEvent);

    /// Drop any not yet delivered event armed with `token`
    fn cancel(&mut self, _token: TimerToken) {}
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) {
        (**self).schedule(delay, event)
    }

    fn cancel(&mut self, token: TimerToken) {
        (**self).cancel(token)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub delay: Duration,
    pub event: TimerEvent,
}

/// Scheduler that only queues events; the caller decides when they fire.
///
/// Clones share the same queue, so a test can hand one clone to the
/// controller and keep another to drain.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<VecDeque<Scheduled>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest queued event
    pub fn pop(&self) -> Option<Scheduled> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> Vec<Scheduled> {
        self.queue.borrow().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) {
        self.queue
            .borrow_mut()
            .push_back(Scheduled { delay, event });
    }

    fn cancel(&mut self, token: TimerToken) {
        self.queue
            .borrow_mut()
            .retain(|s| s.event.token != token);
    }
}
