use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};

use crate::session::{SessionState, TimerMode};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Identifies one tick registration; ticks carry it so stale ones can be dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Ownership of a live repeating tick. Cancelled on `cancel` or drop.
#[derive(Debug)]
pub struct TickHandle {
    id: TickId,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn new(id: TickId, cancelled: Arc<AtomicBool>) -> Self {
        Self { id, cancelled }
    }

    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn cancel(self) {
        // drop does the work
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Something that can fire a repeating tick
pub trait TickScheduler {
    fn register(&mut self, interval: Duration) -> TickHandle;
}

/// Scheduler that never fires on its own; tests deliver ticks by hand and
/// inspect which registrations are still live.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    registrations: Vec<(TickId, Arc<AtomicBool>)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations that have not been cancelled.
    pub fn active(&self) -> usize {
        self.registrations
            .iter()
            .filter(|(_, cancelled)| !cancelled.load(Ordering::SeqCst))
            .count()
    }

    pub fn registered(&self) -> usize {
        self.registrations.len()
    }

    /// Id of the most recent live registration.
    pub fn live_id(&self) -> Option<TickId> {
        self.registrations
            .iter()
            .rev()
            .find(|(_, cancelled)| !cancelled.load(Ordering::SeqCst))
            .map(|(id, _)| *id)
    }
}

impl TickScheduler for ManualScheduler {
    fn register(&mut self, _interval: Duration) -> TickHandle {
        self.next_id += 1;
        let id = TickId(self.next_id);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.registrations.push((id, cancelled.clone()));
        TickHandle::new(id, cancelled)
    }
}

/// Drives the study clock. Holds at most one tick registration, and holds
/// one exactly while the clock is running.
#[derive(Debug)]
pub struct TimerEngine<S: TickScheduler> {
    scheduler: S,
    tick: Option<TickHandle>,
    interval: Duration,
}

impl<S: TickScheduler> TimerEngine<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_interval(scheduler, TICK_INTERVAL)
    }

    pub fn with_interval(scheduler: S, interval: Duration) -> Self {
        Self {
            scheduler,
            tick: None,
            interval,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    pub fn start(&mut self, state: &mut SessionState) {
        if let Some(previous) = self.tick.take() {
            debug!("cancelling tick {:?} before restart", previous.id());
            previous.cancel();
        }
        let handle = self.scheduler.register(self.interval);
        info!("timer started ({}, tick {:?})", state.timer_mode, handle.id());
        self.tick = Some(handle);
        state.running = true;
    }

    pub fn stop(&mut self, state: &mut SessionState) {
        if let Some(handle) = self.tick.take() {
            info!("timer stopped (tick {:?})", handle.id());
            handle.cancel();
        }
        state.running = false;
    }

    pub fn toggle(&mut self, state: &mut SessionState) {
        if state.running {
            self.stop(state);
        } else {
            self.start(state);
        }
    }

    pub fn reset(&mut self, state: &mut SessionState) {
        self.stop(state);
        state.reset_counter();
        info!("timer reset ({})", state.timer_mode);
    }

    pub fn switch_mode(&mut self, state: &mut SessionState, mode: TimerMode) {
        self.stop(state);
        state.timer_mode = mode;
        state.reset_counter();
        info!("timer mode switched to {}", mode);
    }

    /// Advances the clock if `id` belongs to the live registration. Ticks
    /// from cancelled registrations that were already queued are ignored.
    pub fn on_tick(&mut self, state: &mut SessionState, id: TickId) -> bool {
        match &self.tick {
            Some(handle) if handle.id() == id => {
                if state.advance() {
                    info!(
                        "phase flipped to {} ({} min)",
                        state.phase,
                        state.minutes_for(state.phase)
                    );
                }
                true
            }
            _ => {
                trace!("ignoring stale tick {:?}", id);
                false
            }
        }
    }
}
