use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::{debug, warn};

use crate::timer::{TickHandle, TickId, TickScheduler};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick(TickId),
}

/// Source of app events (keyboard, paste, resize, timer ticks)
pub trait EventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source: a crossterm reader thread feeding a channel that
/// the tick threads share.
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // ignore release/repeat reports on terminals that send them
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(CtEvent::Paste(text)) => AppEvent::Paste(text),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!("terminal event reader stopped: {}", e);
                    break;
                }
            };
            if reader_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// A scheduler whose ticks arrive through this source.
    pub fn tick_scheduler(&self) -> ThreadTickScheduler {
        ThreadTickScheduler::new(self.tx.clone())
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
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

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// One thread per registration. The thread checks its cancel flag right
/// before every send, and exits once cancelled or once the receiver is gone.
#[derive(Debug)]
pub struct ThreadTickScheduler {
    tx: Sender<AppEvent>,
    next_id: u64,
}

impl ThreadTickScheduler {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self { tx, next_id: 0 }
    }
}

impl TickScheduler for ThreadTickScheduler {
    fn register(&mut self, interval: Duration) -> TickHandle {
        self.next_id += 1;
        let id = TickId(self.next_id);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let mut deadline = Instant::now() + interval;
            loop {
                // sleep to a running deadline so the clock does not drift
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                if flag.load(Ordering::SeqCst) || tx.send(AppEvent::Tick(id)).is_err() {
                    break;
                }
                deadline += interval;
            }
            debug!("tick thread {:?} exited", id);
        });

        TickHandle::new(id, cancelled)
    }
}

/// Pulls the next event, waiting at most `poll` for one
pub struct Runner<E: EventSource> {
    event_source: E,
    poll: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, poll: Duration) -> Self {
        Self { event_source, poll }
    }

    pub fn source(&self) -> &E {
        &self.event_source
    }

    /// Returns None on timeout. A disconnected source also yields None; the
    /// production source keeps a sender alive so that only happens in tests.
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.poll) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
