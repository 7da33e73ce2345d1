//! A listener driven ticking clock
//!
//! The [`TickingClock`] broadcasts the current time to its [`TICK`] listeners
//! with a fixed period. The clock only runs while there is at least one tick
//! listener: adding the first listener starts the timer and removing the
//! last one stops it.
//!
//! The timer re-schedules itself after notifying listeners, so the actual
//! period drifts by the time listeners take to run.
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, span, trace, Instrument, Level};

use crate::object::{now, Timestamp};

mod listeners;
mod stream;

use listeners::Listeners;
pub use listeners::ListenerId;
pub use stream::TickStream;

/// Name of the event carrying clock ticks
pub const TICK: &str = "tick";

/// Default period between ticks
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);

#[derive(Default)]
struct State {
    listeners: Listeners,
    timer: Option<JoinHandle<()>>,
    /// Bumped every time the clock starts or stops. A tick only goes on
    /// while its run is still the current one.
    run: u64,
}

struct Inner {
    period: Duration,
    last_tick: AtomicI64,
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // listeners never run while the lock is held, so the state
        // is still consistent if a previous holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(self: &Arc<Self>, state: &mut State) {
        if state.timer.is_some() {
            return;
        }

        // the timer only keeps a weak reference so dropping the
        // clock also stops it
        let inner = Arc::downgrade(self);
        let period = self.period;
        state.run += 1;
        let run = state.run;
        state.timer = Some(tokio::spawn(
            async move {
                loop {
                    sleep(period).await;
                    let Some(inner) = inner.upgrade() else {
                        break;
                    };
                    inner.tick(run);
                }
            }
            .instrument(span!(Level::TRACE, "clock")),
        ));
        debug!(period_ms = period.as_millis() as u64, "clock started");
    }

    fn stop(&self, state: &mut State) {
        if let Some(timer) = state.timer.take() {
            state.run += 1;
            timer.abort();
            debug!("clock stopped");
        }
    }

    fn tick(&self, run: u64) {
        let now = now();
        let listeners = {
            let state = self.lock();
            if state.run != run {
                return;
            }
            self.last_tick.store(now, Ordering::SeqCst);
            state.listeners.get(TICK)
        };
        trace!(now, listeners = listeners.len(), "tick");

        // listeners run without the lock, so they may be removed or the
        // clock stopped while an earlier listener runs
        for (id, listener) in listeners {
            {
                let state = self.lock();
                if state.run != run {
                    return;
                }
                if !state.listeners.contains(TICK, id) {
                    continue;
                }
            }
            listener(now);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

/// A clock that ticks while someone is listening
///
/// Clones share the same timer and listeners.
#[derive(Clone)]
pub struct TickingClock {
    inner: Arc<Inner>,
}

impl Default for TickingClock {
    fn default() -> Self {
        TickingClock::new(DEFAULT_PERIOD)
    }
}

impl TickingClock {
    /// Create a new idle clock with the given period
    ///
    /// # Panics
    ///
    /// This function will panic if the period is zero
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "clock period must be positive");
        TickingClock {
            inner: Arc::new(Inner {
                period,
                last_tick: AtomicI64::new(now()),
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn key(&self) -> &'static str {
        "clock"
    }

    pub fn name(&self) -> &'static str {
        "Clock"
    }

    pub fn description(&self) -> &'static str {
        "A clock that ticks with the local system time."
    }

    pub fn css_class(&self) -> &'static str {
        "icon-clock"
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    /// Register a listener for the event
    ///
    /// Registering the first [`TICK`] listener starts the clock.
    ///
    /// # Panics
    ///
    /// Starting the clock will panic if called outside of a tokio runtime
    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(Timestamp) + Send + Sync + 'static,
    {
        let mut state = self.inner.lock();
        let (id, first) = state.listeners.add(event, Arc::new(listener));
        trace!(event, %id, "listener added");
        if first && event == TICK {
            self.inner.start(&mut state);
        }
        id
    }

    /// Remove a listener for the event
    ///
    /// Removing the last [`TICK`] listener stops the clock. Returns false if
    /// the listener was not registered for the event.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut state = self.inner.lock();
        match state.listeners.remove(event, id) {
            Some(left) => {
                trace!(event, %id, "listener removed");
                if left == 0 && event == TICK {
                    self.inner.stop(&mut state);
                }
                true
            }
            None => false,
        }
    }

    /// Return the number of listeners for the event
    pub fn listeners(&self, event: &str) -> usize {
        self.inner.lock().listeners.count(event)
    }

    /// Start the clock, doing nothing if already running
    ///
    /// # Panics
    ///
    /// This function will panic if called outside of a tokio runtime
    pub fn start(&self) {
        let mut state = self.inner.lock();
        self.inner.start(&mut state);
    }

    /// Stop the clock, doing nothing if already stopped
    ///
    /// This is meant for forced shutdown, under normal operation the clock
    /// stops when the last tick listener is removed. Listeners are kept.
    pub fn stop(&self) {
        let mut state = self.inner.lock();
        self.inner.stop(&mut state);
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().timer.is_some()
    }

    /// Return the time of the last tick
    ///
    /// If the clock never ticked, this is the time the clock was created.
    pub fn current_value(&self) -> Timestamp {
        self.inner.last_tick.load(Ordering::SeqCst)
    }

    /// Return a stream of ticks
    ///
    /// The stream counts as a tick listener until dropped.
    pub fn ticks(&self) -> TickStream {
        TickStream::new(self.clone())
    }
}
