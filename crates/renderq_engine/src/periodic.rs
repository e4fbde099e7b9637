use std::io;
use std::panic;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use renderq_logging::queue_debug;

/// Background activity that invokes an action at a fixed interval.
///
/// The first wait is `interval + startup_delay`; every later wait is just
/// `interval`. Once stopped, the task never starts another invocation, even
/// if a wait was already in progress. An invocation already running is
/// allowed to finish.
///
/// An error returned by the action ends the loop and is handed back by
/// [`PeriodicTask::join`].
pub struct PeriodicTask<E> {
    name: String,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<Result<(), E>>>,
}

/// Stops a [`PeriodicTask`] from another thread, including the task's own.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<TimerState>,
    wake: Condvar,
}

struct TimerState {
    interval: Duration,
    startup_delay: Duration,
    stopped: bool,
    fired: u64,
}

impl<E: Send + 'static> PeriodicTask<E> {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                state: Mutex::new(TimerState {
                    interval,
                    startup_delay: Duration::ZERO,
                    stopped: false,
                    fired: 0,
                }),
                wake: Condvar::new(),
            }),
            handle: None,
        }
    }

    /// Extra delay added to the first wait only.
    pub fn with_startup_delay(self, delay: Duration) -> Self {
        self.shared.lock().startup_delay = delay;
        self
    }

    /// Changes the interval. A wait already in progress keeps its deadline.
    pub fn set_interval(&self, interval: Duration) {
        self.shared.lock().interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.shared.lock().interval
    }

    /// Number of times the action has been started.
    pub fn fired(&self) -> u64 {
        self.shared.lock().fired
    }

    pub fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: self.shared.clone(),
        }
    }

    /// Spawns the timer thread. Calling `start` on a running task is a no-op.
    pub fn start<F>(&mut self, mut action: F) -> io::Result<()>
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
    {
        if self.handle.is_some() {
            return Ok(());
        }
        let shared = self.shared.clone();
        let name = self.name.clone();
        let handle = thread::Builder::new().name(self.name.clone()).spawn(move || {
            while shared.wait_for_next_firing() {
                if let Err(err) = action() {
                    queue_debug!("periodic task {} stopped by a failing action", name);
                    shared.stop();
                    return Err(err);
                }
            }
            Ok(())
        })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Cancels any pending wait.
    ///
    /// A firing that was already due may still begin its invocation; after a
    /// following [`join`](Self::join) returns, no invocation runs or starts.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Waits for the timer thread to finish and returns the action's failure,
    /// if it had one.
    ///
    /// Returns immediately when called from the task's own thread, or when
    /// the task was never started. Call [`stop`](Self::stop) first, otherwise
    /// this waits until the action fails.
    pub fn join(&mut self) -> Result<(), E> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        if handle.thread().id() == thread::current().id() {
            return Ok(());
        }
        match handle.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

impl<E> Drop for PeriodicTask<E> {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

impl StopHandle {
    pub fn stop(&self) {
        self.shared.stop();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        self.lock().stopped = true;
        self.wake.notify_all();
    }

    /// Blocks until the next firing is due. Returns `false` once stopped.
    fn wait_for_next_firing(&self) -> bool {
        let mut state = self.lock();
        let deadline = Instant::now() + state.interval + state.startup_delay;
        loop {
            if state.stopped {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            state = self
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        state.startup_delay = Duration::ZERO;
        state.fired += 1;
        true
    }
}
