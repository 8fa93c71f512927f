//! Debounce controller for search input and scroll checks.
//!
//! One reusable wrapper replaces per-call-site timers. Trailing edge is the
//! default: each call supersedes the pending one and only the last call of a
//! burst runs, after `delay` of silence. Leading edge fires on the first call
//! of a burst and drops the rest.
//!
//! Trailing invocations run on a spawned tokio task, so [`Debouncer::call`]
//! must be made from within a tokio runtime.
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Which edge of a burst of calls triggers the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    /// Fire once, `delay` after the last call of a burst.
    #[default]
    Trailing,
    /// Fire on the first call of a burst; later calls within `delay` of the
    /// previous one are dropped.
    Leading,
}

#[derive(Default)]
struct DebounceState {
    pending: Option<JoinHandle<()>>,
    /// Bumped on every trailing call; a timer only fires if it still holds
    /// the latest generation.
    generation: u64,
    last_call: Option<Instant>,
}

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Coalesces rapid-fire calls into a single invocation of a callback.
pub struct Debouncer<A> {
    delay: Duration,
    edge: Edge,
    callback: Callback<A>,
    state: Arc<Mutex<DebounceState>>,
}

impl<A: Send + 'static> Debouncer<A> {
    /// Trailing-edge debouncer.
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::with_edge(delay, Edge::Trailing, callback)
    }

    pub fn with_edge<F>(delay: Duration, edge: Edge, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            delay,
            edge,
            callback: Arc::new(callback),
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register a call. Depending on the edge this either arms (or re-arms)
    /// the timer, or fires immediately.
    pub fn call(&self, args: A) {
        match self.edge {
            Edge::Trailing => self.call_trailing(args),
            Edge::Leading => self.call_leading(args),
        }
    }

    fn call_trailing(&self, args: A) {
        let mut state = self.state.lock();
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        let delay = self.delay;
        let callback = self.callback.clone();
        let shared = self.state.clone();

        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Past this check the burst has had `delay` of silence; a call
            // arriving now starts the next burst and fires on its own timer
            if shared.lock().generation != generation {
                return;
            }
            callback(args);
            // Still pending while the callback runs; a call made from inside
            // it re-arms and must not be cleared here
            let mut state = shared.lock();
            if state.generation == generation {
                state.pending = None;
            }
        }));
    }

    fn call_leading(&self, args: A) {
        let now = Instant::now();
        let fire = {
            let mut state = self.state.lock();
            let quiet = state
                .last_call
                .map_or(true, |last| now.duration_since(last) >= self.delay);
            state.last_call = Some(now);
            quiet
        };

        if fire {
            (self.callback)(args);
        } else {
            tracing::trace!("Debounced call dropped (leading edge)");
        }
    }

    /// Drop a pending trailing invocation, if any.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
    }

    /// Whether a trailing invocation is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
    }
}
