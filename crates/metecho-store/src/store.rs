use crate::action::Action;
use crate::state::AppState;
use std::sync::{Mutex, RwLock};
use tokio::sync::broadcast;

/// Anything actions can be sent to. Orchestration code only ever writes
/// through this seam, so a recording double can stand in for the store.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: Action);
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Shared cache: the current `AppState` plus a broadcast of every action
/// applied to it.
pub struct Store {
    state: RwLock<AppState>,
    events: broadcast::Sender<Action>,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_state(AppState::default())
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: RwLock::new(state),
            events,
        }
    }

    /// A snapshot of the current state. Cheap: slices are shared.
    pub fn state(&self) -> AppState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Receive every action dispatched after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.events.subscribe()
    }
}

impl Dispatch for Store {
    fn dispatch(&self, action: Action) {
        tracing::debug!(action = action.kind(), "dispatch");
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = state.reduce(&action);
        // Sent under the lock so receivers see actions in reduction order.
        // No receivers is fine.
        let _ = self.events.send(action);
    }
}

// ---------------------------------------------------------------------------
// ActionLog
// ---------------------------------------------------------------------------

/// Records dispatched actions in order without a live state.
#[derive(Default)]
pub struct ActionLog {
    actions: Mutex<Vec<Action>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Just the action type names, e.g. `["REFETCH_DATA_STARTED", ...]`.
    pub fn types(&self) -> Vec<&'static str> {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(Action::kind)
            .collect()
    }

    /// The state produced by replaying every recorded action from empty.
    pub fn state(&self) -> AppState {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .fold(AppState::default(), |state, action| state.reduce(action))
    }

    pub fn clear(&self) {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Dispatch for ActionLog {
    fn dispatch(&self, action: Action) {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(action);
    }
}
