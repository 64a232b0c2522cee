use crate::action::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A user-visible failure notice, e.g. `"Internal Server Error"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub id: String,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
        }
    }
}

pub type ErrorsState = Vec<ApiError>;

/// Errors are global notices: they survive logout and are only removed
/// explicitly.
pub fn reduce(errors: Arc<ErrorsState>, action: &Action) -> Arc<ErrorsState> {
    match action {
        Action::ErrorAdded(error) => {
            let mut next = (*errors).clone();
            next.push(error.clone());
            Arc::new(next)
        }
        Action::ErrorRemoved(id) if errors.iter().any(|e| &e.id == id) => {
            Arc::new(errors.iter().filter(|e| &e.id != id).cloned().collect())
        }
        _ => errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove() {
        let state = Arc::new(ErrorsState::new());
        let error = ApiError::new("Internal Server Error");
        let state = reduce(state, &Action::ErrorAdded(error.clone()));
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].message, "Internal Server Error");

        let state = reduce(state, &Action::ErrorRemoved(error.id.clone()));
        assert!(state.is_empty());
    }

    #[test]
    fn unknown_id_keeps_identity() {
        let state = reduce(
            Arc::new(ErrorsState::new()),
            &Action::ErrorAdded(ApiError::new("x")),
        );
        let next = reduce(Arc::clone(&state), &Action::ErrorRemoved("nope".into()));
        assert!(Arc::ptr_eq(&state, &next));
        let next = reduce(Arc::clone(&state), &Action::UserLoggedOut);
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ApiError::new("a").id, ApiError::new("a").id);
    }
}
