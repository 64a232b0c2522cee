use crate::action::Action;
use crate::api_error::{self, ErrorsState};
use crate::org::{self, OrgsState};
use crate::project::{self, ProjectsState};
use crate::repository::{self, RepositoriesState};
use crate::task::{self, TasksState};
use crate::user::{self, UserState};
use serde::Serialize;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The whole client cache. Every slice sits behind an `Arc`, so cloning the
/// state is cheap and unchanged slices compare equal by pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub user: UserState,
    pub repositories: Arc<RepositoriesState>,
    pub projects: Arc<ProjectsState>,
    pub tasks: Arc<TasksState>,
    pub orgs: Arc<OrgsState>,
    pub errors: Arc<ErrorsState>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next state. Pure: `self` is left untouched.
    pub fn reduce(&self, action: &Action) -> AppState {
        AppState {
            user: user::reduce(self.user.clone(), action),
            repositories: repository::reduce(Arc::clone(&self.repositories), action),
            projects: project::reduce(Arc::clone(&self.projects), action),
            tasks: task::reduce(Arc::clone(&self.tasks), action),
            orgs: org::reduce(Arc::clone(&self.orgs), action),
            errors: api_error::reduce(Arc::clone(&self.errors), action),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
