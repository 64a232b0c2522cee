use crate::action::Action;
use crate::collection::Identified;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A GitHub identity offered in assignment pickers. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Identified for GitHubUser {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The logged-in account, including its connected Salesforce org details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub org_type: Option<String>,
    #[serde(default)]
    pub sf_username: Option<String>,
    #[serde(default)]
    pub valid_token_for: Option<String>,
    #[serde(default)]
    pub is_devhub_enabled: Option<bool>,
    #[serde(default)]
    pub currently_fetching_repos: bool,
}

impl User {
    pub fn is_connected_to_salesforce(&self) -> bool {
        self.valid_token_for.is_some()
    }
}

pub type UserState = Option<Arc<User>>;

pub fn reduce(user: UserState, action: &Action) -> UserState {
    match action {
        Action::UserLoggedIn(u) => Some(Arc::new(u.clone())),
        Action::UserLoggedOut => None,
        Action::RefreshingRepos => with_fetching_repos(user, true),
        Action::ReposRefreshed | Action::RefreshReposRejected => with_fetching_repos(user, false),
        _ => user,
    }
}

fn with_fetching_repos(user: UserState, fetching: bool) -> UserState {
    match user {
        Some(u) if u.currently_fetching_repos != fetching => Some(Arc::new(User {
            currently_fetching_repos: fetching,
            ..(*u).clone()
        })),
        other => other,
    }
}
