use crate::action::{Action, Object};
use crate::collection::Identified;
use crate::paginated::Paginated;
use crate::types::ObjectType;
use crate::user::GitHubUser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub old_slugs: Vec<String>,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_managed: bool,
    #[serde(default)]
    pub github_users: Vec<GitHubUser>,
}

impl Identified for Repository {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Repository {
    pub fn matches_slug(&self, slug: &str) -> bool {
        self.slug == slug || self.old_slugs.iter().any(|s| s == slug)
    }
}

pub type RepositoriesState = Paginated<Repository>;

pub fn reduce(state: Arc<RepositoriesState>, action: &Action) -> Arc<RepositoriesState> {
    match action {
        Action::UserLoggedOut => Arc::new(RepositoriesState::default()),
        Action::FetchObjectsSucceeded { request, response }
            if request.object_type == ObjectType::Repository =>
        {
            let results = response
                .results
                .iter()
                .filter_map(Object::as_repository)
                .cloned()
                .collect();
            Arc::new(state.with_page(results, response.next.clone(), request.reset))
        }
        Action::FetchObjectSucceeded { request, object }
            if request.object_type == ObjectType::Repository =>
        {
            let repository = object.as_ref().and_then(Object::as_repository).cloned();
            match state.with_fetched(request.filters.slug(), repository) {
                Some(next) => Arc::new(next),
                None => state,
            }
        }
        Action::UpdateObjectSucceeded {
            object: Object::Repository(repository),
            ..
        }
        | Action::ObjectUpdated(Object::Repository(repository)) => {
            match state.with_updated(repository.clone()) {
                Some(next) => Arc::new(next),
                None => state,
            }
        }
        _ => state,
    }
}
