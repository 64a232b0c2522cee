//! Fetch-if-missing helpers: resolve a slug from the cache, asking the
//! server only when the cache cannot answer yet.

use crate::client::Client;
use crate::error::Result;
use metecho_store::action::{Object, ObjectRequest, ObjectsRequest};
use metecho_store::project::Project;
use metecho_store::repository::Repository;
use metecho_store::selectors::{self, Lookup, Slugged};
use metecho_store::task::Task;
use metecho_store::types::{Filters, ObjectType};
use metecho_store::Store;
use std::sync::Arc;

/// Resolve a cache lookup after asking the server. The cache keeps its
/// own copy of an id it already knows, so when that copy is stale the
/// object the server returned answers instead. Anything still unresolved
/// is a miss.
fn settle<T: Slugged + Clone>(lookup: Lookup<T>, fetched: Option<&T>, slug: &str) -> Lookup<T> {
    match (lookup, fetched) {
        (Lookup::Found(found), _) => Lookup::Found(found),
        (_, Some(object)) if object.matches_slug(slug) => Lookup::Found(Arc::new(object.clone())),
        _ => Lookup::NotFound,
    }
}

impl Client {
    pub async fn fetch_repository_if_missing(
        &self,
        store: &Store,
        slug: &str,
    ) -> Result<Lookup<Repository>> {
        let lookup = selectors::repository_by_slug(&store.state(), slug);
        if !lookup.is_loading() {
            return Ok(lookup);
        }
        let filters = Filters::new().with("slug", slug);
        let object = self
            .fetch_object(store, ObjectRequest::new(ObjectType::Repository, filters))
            .await?;
        Ok(settle(
            selectors::repository_by_slug(&store.state(), slug),
            object.as_ref().and_then(Object::as_repository),
            slug,
        ))
    }

    pub async fn fetch_project_if_missing(
        &self,
        store: &Store,
        repository: &Repository,
        slug: &str,
    ) -> Result<Lookup<Project>> {
        let lookup = selectors::project_by_slug(&store.state(), &repository.id, slug);
        if !lookup.is_loading() {
            return Ok(lookup);
        }
        let filters = Filters::new()
            .with("repository", repository.id.as_str())
            .with("slug", slug);
        let object = self
            .fetch_object(store, ObjectRequest::new(ObjectType::Project, filters))
            .await?;
        Ok(settle(
            selectors::project_by_slug(&store.state(), &repository.id, slug),
            object.as_ref().and_then(Object::as_project),
            slug,
        ))
    }

    /// The project's tasks, fetched once per session.
    pub async fn fetch_tasks_if_missing(
        &self,
        store: &Store,
        project: &Project,
    ) -> Result<Vec<Arc<Task>>> {
        if let Some(tasks) = selectors::tasks_for_project(&store.state(), &project.id) {
            return Ok(tasks);
        }
        let filters = Filters::new().with("project", project.id.as_str());
        self.fetch_objects(store, ObjectsRequest::new(ObjectType::Task, filters))
            .await?;
        Ok(selectors::tasks_for_project(&store.state(), &project.id).unwrap_or_default())
    }
}
