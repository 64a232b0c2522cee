//! Read-side helpers over `AppState`: what a detail or list page would show.

use crate::collection::Identified;
use crate::org::ScratchOrg;
use crate::paginated::Paginated;
use crate::project::Project;
use crate::repository::Repository;
use crate::state::AppState;
use crate::task::Task;
use crate::user::GitHubUser;
use std::collections::HashSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Outcome of resolving a slug against the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Not cached yet and not known to be missing; a fetch is warranted.
    Loading,
    /// The server confirmed no object has this slug.
    NotFound,
    Found(Arc<T>),
}

impl<T> Lookup<T> {
    pub fn found(&self) -> Option<&Arc<T>> {
        match self {
            Lookup::Found(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Lookup::Loading)
    }
}

/// Objects that carry a current slug.
pub trait Slugged {
    fn slug(&self) -> &str;
    fn matches_slug(&self, slug: &str) -> bool;
}

impl Slugged for Repository {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches_slug(&self, slug: &str) -> bool {
        Repository::matches_slug(self, slug)
    }
}

impl Slugged for Project {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches_slug(&self, slug: &str) -> bool {
        Project::matches_slug(self, slug)
    }
}

impl Slugged for Task {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches_slug(&self, slug: &str) -> bool {
        Task::matches_slug(self, slug)
    }
}

impl<T: Slugged> Lookup<T> {
    /// The current slug when the object was reached through an old one.
    pub fn needs_redirect(&self, requested_slug: &str) -> Option<&str> {
        match self {
            Lookup::Found(item) if item.slug() != requested_slug => Some(item.slug()),
            _ => None,
        }
    }
}

fn lookup_in<T: Identified + Slugged + Clone>(container: &Paginated<T>, slug: &str) -> Lookup<T> {
    if let Some(item) = container.items.find(|item| item.matches_slug(slug)) {
        return Lookup::Found(Arc::clone(item));
    }
    if container.is_not_found(slug) {
        return Lookup::NotFound;
    }
    Lookup::Loading
}

pub fn repository_by_slug(state: &AppState, slug: &str) -> Lookup<Repository> {
    lookup_in(&state.repositories, slug)
}

pub fn project_by_slug(state: &AppState, repository: &str, slug: &str) -> Lookup<Project> {
    match state.projects.get(repository) {
        Some(container) => lookup_in(container, slug),
        None => Lookup::Loading,
    }
}

/// `None` until the project's task list has been fetched.
pub fn tasks_for_project(state: &AppState, project: &str) -> Option<Vec<Arc<Task>>> {
    let container = state.tasks.get(project)?;
    if !container.fetched {
        return None;
    }
    Some(container.items.iter().cloned().collect())
}

// ---------------------------------------------------------------------------
// Project and org status
// ---------------------------------------------------------------------------

pub fn project_ready_to_submit(project: &Project) -> bool {
    project.has_unmerged_commits && project.pr_url.is_none()
}

pub fn project_submitting(project: &Project) -> bool {
    project.currently_creating_pr
}

/// Client-side operations in flight against an org.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrgActivity {
    pub deleting: bool,
    pub refreshing_changes: bool,
    pub reassigning: bool,
}

pub fn org_busy(org: &ScratchOrg, owned_by_current_user: bool, activity: OrgActivity) -> bool {
    activity.deleting
        || activity.refreshing_changes
        || activity.reassigning
        || (owned_by_current_user && org.currently_capturing_changes)
}

/// Repository users not already assigned, in repository order.
pub fn available_users<'a>(
    repository: &'a Repository,
    assigned: &[GitHubUser],
) -> Vec<&'a GitHubUser> {
    let taken: HashSet<&str> = assigned.iter().map(|u| u.id.as_str()).collect();
    repository
        .github_users
        .iter()
        .filter(|u| !taken.contains(u.id.as_str()))
        .collect()
}
