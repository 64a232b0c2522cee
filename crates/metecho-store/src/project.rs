use crate::action::{Action, Object};
use crate::collection::Identified;
use crate::paginated::{update_parent, ByParent};
use crate::types::ObjectType;
use crate::user::GitHubUser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Parent repository id.
    pub repository: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub old_slugs: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub branch_url: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub currently_creating_pr: bool,
    #[serde(default)]
    pub has_unmerged_commits: bool,
    #[serde(default)]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub github_users: Vec<GitHubUser>,
}

impl Identified for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Project {
    pub fn matches_slug(&self, slug: &str) -> bool {
        self.slug == slug || self.old_slugs.iter().any(|s| s == slug)
    }
}

/// Projects keyed by repository id.
pub type ProjectsState = ByParent<Project>;

pub fn reduce(projects: Arc<ProjectsState>, action: &Action) -> Arc<ProjectsState> {
    match action {
        Action::UserLoggedOut => Arc::new(ProjectsState::new()),
        Action::FetchObjectsSucceeded { request, response }
            if request.object_type == ObjectType::Project =>
        {
            let Some(repository) = request.filters.repository() else {
                return projects;
            };
            let results: Vec<Project> = response
                .results
                .iter()
                .filter_map(Object::as_project)
                .cloned()
                .collect();
            let next = response.next.clone();
            update_parent(projects, repository, |current| {
                Some(current.with_page(results, next, request.reset))
            })
        }
        Action::CreateObjectSucceeded {
            object: Object::Project(project),
            ..
        } => update_parent(projects, &project.repository, |current| {
            current.with_created(project.clone())
        }),
        Action::FetchObjectSucceeded { request, object }
            if request.object_type == ObjectType::Project =>
        {
            let Some(repository) = request.filters.repository() else {
                return projects;
            };
            match object.as_ref().and_then(Object::as_project) {
                None => update_parent(projects, repository, |current| {
                    current.with_fetched(request.filters.slug(), None)
                }),
                Some(project) => update_parent(projects, &project.repository, |current| {
                    current.with_fetched(request.filters.slug(), Some(project.clone()))
                }),
            }
        }
        Action::UpdateObjectSucceeded {
            object: Object::Project(project),
            ..
        }
        | Action::ObjectUpdated(Object::Project(project)) => {
            update_parent(projects, &project.repository, |current| {
                current.with_updated(project.clone())
            })
        }
        _ => projects,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{CreateRequest, ObjectRequest, ObjectsRequest};
    use crate::types::{Filters, Page};

    fn project(id: &str, repository: &str) -> Project {
        Project {
            id: id.into(),
            repository: repository.into(),
            name: format!("Project {id}"),
            slug: format!("project-{id}"),
            old_slugs: vec![],
            description: String::new(),
            branch_url: None,
            branch_name: None,
            currently_creating_pr: false,
            has_unmerged_commits: false,
            pr_url: None,
            github_users: vec![],
        }
    }

    fn fetched(repository: &str, ids: &[&str], next: Option<&str>, reset: bool) -> Action {
        let filters = Filters::new().with("repository", repository);
        let request = ObjectsRequest {
            reset,
            ..ObjectsRequest::new(ObjectType::Project, filters)
        };
        Action::FetchObjectsSucceeded {
            request,
            response: Page {
                next: next.map(String::from),
                results: ids
                    .iter()
                    .map(|id| Object::Project(project(id, repository)))
                    .collect(),
            },
        }
    }

    fn created(p: Project) -> Action {
        Action::CreateObjectSucceeded {
            request: CreateRequest::new(ObjectType::Project, serde_json::json!({})),
            object: Object::Project(p),
        }
    }

    fn ids(state: &ProjectsState, repository: &str) -> Vec<String> {
        state[repository]
            .items
            .ids()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn logout_returns_empty_state() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1"], None, true));
        let state = reduce(state, &Action::UserLoggedOut);
        assert!(state.is_empty());
    }

    #[test]
    fn reset_replaces_list_and_cursor() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1", "p2"], Some("next-url"), true));
        let state = reduce(state, &fetched("r1", &["p3"], None, true));
        assert_eq!(ids(&state, "r1"), vec!["p3"]);
        assert_eq!(state["r1"].next, None);
        assert!(state["r1"].fetched);
    }

    #[test]
    fn repeated_pages_never_duplicate_ids() {
        let mut state: Arc<ProjectsState> = Arc::default();
        state = reduce(state, &fetched("r1", &["p1", "p2"], Some("n2"), true));
        for _ in 0..3 {
            state = reduce(state, &fetched("r1", &["p2", "p3"], None, false));
        }
        state = reduce(state, &fetched("r1", &["p1", "p4", "p4"], None, false));
        assert_eq!(ids(&state, "r1"), vec!["p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn create_prepends_new_project() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1"], None, true));
        let state = reduce(state, &created(project("p2", "r1")));
        assert_eq!(ids(&state, "r1"), vec!["p2", "p1"]);
    }

    #[test]
    fn create_into_unknown_repository_starts_empty_container() {
        let state = reduce(Arc::default(), &created(project("p1", "r9")));
        assert_eq!(ids(&state, "r9"), vec!["p1"]);
        assert!(!state["r9"].fetched);
    }

    #[test]
    fn duplicate_create_is_ignored() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1", "p2"], None, true));
        let mut dup = project("p2", "r1");
        dup.name = "Renamed".into();
        let next = reduce(Arc::clone(&state), &created(dup));
        assert!(Arc::ptr_eq(&state, &next));
        assert_eq!(ids(&next, "r1"), vec!["p1", "p2"]);
        assert_eq!(next["r1"].items.get("p2").unwrap().name, "Project p2");
    }

    #[test]
    fn fetch_missing_project_records_slug() {
        let filters = Filters::new().with("repository", "r1").with("slug", "nope");
        let action = Action::FetchObjectSucceeded {
            request: ObjectRequest::new(ObjectType::Project, filters),
            object: None,
        };
        let state = reduce(Arc::default(), &action);
        assert_eq!(state["r1"].not_found, vec!["nope".to_string()]);
        assert!(state["r1"].items.is_empty());
    }

    #[test]
    fn fetch_single_project_appends_when_unknown() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1"], None, true));
        let filters = Filters::new().with("repository", "r1").with("slug", "project-p2");
        let action = Action::FetchObjectSucceeded {
            request: ObjectRequest::new(ObjectType::Project, filters),
            object: Some(Object::Project(project("p2", "r1"))),
        };
        let state = reduce(state, &action);
        assert_eq!(ids(&state, "r1"), vec!["p1", "p2"]);

        let again = reduce(Arc::clone(&state), &action);
        assert!(Arc::ptr_eq(&state, &again));
    }

    #[test]
    fn fetch_without_repository_filter_is_ignored() {
        let state: Arc<ProjectsState> = Arc::default();
        let action = Action::FetchObjectSucceeded {
            request: ObjectRequest::new(ObjectType::Project, Filters::new().with("slug", "x")),
            object: None,
        };
        assert!(Arc::ptr_eq(&state, &reduce(Arc::clone(&state), &action)));
    }

    #[test]
    fn unaffected_repositories_keep_identity() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1"], None, true));
        let state = reduce(state, &fetched("r2", &["p9"], None, true));
        let r1 = Arc::clone(&state["r1"]);
        let state = reduce(state, &created(project("p10", "r2")));
        assert!(Arc::ptr_eq(&r1, &state["r1"]));
    }

    #[test]
    fn unrelated_actions_keep_identity() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1"], None, true));
        for action in [
            Action::RefetchDataStarted,
            Action::ErrorRemoved("e".into()),
            fetched_tasks(),
        ] {
            let next = reduce(Arc::clone(&state), &action);
            assert!(Arc::ptr_eq(&state, &next), "{} changed state", action.kind());
        }
    }

    fn fetched_tasks() -> Action {
        Action::FetchObjectsSucceeded {
            request: ObjectsRequest::new(ObjectType::Task, Filters::new().with("project", "p1")),
            response: Page {
                next: None,
                results: vec![],
            },
        }
    }

    #[test]
    fn pushed_update_replaces_in_place() {
        let state = reduce(Arc::default(), &fetched("r1", &["p1", "p2"], None, true));
        let mut updated = project("p1", "r1");
        updated.has_unmerged_commits = true;
        let state = reduce(state, &Action::ObjectUpdated(Object::Project(updated)));
        assert_eq!(ids(&state, "r1"), vec!["p1", "p2"]);
        assert!(state["r1"].items.get("p1").unwrap().has_unmerged_commits);
    }
}
