use crate::action::{Action, Object};
use crate::collection::Identified;
use crate::paginated::{update_parent, ByParent};
use crate::types::ObjectType;
use crate::user::GitHubUser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Parent project id.
    pub project: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub old_slugs: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub branch_url: Option<String>,
    #[serde(default)]
    pub branch_diff_url: Option<String>,
    /// Id of the assigned user, if any.
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub reviewers: Vec<GitHubUser>,
}

impl Identified for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Task {
    pub fn matches_slug(&self, slug: &str) -> bool {
        self.slug == slug || self.old_slugs.iter().any(|s| s == slug)
    }
}

/// Tasks keyed by project id.
pub type TasksState = ByParent<Task>;

pub fn reduce(tasks: Arc<TasksState>, action: &Action) -> Arc<TasksState> {
    match action {
        Action::UserLoggedOut => Arc::new(TasksState::new()),
        Action::FetchObjectsSucceeded { request, response }
            if request.object_type == ObjectType::Task =>
        {
            let Some(project) = request.filters.project() else {
                return tasks;
            };
            let results: Vec<Task> = response
                .results
                .iter()
                .filter_map(Object::as_task)
                .cloned()
                .collect();
            let next = response.next.clone();
            update_parent(tasks, project, |current| {
                Some(current.with_page(results, next, request.reset))
            })
        }
        Action::FetchObjectSucceeded { request, object }
            if request.object_type == ObjectType::Task =>
        {
            let Some(project) = request.filters.project() else {
                return tasks;
            };
            let task = object.as_ref().and_then(Object::as_task).cloned();
            update_parent(tasks, project, |current| {
                current.with_fetched(request.filters.slug(), task)
            })
        }
        Action::CreateObjectSucceeded {
            object: Object::Task(task),
            ..
        } => update_parent(tasks, &task.project, |current| current.with_created(task.clone())),
        Action::UpdateObjectSucceeded {
            object: Object::Task(task),
            ..
        }
        | Action::ObjectUpdated(Object::Task(task)) => {
            update_parent(tasks, &task.project, |current| current.with_updated(task.clone()))
        }
        _ => tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{CreateRequest, ObjectsRequest};
    use crate::types::{Filters, Page};

    fn task(id: &str, project: &str) -> Task {
        Task {
            id: id.into(),
            project: project.into(),
            name: format!("Task {id}"),
            slug: format!("task-{id}"),
            old_slugs: vec![],
            description: String::new(),
            branch_url: None,
            branch_diff_url: None,
            assignee: None,
            reviewers: vec![],
        }
    }

    fn fetched(project: &str, tasks: Vec<Task>) -> Action {
        Action::FetchObjectsSucceeded {
            request: ObjectsRequest::new(ObjectType::Task, Filters::new().with("project", project)),
            response: Page {
                next: None,
                results: tasks.into_iter().map(Object::Task).collect(),
            },
        }
    }

    #[test]
    fn fetch_stores_tasks_per_project() {
        let state = reduce(Arc::default(), &fetched("p1", vec![task("t1", "p1"), task("t2", "p1")]));
        let state = reduce(state, &fetched("p2", vec![]));
        assert_eq!(state["p1"].items.ids(), vec!["t1", "t2"]);
        assert!(state["p2"].fetched);
        assert!(state["p2"].items.is_empty());
    }

    #[test]
    fn create_prepends_and_dedupes() {
        let state = reduce(Arc::default(), &fetched("p1", vec![task("t1", "p1")]));
        let action = Action::CreateObjectSucceeded {
            request: CreateRequest::new(ObjectType::Task, serde_json::json!({"name": "Task t2"})),
            object: Object::Task(task("t2", "p1")),
        };
        let state = reduce(state, &action);
        assert_eq!(state["p1"].items.ids(), vec!["t2", "t1"]);
        let again = reduce(Arc::clone(&state), &action);
        assert!(Arc::ptr_eq(&state, &again));
    }

    #[test]
    fn project_creation_does_not_touch_tasks() {
        let state: Arc<TasksState> = Arc::default();
        let project = crate::project::Project {
            id: "p1".into(),
            repository: "r1".into(),
            name: "P".into(),
            slug: "p".into(),
            old_slugs: vec![],
            description: String::new(),
            branch_url: None,
            branch_name: None,
            currently_creating_pr: false,
            has_unmerged_commits: false,
            pr_url: None,
            github_users: vec![],
        };
        let action = Action::CreateObjectSucceeded {
            request: CreateRequest::new(ObjectType::Project, serde_json::json!({})),
            object: Object::Project(project),
        };
        assert!(Arc::ptr_eq(&state, &reduce(Arc::clone(&state), &action)));
    }

    #[test]
    fn logout_clears_tasks() {
        let state = reduce(Arc::default(), &fetched("p1", vec![task("t1", "p1")]));
        assert!(reduce(state, &Action::UserLoggedOut).is_empty());
    }
}
