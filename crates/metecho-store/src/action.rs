use crate::api_error::ApiError;
use crate::collection::Identified;
use crate::error::{Result, StoreError};
use crate::org::ScratchOrg;
use crate::project::Project;
use crate::repository::Repository;
use crate::task::Task;
use crate::types::{Filters, ObjectType, Page};
use crate::user::User;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A server resource of any cached type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Object {
    Repository(Repository),
    Project(Project),
    Task(Task),
    ScratchOrg(ScratchOrg),
}

impl Object {
    /// Decode an untyped JSON object as `object_type`.
    pub fn decode(object_type: ObjectType, value: serde_json::Value) -> Result<Self> {
        let malformed = |source| StoreError::MalformedObject {
            object_type: object_type.to_string(),
            source,
        };
        let object = match object_type {
            ObjectType::Repository => {
                Object::Repository(serde_json::from_value(value).map_err(malformed)?)
            }
            ObjectType::Project => Object::Project(serde_json::from_value(value).map_err(malformed)?),
            ObjectType::Task => Object::Task(serde_json::from_value(value).map_err(malformed)?),
            ObjectType::ScratchOrg => {
                Object::ScratchOrg(serde_json::from_value(value).map_err(malformed)?)
            }
        };
        Ok(object)
    }

    /// Decode every result of a list page as `object_type`.
    pub fn decode_page(
        object_type: ObjectType,
        page: Page<serde_json::Value>,
    ) -> Result<Page<Object>> {
        let results = page
            .results
            .into_iter()
            .map(|value| Object::decode(object_type, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            next: page.next,
            results,
        })
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Repository(_) => ObjectType::Repository,
            Object::Project(_) => ObjectType::Project,
            Object::Task(_) => ObjectType::Task,
            Object::ScratchOrg(_) => ObjectType::ScratchOrg,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Object::Repository(o) => o.id(),
            Object::Project(o) => o.id(),
            Object::Task(o) => o.id(),
            Object::ScratchOrg(o) => o.id(),
        }
    }

    pub fn as_repository(&self) -> Option<&Repository> {
        match self {
            Object::Repository(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&Project> {
        match self {
            Object::Project(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Object::Task(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_scratch_org(&self) -> Option<&ScratchOrg> {
        match self {
            Object::ScratchOrg(o) => Some(o),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// A list fetch. `url` is the concrete URL requested (a pagination cursor
/// when continuing a previous page).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectsRequest {
    pub object_type: ObjectType,
    pub url: Option<String>,
    pub reset: bool,
    pub filters: Filters,
}

impl ObjectsRequest {
    pub fn new(object_type: ObjectType, filters: Filters) -> Self {
        Self {
            object_type,
            url: None,
            reset: true,
            filters,
        }
    }

    /// Continue from a pagination cursor, appending to what is cached.
    pub fn next_page(object_type: ObjectType, filters: Filters, url: impl Into<String>) -> Self {
        Self {
            object_type,
            url: Some(url.into()),
            reset: false,
            filters,
        }
    }
}

/// A single-object fetch, usually by `slug` within a parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRequest {
    pub object_type: ObjectType,
    pub url: Option<String>,
    pub filters: Filters,
}

impl ObjectRequest {
    pub fn new(object_type: ObjectType, filters: Filters) -> Self {
        Self {
            object_type,
            url: None,
            filters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub object_type: ObjectType,
    pub url: Option<String>,
    pub data: serde_json::Value,
}

impl CreateRequest {
    pub fn new(object_type: ObjectType, data: serde_json::Value) -> Self {
        Self {
            object_type,
            url: None,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub object_type: ObjectType,
    pub url: Option<String>,
    pub id: String,
    pub data: serde_json::Value,
    /// PATCH a subset of fields instead of PUTting the whole object.
    pub patch: bool,
}

impl UpdateRequest {
    pub fn patch(object_type: ObjectType, id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            object_type,
            url: None,
            id: id.into(),
            data,
            patch: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Every state transition the cache understands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    UserLoggedIn(User),
    UserLoggedOut,

    RefetchDataStarted,
    RefetchDataSucceeded,
    RefetchDataFailed,

    RefreshingRepos,
    ReposRefreshed,
    RefreshReposRejected,

    FetchObjectsStarted(ObjectsRequest),
    FetchObjectsSucceeded {
        request: ObjectsRequest,
        response: Page<Object>,
    },
    FetchObjectsFailed(ObjectsRequest),

    FetchObjectStarted(ObjectRequest),
    FetchObjectSucceeded {
        request: ObjectRequest,
        object: Option<Object>,
    },
    FetchObjectFailed(ObjectRequest),

    CreateObjectStarted(CreateRequest),
    CreateObjectSucceeded {
        request: CreateRequest,
        object: Object,
    },
    CreateObjectFailed(CreateRequest),

    UpdateObjectStarted(UpdateRequest),
    UpdateObjectSucceeded {
        request: UpdateRequest,
        object: Object,
    },
    UpdateObjectFailed(UpdateRequest),

    ObjectUpdated(Object),

    ScratchOrgProvisioned(ScratchOrg),
    ScratchOrgProvisionFailed {
        org: ScratchOrg,
        message: String,
    },
    ScratchOrgDeleted(ScratchOrg),

    ErrorAdded(ApiError),
    ErrorRemoved(String),
}

impl Action {
    /// The wire name of this action, e.g. `"USER_LOGGED_IN"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::UserLoggedIn(_) => "USER_LOGGED_IN",
            Action::UserLoggedOut => "USER_LOGGED_OUT",
            Action::RefetchDataStarted => "REFETCH_DATA_STARTED",
            Action::RefetchDataSucceeded => "REFETCH_DATA_SUCCEEDED",
            Action::RefetchDataFailed => "REFETCH_DATA_FAILED",
            Action::RefreshingRepos => "REFRESHING_REPOS",
            Action::ReposRefreshed => "REPOS_REFRESHED",
            Action::RefreshReposRejected => "REFRESH_REPOS_REJECTED",
            Action::FetchObjectsStarted(_) => "FETCH_OBJECTS_STARTED",
            Action::FetchObjectsSucceeded { .. } => "FETCH_OBJECTS_SUCCEEDED",
            Action::FetchObjectsFailed(_) => "FETCH_OBJECTS_FAILED",
            Action::FetchObjectStarted(_) => "FETCH_OBJECT_STARTED",
            Action::FetchObjectSucceeded { .. } => "FETCH_OBJECT_SUCCEEDED",
            Action::FetchObjectFailed(_) => "FETCH_OBJECT_FAILED",
            Action::CreateObjectStarted(_) => "CREATE_OBJECT_STARTED",
            Action::CreateObjectSucceeded { .. } => "CREATE_OBJECT_SUCCEEDED",
            Action::CreateObjectFailed(_) => "CREATE_OBJECT_FAILED",
            Action::UpdateObjectStarted(_) => "UPDATE_OBJECT_STARTED",
            Action::UpdateObjectSucceeded { .. } => "UPDATE_OBJECT_SUCCEEDED",
            Action::UpdateObjectFailed(_) => "UPDATE_OBJECT_FAILED",
            Action::ObjectUpdated(_) => "OBJECT_UPDATED",
            Action::ScratchOrgProvisioned(_) => "SCRATCH_ORG_PROVISIONED",
            Action::ScratchOrgProvisionFailed { .. } => "SCRATCH_ORG_PROVISION_FAILED",
            Action::ScratchOrgDeleted(_) => "SCRATCH_ORG_DELETED",
            Action::ErrorAdded(_) => "ERROR_ADDED",
            Action::ErrorRemoved(_) => "ERROR_REMOVED",
        }
    }

    /// The object carried by a create, update or push, if any.
    pub fn changed_object(&self) -> Option<&Object> {
        match self {
            Action::CreateObjectSucceeded { object, .. }
            | Action::UpdateObjectSucceeded { object, .. }
            | Action::ObjectUpdated(object) => Some(object),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unit_actions_serialize_without_payload() {
        let value = serde_json::to_value(Action::UserLoggedOut).unwrap();
        assert_eq!(value, json!({"type": "USER_LOGGED_OUT"}));
    }

    #[test]
    fn kind_matches_serialized_type() {
        let actions = vec![
            Action::RefetchDataStarted,
            Action::FetchObjectsStarted(ObjectsRequest::new(ObjectType::Repository, Filters::new())),
            Action::ErrorAdded(ApiError::new("boom")),
            Action::ErrorRemoved("e1".into()),
        ];
        for action in actions {
            let value = serde_json::to_value(&action).unwrap();
            assert_eq!(value["type"], action.kind());
        }
    }

    #[test]
    fn objects_request_payload_uses_camel_case() {
        let request = ObjectsRequest::new(ObjectType::Project, Filters::new().with("repository", "r1"));
        let value = serde_json::to_value(Action::FetchObjectsStarted(request)).unwrap();
        assert_eq!(
            value["payload"],
            json!({
                "objectType": "project",
                "url": null,
                "reset": true,
                "filters": {"repository": "r1"}
            })
        );
    }

    #[test]
    fn decode_dispatches_on_object_type() {
        let value = json!({
            "id": "p1",
            "repository": "r1",
            "name": "Project 1",
            "slug": "project-1",
            "description": "",
            "branch_url": "https://github.com/test/repo/tree/project-1"
        });
        let object = Object::decode(ObjectType::Project, value.clone()).unwrap();
        assert_eq!(object.object_type(), ObjectType::Project);
        assert_eq!(object.id(), "p1");
        assert_eq!(object.as_project().unwrap().repository, "r1");

        let err = Object::decode(ObjectType::Task, value).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }
}
