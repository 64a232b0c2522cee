use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ObjectType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Repository,
    Project,
    Task,
    ScratchOrg,
}

impl ObjectType {
    pub fn all() -> &'static [ObjectType] {
        &[
            ObjectType::Repository,
            ObjectType::Project,
            ObjectType::Task,
            ObjectType::ScratchOrg,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Repository => "repository",
            ObjectType::Project => "project",
            ObjectType::Task => "task",
            ObjectType::ScratchOrg => "scratch_org",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = crate::error::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::error::StoreError::UnknownObjectType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Query filters attached to a fetch (`repository`, `project`, `task`, `slug`).
///
/// Ordered so the generated query strings are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn repository(&self) -> Option<&str> {
        self.get("repository")
    }

    pub fn project(&self) -> Option<&str> {
        self.get("project")
    }

    pub fn task(&self) -> Option<&str> {
        self.get("task")
    }

    pub fn slug(&self) -> Option<&str> {
        self.get("slug")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of a list endpoint. `count` and `previous` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A real-time topic: `{ model, id }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription {
    pub model: String,
    pub id: String,
}

impl Subscription {
    pub fn new(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id: id.into(),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new("user", id)
    }
}
