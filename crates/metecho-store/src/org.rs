use crate::action::{Action, Object};
use crate::collection::Identified;
use crate::types::ObjectType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// OrgType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgType {
    Dev,
    #[serde(rename = "QA")]
    Qa,
}

impl OrgType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrgType::Dev => "Dev",
            OrgType::Qa => "QA",
        }
    }
}

impl fmt::Display for OrgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrgType {
    type Err = crate::error::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dev" | "dev" => Ok(OrgType::Dev),
            "QA" | "qa" => Ok(OrgType::Qa),
            other => Err(crate::error::StoreError::UnknownOrgType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ScratchOrg
// ---------------------------------------------------------------------------

/// An ephemeral Salesforce environment attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScratchOrg {
    pub id: String,
    /// Parent task id.
    pub task: String,
    pub org_type: OrgType,
    pub owner: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_commit: String,
    #[serde(default)]
    pub latest_commit_url: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub currently_capturing_changes: bool,
    #[serde(default)]
    pub currently_refreshing_changes: bool,
    #[serde(default)]
    pub delete_queued_at: Option<DateTime<Utc>>,
}

impl Identified for ScratchOrg {
    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The (at most one) Dev and QA org of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrgsByTask {
    #[serde(rename = "Dev")]
    pub dev: Option<ScratchOrg>,
    #[serde(rename = "QA")]
    pub qa: Option<ScratchOrg>,
    pub fetched: bool,
}

impl OrgsByTask {
    pub fn get(&self, org_type: OrgType) -> Option<&ScratchOrg> {
        match org_type {
            OrgType::Dev => self.dev.as_ref(),
            OrgType::Qa => self.qa.as_ref(),
        }
    }

    fn slot_mut(&mut self, org_type: OrgType) -> &mut Option<ScratchOrg> {
        match org_type {
            OrgType::Dev => &mut self.dev,
            OrgType::Qa => &mut self.qa,
        }
    }
}

/// Orgs keyed by task id.
pub type OrgsState = BTreeMap<String, Arc<OrgsByTask>>;

pub fn reduce(orgs: Arc<OrgsState>, action: &Action) -> Arc<OrgsState> {
    match action {
        Action::UserLoggedOut => Arc::new(OrgsState::new()),
        Action::FetchObjectsSucceeded { request, response }
            if request.object_type == ObjectType::ScratchOrg =>
        {
            let Some(task) = request.filters.task() else {
                return orgs;
            };
            let mut by_task = OrgsByTask {
                fetched: true,
                ..Default::default()
            };
            for org in response.results.iter().filter_map(Object::as_scratch_org) {
                *by_task.slot_mut(org.org_type) = Some(org.clone());
            }
            let mut next = (*orgs).clone();
            next.insert(task.to_string(), Arc::new(by_task));
            Arc::new(next)
        }
        Action::ScratchOrgProvisioned(org)
        | Action::ObjectUpdated(Object::ScratchOrg(org))
        | Action::UpdateObjectSucceeded {
            object: Object::ScratchOrg(org),
            ..
        } => set_org(orgs, org),
        Action::ScratchOrgProvisionFailed { org, .. } | Action::ScratchOrgDeleted(org) => {
            clear_org(orgs, org)
        }
        _ => orgs,
    }
}

fn set_org(orgs: Arc<OrgsState>, org: &ScratchOrg) -> Arc<OrgsState> {
    let mut by_task = orgs
        .get(&org.task)
        .map(|current| (**current).clone())
        .unwrap_or_default();
    if by_task.get(org.org_type) == Some(org) {
        return orgs;
    }
    *by_task.slot_mut(org.org_type) = Some(org.clone());
    let mut next = (*orgs).clone();
    next.insert(org.task.clone(), Arc::new(by_task));
    Arc::new(next)
}

/// Only clears the slot when it still holds this org; a newer org of the
/// same type is left alone.
fn clear_org(orgs: Arc<OrgsState>, org: &ScratchOrg) -> Arc<OrgsState> {
    let Some(current) = orgs.get(&org.task) else {
        return orgs;
    };
    if current.get(org.org_type).map(|o| o.id.as_str()) != Some(org.id.as_str()) {
        return orgs;
    }
    let mut by_task = (**current).clone();
    *by_task.slot_mut(org.org_type) = None;
    let mut next = (*orgs).clone();
    next.insert(org.task.clone(), Arc::new(by_task));
    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ObjectsRequest;
    use crate::types::{Filters, Page};

    fn org(id: &str, task: &str, org_type: OrgType) -> ScratchOrg {
        ScratchOrg {
            id: id.into(),
            task: task.into(),
            org_type,
            owner: "user-id".into(),
            expires_at: None,
            last_modified_at: None,
            latest_commit: String::new(),
            latest_commit_url: String::new(),
            url: None,
            has_changes: false,
            currently_capturing_changes: false,
            currently_refreshing_changes: false,
            delete_queued_at: None,
        }
    }

    #[test]
    fn fetch_slots_orgs_by_type() {
        let action = Action::FetchObjectsSucceeded {
            request: ObjectsRequest::new(ObjectType::ScratchOrg, Filters::new().with("task", "t1")),
            response: Page {
                next: None,
                results: vec![Object::ScratchOrg(org("o1", "t1", OrgType::Qa))],
            },
        };
        let state = reduce(Arc::default(), &action);
        assert!(state["t1"].fetched);
        assert!(state["t1"].dev.is_none());
        assert_eq!(state["t1"].qa.as_ref().unwrap().id, "o1");
    }

    #[test]
    fn provision_then_delete() {
        let state = reduce(
            Arc::default(),
            &Action::ScratchOrgProvisioned(org("o1", "t1", OrgType::Dev)),
        );
        assert_eq!(state["t1"].get(OrgType::Dev).unwrap().id, "o1");
        let state = reduce(state, &Action::ScratchOrgDeleted(org("o1", "t1", OrgType::Dev)));
        assert!(state["t1"].dev.is_none());
    }

    #[test]
    fn failure_for_stale_org_keeps_newer_one() {
        let state = reduce(
            Arc::default(),
            &Action::ScratchOrgProvisioned(org("o2", "t1", OrgType::Dev)),
        );
        let next = reduce(
            Arc::clone(&state),
            &Action::ScratchOrgProvisionFailed {
                org: org("o1", "t1", OrgType::Dev),
                message: "expired".into(),
            },
        );
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn identical_push_keeps_identity() {
        let o = org("o1", "t1", OrgType::Dev);
        let state = reduce(Arc::default(), &Action::ScratchOrgProvisioned(o.clone()));
        let next = reduce(Arc::clone(&state), &Action::ObjectUpdated(Object::ScratchOrg(o)));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn org_type_uses_server_spelling() {
        assert_eq!(serde_json::to_value(OrgType::Qa).unwrap(), "QA");
        assert_eq!("dev".parse::<OrgType>().unwrap(), OrgType::Dev);
        assert!("prod".parse::<OrgType>().is_err());
    }
}
