//! Real-time socket port.
//!
//! The cache never owns a transport. It talks to a [`Socket`] handle, and
//! server pushes come back in as JSON text that [`decode_event`] turns into
//! actions.

use crate::error::Result;
use metecho_store::action::Object;
use metecho_store::api_error::ApiError;
use metecho_store::org::ScratchOrg;
use metecho_store::types::{ObjectType, Subscription};
use metecho_store::{Action, Dispatch, StoreError};
use serde::Deserialize;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub trait Socket: Send + Sync {
    fn subscribe(&self, subscription: &Subscription);
    fn reconnect(&self);
}

// ---------------------------------------------------------------------------
// ChannelSocket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    Subscribe(Subscription),
    Reconnect,
}

/// Forwards commands to whatever task owns the actual connection.
pub struct ChannelSocket {
    tx: mpsc::UnboundedSender<SocketCommand>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl ChannelSocket {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SocketCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let socket = Self {
            tx,
            subscriptions: Mutex::new(Vec::new()),
        };
        (socket, rx)
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn send(&self, command: SocketCommand) {
        if self.tx.send(command).is_err() {
            warn!("socket transport has shut down; command dropped");
        }
    }
}

impl Socket for ChannelSocket {
    fn subscribe(&self, subscription: &Subscription) {
        info!(model = %subscription.model, id = %subscription.id, "socket subscribe");
        {
            let mut subs = self
                .subscriptions
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !subs.contains(subscription) {
                subs.push(subscription.clone());
            }
        }
        self.send(SocketCommand::Subscribe(subscription.clone()));
    }

    /// Drops every subscription. The new connection starts anonymous and
    /// callers subscribe again after the next login.
    fn reconnect(&self) {
        info!("socket reconnect");
        self.subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        self.send(SocketCommand::Reconnect);
    }
}

// ---------------------------------------------------------------------------
// Server events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Pushed payloads either are the object or wrap it as `{ model, ... }`.
fn model(payload: serde_json::Value) -> serde_json::Value {
    match payload {
        serde_json::Value::Object(mut map) if map.get("model").is_some_and(|m| m.is_object()) => {
            map.remove("model").unwrap_or_default()
        }
        other => other,
    }
}

fn scratch_org(payload: serde_json::Value) -> Result<ScratchOrg> {
    serde_json::from_value(model(payload)).map_err(|source| {
        StoreError::MalformedObject {
            object_type: ObjectType::ScratchOrg.to_string(),
            source,
        }
        .into()
    })
}

fn updated_type(kind: &str) -> Option<ObjectType> {
    match kind {
        "REPOSITORY_UPDATE" => Some(ObjectType::Repository),
        "PROJECT_UPDATE" => Some(ObjectType::Project),
        "TASK_UPDATE" => Some(ObjectType::Task),
        "SCRATCH_ORG_UPDATE" => Some(ObjectType::ScratchOrg),
        _ => None,
    }
}

/// Map one server push to the actions it implies. Unknown event types map
/// to nothing.
pub fn decode_event(text: &str) -> Result<Vec<Action>> {
    let Event { kind, payload } = serde_json::from_str(text)?;
    if let Some(object_type) = updated_type(&kind) {
        let object = Object::decode(object_type, model(payload))?;
        return Ok(vec![Action::ObjectUpdated(object)]);
    }
    match kind.as_str() {
        "SCRATCH_ORG_PROVISIONED" => Ok(vec![Action::ScratchOrgProvisioned(scratch_org(payload)?)]),
        "SCRATCH_ORG_PROVISION_FAILED" => {
            let message = payload
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Scratch org provisioning failed")
                .to_string();
            let org = scratch_org(payload)?;
            Ok(vec![
                Action::ScratchOrgProvisionFailed {
                    org,
                    message: message.clone(),
                },
                Action::ErrorAdded(ApiError::new(message)),
            ])
        }
        "SCRATCH_ORG_DELETED" => Ok(vec![Action::ScratchOrgDeleted(scratch_org(payload)?)]),
        "USER_REPOS_REFRESH" => Ok(vec![Action::ReposRefreshed]),
        other => {
            debug!(event = other, "ignoring unknown socket event");
            Ok(Vec::new())
        }
    }
}

/// Decode a push and dispatch the resulting actions. Malformed pushes are
/// logged and dropped.
pub fn dispatch_event(dispatch: &dyn Dispatch, text: &str) {
    match decode_event(text) {
        Ok(actions) => actions.into_iter().for_each(|a| dispatch.dispatch(a)),
        Err(e) => warn!(error = %e, "malformed socket event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org_json() -> serde_json::Value {
        json!({
            "id": "o1",
            "task": "t1",
            "org_type": "Dev",
            "owner": "u1",
            "url": "https://sf.test/o1"
        })
    }

    #[test]
    fn subscribe_and_reconnect_forward_commands() {
        let (socket, mut rx) = ChannelSocket::new();
        let sub = Subscription::user("u1");
        socket.subscribe(&sub);
        socket.subscribe(&sub);
        socket.reconnect();

        assert_eq!(rx.try_recv().unwrap(), SocketCommand::Subscribe(sub.clone()));
        assert_eq!(rx.try_recv().unwrap(), SocketCommand::Subscribe(sub.clone()));
        assert_eq!(rx.try_recv().unwrap(), SocketCommand::Reconnect);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reconnect_forgets_subscriptions() {
        let (socket, mut rx) = ChannelSocket::new();
        socket.subscribe(&Subscription::user("u1"));
        assert_eq!(socket.subscriptions().len(), 1);

        socket.reconnect();
        assert!(socket.subscriptions().is_empty());
        socket.reconnect();

        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        assert_eq!(
            commands,
            vec![
                SocketCommand::Subscribe(Subscription::user("u1")),
                SocketCommand::Reconnect,
                SocketCommand::Reconnect,
            ]
        );
    }

    #[test]
    fn reconnect_after_transport_gone_is_harmless() {
        let (socket, rx) = ChannelSocket::new();
        drop(rx);
        socket.reconnect();
        socket.reconnect();
    }

    #[test]
    fn project_update_becomes_object_updated() {
        let text = json!({
            "type": "PROJECT_UPDATE",
            "payload": {"model": {"id": "p1", "repository": "r1", "name": "P", "slug": "p"}}
        })
        .to_string();
        let actions = decode_event(&text).unwrap();
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::ObjectUpdated(Object::Project(p)) => assert_eq!(p.id, "p1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn provision_failure_also_adds_error() {
        let mut payload = org_json();
        payload["message"] = json!("Org expired");
        let text = json!({"type": "SCRATCH_ORG_PROVISION_FAILED", "payload": payload}).to_string();
        let kinds: Vec<_> = decode_event(&text).unwrap().iter().map(Action::kind).collect();
        assert_eq!(kinds, vec!["SCRATCH_ORG_PROVISION_FAILED", "ERROR_ADDED"]);
    }

    #[test]
    fn unknown_events_are_ignored() {
        let text = json!({"type": "SOMETHING_NEW", "payload": {}}).to_string();
        assert!(decode_event(&text).unwrap().is_empty());
        assert_eq!(
            decode_event(r#"{"type": "USER_REPOS_REFRESH"}"#).unwrap(),
            vec![Action::ReposRefreshed]
        );
    }

    #[test]
    fn dispatch_event_drops_garbage() {
        let log = metecho_store::ActionLog::new();
        dispatch_event(&log, "not json");
        dispatch_event(
            &log,
            &json!({"type": "SCRATCH_ORG_DELETED", "payload": org_json()}).to_string(),
        );
        assert_eq!(log.types(), vec!["SCRATCH_ORG_DELETED"]);
    }
}
