#![allow(dead_code)]

use metecho_client::{ApiClient, ApiUrls, Client, ErrorReporter, ReportingScope, Socket};
use metecho_store::types::Subscription;
use metecho_store::user::User;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Port doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingSocket {
    pub subscribed: Mutex<Vec<Subscription>>,
    pub reconnects: Mutex<usize>,
}

impl Socket for RecordingSocket {
    fn subscribe(&self, subscription: &Subscription) {
        self.subscribed.lock().unwrap().push(subscription.clone());
    }

    fn reconnect(&self) {
        *self.reconnects.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub users: Mutex<Vec<String>>,
    pub clears: Mutex<usize>,
}

struct CountingScope<'a>(&'a Mutex<usize>);

impl ReportingScope for CountingScope<'_> {
    fn clear(&mut self) {
        *self.0.lock().unwrap() += 1;
    }
}

impl ErrorReporter for RecordingReporter {
    fn set_user(&self, user: &User) {
        self.users.lock().unwrap().push(user.id.clone());
    }

    fn configure_scope(&self, f: &mut dyn FnMut(&mut dyn ReportingScope)) {
        let mut scope = CountingScope(&self.clears);
        f(&mut scope);
    }
}

// ---------------------------------------------------------------------------
// Client wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub client: Client,
    pub socket: Arc<RecordingSocket>,
    pub reporter: Arc<RecordingReporter>,
}

pub fn harness(server_url: &str) -> Harness {
    let socket = Arc::new(RecordingSocket::default());
    let reporter = Arc::new(RecordingReporter::default());
    let api = ApiClient::new(server_url, Some("secret".into())).unwrap();
    let client = Client::new(api, ApiUrls::default(), socket.clone())
        .with_reporter(reporter.clone());
    Harness {
        client,
        socket,
        reporter,
    }
}

pub fn repository_json(id: &str, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Repository {id}"),
        "slug": slug,
        "old_slugs": [],
        "description": "This is a test repository.",
        "repo_url": "http://www.test.test",
        "github_users": [
            {"id": "gh1", "login": "alice"},
            {"id": "gh2", "login": "bob"}
        ]
    })
}

pub fn project_json(id: &str, repository: &str, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "repository": repository,
        "name": format!("Project {id}"),
        "slug": slug,
        "old_slugs": [],
        "description": "",
        "branch_url": null,
        "branch_name": null,
        "github_users": []
    })
}
