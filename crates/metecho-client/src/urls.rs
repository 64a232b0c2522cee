use crate::error::{ClientError, Result};
use metecho_store::types::ObjectType;
use reqwest::Url;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ApiUrls
// ---------------------------------------------------------------------------

/// Endpoint paths, relative to the server URL. Every entry can be
/// overridden from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiUrls {
    pub user: String,
    pub account_logout: String,
    pub user_refresh: String,
    pub github_login: String,
    pub repository_list: String,
    pub project_list: String,
    pub task_list: String,
    pub scratch_org_list: String,
}

impl Default for ApiUrls {
    fn default() -> Self {
        Self {
            user: "/api/user/".to_string(),
            account_logout: "/accounts/logout/".to_string(),
            user_refresh: "/api/user/refresh/".to_string(),
            github_login: "/accounts/github/login/".to_string(),
            repository_list: "/api/repositories/".to_string(),
            project_list: "/api/projects/".to_string(),
            task_list: "/api/tasks/".to_string(),
            scratch_org_list: "/api/scratch-orgs/".to_string(),
        }
    }
}

impl ApiUrls {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn account_logout(&self) -> &str {
        &self.account_logout
    }

    pub fn user_refresh(&self) -> &str {
        &self.user_refresh
    }

    pub fn github_login(&self) -> &str {
        &self.github_login
    }

    pub fn list(&self, object_type: ObjectType) -> &str {
        match object_type {
            ObjectType::Repository => &self.repository_list,
            ObjectType::Project => &self.project_list,
            ObjectType::Task => &self.task_list,
            ObjectType::ScratchOrg => &self.scratch_org_list,
        }
    }

    pub fn detail(&self, object_type: ObjectType, id: &str) -> String {
        let list = self.list(object_type);
        let sep = if list.ends_with('/') { "" } else { "/" };
        format!("{list}{sep}{id}/")
    }

    /// The GitHub OAuth entry point, returning to `next` after login.
    pub fn login_url(&self, server: &Url, next: Option<&str>) -> Result<Url> {
        let url = join(server, &self.github_login)?;
        Ok(match next {
            Some(next) => add_url_params(url, [("next", next)]),
            None => url,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve an endpoint path against the server URL, keeping any path
/// prefix the server is mounted under. Absolute URLs (pagination cursors)
/// are returned as they are.
pub fn join(base: &Url, path: &str) -> Result<Url> {
    if let Ok(absolute) = Url::parse(path) {
        return Ok(absolute);
    }
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let dir = format!("{}/", root.path());
        root.set_path(&dir);
    }
    root.join(path.trim_start_matches('/'))
        .map_err(|e| ClientError::Url {
            url: path.to_string(),
            reason: e.to_string(),
        })
}

/// Append query parameters, keeping the ones already on `url`.
pub fn add_url_params<'a, I>(mut url: Url, params: I) -> Url
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut params = params.into_iter().peekable();
    if params.peek().is_some() {
        url.query_pairs_mut().extend_pairs(params);
    }
    url
}

pub fn parse_server_url(server: &str) -> Result<Url> {
    Url::parse(server).map_err(|e| ClientError::Url {
        url: server.to_string(),
        reason: e.to_string(),
    })
}
