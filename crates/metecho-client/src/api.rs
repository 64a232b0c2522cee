//! Thin wrapper over `reqwest` that talks to the Metecho REST API and
//! reports failures to the cache as `ERROR_ADDED` notices.

use crate::error::{ClientError, Result};
use crate::urls;
use metecho_store::api_error::ApiError;
use metecho_store::{Action, Dispatch};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path relative to the server URL, or an absolute URL.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn with_query<'a, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = urls::parse_server_url(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("metecho/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn resolve(&self, request: &Request) -> Result<Url> {
        let url = urls::join(&self.base_url, &request.url)?;
        Ok(urls::add_url_params(
            url,
            request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    /// Perform `request` and decode a JSON body.
    ///
    /// Returns `Ok(None)` for empty successes (`204`) and for statuses listed
    /// in `suppress`. Every other failure is dispatched as `ERROR_ADDED`
    /// before being returned.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        dispatch: &dyn Dispatch,
        request: Request,
        suppress: &[u16],
    ) -> Result<Option<T>> {
        let url = self.resolve(&request)?;
        debug!(method = %request.method, url = %url, "api request");

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        match &self.token {
            Some(token) if url.origin() == self.base_url.origin() => {
                builder = builder.header(AUTHORIZATION, format!("Token {token}"));
            }
            Some(_) => debug!(url = %url, "token withheld from foreign origin"),
            None => {}
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(report(dispatch, ClientError::Network(e))),
        };

        let status = response.status();
        if status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => return Err(report(dispatch, ClientError::Network(e))),
            };
            if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
                return Ok(None);
            }
            return match serde_json::from_str(&body) {
                Ok(value) => Ok(Some(value)),
                Err(e) => Err(report(dispatch, ClientError::Decode(e))),
            };
        }

        if suppress.contains(&status.as_u16()) {
            warn!(status = status.as_u16(), url = %url, "suppressed error response");
            return Ok(None);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        dispatch.dispatch(Action::ErrorAdded(ApiError::new(message.clone())));
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

fn report(dispatch: &dyn Dispatch, err: ClientError) -> ClientError {
    dispatch.dispatch(Action::ErrorAdded(ApiError::new(err.to_string())));
    err
}

/// Human-readable message for a failed response: the server's `detail` or
/// `non_field_errors` when present, else the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = map.get("detail").and_then(|v| v.as_str()) {
            return detail.to_string();
        }
        if let Some(errors) = map.get("non_field_errors").and_then(|v| v.as_array()) {
            let joined: Vec<&str> = errors.iter().filter_map(|e| e.as_str()).collect();
            if !joined.is_empty() {
                return joined.join(", ");
            }
        }
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_detail() {
        let msg = error_message(StatusCode::FORBIDDEN, r#"{"detail": "Not allowed."}"#);
        assert_eq!(msg, "Not allowed.");
    }

    #[test]
    fn message_joins_non_field_errors() {
        let body = r#"{"non_field_errors": ["Name taken.", "Try again."]}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Name taken., Try again."
        );
    }

    #[test]
    fn message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Internal Server Error"
        );
    }

    #[test]
    fn resolve_appends_query() {
        let api = ApiClient::new("https://metecho.test", None).unwrap();
        let request = Request::get("/api/projects/").with_query([("repository", "r1")]);
        assert_eq!(
            api.resolve(&request).unwrap().as_str(),
            "https://metecho.test/api/projects/?repository=r1"
        );
    }

    #[test]
    fn resolve_under_a_path_prefix() {
        let api = ApiClient::new("https://host.test/metecho/", None).unwrap();
        assert_eq!(
            api.resolve(&Request::get("/api/user/")).unwrap().as_str(),
            "https://host.test/metecho/api/user/"
        );
    }
}
