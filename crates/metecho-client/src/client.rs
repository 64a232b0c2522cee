use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::reporting::ErrorReporter;
use crate::socket::Socket;
use crate::urls::ApiUrls;
use std::sync::Arc;

/// Everything the session and object actions need: the REST wrapper, the
/// endpoint map, and the two injected ports.
pub struct Client {
    pub(crate) api: ApiClient,
    pub(crate) urls: ApiUrls,
    pub(crate) socket: Arc<dyn Socket>,
    pub(crate) reporter: Option<Arc<dyn ErrorReporter>>,
    pub(crate) page_size: Option<u32>,
}

impl Client {
    pub fn new(api: ApiClient, urls: ApiUrls, socket: Arc<dyn Socket>) -> Self {
        Self {
            api,
            urls,
            socket,
            reporter: None,
            page_size: None,
        }
    }

    /// Build from a loaded config. Fails when no server URL is set.
    pub fn from_config(config: &Config, socket: Arc<dyn Socket>) -> Result<Self> {
        let api = ApiClient::new(config.require_server()?, config.token.clone())?;
        Ok(Self::new(api, config.urls.clone(), socket).with_page_size(config.page_size))
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn urls(&self) -> &ApiUrls {
        &self.urls
    }
}
