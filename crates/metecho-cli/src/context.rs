use anyhow::Context as _;
use metecho_client::{ChannelSocket, Client, Config, SentryReporter, SocketCommand};
use metecho_store::Store;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;

/// Resolved global options shared by every command.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub json: bool,
}

impl Context {
    pub fn load(
        config_path: Option<PathBuf>,
        server: Option<String>,
        token: Option<String>,
        json: bool,
    ) -> anyhow::Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => Config::default_path()?,
        };
        let config = Config::load(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?
            .with_overrides(server, token);
        Ok(Self {
            config_path,
            config,
            json,
        })
    }

    /// Connect a client and an empty cache for one command.
    pub fn session(&self) -> anyhow::Result<Session> {
        let runtime = Runtime::new().context("failed to start async runtime")?;
        let (socket, commands) = ChannelSocket::new();
        let mut client = Client::from_config(&self.config, Arc::new(socket))?;
        let sentry = match self.config.sentry_dsn.as_deref() {
            Some(dsn) => {
                let (reporter, guard) = SentryReporter::init(dsn);
                client = client.with_reporter(Arc::new(reporter));
                Some(guard)
            }
            None => None,
        };
        Ok(Session {
            client,
            store: Store::new(),
            runtime,
            _commands: commands,
            _sentry: sentry,
        })
    }
}

/// A short-lived connection: no socket transport runs in the CLI, so
/// subscribe/reconnect commands are queued and dropped on exit.
pub struct Session {
    pub client: Client,
    pub store: Store,
    runtime: Runtime,
    _commands: UnboundedReceiver<SocketCommand>,
    _sentry: Option<sentry::ClientInitGuard>,
}

impl Session {
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
