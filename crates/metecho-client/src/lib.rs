pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod reporting;
pub mod socket;
pub mod urls;

pub use api::{ApiClient, Request};
pub use client::Client;
pub use config::Config;
pub use error::{ClientError, Result};
pub use reporting::{ErrorReporter, ReportingScope, SentryReporter};
pub use socket::{ChannelSocket, Socket, SocketCommand};
pub use urls::ApiUrls;
