pub mod action;
pub mod api_error;
pub mod collection;
pub mod error;
pub mod org;
pub mod paginated;
pub mod project;
pub mod repository;
pub mod selectors;
pub mod state;
pub mod store;
pub mod task;
pub mod types;
pub mod user;

pub use action::{Action, Object};
pub use error::{Result, StoreError};
pub use state::AppState;
pub use store::{ActionLog, Dispatch, Store};
