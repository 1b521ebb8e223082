//! # taskio-client
//!
//! Client-side session handling for the task.io API gateway: a session
//! store mirrored into persistent storage, the open-project context, and
//! an authenticated fetch that refreshes an expired access token once
//! before giving up.

pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod project;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, StorageError};
pub use events::{AuthEvent, AuthEvents};
pub use fetch::{ApiClient, CurrentUser, RequestOptions};
pub use project::{ProjectInfo, ProjectState, ProjectSummary, Role};
pub use session::{SessionState, UserInfo};
pub use storage::{FileStorage, MemoryStorage, Storage};
