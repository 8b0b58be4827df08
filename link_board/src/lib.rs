//! # Link Board
//!
//! Client library for a link-board (social link-sharing) REST backend.
//!
//! The library owns the client-side session and request-authorization
//! model: a replay-one session state holder, a storage adapter caching the
//! current user and bearer credential across runs, an HTTP client whose
//! outbound requests are decorated with the stored credential, and the
//! sign-in/sign-up flows that drive all of it. Content services (posts,
//! comments, groups) and user-scoped collection fetches sit on top of the
//! same HTTP layer.
//!
//! ## Core Modules
//!
//! - [`session`]: session state holder and the remote user-resolution seam
//! - [`net`]: HTTP client, request decoration, and the API error taxonomy
//! - [`auth`]: authentication wire models and the sign-in/sign-up flows
//! - [`users`]: current-user, profile, and user-scoped collection fetches
//! - [`content`]: post/comment/group records, drafts, and services
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use link_board::{ClientConfig, HttpClient, SessionHolder, Storage};
//! use link_board::net::http::AuthTokenHeader;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env(None, None)?;
//! let storage = Storage::new(&config.state_dir);
//! let http = HttpClient::new(&config.server_url)?
//!     .with(AuthTokenHeader::new(storage.clone()));
//! let session = Arc::new(SessionHolder::new(storage));
//! let users = link_board::users::UserService::new(http);
//! session.resolve(&users).await;
//! # Ok(())
//! # }
//! ```

/// Environment-driven client configuration.
pub mod config;
pub use config::{ClientConfig, ConfigError};

/// Key/value persistence standing in for browser storage.
pub mod storage;
pub use storage::{AUTH_TOKEN_KEY, Storage, StorageError, USER_KEY};

/// Session state holder.
pub mod session;
pub use session::{SessionHolder, SessionState, UserSource};

/// HTTP client, request decoration, and API errors.
pub mod net;
pub use net::errors::{ApiError, ErrorBody, ValidationErrors};
pub use net::http::HttpClient;

/// Authentication models and flows.
pub mod auth;
pub use auth::models::User;

/// Current-user and user-scoped collection fetches.
pub mod users;

/// Post, comment, and group records and services.
pub mod content;
