//! A typed async client for the Zendesk REST API.
//!
//! Resource operations (organizations, users, custom fields, background
//! jobs) are grouped into capability traits implemented by [`Client`]. All of
//! them go through one dispatcher that attaches credentials, checks statuses
//! and decodes the resource envelope.
//!
//! ```no_run
//! use zendesk::api::{Context, UserApi, UserListOptions, UserRole};
//! use zendesk::Client;
//!
//! # async fn run() -> zendesk::Result<()> {
//! let client = Client::from_env()?;
//! let ctx = Context::background();
//!
//! let opts = UserListOptions {
//!     roles: vec![UserRole::Admin],
//!     ..Default::default()
//! };
//! let (mut admins, mut page) = client.get_users(&ctx, Some(&opts)).await?;
//! while let Some((more, next)) = client.get_users_next(&ctx, &page).await? {
//!     admins.extend(more);
//!     page = next;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;

pub use api::{ApiError, Client, Context};
pub use config::{Config, Profile};
pub use error::{Error, Result};
