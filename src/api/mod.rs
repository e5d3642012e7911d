//! Zendesk API client and types.
//!
//! Every resource operation goes through one dispatcher on [`Client`]; the
//! operations themselves are grouped into capability traits so callers can
//! depend on just the slice of the API they use (and fake it in tests).

mod auth;
mod client;
mod context;
mod custom_fields;
mod envelope;
mod error;
mod jobs;
mod organizations;
mod page;
mod query;
mod transport;
mod types;
mod users;

pub use auth::{delete_token, get_token, store_token, Credential, KEYRING_SERVICE};
pub use client::{subdomain_endpoint, Client};
pub use context::Context;
pub use custom_fields::{OrganizationFieldApi, UserFieldApi};
pub use envelope::{Cardinality, Envelope};
pub use error::{ApiError, ErrorDetails, Result};
pub use jobs::JobStatusApi;
pub use organizations::OrganizationApi;
pub use page::Page;
pub use query::{add_options, encode, PageOptions, ShowMany};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use types::{
    CustomField, CustomFieldListOptions, CustomFieldOption, FieldValues, Job, JobResult,
    JobStatus, Organization, User, UserListOptions, UserRole,
};
pub use users::UserApi;

/// The full Zendesk API surface.
pub trait Api: OrganizationApi + UserApi + UserFieldApi + OrganizationFieldApi + JobStatusApi {}

impl<T> Api for T where
    T: OrganizationApi + UserApi + UserFieldApi + OrganizationFieldApi + JobStatusApi
{
}
