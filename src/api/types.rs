//! Zendesk API request and response types.
//!
//! These types model the Zendesk Support API v2 payloads for organizations,
//! users, custom fields and background jobs. Timestamps are kept as the
//! ISO-8601 strings the API returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::query::PageOptions;

/// Free-form custom field values keyed by field key.
pub type FieldValues = Map<String, Value>;

/// A loosely-typed result record reported by a finished job.
pub type JobResult = Map<String, Value>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Zendesk organization.
///
/// Returned by `GET /organizations/{id}.json` and the organization list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub name: String,
    /// Domains whose users are added to this organization automatically.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub domain_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_tickets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_fields: Option<FieldValues>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} ({})", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The built-in user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    EndUser,
    Agent,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::EndUser, UserRole::Agent, UserRole::Admin];

    /// The role name as the API spells it.
    pub fn text(&self) -> &'static str {
        match self {
            UserRole::EndUser => "end-user",
            UserRole::Agent => "agent",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.text() == s)
            .ok_or_else(|| format!("unknown user role '{}'", s))
    }
}

/// A Zendesk user.
///
/// Returned by `GET /users/{id}.json`, `GET /users/me.json` and the user list
/// endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_role_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_phone_number: Option<bool>,
    /// Profile photo attachment, left untyped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_private_comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_agent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_agent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_auth_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_csv: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fields: Option<FieldValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{}>", self.name, email),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Filters for `GET /users.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserListOptions {
    #[serde(flatten)]
    pub page: PageOptions,
    /// A single role, sent as `role=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Several roles, sent as repeated `role[]=`.
    #[serde(rename = "role[]", skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<UserRole>,
    /// Custom role id, for agents on plans that support custom roles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_set: Option<i64>,
}

/// A custom user or organization field definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Field type, e.g. `text`, `dropdown`, `checkbox`.
    #[serde(rename = "type")]
    pub field_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp_for_validation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_field_options: Vec<CustomFieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One choice of a dropdown custom field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub value: String,
}

/// Pagination options for custom field lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomFieldListOptions {
    #[serde(flatten)]
    pub page: PageOptions,
}

/// Lifecycle state of a background job.
///
/// `Queued -> Working -> {Completed, Failed, Killed}`; a queued job may also
/// go straight to `Failed` or `Killed`. Terminal states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Working,
    Failed,
    Completed,
    Killed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Queued,
        JobStatus::Working,
        JobStatus::Failed,
        JobStatus::Completed,
        JobStatus::Killed,
    ];

    /// True once processing has finished, successfully or not.
    pub fn terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Failed | JobStatus::Completed | JobStatus::Killed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Working => "working",
            JobStatus::Failed => "failed",
            JobStatus::Completed => "completed",
            JobStatus::Killed => "killed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status '{}'", s))
    }
}

/// A background job created by a bulk mutation.
///
/// Returned by `GET /job_statuses/{id}.json` and by every bulk endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: JobStatus,
    /// Number of tasks, reported while queued or working.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Number of tasks done, reported while queued or working.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Per-record outcomes; their shape depends on the originating operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub results: Vec<JobResult>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.terminal()
    }

    /// The per-record results, available only once the job is terminal.
    pub fn results(&self) -> Option<&[JobResult]> {
        self.is_terminal().then_some(self.results.as_slice())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job {} ({})", self.id, self.status)?;
        if let (Some(progress), Some(total)) = (self.progress, self.total) {
            write!(f, " {}/{}", progress, total)?;
        }
        Ok(())
    }
}
