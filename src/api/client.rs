//! Zendesk API client implementation.
//!
//! This module provides the request dispatcher every resource operation goes
//! through. It attaches credentials, serializes bodies, checks the response
//! status against the operation's accepted set and hands the raw body back
//! for envelope decoding.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::auth::Credential;
use super::context::Context;
use super::envelope::Envelope;
use super::error::{ApiError, Result};
use super::page::Page;
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use super::types::User;
use super::users::UserApi;
use crate::config::Profile;

const ACCEPT_OK: &[StatusCode] = &[StatusCode::OK];
const ACCEPT_CREATED: &[StatusCode] = &[StatusCode::CREATED];
const ACCEPT_DELETED: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];

/// Statuses accepted by create-or-update endpoints.
pub(crate) const ACCEPT_CREATED_OR_OK: &[StatusCode] = &[StatusCode::CREATED, StatusCode::OK];

const JSON: &str = "application/json";

/// The Zendesk API client.
///
/// Holds the base endpoint, the credential and a shared transport. There is
/// no other state, so a `Client` can be cloned freely and used from many
/// tasks at once.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    credential: Credential,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client from a profile.
    ///
    /// Resolves the endpoint and credential and validates the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The profile is invalid or its secret cannot be found
    /// - The HTTP client cannot be built
    /// - Connection validation fails
    #[instrument(skip(profile), fields(profile_name = %profile.name))]
    pub async fn connect(profile: &Profile) -> crate::error::Result<Self> {
        info!("Creating Zendesk client for profile");

        let client = Self::from_profile(profile)?;
        client.validate_connection(&Context::background()).await?;

        info!("Zendesk client created and connection validated");
        Ok(client)
    }

    /// Create a client from a profile without touching the network.
    pub fn from_profile(profile: &Profile) -> crate::error::Result<Self> {
        profile.validate()?;
        let endpoint = profile.endpoint()?;
        let credential = profile.credential()?;
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(profile.timeout_secs()))
            .map_err(ApiError::from)?;
        Ok(Self::with_transport(&endpoint, credential, Arc::new(transport)))
    }

    /// Create a client from `ZENDESK_*` environment variables.
    pub fn from_env() -> crate::error::Result<Self> {
        let profile = Profile::from_env()?;
        Self::from_profile(&profile)
    }

    /// Create a client with explicit credentials and the default transport.
    ///
    /// Does NOT validate the connection.
    pub fn with_credentials(base_url: &str, credential: Credential) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(base_url, credential, Arc::new(transport)))
    }

    /// Create a client for `https://{subdomain}.zendesk.com/api/v2`.
    pub fn for_subdomain(subdomain: &str, credential: Credential) -> Result<Self> {
        Self::with_credentials(&subdomain_endpoint(subdomain), credential)
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(
        base_url: &str,
        credential: Credential,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            credential,
            transport,
        }
    }

    /// Validate the connection by fetching the authenticated user.
    #[instrument(skip(self, ctx))]
    pub async fn validate_connection(&self, ctx: &Context) -> Result<User> {
        debug!("Validating Zendesk connection");

        let user = self.get_current_user(ctx).await.map_err(|e| {
            warn!("Connection validation failed: {}", e);
            e
        })?;

        info!("Connected as user: {}", user.name);
        Ok(user)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one request and check its status.
    ///
    /// `accepted` defaults to 200 for GET/PUT, 201 for POST and 200/204 for
    /// DELETE. GET and DELETE never carry a body. Statuses outside the set
    /// become [`ApiError::Http`] (or [`ApiError::NotFound`] for 404) holding
    /// the raw, undecoded body.
    #[instrument(skip(self, ctx, body, accepted), fields(method = %method, path = %path))]
    pub async fn dispatch(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<&Value>,
        accepted: Option<&[StatusCode]>,
    ) -> Result<HttpResponse> {
        let url = self.resolve(path)?;
        let accepted = accepted.unwrap_or_else(|| default_accepted(&method));

        let body = if method == Method::GET || method == Method::DELETE {
            None
        } else {
            body.map(serde_json::to_vec)
                .transpose()
                .map_err(|e| ApiError::Encoding(format!("cannot serialize body: {}", e)))?
        };

        let mut headers = vec![
            (
                header::AUTHORIZATION.as_str().to_string(),
                self.credential.header_value().to_string(),
            ),
            (header::ACCEPT.as_str().to_string(), JSON.to_string()),
        ];
        if body.is_some() {
            headers.push((header::CONTENT_TYPE.as_str().to_string(), JSON.to_string()));
        }

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };

        let response = ctx
            .run(async { self.transport.send(request).await.map_err(ApiError::from) })
            .await
            .map_err(|e| {
                debug!("Request did not complete: {}", e);
                e
            })?;

        if accepted.contains(&response.status) {
            debug!(status = %response.status, "Request accepted");
            Ok(response)
        } else {
            debug!(
                status = %response.status,
                body = %String::from_utf8_lossy(&response.body),
                "Request rejected"
            );
            Err(ApiError::from_status(response.status, response.body))
        }
    }

    pub(crate) async fn get(&self, ctx: &Context, path: &str) -> Result<Vec<u8>> {
        let response = self.dispatch(ctx, Method::GET, path, None, None).await?;
        Ok(response.body)
    }

    pub(crate) async fn post(&self, ctx: &Context, path: &str, body: &Value) -> Result<Vec<u8>> {
        let response = self
            .dispatch(ctx, Method::POST, path, Some(body), None)
            .await?;
        Ok(response.body)
    }

    pub(crate) async fn post_accepting(
        &self,
        ctx: &Context,
        path: &str,
        body: &Value,
        accepted: &[StatusCode],
    ) -> Result<HttpResponse> {
        self.dispatch(ctx, Method::POST, path, Some(body), Some(accepted))
            .await
    }

    pub(crate) async fn put(&self, ctx: &Context, path: &str, body: &Value) -> Result<Vec<u8>> {
        let response = self
            .dispatch(ctx, Method::PUT, path, Some(body), None)
            .await?;
        Ok(response.body)
    }

    pub(crate) async fn delete(&self, ctx: &Context, path: &str) -> Result<()> {
        self.dispatch(ctx, Method::DELETE, path, None, None).await?;
        Ok(())
    }

    /// GET `path` and decode the payload under `envelope`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        envelope: Envelope,
    ) -> Result<T> {
        let body = self.get(ctx, path).await?;
        envelope.unwrap(&body)
    }

    /// GET `path` and decode a list payload with its inline page cursor.
    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        envelope: Envelope,
    ) -> Result<(Vec<T>, Page)> {
        let body = self.get(ctx, path).await?;
        envelope.unwrap_page(&body)
    }

    /// Follow the page's `next` cursor, or return `None` on the final page.
    pub(crate) async fn follow<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        page: &Page,
        envelope: Envelope,
    ) -> Result<Option<(Vec<T>, Page)>> {
        let Some(next) = page.next() else {
            return Ok(None);
        };
        self.fetch_page(ctx, next, envelope).await.map(Some)
    }

    /// Turn a relative path or a same-origin cursor URL into an absolute URL.
    fn resolve(&self, path: &str) -> Result<String> {
        if path.starts_with("https://") || path.starts_with("http://") {
            let same_origin = path
                .strip_prefix(&self.base_url)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']));
            if !same_origin {
                return Err(ApiError::Encoding(format!(
                    "refusing to send credentials to '{}' outside {}",
                    path, self.base_url
                )));
            }
            return Ok(path.to_string());
        }

        if path.starts_with('/') {
            Ok(format!("{}{}", self.base_url, path))
        } else {
            Ok(format!("{}/{}", self.base_url, path))
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

fn default_accepted(method: &Method) -> &'static [StatusCode] {
    if *method == Method::POST {
        ACCEPT_CREATED
    } else if *method == Method::DELETE {
        ACCEPT_DELETED
    } else {
        ACCEPT_OK
    }
}

/// The API endpoint for a Zendesk subdomain.
pub fn subdomain_endpoint(subdomain: &str) -> String {
    format!("https://{}.zendesk.com/api/v2", subdomain)
}

/// Normalize the base URL by removing trailing slashes and warning on plain HTTP.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for local testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::transport::fake::FakeTransport;

    const BASE: &str = "https://acme.zendesk.com/api/v2";

    fn client(transport: Arc<FakeTransport>) -> Client {
        Client::with_transport(BASE, Credential::bearer("t0ken"), transport)
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://acme.zendesk.com/api/v2/"),
            "https://acme.zendesk.com/api/v2"
        );
        assert_eq!(
            normalize_base_url("https://acme.zendesk.com/api/v2///"),
            "https://acme.zendesk.com/api/v2"
        );
    }

    #[test]
    fn test_subdomain_endpoint() {
        assert_eq!(subdomain_endpoint("acme"), BASE);
    }

    #[test]
    fn test_default_accepted_statuses() {
        assert_eq!(default_accepted(&Method::GET), &[StatusCode::OK]);
        assert_eq!(default_accepted(&Method::PUT), &[StatusCode::OK]);
        assert_eq!(default_accepted(&Method::POST), &[StatusCode::CREATED]);
        assert!(default_accepted(&Method::DELETE).contains(&StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn test_get_attaches_credentials_and_omits_body() {
        let fake = FakeTransport::new();
        fake.reply(200, json!({}));

        let body = json!({"ignored": true});
        client(fake.clone())
            .dispatch(&Context::background(), Method::GET, "/users.json", Some(&body), None)
            .await
            .unwrap();

        let request = fake.last_request();
        assert_eq!(request.url, format!("{}/users.json", BASE));
        assert_eq!(request.header("authorization"), Some("Bearer t0ken"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("content-type"), None);
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_delete_omits_body_and_content_type() {
        let fake = FakeTransport::new();
        fake.reply_raw(204, Vec::new());

        let body = json!({"user": {"id": 1}});
        client(fake.clone())
            .dispatch(&Context::background(), Method::DELETE, "/users/1.json", Some(&body), None)
            .await
            .unwrap();

        let request = fake.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert!(request.body.is_none());
        assert_eq!(request.header("content-type"), None);
        assert_eq!(request.header("authorization"), Some("Bearer t0ken"));
    }

    #[tokio::test]
    async fn test_post_serializes_body() {
        let fake = FakeTransport::new();
        fake.reply(201, json!({}));

        let body = json!({"user": {"name": "a"}});
        client(fake.clone())
            .post(&Context::background(), "/users.json", &body)
            .await
            .unwrap();

        assert_eq!(fake.last_request().header("content-type"), Some("application/json"));
        assert_eq!(fake.last_body(), body);
    }

    #[tokio::test]
    async fn test_post_rejects_200_by_default() {
        let fake = FakeTransport::new();
        fake.reply(200, json!({}));

        let err = client(fake)
            .post(&Context::background(), "/users.json", &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_status(200));
    }

    #[tokio::test]
    async fn test_explicit_accepted_statuses_override_default() {
        let fake = FakeTransport::new();
        fake.reply(200, json!({}));

        let response = client(fake)
            .post_accepting(&Context::background(), "/x.json", &json!({}), ACCEPT_OK)
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_server_error_keeps_raw_body() {
        let fake = FakeTransport::new();
        fake.reply(500, json!({"error": "InternalError"}));

        let err = client(fake)
            .get(&Context::background(), "/users/1.json")
            .await
            .unwrap_err();
        assert!(err.is_status(500));
        assert_eq!(err.body_text().unwrap(), r#"{"error":"InternalError"}"#);
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let fake = FakeTransport::new();
        fake.reply(404, json!({"error": "RecordNotFound"}));

        let err = client(fake)
            .get(&Context::background(), "/users/1.json")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let fake = FakeTransport::new();
        fake.reply_raw(204, Vec::new());

        client(fake.clone())
            .delete(&Context::background(), "/users/1.json")
            .await
            .unwrap();
        assert_eq!(fake.last_request().method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_transport_failure_is_connectivity() {
        let fake = FakeTransport::new();
        fake.fail("connection refused");

        let err = client(fake)
            .get(&Context::background(), "/users.json")
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_sends() {
        let fake = FakeTransport::new();
        fake.reply(200, json!({}));
        let ctx = Context::background();
        ctx.cancel();

        let err = client(fake.clone())
            .get(&ctx, "/users.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_aborts_stalled_request() {
        let fake = FakeTransport::stalled();
        let ctx = Context::with_timeout(Duration::from_millis(20));

        let err = client(fake)
            .get(&ctx, "/users.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DeadlineExceeded));
        assert!(!err.is_connectivity());
    }

    #[tokio::test]
    async fn test_same_origin_cursor_is_followed_verbatim() {
        let fake = FakeTransport::new();
        fake.reply(200, json!({}));

        let cursor = format!("{}/users.json?page=2&per_page=1", BASE);
        client(fake.clone())
            .get(&Context::background(), &cursor)
            .await
            .unwrap();
        assert_eq!(fake.last_request().url, cursor);
    }

    #[tokio::test]
    async fn test_foreign_cursor_is_rejected() {
        let fake = FakeTransport::new();

        let err = client(fake.clone())
            .get(&Context::background(), "https://evil.example.com/api/v2/users.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Encoding(_)));
        assert!(fake.requests().is_empty());

        let err = client(fake)
            .get(&Context::background(), "https://acme.zendesk.com/api/v2evil/users.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_follow_final_page_does_not_dispatch() {
        let fake = FakeTransport::new();
        let page = Page::default();

        let out: Option<(Vec<Value>, Page)> = client(fake.clone())
            .follow(&Context::background(), &page, Envelope::many("users"))
            .await
            .unwrap();
        assert!(out.is_none());
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_debug_hides_credential() {
        let client = client(FakeTransport::new());
        assert!(!format!("{:?}", client).contains("t0ken"));
    }
}
