//! Background job status lookups.
//!
//! Bulk endpoints return a [`Job`] instead of a result. Callers observe
//! completion by polling these lookups; nothing here loops or sleeps, so the
//! poll interval and overall timeout stay with the caller.
//!
//! Zendesk keeps only recent jobs (the last 100, for about an hour). A lookup
//! for an older id fails with [`ApiError::NotFound`](super::ApiError::NotFound),
//! which callers should read as "result expired".

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::client::Client;
use super::context::Context;
use super::envelope::Envelope;
use super::error::Result;
use super::query::{self, ShowMany};
use super::types::Job;

pub(crate) const JOB: Envelope = Envelope::one("job_status");
pub(crate) const JOBS: Envelope = Envelope::many("job_statuses");

/// Job status lookups.
#[async_trait]
pub trait JobStatusApi: Send + Sync {
    /// All jobs currently visible to the account.
    async fn list_jobs(&self, ctx: &Context) -> Result<Vec<Job>>;

    /// The current state of one job.
    async fn get_job(&self, ctx: &Context, id: &str) -> Result<Job>;

    /// The current state of several jobs in a single request.
    ///
    /// Results are not ordered relative to `ids`; index them by [`Job::id`].
    async fn get_jobs(&self, ctx: &Context, ids: &[&str]) -> Result<Vec<Job>>;
}

#[async_trait]
impl JobStatusApi for Client {
    #[instrument(skip(self, ctx))]
    async fn list_jobs(&self, ctx: &Context) -> Result<Vec<Job>> {
        let jobs: Vec<Job> = self.fetch(ctx, "/job_statuses.json", JOBS).await?;
        debug!("Listed {} jobs", jobs.len());
        Ok(jobs)
    }

    #[instrument(skip(self, ctx), fields(job_id = %id))]
    async fn get_job(&self, ctx: &Context, id: &str) -> Result<Job> {
        let path = format!("/job_statuses/{}.json", urlencoding::encode(id));
        let job: Job = self.fetch(ctx, &path, JOB).await?;
        debug!("Job status: {}", job.status);
        Ok(job)
    }

    #[instrument(skip(self, ctx), fields(count = ids.len()))]
    async fn get_jobs(&self, ctx: &Context, ids: &[&str]) -> Result<Vec<Job>> {
        let filter = ShowMany::ids(ids);
        let path = query::add_options("/job_statuses/show_many.json", Some(&filter))?;
        self.fetch(ctx, &path, JOBS).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;

    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::auth::Credential;
    use crate::api::error::ApiError;
    use crate::api::transport::fake::FakeTransport;
    use crate::api::types::JobStatus;

    fn client(transport: Arc<FakeTransport>) -> Client {
        Client::with_transport(
            "https://acme.zendesk.com/api/v2",
            Credential::api_token("agent@example.com", "abc"),
            transport,
        )
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let fake = FakeTransport::new();
        fake.reply(
            200,
            json!({"job_statuses": [
                {"id": "a", "status": "queued"},
                {"id": "b", "status": "completed", "results": []}
            ]}),
        );

        let jobs = client(fake.clone())
            .list_jobs(&Context::background())
            .await
            .unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(fake.last_request().url.ends_with("/job_statuses.json"));
    }

    #[tokio::test]
    async fn test_get_job() {
        let fake = FakeTransport::new();
        fake.reply(
            200,
            json!({"job_status": {
                "id": "e57bc8b851f93833d87748557c9b7e4b",
                "status": "failed",
                "message": "Failed to process"
            }}),
        );

        let job = client(fake.clone())
            .get_job(&Context::background(), "e57bc8b851f93833d87748557c9b7e4b")
            .await
            .unwrap();
        assert_eq!(job.id, "e57bc8b851f93833d87748557c9b7e4b");
        assert!(job.is_terminal());
        assert_eq!(job.message.as_deref(), Some("Failed to process"));

        let request = fake.last_request();
        assert_eq!(request.method, Method::GET);
        assert!(request
            .url
            .ends_with("/job_statuses/e57bc8b851f93833d87748557c9b7e4b.json"));
    }

    #[tokio::test]
    async fn test_get_job_expired() {
        let fake = FakeTransport::new();
        fake.reply(404, json!({"error": "RecordNotFound", "description": "Not found"}));

        let err = client(fake)
            .get_job(&Context::background(), "gone")
            .await
            .unwrap_err();
        assert!(err.is_expired_job());
    }

    #[tokio::test]
    async fn test_get_jobs_is_one_request() {
        let fake = FakeTransport::new();
        fake.reply(
            200,
            json!({"job_statuses": [
                {"id": "c", "status": "working", "total": 3, "progress": 1},
                {"id": "a", "status": "completed"},
                {"id": "b", "status": "killed"}
            ]}),
        );

        let jobs = client(fake.clone())
            .get_jobs(&Context::background(), &["a", "b", "c"])
            .await
            .unwrap();

        assert_eq!(fake.requests().len(), 1);
        assert!(fake
            .last_request()
            .url
            .ends_with("/job_statuses/show_many.json?ids=a%2Cb%2Cc"));

        let by_id: HashMap<_, _> = jobs.iter().map(|job| (job.id.as_str(), job)).collect();
        assert_eq!(by_id["a"].status, JobStatus::Completed);
        assert_eq!(by_id["c"].progress, Some(1));
    }

    #[tokio::test]
    async fn test_get_jobs_one_request_for_any_id_count() {
        let id_sets: [&[&str]; 3] = [&[], &["a"], &["a", "b", "c"]];
        for ids in id_sets {
            let fake = FakeTransport::new();
            fake.reply(200, json!({"job_statuses": []}));

            let jobs = client(fake.clone())
                .get_jobs(&Context::background(), ids)
                .await
                .unwrap();
            assert!(jobs.is_empty());
            assert_eq!(fake.requests().len(), 1, "ids: {:?}", ids);
            assert!(fake
                .last_request()
                .url
                .contains("/job_statuses/show_many.json?ids="));
        }
    }

    #[tokio::test]
    async fn test_missing_envelope_is_decode_error() {
        let fake = FakeTransport::new();
        fake.reply(200, json!({"job": {"id": "a", "status": "queued"}}));

        let err = client(fake)
            .get_job(&Context::background(), "a")
            .await
            .unwrap_err();
        assert!(err.is_decode());
    }

    /// Serves a scripted sequence of states for one job.
    struct ScriptedJobs {
        states: Mutex<Vec<JobStatus>>,
    }

    #[async_trait]
    impl JobStatusApi for ScriptedJobs {
        async fn list_jobs(&self, _ctx: &Context) -> Result<Vec<Job>> {
            Ok(Vec::new())
        }

        async fn get_job(&self, _ctx: &Context, id: &str) -> Result<Job> {
            let mut states = self.states.lock().unwrap();
            if states.is_empty() {
                return Err(ApiError::NotFound { body: Vec::new() });
            }
            Ok(Job {
                id: id.to_string(),
                url: None,
                status: states.remove(0),
                total: None,
                progress: None,
                message: None,
                results: Vec::new(),
            })
        }

        async fn get_jobs(&self, _ctx: &Context, _ids: &[&str]) -> Result<Vec<Job>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_caller_owned_polling_loop() {
        let api = ScriptedJobs {
            states: Mutex::new(vec![
                JobStatus::Queued,
                JobStatus::Working,
                JobStatus::Completed,
            ]),
        };
        let ctx = Context::background();

        let mut polls = 0;
        let job = loop {
            polls += 1;
            let job = api.get_job(&ctx, "j1").await.unwrap();
            if job.is_terminal() {
                break job;
            }
        };
        assert_eq!(polls, 3);
        assert_eq!(job.status, JobStatus::Completed);

        // Once retention passes, the same id is gone.
        let err = api.get_job(&ctx, "j1").await.unwrap_err();
        assert!(err.is_expired_job());
    }
}
