//! Organization operations.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use super::client::{Client, ACCEPT_CREATED_OR_OK};
use super::context::Context;
use super::envelope::Envelope;
use super::error::Result;
use super::jobs::JOB;
use super::query::{self, ShowMany};
use super::types::{Job, Organization};

const ORGANIZATION: Envelope = Envelope::one("organization");
const ORGANIZATIONS: Envelope = Envelope::many("organizations");

/// Organization CRUD and bulk updates.
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    async fn create_organization(&self, ctx: &Context, org: &Organization) -> Result<Organization>;

    async fn get_organization(&self, ctx: &Context, id: i64) -> Result<Organization>;

    /// Fetch several organizations in one request.
    async fn get_organizations(&self, ctx: &Context, ids: &[i64]) -> Result<Vec<Organization>>;

    /// Fetch several organizations by external id in one request.
    async fn get_organizations_by_external_id(
        &self,
        ctx: &Context,
        external_ids: &[&str],
    ) -> Result<Vec<Organization>>;

    async fn update_organization(
        &self,
        ctx: &Context,
        id: i64,
        org: &Organization,
    ) -> Result<Organization>;

    /// Create the organization, or update it when one matches by id or
    /// external id. The flag is `true` when it was created.
    async fn create_or_update_organization(
        &self,
        ctx: &Context,
        org: &Organization,
    ) -> Result<(Organization, bool)>;

    /// Update up to 100 organizations through a background job.
    async fn update_many_organizations(&self, ctx: &Context, orgs: &[Organization]) -> Result<Job>;

    async fn delete_organization(&self, ctx: &Context, id: i64) -> Result<()>;
}

#[async_trait]
impl OrganizationApi for Client {
    #[instrument(skip(self, ctx, org), fields(name = %org.name))]
    async fn create_organization(&self, ctx: &Context, org: &Organization) -> Result<Organization> {
        let body = ORGANIZATION.wrap(org)?;
        let response = self.post(ctx, "/organizations.json", &body).await?;
        let created: Organization = ORGANIZATION.unwrap(&response)?;
        debug!("Created organization: {}", created);
        Ok(created)
    }

    #[instrument(skip(self, ctx))]
    async fn get_organization(&self, ctx: &Context, id: i64) -> Result<Organization> {
        self.fetch(ctx, &format!("/organizations/{}.json", id), ORGANIZATION)
            .await
    }

    #[instrument(skip(self, ctx), fields(count = ids.len()))]
    async fn get_organizations(&self, ctx: &Context, ids: &[i64]) -> Result<Vec<Organization>> {
        let path = query::add_options("/organizations/show_many.json", Some(&ShowMany::ids(ids)))?;
        self.fetch(ctx, &path, ORGANIZATIONS).await
    }

    #[instrument(skip(self, ctx), fields(count = external_ids.len()))]
    async fn get_organizations_by_external_id(
        &self,
        ctx: &Context,
        external_ids: &[&str],
    ) -> Result<Vec<Organization>> {
        let filter = ShowMany::external_ids(external_ids);
        let path = query::add_options("/organizations/show_many.json", Some(&filter))?;
        self.fetch(ctx, &path, ORGANIZATIONS).await
    }

    #[instrument(skip(self, ctx, org))]
    async fn update_organization(
        &self,
        ctx: &Context,
        id: i64,
        org: &Organization,
    ) -> Result<Organization> {
        let body = ORGANIZATION.wrap(org)?;
        let response = self
            .put(ctx, &format!("/organizations/{}.json", id), &body)
            .await?;
        ORGANIZATION.unwrap(&response)
    }

    #[instrument(skip(self, ctx, org), fields(name = %org.name))]
    async fn create_or_update_organization(
        &self,
        ctx: &Context,
        org: &Organization,
    ) -> Result<(Organization, bool)> {
        let body = ORGANIZATION.wrap(org)?;
        let response = self
            .post_accepting(
                ctx,
                "/organizations/create_or_update.json",
                &body,
                ACCEPT_CREATED_OR_OK,
            )
            .await?;
        let created = response.status == StatusCode::CREATED;
        let org: Organization = ORGANIZATION.unwrap(&response.body)?;
        debug!(created, "Upserted organization: {}", org);
        Ok((org, created))
    }

    #[instrument(skip(self, ctx, orgs), fields(count = orgs.len()))]
    async fn update_many_organizations(&self, ctx: &Context, orgs: &[Organization]) -> Result<Job> {
        let body = ORGANIZATIONS.wrap(orgs)?;
        let response = self
            .post_accepting(
                ctx,
                "/organizations/update_many.json",
                &body,
                &[StatusCode::OK],
            )
            .await?;
        let job: Job = JOB.unwrap(&response.body)?;
        debug!("Queued {}", job);
        Ok(job)
    }

    #[instrument(skip(self, ctx))]
    async fn delete_organization(&self, ctx: &Context, id: i64) -> Result<()> {
        self.delete(ctx, &format!("/organizations/{}.json", id))
            .await
    }
}
