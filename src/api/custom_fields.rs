//! Custom field definitions for users and organizations.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::client::Client;
use super::context::Context;
use super::envelope::Envelope;
use super::error::Result;
use super::page::Page;
use super::query;
use super::types::{CustomField, CustomFieldListOptions};

const USER_FIELDS: Envelope = Envelope::many("user_fields");
const ORGANIZATION_FIELDS: Envelope = Envelope::many("organization_fields");

/// Custom user field definitions.
#[async_trait]
pub trait UserFieldApi: Send + Sync {
    async fn get_user_fields(
        &self,
        ctx: &Context,
        opts: Option<&CustomFieldListOptions>,
    ) -> Result<(Vec<CustomField>, Page)>;

    async fn get_user_fields_next(
        &self,
        ctx: &Context,
        page: &Page,
    ) -> Result<Option<(Vec<CustomField>, Page)>>;
}

/// Custom organization field definitions.
#[async_trait]
pub trait OrganizationFieldApi: Send + Sync {
    async fn get_organization_fields(
        &self,
        ctx: &Context,
        opts: Option<&CustomFieldListOptions>,
    ) -> Result<(Vec<CustomField>, Page)>;

    async fn get_organization_fields_next(
        &self,
        ctx: &Context,
        page: &Page,
    ) -> Result<Option<(Vec<CustomField>, Page)>>;
}

#[async_trait]
impl UserFieldApi for Client {
    #[instrument(skip(self, ctx, opts))]
    async fn get_user_fields(
        &self,
        ctx: &Context,
        opts: Option<&CustomFieldListOptions>,
    ) -> Result<(Vec<CustomField>, Page)> {
        let path = query::add_options("/user_fields.json", opts)?;
        let (fields, page) = self.fetch_page(ctx, &path, USER_FIELDS).await?;
        debug!("Found {} user fields", fields.len());
        Ok((fields, page))
    }

    async fn get_user_fields_next(
        &self,
        ctx: &Context,
        page: &Page,
    ) -> Result<Option<(Vec<CustomField>, Page)>> {
        self.follow(ctx, page, USER_FIELDS).await
    }
}

#[async_trait]
impl OrganizationFieldApi for Client {
    #[instrument(skip(self, ctx, opts))]
    async fn get_organization_fields(
        &self,
        ctx: &Context,
        opts: Option<&CustomFieldListOptions>,
    ) -> Result<(Vec<CustomField>, Page)> {
        let path = query::add_options("/organization_fields.json", opts)?;
        let (fields, page) = self.fetch_page(ctx, &path, ORGANIZATION_FIELDS).await?;
        debug!("Found {} organization fields", fields.len());
        Ok((fields, page))
    }

    async fn get_organization_fields_next(
        &self,
        ctx: &Context,
        page: &Page,
    ) -> Result<Option<(Vec<CustomField>, Page)>> {
        self.follow(ctx, page, ORGANIZATION_FIELDS).await
    }
}
