//! User operations.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use super::client::{Client, ACCEPT_CREATED_OR_OK};
use super::context::Context;
use super::envelope::Envelope;
use super::error::Result;
use super::jobs::JOB;
use super::page::Page;
use super::query::{self, ShowMany};
use super::types::{Job, User, UserListOptions};

const USER: Envelope = Envelope::one("user");
const USERS: Envelope = Envelope::many("users");

/// User CRUD, listing and bulk mutations.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// List users, optionally filtered by role.
    async fn get_users(
        &self,
        ctx: &Context,
        opts: Option<&UserListOptions>,
    ) -> Result<(Vec<User>, Page)>;

    /// Fetch the page after `page`, or `None` when `page` was the last one.
    async fn get_users_next(&self, ctx: &Context, page: &Page) -> Result<Option<(Vec<User>, Page)>>;

    async fn get_user(&self, ctx: &Context, id: i64) -> Result<User>;

    /// Fetch several users in one request.
    async fn get_many_users(&self, ctx: &Context, ids: &[i64]) -> Result<Vec<User>>;

    /// The user the client is authenticated as.
    async fn get_current_user(&self, ctx: &Context) -> Result<User>;

    async fn create_user(&self, ctx: &Context, user: &User) -> Result<User>;

    /// Create the user, or update the one matching by email or external id.
    /// The flag is `true` when it was created.
    async fn create_or_update_user(&self, ctx: &Context, user: &User) -> Result<(User, bool)>;

    /// Create or update up to 100 users through a background job.
    async fn create_or_update_many_users(&self, ctx: &Context, users: &[User]) -> Result<Job>;

    async fn update_user(&self, ctx: &Context, id: i64, user: &User) -> Result<User>;

    /// Update up to 100 users (each carrying its id) through a background job.
    async fn update_many_users(&self, ctx: &Context, users: &[User]) -> Result<Job>;

    /// Soft-delete a user.
    async fn delete_user(&self, ctx: &Context, id: i64) -> Result<()>;
}

#[async_trait]
impl UserApi for Client {
    #[instrument(skip(self, ctx, opts))]
    async fn get_users(
        &self,
        ctx: &Context,
        opts: Option<&UserListOptions>,
    ) -> Result<(Vec<User>, Page)> {
        let path = query::add_options("/users.json", opts)?;
        let (users, page) = self.fetch_page(ctx, &path, USERS).await?;
        debug!("Found {} users (has_next: {})", users.len(), page.has_next());
        Ok((users, page))
    }

    #[instrument(skip(self, ctx, page))]
    async fn get_users_next(&self, ctx: &Context, page: &Page) -> Result<Option<(Vec<User>, Page)>> {
        self.follow(ctx, page, USERS).await
    }

    #[instrument(skip(self, ctx))]
    async fn get_user(&self, ctx: &Context, id: i64) -> Result<User> {
        self.fetch(ctx, &format!("/users/{}.json", id), USER).await
    }

    #[instrument(skip(self, ctx), fields(count = ids.len()))]
    async fn get_many_users(&self, ctx: &Context, ids: &[i64]) -> Result<Vec<User>> {
        let path = query::add_options("/users/show_many.json", Some(&ShowMany::ids(ids)))?;
        self.fetch(ctx, &path, USERS).await
    }

    #[instrument(skip(self, ctx))]
    async fn get_current_user(&self, ctx: &Context) -> Result<User> {
        self.fetch(ctx, "/users/me.json", USER).await
    }

    #[instrument(skip(self, ctx, user), fields(name = %user.name))]
    async fn create_user(&self, ctx: &Context, user: &User) -> Result<User> {
        let body = USER.wrap(user)?;
        let response = self.post(ctx, "/users.json", &body).await?;
        let created: User = USER.unwrap(&response)?;
        debug!("Created user: {}", created);
        Ok(created)
    }

    #[instrument(skip(self, ctx, user), fields(name = %user.name))]
    async fn create_or_update_user(&self, ctx: &Context, user: &User) -> Result<(User, bool)> {
        let body = USER.wrap(user)?;
        let response = self
            .post_accepting(ctx, "/users/create_or_update.json", &body, ACCEPT_CREATED_OR_OK)
            .await?;
        let created = response.status == StatusCode::CREATED;
        let user: User = USER.unwrap(&response.body)?;
        Ok((user, created))
    }

    #[instrument(skip(self, ctx, users), fields(count = users.len()))]
    async fn create_or_update_many_users(&self, ctx: &Context, users: &[User]) -> Result<Job> {
        let body = USERS.wrap(users)?;
        let response = self
            .post_accepting(
                ctx,
                "/users/create_or_update_many.json",
                &body,
                &[StatusCode::OK],
            )
            .await?;
        let job: Job = JOB.unwrap(&response.body)?;
        debug!("Queued {}", job);
        Ok(job)
    }

    #[instrument(skip(self, ctx, user))]
    async fn update_user(&self, ctx: &Context, id: i64, user: &User) -> Result<User> {
        let body = USER.wrap(user)?;
        let response = self
            .put(ctx, &format!("/users/{}.json", id), &body)
            .await?;
        USER.unwrap(&response)
    }

    #[instrument(skip(self, ctx, users), fields(count = users.len()))]
    async fn update_many_users(&self, ctx: &Context, users: &[User]) -> Result<Job> {
        let body = USERS.wrap(users)?;
        let response = self.put(ctx, "/users/update_many.json", &body).await?;
        let job: Job = JOB.unwrap(&response)?;
        debug!("Queued {}", job);
        Ok(job)
    }

    #[instrument(skip(self, ctx))]
    async fn delete_user(&self, ctx: &Context, id: i64) -> Result<()> {
        self.delete(ctx, &format!("/users/{}.json", id)).await
    }
}
