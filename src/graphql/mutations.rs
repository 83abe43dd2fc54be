use async_graphql::*;

use crate::config::PostsConfig;
use crate::extractors::MaybeUser;
use crate::graphql::types::NewPostInput;
use crate::social::repository::DynPostRepository;
use crate::social::submit_post;
use crate::social::views::PostView;

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a post as the signed-in user, creating any tags that do not exist yet
    async fn submit_post(&self, ctx: &Context<'_>, input: NewPostInput) -> Result<PostView> {
        let repo = ctx.data::<DynPostRepository>()?;
        let viewer = ctx.data::<MaybeUser>()?;
        let limits = ctx.data::<PostsConfig>()?;

        submit_post(
            repo.as_ref(),
            viewer.0.as_ref(),
            input.into(),
            limits.max_attachments,
        )
        .await
        .map_err(|e| e.extend())
    }
}
