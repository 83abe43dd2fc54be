use async_graphql::*;

use crate::extractors::MaybeUser;
use crate::social::repository::DynPostRepository;
use crate::social::views::{TagFeed, UserProfile};
use crate::social::{fetch_tag_feed, fetch_user_profile, RequestScope};

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// A tag with its posts, personalised for the viewer
    async fn tag(&self, ctx: &Context<'_>, id: ID) -> Result<TagFeed> {
        let repo = ctx.data::<DynPostRepository>()?;
        let scope = ctx.data::<RequestScope>()?;
        let viewer = ctx.data::<MaybeUser>()?;

        let feed = fetch_tag_feed(repo.as_ref(), scope, id.as_str(), viewer.id())
            .await
            .map_err(|e| e.extend())?;
        Ok(TagFeed::clone(&feed))
    }

    /// The profile sidebar for a user
    async fn user(&self, ctx: &Context<'_>, username: String) -> Result<UserProfile> {
        let repo = ctx.data::<DynPostRepository>()?;
        let scope = ctx.data::<RequestScope>()?;
        let viewer = ctx.data::<MaybeUser>()?;

        let profile = fetch_user_profile(repo.as_ref(), scope, &username, viewer.id())
            .await
            .map_err(|e| e.extend())?;
        Ok(UserProfile::clone(&profile))
    }
}
