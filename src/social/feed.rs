use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::social::repository::PostRepository;
use crate::social::scope::RequestScope;
use crate::social::views::{TagFeed, UserProfile};

/// Load a tag and its posts, decorated for `viewer_id`.
///
/// Repeated calls with the same tag and viewer inside one request hit the
/// scope instead of the database. An unknown tag is `NotFound`.
pub async fn fetch_tag_feed(
    repo: &dyn PostRepository,
    scope: &RequestScope,
    tag_id: &str,
    viewer_id: Option<&str>,
) -> AppResult<Arc<TagFeed>> {
    let key = (tag_id.to_string(), viewer_id.map(str::to_string));

    let feed = scope
        .tag_feeds
        .get_or_try_init(key, || async {
            let Some(tag) = repo.find_tag(tag_id).await? else {
                return Ok::<_, AppError>(None);
            };
            let posts = repo.find_posts_by_tag(&tag.id, viewer_id).await?;
            Ok(Some(Arc::new(TagFeed { tag, posts })))
        })
        .await?;

    feed.ok_or(AppError::NotFound)
}

/// Title for the tag page, sharing the feed lookup with the page body.
pub async fn tag_page_title(
    repo: &dyn PostRepository,
    scope: &RequestScope,
    tag_id: &str,
    viewer_id: Option<&str>,
) -> AppResult<String> {
    Ok(fetch_tag_feed(repo, scope, tag_id, viewer_id).await?.title())
}

/// The "about this user" sidebar for `username`.
pub async fn fetch_user_profile(
    repo: &dyn PostRepository,
    scope: &RequestScope,
    username: &str,
    viewer_id: Option<&str>,
) -> AppResult<Arc<UserProfile>> {
    let key = (username.to_string(), viewer_id.map(str::to_string));

    let profile = scope
        .profiles
        .get_or_try_init(key, || async {
            let profile = repo.find_user_profile(username, viewer_id).await?;
            Ok::<_, AppError>(profile.map(Arc::new))
        })
        .await?;

    profile.ok_or(AppError::NotFound)
}
