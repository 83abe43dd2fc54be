use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::social::views::TagFeed;
use crate::social::{fetch_tag_feed, tag_page_title, RequestScope};
use crate::state::AppState;

#[derive(Serialize)]
pub struct TagPage {
    pub title: String,
    pub feed: Arc<TagFeed>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tags/{id}", get(tag_page))
}

/// Title and feed are fetched separately, the way a page and its metadata
/// are rendered; the request scope turns the second fetch into a lookup.
async fn tag_page(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Extension(scope): Extension<RequestScope>,
    Path(id): Path<String>,
) -> AppResult<Json<TagPage>> {
    let repo = state.posts.as_ref();

    let title = tag_page_title(repo, &scope, &id, viewer.id()).await?;
    let feed = fetch_tag_feed(repo, &scope, &id, viewer.id()).await?;

    Ok(Json(TagPage { title, feed }))
}
