use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::social::views::PostView;
use crate::social::{submit_post, SubmitPostInput};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/posts", post(create_post))
}

// MaybeUser rather than CurrentUser: the missing-caller case is decided by submit_post
async fn create_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Json(input): Json<SubmitPostInput>,
) -> AppResult<(StatusCode, Json<PostView>)> {
    let post = submit_post(
        state.posts.as_ref(),
        viewer.0.as_ref(),
        input,
        state.config.posts.max_attachments,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}
