use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use std::sync::Arc;

use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::social::views::UserProfile;
use crate::social::{fetch_user_profile, RequestScope};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/users/{username}", get(user_sidebar))
}

async fn user_sidebar(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Extension(scope): Extension<RequestScope>,
    Path(username): Path<String>,
) -> AppResult<Json<Arc<UserProfile>>> {
    let profile =
        fetch_user_profile(state.posts.as_ref(), &scope, &username, viewer.id()).await?;
    Ok(Json(profile))
}
