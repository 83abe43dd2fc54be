use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use axum::extract::State;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::extractors::MaybeUser;
use crate::social::RequestScope;
use crate::state::AppState;

/// GraphQL endpoint handler
async fn graphql_handler(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let request = req
        .data(state.posts.clone())
        .data(viewer)
        .data(scope)
        .data(state.config.posts.clone());

    let response = state.graphql_schema.execute(request).await;
    Json(response)
}

/// GraphQL Playground UI (development tool)
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// GraphQL router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
}
