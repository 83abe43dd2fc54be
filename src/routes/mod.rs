pub mod graphql;
pub mod posts;
pub mod tags;
pub mod users;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::social::RequestScope;
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(tags::router())
        .merge(posts::router())
        .merge(users::router())
        .merge(graphql::router())
        .layer(middleware::from_fn(request_scope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Give every request its own memo scope, dropped when the response is sent.
async fn request_scope(mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(RequestScope::default());
    next.run(req).await
}

async fn health() -> &'static str {
    "ok"
}
