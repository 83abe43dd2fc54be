use async_graphql::{EmptySubscription, Schema};

use super::mutations::MutationRoot;
use super::queries::QueryRoot;

/// GraphQL Schema type
pub type FeedSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema.
///
/// Per-request data is attached to each `async_graphql::Request`: the
/// `DynPostRepository`, the viewer as `MaybeUser`, a fresh `RequestScope` and
/// the `PostsConfig`.
pub fn build_schema() -> FeedSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}
