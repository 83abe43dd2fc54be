use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::sync::Arc;

use crate::config::Config;
use crate::graphql::{build_schema, FeedSchema};
use crate::social::repository::{DynPostRepository, SqlitePostRepository};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub posts: DynPostRepository,
    pub graphql_schema: FeedSchema,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            posts: Arc::new(SqlitePostRepository::new(db.clone())),
            db,
            config,
            graphql_schema: build_schema(),
        }
    }
}
