// Library exports for tagfeed
// This allows integration tests and the binary to share modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod graphql;
pub mod routes;
pub mod social;
pub mod state;
