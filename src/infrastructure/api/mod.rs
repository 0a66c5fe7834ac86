//! Post source clients.
//!
//! Two transports back the post feeds: a plain REST client over the
//! offset-paginated `/posts` endpoint and a GraphQL client posting the
//! `GetPosts` query. Both surface failures as [`ApiError`]; the feed worker
//! flattens them to strings before they reach GUI state.

pub mod graphql;
pub mod rest;
pub mod worker;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("malformed response: {0}")]
    Decode(String),
}
