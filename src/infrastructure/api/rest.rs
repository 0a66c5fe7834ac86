//! REST post source.
//!
//! Offset-based pagination over `GET {base}/posts?_start={n}&_limit={limit}`.
//! The endpoint reports no total count; end-of-data is inferred from a short
//! page by the feed state machine.

use tracing::debug;

use crate::domain::models::{CreatePostRequest, Post, UpdatePostRequest};
use crate::infrastructure::api::ApiError;

pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_page(&self, start: usize, limit: usize) -> Result<Vec<Post>, ApiError> {
        let url = format!(
            "{}/posts?_start={}&_limit={}",
            self.base_url, start, limit
        );
        debug!(%url, "fetching posts page");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    pub async fn create_post(&self, request: &CreatePostRequest) -> Result<Post, ApiError> {
        let url = format!("{}/posts", self.base_url);
        debug!(%url, title = %request.title, "creating post");

        let response = self.http.post(&url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    pub async fn update_post(&self, id: i64, request: &UpdatePostRequest) -> Result<Post, ApiError> {
        let url = format!("{}/posts/{}", self.base_url, id);
        debug!(%url, "updating post");

        let response = self.http.patch(&url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}
