//! GraphQL post source.
//!
//! Posts the `GetPosts` query as a plain `{query, variables}` document and
//! decodes the paginated envelope `{ data: [...], meta: { totalCount } }`.
//! Ids arrive as GraphQL `ID` strings and are parsed to integers here so the
//! rest of the application sees one `Post` shape regardless of source.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::domain::models::Post;
use crate::domain::pagination::{GqlFetchRequest, PostsPage};
use crate::infrastructure::api::ApiError;

const GET_POSTS_QUERY: &str = r#"
query GetPosts($page: Int!, $limit: Int!, $q: String) {
  posts(options: { paginate: { page: $page, limit: $limit }, search: { q: $q } }) {
    data {
      id
      title
      body
      user { id }
    }
    meta {
      totalCount
    }
  }
}
"#;

pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub async fn fetch_page(&self, request: &GqlFetchRequest) -> Result<PostsPage, ApiError> {
        debug!(page = request.page, search = ?request.search, "fetching GraphQL posts page");

        let body = GraphQlRequest {
            query: GET_POSTS_QUERY,
            variables: json!({
                "page": request.page,
                "limit": request.limit,
                "q": request.search,
            }),
        };

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        let envelope: GraphQlResponse = response.json().await?;
        decode_posts(envelope)
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<PostsData>,
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Deserialize)]
struct PostsData {
    posts: WirePosts,
}

#[derive(Deserialize)]
struct WirePosts {
    #[serde(default)]
    data: Vec<WirePost>,
    meta: Option<WireMeta>,
}

#[derive(Deserialize)]
struct WirePost {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    user: Option<WireUser>,
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
}

#[derive(Deserialize)]
struct WireMeta {
    #[serde(rename = "totalCount")]
    total_count: Option<usize>,
}

fn decode_posts(envelope: GraphQlResponse) -> Result<PostsPage, ApiError> {
    if let Some(errors) = envelope.errors {
        if let Some(first) = errors.first() {
            return Err(ApiError::GraphQl(first.message.clone()));
        }
    }

    let posts = envelope
        .data
        .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))?
        .posts;

    let total_count = posts.meta.and_then(|meta| meta.total_count);
    let posts = posts
        .data
        .into_iter()
        .map(|wire| {
            let id = parse_id(&wire.id)?;
            let user_id = match wire.user {
                Some(user) => parse_id(&user.id)?,
                None => 0,
            };
            Ok(Post {
                id,
                title: wire.title,
                body: wire.body,
                user_id,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(PostsPage { posts, total_count })
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Decode(format!("non-numeric id {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_paginated_envelope() {
        let raw = r#"{
            "data": {
                "posts": {
                    "data": [
                        {"id": "1", "title": "a", "body": "b", "user": {"id": "7"}},
                        {"id": "2", "title": "c", "body": "d", "user": null}
                    ],
                    "meta": {"totalCount": 100}
                }
            }
        }"#;
        let envelope: GraphQlResponse = serde_json::from_str(raw).unwrap();
        let page = decode_posts(envelope).unwrap();

        assert_eq!(page.total_count, Some(100));
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].user_id, 7);
        assert_eq!(page.posts[1].user_id, 0);
    }

    #[test]
    fn graphql_errors_win_over_data() {
        let raw = r#"{"data": null, "errors": [{"message": "boom"}]}"#;
        let envelope: GraphQlResponse = serde_json::from_str(raw).unwrap();
        let err = decode_posts(envelope).unwrap_err();
        assert!(matches!(err, ApiError::GraphQl(message) if message == "boom"));
    }

    #[test]
    fn non_numeric_id_is_a_decode_error() {
        let raw = r#"{
            "data": {"posts": {"data": [{"id": "x1", "title": "", "body": "", "user": null}], "meta": null}}
        }"#;
        let envelope: GraphQlResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            decode_posts(envelope).unwrap_err(),
            ApiError::Decode(_)
        ));
    }
}
