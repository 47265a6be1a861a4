//! Product Hunt launches via the site's frontend GraphQL endpoint. Launch
//! taglines and descriptions routinely name the problem the product was
//! built to solve, which makes them dense pain-point material.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use painsignal_common::{age_hours, truncate_chars, CandidateRecord, Source};

use crate::adapter::{http_client, SourceAdapter};

const GRAPHQL_URL: &str = "https://www.producthunt.com/frontend/graphql";
const MAX_FETCH: usize = 50;
const MIN_CONTENT_CHARS: usize = 100;

const SEARCH_QUERY: &str = r#"
query SearchPosts($query: String!, $first: Int!) {
  posts(query: $query, first: $first, order: VOTES) {
    edges {
      node {
        id
        name
        tagline
        description
        votesCount
        commentsCount
        createdAt
        url
        user { name }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PostsData>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: Option<PostsConnection>,
}

#[derive(Debug, Deserialize)]
struct PostsConnection {
    edges: Vec<PostEdge>,
}

#[derive(Debug, Deserialize)]
struct PostEdge {
    node: PostNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostNode {
    id: String,
    name: Option<String>,
    tagline: Option<String>,
    description: Option<String>,
    votes_count: Option<i64>,
    comments_count: Option<i64>,
    created_at: Option<DateTime<Utc>>,
    url: Option<String>,
    user: Option<PostUser>,
}

#[derive(Debug, Deserialize)]
struct PostUser {
    name: Option<String>,
}

pub struct ProductHuntAdapter {
    endpoint: String,
}

impl ProductHuntAdapter {
    pub fn new() -> Self {
        Self {
            endpoint: GRAPHQL_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    fn to_record(node: PostNode) -> CandidateRecord {
        let published_at = node.created_at.unwrap_or_else(Utc::now);
        // Tagline first, then the longer description; either may be absent.
        let body: String = [node.tagline, node.description]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n\n");
        let url = node
            .url
            .unwrap_or_else(|| format!("https://www.producthunt.com/posts/{}", node.id));

        CandidateRecord {
            id: node.id.into(),
            title: node.name.unwrap_or_default(),
            body: truncate_chars(&body, 2000).to_string(),
            url,
            engagement_score: node.votes_count.unwrap_or(0),
            comment_count: node.comments_count.unwrap_or(0),
            author: node
                .user
                .and_then(|u| u.name)
                .unwrap_or_else(|| "unknown".to_string()),
            published_at,
            age_hours: age_hours(published_at),
            source: Source::Producthunt,
        }
    }
}

impl Default for ProductHuntAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for ProductHuntAdapter {
    fn source(&self) -> Source {
        Source::Producthunt
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        // Overfetch: short launch blurbs get filtered out below.
        let first = (limit * 2).min(MAX_FETCH);
        let body = json!({
            "query": SEARCH_QUERY,
            "variables": { "query": phrase, "first": first },
        });

        let response: GraphQlResponse = http_client()
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let edges = response
            .data
            .and_then(|d| d.posts)
            .map(|p| p.edges)
            .unwrap_or_default();

        debug!(count = edges.len(), phrase, "producthunt launches fetched");

        Ok(edges
            .into_iter()
            .map(|e| Self::to_record(e.node))
            .filter(|r| r.body.chars().count() > MIN_CONTENT_CHARS)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tagline: Option<&str>, description: Option<&str>) -> PostNode {
        PostNode {
            id: "ph-123".to_string(),
            name: Some("Deployer".to_string()),
            tagline: tagline.map(String::from),
            description: description.map(String::from),
            votes_count: Some(42),
            comments_count: Some(7),
            created_at: None,
            url: None,
            user: None,
        }
    }

    #[test]
    fn record_joins_tagline_and_description() {
        let r = ProductHuntAdapter::to_record(node(Some("ship faster"), Some("deploys were slow")));
        assert_eq!(r.body, "ship faster\n\ndeploys were slow");
        assert_eq!(r.engagement_score, 42);
        assert_eq!(r.source, Source::Producthunt);
    }

    #[test]
    fn record_falls_back_to_posts_url() {
        let r = ProductHuntAdapter::to_record(node(Some("t"), None));
        assert_eq!(r.url, "https://www.producthunt.com/posts/ph-123");
        assert_eq!(r.body, "t");
    }

    #[test]
    fn response_deserializes_with_missing_optionals() {
        let raw = r#"{"data":{"posts":{"edges":[{"node":{"id":"1","name":"X"}}]}}}"#;
        let parsed: GraphQlResponse = serde_json::from_str(raw).unwrap();
        let edges = parsed.data.unwrap().posts.unwrap().edges;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].node.id, "1");
    }

    #[test]
    fn empty_data_yields_no_edges() {
        let parsed: GraphQlResponse = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(parsed.data.and_then(|d| d.posts).is_none());
    }
}
