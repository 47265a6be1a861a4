//! GitHub issue search. Open issues with active discussion are explicit,
//! already-articulated pain points; engagement is reactions plus comments.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use painsignal_common::{age_hours, truncate_chars, CandidateRecord, Source};

use crate::adapter::{http_client, SourceAdapter};

const API_BASE: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    id: i64,
    title: String,
    body: Option<String>,
    html_url: String,
    created_at: DateTime<Utc>,
    comments: i64,
    user: Option<IssueUser>,
    reactions: Option<Reactions>,
}

#[derive(Debug, Deserialize)]
struct IssueUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reactions {
    total_count: Option<i64>,
}

pub struct GitHubAdapter {
    base_url: String,
}

impl GitHubAdapter {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn to_record(issue: Issue) -> CandidateRecord {
        let reactions = issue
            .reactions
            .and_then(|r| r.total_count)
            .unwrap_or(0);

        CandidateRecord {
            id: issue.id.into(),
            title: issue.title,
            body: truncate_chars(issue.body.as_deref().unwrap_or(""), 1000).to_string(),
            url: issue.html_url,
            engagement_score: reactions + issue.comments,
            comment_count: issue.comments,
            author: issue
                .user
                .and_then(|u| u.login)
                .unwrap_or_else(|| "unknown".to_string()),
            published_at: issue.created_at,
            age_hours: age_hours(issue.created_at),
            source: Source::Github,
        }
    }
}

impl Default for GitHubAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for GitHubAdapter {
    fn source(&self) -> Source {
        Source::Github
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let query = format!("{phrase} is:issue is:open sort:comments-desc");
        let url = format!("{}/search/issues", self.base_url);

        let response: SearchResponse = http_client()
            .get(&url)
            .query(&[("q", query.as_str()), ("per_page", &limit.to_string())])
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?
            .error_for_status()
            .context("GitHub issue search failed")?
            .json()
            .await?;

        let records: Vec<CandidateRecord> = response
            .items
            .into_iter()
            .map(Self::to_record)
            .filter(|r| r.comment_count > 0)
            .take(limit)
            .collect();

        debug!(count = records.len(), phrase, "github issues fetched");
        Ok(records)
    }
}
