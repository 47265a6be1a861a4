//! Dev.to articles via the Forem API, pulled across a fixed spread of
//! discussion-heavy tags and ranked locally by keyword match.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use painsignal_common::{age_hours, truncate_chars, CandidateRecord, Source};

use crate::adapter::{http_client, keyword_match_score, SourceAdapter};

const API_BASE: &str = "https://dev.to/api";
const TAGS: [&str; 6] = ["startup", "entrepreneur", "business", "showdev", "discuss", "help"];
const MIN_BODY_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct DevToArticle {
    id: i64,
    title: Option<String>,
    description: Option<String>,
    body_markdown: Option<String>,
    url: String,
    public_reactions_count: Option<i64>,
    comments_count: Option<i64>,
    published_at: Option<DateTime<Utc>>,
    user: Option<DevToUser>,
}

#[derive(Debug, Deserialize)]
struct DevToUser {
    username: Option<String>,
}

pub struct DevToAdapter {
    base_url: String,
}

impl DevToAdapter {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn articles_for_tag(&self, tag: &str, per_page: usize) -> Vec<DevToArticle> {
        let url = format!("{}/articles?tag={}&per_page={}", self.base_url, tag, per_page);
        match http_client().get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                response.json().await.unwrap_or_default()
            }
            Ok(response) => {
                warn!(tag, status = %response.status(), "dev.to tag fetch failed");
                Vec::new()
            }
            Err(e) => {
                warn!(tag, error = %e, "dev.to tag fetch failed");
                Vec::new()
            }
        }
    }

    fn to_record(article: DevToArticle) -> CandidateRecord {
        let published_at = article.published_at.unwrap_or_else(Utc::now);
        let body = article
            .description
            .or(article.body_markdown)
            .unwrap_or_default();

        CandidateRecord {
            id: article.id.into(),
            title: article.title.unwrap_or_default(),
            body: truncate_chars(&body, 1000).to_string(),
            url: article.url,
            engagement_score: article.public_reactions_count.unwrap_or(0),
            comment_count: article.comments_count.unwrap_or(0),
            author: article
                .user
                .and_then(|u| u.username)
                .unwrap_or_else(|| "unknown".to_string()),
            published_at,
            age_hours: age_hours(published_at),
            source: Source::Devto,
        }
    }
}

impl Default for DevToAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for DevToAdapter {
    fn source(&self) -> Source {
        Source::Devto
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let per_tag = limit.div_ceil(TAGS.len()).max(5);
        let batches = join_all(TAGS.iter().map(|tag| self.articles_for_tag(tag, per_tag))).await;

        let mut records: Vec<CandidateRecord> = batches
            .into_iter()
            .flatten()
            .map(Self::to_record)
            .filter(|r| r.body.chars().count() >= MIN_BODY_CHARS)
            .collect();

        debug!(count = records.len(), phrase, "dev.to candidates before ranking");

        let mut scored: Vec<(i64, CandidateRecord)> = records
            .drain(..)
            .map(|r| (keyword_match_score(&r.title, &r.body, phrase), r))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .filter(|(score, _)| *score > 0)
            .map(|(_, r)| r)
            .take(limit)
            .collect())
    }
}
