//! Ask HN posts via the Firebase API. No search endpoint upstream, so this
//! adapter pulls the current Ask HN front list and ranks locally by keyword
//! match.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use tracing::debug;

use painsignal_common::{age_hours, CandidateRecord, Source};

use crate::adapter::{http_client, keyword_match_score, strip_html, SourceAdapter};

const API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
/// Text-only posts below this body length are link drops, not discussions.
const MIN_BODY_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct HnItem {
    id: i64,
    #[serde(rename = "type")]
    item_type: Option<String>,
    title: Option<String>,
    text: Option<String>,
    score: Option<i64>,
    descendants: Option<i64>,
    by: Option<String>,
    time: Option<i64>,
}

pub struct HackerNewsAdapter {
    base_url: String,
}

impl HackerNewsAdapter {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn ask_story_ids(&self, limit: usize) -> Result<Vec<i64>> {
        let url = format!("{}/askstories.json", self.base_url);
        let ids: Vec<i64> = http_client()
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("askstories response was not a JSON id array")?;
        Ok(ids.into_iter().take(limit).collect())
    }

    async fn item(&self, id: i64) -> Option<HnItem> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        let response = http_client().get(&url).send().await.ok()?;
        response.json().await.ok()
    }

    fn to_record(item: HnItem) -> CandidateRecord {
        let published_at = item
            .time
            .and_then(|t| DateTime::from_timestamp(t, 0))
            .unwrap_or_else(Utc::now);
        let body = strip_html(item.text.as_deref().unwrap_or(""));

        CandidateRecord {
            url: format!("https://news.ycombinator.com/item?id={}", item.id),
            id: item.id.into(),
            title: item.title.unwrap_or_default(),
            body,
            engagement_score: item.score.unwrap_or(0),
            comment_count: item.descendants.unwrap_or(0),
            author: item.by.unwrap_or_else(|| "unknown".to_string()),
            published_at,
            age_hours: age_hours(published_at),
            source: Source::Hackernews,
        }
    }
}

impl Default for HackerNewsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    fn source(&self) -> Source {
        Source::Hackernews
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        // Over-fetch: link drops and thin posts get filtered below.
        let ids = self.ask_story_ids(limit * 2).await?;
        let items = join_all(ids.iter().map(|&id| self.item(id))).await;

        let mut records: Vec<CandidateRecord> = items
            .into_iter()
            .flatten()
            .filter(|item| item.item_type.as_deref() == Some("story"))
            .map(Self::to_record)
            .filter(|r| r.body.chars().count() >= MIN_BODY_CHARS)
            .collect();

        debug!(count = records.len(), phrase, "hackernews candidates before ranking");

        // Nothing searchable in the phrase: hand back the front of the list
        // rather than filtering everything out.
        if !phrase.split_whitespace().any(|p| p.len() > 2) {
            records.truncate(limit);
            return Ok(records);
        }

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
