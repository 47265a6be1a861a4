//! Stack Overflow questions via the Stack Exchange search API, sorted by
//! votes. High-voted unanswered questions are unsolved pain points.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use painsignal_common::{age_hours, truncate_chars, CandidateRecord, Source};

use crate::adapter::{http_client, strip_html, SourceAdapter};

const API_BASE: &str = "https://api.stackexchange.com/2.3";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct Question {
    question_id: i64,
    title: String,
    body: Option<String>,
    link: String,
    score: i64,
    answer_count: i64,
    creation_date: i64,
    owner: Option<Owner>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    display_name: Option<String>,
}

pub struct StackOverflowAdapter {
    base_url: String,
}

impl StackOverflowAdapter {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn to_record(question: Question) -> CandidateRecord {
        let published_at = DateTime::from_timestamp(question.creation_date, 0)
            .unwrap_or_else(Utc::now);
        let body = strip_html(question.body.as_deref().unwrap_or(""));

        CandidateRecord {
            id: question.question_id.into(),
            title: strip_html(&question.title),
            body: truncate_chars(&body, 1000).to_string(),
            url: question.link,
            engagement_score: question.score,
            comment_count: question.answer_count,
            author: question
                .owner
                .and_then(|o| o.display_name)
                .unwrap_or_else(|| "unknown".to_string()),
            published_at,
            age_hours: age_hours(published_at),
            source: Source::Stackoverflow,
        }
    }
}

impl Default for StackOverflowAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for StackOverflowAdapter {
    fn source(&self) -> Source {
        Source::Stackoverflow
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let url = format!("{}/search/advanced", self.base_url);

        let response: SearchResponse = http_client()
            .get(&url)
            .query(&[
                ("order", "desc"),
                ("sort", "votes"),
                ("q", phrase),
                ("site", "stackoverflow"),
                ("pagesize", &limit.to_string()),
                ("filter", "withbody"),
            ])
            .send()
            .await?
            .error_for_status()
            .context("Stack Overflow search failed")?
            .json()
            .await?;

        let records: Vec<CandidateRecord> = response
            .items
            .into_iter()
            .map(Self::to_record)
            .take(limit)
            .collect();

        debug!(count = records.len(), phrase, "stackoverflow questions fetched");
        Ok(records)
    }
}
