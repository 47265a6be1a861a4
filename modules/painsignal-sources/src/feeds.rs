//! Feed-backed adapters: Indie Hackers and Medium publish no search API, so
//! both pull public RSS feeds and rank entries locally by keyword match.
//! Feed entries carry string ids and no engagement signal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use feed_rs::model::Entry;
use futures::future::join_all;
use tracing::{debug, warn};

use painsignal_common::{age_hours, truncate_chars, CandidateRecord, Source};

use crate::adapter::{http_client, keyword_match_score, strip_html, SourceAdapter};

const INDIE_HACKERS_FEED: &str = "https://feed.indiehackers.world/posts.rss";
const MEDIUM_FEED_BASE: &str = "https://medium.com/feed/tag";
const MEDIUM_TAGS: [&str; 6] = [
    "startup",
    "entrepreneurship",
    "founder",
    "saas",
    "business",
    "indie-hacker",
];

async fn fetch_entries(url: &str) -> Result<Vec<Entry>> {
    let bytes = http_client()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let feed = feed_rs::parser::parse(bytes.as_ref())
        .with_context(|| format!("unparseable feed at {url}"))?;
    Ok(feed.entries)
}

fn entry_to_record(entry: Entry, source: Source) -> Option<CandidateRecord> {
    let url = entry.links.first()?.href.clone();
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let body = entry
        .summary
        .map(|t| strip_html(&t.content))
        .unwrap_or_default();
    let published_at = entry.published.or(entry.updated).unwrap_or_else(Utc::now);
    let id = if entry.id.is_empty() { url.clone() } else { entry.id };

    Some(CandidateRecord {
        id: id.into(),
        title,
        body: truncate_chars(&body, 1000).to_string(),
        url,
        engagement_score: 0,
        comment_count: 0,
        author: entry
            .authors
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        published_at,
        age_hours: age_hours(published_at),
        source,
    })
}

fn rank_by_keyword(
    records: Vec<CandidateRecord>,
    phrase: &str,
    limit: usize,
) -> Vec<CandidateRecord> {
    let mut scored: Vec<(i64, CandidateRecord)> = records
        .into_iter()
        .map(|r| (keyword_match_score(&r.title, &r.body, phrase), r))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, r)| r).take(limit).collect()
}

// --- Indie Hackers ---

pub struct IndieHackersAdapter {
    feed_url: String,
}

impl IndieHackersAdapter {
    pub fn new() -> Self {
        Self {
            feed_url: INDIE_HACKERS_FEED.to_string(),
        }
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }
}

impl Default for IndieHackersAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for IndieHackersAdapter {
    fn source(&self) -> Source {
        Source::Indiehackers
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let entries = fetch_entries(&self.feed_url).await?;
        let records: Vec<CandidateRecord> = entries
            .into_iter()
            .filter_map(|e| entry_to_record(e, Source::Indiehackers))
            .collect();

        debug!(count = records.len(), phrase, "indiehackers feed entries");
        Ok(rank_by_keyword(records, phrase, limit))
    }
}

// --- Medium ---

pub struct MediumAdapter {
    feed_base: String,
}

impl MediumAdapter {
    pub fn new() -> Self {
        Self {
            feed_base: MEDIUM_FEED_BASE.to_string(),
        }
    }

    pub fn with_feed_base(mut self, url: impl Into<String>) -> Self {
        self.feed_base = url.into();
        self
    }

    async fn tag_entries(&self, tag: &str) -> Vec<Entry> {
        let url = format!("{}/{}", self.feed_base, tag);
        match fetch_entries(&url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(tag, error = %e, "medium tag feed failed");
                Vec::new()
            }
        }
    }
}

impl Default for MediumAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for MediumAdapter {
    fn source(&self) -> Source {
        Source::Medium
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let batches = join_all(MEDIUM_TAGS.iter().map(|tag| self.tag_entries(tag))).await;
        let records: Vec<CandidateRecord> = batches
            .into_iter()
            .flatten()
            .filter_map(|e| entry_to_record(e, Source::Medium))
            .collect();

        debug!(count = records.len(), phrase, "medium feed entries");
        Ok(rank_by_keyword(records, phrase, limit))
    }
}
