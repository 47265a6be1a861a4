//! Collector fan-out behavior with stub adapters: dedup, ranking, cap, and
//! bulkhead isolation of failing sources.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use painsignal_common::{CandidateRecord, RecordId, Source};
use painsignal_sources::{CandidatePool, Collector, SourceAdapter};

fn record(id: RecordId, source: Source, engagement: i64, age_hours: f64) -> CandidateRecord {
    CandidateRecord {
        id,
        title: "a title".to_string(),
        body: "a body long enough to matter".to_string(),
        url: "https://example.com/post".to_string(),
        engagement_score: engagement,
        comment_count: 2,
        author: "someone".to_string(),
        published_at: Utc::now(),
        age_hours,
        source,
    }
}

struct FixedAdapter {
    source: Source,
    records: Vec<CandidateRecord>,
    calls: Arc<AtomicUsize>,
}

impl FixedAdapter {
    fn new(source: Source, records: Vec<CandidateRecord>) -> Self {
        Self {
            source,
            records,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SourceAdapter for FixedAdapter {
    fn source(&self) -> Source {
        self.source
    }

    async fn search(&self, _phrase: &str, _limit: usize) -> Result<Vec<CandidateRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

struct BrokenAdapter;

#[async_trait]
impl SourceAdapter for BrokenAdapter {
    fn source(&self) -> Source {
        Source::Medium
    }

    async fn search(&self, _phrase: &str, _limit: usize) -> Result<Vec<CandidateRecord>> {
        Err(anyhow!("upstream down"))
    }
}

struct HangingAdapter;

#[async_trait]
impl SourceAdapter for HangingAdapter {
    fn source(&self) -> Source {
        Source::Github
    }

    async fn search(&self, _phrase: &str, _limit: usize) -> Result<Vec<CandidateRecord>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

fn all_sources() -> HashSet<Source> {
    Source::ALL.into_iter().collect()
}

async fn collect(
    adapters: Vec<Arc<dyn SourceAdapter>>,
    phrases: &[&str],
    limit: usize,
) -> CandidatePool {
    let phrases: Vec<String> = phrases.iter().map(|s| s.to_string()).collect();
    Collector::new(adapters)
        .collect(&phrases, &all_sources(), limit)
        .await
}

#[tokio::test]
async fn deduplicates_by_id_and_caps_to_limit() {
    let hn = FixedAdapter::new(
        Source::Hackernews,
        vec![
            record(RecordId::Int(1), Source::Hackernews, 50, 10.0),
            record(RecordId::Int(2), Source::Hackernews, 40, 5.0),
            record(RecordId::Int(1), Source::Hackernews, 50, 10.0),
        ],
    );
    let devto = FixedAdapter::new(
        Source::Devto,
        vec![
            record(RecordId::Int(3), Source::Devto, 90, 2.0),
            record(RecordId::Int(4), Source::Devto, 10, 1.0),
        ],
    );

    let pool = collect(vec![Arc::new(hn), Arc::new(devto)], &["topic"], 3).await;

    let ids: Vec<&RecordId> = pool.records.iter().map(|r| &r.id).collect();
    let distinct: HashSet<&RecordId> = ids.iter().copied().collect();
    assert_eq!(ids.len(), distinct.len(), "no duplicate ids may survive");
    assert!(pool.records.len() <= 3);
}

#[tokio::test]
async fn ranks_by_engagement_then_recency() {
    let adapter = FixedAdapter::new(
        Source::Hackernews,
        vec![
            record(RecordId::Int(1), Source::Hackernews, 10, 50.0),
            record(RecordId::Int(2), Source::Hackernews, 99, 10.0),
            record(RecordId::Int(3), Source::Hackernews, 10, 5.0),
        ],
    );

    let pool = collect(vec![Arc::new(adapter)], &["topic"], 10).await;

    assert_eq!(pool.records[0].id, RecordId::Int(2));
    // Equal engagement: fresher record first.
    assert_eq!(pool.records[1].id, RecordId::Int(3));
    assert_eq!(pool.records[2].id, RecordId::Int(1));
}

#[tokio::test]
async fn failing_adapter_is_isolated_and_absent_from_sources_seen() {
    let healthy = FixedAdapter::new(
        Source::Hackernews,
        vec![record(RecordId::Int(1), Source::Hackernews, 5, 1.0)],
    );

    let pool = collect(vec![Arc::new(healthy), Arc::new(BrokenAdapter)], &["topic"], 10).await;

    assert_eq!(pool.records.len(), 1);
    assert_eq!(pool.sources_seen, vec![Source::Hackernews]);
}

#[tokio::test]
async fn hanging_adapter_cannot_block_the_barrier() {
    let healthy = FixedAdapter::new(
        Source::Devto,
        vec![record(RecordId::Int(7), Source::Devto, 5, 1.0)],
    );

    let phrases = vec!["topic".to_string()];
    let pool = Collector::new(vec![Arc::new(healthy), Arc::new(HangingAdapter)])
        .with_fetch_timeout(Duration::from_millis(50))
        .collect(&phrases, &all_sources(), 10)
        .await;

    assert_eq!(pool.records.len(), 1);
    assert_eq!(pool.sources_seen, vec![Source::Devto]);
}

#[tokio::test]
async fn every_phrase_adapter_pair_is_fetched() {
    let adapter = FixedAdapter::new(Source::Hackernews, Vec::new());
    let calls = adapter.calls.clone();

    collect(vec![Arc::new(adapter)], &["a", "b", "c"], 10).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn disabled_sources_are_not_queried() {
    let adapter = FixedAdapter::new(Source::Hackernews, Vec::new());
    let calls = adapter.calls.clone();

    let phrases = vec!["topic".to_string()];
    let enabled: HashSet<Source> = [Source::Devto].into_iter().collect();
    let pool = Collector::new(vec![Arc::new(adapter)])
        .collect(&phrases, &enabled, 10)
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(pool.records.is_empty());
}

#[tokio::test]
async fn all_adapters_empty_yields_empty_pool() {
    let a = FixedAdapter::new(Source::Hackernews, Vec::new());
    let b = FixedAdapter::new(Source::Devto, Vec::new());

    let pool = collect(vec![Arc::new(a), Arc::new(b)], &["topic"], 10).await;

    assert!(pool.records.is_empty());
    assert!(pool.sources_seen.is_empty());
}
