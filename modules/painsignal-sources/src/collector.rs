//! Multi-source fan-out: every (phrase × adapter) pair runs concurrently
//! behind a bounded timeout, a failing pair contributes nothing, and the
//! merged pool is deduplicated, ranked, and capped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use painsignal_common::{CandidateRecord, RecordId, Source};

use crate::adapter::SourceAdapter;

/// Over-fetch factor: request this many times the target count across all
/// pairs so downstream filtering still has material to work with.
const OVERFETCH_FACTOR: usize = 3;
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Merged fetch output: the ranked candidate list plus the distinct sources
/// that actually produced records (failed sources are absent).
#[derive(Debug, Clone)]
pub struct CandidatePool {
    pub records: Vec<CandidateRecord>,
    pub sources_seen: Vec<Source>,
}

pub struct Collector {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    fetch_timeout: Duration,
}

impl Collector {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fan out every (phrase × enabled adapter) pair, merge, dedup by record
    /// id (first occurrence wins), rank by engagement then recency, cap to
    /// `limit`.
    pub async fn collect(
        &self,
        phrases: &[String],
        enabled: &HashSet<Source>,
        limit: usize,
    ) -> CandidatePool {
        let adapters: Vec<&Arc<dyn SourceAdapter>> = self
            .adapters
            .iter()
            .filter(|a| enabled.contains(&a.source()))
            .collect();

        let pair_count = adapters.len() * phrases.len();
        if pair_count == 0 || limit == 0 {
            return CandidatePool {
                records: Vec::new(),
                sources_seen: Vec::new(),
            };
        }
        let per_pair = (limit * OVERFETCH_FACTOR).div_ceil(pair_count);

        let fetches = adapters.iter().flat_map(|adapter| {
            phrases.iter().map(move |phrase| {
                self.fetch_one(adapter.as_ref(), phrase, per_pair)
            })
        });
        let batches = join_all(fetches).await;

        let merged: Vec<CandidateRecord> = batches.into_iter().flatten().collect();

        // Distinct sources observed in the merged pool, in canonical order.
        let observed: HashSet<Source> = merged.iter().map(|r| r.source).collect();
        let sources_seen: Vec<Source> = Source::ALL
            .into_iter()
            .filter(|s| observed.contains(s))
            .collect();

        let mut seen_ids: HashSet<RecordId> = HashSet::new();
        let mut records: Vec<CandidateRecord> = Vec::with_capacity(merged.len());
        for record in merged {
            if seen_ids.insert(record.id.clone()) {
                records.push(record);
            }
        }

        // Engagement descending; among equals prefer newer.
        records.sort_by(|a, b| {
            b.engagement_score
                .cmp(&a.engagement_score)
                .then_with(|| a.age_hours.total_cmp(&b.age_hours))
        });
        records.truncate(limit);

        info!(
            candidates = records.len(),
            sources = sources_seen.len(),
            pairs = pair_count,
            "candidate pool assembled"
        );

        CandidatePool {
            records,
            sources_seen,
        }
    }

    /// One (phrase, adapter) fetch. Failures and timeouts resolve to an
    /// empty batch so the fan-in barrier always completes.
    async fn fetch_one(
        &self,
        adapter: &dyn SourceAdapter,
        phrase: &str,
        limit: usize,
    ) -> Vec<CandidateRecord> {
        let source = adapter.source();
        match tokio::time::timeout(self.fetch_timeout, adapter.search(phrase, limit)).await {
            Ok(Ok(records)) => {
                info!(source = %source, phrase, count = records.len(), "source fetch ok");
                records
            }
            Ok(Err(e)) => {
                warn!(source = %source, phrase, error = %e, "source fetch failed");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    source = %source,
                    phrase,
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "source fetch timed out"
                );
                Vec::new()
            }
        }
    }
}
