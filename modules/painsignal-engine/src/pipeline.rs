//! Pipeline orchestration: Expander → Collector → Filter → Extractor →
//! Clusterer → Aggregator, strictly in sequence. Each run is stateless and
//! independent; only the collector fans out internally.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use painsignal_common::{
    CandidateRecord, Cluster, ExtractionVerdict, PainSignalError, PipelineResult, RankedPainPoint,
    Source,
};
use painsignal_sources::{Collector, SourceAdapter};

use crate::cluster::Clusterer;
use crate::expansion::KeywordExpander;
use crate::extract::Extractor;
use crate::oracle::Oracle;
use crate::relevance::RelevanceFilter;

/// Target size of the ranked candidate pool (the collector over-fetches
/// internally to survive downstream filtering).
const CANDIDATE_LIMIT: usize = 30;
/// Maximum records the relevance filter passes to extraction.
const RELEVANT_TOP_N: usize = 30;

/// One search request from the presentation layer.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    /// Adapter identifiers, or the wildcard "all". Unknown identifiers are
    /// silently dropped; an empty result set behaves as "all".
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

fn default_sources() -> Vec<String> {
    vec!["all".to_string()]
}

pub struct Pipeline {
    expander: KeywordExpander,
    collector: Collector,
    filter: RelevanceFilter,
    extractor: Extractor,
    clusterer: Clusterer,
}

impl Pipeline {
    pub fn new(oracle: Arc<dyn Oracle>, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            expander: KeywordExpander::new(oracle.clone()),
            collector: Collector::new(adapters),
            filter: RelevanceFilter::new(oracle.clone()),
            extractor: Extractor::new(oracle.clone()),
            clusterer: Clusterer::new(oracle),
        }
    }

    pub fn with_collector(mut self, collector: Collector) -> Self {
        self.collector = collector;
        self
    }

    /// Run the full pipeline for one request. Errors only on invalid input
    /// or an unrecoverable extraction response; everything else degrades.
    pub async fn run(&self, request: &SearchRequest) -> Result<PipelineResult, PainSignalError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        let keywords = request.keywords.trim();
        if keywords.is_empty() {
            return Err(PainSignalError::Validation("keywords are required".into()));
        }
        let enabled = enabled_sources(&request.sources);

        info!(%run_id, keywords, sources = enabled.len(), "pipeline run starting");

        let expanded = self.expander.expand(keywords).await;

        let pool = self
            .collector
            .collect(&expanded, &enabled, CANDIDATE_LIMIT)
            .await;
        let total_posts = pool.records.len();

        if pool.records.is_empty() {
            info!(%run_id, "no candidates fetched, returning empty result");
            return Ok(empty_result(started, expanded, pool.sources_seen));
        }

        let context = expanded.join(", ");
        let relevant = self
            .filter
            .filter(pool.records, &context, RELEVANT_TOP_N)
            .await;
        let relevant_count = relevant.len();

        let verdicts = self.extractor.extract(&relevant).await?;

        let mut positives: Vec<ExtractionVerdict> = verdicts
            .into_iter()
            .filter(|v| v.has_pain_point)
            .collect();
        positives.sort_by(|a, b| {
            b.composite_score
                .unwrap_or(0.0)
                .total_cmp(&a.composite_score.unwrap_or(0.0))
        });
        let pain_point_count = positives.len();

        let clusters = self.clusterer.cluster(&positives).await;

        let mut pain_points: Vec<RankedPainPoint> = clusters
            .into_iter()
            .map(|cluster| join_record_metadata(cluster, &relevant))
            .collect();
        pain_points.sort_by(|a, b| {
            b.cluster
                .representative
                .composite_score
                .unwrap_or(0.0)
                .total_cmp(&a.cluster.representative.composite_score.unwrap_or(0.0))
        });

        let extraction_rate = if relevant_count > 0 {
            (pain_point_count as f64 / relevant_count as f64) * 100.0
        } else {
            0.0
        };
        let total_mentions = pain_points.iter().map(|p| p.cluster.mention_count).sum();
        let cluster_count = pain_points.len();

        info!(
            %run_id,
            total_posts,
            relevant = relevant_count,
            pain_points = pain_point_count,
            clusters = cluster_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run complete"
        );

        Ok(PipelineResult {
            pain_points,
            total_posts,
            relevant_posts: relevant_count,
            extraction_rate,
            processing_time_ms: started.elapsed().as_millis() as u64,
            sources_used: pool.sources_seen,
            clusters: cluster_count,
            total_mentions,
            expanded_keywords: expanded,
        })
    }
}

/// Resolve requested source identifiers to the enabled set. The wildcard
/// "all", or a request that resolves to nothing, enables everything.
fn enabled_sources(requested: &[String]) -> HashSet<Source> {
    if requested.iter().any(|s| s == "all") {
        return Source::ALL.into_iter().collect();
    }
    let parsed: HashSet<Source> = requested
        .iter()
        .filter_map(|s| {
            let source = Source::parse(s);
            if source.is_none() {
                debug!(identifier = %s, "dropping unrecognized source identifier");
            }
            source
        })
        .collect();
    if parsed.is_empty() {
        Source::ALL.into_iter().collect()
    } else {
        parsed
    }
}

/// Join a cluster's representative back to its originating record. A
/// missing record leaves the metadata fields empty rather than dropping the
/// cluster.
fn join_record_metadata(cluster: Cluster, records: &[CandidateRecord]) -> RankedPainPoint {
    let record = records
        .iter()
        .find(|r| r.id == cluster.representative.record_ref);

    match record {
        Some(r) => RankedPainPoint {
            post_title: r.title.clone(),
            post_url: r.url.clone(),
            post_score: r.engagement_score,
            post_comments: r.comment_count,
            post_source: r.source,
            cluster,
        },
        None => RankedPainPoint {
            post_title: String::new(),
            post_url: String::new(),
            post_score: 0,
            post_comments: 0,
            post_source: cluster.representative.source,
            cluster,
        },
    }
}

fn empty_result(
    started: Instant,
    expanded_keywords: Vec<String>,
    sources_used: Vec<Source>,
) -> PipelineResult {
    PipelineResult {
        pain_points: Vec::new(),
        total_posts: 0,
        relevant_posts: 0,
        extraction_rate: 0.0,
        processing_time_ms: started.elapsed().as_millis() as u64,
        sources_used,
        clusters: 0,
        total_mentions: 0,
        expanded_keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_enables_every_source() {
        let enabled = enabled_sources(&["all".to_string()]);
        assert_eq!(enabled.len(), Source::ALL.len());
    }

    #[test]
    fn unknown_identifiers_are_dropped_silently() {
        let enabled = enabled_sources(&[
            "hackernews".to_string(),
            "quora".to_string(),
            "github".to_string(),
        ]);
        assert_eq!(
            enabled,
            [Source::Hackernews, Source::Github].into_iter().collect()
        );
    }

    #[test]
    fn all_unknown_behaves_as_wildcard() {
        let enabled = enabled_sources(&["quora".to_string(), "yc-rfs".to_string()]);
        assert_eq!(enabled.len(), Source::ALL.len());
    }

    #[test]
    fn empty_request_behaves_as_wildcard() {
        let enabled = enabled_sources(&[]);
        assert_eq!(enabled.len(), Source::ALL.len());
    }
}
