//! Clustering: collapse semantically similar pain points into themed
//! clusters with one representative each. Small batches skip the oracle,
//! and any top-level failure degrades to singleton clusters — clustering is
//! a quality enhancement, never required for the pipeline to produce output.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use painsignal_common::{Cluster, ExtractionVerdict};

use crate::json::recover_object;
use crate::oracle::Oracle;

/// Below this many verdicts, clustering cost is not justified and the
/// singleton output is already correct.
const CLUSTER_GATE: usize = 10;

#[derive(Debug, Deserialize)]
struct ClusterResponse {
    #[serde(default)]
    clusters: Vec<WireCluster>,
}

#[derive(Debug, Deserialize)]
struct WireCluster {
    theme: String,
    indices: Vec<usize>,
    representative_index: usize,
}

pub struct Clusterer {
    oracle: Arc<dyn Oracle>,
}

impl Clusterer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Group the positive verdicts into clusters. Never fails.
    pub async fn cluster(&self, verdicts: &[ExtractionVerdict]) -> Vec<Cluster> {
        if verdicts.len() < CLUSTER_GATE {
            info!(
                count = verdicts.len(),
                "below clustering threshold, emitting singletons"
            );
            return singletons(verdicts);
        }

        let prompt = cluster_prompt(verdicts);
        let response = match self.oracle.cluster_pain_points(&prompt).await {
            Ok(raw) => match recover_object::<ClusterResponse>(&raw) {
                Ok(response) if !response.clusters.is_empty() => response,
                Ok(_) => {
                    warn!("clustering returned no clusters, falling back to singletons");
                    return singletons(verdicts);
                }
                Err(e) => {
                    warn!(error = %e, "clustering response unparseable, falling back to singletons");
                    return singletons(verdicts);
                }
            },
            Err(e) => {
                warn!(error = %e, "clustering call failed, falling back to singletons");
                return singletons(verdicts);
            }
        };

        let mut clusters = Vec::new();
        for wire in response.clusters {
            let Some(representative) = verdicts.get(wire.representative_index) else {
                warn!(
                    representative_index = wire.representative_index,
                    theme = %wire.theme,
                    "cluster references an invalid representative, skipping"
                );
                continue;
            };

            let members: Vec<usize> = wire
                .indices
                .iter()
                .copied()
                .filter(|&i| i < verdicts.len())
                .collect();
            if members.len() < wire.indices.len() {
                warn!(theme = %wire.theme, "cluster listed out-of-range member indices, dropping them");
            }
            if members.is_empty() {
                warn!(theme = %wire.theme, "cluster has no valid members, skipping");
                continue;
            }

            let similar_statements: Vec<String> = members
                .iter()
                .filter(|&&i| i != wire.representative_index)
                .filter_map(|&i| verdicts[i].pain_point.clone())
                .collect();

            clusters.push(Cluster {
                cluster_id: format!("cluster_{}", clusters.len()),
                theme: wire.theme,
                representative: representative.clone(),
                mention_count: members.len(),
                similar_statements,
            });
        }

        if clusters.is_empty() {
            warn!("no valid clusters survived validation, falling back to singletons");
            return singletons(verdicts);
        }

        info!(
            input = verdicts.len(),
            clusters = clusters.len(),
            "clustering complete"
        );
        clusters
    }
}

fn singletons(verdicts: &[ExtractionVerdict]) -> Vec<Cluster> {
    verdicts
        .iter()
        .enumerate()
        .map(|(i, verdict)| Cluster {
            cluster_id: format!("cluster_{i}"),
            theme: verdict
                .pain_point
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            representative: verdict.clone(),
            mention_count: 1,
            similar_statements: Vec::new(),
        })
        .collect()
}

fn cluster_prompt(verdicts: &[ExtractionVerdict]) -> String {
    let lines = verdicts
        .iter()
        .enumerate()
        .map(|(i, v)| {
            format!(
                "[{i}] {} (score: {})",
                v.pain_point.as_deref().unwrap_or("unknown"),
                v.composite_score
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "N/A".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are grouping similar pain points into clusters.

Pain points:
{lines}

Group these into clusters of SIMILAR problems. For each cluster:
1. Choose the highest-scoring or most specific pain point as the representative
2. Give the cluster a theme (short description of the common problem)
3. List all pain point indices that belong to this cluster

Rules:
- Aim for 3-8 clusters maximum (group aggressively)
- Each cluster needs 1+ pain points
- Pain points about the same core issue belong together even when the wording differs

Return ONLY valid JSON (no markdown, no explanation):
{{
  "clusters": [
    {{ "theme": "Customer acquisition challenges", "indices": [0, 3, 7], "representative_index": 0 }},
    {{ "theme": "Product validation and feedback", "indices": [1, 4], "representative_index": 4 }}
  ]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use painsignal_common::{RecordId, Source};

    use crate::testing::StubOracle;

    use super::*;

    fn verdict(i: i64) -> ExtractionVerdict {
        ExtractionVerdict {
            record_ref: RecordId::Int(i),
            source: Source::Hackernews,
            has_pain_point: true,
            pain_point: Some(format!("pain {i}")),
            intensity: Some(70),
            specificity: Some(70),
            frequency: Some(70),
            composite_score: Some(70.0),
            supporting_quote: Some("quote".to_string()),
            reason: None,
        }
    }

    fn verdicts(n: i64) -> Vec<ExtractionVerdict> {
        (0..n).map(verdict).collect()
    }

    #[tokio::test]
    async fn small_batch_skips_oracle_and_emits_singletons() {
        let oracle = Arc::new(StubOracle::new());
        let input = verdicts(9);

        let clusters = Clusterer::new(oracle.clone()).cluster(&input).await;

        assert_eq!(clusters.len(), 9);
        assert!(clusters.iter().all(|c| c.mention_count == 1));
        assert!(clusters.iter().all(|c| c.similar_statements.is_empty()));
        assert_eq!(oracle.clustering_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mention_counts_sum_to_input_size_on_success() {
        let oracle = Arc::new(StubOracle::new().with_clustering(
            r#"{"clusters": [
                {"theme": "a", "indices": [0, 1, 2, 3], "representative_index": 0},
                {"theme": "b", "indices": [4, 5, 6], "representative_index": 5},
                {"theme": "c", "indices": [7, 8, 9], "representative_index": 9}
            ]}"#,
        ));
        let input = verdicts(10);

        let clusters = Clusterer::new(oracle).cluster(&input).await;

        assert_eq!(clusters.len(), 3);
        let total: usize = clusters.iter().map(|c| c.mention_count).sum();
        assert_eq!(total, 10);
    }

    #[tokio::test]
    async fn representative_statement_is_excluded_from_similars() {
        let oracle = Arc::new(StubOracle::new().with_clustering(
            r#"{"clusters": [
                {"theme": "a", "indices": [0, 1, 2, 3, 4, 5, 6, 7, 8], "representative_index": 1},
                {"theme": "b", "indices": [9], "representative_index": 9}
            ]}"#,
        ));
        let input = verdicts(10);

        let clusters = Clusterer::new(oracle).cluster(&input).await;

        assert_eq!(clusters[0].mention_count, 9);
        assert_eq!(clusters[0].similar_statements.len(), 8);
        assert!(!clusters[0]
            .similar_statements
            .contains(&"pain 1".to_string()));
        assert!(clusters[1].similar_statements.is_empty());
    }

    #[tokio::test]
    async fn invalid_representative_skips_that_cluster_only() {
        let oracle = Arc::new(StubOracle::new().with_clustering(
            r#"{"clusters": [
                {"theme": "bad", "indices": [0, 1], "representative_index": 99},
                {"theme": "good", "indices": [2, 3], "representative_index": 2}
            ]}"#,
        ));
        let input = verdicts(10);

        let clusters = Clusterer::new(oracle).cluster(&input).await;

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].theme, "good");
    }

    #[tokio::test]
    async fn unparseable_response_falls_back_to_singletons() {
        let oracle = Arc::new(StubOracle::new().with_clustering("no json at all"));
        let input = verdicts(12);

        let clusters = Clusterer::new(oracle).cluster(&input).await;

        assert_eq!(clusters.len(), 12);
        assert!(clusters.iter().all(|c| c.mention_count == 1));
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_singletons() {
        let oracle = Arc::new(StubOracle::new());
        let input = verdicts(15);

        let clusters = Clusterer::new(oracle).cluster(&input).await;

        assert_eq!(clusters.len(), 15);
    }
}
