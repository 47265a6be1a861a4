//! Relevance filtering: one batched oracle call scores every candidate
//! 0-100 against the expanded query context. Small batches skip the oracle
//! entirely, and any failure degrades to the first `top_n` records in
//! original order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use painsignal_common::{truncate_chars, CandidateRecord};

use crate::json::recover_array;
use crate::oracle::Oracle;

/// Records scoring at or below this are dropped. Tuned low on purpose:
/// better to let the extractor reject a marginal post than to miss a pain
/// point phrased in unfamiliar terminology.
const SCORE_THRESHOLD: u8 = 30;
const BODY_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct IndexScore {
    index: usize,
    // Wider than the 0-100 contract so an out-of-range score clamps
    // instead of failing the whole array into the degraded path.
    score: i64,
}

impl IndexScore {
    fn clamped(&self) -> u8 {
        self.score.clamp(0, 100) as u8
    }
}

pub struct RelevanceFilter {
    oracle: Arc<dyn Oracle>,
}

impl RelevanceFilter {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Keep the most relevant records, at most `top_n`, score-descending.
    /// A batch of `top_n` or fewer is returned unchanged without any oracle
    /// call.
    pub async fn filter(
        &self,
        records: Vec<CandidateRecord>,
        context: &str,
        top_n: usize,
    ) -> Vec<CandidateRecord> {
        if records.len() <= top_n {
            return records;
        }

        let prompt = relevance_prompt(&records, context);
        let scores = match self.oracle.score_relevance(&prompt).await {
            Ok(raw) => match recover_array::<Vec<IndexScore>>(&raw) {
                Ok(scores) if !scores.is_empty() => scores,
                Ok(_) => {
                    warn!("relevance response was an empty array, keeping first {top_n} records");
                    return records.into_iter().take(top_n).collect();
                }
                Err(e) => {
                    warn!(error = %e, "relevance response unparseable, keeping first {top_n} records");
                    return records.into_iter().take(top_n).collect();
                }
            },
            Err(e) => {
                warn!(error = %e, "relevance call failed, keeping first {top_n} records");
                return records.into_iter().take(top_n).collect();
            }
        };

        let by_index: HashMap<usize, u8> =
            scores.into_iter().map(|s| (s.index, s.clamped())).collect();

        let mut scored: Vec<(u8, CandidateRecord)> = records
            .into_iter()
            .enumerate()
            // An index the oracle did not score counts as irrelevant.
            .map(|(i, r)| (by_index.get(&i).copied().unwrap_or(0), r))
            .filter(|(score, _)| *score > SCORE_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let kept: Vec<CandidateRecord> = scored.into_iter().map(|(_, r)| r).take(top_n).collect();
        info!(kept = kept.len(), "relevance filtering complete");
        kept
    }
}

fn relevance_prompt(records: &[CandidateRecord], context: &str) -> String {
    let mut posts = String::new();
    for (i, record) in records.iter().enumerate() {
        posts.push_str(&format!(
            "\n[{i}]\nTitle: {}\nContent: {}...\nSource: {}\n",
            record.title,
            truncate_chars(&record.body, BODY_PREVIEW_CHARS),
            record.source,
        ));
    }

    format!(
        r#"You are rating discussion posts for relevance to a search query.

Search query and related terms: "{context}"

Rate each post's relevance 0-100:
- 0-20: completely unrelated
- 21-40: tangentially related, only brief mention
- 41-60: somewhat related, discusses related problems or contexts
- 61-80: clearly related, discusses the topic or closely related concepts
- 81-100: highly relevant, topic is the main focus

Be generous: capture discussions about related problems even when the terminology differs. If a post discusses problems, challenges, or pain points in the topic area, score it 60+.

Posts to rate:
{posts}

Return ONLY a valid JSON array in this exact format (no markdown, no explanation):
[
  {{"index": 0, "score": 75}},
  {{"index": 1, "score": 45}}
]"#
    )
}
