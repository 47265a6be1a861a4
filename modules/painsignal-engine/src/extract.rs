//! Pain point extraction: one batched few-shot oracle call over the
//! filtered records. Unlike the other oracle stages this one has no silent
//! fallback — "no pain points found" and "the response could not be parsed"
//! are materially different outcomes and the caller must see the second as
//! an error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use painsignal_common::{
    truncate_chars, CandidateRecord, ExtractionVerdict, PainSignalError, RecordId,
};

use crate::json::recover_array;
use crate::oracle::Oracle;

const BODY_PREVIEW_CHARS: usize = 500;
const RESPONSE_PREVIEW_CHARS: usize = 200;
/// Oracle composite values further than this from the recomputed mean get
/// replaced (and logged) rather than trusted.
const COMPOSITE_TOLERANCE: f64 = 0.1;

/// One row of the oracle's extraction response, aligned by `post_id`.
#[derive(Debug, Deserialize)]
struct ExtractionRow {
    post_id: RecordId,
    has_pain_point: bool,
    pain_point: Option<String>,
    intensity: Option<f64>,
    specificity: Option<f64>,
    frequency: Option<f64>,
    composite_score: Option<f64>,
    supporting_quote: Option<String>,
    reason: Option<String>,
}

pub struct Extractor {
    oracle: Arc<dyn Oracle>,
}

impl Extractor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// One verdict per input record. Errors only when the oracle response
    /// carries no recoverable JSON array at all.
    pub async fn extract(
        &self,
        records: &[CandidateRecord],
    ) -> Result<Vec<ExtractionVerdict>, PainSignalError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = extraction_prompt(records);
        let raw = self
            .oracle
            .extract_pain_points(&prompt)
            .await
            .map_err(|e| PainSignalError::Extraction(format!("oracle call failed: {e}")))?;

        let rows: Vec<ExtractionRow> = recover_array(&raw).map_err(|e| {
            PainSignalError::Extraction(format!(
                "unparseable extraction response ({e}); response began: {:?}",
                truncate_chars(&raw, RESPONSE_PREVIEW_CHARS)
            ))
        })?;

        let mut by_id: HashMap<RecordId, ExtractionRow> =
            rows.into_iter().map(|r| (r.post_id.clone(), r)).collect();

        let verdicts: Vec<ExtractionVerdict> = records
            .iter()
            .map(|record| match by_id.remove(&record.id) {
                Some(row) => row_to_verdict(row, record),
                None => ExtractionVerdict::no_pain_point(
                    record.id.clone(),
                    record.source,
                    "not returned by extraction",
                ),
            })
            .collect();

        let found = verdicts.iter().filter(|v| v.has_pain_point).count();
        info!(
            records = records.len(),
            pain_points = found,
            "extraction complete"
        );
        Ok(verdicts)
    }
}

fn row_to_verdict(row: ExtractionRow, record: &CandidateRecord) -> ExtractionVerdict {
    if !row.has_pain_point {
        return ExtractionVerdict {
            record_ref: record.id.clone(),
            source: record.source,
            has_pain_point: false,
            pain_point: None,
            intensity: None,
            specificity: None,
            frequency: None,
            composite_score: None,
            supporting_quote: None,
            reason: row.reason,
        };
    }

    let intensity = clamp_score(row.intensity);
    let specificity = clamp_score(row.specificity);
    let frequency = clamp_score(row.frequency);
    let composite = recompute_composite(intensity, specificity, frequency);

    if let Some(claimed) = row.composite_score {
        if (claimed - composite).abs() > COMPOSITE_TOLERANCE {
            warn!(
                post_id = %record.id,
                claimed,
                recomputed = composite,
                "composite score mismatch, using recomputed value"
            );
        }
    }

    ExtractionVerdict {
        record_ref: record.id.clone(),
        source: record.source,
        has_pain_point: true,
        pain_point: row.pain_point,
        intensity: Some(intensity),
        specificity: Some(specificity),
        frequency: Some(frequency),
        composite_score: Some(composite),
        supporting_quote: row.supporting_quote,
        reason: None,
    }
}

fn clamp_score(value: Option<f64>) -> u8 {
    value.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8
}

/// Mean of the three sub-scores, rounded to one decimal place.
fn recompute_composite(intensity: u8, specificity: u8, frequency: u8) -> f64 {
    let mean = (intensity as f64 + specificity as f64 + frequency as f64) / 3.0;
    (mean * 10.0).round() / 10.0
}

fn extraction_prompt(records: &[CandidateRecord]) -> String {
    let posts = records
        .iter()
        .map(|r| {
            format!(
                "POST {}: {}\nContent: {}...\nURL: {}\n",
                r.id,
                r.title,
                truncate_chars(&r.body, BODY_PREVIEW_CHARS),
                r.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n\n");

    format!(
        r#"You are analyzing discussion posts to extract actionable pain points that builders could create products around.

For each post below, identify:
1. Is there a genuine pain point or problem being expressed?
2. If yes, extract the specific pain point
3. Score on three dimensions (0-100):
   - Intensity: how frustrated/desperate?
   - Specificity: how actionable?
   - Frequency: recurring problem?

### Scoring guide

Intensity:
- 90-100: extreme frustration ("nightmare", "crushing me")
- 70-89: high frustration ("killing my", "eating all my time")
- 50-69: moderate frustration ("annoying", "painful")
- 30-49: mild annoyance
- 0-29: barely frustrated

Specificity:
- 90-100: concrete workflow pain with specific numbers/details
- 70-89: clear problem with actionable elements
- 50-69: problem described but vague solution space
- 30-49: abstract complaint
- 0-29: extremely vague

Frequency:
- 90-100: daily/weekly recurring ("every day", "3-4 hours daily")
- 70-89: monthly recurring ("third time this year")
- 50-69: occasional but repeated
- 30-49: might be one-time
- 0-29: clearly one-time event

### Reject if
- Survey/discussion threads ("What are you working on?")
- Success stories without problems
- General "what do you think" questions
- Self-promotional content
- Technical curiosity questions
- Post content under 50 characters

### Examples

Example 1 — YES, pain point:
Post: "The assistant keeps introducing linter errors. I've taught it my style guide but it forgets. Wastes so many tokens."
- has_pain_point: true
- pain_point: "AI coding tools not maintaining code style consistency, wasting tokens"
- intensity: 75, specificity: 90, frequency: 90, composite_score: 85.0

Example 2 — NO, survey:
Post: "What are you working on? Any new ideas?"
- has_pain_point: false
- reason: "Survey thread, no specific pain expressed"

POSTS TO ANALYZE:
{posts}

Return your analysis as a JSON array. For each post, either:
- no pain point: {{ "post_id": <id>, "has_pain_point": false, "reason": "brief reason" }}
- pain point: {{ "post_id": <id>, "has_pain_point": true, "pain_point": "concise description", "intensity": 0-100, "specificity": 0-100, "frequency": 0-100, "composite_score": (intensity + specificity + frequency) / 3, "supporting_quote": "direct quote from post" }}

Return ONLY valid JSON, no other text."#
    )
}
