use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Sources ---

/// The content sources the pipeline can pull candidates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Hackernews,
    Devto,
    Github,
    Stackoverflow,
    Indiehackers,
    Medium,
    Producthunt,
    #[serde(rename = "yc-rfs")]
    YcRfs,
    Failory,
    Quora,
}

impl Source {
    pub const ALL: [Source; 10] = [
        Source::Hackernews,
        Source::Devto,
        Source::Github,
        Source::Stackoverflow,
        Source::Indiehackers,
        Source::Medium,
        Source::Producthunt,
        Source::YcRfs,
        Source::Failory,
        Source::Quora,
    ];

    /// Parse a source identifier from the request payload.
    /// Unknown identifiers yield None and are dropped by the caller.
    pub fn parse(s: &str) -> Option<Source> {
        match s {
            "hackernews" => Some(Source::Hackernews),
            "devto" => Some(Source::Devto),
            "github" => Some(Source::Github),
            "stackoverflow" => Some(Source::Stackoverflow),
            "indiehackers" => Some(Source::Indiehackers),
            "medium" => Some(Source::Medium),
            "producthunt" => Some(Source::Producthunt),
            "yc-rfs" => Some(Source::YcRfs),
            "failory" => Some(Source::Failory),
            "quora" => Some(Source::Quora),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Hackernews => write!(f, "hackernews"),
            Source::Devto => write!(f, "devto"),
            Source::Github => write!(f, "github"),
            Source::Stackoverflow => write!(f, "stackoverflow"),
            Source::Indiehackers => write!(f, "indiehackers"),
            Source::Medium => write!(f, "medium"),
            Source::Producthunt => write!(f, "producthunt"),
            Source::YcRfs => write!(f, "yc-rfs"),
            Source::Failory => write!(f, "failory"),
            Source::Quora => write!(f, "quora"),
        }
    }
}

// --- Record identity ---

/// A record id as the source reports it. Numeric for API-backed sources
/// (Hacker News, Dev.to, GitHub, Stack Overflow), string for feed- and
/// page-backed ones (Indie Hackers, Medium, Product Hunt, the scraped
/// sites).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Str(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

// --- Candidate records ---

/// One normalized unit of content from any source, pre-filtering.
///
/// `source` + `id` is the true identity key. In-pipeline dedup goes by `id`
/// alone; a cross-source id collision would drop a legitimate record. The
/// sources in play make that rare enough to live with, but it is a known
/// limitation, not a guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: RecordId,
    pub title: String,
    /// Truncated body text, already stripped of markup by the adapter.
    pub body: String,
    pub url: String,
    /// Source-defined popularity signal (points, reactions, votes).
    pub engagement_score: i64,
    pub comment_count: i64,
    pub author: String,
    pub published_at: DateTime<Utc>,
    /// Derived at fetch time from `published_at`.
    pub age_hours: f64,
    pub source: Source,
}

/// Hours elapsed since `published_at`, clamped at zero for clock skew.
pub fn age_hours(published_at: DateTime<Utc>) -> f64 {
    let secs = (Utc::now() - published_at).num_seconds();
    (secs.max(0) as f64) / 3600.0
}

// --- Extraction ---

/// Per-record verdict from the extraction stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionVerdict {
    pub record_ref: RecordId,
    pub source: Source,
    pub has_pain_point: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_point: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specificity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_quote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ExtractionVerdict {
    pub fn no_pain_point(record_ref: RecordId, source: Source, reason: impl Into<String>) -> Self {
        Self {
            record_ref,
            source,
            has_pain_point: false,
            pain_point: None,
            intensity: None,
            specificity: None,
            frequency: None,
            composite_score: None,
            supporting_quote: None,
            reason: Some(reason.into()),
        }
    }
}

// --- Clustering ---

/// A group of semantically similar pain points collapsed to one
/// representative. `mention_count` counts members; singleton clusters carry
/// no similar statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: String,
    pub theme: String,
    pub representative: ExtractionVerdict,
    pub mention_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar_statements: Vec<String>,
}

// --- Final result ---

/// A cluster joined back to its originating record's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPainPoint {
    #[serde(flatten)]
    pub cluster: Cluster,
    pub post_title: String,
    pub post_url: String,
    pub post_score: i64,
    pub post_comments: i64,
    pub post_source: Source,
}

/// The full pipeline output for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub pain_points: Vec<RankedPainPoint>,
    pub total_posts: usize,
    pub relevant_posts: usize,
    /// Percentage of relevant posts that yielded a pain point, 0 when no
    /// posts were relevant.
    pub extraction_rate: f64,
    pub processing_time_ms: u64,
    pub sources_used: Vec<Source>,
    pub clusters: usize,
    pub total_mentions: usize,
    pub expanded_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parse_round_trips_all_identifiers() {
        for source in Source::ALL {
            assert_eq!(Source::parse(&source.to_string()), Some(source));
        }
    }

    #[test]
    fn source_parse_rejects_unknown() {
        assert_eq!(Source::parse("reddit"), None);
        assert_eq!(Source::parse(""), None);
        assert_eq!(Source::parse("HackerNews"), None);
        assert_eq!(Source::parse("yc_rfs"), None);
    }

    #[test]
    fn record_id_deserializes_from_both_shapes() {
        let n: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(n, RecordId::Int(42));
        let s: RecordId = serde_json::from_str("\"medium-abc\"").unwrap();
        assert_eq!(s, RecordId::Str("medium-abc".to_string()));
    }

    #[test]
    fn age_hours_never_negative() {
        let future = Utc::now() + chrono::Duration::hours(5);
        assert_eq!(age_hours(future), 0.0);
    }
}
