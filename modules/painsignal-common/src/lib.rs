//! Shared types, errors, and configuration for the painsignal pipeline.

mod config;
mod error;
mod types;

pub use config::Config;
pub use error::PainSignalError;
pub use types::{
    age_hours, CandidateRecord, Cluster, ExtractionVerdict, PipelineResult, RankedPainPoint,
    RecordId, Source,
};

/// Truncate a string to at most `max_chars` characters.
/// Returns a borrowed slice ending on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn truncate_within_bounds_is_identity() {
        assert_eq!(truncate_chars("hello", 100), "hello");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("世界世界", 2), "世界");
    }
}
