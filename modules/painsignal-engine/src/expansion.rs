//! Keyword expansion: one user phrase becomes up to twelve short related
//! search terms. Expansion is an optimization, never a requirement — any
//! failure degrades to the original phrase alone.

use std::sync::Arc;

use tracing::{info, warn};

use crate::json::recover_array;
use crate::oracle::Oracle;

const MAX_PHRASES: usize = 12;

pub struct KeywordExpander {
    oracle: Arc<dyn Oracle>,
}

impl KeywordExpander {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Expand `phrase` into an ordered, case-insensitively deduplicated set
    /// of search phrases. The trimmed original is always first. Never fails.
    pub async fn expand(&self, phrase: &str) -> Vec<String> {
        let original = phrase.trim().to_string();

        let terms = match self.oracle.expand_keywords(&expansion_prompt(&original)).await {
            Ok(raw) => match recover_array::<Vec<String>>(&raw) {
                Ok(terms) if !terms.is_empty() => terms,
                Ok(_) => {
                    warn!(phrase = %original, "expansion returned an empty array, using original only");
                    return vec![original];
                }
                Err(e) => {
                    warn!(phrase = %original, error = %e, "expansion response unparseable, using original only");
                    return vec![original];
                }
            },
            Err(e) => {
                warn!(phrase = %original, error = %e, "expansion call failed, using original only");
                return vec![original];
            }
        };

        let mut seen = vec![original.to_lowercase()];
        let mut expanded = vec![original.clone()];
        for term in terms {
            let term = term.trim().to_string();
            if term.is_empty() {
                continue;
            }
            let lower = term.to_lowercase();
            if seen.contains(&lower) {
                continue;
            }
            seen.push(lower);
            expanded.push(term);
            if expanded.len() == MAX_PHRASES {
                break;
            }
        }

        info!(phrase = %original, expanded = expanded.len(), "keyword expansion complete");
        expanded
    }
}

fn expansion_prompt(phrase: &str) -> String {
    format!(
        r#"Given the keyword "{phrase}", generate 10-12 related TOPIC KEYWORDS (1-2 words each) that commonly appear in discussions about this domain.

Generate SHORT, COMMON terms that appear frequently in post titles and content:
- 1-2 words maximum, no phrases
- terminology people actually use
- cover different aspects of the domain: core terms, related concepts, common pain areas, industry jargon

Examples:
- "startup" -> ["founder", "entrepreneur", "bootstrapping", "saas", "indie", "business", "launch", "validation", "customers", "growth", "funding", "mvp"]
- "deployment" -> ["deploy", "devops", "ci/cd", "docker", "kubernetes", "pipeline", "hosting", "server", "production", "automation", "infrastructure", "release"]

Return ONLY a valid JSON array of 10-12 short keywords. No markdown, no explanations.

Keywords for "{phrase}":"#
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::StubOracle;

    use super::*;

    #[tokio::test]
    async fn original_phrase_is_always_first() {
        let oracle = Arc::new(
            StubOracle::new().with_expansion(r#"["founder", "saas", "indie"]"#),
        );
        let expanded = KeywordExpander::new(oracle).expand("  Startup  ").await;
        assert_eq!(expanded[0], "Startup");
        assert_eq!(expanded.len(), 4);
    }

    #[tokio::test]
    async fn duplicates_of_original_are_dropped_case_insensitively() {
        let oracle = Arc::new(
            StubOracle::new().with_expansion(r#"["STARTUP", "startup", "founder"]"#),
        );
        let expanded = KeywordExpander::new(oracle).expand("startup").await;
        assert_eq!(expanded, vec!["startup".to_string(), "founder".to_string()]);
    }

    #[tokio::test]
    async fn caps_at_twelve_phrases() {
        let terms: Vec<String> = (0..20).map(|i| format!("term{i}")).collect();
        let oracle = Arc::new(
            StubOracle::new().with_expansion(serde_json::to_string(&terms).unwrap()),
        );
        let expanded = KeywordExpander::new(oracle).expand("topic").await;
        assert_eq!(expanded.len(), 12);
    }

    #[tokio::test]
    async fn fenced_response_is_tolerated() {
        let oracle = Arc::new(
            StubOracle::new().with_expansion("```json\n[\"founder\"]\n```"),
        );
        let expanded = KeywordExpander::new(oracle).expand("startup").await;
        assert_eq!(expanded, vec!["startup".to_string(), "founder".to_string()]);
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_singleton() {
        let oracle = Arc::new(StubOracle::new());
        let expanded = KeywordExpander::new(oracle).expand("startup").await;
        assert_eq!(expanded, vec!["startup".to_string()]);
    }

    #[tokio::test]
    async fn garbage_response_falls_back_to_singleton() {
        let oracle = Arc::new(StubOracle::new().with_expansion("sorry, I cannot help"));
        let expanded = KeywordExpander::new(oracle).expand("startup").await;
        assert_eq!(expanded, vec!["startup".to_string()]);
    }

    #[tokio::test]
    async fn empty_array_falls_back_to_singleton() {
        let oracle = Arc::new(StubOracle::new().with_expansion("[]"));
        let expanded = KeywordExpander::new(oracle).expand("startup").await;
        assert_eq!(expanded, vec!["startup".to_string()]);
    }
}
