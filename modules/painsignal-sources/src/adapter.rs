use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use painsignal_common::{CandidateRecord, Source};

const USER_AGENT: &str = "painsignal/0.1";

/// One content source. Given a search phrase and a count, returns zero or
/// more normalized candidate records. Implementations must bound their own
/// request time and may fail; the collector isolates failures per call.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>>;
}

/// Shared HTTP client for all adapters: common user agent, per-request
/// timeout well under the collector's outer barrier timeout.
pub(crate) fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client construction cannot fail with static options")
    })
}

/// Strip HTML tags and decode the entities the source APIs actually emit.
pub(crate) fn strip_html(s: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex"));

    tag.replace_all(s, "")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
}

/// Keyword relevance of a record's text to a search phrase: occurrence count
/// of each phrase part (3+ chars), title matches weighted 3x. Used by
/// adapters whose upstream has no search endpoint.
pub(crate) fn keyword_match_score(title: &str, body: &str, phrase: &str) -> i64 {
    let title = title.to_lowercase();
    let body = body.to_lowercase();
    let phrase = phrase.to_lowercase();

    phrase
        .split_whitespace()
        .filter(|p| p.len() > 2)
        .map(|part| {
            let title_matches = title.matches(part).count() as i64;
            let body_matches = body.matches(part).count() as i64;
            title_matches * 3 + body_matches
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let html = "<p>I can&#x27;t deploy &gt; 3 times a day</p>";
        assert_eq!(strip_html(html), "I can't deploy > 3 times a day");
    }

    #[test]
    fn title_matches_outweigh_body_matches() {
        let in_title = keyword_match_score("deploy woes", "nothing here", "deploy");
        let in_body = keyword_match_score("nothing here", "deploy woes", "deploy");
        assert!(in_title > in_body);
    }

    #[test]
    fn short_phrase_parts_are_ignored() {
        assert_eq!(keyword_match_score("ai is ok", "ai ai ai", "ai"), 0);
    }
}
