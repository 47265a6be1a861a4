//! Page-scrape adapters: YC's Request for Startups list, Failory's startup
//! post-mortems, and Quora search results. None of these expose an API, so
//! each fetches one HTML page and pulls records out with regexes. The
//! records are evergreen (no meaningful publish date) and carry a fixed
//! base engagement score reflecting how curated the source is.

use std::collections::HashSet;
use std::sync::OnceLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use tracing::debug;

use painsignal_common::{truncate_chars, CandidateRecord, Source};

use crate::adapter::{http_client, strip_html, SourceAdapter};

const YC_RFS_URL: &str = "https://www.ycombinator.com/rfs";
const FAILORY_CEMETERY_URL: &str = "https://www.failory.com/cemetery";
const QUORA_BASE_URL: &str = "https://www.quora.com";

// Quora serves a bot page to non-browser agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

fn scraped_record(
    id: String,
    title: String,
    body: String,
    url: String,
    base_score: i64,
    author: &str,
    source: Source,
) -> CandidateRecord {
    CandidateRecord {
        id: id.into(),
        title,
        body,
        url,
        engagement_score: base_score,
        comment_count: 0,
        author: author.to_string(),
        published_at: Utc::now(),
        age_hours: 0.0,
        source,
    }
}

/// Whole-phrase containment check, used where the page has no search of its
/// own and per-word ranking would be too loose for a static document.
fn phrase_appears(phrase: &str, title: &str, body: &str) -> bool {
    let needle = phrase.to_lowercase();
    title.to_lowercase().contains(&needle) || body.to_lowercase().contains(&needle)
}

// --- YC Request for Startups ---

/// Problem areas YC explicitly asks founders to work on. Each heading plus
/// its first paragraph is one validated pain point.
pub struct YcRfsAdapter {
    page_url: String,
}

impl YcRfsAdapter {
    pub fn new() -> Self {
        Self {
            page_url: YC_RFS_URL.to_string(),
        }
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = url.into();
        self
    }
}

impl Default for YcRfsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_rfs_page(html: &str, phrase: &str) -> Vec<CandidateRecord> {
    static SECTION: OnceLock<Regex> = OnceLock::new();
    let section = SECTION.get_or_init(|| {
        Regex::new(r"(?is)<h[23][^>]*>(.*?)</h[23]>.*?<p[^>]*>(.*?)</p>").expect("static regex")
    });

    let mut records = Vec::new();
    for (index, caps) in section.captures_iter(html).take(50).enumerate() {
        let title = strip_html(&caps[1]).trim().to_string();
        let body = strip_html(&caps[2]).trim().to_string();
        if body.len() <= 50 || !phrase_appears(phrase, &title, &body) {
            continue;
        }

        let anchor = title.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
        records.push(scraped_record(
            format!("yc-rfs-{index}"),
            title,
            body,
            format!("https://www.ycombinator.com/rfs#{anchor}"),
            100,
            "Y Combinator",
            Source::YcRfs,
        ));
    }
    records
}

#[async_trait]
impl SourceAdapter for YcRfsAdapter {
    fn source(&self) -> Source {
        Source::YcRfs
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let html = http_client()
            .get(&self.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut records = parse_rfs_page(&html, phrase);
        debug!(count = records.len(), phrase, "yc rfs problem areas matched");
        records.truncate(limit);
        Ok(records)
    }
}

// --- Failory ---

/// Startup failure write-ups. Founders describing what killed their company
/// name unsolved problems directly.
pub struct FailoryAdapter {
    page_url: String,
}

impl FailoryAdapter {
    pub fn new() -> Self {
        Self {
            page_url: FAILORY_CEMETERY_URL.to_string(),
        }
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = url.into();
        self
    }
}

impl Default for FailoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_failory_page(html: &str, phrase: &str) -> Vec<CandidateRecord> {
    static CEMETERY_LINK: OnceLock<Regex> = OnceLock::new();
    static STARTUP_CARD: OnceLock<Regex> = OnceLock::new();
    let cemetery_link = CEMETERY_LINK.get_or_init(|| {
        Regex::new(r#"(?is)<a[^>]*href="/cemetery/([^"]+)"[^>]*>.*?<h3[^>]*>(.*?)</h3>.*?<p[^>]*>(.*?)</p>"#)
            .expect("static regex")
    });
    let startup_card = STARTUP_CARD.get_or_init(|| {
        Regex::new(
            r#"(?is)<div[^>]*class="[^"]*startup-card[^"]*"[^>]*>.*?<h[234][^>]*>(.*?)</h[234]>.*?<p[^>]*>(.*?)</p>.*?<a[^>]*href="([^"]+)""#,
        )
        .expect("static regex")
    });

    let mut records = Vec::new();
    for caps in cemetery_link.captures_iter(html).take(100) {
        let slug = &caps[1];
        let title = strip_html(&caps[2]).trim().to_string();
        let body = strip_html(&caps[3]).trim().to_string();
        if body.len() <= 30 || !phrase_appears(phrase, &title, &body) {
            continue;
        }

        records.push(scraped_record(
            format!("failory-{slug}"),
            title,
            body,
            format!("https://www.failory.com/cemetery/{slug}"),
            90,
            "Failory",
            Source::Failory,
        ));
    }

    // The cemetery index has carried card markup without article links in
    // some revisions, so try that shape too, skipping titles already seen.
    let seen: HashSet<String> = records.iter().map(|r| r.title.clone()).collect();
    for caps in startup_card.captures_iter(html) {
        if records.len() >= 100 {
            break;
        }
        let title = strip_html(&caps[1]).trim().to_string();
        let body = strip_html(&caps[2]).trim().to_string();
        let href = caps[3].to_string();
        if body.len() <= 30 || seen.contains(&title) || !phrase_appears(phrase, &title, &body) {
            continue;
        }

        let url = if href.starts_with("http") {
            href
        } else {
            format!("https://www.failory.com{href}")
        };
        records.push(scraped_record(
            format!("failory-{}", records.len()),
            title,
            body,
            url,
            90,
            "Failory",
            Source::Failory,
        ));
    }

    records
}

#[async_trait]
impl SourceAdapter for FailoryAdapter {
    fn source(&self) -> Source {
        Source::Failory
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let html = http_client()
            .get(&self.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut records = parse_failory_page(&html, phrase);
        debug!(count = records.len(), phrase, "failory stories matched");
        records.truncate(limit);
        Ok(records)
    }
}

// --- Quora ---

/// Quora questions are pain points phrased as questions. The search page is
/// a React bundle, so the parse just lifts question-shaped text nodes.
pub struct QuoraAdapter {
    base_url: String,
}

impl QuoraAdapter {
    pub fn new() -> Self {
        Self {
            base_url: QUORA_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for QuoraAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn question_slug(question: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in question.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    truncate_chars(&slug, 100).to_string()
}

fn parse_quora_page(html: &str) -> Vec<CandidateRecord> {
    static QUESTION: OnceLock<Regex> = OnceLock::new();
    let question = QUESTION
        .get_or_init(|| Regex::new(r">([^<]{20,200}\?)<").expect("static regex"));

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (index, caps) in question.captures_iter(html).enumerate() {
        let text = caps[1].trim().to_string();
        if text.len() <= 20 || !seen.insert(text.clone()) {
            continue;
        }

        let slug = question_slug(&text);
        records.push(scraped_record(
            format!("quora-{index}"),
            text.clone(),
            // The question itself is the content.
            text,
            format!("https://www.quora.com/{slug}"),
            50,
            "Quora User",
            Source::Quora,
        ));
    }
    records
}

#[async_trait]
impl SourceAdapter for QuoraAdapter {
    fn source(&self) -> Source {
        Source::Quora
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<CandidateRecord>> {
        let html = http_client()
            .get(format!("{}/search", self.base_url))
            .query(&[("q", phrase)])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut records = parse_quora_page(&html);
        debug!(count = records.len(), phrase, "quora questions parsed");
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfs_sections_filter_by_phrase_and_length() {
        let html = r#"
            <h2>Developer tooling</h2>
            <p>Teams still struggle with slow deploy pipelines and want tooling that makes shipping safe and fast for everyone involved.</p>
            <h2>Unrelated area</h2>
            <p>Something about robotics manufacturing at scale, long enough to pass the length gate but off topic entirely here.</p>
            <h3>Short one</h3>
            <p>deploy</p>
        "#;
        let records = parse_rfs_page(html, "deploy");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Developer tooling");
        assert_eq!(records[0].source, Source::YcRfs);
        assert_eq!(records[0].engagement_score, 100);
        assert!(records[0].url.ends_with("#developer-tooling"));
    }

    #[test]
    fn failory_parses_cemetery_links_and_skips_card_duplicates() {
        let html = r#"
            <a href="/cemetery/shipfast"><div><h3>ShipFast</h3><span>x</span><p>We failed because our deploy automation never worked reliably.</p></div></a>
            <div class="w startup-card x"><h4>ShipFast</h4><p>We failed because our deploy automation never worked reliably.</p><a href="/cemetery/shipfast">more</a></div>
            <div class="startup-card"><h4>OtherCo</h4><p>Customers churned since deploy previews took hours to build each time.</p><a href="https://example.com/otherco">more</a></div>
        "#;
        let records = parse_failory_page(html, "deploy");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, painsignal_common::RecordId::from("failory-shipfast"));
        assert_eq!(records[0].url, "https://www.failory.com/cemetery/shipfast");
        assert_eq!(records[1].title, "OtherCo");
        assert_eq!(records[1].url, "https://example.com/otherco");
    }

    #[test]
    fn quora_lifts_questions_and_dedupes() {
        let html = concat!(
            "<span>How do I find my first paying customers?</span>",
            "<div>How do I find my first paying customers?</div>",
            "<p>short?</p>",
            "<b>Why is cold outreach so ineffective for startups?</b>",
        );
        let records = parse_quora_page(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "How do I find my first paying customers?");
        assert_eq!(records[0].body, records[0].title);
        assert_eq!(records[1].source, Source::Quora);
    }

    #[test]
    fn question_slug_is_url_safe() {
        assert_eq!(
            question_slug("How do I find my first customers?"),
            "how-do-i-find-my-first-customers"
        );
        assert_eq!(question_slug("??!"), "");
    }

    #[test]
    fn phrase_containment_is_case_insensitive() {
        assert!(phrase_appears("Deploy Pipelines", "Slow DEPLOY PIPELINES", ""));
        assert!(!phrase_appears("deploy pipelines", "deploy", "pipelines"));
    }
}
