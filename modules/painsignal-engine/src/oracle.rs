//! The text-analysis oracle behind one interface with four operations.
//! Every oracle-consuming stage builds its own prompt and parses the raw
//! text reply; this seam exists so tests can substitute a deterministic
//! stub and so the fallible collaborator stays isolated.

use ai_client::Claude;
use anyhow::Result;
use async_trait::async_trait;

/// Fast model for mechanical tasks (expansion, clustering).
const FAST_MODEL: &str = "claude-haiku-4-5-20251001";
/// Stronger model for judgment-heavy tasks (relevance, extraction).
const STRONG_MODEL: &str = "claude-sonnet-4-5-20250929";

#[async_trait]
pub trait Oracle: Send + Sync {
    async fn expand_keywords(&self, prompt: &str) -> Result<String>;
    async fn score_relevance(&self, prompt: &str) -> Result<String>;
    async fn extract_pain_points(&self, prompt: &str) -> Result<String>;
    async fn cluster_pain_points(&self, prompt: &str) -> Result<String>;
}

/// Claude-backed oracle. Each call is self-contained and idempotent;
/// repeating one is safe, just costly.
pub struct ClaudeOracle {
    fast: Claude,
    strong: Claude,
}

impl ClaudeOracle {
    pub fn new(api_key: &str) -> Self {
        Self {
            fast: Claude::new(api_key, FAST_MODEL),
            strong: Claude::new(api_key, STRONG_MODEL),
        }
    }

    /// Point both models at a different endpoint (local proxy, test server).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.fast = self.fast.with_base_url(url);
        self.strong = self.strong.with_base_url(url);
        self
    }
}

const SYSTEM: &str = "You analyze online discussion posts. Always answer with exactly the JSON the task asks for, nothing else.";

#[async_trait]
impl Oracle for ClaudeOracle {
    async fn expand_keywords(&self, prompt: &str) -> Result<String> {
        self.fast.complete_with(SYSTEM, prompt, 300, None).await
    }

    async fn score_relevance(&self, prompt: &str) -> Result<String> {
        // Low temperature: scoring should be as repeatable as the model allows.
        self.strong
            .complete_with(SYSTEM, prompt, 3000, Some(0.3))
            .await
    }

    async fn extract_pain_points(&self, prompt: &str) -> Result<String> {
        self.strong.complete_with(SYSTEM, prompt, 4000, None).await
    }

    async fn cluster_pain_points(&self, prompt: &str) -> Result<String> {
        self.fast
            .complete_with(SYSTEM, prompt, 2000, Some(0.3))
            .await
    }
}
