//! Deterministic oracle stub for tests. Each operation returns a canned
//! response or fails when none is configured, and counts its invocations so
//! tests can assert which stages actually called out.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::oracle::Oracle;

#[derive(Default)]
pub struct StubOracle {
    expansion: Option<String>,
    relevance: Option<String>,
    extraction: Option<String>,
    clustering: Option<String>,
    pub expansion_calls: AtomicUsize,
    pub relevance_calls: AtomicUsize,
    pub extraction_calls: AtomicUsize,
    pub clustering_calls: AtomicUsize,
}

impl StubOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expansion(mut self, response: impl Into<String>) -> Self {
        self.expansion = Some(response.into());
        self
    }

    pub fn with_relevance(mut self, response: impl Into<String>) -> Self {
        self.relevance = Some(response.into());
        self
    }

    pub fn with_extraction(mut self, response: impl Into<String>) -> Self {
        self.extraction = Some(response.into());
        self
    }

    pub fn with_clustering(mut self, response: impl Into<String>) -> Self {
        self.clustering = Some(response.into());
        self
    }

    fn respond(slot: &Option<String>, op: &str) -> Result<String> {
        slot.clone()
            .ok_or_else(|| anyhow!("stub oracle: no {op} response configured"))
    }
}

#[async_trait]
impl Oracle for StubOracle {
    async fn expand_keywords(&self, _prompt: &str) -> Result<String> {
        self.expansion_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.expansion, "expansion")
    }

    async fn score_relevance(&self, _prompt: &str) -> Result<String> {
        self.relevance_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.relevance, "relevance")
    }

    async fn extract_pain_points(&self, _prompt: &str) -> Result<String> {
        self.extraction_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.extraction, "extraction")
    }

    async fn cluster_pain_points(&self, _prompt: &str) -> Result<String> {
        self.clustering_calls.fetch_add(1, Ordering::SeqCst);
        Self::respond(&self.clustering, "clustering")
    }
}
