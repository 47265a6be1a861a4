//! Minimal Anthropic Messages API client.
//!
//! Completions only: the pipeline asks for JSON embedded in free text and
//! recovers it on the caller side, so no tool or structured-output plumbing
//! lives here.

mod wire;

use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use wire::{MessagesRequest, MessagesResponse, WireMessage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A model-bound handle to the Anthropic API.
#[derive(Clone)]
pub struct Claude {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl Claude {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    /// Point the client at a different endpoint (local proxy, test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// One-shot completion: system + user prompt in, assistant text out.
    pub async fn complete(&self, system: impl Into<String>, user: impl Into<String>) -> Result<String> {
        self.complete_with(system, user, 4096, None).await
    }

    /// Completion with explicit token budget and optional temperature.
    pub async fn complete_with(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String> {
        let mut request = MessagesRequest::new(&self.model)
            .system(system)
            .message(WireMessage::user(user))
            .max_tokens(max_tokens);
        if let Some(t) = temperature {
            request = request.temperature(t);
        }

        let url = format!("{}/messages", self.base_url);

        debug!(model = %request.model, "Anthropic messages request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Anthropic API error ({}): {}", status, error_text));
        }

        let response: MessagesResponse = response.json().await?;
        response
            .text()
            .ok_or_else(|| anyhow!("No text in Anthropic response"))
    }
}
