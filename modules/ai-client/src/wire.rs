use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<WireMessage>,
}

impl MessagesRequest {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            max_tokens: 4096,
            temperature: None,
            system: None,
            messages: Vec::new(),
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn message(mut self, message: WireMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// Concatenated text of all text blocks, or None if the response
    /// carried no text at all.
    pub fn text(&self) -> Option<String> {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text { text } = block {
                out.push_str(text);
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_blocks_and_skips_unknown_kinds() {
        let raw = r#"{"content":[
            {"type":"text","text":"first "},
            {"type":"tool_use","id":"x","name":"y","input":{}},
            {"type":"text","text":"second"}
        ]}"#;
        let response: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some("first second"));
    }

    #[test]
    fn text_is_none_for_empty_or_missing_content() {
        let empty: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(empty.text(), None);

        let missing: MessagesResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.text(), None);
    }

    #[test]
    fn request_omits_unset_optional_fields() {
        let request = MessagesRequest::new("model-a").message(WireMessage::user("hi"));
        let raw = serde_json::to_string(&request).unwrap();
        assert!(!raw.contains("temperature"));
        assert!(!raw.contains("system"));
        assert!(raw.contains(r#""role":"user""#));
    }

    #[test]
    fn request_serializes_system_and_temperature_when_set() {
        let request = MessagesRequest::new("model-a")
            .system("be terse")
            .temperature(0.5)
            .max_tokens(300);
        let raw = serde_json::to_string(&request).unwrap();
        assert!(raw.contains(r#""system":"be terse""#));
        assert!(raw.contains(r#""temperature":0.5"#));
        assert!(raw.contains(r#""max_tokens":300"#));
    }
}
