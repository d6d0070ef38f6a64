use serde::{Deserialize, Deserializer, Serialize};

/// Most recent history entries forwarded to the completion API.
pub const MAX_HISTORY: usize = 12;

// API Request/Response models
// A `null` field is treated the same as a missing one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<HistoryEntry>,
    #[serde(default, rename = "wiki", deserialize_with = "null_as_default")]
    pub use_web: bool,
}

/// A caller-supplied history item. Entries that are not user/assistant turns
/// with content are dropped by [`normalize_history`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    pub content: Option<String>,
}

impl HistoryEntry {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub source: Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "web+ai")]
    WebAi,
    #[serde(rename = "ai")]
    Ai,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::System => "system",
            Source::Local => "local",
            Source::WebAi => "web+ai",
            Source::Ai => "ai",
        }
    }
}

// Completion API wire models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

impl CompletionMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [CompletionMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// The shapes a completion choice can take once normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceContent {
    MessageContent(String),
    LegacyText(String),
    Unrecognized,
}

impl ChoiceContent {
    /// Prefer `message.content`, then a non-blank `text`.
    pub fn from_choice(choice: Option<&Choice>) -> Self {
        let Some(choice) = choice else {
            return ChoiceContent::Unrecognized;
        };

        if let Some(content) = choice.message.as_ref().and_then(|m| m.content.as_deref()) {
            return ChoiceContent::MessageContent(content.trim().to_string());
        }

        match choice.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => ChoiceContent::LegacyText(text.to_string()),
            _ => ChoiceContent::Unrecognized,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            ChoiceContent::MessageContent(text) | ChoiceContent::LegacyText(text) => Some(text),
            ChoiceContent::Unrecognized => None,
        }
    }
}

/// Keep the last [`MAX_HISTORY`] entries, then drop anything that is not a
/// user/assistant turn with content.
pub fn normalize_history(history: &[HistoryEntry]) -> Vec<CompletionMessage> {
    let start = history.len().saturating_sub(MAX_HISTORY);
    history[start..]
        .iter()
        .filter_map(|entry| {
            let role = match entry.role.as_str() {
                "user" => Role::User,
                "assistant" => Role::Assistant,
                _ => return None,
            };
            entry
                .content
                .as_ref()
                .map(|content| CompletionMessage::new(role, content.clone()))
        })
        .collect()
}

// Web summary wire models
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: SearchQuery,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct PageSummary {
    pub extract: Option<String>,
}
