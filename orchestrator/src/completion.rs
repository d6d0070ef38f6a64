// Completion Client: chat completion against a primary model with a single fallback

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::CompletionError;
use crate::metrics::Metrics;
use crate::models::{
    normalize_history, ChoiceContent, CompletionBody, CompletionMessage, CompletionResponse,
    HistoryEntry, Role,
};

/// Model id plus the sampling parameters sent with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProfile {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ModelProfile {
    pub fn new(model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
        }
    }
}

#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    attempts: Vec<ModelProfile>,
    timeout: Duration,
    assistant_name: String,
    default_system_note: String,
    metrics: Metrics,
}

impl CompletionClient {
    pub fn from_config(config: &Config, http: reqwest::Client, metrics: Metrics) -> Self {
        let default_system_note = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| default_persona(&config.assistant_name));

        Self {
            http,
            endpoint: config.ai_api_url.clone(),
            api_key: config.ai_api_key.clone(),
            attempts: vec![
                ModelProfile::new(config.primary_model.clone(), 800, 0.2),
                ModelProfile::new(config.fallback_model.clone(), 600, 0.2),
            ],
            timeout: Duration::from_secs(config.ai_timeout_secs),
            assistant_name: config.assistant_name.clone(),
            default_system_note,
            metrics,
        }
    }

    pub fn attempts(&self) -> &[ModelProfile] {
        &self.attempts
    }

    /// Always returns something displayable: the model's reply, or the
    /// rendered error of the last failed attempt.
    pub async fn complete(
        &self,
        user_input: &str,
        history: &[HistoryEntry],
        system_note: Option<&str>,
    ) -> String {
        match self.try_complete(user_input, history, system_note).await {
            Ok(reply) => reply,
            Err(e) => e.render(&self.assistant_name),
        }
    }

    pub async fn try_complete(
        &self,
        user_input: &str,
        history: &[HistoryEntry],
        system_note: Option<&str>,
    ) -> Result<String, CompletionError> {
        let (Some(endpoint), Some(api_key)) = (self.endpoint.as_deref(), self.api_key.as_deref())
        else {
            warn!("Completion requested but AI_API_URL/AI_API_KEY are not set");
            return Err(CompletionError::ConfigMissing);
        };

        let messages = self.build_messages(user_input, history, system_note);

        let mut last_err = CompletionError::ConfigMissing;
        for profile in &self.attempts {
            info!("Completion: trying model {}", profile.model);
            match self.attempt(endpoint, api_key, profile, &messages).await {
                Ok(reply) => {
                    self.metrics.record_attempt(&profile.model, "success");
                    return Ok(reply);
                }
                Err(e) => {
                    warn!("Completion: model {} failed: {}", profile.model, e);
                    self.metrics.record_attempt(&profile.model, e.kind());
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// One system message, the trailing history, then the user's message.
    pub fn build_messages(
        &self,
        user_input: &str,
        history: &[HistoryEntry],
        system_note: Option<&str>,
    ) -> Vec<CompletionMessage> {
        let note = system_note.unwrap_or(self.default_system_note.as_str());

        let mut messages = vec![CompletionMessage::new(Role::System, note)];
        messages.extend(normalize_history(history));
        messages.push(CompletionMessage::new(Role::User, user_input));
        messages
    }

    async fn attempt(
        &self,
        endpoint: &str,
        api_key: &str,
        profile: &ModelProfile,
        messages: &[CompletionMessage],
    ) -> Result<String, CompletionError> {
        let body = CompletionBody {
            model: &profile.model,
            messages,
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
        };

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(CompletionError::Upstream {
                    status: status.as_u16(),
                    body: text,
                })
            }
        };

        ChoiceContent::from_choice(parsed.choices.first())
            .into_text()
            .filter(|reply| !reply.is_empty())
            .ok_or(CompletionError::UnexpectedShape)
    }
}

pub fn default_persona(name: &str) -> String {
    format!(
        "You are {name}, a smart and friendly AI assistant. \
         Reply in a cool, confident, and natural way, like a helpful tech-savvy friend. \
         Keep answers clear, engaging, and slightly witty when appropriate. \
         Be respectful, accurate, and honest. If you do not know something, say so. \
         Avoid boring or robotic replies."
    )
}
