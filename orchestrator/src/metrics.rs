use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::models::Source;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    replies: IntCounterVec,
    completion_attempts: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let replies = IntCounterVec::new(
            Opts::new("chat_replies_total", "Chat replies by answer source"),
            &["source"],
        )?;
        let completion_attempts = IntCounterVec::new(
            Opts::new("completion_attempts_total", "Completion attempts by model and outcome"),
            &["model", "outcome"],
        )?;

        registry.register(Box::new(replies.clone()))?;
        registry.register(Box::new(completion_attempts.clone()))?;

        Ok(Self {
            registry,
            replies,
            completion_attempts,
        })
    }

    pub fn record_reply(&self, source: Source) {
        self.replies.with_label_values(&[source.as_str()]).inc();
    }

    pub fn record_attempt(&self, model: &str, outcome: &str) {
        self.completion_attempts
            .with_label_values(&[model, outcome])
            .inc();
    }

    pub fn reply_count(&self, source: Source) -> u64 {
        self.replies.with_label_values(&[source.as_str()]).get()
    }

    pub fn attempt_count(&self, model: &str, outcome: &str) -> u64 {
        self.completion_attempts
            .with_label_values(&[model, outcome])
            .get()
    }

    /// Prometheus text exposition of everything in this registry.
    pub fn encode(&self) -> Result<(Vec<u8>, String)> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((buffer, encoder.format_type().to_string()))
    }
}
