// Chat Orchestrator: local answers first, then optional web-grounded AI, then plain AI

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::local_qa::LocalAnswers;
use crate::metrics::Metrics;
use crate::models::{ChatReply, ChatRequest, Source};
use crate::web_summary::SummaryFetcher;

pub struct ChatService {
    answers: LocalAnswers,
    web: SummaryFetcher,
    completion: CompletionClient,
    assistant_name: String,
    metrics: Metrics,
}

impl ChatService {
    pub fn new(
        answers: LocalAnswers,
        web: SummaryFetcher,
        completion: CompletionClient,
        assistant_name: impl Into<String>,
        metrics: Metrics,
    ) -> Self {
        Self {
            answers,
            web,
            completion,
            assistant_name: assistant_name.into(),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn handle(&self, request: ChatRequest) -> ChatReply {
        let request_id = Uuid::new_v4();
        let span = info_span!("chat", %request_id, use_web = request.use_web);

        let reply = self.route(request).instrument(span).await;
        self.metrics.record_reply(reply.source);
        reply
    }

    async fn route(&self, request: ChatRequest) -> ChatReply {
        let message = request.message.trim();
        if message.is_empty() {
            info!("Rejecting empty message");
            return ChatReply {
                reply: format!("{}: Your message seems empty.", self.assistant_name),
                source: Source::System,
            };
        }

        if let Some(answer) = self.answers.lookup(message) {
            info!("Answered from local table");
            return ChatReply {
                reply: answer.to_string(),
                source: Source::Local,
            };
        }

        if request.use_web {
            // No summary means a silent fall through to the plain AI path.
            if let Some(summary) = self.web.fetch_summary(message).await {
                let note = self.web_note(&summary);
                let reply = self
                    .completion
                    .complete(message, &request.history, Some(&note))
                    .await;
                return ChatReply {
                    reply,
                    source: Source::WebAi,
                };
            }
        }

        let reply = self.completion.complete(message, &request.history, None).await;
        ChatReply {
            reply,
            source: Source::Ai,
        }
    }

    fn web_note(&self, summary: &str) -> String {
        format!(
            "You are {}, an AI assistant. Use the following web information:\n\n{}\n\nAnswer naturally.",
            self.assistant_name, summary
        )
    }
}
