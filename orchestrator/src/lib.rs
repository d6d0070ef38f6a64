use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use warp::{Filter, Reply};

pub mod api;
pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod local_qa;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod web_summary;

use chat::ChatService;
use completion::CompletionClient;
use config::Config;
use local_qa::LocalAnswers;
use metrics::Metrics;
use web_summary::SummaryFetcher;

/// Build the service from configuration. The local answer table is loaded
/// here, once; one HTTP client is shared by every outbound call. Deadlines
/// are set per request, so the web and completion timeouts stay independent.
pub fn build_service(config: &Config) -> Result<Arc<ChatService>> {
    let http = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let metrics = Metrics::new().context("Failed to register metrics")?;
    let answers = LocalAnswers::load(&config.local_qa_path);
    let web = SummaryFetcher::from_config(config, http.clone());
    let completion = CompletionClient::from_config(config, http, metrics.clone());

    if config.ai_api_url.is_none() || config.ai_api_key.is_none() {
        info!("AI backend not configured; completion requests will report it");
    }

    Ok(Arc::new(ChatService::new(
        answers,
        web,
        completion,
        config.assistant_name.clone(),
        metrics,
    )))
}

/// Full route tree with CORS, access log and JSON rejection handling.
///
/// Route rejections are turned into JSON inside the CORS wrapper so error
/// replies carry the CORS headers too; the outer recover only sees preflight
/// rejections raised by the wrapper itself.
pub fn app(
    service: Arc<ChatService>,
    static_dir: &str,
) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    api::routes(service, static_dir)
        .recover(error::handle_rejection)
        .with(middleware::cors())
        .recover(error::handle_rejection)
        .with(warp::log("api"))
}
