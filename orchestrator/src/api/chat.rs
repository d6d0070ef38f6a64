use std::sync::Arc;

use tracing::info;
use warp::{Rejection, Reply};

use crate::chat::ChatService;
use crate::models::ChatRequest;

// Always 200: upstream failures are reported inside `reply`.
pub async fn handle_chat(
    request: ChatRequest,
    service: Arc<ChatService>,
) -> Result<impl Reply, Rejection> {
    info!(
        "Processing chat message ({} history entries, web: {})",
        request.history.len(),
        request.use_web
    );

    let reply = service.handle(request).await;

    info!("Replied from source {}", reply.source.as_str());
    Ok(warp::reply::json(&reply))
}
