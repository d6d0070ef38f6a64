use std::sync::Arc;

use warp::{Rejection, Reply};

use crate::chat::ChatService;
use crate::error::ApiError;

pub async fn handle_health() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({"status": "healthy"})))
}

pub async fn handle_metrics(service: Arc<ChatService>) -> Result<impl Reply, Rejection> {
    let (buffer, content_type) = service
        .metrics()
        .encode()
        .map_err(|e| warp::reject::custom(ApiError::InternalError(e.to_string())))?;

    Ok(warp::reply::with_header(buffer, "Content-Type", content_type))
}
