use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::chat::ChatService;

mod chat;
mod status;

/// JSON bodies above this size are rejected before deserialization.
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn routes(
    service: Arc<ChatService>,
    static_dir: &str,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let chat_route = warp::path("api")
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_service(service.clone()))
        .and_then(chat::handle_chat);

    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(status::handle_health);

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service))
        .and_then(status::handle_metrics);

    let index_route = warp::path::end()
        .and(warp::get())
        .and(warp::fs::file(format!("{}/index.html", static_dir)));

    let static_route = warp::path("static").and(warp::fs::dir(static_dir.to_string()));

    chat_route
        .or(health_route)
        .or(metrics_route)
        .or(index_route)
        .or(static_route)
}

fn with_service(
    service: Arc<ChatService>,
) -> impl Filter<Extract = (Arc<ChatService>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || service.clone())
}
