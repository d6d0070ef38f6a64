/// Seconds a browser may cache a preflight answer.
const PREFLIGHT_MAX_AGE_SECS: u64 = 600;

/// The chat UI is served from anywhere, but it only ever reads pages and
/// posts JSON to `/api/chat`; preflights asking for anything else are
/// refused with a 403 by the rejection handler.
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_headers(vec!["Content-Type", "Accept"])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}
