//! Fake upstream services served by warp on ephemeral ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_orchestrator::config::Config;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

pub const PRIMARY: &str = "primary-model";
pub const FALLBACK: &str = "fallback-model";

/// What a fake endpoint does when hit.
#[derive(Clone)]
pub enum Behavior {
    Json(u16, Value),
    Raw(u16, &'static str),
    Hang(Duration),
}

impl Behavior {
    pub fn content(text: &str) -> Self {
        Behavior::Json(
            200,
            serde_json::json!({"choices": [{"message": {"role": "assistant", "content": text}}]}),
        )
    }

    pub fn legacy_text(text: &str) -> Self {
        Behavior::Json(200, serde_json::json!({"choices": [{"text": text}]}))
    }

    async fn respond(&self) -> Response {
        match self {
            Behavior::Json(status, body) => warp::reply::with_status(
                warp::reply::json(body),
                StatusCode::from_u16(*status).unwrap(),
            )
            .into_response(),
            Behavior::Raw(status, body) => {
                warp::reply::with_status(*body, StatusCode::from_u16(*status).unwrap())
                    .into_response()
            }
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                warp::reply::json(&serde_json::json!({"choices": []})).into_response()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct FakeCompletion {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeCompletion {
    /// Each model id gets a fixed behavior; unknown models get a 404.
    pub fn spawn(script: Vec<(&str, Behavior)>) -> Self {
        let script: Arc<HashMap<String, Behavior>> = Arc::new(
            script
                .into_iter()
                .map(|(model, behavior)| (model.to_string(), behavior))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let route = warp::post()
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::json())
            .then(move |authorization: Option<String>, body: Value| {
                let script = script.clone();
                let recorded = recorded.clone();
                async move {
                    recorded.lock().unwrap().push(Recorded {
                        authorization,
                        body: body.clone(),
                    });
                    let model = body["model"].as_str().unwrap_or_default();
                    match script.get(model) {
                        Some(behavior) => behavior.respond().await,
                        None => Behavior::Raw(404, "no such model").respond().await,
                    }
                }
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn models(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.body["model"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

/// Completion endpoint whose first connection is closed without a reply;
/// every later connection gets `reply` as `message.content`.
pub struct FlakyCompletion {
    pub addr: SocketAddr,
    served: Arc<Mutex<Vec<Value>>>,
}

impl FlakyCompletion {
    pub async fn spawn(reply: &str) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = Arc::new(Mutex::new(Vec::new()));
        let recorded = served.clone();
        let body = serde_json::json!({"choices": [{"message": {"content": reply}}]}).to_string();

        tokio::spawn(async move {
            let (first, _) = listener.accept().await.unwrap();
            drop(first);

            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request_body(&mut stream).await;
                recorded.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { addr, served }
    }

    pub fn url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    /// Request bodies that got an answer.
    pub fn served(&self) -> Vec<Value> {
        self.served.lock().unwrap().clone()
    }
}

async fn read_request_body(stream: &mut tokio::net::TcpStream) -> Value {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length: usize = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            let start = end + 4;
            while buf.len() < start + length {
                let n = stream.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let stop = (start + length).min(buf.len());
            return serde_json::from_slice(&buf[start..stop]).unwrap_or(Value::Null);
        }
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return Value::Null;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

pub struct FakeWiki {
    pub addr: SocketAddr,
    searches: Arc<Mutex<Vec<HashMap<String, String>>>>,
    summaries: Arc<Mutex<Vec<String>>>,
}

impl FakeWiki {
    /// `titles` is the ranked search result; `pages` maps a title to the
    /// summary endpoint's response.
    pub fn spawn(titles: Vec<&str>, pages: Vec<(&str, Behavior)>) -> Self {
        let titles: Vec<Value> = titles
            .into_iter()
            .map(|t| serde_json::json!({"ns": 0, "title": t, "snippet": ""}))
            .collect();
        let search_body = serde_json::json!({"batchcomplete": "", "query": {"search": titles}});
        let pages: Arc<HashMap<String, Behavior>> = Arc::new(
            pages
                .into_iter()
                .map(|(title, behavior)| (title.to_string(), behavior))
                .collect(),
        );

        let searches = Arc::new(Mutex::new(Vec::new()));
        let summaries = Arc::new(Mutex::new(Vec::new()));

        let recorded_searches = searches.clone();
        let search = warp::path!("w" / "api.php")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .map(move |params: HashMap<String, String>| {
                recorded_searches.lock().unwrap().push(params);
                warp::reply::json(&search_body)
            });

        let recorded_summaries = summaries.clone();
        let summary = warp::path!("summary" / String)
            .and(warp::get())
            .then(move |title: String| {
                let pages = pages.clone();
                let recorded = recorded_summaries.clone();
                async move {
                    recorded.lock().unwrap().push(title.clone());
                    match pages.get(&title) {
                        Some(behavior) => behavior.respond().await,
                        None => Behavior::Raw(404, "not found").respond().await,
                    }
                }
            });

        let (addr, server) =
            warp::serve(search.or(summary)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self {
            addr,
            searches,
            summaries,
        }
    }

    pub fn search_url(&self) -> String {
        format!("http://{}/w/api.php", self.addr)
    }

    pub fn summary_url(&self) -> String {
        format!("http://{}/summary", self.addr)
    }

    pub fn searches(&self) -> Vec<HashMap<String, String>> {
        self.searches.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.summaries.lock().unwrap().clone()
    }
}

pub fn summary(extract: &str) -> Behavior {
    Behavior::Json(
        200,
        serde_json::json!({"type": "standard", "title": "x", "extract": extract}),
    )
}

/// Config pointing at the given fakes. Anything not provided points at the
/// discard port where nothing listens.
pub fn config(completion: Option<&FakeCompletion>, wiki: Option<&FakeWiki>) -> Config {
    let mut config = Config {
        ai_api_url: completion.map(FakeCompletion::url),
        ai_api_key: completion.map(|_| "test-key".to_string()),
        primary_model: PRIMARY.to_string(),
        fallback_model: FALLBACK.to_string(),
        ai_timeout_secs: 1,
        wiki_search_url: "http://127.0.0.1:9/w/api.php".to_string(),
        wiki_summary_url: "http://127.0.0.1:9/summary".to_string(),
        web_timeout_secs: 2,
        assistant_name: "Nova".to_string(),
        local_qa_path: "/nonexistent/qa.txt".to_string(),
        ..Config::default()
    };
    if let Some(wiki) = wiki {
        config.wiki_search_url = wiki.search_url();
        config.wiki_summary_url = wiki.summary_url();
    }
    config
}
