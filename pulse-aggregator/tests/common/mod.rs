#![allow(dead_code)]

use pulse_aggregator::config::NewsFeed;
use pulse_aggregator::{FetchConfig, Fetcher, PulseConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Nothing listens on the discard port, so connections are refused at once.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn offline_fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: "AI-Daily-Pulse-Test/1.0".to_string(),
        timeout_seconds: 5,
        max_attempts: 2,
        retry_delay_seconds: 0,
        ..FetchConfig::default()
    }
}

pub fn offline_fetcher() -> Arc<Fetcher> {
    Arc::new(Fetcher::new(offline_fetch_config()).expect("client builds"))
}

/// A configuration whose every endpoint is unreachable.
pub fn offline_config(data_dir: &Path) -> PulseConfig {
    let mut config = PulseConfig::new(data_dir);
    config.fetch = offline_fetch_config();
    config.arxiv.api_url = format!("{}/api/query", UNREACHABLE);
    config.huggingface.api_url = format!("{}/api/models", UNREACHABLE);
    config.trending.api_url = format!("{}/repositories", UNREACHABLE);
    config.trending.page_url = format!("{}/trending", UNREACHABLE);
    config.news.feeds = vec![
        NewsFeed::new("量子位", &format!("{}/feed", UNREACHABLE)),
        NewsFeed::new("OpenAI Blog", &format!("{}/rss.xml", UNREACHABLE)),
    ];
    config
}

type Responder = Arc<dyn Fn(&str, usize) -> (u16, String) + Send + Sync>;

/// A local HTTP server that answers every request through `respond(path, hit)`,
/// where `hit` counts requests to that path starting at 1.
pub struct StubServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl StubServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str, usize) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let base = format!("http://{}", listener.local_addr().expect("stub address"));
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let respond: Responder = Arc::new(respond);

        let task_hits = hits.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let respond = respond.clone();
                let hits = task_hits.clone();
                tokio::spawn(serve(socket, respond, hits));
            }
        });

        Self { base, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Requests received for `path` so far (query string ignored).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

async fn serve(mut socket: TcpStream, respond: Responder, hits: Arc<Mutex<HashMap<String, usize>>>) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let target = head.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target).to_string();

    let hit = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(path.clone()).or_insert(0);
        *count += 1;
        *count
    };

    let (status, body) = respond(&path, hit);
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
