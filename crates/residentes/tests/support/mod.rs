#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use residentes::config::CorsConfig;
use residentes::{build_router, AppState, Repository, ResidentStore};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Reference date for birth date checks in every test server.
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

/// A running server backed by a fresh SQLite file. Keep the guard alive for
/// the duration of the test.
#[derive(Debug)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub repository: Repository,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository =
        Repository::open(dir.path().join("residentes.sqlite")).expect("open repository");
    let addr = serve(Arc::new(repository.clone())).await;
    TestServer {
        addr,
        repository,
        _dir: dir,
    }
}

/// Serve the router over an arbitrary store, with the default CORS origins.
pub async fn serve(store: Arc<dyn ResidentStore>) -> SocketAddr {
    let state = AppState::new(store)
        .with_clock(fixed_today)
        .with_cors_origins(&CorsConfig::default())
        .expect("default cors origins");
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

pub async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> RawResponse {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (name, value) in headers {
        req.push_str(&format!("{name}: {value}\r\n"));
    }
    let body = body.unwrap_or_default();
    if !body.is_empty() || matches!(method, "POST" | "PUT") {
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    req.push_str(body);
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

pub async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    send_raw(addr, "GET", path, &[], None).await
}

pub async fn get_html(addr: SocketAddr, path: &str) -> RawResponse {
    send_raw(addr, "GET", path, &[("Accept", "text/html")], None).await
}

pub async fn send_json(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: &serde_json::Value,
) -> RawResponse {
    let body = body.to_string();
    send_raw(
        addr,
        method,
        path,
        &[("Content-Type", "application/json")],
        Some(&body),
    )
    .await
}

pub async fn post_form(addr: SocketAddr, path: &str, body: &str) -> RawResponse {
    send_raw(
        addr,
        "POST",
        path,
        &[
            ("Content-Type", "application/x-www-form-urlencoded"),
            ("Accept", "text/html"),
        ],
        Some(body),
    )
    .await
}

pub fn valid_resident() -> serde_json::Value {
    serde_json::json!({
        "first_name": "josé",
        "last_name": "pérez garcía",
        "birth_date": "1990-01-31",
        "passport": "ab-123456",
        "email": "jose@example.com",
        "phone": "+1 (555) 123-4567",
        "address": "Calle Mayor 1",
        "occupation": "ingeniero",
        "marital_status": "casado"
    })
}
