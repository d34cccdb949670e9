//! HTTPトランスポート
//!
//! クライアントは `Transport` 経由でのみ通信するため、
//! テストではフェイク実装に差し替えられる。

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

use super::endpoint::HttpMethod;
use super::error::{ApiError, ApiResult};

/// 送信直前のリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// リクエストID（ログ追跡用）
    pub id: String,
    pub method: HttpMethod,
    /// 絶対URL
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// 受信したレスポンス（ボディは未解釈）
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

/// reqwest によるトランスポート
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
        };

        let mut builder = self.http.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            debug!("❌ [{}] {} {} failed: {}", request.id, request.method.as_str(), request.url, e);
            ApiError::Transport(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(
            "📡 [{}] {} {} -> {} ({} bytes, {:?})",
            request.id,
            request.method.as_str(),
            request.url,
            status,
            body.len(),
            started.elapsed()
        );

        Ok(HttpResponse { status, body })
    }
}
