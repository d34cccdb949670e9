//! 自動化バックエンドのクライアント
//!
//! エンティティ状態は持たない。各呼び出しは1リクエスト → 1 JSONレスポンスで、
//! リトライもキャンセルも行わない。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::credentials::{CredentialStore, SessionState};
use super::endpoint::Endpoint;
use super::error::{ApiError, ApiResult};
use super::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::config::ApiConfig;

pub struct AutomationClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    session: watch::Sender<SessionState>,
}

impl std::fmt::Debug for AutomationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationClient")
            .field("base_url", &self.base_url)
            .field("session", &*self.session.borrow())
            .finish()
    }
}

impl AutomationClient {
    /// 設定から reqwest トランスポートのクライアントを作成
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialStore>) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?;
        Self::with_transport(&config.base_url, Arc::new(transport), credentials)
    }

    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> ApiResult<Self> {
        let initial = if credentials.load()?.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (session, _) = watch::channel(initial);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            credentials,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_state(&self) -> SessionState {
        *self.session.borrow()
    }

    /// セッション状態の変化を監視する
    pub fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// トークンを保存してログイン状態にする
    pub fn login(&self, token: &str) -> ApiResult<()> {
        self.credentials.save(token)?;
        self.session.send_replace(SessionState::Authenticated);
        info!("🔑 Logged in");
        Ok(())
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.credentials.clear()?;
        self.session.send_replace(SessionState::Anonymous);
        info!("🔒 Logged out");
        Ok(())
    }

    /// エンドポイントを実行して型付きレスポンスを返す
    pub async fn execute<E: Endpoint>(&self, endpoint: &E) -> ApiResult<E::Response> {
        if let Err(e) = endpoint.validate() {
            warn!("⚠️ {} rejected before dispatch: {}", E::NAME, e);
            return Err(e.into());
        }

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = self.credentials.load()? {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let request = HttpRequest {
            id: uuid::Uuid::new_v4().to_string(),
            method: endpoint.method(),
            url: format!("{}{}", self.base_url, endpoint.path()),
            query: endpoint.query(),
            headers,
            body: endpoint.body()?,
        };
        debug!(
            "🚀 [{}] {} {} {}",
            request.id,
            E::NAME,
            request.method.as_str(),
            request.url
        );

        let response = self.transport.send(request).await?;

        if response.status == 401 {
            warn!("🔐 {} returned 401, clearing stored token", E::NAME);
            if let Err(e) = self.credentials.clear() {
                warn!("⚠️ Failed to clear stored token: {}", e);
            }
            self.session.send_replace(SessionState::LoginRequired);
            return Err(ApiError::Unauthorized);
        }

        if !response.is_success() {
            warn!("❌ {} failed with status {}", E::NAME, response.status);
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| {
            warn!("❌ {} response could not be decoded: {}", E::NAME, e);
            ApiError::Decode(e)
        })
    }
}
