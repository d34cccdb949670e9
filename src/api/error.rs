//! 自動化クライアントのエラー

use thiserror::Error;

/// クライアント側の入力検証エラー（リクエスト送信前に検出）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("'{field}' must not be empty")]
    Empty { field: &'static str },

    #[error("'{field}' must contain at least one item")]
    NoItems { field: &'static str },

    #[error("'{field}' must be a non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("'{field}' is not a valid profile URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("'{field}' must be a JSON object")]
    NotAnObject { field: &'static str },

    #[error(
        "inconsistent performance counters \
         (impressions {impressions}, clicks {clicks}, conversions {conversions})"
    )]
    InconsistentCounters {
        impressions: u64,
        clicks: u64,
        conversions: u64,
    },
}

/// 認証情報の保存・読み込みエラー
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential storage unavailable: {0}")]
    Unavailable(String),
}

/// 自動化バックエンド呼び出しのエラー
#[derive(Error, Debug)]
pub enum ApiError {
    /// 通信エラー（接続失敗・タイムアウトなど）
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx 以外のレスポンス
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// 401。保存されたトークンは破棄済みで、再ログインが必要
    #[error("Unauthorized: login required")]
    Unauthorized,

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// 通信・バックエンド側の失敗か（検証エラーは含まない）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Status { .. } | ApiError::Unauthorized
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
