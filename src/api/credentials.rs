//! 認証トークンの永続化とセッション状態

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::CredentialError;

/// ログイン境界から見たセッション状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// トークンなし（まだログインしていない）
    Anonymous,
    Authenticated,
    /// 401 を受けてトークンを破棄した。再ログインが必要
    LoginRequired,
}

/// Bearerトークンの保存先
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, CredentialError>;
    fn save(&self, token: &str) -> Result<(), CredentialError>;
    fn clear(&self) -> Result<(), CredentialError>;
}

/// 保存ファイルの構造
#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
    #[serde(default = "Utc::now")]
    acquired_at: DateTime<Utc>,
}

/// TOMLファイルに保存するストア
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// プラットフォームのデータディレクトリ配下を使う
    pub fn with_default_path() -> Result<Self, CredentialError> {
        let dirs = directories::ProjectDirs::from("dev", "autogrow", "autogrow").ok_or_else(|| {
            CredentialError::Unavailable("Failed to determine data directory".into())
        })?;
        Ok(Self::new(dirs.data_dir().join("credentials.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// トークンの取得日時
    pub fn acquired_at(&self) -> Result<Option<DateTime<Utc>>, CredentialError> {
        Ok(self.read_file()?.map(|file| file.acquired_at))
    }

    fn read_file(&self) -> Result<Option<TokenFile>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let file: TokenFile = toml::from_str(&content)
            .map_err(|e| CredentialError::Unavailable(format!("corrupt credential file: {}", e)))?;
        if file.token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(file))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.read_file()?.map(|file| file.token))
    }

    fn save(&self, token: &str) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = TokenFile {
            token: token.to_string(),
            acquired_at: Utc::now(),
        };
        let content = toml::to_string_pretty(&file)
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.token.read().clone())
    }

    fn save(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.write() = None;
        Ok(())
    }
}
