//! アプリケーション設定管理モジュール
//!
//! プラットフォームの設定ディレクトリにある `config.toml` を読み書きする。
//! ファイルがなければ既定値、壊れていればエラー。

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// APIのベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "AUTOGROW_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// 自動化バックエンドへの接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// リクエストタイムアウト（秒）
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("autogrow/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// 認証設定
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// トークンファイル（Noneの場合はデータディレクトリ）
    pub token_file: Option<PathBuf>,
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// カスタムログディレクトリ（Noneの場合はデータディレクトリ配下）
    pub log_dir: Option<PathBuf>,
    /// ログレベル (trace/debug/info/warn/error)
    pub log_level: String,
    pub enable_file_logging: bool,
    /// 保存するログファイル数上限
    pub max_log_files: u32,
    /// 古いログファイル自動削除
    pub auto_cleanup_enabled: bool,
    /// ログファイル名パターン
    pub log_filename_pattern: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_level: "info".to_string(),
            enable_file_logging: false,
            max_log_files: 30,
            auto_cleanup_enabled: true,
            log_filename_pattern: "autogrow.log*".to_string(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 環境変数による上書きを適用
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!("API base URL overridden by {}: {}", API_URL_ENV, url);
            self.api.base_url = url;
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "autogrow", "autogrow").context("Failed to get project directories")
}

/// トークンファイルの場所
pub fn token_path(auth: &AuthConfig) -> Result<PathBuf> {
    match &auth.token_file {
        Some(path) => Ok(path.clone()),
        None => Ok(project_dirs()?.data_dir().join("credentials.toml")),
    }
}

/// ログディレクトリの場所
pub fn log_dir(log: &LogConfig) -> Result<PathBuf> {
    match &log.log_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(project_dirs()?.data_dir().join("logs")),
    }
}

/// 設定管理マネージャー
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// プラットフォームの設定ディレクトリを使う
    pub fn new() -> Result<Self> {
        let config_path = project_dirs()?.config_dir().join("config.toml");
        debug!("Config file path: {}", config_path.display());
        Ok(Self::with_path(config_path))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }

    /// 設定を読み込み（環境変数の上書きは含まない）
    pub fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Config file not found, using default settings: {}",
                self.config_path.display()
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        let config: AppConfig = toml::from_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })?;

        info!("✅ Configuration loaded from: {}", self.config_path.display());
        Ok(config)
    }

    /// 設定を読み込み、環境変数の上書きを適用する
    pub fn load_effective_config(&self) -> Result<AppConfig> {
        let mut config = self.load_config()?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).with_context(|| {
            format!("Failed to write config file: {}", self.config_path.display())
        })?;

        info!("💾 Configuration saved to: {}", self.config_path.display());
        Ok(())
    }

    /// 設定をリセット（デフォルト値に戻す）
    pub fn reset_config(&self) -> Result<()> {
        self.save_config(&AppConfig::default())?;
        info!("🔄 Configuration reset to defaults");
        Ok(())
    }

    /// 設定ファイルをバックアップ
    pub fn backup_config(&self) -> Result<PathBuf> {
        if !self.config_path.exists() {
            return Err(anyhow::anyhow!("Config file does not exist"));
        }

        let backup_path = self.config_path.with_extension("toml.bak");
        fs::copy(&self.config_path, &backup_path)
            .with_context(|| format!("Failed to backup config to: {}", backup_path.display()))?;

        info!("📋 Configuration backed up to: {}", backup_path.display());
        Ok(backup_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.log.log_level, "info");
        assert!(config.auth.token_file.is_none());
    }

    #[test]
    fn test_config_manager_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nested/config.toml"));

        let mut original = AppConfig::default();
        original.api.base_url = "https://automation.example.com/api".to_string();
        original.log.enable_file_logging = true;
        original.auth.token_file = Some(temp_dir.path().join("token.toml"));

        manager.save_config(&original).unwrap();
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nonexistent.toml"));

        assert!(!manager.config_exists());
        assert_eq!(manager.load_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_secs = 5\n").unwrap();

        let config = ConfigManager::with_path(&path).load_config().unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();

        let err = ConfigManager::with_path(&path).load_config().unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_override() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(|key| {
            (key == API_URL_ENV).then(|| "http://staging:9000/api".to_string())
        });
        assert_eq!(config.api.base_url, "http://staging:9000/api");

        let mut untouched = AppConfig::default();
        untouched.apply_overrides_from(|_| Some("  ".to_string()));
        assert_eq!(untouched.api.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_backup_and_reset() {
        let temp_dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));
        assert!(manager.backup_config().is_err());

        let mut config = AppConfig::default();
        config.api.timeout_secs = 99;
        manager.save_config(&config).unwrap();

        let backup = manager.backup_config().unwrap();
        assert!(backup.exists());

        manager.reset_config().unwrap();
        assert_eq!(manager.load_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_explicit_paths_win() {
        let auth = AuthConfig {
            token_file: Some(PathBuf::from("/tmp/autogrow-token.toml")),
        };
        assert_eq!(
            token_path(&auth).unwrap(),
            PathBuf::from("/tmp/autogrow-token.toml")
        );

        let log = LogConfig {
            log_dir: Some(PathBuf::from("/tmp/autogrow-logs")),
            ..LogConfig::default()
        };
        assert_eq!(log_dir(&log).unwrap(), PathBuf::from("/tmp/autogrow-logs"));
    }
}
