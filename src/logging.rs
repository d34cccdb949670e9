//! ログ初期化
//!
//! `RUST_LOG` が設定されていれば設定ファイルのレベルより優先する。
//! 標準出力はコマンドの結果に使うため、コンソールログは標準エラーに出す。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{self, LogConfig};

/// ログファイル名の接頭辞（日付がサフィックスとして付く）
pub const LOG_FILE_PREFIX: &str = "autogrow.log";

/// ファイル出力のバックグラウンドライターを保持する
///
/// ドロップすると未書き込みのログがフラッシュされる。
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to build log filter")
}

pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let env_filter = build_filter(&config.log_level)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let (file_layer, file_guard, log_dir) = if config.enable_file_logging {
        let dir = config::log_dir(config)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

        let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true);
        (Some(layer), Some(guard), Some(dir))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(dir) = &log_dir {
        info!("📁 Writing logs to {}", dir.display());
        if config.auto_cleanup_enabled {
            match cleanup_old_logs(dir, &config.log_filename_pattern, config.max_log_files as usize)
            {
                Ok(0) => {}
                Ok(removed) => info!("🧹 Removed {} old log files", removed),
                Err(e) => warn!("⚠️ Log cleanup failed: {}", e),
            }
        }
    }

    Ok(LoggingGuard { _file: file_guard })
}

/// パターンに一致するログファイルを新しい順に `keep` 件だけ残して削除する
///
/// 日付サフィックスのファイル名は辞書順が日付順になる。削除した件数を返す。
pub fn cleanup_old_logs(dir: &Path, pattern: &str, keep: usize) -> Result<usize> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)
        .with_context(|| format!("Invalid log filename pattern: {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    if files.len() <= keep {
        return Ok(0);
    }

    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    let mut removed = 0;
    for path in files.into_iter().skip(keep) {
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed old log file: {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("⚠️ Failed to remove {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}
