//! 型付きエンドポイント定義
//!
//! バックエンドの各操作はリクエスト型ごとに `Endpoint` を実装し、
//! メソッド・パス・ボディ・レスポンス型をコンパイル時に対応付ける。

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::error::ValidationError;

/// 形の定まっていない JSON オブジェクト
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// HTTPメソッド
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
        }
    }
}

/// バックエンドの一操作
pub trait Endpoint: Send + Sync {
    type Response: DeserializeOwned + Send;

    /// ログ用の操作名
    const NAME: &'static str;

    fn method(&self) -> HttpMethod;

    /// ベースURLからの相対パス
    fn path(&self) -> String;

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        Ok(None)
    }

    /// 送信前の入力検証
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// 成否とメッセージだけを返す操作のレスポンス
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// パスセグメントとしてエンコード
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

pub(crate) fn require_items<T>(field: &'static str, items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        Err(ValidationError::NoItems { field })
    } else {
        Ok(())
    }
}

pub(crate) fn require_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if crate::models::is_valid_amount(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount { field, value })
    }
}

/// LinkedIn のプロフィール／企業ページURLか
pub(crate) fn is_profile_url(url: &str) -> bool {
    static PROFILE_URL: OnceLock<Regex> = OnceLock::new();
    PROFILE_URL
        .get_or_init(|| {
            Regex::new(
                r"^https?://([a-z]{2,3}\.)?linkedin\.com/(company|in|school|showcase)/[A-Za-z0-9_.%-]+/?$",
            )
            .expect("profile URL pattern is valid")
        })
        .is_match(url.trim())
}

/// バックエンドのタイムスタンプを解釈する
///
/// RFC 3339 のほか、タイムゾーンなしの ISO 形式は UTC とみなす。
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `Serialize` なリクエストをJSONボディにする
pub(crate) fn json_body<T: Serialize>(
    request: &T,
) -> Result<Option<serde_json::Value>, serde_json::Error> {
    serde_json::to_value(request).map(Some)
}
