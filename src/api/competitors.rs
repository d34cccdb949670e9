//! 競合トラッキング

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::AutomationClient;
use super::endpoint::{
    is_profile_url, json_body, parse_timestamp, require_items, require_text, segment, Ack,
    Endpoint, HttpMethod, JsonObject,
};
use super::error::{ApiResult, ValidationError};
use crate::models::{CompetitorPost, CompetitorSnapshot, NewCompetitor};

/// バックエンドが返す競合レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCompetitor {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, alias = "linkedin_url")]
    pub linkedin_url: Option<String>,
    #[serde(default, alias = "follower_count")]
    pub follower_count: u64,
    #[serde(default, alias = "post_frequency")]
    pub post_frequency: f64,
    #[serde(default, alias = "engagement_rate")]
    pub engagement_rate: f64,
    #[serde(default, alias = "last_updated", alias = "lastUpdate", alias = "last_update")]
    pub last_updated: Option<String>,
    #[serde(default, alias = "recent_posts")]
    pub recent_posts: Vec<CompetitorPost>,
}

impl RemoteCompetitor {
    pub fn snapshot(&self) -> CompetitorSnapshot {
        CompetitorSnapshot {
            follower_count: self.follower_count,
            post_frequency: self.post_frequency,
            engagement_rate: self.engagement_rate,
            recent_posts: self.recent_posts.clone(),
        }
    }

    /// 更新日時が読めない場合は `fallback` を使う
    pub fn into_new_competitor(self, fallback: DateTime<Utc>) -> NewCompetitor {
        let last_update = self
            .last_updated
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(fallback);
        NewCompetitor {
            name: self.name,
            follower_count: self.follower_count,
            post_frequency: self.post_frequency,
            engagement_rate: self.engagement_rate,
            last_update,
            recent_posts: self.recent_posts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCompetitor {
    pub name: String,
    pub linkedin_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorEnvelope {
    #[serde(default)]
    pub success: bool,
    pub competitor: RemoteCompetitor,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for AddCompetitor {
    type Response = CompetitorEnvelope;
    const NAME: &'static str = "competitors.add";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/competitors".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if !is_profile_url(&self.linkedin_url) {
            return Err(ValidationError::InvalidUrl {
                field: "linkedinUrl",
                value: self.linkedin_url.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListCompetitors;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompetitorList {
    #[serde(default)]
    pub competitors: Vec<RemoteCompetitor>,
}

impl Endpoint for ListCompetitors {
    type Response = CompetitorList;
    const NAME: &'static str = "competitors.list";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/competitors".to_string()
    }
}

/// 競合データの再取得
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshCompetitor {
    pub id: String,
}

impl Endpoint for RefreshCompetitor {
    type Response = CompetitorEnvelope;
    const NAME: &'static str = "competitors.refresh";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        format!("/competitors/{}/update", segment(&self.id))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitorInsights;

impl Endpoint for CompetitorInsights {
    type Response = JsonObject;
    const NAME: &'static str = "competitors.insights";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/competitors/insights".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCompetitorMonitoring {
    pub competitor_ids: Vec<String>,
}

impl Endpoint for StartCompetitorMonitoring {
    type Response = Ack;
    const NAME: &'static str = "competitors.monitor";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/competitors/monitor".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_items("competitorIds", &self.competitor_ids)
    }
}

impl AutomationClient {
    pub async fn add_competitor(
        &self,
        name: impl Into<String>,
        linkedin_url: impl Into<String>,
    ) -> ApiResult<CompetitorEnvelope> {
        self.execute(&AddCompetitor {
            name: name.into(),
            linkedin_url: linkedin_url.into(),
        })
        .await
    }

    pub async fn list_competitors(&self) -> ApiResult<CompetitorList> {
        self.execute(&ListCompetitors).await
    }

    pub async fn refresh_competitor(&self, id: &str) -> ApiResult<CompetitorEnvelope> {
        self.execute(&RefreshCompetitor { id: id.to_string() }).await
    }

    pub async fn competitor_insights(&self) -> ApiResult<JsonObject> {
        self.execute(&CompetitorInsights).await
    }

    pub async fn start_competitor_monitoring(&self, competitor_ids: Vec<String>) -> ApiResult<Ack> {
        self.execute(&StartCompetitorMonitoring { competitor_ids }).await
    }
}
