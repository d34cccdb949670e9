//! コンテンツ生成・予約

use serde::{Deserialize, Serialize};

use super::client::AutomationClient;
use super::endpoint::{json_body, require_items, require_text, segment, Ack, Endpoint, HttpMethod};
use super::error::{ApiResult, ValidationError};
use crate::models::{NewPost, PostPatch};

/// バックエンドが返す投稿（バックエンド側IDつき）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub post: NewPost,
}

/// 投稿の生成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContent {
    pub topic: String,
    pub audience: String,
    pub tone: String,
    /// 競合分析の結果（任意）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_data: Option<serde_json::Value>,
}

impl GenerateContent {
    pub fn new(
        topic: impl Into<String>,
        audience: impl Into<String>,
        tone: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            audience: audience.into(),
            tone: tone.into(),
            competitor_data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub posts: Vec<RemotePost>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for GenerateContent {
    type Response = GeneratedContent;
    const NAME: &'static str = "content.generate";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/content/generate".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("topic", &self.topic)?;
        require_text("audience", &self.audience)?;
        require_text("tone", &self.tone)
    }
}

/// 投稿の予約
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePost {
    pub content: String,
    pub scheduled_date: String,
    pub platforms: Vec<String>,
}

impl Endpoint for SchedulePost {
    type Response = Ack;
    const NAME: &'static str = "content.schedule";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/content/schedule".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("content", &self.content)?;
        require_text("scheduledDate", &self.scheduled_date)?;
        require_items("platforms", &self.platforms)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListPosts;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostList {
    #[serde(default)]
    pub posts: Vec<RemotePost>,
}

impl Endpoint for ListPosts {
    type Response = PostList;
    const NAME: &'static str = "content.list";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/content/posts".to_string()
    }
}

/// バックエンド上の投稿を部分更新する
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRemotePost {
    pub id: String,
    pub patch: PostPatch,
}

impl Endpoint for UpdateRemotePost {
    type Response = Ack;
    const NAME: &'static str = "content.update";

    fn method(&self) -> HttpMethod {
        HttpMethod::PUT
    }

    fn path(&self) -> String {
        format!("/content/posts/{}", segment(&self.id))
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(&self.patch)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)
    }
}

impl AutomationClient {
    pub async fn generate_content(&self, request: &GenerateContent) -> ApiResult<GeneratedContent> {
        self.execute(request).await
    }

    pub async fn schedule_post(&self, request: &SchedulePost) -> ApiResult<Ack> {
        self.execute(request).await
    }

    pub async fn list_posts(&self) -> ApiResult<PostList> {
        self.execute(&ListPosts).await
    }

    pub async fn update_remote_post(&self, id: &str, patch: PostPatch) -> ApiResult<Ack> {
        self.execute(&UpdateRemotePost {
            id: id.to_string(),
            patch,
        })
        .await
    }
}
