use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Lifecycle, Patch};

/// 投稿ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
}

impl PostStatus {
    fn rank(self) -> u8 {
        match self {
            PostStatus::Draft => 0,
            PostStatus::Scheduled => 1,
            PostStatus::Published => 2,
        }
    }
}

impl Lifecycle for PostStatus {
    const INITIAL: Self = PostStatus::Draft;
    const ALL: &'static [Self] = &[
        PostStatus::Draft,
        PostStatus::Scheduled,
        PostStatus::Published,
    ];

    fn name(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
        }
    }

    fn can_transition_to(self, next: Self) -> bool {
        next.rank() >= self.rank()
    }

    fn is_terminal(self) -> bool {
        self == PostStatus::Published
    }
}

/// エンゲージメント指標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

/// コンテンツ投稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: EntityId,
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "scheduled_date")]
    pub scheduled_date: Option<String>,
    pub topic: String,
    pub audience: String,
    pub tone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

/// 識別子を除いた投稿フィールド
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "scheduled_date")]
    pub scheduled_date: Option<String>,
    pub topic: String,
    pub audience: String,
    pub tone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

impl NewPost {
    /// 下書き投稿を作成
    pub fn draft(
        content: impl Into<String>,
        topic: impl Into<String>,
        audience: impl Into<String>,
        tone: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            status: PostStatus::Draft,
            scheduled_date: None,
            topic: topic.into(),
            audience: audience.into(),
            tone: tone.into(),
            engagement: None,
        }
    }
}

/// 投稿の部分更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

impl Patch<Post> for PostPatch {
    fn apply_to(self, post: &mut Post) {
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(date) = self.scheduled_date {
            post.scheduled_date = Some(date);
        }
        if let Some(topic) = self.topic {
            post.topic = topic;
        }
        if let Some(audience) = self.audience {
            post.audience = audience;
        }
        if let Some(tone) = self.tone {
            post.tone = tone;
        }
        if let Some(engagement) = self.engagement {
            post.engagement = Some(engagement);
        }
    }

    fn is_empty(&self) -> bool {
        self == &PostPatch::default()
    }
}

impl Entity for Post {
    type New = NewPost;
    type Patch = PostPatch;

    const KIND: &'static str = "post";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_new(id: EntityId, new: NewPost) -> Self {
        Self {
            id,
            content: new.content,
            status: new.status,
            scheduled_date: new.scheduled_date,
            topic: new.topic,
            audience: new.audience,
            tone: new.tone,
            engagement: new.engagement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        Post::from_new(
            EntityId::from("p1"),
            NewPost {
                engagement: Some(Engagement {
                    likes: 10,
                    comments: 2,
                    shares: 1,
                }),
                ..NewPost::draft("x", "T", "Students", "Professional")
            },
        )
    }

    #[test]
    fn test_patch_replaces_nested_engagement_wholesale() {
        let mut post = sample();
        PostPatch {
            engagement: Some(Engagement {
                likes: 50,
                ..Default::default()
            }),
            ..Default::default()
        }
        .apply_to(&mut post);

        // comments/shares は以前の値を引き継がない
        assert_eq!(
            post.engagement,
            Some(Engagement {
                likes: 50,
                comments: 0,
                shares: 0
            })
        );
        assert_eq!(post.content, "x");
    }

    #[test]
    fn test_empty_patch() {
        assert!(PostPatch::default().is_empty());
        let mut post = sample();
        let before = post.clone();
        PostPatch::default().apply_to(&mut post);
        assert_eq!(post, before);
    }

    #[test]
    fn test_post_wire_format() {
        let post = Post {
            scheduled_date: Some("2025-01-01".to_string()),
            status: PostStatus::Scheduled,
            ..sample()
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["scheduledDate"], "2025-01-01");
        assert_eq!(json["status"], "scheduled");
    }

    #[test]
    fn test_new_post_accepts_backend_field_names() {
        let json = r#"{"content":"c","status":"draft","topic":"T","audience":"A","tone":"Casual","scheduled_date":"2025-02-01","created_at":"2025-01-01T00:00:00"}"#;
        let new_post: NewPost = serde_json::from_str(json).unwrap();
        assert_eq!(new_post.scheduled_date.as_deref(), Some("2025-02-01"));
        assert_eq!(new_post.status, PostStatus::Draft);
    }
}
