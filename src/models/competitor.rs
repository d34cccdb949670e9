use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Patch};

/// 保持する最近の投稿の上限
pub const MAX_RECENT_POSTS: usize = 20;

/// 競合の最近の投稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorPost {
    pub content: String,
    /// エンゲージメントスコア
    pub engagement: u64,
    pub date: NaiveDate,
}

/// 追跡中の競合アカウント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub id: EntityId,
    pub name: String,
    #[serde(alias = "follower_count")]
    pub follower_count: u64,
    /// 週あたりの投稿数
    #[serde(alias = "post_frequency")]
    pub post_frequency: f64,
    #[serde(alias = "engagement_rate")]
    pub engagement_rate: f64,
    #[serde(alias = "last_updated", alias = "last_update")]
    pub last_update: DateTime<Utc>,
    #[serde(default, alias = "recent_posts")]
    pub recent_posts: Vec<CompetitorPost>,
}

/// 定期更新で取得するスナップショット値
///
/// いずれも時点の値であり、既存の値と平均化したりマージしたりはしない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSnapshot {
    #[serde(alias = "follower_count")]
    pub follower_count: u64,
    #[serde(alias = "post_frequency")]
    pub post_frequency: f64,
    #[serde(alias = "engagement_rate")]
    pub engagement_rate: f64,
    #[serde(default, alias = "recent_posts")]
    pub recent_posts: Vec<CompetitorPost>,
}

impl Competitor {
    /// スナップショットで上書きする（新しい順に並べ、上限で切り詰める）
    pub fn refresh(&mut self, snapshot: CompetitorSnapshot, at: DateTime<Utc>) {
        self.follower_count = snapshot.follower_count;
        self.post_frequency = snapshot.post_frequency;
        self.engagement_rate = snapshot.engagement_rate;
        self.recent_posts = normalize_recent_posts(snapshot.recent_posts);
        self.last_update = at;
    }
}

fn normalize_recent_posts(mut posts: Vec<CompetitorPost>) -> Vec<CompetitorPost> {
    // 同日の投稿は元の順序を保つ
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts.truncate(MAX_RECENT_POSTS);
    posts
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompetitor {
    pub name: String,
    #[serde(alias = "follower_count")]
    pub follower_count: u64,
    #[serde(alias = "post_frequency")]
    pub post_frequency: f64,
    #[serde(alias = "engagement_rate")]
    pub engagement_rate: f64,
    #[serde(alias = "last_updated", alias = "last_update")]
    pub last_update: DateTime<Utc>,
    #[serde(default, alias = "recent_posts")]
    pub recent_posts: Vec<CompetitorPost>,
}

/// 競合の部分更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_posts: Option<Vec<CompetitorPost>>,
}

impl Patch<Competitor> for CompetitorPatch {
    fn apply_to(self, competitor: &mut Competitor) {
        if let Some(name) = self.name {
            competitor.name = name;
        }
        if let Some(count) = self.follower_count {
            competitor.follower_count = count;
        }
        if let Some(frequency) = self.post_frequency {
            competitor.post_frequency = frequency;
        }
        if let Some(rate) = self.engagement_rate {
            competitor.engagement_rate = rate;
        }
        if let Some(at) = self.last_update {
            competitor.last_update = at;
        }
        if let Some(posts) = self.recent_posts {
            competitor.recent_posts = posts;
        }
    }

    fn is_empty(&self) -> bool {
        self == &CompetitorPatch::default()
    }
}

impl Entity for Competitor {
    type New = NewCompetitor;
    type Patch = CompetitorPatch;

    const KIND: &'static str = "competitor";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_new(id: EntityId, new: NewCompetitor) -> Self {
        Self {
            id,
            name: new.name,
            follower_count: new.follower_count,
            post_frequency: new.post_frequency,
            engagement_rate: new.engagement_rate,
            last_update: new.last_update,
            recent_posts: new.recent_posts,
        }
    }
}
