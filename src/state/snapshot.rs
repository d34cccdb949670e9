//! ストアのスナップショット
//!
//! 一度作られたスナップショットは変更されない。書き込みのたびに新しい
//! スナップショットが作られ、古いものを保持している読み手には影響しない。
//! 各コレクションは `Arc` で共有され、変更されたコレクションだけが複製される。

use serde::Serialize;
use std::sync::Arc;

use crate::models::{
    AdCampaign, AlumniContact, AutomationStats, CampaignStatus, Competitor, Entity, EntityId,
    Post,
};

/// 既定のコンテンツトピック
pub const DEFAULT_CONTENT_TOPICS: &[&str] = &[
    "Student Life",
    "Career Advice",
    "Campus Events",
    "Industry Insights",
    "Academic Success",
];

/// ある時点のストア全体の値
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub posts: Arc<Vec<Post>>,
    pub alumni: Arc<Vec<AlumniContact>>,
    pub competitors: Arc<Vec<Competitor>>,
    pub ad_campaigns: Arc<Vec<AdCampaign>>,
    pub content_topics: Arc<Vec<String>>,
    pub stats: AutomationStats,
    pub is_loading: bool,
    /// 実際に反映された書き込みの回数
    pub version: u64,
}

impl Snapshot {
    /// 初期状態（空のコレクションと既定の統計）
    pub fn initial(content_topics: Vec<String>) -> Self {
        Self {
            posts: Arc::default(),
            alumni: Arc::default(),
            competitors: Arc::default(),
            ad_campaigns: Arc::default(),
            content_topics: Arc::new(content_topics),
            stats: AutomationStats::default(),
            is_loading: false,
            version: 0,
        }
    }

    /// 識別子でエンティティを検索
    pub fn get<E: Stored>(&self, id: &EntityId) -> Option<&E> {
        E::collection(self).iter().find(|entity| entity.id() == id)
    }

    pub fn post(&self, id: &EntityId) -> Option<&Post> {
        self.get(id)
    }

    pub fn alumni_contact(&self, id: &EntityId) -> Option<&AlumniContact> {
        self.get(id)
    }

    pub fn competitor(&self, id: &EntityId) -> Option<&Competitor> {
        self.get(id)
    }

    pub fn ad_campaign(&self, id: &EntityId) -> Option<&AdCampaign> {
        self.get(id)
    }

    /// アクティブな広告キャンペーン数
    pub fn active_campaign_count(&self) -> usize {
        self.ad_campaigns
            .iter()
            .filter(|campaign| campaign.status == CampaignStatus::Active)
            .count()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::initial(
            DEFAULT_CONTENT_TOPICS
                .iter()
                .map(|topic| topic.to_string())
                .collect(),
        )
    }
}

/// スナップショット内にコレクションを持つエンティティ
pub trait Stored: Entity {
    fn collection(snapshot: &Snapshot) -> &[Self];

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Arc<Vec<Self>>;
}

impl Stored for Post {
    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.posts
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Arc<Vec<Self>> {
        &mut snapshot.posts
    }
}

impl Stored for AlumniContact {
    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.alumni
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Arc<Vec<Self>> {
        &mut snapshot.alumni
    }
}

impl Stored for Competitor {
    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.competitors
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Arc<Vec<Self>> {
        &mut snapshot.competitors
    }
}

impl Stored for AdCampaign {
    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.ad_campaigns
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Arc<Vec<Self>> {
        &mut snapshot.ad_campaigns
    }
}
