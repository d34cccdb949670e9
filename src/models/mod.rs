//! エンティティモデル
//!
//! ストアが所有するレコード型（投稿・卒業生・競合・広告キャンペーン・統計）と、
//! それぞれの部分更新（パッチ）を定義します。

pub mod ad_campaign;
pub mod alumni;
pub mod competitor;
pub mod lifecycle;
pub mod post;
pub mod stats;

use serde::{Deserialize, Serialize};

pub use ad_campaign::{
    is_valid_amount, AdCampaign, AdCampaignPatch, CampaignStatus, NewAdCampaign, Performance,
};
pub use alumni::{AlumniContact, AlumniPatch, AlumniStatus, NewAlumniContact, OutreachKind};
pub use competitor::{
    Competitor, CompetitorPatch, CompetitorPost, CompetitorSnapshot, NewCompetitor,
    MAX_RECENT_POSTS,
};
pub use lifecycle::{Lifecycle, TransitionError};
pub use post::{Engagement, NewPost, Post, PostPatch, PostStatus};
pub use stats::{AutomationStats, StatsPatch};

/// エンティティ識別子
///
/// ストアが作成時に割り当てる不透明な文字列。構造を解釈してはいけない。
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// 新しい一意な識別子を生成
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// ストアに格納できるエンティティ
pub trait Entity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// 識別子を除いた作成用フィールド
    type New;
    /// 部分更新
    type Patch: Patch<Self>;

    /// ログ出力用の種別名
    const KIND: &'static str;

    fn id(&self) -> &EntityId;

    fn from_new(id: EntityId, new: Self::New) -> Self;
}

/// 浅いマージによる部分更新
///
/// 指定されたトップレベルのフィールドだけを丸ごと置き換える。
/// ネストしたオブジェクト（`engagement` や `performance`）も再帰的にはマージしない。
pub trait Patch<T> {
    fn apply_to(self, target: &mut T);

    fn is_empty(&self) -> bool;
}
