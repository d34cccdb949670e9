//! 状態ストア
//!
//! 全エンティティコレクションと統計の唯一の保持者。グローバルなインスタンスは
//! 持たず、明示的に生成した `StoreHandle` を必要なコンポーネントに渡す。
//!
//! 書き込みは同期的に完了し、コレクション単位で原子的に新しいスナップショットへ
//! 置き換わる。ストアは入力を検証しない。存在しない識別子への `update_*` は
//! エラーも変更もない無操作になる。
//!
//! 部分更新は浅いマージ: 指定されたフィールドは入れ子のオブジェクトも含めて
//! 丸ごと置き換わる（`engagement` の `likes` だけを変えても `comments` は残らない）。

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use super::broadcaster::{StateBroadcaster, StoreChange};
use super::snapshot::{Snapshot, Stored, DEFAULT_CONTENT_TOPICS};
use crate::models::{
    AdCampaign, AdCampaignPatch, AlumniContact, AlumniPatch, Competitor, CompetitorPatch, Entity,
    EntityId, NewAdCampaign, NewAlumniContact, NewCompetitor, NewPost, Patch, Post, PostPatch,
    StatsPatch, TransitionError,
};

/// コンポーネント間で共有するストアのハンドル
pub type StoreHandle = Arc<Store>;

/// 状態ストア
pub struct Store {
    current: RwLock<Arc<Snapshot>>,
    broadcaster: StateBroadcaster,
}

impl Store {
    /// 空のコレクションと既定の統計で初期化
    pub fn new() -> Self {
        Self::with_topics(
            DEFAULT_CONTENT_TOPICS
                .iter()
                .map(|topic| topic.to_string())
                .collect(),
        )
    }

    /// コンテンツトピックを指定して初期化
    pub fn with_topics(content_topics: Vec<String>) -> Self {
        debug!("🏗️ Creating state store ({} topics)", content_topics.len());
        Self {
            current: RwLock::new(Arc::new(Snapshot::initial(content_topics))),
            broadcaster: StateBroadcaster::new(),
        }
    }

    pub fn into_handle(self) -> StoreHandle {
        Arc::new(self)
    }

    /// 現在のスナップショットを取得
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// 状態変更の通知を購読
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.broadcaster.subscribe()
    }

    pub fn add_post(&self, post: NewPost) -> EntityId {
        self.add_entity::<Post>(post)
    }

    pub fn update_post(&self, id: &EntityId, patch: PostPatch) {
        self.update_entity::<Post>(id, patch);
    }

    pub fn add_alumni(&self, contact: NewAlumniContact) -> EntityId {
        self.add_entity::<AlumniContact>(contact)
    }

    pub fn update_alumni(&self, id: &EntityId, patch: AlumniPatch) {
        self.update_entity::<AlumniContact>(id, patch);
    }

    pub fn add_competitor(&self, competitor: NewCompetitor) -> EntityId {
        self.add_entity::<Competitor>(competitor)
    }

    pub fn update_competitor(&self, id: &EntityId, patch: CompetitorPatch) {
        self.update_entity::<Competitor>(id, patch);
    }

    pub fn add_ad_campaign(&self, campaign: NewAdCampaign) -> EntityId {
        self.add_entity::<AdCampaign>(campaign)
    }

    pub fn update_ad_campaign(&self, id: &EntityId, patch: AdCampaignPatch) {
        self.update_entity::<AdCampaign>(id, patch);
    }

    /// 統計を浅くマージする（重なるフィールドは後勝ち）
    pub fn update_stats(&self, patch: StatsPatch) {
        if patch.is_empty() {
            trace!("Empty stats patch ignored");
            return;
        }
        let change = {
            let mut guard = self.current.write();
            let mut next = Snapshot::clone(&guard);
            patch.apply_to(&mut next.stats);
            next.version += 1;
            let change = StoreChange::StatsUpdated(next.stats.clone());
            *guard = Arc::new(next);
            change
        };
        debug!("📊 Stats updated");
        self.broadcaster.broadcast(change);
    }

    /// ローディング状態を設定（他の副作用はない）
    pub fn set_loading(&self, loading: bool) {
        {
            let mut guard = self.current.write();
            if guard.is_loading == loading {
                return;
            }
            let mut next = Snapshot::clone(&guard);
            next.is_loading = loading;
            next.version += 1;
            *guard = Arc::new(next);
        }
        trace!("⏳ Loading: {}", loading);
        self.broadcaster.broadcast(StoreChange::LoadingChanged(loading));
    }

    fn add_entity<E: Stored>(&self, new: E::New) -> EntityId {
        let id = EntityId::generate();
        let entity = E::from_new(id.clone(), new);
        let count = {
            let mut guard = self.current.write();
            let mut next = Snapshot::clone(&guard);
            let items = Arc::make_mut(E::collection_mut(&mut next));
            items.push(entity);
            let count = items.len();
            next.version += 1;
            *guard = Arc::new(next);
            count
        };
        debug!("➕ Added {} {} ({} total)", E::KIND, id, count);
        self.broadcaster.broadcast(StoreChange::Added {
            kind: E::KIND,
            id: id.clone(),
            count,
        });
        id
    }

    fn update_entity<E: Stored>(&self, id: &EntityId, patch: E::Patch) {
        // パッチ適用は失敗しない
        let _ = self.modify_entity::<E, _>(id, |entity| {
            patch.apply_to(entity);
            Ok(())
        });
    }

    /// 識別子で見つけたエンティティを変更する
    ///
    /// 見つからなければ `Ok(false)`（無操作）。`mutate` がエラーを返した場合は
    /// 何も反映しない。
    pub(crate) fn modify_entity<E, F>(&self, id: &EntityId, mutate: F) -> Result<bool, TransitionError>
    where
        E: Stored,
        F: FnOnce(&mut E) -> Result<(), TransitionError>,
    {
        {
            let mut guard = self.current.write();
            let Some(index) = E::collection(&guard)
                .iter()
                .position(|entity| entity.id() == id)
            else {
                debug!("🔍 {} {} not found, update ignored", E::KIND, id);
                return Ok(false);
            };

            let mut entity = E::collection(&guard)[index].clone();
            mutate(&mut entity)?;

            let mut next = Snapshot::clone(&guard);
            Arc::make_mut(E::collection_mut(&mut next))[index] = entity;
            next.version += 1;
            *guard = Arc::new(next);
        }
        debug!("✏️ Updated {} {}", E::KIND, id);
        self.broadcaster.broadcast(StoreChange::Updated {
            kind: E::KIND,
            id: id.clone(),
        });
        Ok(true)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
