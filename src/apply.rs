//! APIの結果をストアへ反映する
//!
//! バックエンドのIDとストアのIDは別物なので、取り込んだエンティティの
//! 対応表を保持する。既知のバックエンドIDは追加ではなく更新になる。
//! バックエンドの値を正とするため、更新はライフサイクル検証をしない
//! `update_*` で行う。

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::api::{
    AdCampaignList, AlumniList, CampaignEnvelope, CampaignHandle, CompetitorEnvelope,
    CompetitorList, DashboardStats, GeneratedContent, ImportedAlumni, PausedAds, PostList,
    RemoteAdCampaign, RemoteAlumni, RemoteCompetitor, RemotePost,
};
use crate::models::{
    AdCampaign, AdCampaignPatch, AlumniContact, Competitor, Entity, EntityId, OutreachKind, Post,
    PostPatch, StatsPatch,
};
use crate::state::StoreHandle;

/// API結果をストアに適用する
pub struct ResultApplier {
    store: StoreHandle,
    remote_ids: RwLock<HashMap<(&'static str, String), EntityId>>,
    in_flight: AtomicUsize,
}

impl ResultApplier {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            remote_ids: RwLock::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// バックエンドIDに対応するストアID
    pub fn local_id<E: Entity>(&self, remote_id: &str) -> Option<EntityId> {
        self.remote_ids
            .read()
            .get(&(E::KIND, remote_id.to_string()))
            .cloned()
    }

    fn remember<E: Entity>(&self, remote_id: Option<&str>, local: &EntityId) {
        if let Some(remote_id) = remote_id {
            self.remote_ids
                .write()
                .insert((E::KIND, remote_id.to_string()), local.clone());
        }
    }

    /// 生成された投稿を下書きとして追加
    pub fn generated_content(&self, generated: &GeneratedContent) -> Vec<EntityId> {
        let ids: Vec<EntityId> = generated.posts.iter().map(|p| self.upsert_post(p)).collect();
        info!("📝 Applied {} generated posts", ids.len());
        ids
    }

    pub fn post_list(&self, list: &PostList) -> Vec<EntityId> {
        list.posts.iter().map(|p| self.upsert_post(p)).collect()
    }

    fn upsert_post(&self, remote: &RemotePost) -> EntityId {
        if let Some(local) = remote.id.as_deref().and_then(|id| self.local_id::<Post>(id)) {
            let post = remote.post.clone();
            self.store.update_post(
                &local,
                PostPatch {
                    content: Some(post.content),
                    status: Some(post.status),
                    scheduled_date: post.scheduled_date,
                    topic: Some(post.topic),
                    audience: Some(post.audience),
                    tone: Some(post.tone),
                    engagement: post.engagement,
                },
            );
            return local;
        }
        let local = self.store.add_post(remote.post.clone());
        self.remember::<Post>(remote.id.as_deref(), &local);
        local
    }

    /// 取り込まれた卒業生を追加
    pub fn imported_alumni(&self, imported: &ImportedAlumni) -> Vec<EntityId> {
        if imported.alumni.is_empty() && imported.imported > 0 {
            debug!(
                "Backend imported {} contacts without returning records",
                imported.imported
            );
        }
        imported
            .alumni
            .iter()
            .map(|remote| self.upsert_alumni(remote))
            .collect()
    }

    pub fn alumni_list(&self, list: &AlumniList) -> Vec<EntityId> {
        list.alumni
            .iter()
            .map(|remote| self.upsert_alumni(remote))
            .collect()
    }

    fn upsert_alumni(&self, remote: &RemoteAlumni) -> EntityId {
        let contact = remote.clone().into_new_contact();
        if let Some(local) = remote
            .id
            .as_deref()
            .and_then(|id| self.local_id::<AlumniContact>(id))
        {
            self.store.update_alumni(
                &local,
                crate::models::AlumniPatch {
                    name: Some(contact.name),
                    university: Some(contact.university),
                    graduation_year: Some(contact.graduation_year),
                    status: Some(contact.status),
                    last_contact: contact.last_contact,
                    connection_sent: Some(contact.connection_sent),
                    follow_page_pitch_sent: Some(contact.follow_page_pitch_sent),
                    story_submission_sent: Some(contact.story_submission_sent),
                },
            );
            return local;
        }
        let local = self.store.add_alumni(contact);
        self.remember::<AlumniContact>(remote.id.as_deref(), &local);
        local
    }

    /// キャンペーン開始を記録する
    ///
    /// 対象の卒業生に送信フラグを立てる。ステータスは変えない。
    /// ストアに存在しない対象は無視し、記録できた件数を返す。
    pub fn campaign_started(
        &self,
        alumni_ids: &[String],
        kind: OutreachKind,
        handle: &CampaignHandle,
    ) -> usize {
        let kind = handle.campaign_type.unwrap_or(kind);
        let mut recorded = 0;
        for remote_id in alumni_ids {
            let local = self
                .local_id::<AlumniContact>(remote_id)
                .unwrap_or_else(|| EntityId::from(remote_id.as_str()));
            if self.store.snapshot().alumni_contact(&local).is_some() {
                self.store.record_outreach(&local, kind);
                recorded += 1;
            }
        }
        info!(
            "🤝 {} campaign: backend processed {}, recorded {}",
            kind.as_str(),
            handle.contacts_processed,
            recorded
        );
        recorded
    }

    /// 作成・最適化された広告キャンペーン
    ///
    /// 金額やカウンターが不正なレコードは取り込まず None を返す。
    pub fn ad_campaign(&self, envelope: &CampaignEnvelope) -> Option<EntityId> {
        self.upsert_ad_campaign(&envelope.campaign)
    }

    /// 取り込めたキャンペーンのIDだけを返す
    pub fn ad_campaign_list(&self, list: &AdCampaignList) -> Vec<EntityId> {
        list.campaigns
            .iter()
            .filter_map(|remote| self.upsert_ad_campaign(remote))
            .collect()
    }

    fn upsert_ad_campaign(&self, remote: &RemoteAdCampaign) -> Option<EntityId> {
        if let Err(e) = remote.validate() {
            warn!(
                "⚠️ Skipping ad campaign {} ({}): {}",
                remote.id.as_deref().unwrap_or("<no id>"),
                remote.name,
                e
            );
            return None;
        }
        let campaign = remote.clone().into_new_campaign();
        if let Some(local) = remote
            .id
            .as_deref()
            .and_then(|id| self.local_id::<AdCampaign>(id))
        {
            self.store.update_ad_campaign(
                &local,
                AdCampaignPatch {
                    name: Some(campaign.name),
                    budget: Some(campaign.budget),
                    cpa: Some(campaign.cpa),
                    status: Some(campaign.status),
                    headlines: Some(campaign.headlines),
                    target_audience: Some(campaign.target_audience),
                    performance: Some(campaign.performance),
                },
            );
            return Some(local);
        }
        let local = self.store.add_ad_campaign(campaign);
        self.remember::<AdCampaign>(remote.id.as_deref(), &local);
        Some(local)
    }

    /// 一時停止された広告を反映し、停止できた件数を返す
    ///
    /// 停止できた場合は統計のアクティブ数もストアの内容に合わせる。
    pub fn paused_ads(&self, paused: &PausedAds) -> usize {
        let applied = paused
            .paused
            .iter()
            .filter_map(|remote_id| self.local_id::<AdCampaign>(remote_id))
            .filter(|local| self.store.pause_ad_campaign(local).is_ok())
            .count();
        if applied > 0 {
            let active = self.store.snapshot().active_campaign_count();
            self.store.update_stats(StatsPatch {
                ad_campaigns_active: Some(active as u64),
                ..Default::default()
            });
        }
        applied
    }

    /// 追加・再取得された競合
    pub fn competitor(&self, envelope: &CompetitorEnvelope) -> EntityId {
        self.upsert_competitor(&envelope.competitor)
    }

    pub fn competitor_list(&self, list: &CompetitorList) -> Vec<EntityId> {
        list.competitors
            .iter()
            .map(|remote| self.upsert_competitor(remote))
            .collect()
    }

    fn upsert_competitor(&self, remote: &RemoteCompetitor) -> EntityId {
        if let Some(local) = remote
            .id
            .as_deref()
            .and_then(|id| self.local_id::<Competitor>(id))
        {
            self.store.refresh_competitor(&local, remote.snapshot());
            return local;
        }
        let local = self
            .store
            .add_competitor(remote.clone().into_new_competitor(Utc::now()));
        self.remember::<Competitor>(remote.id.as_deref(), &local);
        local
    }

    pub fn dashboard(&self, stats: &DashboardStats) {
        self.store.update_stats(stats.to_patch());
    }

    /// 処理中フラグを立てて処理を待つ
    ///
    /// 並行して複数の処理があっても、最後の処理が終わるまでフラグは下ろさない。
    pub async fn track_loading<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = LoadingGuard::enter(self);
        work.await
    }
}

struct LoadingGuard<'a> {
    applier: &'a ResultApplier,
}

impl<'a> LoadingGuard<'a> {
    fn enter(applier: &'a ResultApplier) -> Self {
        if applier.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            applier.store.set_loading(true);
        }
        Self { applier }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.applier.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.applier.store.set_loading(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlumniStatus, CampaignStatus, PostStatus};
    use crate::state::{Store, StoreChange};

    fn applier() -> ResultApplier {
        ResultApplier::new(Store::new().into_handle())
    }

    fn generated(ids: &[&str]) -> GeneratedContent {
        let posts = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "content": format!("content {}", id),
                    "topic": "Career Advice",
                    "audience": "students",
                    "tone": "Casual",
                    "status": "draft"
                })
            })
            .collect::<Vec<_>>();
        serde_json::from_value(serde_json::json!({"success": true, "posts": posts})).unwrap()
    }

    #[test]
    fn test_generated_posts_become_drafts() {
        let applier = applier();
        let ids = applier.generated_content(&generated(&["post_1", "post_2"]));

        let snapshot = applier.store().snapshot();
        assert_eq!(snapshot.posts.len(), 2);
        assert_eq!(snapshot.post(&ids[0]).unwrap().status, PostStatus::Draft);
        assert_eq!(applier.local_id::<Post>("post_2"), Some(ids[1].clone()));
    }

    #[test]
    fn test_known_remote_post_is_updated_not_duplicated() {
        let applier = applier();
        let first = applier.generated_content(&generated(&["post_1"]));

        let list: PostList = serde_json::from_value(serde_json::json!({"posts": [{
            "id": "post_1", "content": "edited", "topic": "Career Advice",
            "audience": "students", "tone": "Casual", "status": "scheduled",
            "scheduled_date": "2025-01-01T09:00"
        }]}))
        .unwrap();
        let second = applier.post_list(&list);

        assert_eq!(first, second);
        let snapshot = applier.store().snapshot();
        assert_eq!(snapshot.posts.len(), 1);
        let post = snapshot.post(&first[0]).unwrap();
        assert_eq!(post.content, "edited");
        assert_eq!(post.status, PostStatus::Scheduled);
    }

    #[test]
    fn test_campaign_started_records_outreach_for_known_contacts() {
        let applier = applier();
        let list: AlumniList = serde_json::from_value(serde_json::json!({"alumni": [
            {"id": "alumni_1", "name": "A", "university": "MIT", "graduation_year": 2020},
            {"id": "alumni_2", "name": "B", "university": "MIT", "graduation_year": 2021}
        ]}))
        .unwrap();
        let ids = applier.alumni_list(&list);

        let handle = CampaignHandle {
            success: true,
            contacts_processed: 2,
            ..Default::default()
        };
        let recorded = applier.campaign_started(
            &["alumni_1".to_string(), "alumni_9".to_string()],
            OutreachKind::Follow,
            &handle,
        );

        assert_eq!(recorded, 1);
        let snapshot = applier.store().snapshot();
        let contact = snapshot.alumni_contact(&ids[0]).unwrap();
        assert!(contact.follow_page_pitch_sent);
        assert!(contact.last_contact.is_some());
        assert_eq!(contact.status, AlumniStatus::Pending);
        assert!(!snapshot.alumni_contact(&ids[1]).unwrap().follow_page_pitch_sent);
    }

    #[test]
    fn test_paused_ads_only_touch_known_campaigns() {
        let applier = applier();
        let envelope: CampaignEnvelope = serde_json::from_value(serde_json::json!({
            "success": true,
            "campaign": {"id": "campaign_1", "name": "Spring", "budget": 100,
                         "headlines": ["Join"], "target_audience": "students"}
        }))
        .unwrap();
        let local = applier.ad_campaign(&envelope).unwrap();

        let paused = PausedAds {
            success: true,
            paused: vec!["campaign_1".to_string(), "campaign_404".to_string()],
            message: None,
        };
        assert_eq!(applier.paused_ads(&paused), 1);
        let snapshot = applier.store().snapshot();
        assert_eq!(
            snapshot.ad_campaign(&local).unwrap().status,
            CampaignStatus::Paused
        );
        assert_eq!(snapshot.stats.ad_campaigns_active, 0);
    }

    fn remote_campaign(id: &str, cpa: f64, performance: serde_json::Value) -> RemoteAdCampaign {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": "Spring", "budget": 100, "cpa": cpa,
            "headlines": ["Join"], "target_audience": "students",
            "performance": performance
        }))
        .unwrap()
    }

    #[test]
    fn test_inconsistent_campaigns_are_not_applied() {
        let applier = applier();
        let envelope = CampaignEnvelope {
            success: true,
            campaign: remote_campaign(
                "campaign_1",
                -5.0,
                serde_json::json!({"impressions": 1, "clicks": 50, "conversions": 99}),
            ),
            message: None,
        };
        assert_eq!(applier.ad_campaign(&envelope), None);
        assert!(applier.store().snapshot().ad_campaigns.is_empty());
        assert_eq!(applier.local_id::<AdCampaign>("campaign_1"), None);

        let list = AdCampaignList {
            campaigns: vec![
                remote_campaign(
                    "campaign_2",
                    12.5,
                    serde_json::json!({"impressions": 1000, "clicks": 40, "conversions": 2}),
                ),
                remote_campaign(
                    "campaign_3",
                    10.0,
                    serde_json::json!({"impressions": 10, "clicks": 20, "conversions": 0}),
                ),
                remote_campaign("campaign_4", -1.0, serde_json::json!({})),
            ],
        };
        let ids = applier.ad_campaign_list(&list);

        let snapshot = applier.store().snapshot();
        assert_eq!(ids.len(), 1);
        assert_eq!(snapshot.ad_campaigns.len(), 1);
        let stored = snapshot.ad_campaign(&ids[0]).unwrap();
        assert!(stored.performance.is_consistent());
        assert_eq!(stored.cpa, 12.5);
    }

    #[test]
    fn test_invalid_refresh_keeps_previous_values() {
        let applier = applier();
        let local = applier
            .ad_campaign(&CampaignEnvelope {
                success: true,
                campaign: remote_campaign(
                    "campaign_1",
                    8.0,
                    serde_json::json!({"impressions": 500, "clicks": 25, "conversions": 5}),
                ),
                message: None,
            })
            .unwrap();

        let refreshed = CampaignEnvelope {
            success: true,
            campaign: remote_campaign(
                "campaign_1",
                8.0,
                serde_json::json!({"impressions": 500, "clicks": 25, "conversions": 30}),
            ),
            message: None,
        };
        assert_eq!(applier.ad_campaign(&refreshed), None);

        let snapshot = applier.store().snapshot();
        let stored = snapshot.ad_campaign(&local).unwrap();
        assert_eq!(stored.performance.conversions, 5);
        assert_eq!(snapshot.ad_campaigns.len(), 1);
    }

    #[test]
    fn test_refreshed_competitor_overwrites_snapshot() {
        let applier = applier();
        let added: CompetitorEnvelope = serde_json::from_value(serde_json::json!({
            "competitor": {"id": "competitor_1", "name": "Rival", "follower_count": 100,
                           "post_frequency": 2, "engagement_rate": 1.5,
                           "last_updated": "2024-03-01T10:00:00"}
        }))
        .unwrap();
        let local = applier.competitor(&added);

        let refreshed: CompetitorEnvelope = serde_json::from_value(serde_json::json!({
            "competitor": {"id": "competitor_1", "name": "Rival", "follower_count": 80,
                           "post_frequency": 4, "engagement_rate": 6.0}
        }))
        .unwrap();
        assert_eq!(applier.competitor(&refreshed), local);

        let snapshot = applier.store().snapshot();
        assert_eq!(snapshot.competitors.len(), 1);
        let competitor = snapshot.competitor(&local).unwrap();
        assert_eq!(competitor.follower_count, 80);
        assert_eq!(competitor.engagement_rate, 6.0);
    }

    #[test]
    fn test_dashboard_merges_into_stats() {
        let applier = applier();
        let stats: DashboardStats =
            serde_json::from_value(serde_json::json!({"content_generated": 3})).unwrap();
        applier.dashboard(&stats);

        let snapshot = applier.store().snapshot();
        assert_eq!(snapshot.stats.content_generated, 3);
        assert_eq!(snapshot.stats.total_followers, 15420);
    }

    #[tokio::test]
    async fn test_track_loading_covers_overlapping_work() {
        let applier = applier();
        let store = applier.store().clone();

        let value = applier
            .track_loading(async {
                assert!(store.snapshot().is_loading);
                applier
                    .track_loading(async {
                        assert!(store.snapshot().is_loading);
                    })
                    .await;
                // 内側が終わっても外側が続く間はフラグを維持する
                assert!(store.snapshot().is_loading);
                42
            })
            .await;

        assert_eq!(value, 42);
        assert!(!store.snapshot().is_loading);
    }

    #[test]
    fn test_loading_flag_toggles_once_per_batch() {
        let applier = applier();
        let mut changes = applier.store().subscribe();

        tokio_test::block_on(applier.track_loading(async {}));

        assert_eq!(changes.try_recv().unwrap(), StoreChange::LoadingChanged(true));
        assert_eq!(changes.try_recv().unwrap(), StoreChange::LoadingChanged(false));
        assert!(changes.try_recv().is_err());
    }
}
