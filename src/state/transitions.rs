//! ライフサイクルを検証する更新操作
//!
//! `update_*` は検証を行わないため、ステータスを変える操作はこちらを使う。
//! 許可されていない遷移は `TransitionError` になり、何も反映されない。
//! 存在しない識別子は `update_*` と同じく無操作。

use chrono::Utc;
use tracing::{info, warn};

use super::store::Store;
use crate::models::lifecycle::check_transition;
use crate::models::{
    AdCampaign, AlumniContact, AlumniStatus, CampaignStatus, Competitor, CompetitorSnapshot,
    Entity, EntityId, OutreachKind, Performance, Post, PostStatus, TransitionError,
};

impl Store {
    /// 投稿を予約する（draft -> scheduled）
    pub fn schedule_post(
        &self,
        id: &EntityId,
        scheduled_date: impl Into<String>,
    ) -> Result<(), TransitionError> {
        let scheduled_date = scheduled_date.into();
        self.guarded::<Post, _>(id, |post| {
            check_transition(Post::KIND, &post.id, post.status, PostStatus::Scheduled)?;
            post.status = PostStatus::Scheduled;
            post.scheduled_date = Some(scheduled_date);
            Ok(())
        })
    }

    /// 投稿を公開済みにする
    pub fn publish_post(&self, id: &EntityId) -> Result<(), TransitionError> {
        self.guarded::<Post, _>(id, |post| {
            check_transition(Post::KIND, &post.id, post.status, PostStatus::Published)?;
            post.status = PostStatus::Published;
            Ok(())
        })
    }

    /// 卒業生のステータスを前に進める（前方へのスキップは許可）
    pub fn advance_alumni(&self, id: &EntityId, status: AlumniStatus) -> Result<(), TransitionError> {
        self.guarded::<AlumniContact, _>(id, |contact| {
            check_transition(AlumniContact::KIND, &contact.id, contact.status, status)?;
            contact.status = status;
            Ok(())
        })
    }

    /// アウトリーチ送信を記録する（フラグと最終連絡日時のみ、冪等）
    pub fn record_outreach(&self, id: &EntityId, kind: OutreachKind) {
        let _ = self.modify_entity::<AlumniContact, _>(id, |contact| {
            contact.mark_outreach(kind, Utc::now());
            Ok(())
        });
    }

    pub fn pause_ad_campaign(&self, id: &EntityId) -> Result<(), TransitionError> {
        self.set_campaign_status(id, CampaignStatus::Paused)
    }

    pub fn resume_ad_campaign(&self, id: &EntityId) -> Result<(), TransitionError> {
        self.set_campaign_status(id, CampaignStatus::Active)
    }

    pub fn complete_ad_campaign(&self, id: &EntityId) -> Result<(), TransitionError> {
        self.set_campaign_status(id, CampaignStatus::Completed)
    }

    /// 広告のパフォーマンスカウンターを記録する
    ///
    /// impressions ≥ clicks ≥ conversions を満たさない値は拒否する。
    pub fn record_ad_performance(
        &self,
        id: &EntityId,
        performance: Performance,
    ) -> Result<(), TransitionError> {
        self.guarded::<AdCampaign, _>(id, |campaign| {
            if !performance.is_consistent() {
                return Err(TransitionError::InconsistentPerformance {
                    entity: AdCampaign::KIND,
                    id: campaign.id.clone(),
                    impressions: performance.impressions,
                    clicks: performance.clicks,
                    conversions: performance.conversions,
                });
            }
            campaign.performance = performance;
            Ok(())
        })
    }

    /// 競合のスナップショット値を上書きする
    pub fn refresh_competitor(&self, id: &EntityId, snapshot: CompetitorSnapshot) {
        let _ = self.modify_entity::<Competitor, _>(id, |competitor| {
            competitor.refresh(snapshot, Utc::now());
            Ok(())
        });
    }

    fn set_campaign_status(
        &self,
        id: &EntityId,
        status: CampaignStatus,
    ) -> Result<(), TransitionError> {
        self.guarded::<AdCampaign, _>(id, |campaign| {
            check_transition(AdCampaign::KIND, &campaign.id, campaign.status, status)?;
            if campaign.status != status {
                info!("📣 Ad campaign {} -> {:?}", campaign.id, status);
            }
            campaign.status = status;
            Ok(())
        })
    }

    fn guarded<E, F>(&self, id: &EntityId, mutate: F) -> Result<(), TransitionError>
    where
        E: super::snapshot::Stored,
        F: FnOnce(&mut E) -> Result<(), TransitionError>,
    {
        self.modify_entity::<E, F>(id, mutate)
            .map(|_| ())
            .map_err(|e| {
                warn!("⚠️ Rejected update: {}", e);
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewAdCampaign, NewAlumniContact, NewCompetitor, NewPost};

    fn campaign(store: &Store) -> EntityId {
        store.add_ad_campaign(NewAdCampaign {
            name: "Spring intake".to_string(),
            budget: 1000.0,
            headlines: vec!["Join now".to_string()],
            target_audience: "students".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_post_schedule_then_publish() {
        let store = Store::new();
        let id = store.add_post(NewPost::draft("x", "T", "A", "Casual"));

        store.schedule_post(&id, "2025-01-01T09:00").unwrap();
        store.publish_post(&id).unwrap();

        let snapshot = store.snapshot();
        let post = snapshot.post(&id).unwrap();
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.scheduled_date.as_deref(), Some("2025-01-01T09:00"));
    }

    #[test]
    fn test_published_post_cannot_be_rescheduled() {
        let store = Store::new();
        let id = store.add_post(NewPost::draft("x", "T", "A", "Casual"));
        store.publish_post(&id).unwrap();
        let version = store.version();

        let err = store.schedule_post(&id, "2025-01-01").unwrap_err();
        assert!(matches!(err, TransitionError::NotAllowed { from: "published", to: "scheduled", .. }));
        assert_eq!(store.version(), version);
        assert_eq!(store.snapshot().post(&id).unwrap().scheduled_date, None);
    }

    #[test]
    fn test_missing_entity_is_ignored_by_guarded_operations() {
        let store = Store::new();
        let missing = EntityId::from("missing");
        assert!(store.publish_post(&missing).is_ok());
        assert!(store.advance_alumni(&missing, AlumniStatus::Engaged).is_ok());
        assert!(store.complete_ad_campaign(&missing).is_ok());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_alumni_forward_jump_and_backward_rejection() {
        let store = Store::new();
        let id = store.add_alumni(NewAlumniContact::pending("A", "U", 2020));

        store.advance_alumni(&id, AlumniStatus::Engaged).unwrap();
        assert!(store.advance_alumni(&id, AlumniStatus::Connected).is_err());
        assert_eq!(
            store.snapshot().alumni_contact(&id).unwrap().status,
            AlumniStatus::Engaged
        );
    }

    #[test]
    fn test_record_outreach_is_idempotent() {
        let store = Store::new();
        let id = store.add_alumni(NewAlumniContact::pending("A", "U", 2020));

        store.record_outreach(&id, OutreachKind::Connection);
        let first = store.snapshot().alumni_contact(&id).unwrap().clone();
        store.record_outreach(&id, OutreachKind::Connection);
        let second = store.snapshot().alumni_contact(&id).unwrap().clone();

        assert!(first.connection_sent);
        assert_eq!(first, second);
        assert_eq!(first.status, AlumniStatus::Pending);
    }

    #[test]
    fn test_campaign_pause_resume_complete() {
        let store = Store::new();
        let id = campaign(&store);

        store.pause_ad_campaign(&id).unwrap();
        store.resume_ad_campaign(&id).unwrap();
        store.pause_ad_campaign(&id).unwrap();
        store.complete_ad_campaign(&id).unwrap();

        assert!(store.resume_ad_campaign(&id).is_err());
        assert!(store.pause_ad_campaign(&id).is_err());
        assert_eq!(
            store.snapshot().ad_campaign(&id).unwrap().status,
            CampaignStatus::Completed
        );
    }

    #[test]
    fn test_inconsistent_performance_is_rejected() {
        let store = Store::new();
        let id = campaign(&store);

        let err = store
            .record_ad_performance(
                &id,
                Performance {
                    impressions: 5,
                    clicks: 10,
                    conversions: 0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InconsistentPerformance { clicks: 10, .. }));

        store
            .record_ad_performance(
                &id,
                Performance {
                    impressions: 500,
                    clicks: 10,
                    conversions: 2,
                },
            )
            .unwrap();
        assert_eq!(
            store.snapshot().ad_campaign(&id).unwrap().performance.impressions,
            500
        );
    }

    #[test]
    fn test_refresh_competitor_overwrites_snapshot() {
        let store = Store::new();
        let id = store.add_competitor(NewCompetitor {
            name: "Rival".to_string(),
            follower_count: 100,
            post_frequency: 2.0,
            engagement_rate: 3.0,
            last_update: Utc::now() - chrono::Duration::days(1),
            recent_posts: vec![],
        });

        store.refresh_competitor(
            &id,
            CompetitorSnapshot {
                follower_count: 90,
                post_frequency: 1.0,
                engagement_rate: 9.5,
                recent_posts: vec![],
            },
        );

        let snapshot = store.snapshot();
        let competitor = snapshot.competitor(&id).unwrap();
        assert_eq!(competitor.follower_count, 90);
        assert_eq!(competitor.engagement_rate, 9.5);
    }
}
