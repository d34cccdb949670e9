use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Lifecycle, Patch};

/// 金額として解釈できる値か（有限かつ非負）
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// 広告キャンペーンのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl Lifecycle for CampaignStatus {
    const INITIAL: Self = CampaignStatus::Active;
    const ALL: &'static [Self] = &[
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Completed,
    ];

    fn name(self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }

    fn can_transition_to(self, next: Self) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Active, Active)
                | (Paused, Paused)
                | (Completed, Completed)
                | (Active, Paused)
                | (Paused, Active)
                | (Active, Completed)
                | (Paused, Completed)
        )
    }

    fn is_terminal(self) -> bool {
        self == CampaignStatus::Completed
    }
}

/// 広告のパフォーマンスカウンター
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Performance {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

impl Performance {
    /// impressions ≥ clicks ≥ conversions を満たすか
    pub fn is_consistent(&self) -> bool {
        self.impressions >= self.clicks && self.clicks >= self.conversions
    }

    /// クリック率（%）
    pub fn click_through_rate(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64 * 100.0
        }
    }
}

/// 広告キャンペーン
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCampaign {
    pub id: EntityId,
    pub name: String,
    pub budget: f64,
    /// 獲得単価
    #[serde(default)]
    pub cpa: f64,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(alias = "target_audience")]
    pub target_audience: String,
    #[serde(default)]
    pub performance: Performance,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdCampaign {
    pub name: String,
    pub budget: f64,
    #[serde(default)]
    pub cpa: f64,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(alias = "target_audience")]
    pub target_audience: String,
    #[serde(default)]
    pub performance: Performance,
}

/// 広告キャンペーンの部分更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCampaignPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headlines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
}

impl Patch<AdCampaign> for AdCampaignPatch {
    fn apply_to(self, campaign: &mut AdCampaign) {
        if let Some(name) = self.name {
            campaign.name = name;
        }
        if let Some(budget) = self.budget {
            campaign.budget = budget;
        }
        if let Some(cpa) = self.cpa {
            campaign.cpa = cpa;
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
        if let Some(headlines) = self.headlines {
            campaign.headlines = headlines;
        }
        if let Some(audience) = self.target_audience {
            campaign.target_audience = audience;
        }
        if let Some(performance) = self.performance {
            campaign.performance = performance;
        }
    }

    fn is_empty(&self) -> bool {
        self == &AdCampaignPatch::default()
    }
}

impl Entity for AdCampaign {
    type New = NewAdCampaign;
    type Patch = AdCampaignPatch;

    const KIND: &'static str = "ad_campaign";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_new(id: EntityId, new: NewAdCampaign) -> Self {
        Self {
            id,
            name: new.name,
            budget: new.budget,
            cpa: new.cpa,
            status: new.status,
            headlines: new.headlines,
            target_audience: new.target_audience,
            performance: new.performance,
        }
    }
}
