use serde::{Deserialize, Serialize};

use super::Patch;

/// 自動化の集計統計（プロセスに一つだけ存在する）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStats {
    pub total_followers: u64,
    /// 週次成長率（%）
    pub weekly_growth: f64,
    pub content_generated: u64,
    pub alumni_contacted: u64,
    pub ad_campaigns_active: u64,
    /// 今週削減できた作業時間
    pub time_saved: u64,
}

impl Default for AutomationStats {
    fn default() -> Self {
        Self {
            total_followers: 15420,
            weekly_growth: 8.5,
            content_generated: 127,
            alumni_contacted: 2340,
            ad_campaigns_active: 5,
            time_saved: 28,
        }
    }
}

/// 統計の部分更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_growth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_generated: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alumni_contacted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_campaigns_active: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_saved: Option<u64>,
}

impl Patch<AutomationStats> for StatsPatch {
    fn apply_to(self, stats: &mut AutomationStats) {
        if let Some(value) = self.total_followers {
            stats.total_followers = value;
        }
        if let Some(value) = self.weekly_growth {
            stats.weekly_growth = value;
        }
        if let Some(value) = self.content_generated {
            stats.content_generated = value;
        }
        if let Some(value) = self.alumni_contacted {
            stats.alumni_contacted = value;
        }
        if let Some(value) = self.ad_campaigns_active {
            stats.ad_campaigns_active = value;
        }
        if let Some(value) = self.time_saved {
            stats.time_saved = value;
        }
    }

    fn is_empty(&self) -> bool {
        self == &StatsPatch::default()
    }
}
