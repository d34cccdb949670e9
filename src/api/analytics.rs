//! 分析・レポート

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::client::AutomationClient;
use super::endpoint::{json_body, require_text, Endpoint, HttpMethod, JsonObject};
use super::error::{ApiResult, ValidationError};
use crate::models::StatsPatch;

/// ダッシュボードの集計値
///
/// バックエンドは snake_case で返す。欠けた値は統計に反映しない。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, alias = "totalFollowers")]
    pub total_followers: Option<u64>,
    #[serde(default, alias = "weeklyGrowth")]
    pub weekly_growth: Option<f64>,
    #[serde(default, alias = "contentGenerated")]
    pub content_generated: Option<u64>,
    #[serde(default, alias = "alumniContacted")]
    pub alumni_contacted: Option<u64>,
    #[serde(default, alias = "adCampaignsActive")]
    pub ad_campaigns_active: Option<u64>,
    #[serde(default, alias = "timeSaved")]
    pub time_saved: Option<u64>,
    #[serde(default, alias = "engagementRate")]
    pub engagement_rate: Option<f64>,
    #[serde(default, alias = "viralPosts")]
    pub viral_posts: Option<u64>,
}

impl DashboardStats {
    pub fn to_patch(&self) -> StatsPatch {
        StatsPatch {
            total_followers: self.total_followers,
            weekly_growth: self.weekly_growth,
            content_generated: self.content_generated,
            alumni_contacted: self.alumni_contacted,
            ad_campaigns_active: self.ad_campaigns_active,
            time_saved: self.time_saved,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardSummary;

impl Endpoint for DashboardSummary {
    type Response = DashboardStats;
    const NAME: &'static str = "analytics.dashboard";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/analytics/dashboard".to_string()
    }
}

/// 成長指標（期間は "7d", "30d" など）
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthMetrics {
    pub range: String,
}

impl Endpoint for GrowthMetrics {
    type Response = JsonObject;
    const NAME: &'static str = "analytics.growth";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/analytics/growth".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("range".to_string(), self.range.clone())]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("range", &self.range)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementAnalytics;

impl Endpoint for EngagementAnalytics {
    type Response = JsonObject;
    const NAME: &'static str = "analytics.engagement";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/analytics/engagement".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReport {
    pub report_type: String,
    pub date_range: DateRange,
}

impl Endpoint for GenerateReport {
    type Response = JsonObject;
    const NAME: &'static str = "analytics.report";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/analytics/report".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("reportType", &self.report_type)?;
        if self.date_range.start > self.date_range.end {
            return Err(ValidationError::InvalidDateRange {
                start: self.date_range.start.to_string(),
                end: self.date_range.end.to_string(),
            });
        }
        Ok(())
    }
}

impl AutomationClient {
    pub async fn dashboard_summary(&self) -> ApiResult<DashboardStats> {
        self.execute(&DashboardSummary).await
    }

    pub async fn growth_metrics(&self, range: &str) -> ApiResult<JsonObject> {
        self.execute(&GrowthMetrics {
            range: range.to_string(),
        })
        .await
    }

    pub async fn engagement_analytics(&self) -> ApiResult<JsonObject> {
        self.execute(&EngagementAnalytics).await
    }

    pub async fn generate_report(
        &self,
        report_type: &str,
        date_range: DateRange,
    ) -> ApiResult<JsonObject> {
        self.execute(&GenerateReport {
            report_type: report_type.to_string(),
            date_range,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dashboard_decodes_backend_shape() {
        let json = r#"{
            "total_followers": 15420,
            "weekly_growth": 8.5,
            "content_generated": 3,
            "alumni_contacted": 3,
            "ad_campaigns_active": 1,
            "time_saved": 28,
            "engagement_rate": 6.3,
            "viral_posts": 3
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        let patch = stats.to_patch();
        assert_eq!(patch.content_generated, Some(3));
        assert_eq!(patch.weekly_growth, Some(8.5));
        assert_eq!(stats.viral_posts, Some(3));
    }

    #[test]
    fn test_partial_dashboard_leaves_other_stats_untouched() {
        let stats: DashboardStats = serde_json::from_str(r#"{"totalFollowers": 99}"#).unwrap();
        let patch = stats.to_patch();
        assert_eq!(patch.total_followers, Some(99));
        assert_eq!(patch.time_saved, None);
    }

    #[test]
    fn test_growth_range_goes_to_query() {
        let request = GrowthMetrics {
            range: "30d".to_string(),
        };
        assert_eq!(request.path(), "/analytics/growth");
        assert_eq!(request.query(), vec![("range".to_string(), "30d".to_string())]);
        assert!(GrowthMetrics {
            range: String::new()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_report_range_order() {
        let inverted = GenerateReport {
            report_type: "weekly".to_string(),
            date_range: DateRange {
                start: date(2024, 3, 10),
                end: date(2024, 3, 1),
            },
        };
        assert!(matches!(
            inverted.validate(),
            Err(ValidationError::InvalidDateRange { .. })
        ));

        let single_day = GenerateReport {
            report_type: "weekly".to_string(),
            date_range: DateRange {
                start: date(2024, 3, 1),
                end: date(2024, 3, 1),
            },
        };
        assert!(single_day.validate().is_ok());
        assert_eq!(
            single_day.body().unwrap().unwrap(),
            serde_json::json!({
                "reportType": "weekly",
                "dateRange": {"start": "2024-03-01", "end": "2024-03-01"}
            })
        );
    }
}
