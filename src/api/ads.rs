//! 広告キャンペーン

use serde::{Deserialize, Serialize};

use super::client::AutomationClient;
use super::endpoint::{
    json_body, require_amount, require_items, require_text, segment, Endpoint, HttpMethod,
};
use super::error::{ApiResult, ValidationError};
use crate::models::{CampaignStatus, NewAdCampaign, Performance};

/// バックエンドのパフォーマンス値（CPAを含む場合がある）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemotePerformance {
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub cpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAdCampaign {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub cpa: Option<f64>,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default, alias = "target_audience")]
    pub target_audience: String,
    #[serde(default)]
    pub performance: RemotePerformance,
}

impl RemoteAdCampaign {
    pub fn performance(&self) -> Performance {
        Performance {
            impressions: self.performance.impressions,
            clicks: self.performance.clicks,
            conversions: self.performance.conversions,
        }
    }

    /// トップレベルの値を優先し、なければパフォーマンス内の値を使う
    pub fn cpa(&self) -> f64 {
        self.cpa.or(self.performance.cpa).unwrap_or(0.0)
    }

    /// ストアに取り込める値か検証する
    ///
    /// 金額は有限かつ非負、カウンターは impressions ≥ clicks ≥ conversions。
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_amount("budget", self.budget)?;
        require_amount("cpa", self.cpa())?;
        let performance = self.performance();
        if !performance.is_consistent() {
            return Err(ValidationError::InconsistentCounters {
                impressions: performance.impressions,
                clicks: performance.clicks,
                conversions: performance.conversions,
            });
        }
        Ok(())
    }

    pub fn into_new_campaign(self) -> NewAdCampaign {
        let performance = self.performance();
        let cpa = self.cpa();
        NewAdCampaign {
            name: self.name,
            budget: self.budget,
            cpa,
            status: self.status,
            headlines: self.headlines,
            target_audience: self.target_audience,
            performance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdCampaign {
    pub name: String,
    pub budget: f64,
    pub target_audience: String,
    pub headlines: Vec<String>,
}

/// 作成・最適化されたキャンペーン
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignEnvelope {
    #[serde(default)]
    pub success: bool,
    pub campaign: RemoteAdCampaign,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for CreateAdCampaign {
    type Response = CampaignEnvelope;
    const NAME: &'static str = "ads.campaign.create";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/ads/campaign".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_amount("budget", self.budget)?;
        require_items("headlines", &self.headlines)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeAdCampaign {
    pub id: String,
}

impl Endpoint for OptimizeAdCampaign {
    type Response = CampaignEnvelope;
    const NAME: &'static str = "ads.campaign.optimize";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        format!("/ads/campaign/{}/optimize", segment(&self.id))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListAdCampaigns;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdCampaignList {
    #[serde(default)]
    pub campaigns: Vec<RemoteAdCampaign>,
}

impl Endpoint for ListAdCampaigns {
    type Response = AdCampaignList;
    const NAME: &'static str = "ads.campaign.list";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/ads/campaigns".to_string()
    }
}

/// 実績のある投稿から広告見出しを生成する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHeadlines {
    pub top_performing_posts: Vec<String>,
    pub target_audience: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Headlines {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for GenerateHeadlines {
    type Response = Headlines;
    const NAME: &'static str = "ads.headlines.generate";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/ads/headlines/generate".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("targetAudience", &self.target_audience)
    }
}

/// 成績の悪い広告を一時停止する（閾値はサーバー側）
#[derive(Debug, Clone, Copy, Default)]
pub struct PauseLowPerformingAds;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PausedAds {
    #[serde(default)]
    pub success: bool,
    /// 停止されたキャンペーンのバックエンドID
    #[serde(default, alias = "paused_campaigns", alias = "pausedCampaigns")]
    pub paused: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for PauseLowPerformingAds {
    type Response = PausedAds;
    const NAME: &'static str = "ads.pause_low_performing";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/ads/optimize/pause-low-performing".to_string()
    }
}

impl AutomationClient {
    pub async fn create_ad_campaign(&self, request: &CreateAdCampaign) -> ApiResult<CampaignEnvelope> {
        self.execute(request).await
    }

    pub async fn optimize_ad_campaign(&self, id: &str) -> ApiResult<CampaignEnvelope> {
        self.execute(&OptimizeAdCampaign { id: id.to_string() }).await
    }

    pub async fn list_ad_campaigns(&self) -> ApiResult<AdCampaignList> {
        self.execute(&ListAdCampaigns).await
    }

    pub async fn generate_headlines(&self, request: &GenerateHeadlines) -> ApiResult<Headlines> {
        self.execute(request).await
    }

    pub async fn pause_low_performing_ads(&self) -> ApiResult<PausedAds> {
        self.execute(&PauseLowPerformingAds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateAdCampaign {
        CreateAdCampaign {
            name: "Spring intake".to_string(),
            budget: 1500.0,
            target_audience: "students".to_string(),
            headlines: vec!["Join now".to_string()],
        }
    }

    #[test]
    fn test_remote_campaign_validation() {
        let remote = |cpa: f64, impressions: u64, clicks: u64, conversions: u64| {
            serde_json::from_value::<RemoteAdCampaign>(serde_json::json!({
                "name": "Spring", "budget": 100, "cpa": cpa,
                "performance": {"impressions": impressions, "clicks": clicks,
                                "conversions": conversions}
            }))
            .unwrap()
        };

        assert!(remote(12.0, 100, 10, 1).validate().is_ok());
        assert!(matches!(
            remote(-5.0, 100, 10, 1).validate(),
            Err(ValidationError::InvalidAmount { field: "cpa", .. })
        ));
        assert_eq!(
            remote(12.0, 1, 50, 99).validate(),
            Err(ValidationError::InconsistentCounters {
                impressions: 1,
                clicks: 50,
                conversions: 99,
            })
        );
    }

    #[test]
    fn test_create_validation() {
        assert!(create_request().validate().is_ok());

        let mut negative = create_request();
        negative.budget = -1.0;
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidAmount { field: "budget", .. })
        ));

        let mut nan = create_request();
        nan.budget = f64::NAN;
        assert!(nan.validate().is_err());

        let mut no_headlines = create_request();
        no_headlines.headlines.clear();
        assert_eq!(
            no_headlines.validate(),
            Err(ValidationError::NoItems { field: "headlines" })
        );
    }

    #[test]
    fn test_campaign_envelope_decodes_backend_shape() {
        let json = r#"{
            "success": true,
            "campaign": {
                "id": "campaign_1",
                "name": "Spring intake",
                "budget": 1500,
                "target_audience": "students",
                "headlines": ["Join now"],
                "status": "active",
                "created_at": "2024-03-01T10:00:00",
                "performance": {"impressions": 1000, "clicks": 40, "conversions": 4, "cpa": 12.5}
            },
            "message": "Ad campaign created successfully"
        }"#;
        let envelope: CampaignEnvelope = serde_json::from_str(json).unwrap();
        let campaign = envelope.campaign.into_new_campaign();

        assert_eq!(campaign.target_audience, "students");
        assert_eq!(campaign.budget, 1500.0);
        assert_eq!(campaign.cpa, 12.5);
        assert_eq!(campaign.performance.clicks, 40);
        assert_eq!(campaign.status, CampaignStatus::Active);
    }

    #[test]
    fn test_optimize_path() {
        let request = OptimizeAdCampaign {
            id: "campaign_1".to_string(),
        };
        assert_eq!(request.path(), "/ads/campaign/campaign_1/optimize");
        assert_eq!(request.body().unwrap(), None);
    }
}
