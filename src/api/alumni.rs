//! 卒業生の取り込みとエンゲージメントキャンペーン

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::AutomationClient;
use super::endpoint::{
    json_body, parse_timestamp, require_items, require_text, segment, Ack, Endpoint, HttpMethod,
    JsonObject,
};
use super::error::{ApiResult, ValidationError};
use crate::models::{AlumniStatus, Lifecycle, NewAlumniContact, OutreachKind};

/// バックエンドが返す卒業生レコード
///
/// バックエンドは `connection_sent` のような独自ステータスや
/// タイムゾーンなしの日時を返すため、ここで吸収してから取り込む。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAlumni {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub university: String,
    #[serde(alias = "graduation_year")]
    pub graduation_year: u16,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "last_contact")]
    pub last_contact: Option<String>,
    #[serde(default, alias = "connection_sent")]
    pub connection_sent: bool,
    #[serde(default, alias = "follow_page_pitch_sent")]
    pub follow_page_pitch_sent: bool,
    #[serde(default, alias = "story_submission_sent")]
    pub story_submission_sent: bool,
}

impl RemoteAlumni {
    pub fn into_new_contact(self) -> NewAlumniContact {
        let mut contact = NewAlumniContact::pending(self.name, self.university, self.graduation_year);
        contact.last_contact = self.last_contact.as_deref().and_then(parse_timestamp);
        contact.connection_sent = self.connection_sent;
        contact.follow_page_pitch_sent = self.follow_page_pitch_sent;
        contact.story_submission_sent = self.story_submission_sent;

        if let Some(status) = self.status.as_deref() {
            match status {
                "connection_sent" => contact.connection_sent = true,
                "follow_sent" => contact.follow_page_pitch_sent = true,
                "story_sent" => contact.story_submission_sent = true,
                other => match AlumniStatus::ALL.iter().find(|s| s.name() == other) {
                    Some(known) => contact.status = *known,
                    None => debug!("Unknown alumni status '{}', keeping pending", other),
                },
            }
        }
        contact
    }
}

/// 取り込み元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Csv,
    Sheets,
    Crm,
}

impl std::str::FromStr for ImportSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ImportSource::Csv),
            "sheets" => Ok(ImportSource::Sheets),
            "crm" => Ok(ImportSource::Crm),
            other => Err(format!("unknown import source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAlumni {
    pub source: ImportSource,
    #[serde(default)]
    pub source_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportedAlumni {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub imported: usize,
    /// 取り込まれたレコード（バックエンドが返す場合のみ）
    #[serde(default)]
    pub alumni: Vec<RemoteAlumni>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for ImportAlumni {
    type Response = ImportedAlumni;
    const NAME: &'static str = "alumni.import";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/alumni/import".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }
}

/// エンゲージメントキャンペーンの開始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartEngagementCampaign {
    pub alumni_ids: Vec<String>,
    pub campaign_type: OutreachKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignHandle {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "campaign_id")]
    pub campaign_id: Option<String>,
    #[serde(default, alias = "campaign_type")]
    pub campaign_type: Option<OutreachKind>,
    #[serde(default, alias = "contacts_processed")]
    pub contacts_processed: usize,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for StartEngagementCampaign {
    type Response = CampaignHandle;
    const NAME: &'static str = "alumni.campaign.start";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        "/alumni/campaign/start".to_string()
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_items("alumniIds", &self.alumni_ids)?;
        self.alumni_ids
            .iter()
            .try_for_each(|id| require_text("alumniIds", id))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListAlumni;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlumniList {
    #[serde(default)]
    pub alumni: Vec<RemoteAlumni>,
}

impl Endpoint for ListAlumni {
    type Response = AlumniList;
    const NAME: &'static str = "alumni.list";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/alumni".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateAlumniStatus {
    #[serde(skip)]
    pub id: String,
    pub status: AlumniStatus,
}

impl Endpoint for UpdateAlumniStatus {
    type Response = Ack;
    const NAME: &'static str = "alumni.status.update";

    fn method(&self) -> HttpMethod {
        HttpMethod::PUT
    }

    fn path(&self) -> String {
        format!("/alumni/{}/status", segment(&self.id))
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlumniCampaignStats;

impl Endpoint for AlumniCampaignStats {
    type Response = JsonObject;
    const NAME: &'static str = "alumni.stats";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/alumni/stats".to_string()
    }
}

impl AutomationClient {
    pub async fn import_alumni(
        &self,
        source: ImportSource,
        source_data: serde_json::Value,
    ) -> ApiResult<ImportedAlumni> {
        self.execute(&ImportAlumni {
            source,
            source_data,
        })
        .await
    }

    pub async fn start_engagement_campaign(
        &self,
        alumni_ids: Vec<String>,
        campaign_type: OutreachKind,
    ) -> ApiResult<CampaignHandle> {
        self.execute(&StartEngagementCampaign {
            alumni_ids,
            campaign_type,
        })
        .await
    }

    pub async fn list_alumni(&self) -> ApiResult<AlumniList> {
        self.execute(&ListAlumni).await
    }

    pub async fn update_alumni_status(&self, id: &str, status: AlumniStatus) -> ApiResult<Ack> {
        self.execute(&UpdateAlumniStatus {
            id: id.to_string(),
            status,
        })
        .await
    }

    pub async fn alumni_campaign_stats(&self) -> ApiResult<JsonObject> {
        self.execute(&AlumniCampaignStats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_alumni_maps_backend_statuses() {
        let json = r#"{"alumni": [
            {"id": "alumni_1", "name": "John Smith", "university": "MIT",
             "graduation_year": 2020, "status": "pending", "imported_at": "2024-03-01T10:00:00"},
            {"id": "alumni_2", "name": "Sarah Johnson", "university": "Stanford",
             "graduation_year": 2019, "status": "connection_sent"},
            {"id": "alumni_3", "name": "Mike Chen", "university": "Harvard",
             "graduationYear": 2021, "status": "following", "lastContact": "2024-03-02T08:30:00Z"}
        ]}"#;
        let list: AlumniList = serde_json::from_str(json).unwrap();
        let contacts: Vec<NewAlumniContact> = list
            .alumni
            .into_iter()
            .map(RemoteAlumni::into_new_contact)
            .collect();

        assert_eq!(contacts[0].status, AlumniStatus::Pending);
        assert!(!contacts[0].connection_sent);

        assert_eq!(contacts[1].status, AlumniStatus::Pending);
        assert!(contacts[1].connection_sent);

        assert_eq!(contacts[2].status, AlumniStatus::Following);
        assert_eq!(contacts[2].graduation_year, 2021);
        assert!(contacts[2].last_contact.is_some());
    }

    #[test]
    fn test_campaign_validation_and_body() {
        let empty = StartEngagementCampaign {
            alumni_ids: vec![],
            campaign_type: OutreachKind::Connection,
        };
        assert_eq!(
            empty.validate(),
            Err(ValidationError::NoItems { field: "alumniIds" })
        );

        let request = StartEngagementCampaign {
            alumni_ids: vec!["a1".to_string()],
            campaign_type: OutreachKind::Story,
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            request.body().unwrap().unwrap(),
            serde_json::json!({"alumniIds": ["a1"], "campaignType": "story"})
        );
    }

    #[test]
    fn test_campaign_handle_accepts_snake_case() {
        let handle: CampaignHandle = serde_json::from_str(
            r#"{"success": true, "campaign_type": "follow", "contacts_processed": 2, "message": "ok"}"#,
        )
        .unwrap();
        assert_eq!(handle.campaign_type, Some(OutreachKind::Follow));
        assert_eq!(handle.contacts_processed, 2);
    }

    #[test]
    fn test_status_update_path_and_body() {
        let request = UpdateAlumniStatus {
            id: "alumni 7".to_string(),
            status: AlumniStatus::Engaged,
        };
        assert_eq!(request.path(), "/alumni/alumni%207/status");
        assert_eq!(
            request.body().unwrap().unwrap(),
            serde_json::json!({"status": "engaged"})
        );
    }

    #[test]
    fn test_import_source_from_str() {
        assert_eq!("CSV".parse::<ImportSource>(), Ok(ImportSource::Csv));
        assert!("ldap".parse::<ImportSource>().is_err());
    }
}
