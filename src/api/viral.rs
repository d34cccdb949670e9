//! バイラル投稿の拡散・再利用

use serde::{Deserialize, Serialize};

use super::client::AutomationClient;
use super::endpoint::{json_body, require_text, segment, Ack, Endpoint, HttpMethod};
use super::error::{ApiResult, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViralCandidate {
    #[serde(alias = "post_id")]
    pub post_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub engagement: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViralCandidates;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViralCandidateList {
    #[serde(default)]
    pub candidates: Vec<ViralCandidate>,
}

impl Endpoint for ViralCandidates {
    type Response = ViralCandidateList;
    const NAME: &'static str = "viral.candidates";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/viral/candidates".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplifyPost {
    #[serde(skip)]
    pub post_id: String,
    /// 拡散方法（例: "employee_share"）
    #[serde(rename = "type")]
    pub kind: String,
}

impl Endpoint for AmplifyPost {
    type Response = Ack;
    const NAME: &'static str = "viral.amplify";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        format!("/viral/amplify/{}", segment(&self.post_id))
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("postId", &self.post_id)?;
        require_text("type", &self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepurposePost {
    #[serde(skip)]
    pub post_id: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepurposedContent {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Endpoint for RepurposePost {
    type Response = RepurposedContent;
    const NAME: &'static str = "viral.repurpose";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        format!("/viral/repurpose/{}", segment(&self.post_id))
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        json_body(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("postId", &self.post_id)?;
        require_text("format", &self.format)
    }
}

impl AutomationClient {
    pub async fn viral_candidates(&self) -> ApiResult<ViralCandidateList> {
        self.execute(&ViralCandidates).await
    }

    pub async fn amplify_post(&self, post_id: &str, kind: &str) -> ApiResult<Ack> {
        self.execute(&AmplifyPost {
            post_id: post_id.to_string(),
            kind: kind.to_string(),
        })
        .await
    }

    pub async fn repurpose_post(&self, post_id: &str, format: &str) -> ApiResult<RepurposedContent> {
        self.execute(&RepurposePost {
            post_id: post_id.to_string(),
            format: format.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplify_body_uses_type_key() {
        let request = AmplifyPost {
            post_id: "post_1".to_string(),
            kind: "employee_share".to_string(),
        };
        assert_eq!(request.path(), "/viral/amplify/post_1");
        assert_eq!(
            request.body().unwrap().unwrap(),
            serde_json::json!({"type": "employee_share"})
        );
    }

    #[test]
    fn test_empty_kind_and_format_are_rejected() {
        let amplify = AmplifyPost {
            post_id: "post_1".to_string(),
            kind: String::new(),
        };
        assert_eq!(amplify.validate(), Err(ValidationError::Empty { field: "type" }));

        let repurpose = RepurposePost {
            post_id: "post_1".to_string(),
            format: " ".to_string(),
        };
        assert_eq!(
            repurpose.validate(),
            Err(ValidationError::Empty { field: "format" })
        );
    }

    #[test]
    fn test_candidates_accept_snake_case_ids() {
        let list: ViralCandidateList = serde_json::from_str(
            r#"{"candidates": [{"post_id": "post_3", "engagement": 640}]}"#,
        )
        .unwrap();
        assert_eq!(list.candidates[0].post_id, "post_3");
        assert_eq!(list.candidates[0].engagement, 640);
    }
}
