//! 自動化ワークフローの制御とヘルスチェック

use serde::{Deserialize, Serialize};

use super::client::AutomationClient;
use super::endpoint::{require_text, segment, Endpoint, HttpMethod, JsonObject};
use super::error::{ApiResult, ValidationError};

/// 既知のワークフロー
///
/// 未知のIDも `Other` としてそのまま扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    ContentCreation,
    AlumniEngagement,
    AdOptimization,
    CompetitorTracking,
    ViralAmplification,
    Other(String),
}

impl WorkflowKind {
    pub const KNOWN: [WorkflowKind; 5] = [
        WorkflowKind::ContentCreation,
        WorkflowKind::AlumniEngagement,
        WorkflowKind::AdOptimization,
        WorkflowKind::CompetitorTracking,
        WorkflowKind::ViralAmplification,
    ];

    pub fn id(&self) -> &str {
        match self {
            WorkflowKind::ContentCreation => "content_creation",
            WorkflowKind::AlumniEngagement => "alumni_engagement",
            WorkflowKind::AdOptimization => "ad_optimization",
            WorkflowKind::CompetitorTracking => "competitor_tracking",
            WorkflowKind::ViralAmplification => "viral_amplification",
            WorkflowKind::Other(id) => id,
        }
    }
}

impl From<&str> for WorkflowKind {
    fn from(id: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|kind| kind.id() == id)
            .cloned()
            .unwrap_or_else(|| WorkflowKind::Other(id.to_string()))
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// バックエンドが報告するワークフローの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    Active,
    Inactive,
    Started,
    Stopped,
    Running,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: WorkflowState,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "next_run")]
    pub next_run: Option<String>,
}

impl WorkflowInfo {
    pub fn kind(&self) -> WorkflowKind {
        WorkflowKind::from(self.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListWorkflows;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowList {
    #[serde(default)]
    pub workflows: Vec<WorkflowInfo>,
}

impl Endpoint for ListWorkflows {
    type Response = WorkflowList;
    const NAME: &'static str = "workflows.list";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/workflows".to_string()
    }
}

/// 開始・停止の結果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowControl {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "workflow_id")]
    pub workflow_id: String,
    #[serde(default)]
    pub status: WorkflowState,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartWorkflow {
    pub workflow: WorkflowKind,
    /// ワークフロー設定（JSONオブジェクト）
    pub configuration: serde_json::Value,
}

impl Endpoint for StartWorkflow {
    type Response = WorkflowControl;
    const NAME: &'static str = "workflows.start";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        format!("/workflows/{}/start", segment(self.workflow.id()))
    }

    fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        Ok(Some(self.configuration.clone()))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("workflowId", self.workflow.id())?;
        if !self.configuration.is_object() {
            return Err(ValidationError::NotAnObject {
                field: "configuration",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopWorkflow {
    pub workflow: WorkflowKind,
}

impl Endpoint for StopWorkflow {
    type Response = WorkflowControl;
    const NAME: &'static str = "workflows.stop";

    fn method(&self) -> HttpMethod {
        HttpMethod::POST
    }

    fn path(&self) -> String {
        format!("/workflows/{}/stop", segment(self.workflow.id()))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("workflowId", self.workflow.id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStatus {
    pub workflow: WorkflowKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusReport {
    #[serde(default, alias = "workflow_id")]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub status: WorkflowState,
    #[serde(flatten)]
    pub details: JsonObject,
}

impl Endpoint for WorkflowStatus {
    type Response = WorkflowStatusReport;
    const NAME: &'static str = "workflows.status";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        format!("/workflows/{}/status", segment(self.workflow.id()))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("workflowId", self.workflow.id())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthCheck;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "ok")
    }
}

impl Endpoint for HealthCheck {
    type Response = HealthStatus;
    const NAME: &'static str = "health";

    fn method(&self) -> HttpMethod {
        HttpMethod::GET
    }

    fn path(&self) -> String {
        "/health".to_string()
    }
}

impl AutomationClient {
    pub async fn list_workflows(&self) -> ApiResult<WorkflowList> {
        self.execute(&ListWorkflows).await
    }

    pub async fn start_workflow(
        &self,
        workflow: WorkflowKind,
        configuration: serde_json::Value,
    ) -> ApiResult<WorkflowControl> {
        self.execute(&StartWorkflow {
            workflow,
            configuration,
        })
        .await
    }

    pub async fn stop_workflow(&self, workflow: WorkflowKind) -> ApiResult<WorkflowControl> {
        self.execute(&StopWorkflow { workflow }).await
    }

    pub async fn workflow_status(&self, workflow: WorkflowKind) -> ApiResult<WorkflowStatusReport> {
        self.execute(&WorkflowStatus { workflow }).await
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.execute(&HealthCheck).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_kind_round_trips_known_ids() {
        for kind in WorkflowKind::KNOWN.iter() {
            assert_eq!(&WorkflowKind::from(kind.id()), kind);
        }
        assert_eq!(
            WorkflowKind::from("nightly_digest"),
            WorkflowKind::Other("nightly_digest".to_string())
        );
    }

    #[test]
    fn test_workflow_list_decodes_backend_shape() {
        let json = r#"{"workflows": [
            {"id": "content_creation", "name": "Content Creation", "status": "active",
             "description": "Generate posts", "next_run": "2024-03-01T12:00:00"},
            {"id": "viral_amplification", "name": "Viral Amplification", "status": "inactive",
             "description": "Amplify posts", "next_run": null},
            {"id": "custom", "status": "paused-for-review"}
        ]}"#;
        let list: WorkflowList = serde_json::from_str(json).unwrap();
        assert_eq!(list.workflows[0].kind(), WorkflowKind::ContentCreation);
        assert_eq!(list.workflows[1].status, WorkflowState::Inactive);
        assert_eq!(list.workflows[1].next_run, None);
        assert_eq!(list.workflows[2].status, WorkflowState::Unknown);
    }

    #[test]
    fn test_start_requires_object_configuration() {
        let request = StartWorkflow {
            workflow: WorkflowKind::ContentCreation,
            configuration: serde_json::json!(["not", "an", "object"]),
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::NotAnObject {
                field: "configuration"
            })
        );

        let request = StartWorkflow {
            workflow: WorkflowKind::Other("a b".to_string()),
            configuration: serde_json::json!({"postsPerWeek": 15}),
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.path(), "/workflows/a%20b/start");
    }

    #[test]
    fn test_empty_workflow_id_is_rejected() {
        let request = StopWorkflow {
            workflow: WorkflowKind::Other(String::new()),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_health() {
        let health: HealthStatus = serde_json::from_str(
            r#"{"status": "healthy", "timestamp": "2024-03-01T10:00:00", "version": "1.0.0"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.version.as_deref(), Some("1.0.0"));
    }
}
