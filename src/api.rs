//! 自動化バックエンドのHTTPクライアント
//!
//! 各操作は `Endpoint` を実装したリクエスト型として定義され、
//! `AutomationClient::execute` で型付きレスポンスに変換される。

pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod transport;

pub mod ads;
pub mod alumni;
pub mod analytics;
pub mod competitors;
pub mod content;
pub mod viral;
pub mod workflows;

pub use client::AutomationClient;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionState};
pub use endpoint::{Ack, Endpoint, HttpMethod, JsonObject};
pub use error::{ApiError, ApiResult, CredentialError, ValidationError};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub use ads::{
    AdCampaignList, CampaignEnvelope, CreateAdCampaign, GenerateHeadlines, Headlines,
    ListAdCampaigns, OptimizeAdCampaign, PauseLowPerformingAds, PausedAds, RemoteAdCampaign,
    RemotePerformance,
};
pub use alumni::{
    AlumniCampaignStats, AlumniList, CampaignHandle, ImportAlumni, ImportSource, ImportedAlumni,
    ListAlumni, RemoteAlumni, StartEngagementCampaign, UpdateAlumniStatus,
};
pub use analytics::{
    DashboardStats, DashboardSummary, DateRange, EngagementAnalytics, GenerateReport,
    GrowthMetrics,
};
pub use competitors::{
    AddCompetitor, CompetitorEnvelope, CompetitorInsights, CompetitorList, ListCompetitors,
    RefreshCompetitor, RemoteCompetitor, StartCompetitorMonitoring,
};
pub use content::{
    GenerateContent, GeneratedContent, ListPosts, PostList, RemotePost, SchedulePost,
    UpdateRemotePost,
};
pub use viral::{
    AmplifyPost, RepurposePost, RepurposedContent, ViralCandidate, ViralCandidateList,
    ViralCandidates,
};
pub use workflows::{
    HealthCheck, HealthStatus, ListWorkflows, StartWorkflow, StopWorkflow, WorkflowControl,
    WorkflowInfo, WorkflowKind, WorkflowList, WorkflowState, WorkflowStatus,
    WorkflowStatusReport,
};
