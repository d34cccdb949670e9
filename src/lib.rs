pub mod api;
pub mod apply;
pub mod config;
pub mod logging;
pub mod models;
pub mod state;

// Re-export the main types for convenience
pub use api::{ApiError, ApiResult, AutomationClient, Endpoint, SessionState, ValidationError};
pub use apply::ResultApplier;
pub use config::{AppConfig, ConfigManager};
pub use models::{EntityId, Lifecycle, TransitionError};
pub use state::{Snapshot, Store, StoreChange, StoreHandle};
