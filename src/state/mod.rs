//! 状態管理
//!
//! ストア本体、イミュータブルなスナップショット、変更通知、
//! ライフサイクルを検証する更新操作。

pub mod broadcaster;
pub mod snapshot;
pub mod store;
pub mod transitions;

pub use broadcaster::{StateBroadcaster, StoreChange};
pub use snapshot::{Snapshot, Stored, DEFAULT_CONTENT_TOPICS};
pub use store::{Store, StoreHandle};
