//! 状態変更のブロードキャスト
//!
//! ストアで実際に反映された変更をサブスクライバーにプッシュ通知する。
//! 画面側はイベントを受けたら最新のスナップショットを読み直す。

use tokio::sync::broadcast;

use crate::models::{AutomationStats, EntityId};

/// バッファサイズ
const CHANNEL_CAPACITY: usize = 256;

/// 状態変更イベント
///
/// 各イベントは必要最小限のデータのみを含む。
#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
    /// エンティティが追加された
    Added {
        kind: &'static str,
        id: EntityId,
        /// 追加後のコレクションの件数
        count: usize,
    },

    /// エンティティが更新された
    Updated { kind: &'static str, id: EntityId },

    /// 統計情報が更新された
    StatsUpdated(AutomationStats),

    /// ローディング状態が変更された
    LoadingChanged(bool),
}

/// 状態変更のブロードキャスター
///
/// 遅いサブスクライバーは古いイベントを取りこぼす（lagged error）。
pub struct StateBroadcaster {
    sender: broadcast::Sender<StoreChange>,
}

impl StateBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// 新しいサブスクリプションを作成
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }

    /// 状態変更をブロードキャスト（受信者がいなければ破棄）
    pub fn broadcast(&self, change: StoreChange) {
        let _ = self.sender.send(change);
    }

    /// 現在のサブスクライバー数を取得
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StateBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
