//! ライフサイクル状態機械
//!
//! 各エンティティのステータスが取りうる遷移を定義します。
//! ストアの `update_*` 自体は検証を行わないため、ステータスを変更する操作は
//! ここで定義された遷移規則を通すこと。

use std::fmt::Debug;

use super::EntityId;

/// 有限状態のステータス
pub trait Lifecycle: Copy + Eq + Debug + 'static {
    /// 初期状態
    const INITIAL: Self;
    /// 全状態
    const ALL: &'static [Self];

    /// 表示・ワイヤ上の名前
    fn name(self) -> &'static str;

    /// `next` への遷移が許可されているか（同一状態への遷移は無操作として許可）
    fn can_transition_to(self, next: Self) -> bool;

    fn is_terminal(self) -> bool;
}

/// ステータス遷移の検証エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("{entity} {id}: transition {from} -> {to} is not allowed")]
    NotAllowed {
        entity: &'static str,
        id: EntityId,
        from: &'static str,
        to: &'static str,
    },

    #[error(
        "{entity} {id}: inconsistent performance counters \
         (impressions {impressions}, clicks {clicks}, conversions {conversions})"
    )]
    InconsistentPerformance {
        entity: &'static str,
        id: EntityId,
        impressions: u64,
        clicks: u64,
        conversions: u64,
    },
}

/// 遷移を検証する
pub fn check_transition<S: Lifecycle>(
    entity: &'static str,
    id: &EntityId,
    from: S,
    to: S,
) -> Result<(), TransitionError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TransitionError::NotAllowed {
            entity,
            id: id.clone(),
            from: from.name(),
            to: to.name(),
        })
    }
}
