use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Lifecycle, Patch};

/// 卒業生コンタクトのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlumniStatus {
    #[default]
    Pending,
    Connected,
    Following,
    Engaged,
}

impl AlumniStatus {
    fn rank(self) -> u8 {
        match self {
            AlumniStatus::Pending => 0,
            AlumniStatus::Connected => 1,
            AlumniStatus::Following => 2,
            AlumniStatus::Engaged => 3,
        }
    }
}

impl Lifecycle for AlumniStatus {
    const INITIAL: Self = AlumniStatus::Pending;
    const ALL: &'static [Self] = &[
        AlumniStatus::Pending,
        AlumniStatus::Connected,
        AlumniStatus::Following,
        AlumniStatus::Engaged,
    ];

    fn name(self) -> &'static str {
        match self {
            AlumniStatus::Pending => "pending",
            AlumniStatus::Connected => "connected",
            AlumniStatus::Following => "following",
            AlumniStatus::Engaged => "engaged",
        }
    }

    // 前方へのスキップ（pending -> engaged など）は許可する
    fn can_transition_to(self, next: Self) -> bool {
        next.rank() >= self.rank()
    }

    fn is_terminal(self) -> bool {
        self == AlumniStatus::Engaged
    }
}

/// アウトリーチの種類（キャンペーン種別）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutreachKind {
    /// 接続リクエスト
    Connection,
    /// ページフォローの依頼
    Follow,
    /// ストーリー投稿の依頼
    Story,
}

impl OutreachKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutreachKind::Connection => "connection",
            OutreachKind::Follow => "follow",
            OutreachKind::Story => "story",
        }
    }

    /// このアウトリーチが成功したときに到達するステータス
    pub fn target_status(self) -> AlumniStatus {
        match self {
            OutreachKind::Connection => AlumniStatus::Connected,
            OutreachKind::Follow => AlumniStatus::Following,
            OutreachKind::Story => AlumniStatus::Engaged,
        }
    }
}

impl std::str::FromStr for OutreachKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connection" => Ok(OutreachKind::Connection),
            "follow" => Ok(OutreachKind::Follow),
            "story" => Ok(OutreachKind::Story),
            other => Err(format!("unknown outreach kind: {}", other)),
        }
    }
}

/// 卒業生コンタクト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniContact {
    pub id: EntityId,
    pub name: String,
    pub university: String,
    #[serde(alias = "graduation_year")]
    pub graduation_year: u16,
    #[serde(default)]
    pub status: AlumniStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "last_contact")]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connection_sent: bool,
    #[serde(default)]
    pub follow_page_pitch_sent: bool,
    #[serde(default)]
    pub story_submission_sent: bool,
}

impl AlumniContact {
    pub fn outreach_sent(&self, kind: OutreachKind) -> bool {
        match kind {
            OutreachKind::Connection => self.connection_sent,
            OutreachKind::Follow => self.follow_page_pitch_sent,
            OutreachKind::Story => self.story_submission_sent,
        }
    }

    /// アウトリーチ送信フラグを立てる。既に立っていれば何もしない
    ///
    /// フラグが新たに立った場合は `true` を返す。ステータスは変更しない。
    pub fn mark_outreach(&mut self, kind: OutreachKind, at: DateTime<Utc>) -> bool {
        if self.outreach_sent(kind) {
            return false;
        }
        match kind {
            OutreachKind::Connection => self.connection_sent = true,
            OutreachKind::Follow => self.follow_page_pitch_sent = true,
            OutreachKind::Story => self.story_submission_sent = true,
        }
        self.last_contact = Some(at);
        true
    }
}

/// 識別子を除いた卒業生フィールド
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlumniContact {
    pub name: String,
    pub university: String,
    #[serde(alias = "graduation_year")]
    pub graduation_year: u16,
    #[serde(default)]
    pub status: AlumniStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "last_contact")]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connection_sent: bool,
    #[serde(default)]
    pub follow_page_pitch_sent: bool,
    #[serde(default)]
    pub story_submission_sent: bool,
}

impl NewAlumniContact {
    pub fn pending(
        name: impl Into<String>,
        university: impl Into<String>,
        graduation_year: u16,
    ) -> Self {
        Self {
            name: name.into(),
            university: university.into(),
            graduation_year,
            ..Default::default()
        }
    }
}

/// 卒業生の部分更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AlumniStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_page_pitch_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_submission_sent: Option<bool>,
}

impl Patch<AlumniContact> for AlumniPatch {
    fn apply_to(self, contact: &mut AlumniContact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(university) = self.university {
            contact.university = university;
        }
        if let Some(year) = self.graduation_year {
            contact.graduation_year = year;
        }
        if let Some(status) = self.status {
            contact.status = status;
        }
        if let Some(at) = self.last_contact {
            contact.last_contact = Some(at);
        }
        if let Some(sent) = self.connection_sent {
            contact.connection_sent = sent;
        }
        if let Some(sent) = self.follow_page_pitch_sent {
            contact.follow_page_pitch_sent = sent;
        }
        if let Some(sent) = self.story_submission_sent {
            contact.story_submission_sent = sent;
        }
    }

    fn is_empty(&self) -> bool {
        self == &AlumniPatch::default()
    }
}

impl Entity for AlumniContact {
    type New = NewAlumniContact;
    type Patch = AlumniPatch;

    const KIND: &'static str = "alumni";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_new(id: EntityId, new: NewAlumniContact) -> Self {
        Self {
            id,
            name: new.name,
            university: new.university,
            graduation_year: new.graduation_year,
            status: new.status,
            last_contact: new.last_contact,
            connection_sent: new.connection_sent,
            follow_page_pitch_sent: new.follow_page_pitch_sent,
            story_submission_sent: new.story_submission_sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_outreach_is_idempotent() {
        let mut contact = AlumniContact::from_new(
            EntityId::from("a1"),
            NewAlumniContact::pending("A", "U", 2020),
        );
        let first = Utc::now();
        assert!(contact.mark_outreach(OutreachKind::Follow, first));
        assert!(!contact.mark_outreach(OutreachKind::Follow, first + chrono::Duration::hours(1)));

        assert!(contact.follow_page_pitch_sent);
        assert!(!contact.connection_sent);
        assert_eq!(contact.last_contact, Some(first));
        // フラグはステータスとは独立
        assert_eq!(contact.status, AlumniStatus::Pending);
    }

    #[test]
    fn test_outreach_target_status() {
        assert_eq!(
            OutreachKind::Connection.target_status(),
            AlumniStatus::Connected
        );
        assert_eq!(OutreachKind::Story.target_status(), AlumniStatus::Engaged);
    }

    #[test]
    fn test_backend_contact_without_flags_deserializes() {
        let json = r#"{"name":"John Smith","university":"MIT","graduation_year":2020,"status":"pending"}"#;
        let contact: NewAlumniContact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.graduation_year, 2020);
        assert!(!contact.connection_sent);
        assert!(!contact.story_submission_sent);
    }
}
