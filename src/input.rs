//! Decoding of level snapshots handed over by the structure editor.
//!
//! The wire shape is a JSON array of camelCase level records. A member names
//! its subject through either `userId` or `teamId`; anything else is rejected
//! here so the tree builder only ever sees well-formed members.

use serde::Deserialize;
use thiserror::Error;

use crate::model::{CommissionKind, Level, Member, SubjectRef};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid level snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid level snapshot: {0}")]
    Json5(#[from] json5::Error),
    #[error("member `{member}` has neither userId nor teamId")]
    MissingSubject { member: String },
    #[error("member `{member}` has both userId and teamId")]
    AmbiguousSubject { member: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRecord {
    id: String,
    display_name: String,
    user_id: Option<String>,
    team_id: Option<String>,
    #[serde(default)]
    manager_member_id: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelRecord {
    id: String,
    name: String,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    commission_kind: CommissionKind,
    #[serde(default)]
    is_bonus: bool,
    #[serde(default)]
    members: Vec<MemberRecord>,
}

pub fn parse_levels(input: &str) -> Result<Vec<Level>, InputError> {
    let records: Vec<LevelRecord> = serde_json::from_str(input)?;
    into_levels(records)
}

pub fn parse_levels_json5(input: &str) -> Result<Vec<Level>, InputError> {
    let records: Vec<LevelRecord> = json5::from_str(input)?;
    into_levels(records)
}

fn into_levels(records: Vec<LevelRecord>) -> Result<Vec<Level>, InputError> {
    records
        .into_iter()
        .map(|record| {
            let members = record
                .members
                .into_iter()
                .map(into_member)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Level {
                id: record.id,
                name: record.name,
                priority: record.priority,
                commission_kind: record.commission_kind,
                is_bonus: record.is_bonus,
                members,
            })
        })
        .collect()
}

fn into_member(record: MemberRecord) -> Result<Member, InputError> {
    let subject = match (record.user_id, record.team_id) {
        (Some(user), None) => SubjectRef::User(user),
        (None, Some(team)) => SubjectRef::Team(team),
        (None, None) => return Err(InputError::MissingSubject { member: record.id }),
        (Some(_), Some(_)) => return Err(InputError::AmbiguousSubject { member: record.id }),
    };
    // Editors send "" when the manager picker is cleared.
    let manager_member_id = record.manager_member_id.filter(|id| !id.is_empty());
    Ok(Member {
        id: record.id,
        display_name: record.display_name,
        subject,
        manager_member_id,
        avatar: record.avatar,
    })
}
