use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::{
    models::{MatchEntity, ScoreEntity, TeamsEntity, UserEntity},
    roster_store::couchdb::error::CouchDaoError,
};

pub const MATCH_PREFIX: &str = "match::";
pub const USER_PREFIX: &str = "user::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: MatchBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBody {
    pub date: String,
    pub time: String,
    pub court: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub starts_at: SystemTime,
    pub players: Vec<UserEntity>,
    #[serde(default)]
    pub waiting_list: Vec<UserEntity>,
    pub created_by: UserEntity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<TeamsEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreEntity>,
    #[serde(default)]
    pub version: u64,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<(MatchEntity, Option<String>)> for CouchMatchDocument {
    fn from((entity, rev): (MatchEntity, Option<String>)) -> Self {
        Self {
            id: match_doc_id(entity.id),
            rev,
            body: MatchBody {
                date: entity.date,
                time: entity.time,
                court: entity.court,
                address: entity.address,
                starts_at: entity.starts_at,
                players: entity.players,
                waiting_list: entity.waiting_list,
                created_by: entity.created_by,
                teams: entity.teams,
                score: entity.score,
                version: entity.version,
                created_at: entity.created_at,
                updated_at: entity.updated_at,
            },
        }
    }
}

impl TryFrom<CouchMatchDocument> for MatchEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchMatchDocument) -> Result<Self, Self::Error> {
        let body = doc.body;
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            date: body.date,
            time: body.time,
            court: body.court,
            address: body.address,
            starts_at: body.starts_at,
            players: body.players,
            waiting_list: body.waiting_list,
            created_by: body.created_by,
            teams: body.teams,
            score: body.score,
            version: body.version,
            created_at: body.created_at,
            updated_at: body.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchUserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub user: UserEntity,
}

impl From<(UserEntity, Option<String>)> for CouchUserDocument {
    fn from((user, rev): (UserEntity, Option<String>)) -> Self {
        Self {
            id: user_doc_id(&user.id),
            rev,
            user,
        }
    }
}

pub fn match_doc_id(id: Uuid) -> String {
    format!("{}{}", MATCH_PREFIX, id)
}

/// User ids come from the identity provider and may contain any character,
/// so they are percent-encoded into the document key.
pub fn user_doc_id(id: &str) -> String {
    format!("{}{}", USER_PREFIX, urlencoding::encode(id))
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}
