use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{MatchEntity, ScoreEntity, TeamsEntity, UserEntity};

/// Match document as laid out in the `matches` collection.
///
/// The primary key is the hyphenated UUID string so documents stay readable
/// from the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    date: String,
    time: String,
    court: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    starts_at: DateTime,
    players: Vec<UserEntity>,
    #[serde(default)]
    waiting_list: Vec<UserEntity>,
    created_by: UserEntity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    teams: Option<TeamsEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<ScoreEntity>,
    #[serde(default)]
    version: i64,
    created_at: DateTime,
    updated_at: DateTime,
}

impl MongoMatchDocument {
    pub fn raw_id(&self) -> &str {
        &self.id
    }
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            date: value.date,
            time: value.time,
            court: value.court,
            address: value.address,
            starts_at: DateTime::from_system_time(value.starts_at),
            players: value.players,
            waiting_list: value.waiting_list,
            created_by: value.created_by,
            teams: value.teams,
            score: value.score,
            version: value.version as i64,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = uuid::Error;

    fn try_from(value: MongoMatchDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            date: value.date,
            time: value.time,
            court: value.court,
            address: value.address,
            starts_at: value.starts_at.to_system_time(),
            players: value.players,
            waiting_list: value.waiting_list,
            created_by: value.created_by,
            teams: value.teams,
            score: value.score,
            version: value.version.max(0) as u64,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// User document keyed by the identity provider id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(flatten)]
    body: UserBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserBody {
    name: String,
    avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dob: Option<String>,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            body: UserBody {
                name: value.name,
                avatar: value.avatar,
                email: value.email,
                phone: value.phone,
                dob: value.dob,
            },
        }
    }
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            name: value.body.name,
            avatar: value.body.avatar,
            email: value.body.email,
            phone: value.body.phone,
            dob: value.body.dob,
        }
    }
}

pub fn doc_id(id: impl ToString) -> Document {
    doc! {"_id": id.to_string()}
}

/// Filter matching a document only while it still carries `version`.
pub fn versioned_doc_id(id: Uuid, version: u64) -> Document {
    doc! {"_id": id.to_string(), "version": version as i64}
}
