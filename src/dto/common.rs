use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::dao::models::UserEntity;

/// Public projection of a user, as embedded in rosters and listings.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Date of birth (`YYYY-MM-DD`).
    pub dob: Option<String>,
}

impl From<UserEntity> for UserSummary {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
            email: user.email,
            phone: user.phone,
            dob: user.dob,
        }
    }
}
