//! Identity gateway hand-over and session payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::{common::UserSummary, validation::validate_not_blank};

/// Provider id of email/password accounts, the only ones subject to email verification.
pub const PASSWORD_PROVIDER: &str = "password";

/// Verified claims forwarded by the identity gateway after sign-in.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SessionClaims {
    /// Stable user id assigned by the identity provider.
    #[validate(custom(function = "validate_not_blank"))]
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Sign-in method, e.g. `password` or `google.com`.
    pub provider: String,
}

impl SessionClaims {
    /// Password accounts must verify their email; federated ones are trusted.
    pub fn may_enter(&self) -> bool {
        self.email_verified || self.provider != PASSWORD_PROVIDER
    }
}

/// Newly opened session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: UserSummary,
}

/// Session bound to the presented bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentSessionResponse {
    pub user: UserSummary,
}
