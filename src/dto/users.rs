use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::{validate_date, validate_not_blank};

/// Edit of the caller's own profile. Omitted optional fields are cleared.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 80))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    /// Date of birth (`YYYY-MM-DD`).
    #[serde(default)]
    #[validate(custom(function = "validate_date"))]
    pub dob: Option<String>,
}
