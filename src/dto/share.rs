use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShareKind {
    /// Announcement right after creation.
    Created,
    /// Current line-up and waiting list.
    #[default]
    Status,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShareQuery {
    /// `created` or `status` (default).
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub kind: ShareKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShareResponse {
    pub kind: ShareKind,
    pub message: String,
    /// Deep link opening WhatsApp with `message` prefilled.
    pub whatsapp_url: String,
}
