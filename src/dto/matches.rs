//! Request and response bodies of the `/matches` routes.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{MatchEntity, ScoreEntity, TeamsEntity},
    dto::{
        common::UserSummary,
        format_system_time,
        validation::{validate_clock_time, validate_date, validate_not_blank},
    },
    state::{
        roster::{self, RosterRole},
        schedule::MatchView,
        score::ScoreCell,
    },
};

/// Payload used to schedule a new match. The caller becomes organizer and
/// first player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatchRequest {
    /// Calendar date (`YYYY-MM-DD`).
    #[validate(custom(function = "validate_date"))]
    pub date: String,
    /// Local clock time (`HH:MM`).
    #[validate(custom(function = "validate_clock_time"))]
    pub time: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub court: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Organizer edit of the schedule fields. Roster and score are untouched.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateMatchRequest {
    #[validate(custom(function = "validate_date"))]
    pub date: String,
    #[validate(custom(function = "validate_clock_time"))]
    pub time: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub court: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Submitted score sheet. Cells may be numbers, numeric strings or blanks.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreRequest {
    #[schema(value_type = Vec<serde_json::Value>)]
    pub team1: Vec<ScoreCell>,
    #[schema(value_type = Vec<serde_json::Value>)]
    pub team2: Vec<ScoreCell>,
}

/// Which matches `GET /matches` returns.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchViewParam {
    /// Every match.
    #[default]
    All,
    /// Matches the caller plays in, waits for or organised.
    Mine,
}

impl From<MatchViewParam> for MatchView {
    fn from(value: MatchViewParam) -> Self {
        match value {
            MatchViewParam::All => MatchView::All,
            MatchViewParam::Mine => MatchView::Mine,
        }
    }
}

/// Query string of `GET /matches`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchListQuery {
    /// `all` (default) or `mine`.
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub view: MatchViewParam,
    /// Include matches whose start lies in the past.
    #[serde(default)]
    pub include_past: bool,
}

/// Wire form of a roster role.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RosterRoleDto {
    /// Holds a player slot.
    Player,
    /// On the waiting list.
    Waiting,
    /// Not on the roster.
    #[serde(rename = "none")]
    Outsider,
}

impl From<RosterRole> for RosterRoleDto {
    fn from(role: RosterRole) -> Self {
        match role {
            RosterRole::Player => RosterRoleDto::Player,
            RosterRole::Waiting => RosterRoleDto::Waiting,
            RosterRole::Outsider => RosterRoleDto::Outsider,
        }
    }
}

/// How the requesting user relates to the match.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ViewerStatus {
    /// Roster membership of the caller.
    pub role: RosterRoleDto,
    /// Whether the caller created the match.
    pub is_organizer: bool,
}

/// Two fixed pairs, present once the roster is full.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TeamsSummary {
    pub team_a: Vec<UserSummary>,
    pub team_b: Vec<UserSummary>,
}

impl From<TeamsEntity> for TeamsSummary {
    fn from(teams: TeamsEntity) -> Self {
        Self {
            team_a: teams.team_a.into_iter().map(Into::into).collect(),
            team_b: teams.team_b.into_iter().map(Into::into).collect(),
        }
    }
}

/// Games per set, `team1` being the first pair of the roster.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ScoreSummary {
    pub team1: Vec<u32>,
    pub team2: Vec<u32>,
}

impl From<ScoreEntity> for ScoreSummary {
    fn from(score: ScoreEntity) -> Self {
        Self {
            team1: score.team1,
            team2: score.team2,
        }
    }
}

/// Full projection of a match.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct MatchSummary {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub court: String,
    pub address: Option<String>,
    /// RFC 3339 instant of `date` + `time`.
    pub starts_at: String,
    pub players: Vec<UserSummary>,
    pub waiting_list: Vec<UserSummary>,
    pub created_by: UserSummary,
    pub teams: Option<TeamsSummary>,
    pub score: Option<ScoreSummary>,
    pub open_slots: usize,
    pub is_full: bool,
    /// Present on responses addressed to an authenticated user.
    pub viewer: Option<ViewerStatus>,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl MatchSummary {
    /// Project a match for a specific user.
    pub fn for_viewer(entity: MatchEntity, viewer_id: &str) -> Self {
        let viewer = ViewerStatus {
            role: roster::role_of(&entity, viewer_id).into(),
            is_organizer: entity.is_organizer(viewer_id),
        };
        let mut summary = Self::from(entity);
        summary.viewer = Some(viewer);
        summary
    }
}

impl From<MatchEntity> for MatchSummary {
    fn from(entity: MatchEntity) -> Self {
        let open_slots = roster::open_slots(&entity);
        let is_full = roster::is_full(&entity);
        Self {
            id: entity.id,
            date: entity.date,
            time: entity.time,
            court: entity.court,
            address: entity.address,
            starts_at: format_system_time(entity.starts_at),
            players: entity.players.into_iter().map(Into::into).collect(),
            waiting_list: entity.waiting_list.into_iter().map(Into::into).collect(),
            created_by: entity.created_by.into(),
            teams: entity.teams.map(Into::into),
            score: entity.score.map(Into::into),
            open_slots,
            is_full,
            viewer: None,
            version: entity.version,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Result of a score submission. A rejected sheet leaves the match as is.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreUpdateResponse {
    pub applied: bool,
    #[serde(rename = "match")]
    pub current: MatchSummary,
}

/// Count of matches removed by an organizer-triggered cleanup.
#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use validator::Validate;

    use super::*;

    #[test]
    fn create_request_checks_schedule_fields() {
        let ok: CreateMatchRequest = serde_json::from_value(json!({
            "date": "2026-10-24",
            "time": "18:30",
            "court": "Club Central"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: CreateMatchRequest = serde_json::from_value(json!({
            "date": "24-10-2026",
            "time": "6pm",
            "court": " "
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("date"));
        assert!(fields.contains_key("time"));
        assert!(fields.contains_key("court"));
    }

    #[test]
    fn score_request_accepts_loose_cells() {
        let request: ScoreRequest = serde_json::from_value(json!({
            "team1": [6, "", "4"],
            "team2": [3, null, 6]
        }))
        .unwrap();
        assert_eq!(
            request.team1,
            vec![ScoreCell::Games(6), ScoreCell::Blank, ScoreCell::Games(4)]
        );
        assert_eq!(request.team2[1], ScoreCell::Blank);
    }

    #[test]
    fn list_query_defaults_to_upcoming_for_everyone() {
        let query: MatchListQuery = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(query.view, MatchViewParam::All));
        assert!(!query.include_past);
    }
}
