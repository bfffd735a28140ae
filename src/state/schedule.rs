//! Match scheduling: parsing the wall-clock fields, deciding which matches
//! are upcoming, and which ones have expired.

use std::time::{Duration, SystemTime};

use thiserror::Error;
use time::{
    Date, PrimitiveDateTime, Time, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use uuid::Uuid;

use crate::dao::models::MatchEntity;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Reasons a schedule field is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("date `{0}` is not a valid YYYY-MM-DD calendar date")]
    InvalidDate(String),
    #[error("time `{0}` is not a valid HH:MM clock time")]
    InvalidTime(String),
}

/// Which matches a listing should contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchView {
    #[default]
    All,
    /// Matches where the viewer plays, waits, or organises.
    Mine,
}

pub fn parse_date(value: &str) -> Result<Date, ScheduleError> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|_| ScheduleError::InvalidDate(value.into()))
}

pub fn parse_time(value: &str) -> Result<Time, ScheduleError> {
    Time::parse(value.trim(), TIME_FORMAT).map_err(|_| ScheduleError::InvalidTime(value.into()))
}

/// Resolve `date` and `time` to an absolute instant in the given offset.
pub fn starts_at(date: &str, time: &str, offset: UtcOffset) -> Result<SystemTime, ScheduleError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Ok(PrimitiveDateTime::new(date, time)
        .assume_offset(offset)
        .into())
}

/// A match expires once its start plus `grace` lies strictly in the past.
pub fn is_expired(entity: &MatchEntity, now: SystemTime, grace: Duration) -> bool {
    entity
        .starts_at
        .checked_add(grace)
        .is_some_and(|deadline| deadline < now)
}

/// Identifiers of expired matches, optionally restricted to one organizer.
pub fn expired_matches(
    matches: &[MatchEntity],
    now: SystemTime,
    grace: Duration,
    organizer: Option<&str>,
) -> Vec<Uuid> {
    matches
        .iter()
        .filter(|entity| organizer.is_none_or(|id| entity.is_organizer(id)))
        .filter(|entity| is_expired(entity, now, grace))
        .map(|entity| entity.id)
        .collect()
}

/// Filter a listing for `viewer` and sort it by start time, soonest first.
pub fn select_matches(
    matches: Vec<MatchEntity>,
    view: MatchView,
    viewer: &str,
    include_past: bool,
    now: SystemTime,
) -> Vec<MatchEntity> {
    let mut selected: Vec<MatchEntity> = matches
        .into_iter()
        .filter(|entity| include_past || entity.starts_at >= now)
        .filter(|entity| match view {
            MatchView::All => true,
            MatchView::Mine => {
                entity.is_player(viewer) || entity.is_waiting(viewer) || entity.is_organizer(viewer)
            }
        })
        .collect();
    selected.sort_by_key(|entity| entity.starts_at);
    selected
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, macros::datetime};

    use super::*;
    use crate::dao::models::UserEntity;

    fn user(id: &str) -> UserEntity {
        UserEntity {
            id: id.into(),
            name: id.into(),
            avatar: String::new(),
            email: None,
            phone: None,
            dob: None,
        }
    }

    fn match_at(organizer: &str, starts_at: SystemTime) -> MatchEntity {
        MatchEntity {
            id: Uuid::new_v4(),
            date: "2026-05-01".into(),
            time: "19:30".into(),
            court: "Court 1".into(),
            address: None,
            starts_at,
            players: vec![user(organizer)],
            waiting_list: Vec::new(),
            created_by: user(organizer),
            teams: None,
            score: None,
            version: 0,
            created_at: starts_at,
            updated_at: starts_at,
        }
    }

    #[test]
    fn schedule_fields_resolve_in_the_configured_offset() {
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        let instant = starts_at("2026-05-01", "19:30", offset).unwrap();
        assert_eq!(
            OffsetDateTime::from(instant),
            datetime!(2026-05-01 17:30 UTC)
        );
    }

    #[test]
    fn malformed_schedule_fields_are_refused() {
        assert_eq!(
            parse_date("2026-02-30"),
            Err(ScheduleError::InvalidDate("2026-02-30".into()))
        );
        assert!(parse_date("01/05/2026").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("7pm").is_err());
        assert!(parse_time("07:05").is_ok());
    }

    #[test]
    fn expiry_waits_for_the_grace_period() {
        let grace = Duration::from_secs(300);
        let start = SystemTime::from(datetime!(2026-05-01 17:30 UTC));
        let entity = match_at("org", start);

        assert!(!is_expired(&entity, start + Duration::from_secs(299), grace));
        assert!(!is_expired(&entity, start + grace, grace));
        assert!(is_expired(&entity, start + Duration::from_secs(301), grace));
    }

    #[test]
    fn expired_selection_can_be_scoped_to_an_organizer() {
        let now = SystemTime::from(datetime!(2026-05-02 00:00 UTC));
        let old = SystemTime::from(datetime!(2026-05-01 10:00 UTC));
        let future = SystemTime::from(datetime!(2026-05-03 10:00 UTC));
        let mine = match_at("me", old);
        let theirs = match_at("them", old);
        let upcoming = match_at("me", future);
        let all = vec![mine.clone(), theirs.clone(), upcoming];
        let grace = Duration::from_secs(300);

        let mut everything = expired_matches(&all, now, grace, None);
        everything.sort();
        let mut expected = vec![mine.id, theirs.id];
        expected.sort();
        assert_eq!(everything, expected);
        assert_eq!(expired_matches(&all, now, grace, Some("me")), vec![mine.id]);
    }

    #[test]
    fn listing_keeps_upcoming_sorted_and_filters_mine() {
        let now = SystemTime::from(datetime!(2026-05-02 00:00 UTC));
        let past = match_at("a", SystemTime::from(datetime!(2026-05-01 10:00 UTC)));
        let later = match_at("a", SystemTime::from(datetime!(2026-05-09 10:00 UTC)));
        let mut sooner = match_at("b", SystemTime::from(datetime!(2026-05-03 10:00 UTC)));
        sooner.waiting_list.push(user("c"));
        let all = vec![past.clone(), later.clone(), sooner.clone()];

        let upcoming = select_matches(all.clone(), MatchView::All, "c", false, now);
        assert_eq!(
            upcoming.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![sooner.id, later.id]
        );

        let mine = select_matches(all.clone(), MatchView::Mine, "c", false, now);
        assert_eq!(mine.iter().map(|m| m.id).collect::<Vec<_>>(), vec![sooner.id]);

        let with_past = select_matches(all, MatchView::Mine, "a", true, now);
        assert_eq!(
            with_past.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![past.id, later.id]
        );
    }
}
