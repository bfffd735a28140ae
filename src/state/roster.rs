//! Roster rules for a single match: who holds the four player slots, how the
//! waiting list feeds them, how teams are split, and how scores are kept.
//!
//! Every operation mutates the match in place and reports whether anything
//! changed, so callers can skip writes for no-ops.

use rand::{Rng, seq::SliceRandom};

use crate::{
    dao::models::{MatchEntity, TeamsEntity, UserEntity},
    state::score::{NormalizedScore, ScoreCell, normalize},
};

/// Number of player slots in a padel match.
pub const MATCH_CAPACITY: usize = 4;

/// How a user relates to a match roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterRole {
    /// Holds one of the four slots.
    Player,
    /// Queued on the waiting list.
    Waiting,
    /// Neither playing nor waiting.
    Outsider,
}

/// What [`set_score`] did with a submitted sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// A new sheet replaced the stored one.
    Stored,
    /// An all-blank sheet removed the stored score.
    Cleared,
    /// The sheet was valid but equal to what is already stored.
    Unchanged,
    /// The sheet failed validation; nothing was written.
    Rejected,
}

impl ScoreOutcome {
    /// Whether the match needs to be written back.
    pub fn changed(self) -> bool {
        matches!(self, ScoreOutcome::Stored | ScoreOutcome::Cleared)
    }
}

/// Role of `user_id` in the match.
pub fn role_of(entity: &MatchEntity, user_id: &str) -> RosterRole {
    if entity.is_player(user_id) {
        RosterRole::Player
    } else if entity.is_waiting(user_id) {
        RosterRole::Waiting
    } else {
        RosterRole::Outsider
    }
}

/// Free player slots, never negative.
pub fn open_slots(entity: &MatchEntity) -> usize {
    MATCH_CAPACITY.saturating_sub(entity.players.len())
}

/// Whether every player slot is taken.
pub fn is_full(entity: &MatchEntity) -> bool {
    entity.players.len() >= MATCH_CAPACITY
}

/// Add `user` to the players. Capacity is not checked here.
///
/// Reaching exactly four players without teams derives them with
/// [`derive_teams`].
pub fn join_match(entity: &mut MatchEntity, user: UserEntity) -> bool {
    if role_of(entity, &user.id) != RosterRole::Outsider {
        return false;
    }

    entity.players.push(user);
    if entity.players.len() == MATCH_CAPACITY && entity.teams.is_none() {
        entity.teams = derive_teams(&entity.players);
    }
    true
}

/// Remove `user_id` from the players, promote the head of the waiting list
/// into a freed slot, and drop teams and score.
pub fn leave_match(entity: &mut MatchEntity, user_id: &str) -> bool {
    let Some(position) = entity.players.iter().position(|user| user.id == user_id) else {
        return false;
    };

    entity.players.remove(position);
    if entity.players.len() < MATCH_CAPACITY && !entity.waiting_list.is_empty() {
        let promoted = entity.waiting_list.remove(0);
        entity.players.push(promoted);
    }

    entity.teams = None;
    entity.score = None;
    true
}

/// Append `user` to the waiting list unless they already play or wait.
pub fn join_waiting_list(entity: &mut MatchEntity, user: UserEntity) -> bool {
    if role_of(entity, &user.id) != RosterRole::Outsider {
        return false;
    }
    entity.waiting_list.push(user);
    true
}

/// Drop `user_id` from the waiting list; the queue order is kept.
pub fn leave_waiting_list(entity: &mut MatchEntity, user_id: &str) -> bool {
    let before = entity.waiting_list.len();
    entity.waiting_list.retain(|user| user.id != user_id);
    entity.waiting_list.len() != before
}

/// Split exactly four players into pairs by ascending id.
///
/// The order carries no meaning beyond being reproducible, so every observer
/// of the same roster computes the same teams.
pub fn derive_teams(players: &[UserEntity]) -> Option<TeamsEntity> {
    if players.len() != MATCH_CAPACITY {
        return None;
    }
    let mut sorted = players.to_vec();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    pair_up(sorted)
}

/// Re-split a full roster into random pairs. The stored score no longer
/// describes these teams, so it is dropped.
pub fn shuffle_teams<R: Rng + ?Sized>(entity: &mut MatchEntity, rng: &mut R) -> bool {
    if entity.players.len() != MATCH_CAPACITY {
        return false;
    }
    let mut shuffled = entity.players.clone();
    shuffled.shuffle(rng);
    entity.teams = pair_up(shuffled);
    entity.score = None;
    true
}

/// Clean the sheet and store, clear or reject it.
///
/// A non-empty score is only accepted on a full roster, since it describes
/// two complete teams.
pub fn set_score(entity: &mut MatchEntity, team1: &[ScoreCell], team2: &[ScoreCell]) -> ScoreOutcome {
    match normalize(team1, team2) {
        NormalizedScore::Mismatched { .. } => ScoreOutcome::Rejected,
        NormalizedScore::Empty => {
            if entity.score.take().is_some() {
                ScoreOutcome::Cleared
            } else {
                ScoreOutcome::Unchanged
            }
        }
        NormalizedScore::Sets(score) => {
            if entity.players.len() != MATCH_CAPACITY {
                return ScoreOutcome::Rejected;
            }
            if entity.score.as_ref() == Some(&score) {
                return ScoreOutcome::Unchanged;
            }
            entity.score = Some(score);
            ScoreOutcome::Stored
        }
    }
}

fn pair_up(players: Vec<UserEntity>) -> Option<TeamsEntity> {
    let [p1, p2, p3, p4]: [UserEntity; MATCH_CAPACITY] = players.try_into().ok()?;
    Some(TeamsEntity {
        team_a: [p1, p2],
        team_b: [p3, p4],
    })
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use rand::{SeedableRng, rngs::StdRng};
    use uuid::Uuid;

    use super::*;
    use crate::dao::models::ScoreEntity;

    fn user(id: &str) -> UserEntity {
        UserEntity {
            id: id.into(),
            name: format!("Player {id}"),
            avatar: format!("https://example.test/{id}.png"),
            email: None,
            phone: None,
            dob: None,
        }
    }

    fn match_organized_by(organizer: &str) -> MatchEntity {
        let now = SystemTime::now();
        MatchEntity {
            id: Uuid::new_v4(),
            date: "2026-10-24".into(),
            time: "18:00".into(),
            court: "Court 2".into(),
            address: None,
            starts_at: now,
            players: vec![user(organizer)],
            waiting_list: Vec::new(),
            created_by: user(organizer),
            teams: None,
            score: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(users: &[UserEntity]) -> Vec<&str> {
        users.iter().map(|user| user.id.as_str()).collect()
    }

    fn full_match() -> MatchEntity {
        let mut entity = match_organized_by("u3");
        for id in ["u1", "u4", "u2"] {
            assert!(join_match(&mut entity, user(id)));
        }
        entity
    }

    #[test]
    fn fourth_join_derives_teams_sorted_by_id() {
        let entity = full_match();
        let teams = entity.teams.expect("teams derived on fourth join");
        assert_eq!(ids(&teams.team_a), vec!["u1", "u2"]);
        assert_eq!(ids(&teams.team_b), vec!["u3", "u4"]);
    }

    #[test]
    fn team_split_ignores_join_order() {
        let mut reversed = match_organized_by("u2");
        for id in ["u4", "u1", "u3"] {
            join_match(&mut reversed, user(id));
        }
        assert_eq!(reversed.teams, full_match().teams);
    }

    #[test]
    fn join_is_a_no_op_for_rostered_users() {
        let mut entity = match_organized_by("u1");
        join_match(&mut entity, user("u2"));
        join_waiting_list(&mut entity, user("u9"));

        assert!(!join_match(&mut entity, user("u2")));
        assert!(!join_match(&mut entity, user("u9")));
        assert!(!join_waiting_list(&mut entity, user("u1")));
        assert_eq!(ids(&entity.players), vec!["u1", "u2"]);
        assert_eq!(ids(&entity.waiting_list), vec!["u9"]);
    }

    #[test]
    fn leave_promotes_head_of_waiting_list() {
        let mut entity = full_match();
        for id in ["a", "b", "c"] {
            join_waiting_list(&mut entity, user(id));
        }

        assert!(leave_match(&mut entity, "u4"));

        assert_eq!(ids(&entity.players), vec!["u3", "u1", "u2", "a"]);
        assert_eq!(ids(&entity.waiting_list), vec!["b", "c"]);
    }

    #[test]
    fn leave_clears_teams_and_score() {
        let mut entity = full_match();
        entity.score = Some(ScoreEntity {
            team1: vec![6, 6],
            team2: vec![3, 4],
        });

        assert!(leave_match(&mut entity, "u1"));

        assert!(entity.teams.is_none());
        assert!(entity.score.is_none());
        assert_eq!(entity.players.len(), 3);
    }

    #[test]
    fn leave_twice_changes_nothing_the_second_time() {
        let mut entity = match_organized_by("u1");
        join_match(&mut entity, user("u2"));

        assert!(leave_match(&mut entity, "u2"));
        let snapshot = entity.clone();
        assert!(!leave_match(&mut entity, "u2"));
        assert_eq!(entity, snapshot);
    }

    #[test]
    fn sequential_joins_and_leaves_keep_capacity_and_uniqueness() {
        let mut entity = match_organized_by("u0");
        for round in 0..12 {
            let id = format!("u{}", round % 7);
            if is_full(&entity) {
                join_waiting_list(&mut entity, user(&id));
            } else {
                join_match(&mut entity, user(&id));
            }
            if round % 3 == 2 {
                let leaving = entity.players[0].id.clone();
                leave_match(&mut entity, &leaving);
            }

            assert!(entity.players.len() <= MATCH_CAPACITY);
            let mut everyone = ids(&entity.players);
            everyone.extend(ids(&entity.waiting_list));
            let total = everyone.len();
            everyone.sort();
            everyone.dedup();
            assert_eq!(everyone.len(), total);
        }
    }

    #[test]
    fn leaving_waiting_list_is_idempotent() {
        let mut entity = match_organized_by("u1");
        join_waiting_list(&mut entity, user("w1"));

        assert!(leave_waiting_list(&mut entity, "w1"));
        assert!(!leave_waiting_list(&mut entity, "w1"));
        assert!(entity.waiting_list.is_empty());
    }

    #[test]
    fn score_is_stored_after_cleaning() {
        let mut entity = full_match();
        let team1 = [ScoreCell::Games(6), ScoreCell::Blank, ScoreCell::Games(4)];
        let team2 = [ScoreCell::Games(3), ScoreCell::Games(6), ScoreCell::Blank];

        assert_eq!(set_score(&mut entity, &team1, &team2), ScoreOutcome::Stored);
        assert_eq!(
            entity.score,
            Some(ScoreEntity {
                team1: vec![6, 4],
                team2: vec![3, 6],
            })
        );
        assert_eq!(set_score(&mut entity, &team1, &team2), ScoreOutcome::Unchanged);
    }

    #[test]
    fn mismatched_score_leaves_match_untouched() {
        let mut entity = full_match();
        let before = entity.clone();

        let outcome = set_score(
            &mut entity,
            &[ScoreCell::Games(6), ScoreCell::Games(4)],
            &[ScoreCell::Games(6)],
        );

        assert_eq!(outcome, ScoreOutcome::Rejected);
        assert_eq!(entity, before);
    }

    #[test]
    fn empty_sheet_removes_existing_score() {
        let mut entity = full_match();
        set_score(&mut entity, &[ScoreCell::Games(6)], &[ScoreCell::Games(2)]);

        assert_eq!(
            set_score(&mut entity, &[ScoreCell::Blank], &[]),
            ScoreOutcome::Cleared
        );
        assert!(entity.score.is_none());
    }

    #[test]
    fn score_needs_a_full_roster() {
        let mut entity = match_organized_by("u1");
        let outcome = set_score(&mut entity, &[ScoreCell::Games(6)], &[ScoreCell::Games(1)]);
        assert_eq!(outcome, ScoreOutcome::Rejected);
        assert!(entity.score.is_none());
    }

    #[test]
    fn shuffle_partitions_the_four_players_and_drops_score() {
        let mut entity = full_match();
        entity.score = Some(ScoreEntity {
            team1: vec![6],
            team2: vec![0],
        });
        let mut rng = StdRng::seed_from_u64(7);

        assert!(shuffle_teams(&mut entity, &mut rng));

        let teams = entity.teams.clone().unwrap();
        let mut members: Vec<&str> = ids(&teams.team_a);
        members.extend(ids(&teams.team_b));
        members.sort();
        assert_eq!(members, vec!["u1", "u2", "u3", "u4"]);
        assert!(entity.score.is_none());
        assert_eq!(ids(&entity.players), vec!["u3", "u1", "u4", "u2"]);
    }

    #[test]
    fn shuffle_requires_four_players() {
        let mut entity = match_organized_by("u1");
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!shuffle_teams(&mut entity, &mut rng));
        assert!(entity.teams.is_none());
    }

    #[test]
    fn slots_and_roles_follow_the_roster() {
        let mut entity = match_organized_by("u1");
        join_waiting_list(&mut entity, user("w"));
        assert_eq!(open_slots(&entity), 3);
        assert_eq!(role_of(&entity, "u1"), RosterRole::Player);
        assert_eq!(role_of(&entity, "w"), RosterRole::Waiting);
        assert_eq!(role_of(&entity, "nobody"), RosterRole::Outsider);
        assert_eq!(open_slots(&full_match()), 0);
    }
}
