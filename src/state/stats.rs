//! Rankings derived from the full user and match collections.

use crate::dao::models::{MatchEntity, UserEntity};

/// Weight of a played match in the composite score.
pub const PLAYED_WEIGHT: u64 = 10;
/// Weight of an organised match in the composite score.
pub const ORGANIZED_WEIGHT: u64 = 5;
/// Weight of a won set in the composite score.
pub const SET_WEIGHT: u64 = 20;
/// Weight of a won game in the composite score.
pub const GAME_WEIGHT: u64 = 1;

const PODIUM_SIZE: usize = 3;

/// Tallies for one user across every match. Counters saturate instead of
/// wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTally {
    /// User the counters belong to.
    pub user: UserEntity,
    /// Matches where the user holds a player slot.
    pub played: u64,
    /// Matches the user created.
    pub organized: u64,
    /// Sets won by the user's side in scored matches.
    pub sets_won: u64,
    /// Games won by the user's side, summed over every scored set.
    pub games_won: u64,
}

impl PlayerTally {
    fn new(user: UserEntity) -> Self {
        Self {
            user,
            played: 0,
            organized: 0,
            sets_won: 0,
            games_won: 0,
        }
    }

    /// Composite ranking score used for the podium.
    pub fn composite(&self) -> u64 {
        [
            (self.played, PLAYED_WEIGHT),
            (self.organized, ORGANIZED_WEIGHT),
            (self.sets_won, SET_WEIGHT),
            (self.games_won, GAME_WEIGHT),
        ]
        .into_iter()
        .fold(0, |total: u64, (count, weight)| {
            total.saturating_add(count.saturating_mul(weight))
        })
    }
}

/// Output of [`compute_rankings`]. Every list holds each user exactly once
/// except `podium`, which is capped at three entries.
#[derive(Debug, Clone, Default)]
pub struct Rankings {
    /// Top three by [`PlayerTally::composite`].
    pub podium: Vec<PlayerTally>,
    /// Everyone, most matches played first.
    pub by_played: Vec<PlayerTally>,
    /// Everyone, most matches organised first.
    pub by_organized: Vec<PlayerTally>,
    /// Everyone, most sets won first.
    pub by_sets_won: Vec<PlayerTally>,
    /// Everyone, most games won first.
    pub by_games_won: Vec<PlayerTally>,
}

/// Tally every user over every match and sort the results.
///
/// Sorting is stable and descending, so ties keep the order of `users`.
pub fn compute_rankings(users: &[UserEntity], matches: &[MatchEntity]) -> Rankings {
    let tallies: Vec<PlayerTally> = users
        .iter()
        .map(|user| tally_user(user, matches))
        .collect();

    let mut podium = sorted_desc(&tallies, PlayerTally::composite);
    podium.truncate(PODIUM_SIZE);

    Rankings {
        podium,
        by_played: sorted_desc(&tallies, |tally| tally.played),
        by_organized: sorted_desc(&tallies, |tally| tally.organized),
        by_sets_won: sorted_desc(&tallies, |tally| tally.sets_won),
        by_games_won: sorted_desc(&tallies, |tally| tally.games_won),
    }
}

fn tally_user(user: &UserEntity, matches: &[MatchEntity]) -> PlayerTally {
    let mut tally = PlayerTally::new(user.clone());

    for entity in matches {
        if entity.is_organizer(&user.id) {
            tally.organized = tally.organized.saturating_add(1);
        }

        let Some(index) = entity.players.iter().position(|p| p.id == user.id) else {
            continue;
        };
        tally.played = tally.played.saturating_add(1);

        let Some(score) = entity.score.as_ref() else {
            continue;
        };
        let (own, other) = match index {
            0 | 1 => (&score.team1, &score.team2),
            2 | 3 => (&score.team2, &score.team1),
            _ => continue,
        };
        for (&mine, &theirs) in own.iter().zip(other.iter()) {
            tally.games_won = tally.games_won.saturating_add(u64::from(mine));
            if mine > theirs {
                tally.sets_won = tally.sets_won.saturating_add(1);
            }
        }
    }

    tally
}

fn sorted_desc<F>(tallies: &[PlayerTally], key: F) -> Vec<PlayerTally>
where
    F: Fn(&PlayerTally) -> u64,
{
    let mut sorted = tallies.to_vec();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted
}
