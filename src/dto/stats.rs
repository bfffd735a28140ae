use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::common::UserSummary,
    state::stats::{PlayerTally, Rankings},
};

/// Podium entry with every tally and the composite score.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankedPlayer {
    pub user: UserSummary,
    pub played: u64,
    pub organized: u64,
    pub sets_won: u64,
    pub games_won: u64,
    pub score: u64,
}

impl From<PlayerTally> for RankedPlayer {
    fn from(tally: PlayerTally) -> Self {
        let score = tally.composite();
        Self {
            user: tally.user.into(),
            played: tally.played,
            organized: tally.organized,
            sets_won: tally.sets_won,
            games_won: tally.games_won,
            score,
        }
    }
}

/// One row of a single-metric leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user: UserSummary,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Top three by composite score.
    pub podium: Vec<RankedPlayer>,
    pub matches_played: Vec<LeaderboardEntry>,
    pub matches_organized: Vec<LeaderboardEntry>,
    pub sets_won: Vec<LeaderboardEntry>,
    pub games_won: Vec<LeaderboardEntry>,
}

fn leaderboard(tallies: Vec<PlayerTally>, metric: fn(&PlayerTally) -> u64) -> Vec<LeaderboardEntry> {
    tallies
        .into_iter()
        .map(|tally| LeaderboardEntry {
            count: metric(&tally),
            user: tally.user.into(),
        })
        .collect()
}

impl From<Rankings> for StatsResponse {
    fn from(rankings: Rankings) -> Self {
        Self {
            podium: rankings.podium.into_iter().map(Into::into).collect(),
            matches_played: leaderboard(rankings.by_played, |t| t.played),
            matches_organized: leaderboard(rankings.by_organized, |t| t.organized),
            sets_won: leaderboard(rankings.by_sets_won, |t| t.sets_won),
            games_won: leaderboard(rankings.by_games_won, |t| t.games_won),
        }
    }
}
