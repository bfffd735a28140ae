//! Score sheet cells and the normalisation applied before a score is stored.

use serde::Deserialize;
use serde_json::Value;

use crate::dao::models::ScoreEntity;

/// Highest game count a single set can carry, tie-breaks included.
pub const MAX_GAMES_PER_SET: u32 = 99;

/// One per-set entry of a submitted score sheet.
///
/// Sheets arrive straight from a form, so a cell may be a number, a numeric
/// string, an empty string, `null`, or garbage. Anything that is not an
/// integer in `0..=MAX_GAMES_PER_SET` is [`ScoreCell::Blank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum ScoreCell {
    /// Games won in the set.
    Games(u32),
    /// Nothing usable was entered.
    Blank,
}

impl ScoreCell {
    /// Game count, or `None` for a blank cell.
    pub fn games(self) -> Option<u32> {
        match self {
            ScoreCell::Games(games) => Some(games),
            ScoreCell::Blank => None,
        }
    }
}

impl From<Value> for ScoreCell {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) => number
                .as_u64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                        .map(|f| f as u64)
                })
                .and_then(|games| u32::try_from(games).ok())
                .map_or(ScoreCell::Blank, ScoreCell::from),
            Value::String(text) => text
                .trim()
                .parse::<u32>()
                .map_or(ScoreCell::Blank, ScoreCell::from),
            _ => ScoreCell::Blank,
        }
    }
}

impl From<u32> for ScoreCell {
    fn from(games: u32) -> Self {
        if games <= MAX_GAMES_PER_SET {
            ScoreCell::Games(games)
        } else {
            ScoreCell::Blank
        }
    }
}

/// Result of cleaning a submitted sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedScore {
    /// At least one complete set: store it.
    Sets(ScoreEntity),
    /// No set entered on either side: drop any stored score.
    Empty,
    /// Sides disagree on the number of sets once blanks are removed.
    Mismatched { team1: usize, team2: usize },
}

/// Drop blank cells from each side independently, then require equal lengths.
pub fn normalize(team1: &[ScoreCell], team2: &[ScoreCell]) -> NormalizedScore {
    let team1: Vec<u32> = team1.iter().filter_map(|cell| cell.games()).collect();
    let team2: Vec<u32> = team2.iter().filter_map(|cell| cell.games()).collect();

    if team1.len() != team2.len() {
        return NormalizedScore::Mismatched {
            team1: team1.len(),
            team2: team2.len(),
        };
    }

    if team1.is_empty() {
        NormalizedScore::Empty
    } else {
        NormalizedScore::Sets(ScoreEntity { team1, team2 })
    }
}
