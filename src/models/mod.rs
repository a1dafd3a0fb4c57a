use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Season segment a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeasonType {
    Regular,
    Postseason,
}

impl std::fmt::Display for SeasonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeasonType::Regular => write!(f, "regular"),
            SeasonType::Postseason => write!(f, "postseason"),
        }
    }
}

/// Which side of a game a team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn is_home(self) -> bool {
        matches!(self, TeamSide::Home)
    }

    pub fn flip(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// Represents a college football game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub season: i32,
    pub week: i32,
    pub season_type: SeasonType,
    pub start_date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl Game {
    /// Final score as (home, away). Only a game with both scores is complete.
    pub fn final_score(&self) -> Option<(i32, i32)> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.final_score().is_some()
    }

    /// Side the named team plays on, if it plays in this game at all
    pub fn side_of(&self, team: &str) -> Option<TeamSide> {
        if self.home_team.eq_ignore_ascii_case(team) {
            Some(TeamSide::Home)
        } else if self.away_team.eq_ignore_ascii_case(team) {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }
}

/// One sportsbook's posted odds for a game.
///
/// `spread` is always from the home team's perspective: negative means the
/// home team is favored by that many points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub provider: String,
    pub spread: Option<f64>,
    pub over_under: Option<f64>,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
    #[serde(default)]
    pub spread_open: Option<f64>,
    #[serde(default)]
    pub over_under_open: Option<f64>,
}

impl Line {
    /// Spread from the given team's perspective
    pub fn team_spread(&self, side: TeamSide) -> Option<f64> {
        self.spread.map(|spread| normalize_spread(spread, side))
    }

    /// How far the spread moved since it opened (home perspective)
    pub fn spread_movement(&self) -> Option<f64> {
        Some(self.spread? - self.spread_open?)
    }

    pub fn has_moneylines(&self) -> bool {
        self.home_moneyline.is_some() && self.away_moneyline.is_some()
    }
}

/// Convert a home-perspective spread into the given side's perspective
pub fn normalize_spread(home_spread: f64, side: TeamSide) -> f64 {
    match side {
        TeamSide::Home => home_spread,
        TeamSide::Away => -home_spread,
    }
}

/// A game together with every line posted for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLines {
    pub game: Game,
    pub lines: Vec<Line>,
}
