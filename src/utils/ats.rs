use crate::config::EngineConfig;
use crate::error::AtsError;
use crate::models::{normalize_spread, Game, Line, TeamSide};
use serde::{Deserialize, Serialize};

/// Result of a bet measured against the spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AtsOutcome {
    Win,
    Loss,
    Push,
}

impl std::fmt::Display for AtsOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtsOutcome::Win => write!(f, "WIN"),
            AtsOutcome::Loss => write!(f, "LOSS"),
            AtsOutcome::Push => write!(f, "PUSH"),
        }
    }
}

/// ATS classification of one (game, line, team) triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtsResult {
    pub side: TeamSide,
    /// Team score minus opponent score
    pub actual_margin: i32,
    /// Spread from the team's perspective (negative = favored)
    pub adjusted_spread: f64,
    /// Points by which the team beat the number (negative = failed to cover)
    pub ats_margin: f64,
    pub outcome: AtsOutcome,
    /// Profit or loss of a flat stake on this team
    pub roi_delta: f64,
}

/// Classify a margin against the push tolerance.
///
/// An exact zero is always a push, even with a zero threshold.
pub fn classify_margin(margin: f64, push_threshold: f64) -> AtsOutcome {
    if margin == 0.0 || margin.abs() < push_threshold {
        AtsOutcome::Push
    } else if margin > 0.0 {
        AtsOutcome::Win
    } else {
        AtsOutcome::Loss
    }
}

/// Flat-stake profit for an outcome: +payout on a win, -stake on a loss, 0 on a push
pub fn roi_delta(outcome: AtsOutcome, config: &EngineConfig) -> f64 {
    match outcome {
        AtsOutcome::Win => config.win_payout(),
        AtsOutcome::Loss => -config.stake,
        AtsOutcome::Push => 0.0,
    }
}

/// Classify a bet on `side` given raw scores and a home-perspective spread.
///
/// A favorite (negative adjusted spread) has to win by more than the spread,
/// an underdog covers by losing by less than the spread or winning outright:
/// `ats_margin = actual_margin + adjusted_spread`.
pub fn classify_ats(
    home_score: Option<i32>,
    away_score: Option<i32>,
    spread: Option<f64>,
    side: TeamSide,
    config: &EngineConfig,
) -> Result<AtsResult, AtsError> {
    let home_score = home_score.ok_or_else(|| AtsError::missing("home_score"))?;
    let away_score = away_score.ok_or_else(|| AtsError::missing("away_score"))?;
    let spread = spread.ok_or_else(|| AtsError::missing("spread"))?;
    if !spread.is_finite() {
        return Err(AtsError::non_finite("spread", spread));
    }

    let actual_margin = match side {
        TeamSide::Home => home_score - away_score,
        TeamSide::Away => away_score - home_score,
    };
    let adjusted_spread = normalize_spread(spread, side);
    let ats_margin = actual_margin as f64 + adjusted_spread;
    let outcome = classify_margin(ats_margin, config.push_threshold);

    Ok(AtsResult {
        side,
        actual_margin,
        adjusted_spread,
        ats_margin,
        outcome,
        roi_delta: roi_delta(outcome, config),
    })
}

/// Classify a bet on `side` of `game` using the spread posted on `line`
pub fn classify_game(
    game: &Game,
    line: &Line,
    side: TeamSide,
    config: &EngineConfig,
) -> Result<AtsResult, AtsError> {
    classify_ats(game.home_score, game.away_score, line.spread, side, config)
}

/// Result of an over/under bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TotalOutcome {
    Over,
    Under,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalResult {
    pub combined_score: i32,
    pub over_under: f64,
    /// Combined score minus the posted total
    pub margin: f64,
    pub outcome: TotalOutcome,
}

/// Classify the game total against the line's over/under with the same push tolerance
pub fn classify_total(
    game: &Game,
    line: &Line,
    config: &EngineConfig,
) -> Result<TotalResult, AtsError> {
    let home_score = game.home_score.ok_or_else(|| AtsError::missing("home_score"))?;
    let away_score = game.away_score.ok_or_else(|| AtsError::missing("away_score"))?;
    let over_under = line.over_under.ok_or_else(|| AtsError::missing("over_under"))?;
    if !over_under.is_finite() {
        return Err(AtsError::non_finite("over_under", over_under));
    }

    let combined_score = home_score + away_score;
    let margin = combined_score as f64 - over_under;
    let outcome = match classify_margin(margin, config.push_threshold) {
        AtsOutcome::Win => TotalOutcome::Over,
        AtsOutcome::Loss => TotalOutcome::Under,
        AtsOutcome::Push => TotalOutcome::Push,
    };

    Ok(TotalResult {
        combined_score,
        over_under,
        margin,
        outcome,
    })
}
