use crate::error::AtsError;
use crate::models::{GameLines, Line};
use crate::utils::odds::american_odds_to_probability;
use serde::{Deserialize, Serialize};

/// One side of a moneyline arbitrage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageLeg {
    pub provider: String,
    pub odds: i32,
    pub implied_probability: f64,
    /// Share of the bankroll to stake on this side, in percent
    pub stake_percentage: f64,
}

/// Why a game's lines offer no arbitrage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoArbitrageReason {
    /// Fewer than two lines quote both moneylines
    InsufficientData,
    /// The best home and best away prices sit at the same provider
    SameProvider,
    /// Best prices imply a total probability of 1 or more
    NoEdge,
}

/// Moneyline arbitrage assessment for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub has_arbitrage: bool,
    pub profit_percentage: f64,
    /// Sum of the best home and away implied probabilities, when they were compared
    pub total_implied_probability: Option<f64>,
    pub home: Option<ArbitrageLeg>,
    pub away: Option<ArbitrageLeg>,
    pub reason: Option<NoArbitrageReason>,
}

impl ArbitrageOpportunity {
    fn none(reason: NoArbitrageReason, total_implied_probability: Option<f64>) -> Self {
        Self {
            has_arbitrage: false,
            profit_percentage: 0.0,
            total_implied_probability,
            home: None,
            away: None,
            reason: Some(reason),
        }
    }
}

/// Minimum number of two-sided quotes needed to compare prices
pub const MIN_ARBITRAGE_LINES: usize = 2;

/// Check a game's lines for a cross-provider moneyline arbitrage.
///
/// Returns `InsufficientData` when fewer than two lines quote both moneylines.
pub fn try_detect_moneyline_arbitrage(lines: &[Line]) -> Result<ArbitrageOpportunity, AtsError> {
    let quotes: Vec<(&str, i32, i32)> = lines
        .iter()
        .filter_map(|line| {
            Some((
                line.provider.as_str(),
                line.home_moneyline?,
                line.away_moneyline?,
            ))
        })
        .collect();

    if quotes.len() < MIN_ARBITRAGE_LINES {
        return Err(AtsError::InsufficientData {
            usable: quotes.len(),
            required: MIN_ARBITRAGE_LINES,
        });
    }

    // Find best odds for each side across all providers
    let home_odds = quotes.iter().map(|q| q.1).max().unwrap_or(i32::MIN);
    let away_odds = quotes.iter().map(|q| q.2).max().unwrap_or(i32::MIN);

    // Among providers tied at the best price on either side, take the first
    // home/away pairing that spans two different books
    let pairing = quotes
        .iter()
        .filter(|q| q.1 == home_odds)
        .find_map(|home| {
            quotes
                .iter()
                .filter(|q| q.2 == away_odds)
                .find(|away| !away.0.eq_ignore_ascii_case(home.0))
                .map(|away| (home.0, away.0))
        });

    let Some((home_provider, away_provider)) = pairing else {
        return Ok(ArbitrageOpportunity::none(
            NoArbitrageReason::SameProvider,
            None,
        ));
    };

    let home_prob = american_odds_to_probability(home_odds);
    let away_prob = american_odds_to_probability(away_odds);
    let total_prob = home_prob + away_prob;

    // If total probability < 1, we have an arbitrage opportunity
    if total_prob >= 1.0 {
        return Ok(ArbitrageOpportunity::none(
            NoArbitrageReason::NoEdge,
            Some(total_prob),
        ));
    }

    let profit_percentage = (1.0 / total_prob - 1.0) * 100.0;

    Ok(ArbitrageOpportunity {
        has_arbitrage: true,
        profit_percentage,
        total_implied_probability: Some(total_prob),
        home: Some(ArbitrageLeg {
            provider: home_provider.to_string(),
            odds: home_odds,
            implied_probability: home_prob,
            stake_percentage: (1.0 / total_prob) * home_prob * 100.0,
        }),
        away: Some(ArbitrageLeg {
            provider: away_provider.to_string(),
            odds: away_odds,
            implied_probability: away_prob,
            stake_percentage: (1.0 / total_prob) * away_prob * 100.0,
        }),
        reason: None,
    })
}

/// Like [`try_detect_moneyline_arbitrage`], but too few quotes yield a
/// well-formed "no opportunity" result instead of an error
pub fn detect_moneyline_arbitrage(lines: &[Line]) -> ArbitrageOpportunity {
    try_detect_moneyline_arbitrage(lines)
        .unwrap_or_else(|_| ArbitrageOpportunity::none(NoArbitrageReason::InsufficientData, None))
}

/// An arbitrage opportunity found while scanning many games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameArbitrage {
    pub game_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub profit_percentage: f64,
    pub home: ArbitrageLeg,
    pub away: ArbitrageLeg,
}

impl GameArbitrage {
    pub fn format(&self) -> String {
        format!(
            "{} @ {} | Home: {} ({:+}) on {} [{:.2}%] | Away: {} ({:+}) on {} [{:.2}%] | Profit: {:.2}%",
            self.away_team,
            self.home_team,
            self.home_team,
            self.home.odds,
            self.home.provider,
            self.home.stake_percentage,
            self.away_team,
            self.away.odds,
            self.away.provider,
            self.away.stake_percentage,
            self.profit_percentage
        )
    }
}

/// Find moneyline arbitrage across many games, best profit first
pub fn find_moneyline_arbitrage(games: &[GameLines]) -> Vec<GameArbitrage> {
    let mut arbitrage_opportunities: Vec<GameArbitrage> = games
        .iter()
        .filter_map(|GameLines { game, lines }| {
            let opportunity = detect_moneyline_arbitrage(lines);
            match (opportunity.home, opportunity.away) {
                (Some(home), Some(away)) if opportunity.has_arbitrage => Some(GameArbitrage {
                    game_id: game.id,
                    home_team: game.home_team.clone(),
                    away_team: game.away_team.clone(),
                    profit_percentage: opportunity.profit_percentage,
                    home,
                    away,
                }),
                _ => None,
            }
        })
        .collect();

    // Sort by profit percentage (descending)
    arbitrage_opportunities.sort_by(|a, b| {
        b.profit_percentage
            .partial_cmp(&a.profit_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    arbitrage_opportunities
}
