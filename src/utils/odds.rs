/// Convert American odds to implied probability
/// Positive odds (+150) mean you win $150 on a $100 bet
/// Negative odds (-150) mean you need to bet $150 to win $100
pub fn american_odds_to_probability(odds: i32) -> f64 {
    if odds > 0 {
        // For positive odds: 100 / (odds + 100)
        100.0 / (odds as f64 + 100.0)
    } else {
        // For negative odds: |odds| / (|odds| + 100)
        let abs_odds = odds.unsigned_abs() as f64;
        abs_odds / (abs_odds + 100.0)
    }
}

/// Profit per unit staked on a winning bet at the given American odds.
/// -110 pays 100/110 = 0.9091, +150 pays 1.5
pub fn american_odds_to_payout(odds: i32) -> f64 {
    if odds > 0 {
        odds as f64 / 100.0
    } else {
        100.0 / odds.unsigned_abs() as f64
    }
}
