use crate::config::EngineConfig;
use crate::models::Line;

/// Ordered provider preference for picking one line out of several.
///
/// Providers are tried in priority order (case-insensitive). When none of
/// them posted a usable line, the first usable line in posting order wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    priority: Vec<String>,
}

impl ProviderPolicy {
    pub fn new<I, S>(priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            priority: priority.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.provider_priority.iter().cloned())
    }

    /// Pick a line that carries a spread
    pub fn select_spread_line<'a>(&self, lines: &'a [Line]) -> Option<&'a Line> {
        self.select_where(lines, |line| line.spread.is_some_and(f64::is_finite))
    }

    /// Pick a line among those accepted by `usable`
    pub fn select_where<'a, F>(&self, lines: &'a [Line], usable: F) -> Option<&'a Line>
    where
        F: Fn(&Line) -> bool,
    {
        self.priority
            .iter()
            .find_map(|provider| {
                lines
                    .iter()
                    .find(|line| line.provider.eq_ignore_ascii_case(provider) && usable(*line))
            })
            .or_else(|| lines.iter().find(|line| usable(*line)))
    }
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_line(_: &Line) -> bool {
        true
    }

    fn line(provider: &str, spread: Option<f64>) -> Line {
        Line {
            provider: provider.to_string(),
            spread,
            over_under: None,
            home_moneyline: None,
            away_moneyline: None,
            spread_open: None,
            over_under_open: None,
        }
    }

    #[test]
    fn test_prefers_priority_order_over_posting_order() {
        let lines = vec![
            line("Bovada", Some(-3.0)),
            line("DraftKings", Some(-3.5)),
            line("ESPN Bet", Some(-4.0)),
        ];
        let policy = ProviderPolicy::default();
        assert_eq!(policy.select_where(&lines, any_line).unwrap().provider, "ESPN Bet");

        let policy = ProviderPolicy::new(["bovada", "ESPN Bet"]);
        assert_eq!(policy.select_where(&lines, any_line).unwrap().provider, "Bovada");
    }

    #[test]
    fn test_falls_back_to_first_line() {
        let lines = vec![
            line("teamrankings", Some(-6.5)),
            line("numberfire", Some(-7.0)),
        ];
        let policy = ProviderPolicy::default();
        assert_eq!(policy.select_where(&lines, any_line).unwrap().provider, "teamrankings");
        assert!(policy.select_where(&[], any_line).is_none());
    }

    #[test]
    fn test_spread_selection_skips_lines_without_spread() {
        let lines = vec![
            line("ESPN Bet", None),
            line("teamrankings", Some(-6.5)),
            line("DraftKings", Some(-7.0)),
        ];
        let policy = ProviderPolicy::default();
        assert_eq!(policy.select_where(&lines, any_line).unwrap().provider, "ESPN Bet");
        assert_eq!(policy.select_spread_line(&lines).unwrap().provider, "DraftKings");

        let no_spreads = vec![line("ESPN Bet", None)];
        assert!(policy.select_spread_line(&no_spreads).is_none());
    }
}
