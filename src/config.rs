//! League-level configuration for cap and roster rules.

use chrono::{Datelike, Utc};

use crate::Amount;

/// A season year, e.g. 2025.
pub type Season = i32;

/// Cap and roster constants the engine evaluates transactions against.
///
/// The roster limit is league-calendar-dependent (90 is the offseason
/// number), so it lives here rather than as a literal in the engine.
#[derive(Debug, Clone)]
pub struct LeagueConfig {
    pub salary_cap_limit: Amount,
    pub cap_year: Season,
    pub roster_limit: usize,
}

impl LeagueConfig {
    /// Build a config from environment variables, falling back to defaults:
    /// `SALARY_CAP_LIMIT` (dollars), `CAP_YEAR`, `ROSTER_LIMIT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            salary_cap_limit: std::env::var("SALARY_CAP_LIMIT")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .map(Amount::from_float)
                .unwrap_or(defaults.salary_cap_limit),
            cap_year: std::env::var("CAP_YEAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cap_year),
            roster_limit: std::env::var("ROSTER_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.roster_limit),
        }
    }
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            salary_cap_limit: Amount::from_dollars(255_400_000),
            cap_year: Utc::now().year(),
            roster_limit: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LeagueConfig::default();
        assert_eq!(config.salary_cap_limit, Amount::from_dollars(255_400_000));
        assert_eq!(config.roster_limit, 90);
        assert!(config.cap_year >= 2024);
    }
}
