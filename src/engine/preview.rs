//! Cap-ledger snapshots shared by every preview.

use crate::Amount;
use crate::cap;
use crate::config::LeagueConfig;
use crate::model::{Player, Team};
use crate::store::RosterStore;

/// A team's cap position at preview time, computed over the active roster.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CapLedger {
    pub cap_limit: Amount,
    pub total_cap: Amount,
    pub cap_space: Amount,
}

impl CapLedger {
    /// Snapshot a team's cap position plus the active roster it was
    /// computed from.
    pub(crate) fn for_team<'a>(
        store: &'a RosterStore,
        config: &LeagueConfig,
        team: &Team,
    ) -> (CapLedger, Vec<&'a Player>) {
        let players = store.active_roster(team.id);
        let total_cap: Amount = players
            .iter()
            .map(|p| cap::cap_hit(p.active_contract(), config.cap_year))
            .sum();
        let ledger = CapLedger {
            cap_limit: config.salary_cap_limit,
            total_cap,
            cap_space: config.salary_cap_limit - total_cap,
        };
        (ledger, players)
    }
}

/// One team's line in the league cap table.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamCapSummary {
    pub team: String,
    pub display_name: String,
    pub players: usize,
    pub total_cap: Amount,
    pub cap_space: Amount,
}
