//! In-memory roster store: teams, players, and the transaction log.
//!
//! This is the collaborator the engine runs against. Lookups return
//! `Option`; turning a miss into a caller-facing error is the engine's job.

use std::collections::HashMap;

use crate::model::{
    Contract, ContractId, Player, PlayerId, Team, TeamId, TransactionRecord, TransactionStatus,
    TxId,
};

/// Fields needed to register a team.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub code: String,
    pub display_name: String,
    pub location: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Default)]
pub struct RosterStore {
    teams: HashMap<TeamId, Team>,
    players: HashMap<PlayerId, Player>,
    transactions: HashMap<TxId, TransactionRecord>,
    next_team_id: TeamId,
    next_player_id: PlayerId,
    next_contract_id: ContractId,
    next_tx_id: TxId,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a team. Codes are normalized to uppercase; registering an
    /// existing code returns the existing team's id (import idempotency).
    pub fn insert_team(&mut self, team: NewTeam) -> TeamId {
        let code = team.code.to_uppercase();
        if let Some(existing) = self.team_by_code(&code) {
            return existing.id;
        }
        self.next_team_id += 1;
        let id = self.next_team_id;
        self.teams.insert(
            id,
            Team {
                id,
                code,
                display_name: team.display_name,
                location: team.location,
                nickname: team.nickname,
            },
        );
        id
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Case-insensitive lookup by team code.
    pub fn team_by_code(&self, code: &str) -> Option<&Team> {
        self.teams
            .values()
            .find(|t| t.code.eq_ignore_ascii_case(code))
    }

    /// All teams, ordered by code.
    pub fn teams(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.values().collect();
        teams.sort_by(|a, b| a.code.cmp(&b.code));
        teams
    }

    /// Remove a team and everything it owns: players and transactions.
    pub fn remove_team(&mut self, id: TeamId) -> Option<Team> {
        let team = self.teams.remove(&id)?;
        self.players.retain(|_, p| p.team_id != id);
        self.transactions.retain(|_, t| t.team_id != id);
        Some(team)
    }

    /// Insert a player under a fresh id (contract ids are refreshed too).
    pub fn insert_player(&mut self, mut player: Player) -> PlayerId {
        self.next_player_id += 1;
        let id = self.next_player_id;
        player.id = id;
        for contract in &mut player.contracts {
            self.next_contract_id += 1;
            contract.id = self.next_contract_id;
        }
        // Ids were refreshed, so the reference is rebuilt in insertion order.
        player.active_contract_id = player.contracts.first().map(|c| c.id);
        self.players.insert(id, player);
        id
    }

    /// Re-insert a player under its original id (undo restore).
    ///
    /// Returns `false` if that id is already occupied.
    pub fn restore_player(&mut self, player: Player) -> bool {
        if self.players.contains_key(&player.id) {
            return false;
        }
        self.next_player_id = self.next_player_id.max(player.id);
        self.next_contract_id = self
            .next_contract_id
            .max(player.contracts.iter().map(|c| c.id).max().unwrap_or(0));
        self.players.insert(player.id, player);
        true
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Remove a player; embedded contracts go with it.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Move a player to another team. Returns `false` if the player is gone.
    pub fn reassign_player(&mut self, id: PlayerId, team: &Team) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.team_id = team.id;
                player.team_code = team.code.clone();
                true
            }
            None => false,
        }
    }

    /// Every player on a team, regardless of status.
    pub fn roster(&self, team_id: TeamId) -> Vec<&Player> {
        let mut players: Vec<&Player> = self
            .players
            .values()
            .filter(|p| p.team_id == team_id)
            .collect();
        players.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        players
    }

    /// Players counting toward the active roster, sorted by last/first name.
    pub fn active_roster(&self, team_id: TeamId) -> Vec<&Player> {
        let mut players: Vec<&Player> = self
            .players
            .values()
            .filter(|p| p.team_id == team_id && p.counts_toward_roster())
            .collect();
        players.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        players
    }

    /// Attach a contract to a player. The contract gets a fresh id, years are
    /// kept season-sorted, and the player's active-contract reference is set
    /// if it was unset. Returns `None` if the player does not exist.
    pub fn attach_contract(&mut self, player_id: PlayerId, mut contract: Contract) -> Option<ContractId> {
        let player = self.players.get_mut(&player_id)?;
        self.next_contract_id += 1;
        contract.id = self.next_contract_id;
        contract.years.sort_by_key(|y| y.season);
        let id = contract.id;
        player.contracts.push(contract);
        if player.active_contract_id.is_none() {
            player.active_contract_id = Some(id);
        }
        Some(id)
    }

    /// Append a transaction record under a fresh id.
    pub fn insert_transaction(&mut self, mut record: TransactionRecord) -> TxId {
        self.next_tx_id += 1;
        record.id = self.next_tx_id;
        let id = record.id;
        self.transactions.insert(id, record);
        id
    }

    pub fn transaction(&self, id: TxId) -> Option<&TransactionRecord> {
        self.transactions.get(&id)
    }

    /// Flip a transaction to `Undone`. Returns `false` if it does not exist.
    pub fn mark_undone(&mut self, id: TxId) -> bool {
        match self.transactions.get_mut(&id) {
            Some(record) => {
                record.status = TransactionStatus::Undone;
                true
            }
            None => false,
        }
    }

    /// A team's transaction log, oldest first.
    pub fn transactions_for(&self, team_id: TeamId) -> Vec<&TransactionRecord> {
        let mut records: Vec<&TransactionRecord> = self
            .transactions
            .values()
            .filter(|t| t.team_id == team_id)
            .collect();
        records.sort_by_key(|t| t.id);
        records
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use crate::model::{TransactionKind, TransactionRequest, TransactionResult};

    fn new_team(code: &str) -> NewTeam {
        NewTeam {
            code: code.into(),
            display_name: format!("{code} Test Club"),
            location: None,
            nickname: None,
        }
    }

    fn new_player(team_id: TeamId, code: &str, last: &str) -> Player {
        Player {
            id: 0,
            external_id: format!("ext-{last}"),
            team_id,
            team_code: code.into(),
            first_name: "Test".into(),
            last_name: last.into(),
            position: "WR".into(),
            jersey_number: None,
            status: "active".into(),
            height: None,
            weight: None,
            birthdate: None,
            college: None,
            experience: 0,
            roster_date: None,
            roster_source: None,
            active_contract_id: None,
            contracts: Vec::new(),
        }
    }

    fn contract() -> Contract {
        Contract {
            id: 0,
            source: "test".into(),
            source_url: None,
            signed_date: None,
            total_value: Amount::from_dollars(10_000_000),
            guaranteed: Amount::ZERO,
            average_per_year: Amount::from_dollars(5_000_000),
            notes: None,
            years: Vec::new(),
        }
    }

    #[test]
    fn team_lookup_is_case_insensitive() {
        let mut store = RosterStore::new();
        let id = store.insert_team(new_team("ari"));
        assert_eq!(store.team_by_code("ARI").unwrap().id, id);
        assert_eq!(store.team_by_code("ari").unwrap().code, "ARI");
        assert!(store.team_by_code("SEA").is_none());
    }

    #[test]
    fn duplicate_team_code_returns_existing_id() {
        let mut store = RosterStore::new();
        let first = store.insert_team(new_team("ARI"));
        let second = store.insert_team(new_team("ari"));
        assert_eq!(first, second);
        assert_eq!(store.teams().len(), 1);
    }

    #[test]
    fn active_roster_filters_and_sorts() {
        let mut store = RosterStore::new();
        let team = store.insert_team(new_team("ARI"));
        store.insert_player(new_player(team, "ARI", "Zimmer"));
        store.insert_player(new_player(team, "ARI", "Adams"));
        let mut cut = new_player(team, "ARI", "Cut");
        cut.status = "Released".into();
        store.insert_player(cut);

        let roster = store.active_roster(team);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].last_name, "Adams");
        assert_eq!(roster[1].last_name, "Zimmer");
        // roster() still sees everyone
        assert_eq!(store.roster(team).len(), 3);
    }

    #[test]
    fn attach_contract_sets_active_reference_once() {
        let mut store = RosterStore::new();
        let team = store.insert_team(new_team("ARI"));
        let pid = store.insert_player(new_player(team, "ARI", "Holder"));

        let first = store.attach_contract(pid, contract()).unwrap();
        let second = store.attach_contract(pid, contract()).unwrap();
        assert_ne!(first, second);

        let player = store.player(pid).unwrap();
        assert_eq!(player.active_contract_id, Some(first));
        assert_eq!(player.active_contract().unwrap().id, first);
    }

    #[test]
    fn attach_contract_sorts_years() {
        use crate::model::ContractYear;
        let mut store = RosterStore::new();
        let team = store.insert_team(new_team("ARI"));
        let pid = store.insert_player(new_player(team, "ARI", "Holder"));

        let mut c = contract();
        c.years = vec![ContractYear::empty(2027), ContractYear::empty(2025)];
        store.attach_contract(pid, c).unwrap();

        let seasons: Vec<i32> = store.player(pid).unwrap().contracts[0]
            .years
            .iter()
            .map(|y| y.season)
            .collect();
        assert_eq!(seasons, vec![2025, 2027]);
    }

    #[test]
    fn restore_player_keeps_id_and_rejects_occupied() {
        let mut store = RosterStore::new();
        let team = store.insert_team(new_team("ARI"));
        let pid = store.insert_player(new_player(team, "ARI", "Gone"));

        let removed = store.remove_player(pid).unwrap();
        assert!(store.player(pid).is_none());
        assert!(store.restore_player(removed.clone()));
        assert_eq!(store.player(pid).unwrap(), &removed);
        // second restore hits the occupied id
        assert!(!store.restore_player(removed));
    }

    #[test]
    fn removing_a_team_cascades() {
        let mut store = RosterStore::new();
        let team = store.insert_team(new_team("ARI"));
        let other = store.insert_team(new_team("SEA"));
        let pid = store.insert_player(new_player(team, "ARI", "Casualty"));
        store.insert_player(new_player(other, "SEA", "Safe"));

        store.remove_team(team);
        assert!(store.player(pid).is_none());
        assert_eq!(store.roster(other).len(), 1);
    }

    #[test]
    fn transactions_are_assigned_sequential_ids() {
        let mut store = RosterStore::new();
        let team = store.insert_team(new_team("ARI"));
        let record = |store: &mut RosterStore| {
            let payload = TransactionRequest::Release {
                player_id: 1,
                post_june_1: false,
            };
            let preview = crate::model::Preview {
                team: "ARI".into(),
                kind: TransactionKind::Release,
                allowed: true,
                cap_limit: Amount::ZERO,
                total_cap: Amount::ZERO,
                cap_space_before: Amount::ZERO,
                cap_space_after: Amount::ZERO,
                cap_delta: Amount::ZERO,
                dead_money: Amount::ZERO,
                dead_money_future: Amount::ZERO,
                roster_delta: -1,
                roster_count_after: 0,
                notes: Vec::new(),
                payload: payload.clone(),
                partner: None,
            };
            store.insert_transaction(TransactionRecord {
                id: 0,
                team_id: team,
                team_code: "ARI".into(),
                kind: TransactionKind::Release,
                status: TransactionStatus::Committed,
                payload,
                result: TransactionResult {
                    preview,
                    undo: None,
                },
                cap_delta: Amount::ZERO,
                notes: String::new(),
                created_at: chrono::Utc::now(),
                executed_at: chrono::Utc::now(),
            })
        };
        let first = record(&mut store);
        let second = record(&mut store);
        assert_eq!(second, first + 1);
        assert_eq!(store.transactions_for(team).len(), 2);

        assert!(store.mark_undone(first));
        assert_eq!(
            store.transaction(first).unwrap().status,
            TransactionStatus::Undone
        );
        assert!(!store.mark_undone(999));
    }
}
