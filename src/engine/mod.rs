//! Transaction engine: preview, commit, and undo of roster moves.
//!
//! Previews are pure projections over the current roster; commit is the only
//! state-mutating step and re-validates identity right before it mutates, so
//! a preview computed against stale data fails instead of half-applying.

use chrono::Utc;
use tracing::info;

use crate::Amount;
use crate::cap;
use crate::config::LeagueConfig;
use crate::model::{
    Contract, ContractYear, Player, PlayerId, Preview, PartnerPreview, SignTerms, Team,
    TradeTerms, TransactionKind, TransactionRecord, TransactionRequest, TransactionResult,
    TransactionStatus, TxId, UndoSnapshot,
};
use crate::store::RosterStore;

mod error;
pub use error::DomainError;

pub(crate) mod preview;
pub use preview::TeamCapSummary;
use preview::CapLedger;

/// The cap/transaction engine over a roster store.
pub struct Engine {
    store: RosterStore,
    config: LeagueConfig,
}

/// Public API
impl Engine {
    pub fn new(store: RosterStore) -> Self {
        Self::with_config(store, LeagueConfig::default())
    }

    pub fn with_config(store: RosterStore, config: LeagueConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RosterStore {
        &mut self.store
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Project a transaction's cap/roster consequences without mutating
    /// anything. `allowed == false` is data, not an error.
    pub fn preview(
        &self,
        team_code: &str,
        request: &TransactionRequest,
    ) -> Result<Preview, DomainError> {
        match request {
            TransactionRequest::Release {
                player_id,
                post_june_1,
            } => self.preview_release(team_code, *player_id, *post_june_1),
            TransactionRequest::Sign(terms) => self.preview_sign(team_code, terms),
            TransactionRequest::Trade(terms) => self.preview_trade(team_code, terms),
        }
    }

    /// Apply a previewed transaction and log an immutable record.
    ///
    /// Committing a preview whose `allowed` flag is false fails with
    /// [`DomainError::RejectedByRules`].
    pub fn commit(&mut self, preview: &Preview) -> Result<TxId, DomainError> {
        let result = if !preview.allowed {
            Err(DomainError::RejectedByRules)
        } else {
            match preview.kind {
                TransactionKind::Release => self.commit_release(preview),
                TransactionKind::Sign => self.commit_sign(preview),
                TransactionKind::Trade => self.commit_trade(preview),
            }
        };
        match &result {
            Ok(tx) => info!(
                team = %preview.team,
                tx = %tx,
                kind = %preview.kind,
                cap_delta = %preview.cap_delta,
                "transaction committed"
            ),
            Err(e) => info!(
                team = %preview.team,
                kind = %preview.kind,
                reason = %e,
                "commit rejected"
            ),
        }
        result
    }

    /// Reverse a committed release, restoring the player and contract from
    /// the stored snapshot. Any other kind, or a second undo, fails fast.
    pub fn undo(&mut self, tx_id: TxId) -> Result<TxId, DomainError> {
        let record = self
            .store
            .transaction(tx_id)
            .ok_or(DomainError::TransactionNotFound(tx_id))?;
        if record.status == TransactionStatus::Undone {
            return Err(DomainError::AlreadyUndone(tx_id));
        }
        if record.kind != TransactionKind::Release {
            return Err(DomainError::UndoUnsupported(record.kind));
        }
        let Some(UndoSnapshot::Release { player }) = record.result.undo.clone() else {
            return Err(DomainError::MissingUndoSnapshot(tx_id));
        };

        let mut player = player;
        // Snapshots from imported data may lack roster metadata.
        if player.roster_date.is_none() {
            player.roster_date = Some(Utc::now().date_naive());
        }
        if player.roster_source.is_none() {
            player.roster_source = Some("Undo Restore".to_string());
        }

        let player_id = player.id;
        if !self.store.restore_player(player) {
            return Err(DomainError::RestoreConflict(player_id));
        }
        self.store.mark_undone(tx_id);
        info!(tx = %tx_id, player = %player_id, "release undone");
        Ok(tx_id)
    }

    /// Current cap table for the whole league, ordered by team code.
    pub fn league_summary(&self) -> Vec<TeamCapSummary> {
        self.store
            .teams()
            .into_iter()
            .map(|team| {
                let (ledger, players) = CapLedger::for_team(&self.store, &self.config, team);
                TeamCapSummary {
                    team: team.code.clone(),
                    display_name: team.display_name.clone(),
                    players: players.len(),
                    total_cap: ledger.total_cap,
                    cap_space: ledger.cap_space,
                }
            })
            .collect()
    }
}

/// Previews
impl Engine {
    pub fn preview_release(
        &self,
        team_code: &str,
        player_id: PlayerId,
        post_june_1: bool,
    ) -> Result<Preview, DomainError> {
        let team = self.team_by_code(team_code)?;
        let (ledger, players) = CapLedger::for_team(&self.store, &self.config, team);
        let player = players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(DomainError::PlayerNotOnTeam(player_id))?;

        let impact =
            cap::release_impact(player.active_contract(), self.config.cap_year, post_june_1);
        let cap_space_after = ledger.cap_space + impact.savings;

        let mut notes = vec![
            format!(
                "Releasing {} saves {} against the cap.",
                player.full_name(),
                impact.savings.usd()
            ),
            format!("Dead money this year: {}", impact.dead_money_current.usd()),
        ];
        if impact.dead_money_future.is_positive() {
            notes.push(format!(
                "Dead money next year: {}",
                impact.dead_money_future.usd()
            ));
        }
        if cap_space_after < Amount::ZERO {
            notes.push("Team would remain over the cap after this move.".to_string());
        }

        Ok(Preview {
            team: team.code.clone(),
            kind: TransactionKind::Release,
            allowed: impact.savings.is_positive(),
            cap_limit: ledger.cap_limit,
            total_cap: ledger.total_cap,
            cap_space_before: ledger.cap_space,
            cap_space_after,
            cap_delta: impact.savings,
            dead_money: impact.dead_money_current,
            dead_money_future: impact.dead_money_future,
            roster_delta: -1,
            roster_count_after: players.len() - 1,
            notes,
            payload: TransactionRequest::Release {
                player_id,
                post_june_1,
            },
            partner: None,
        })
    }

    pub fn preview_sign(
        &self,
        team_code: &str,
        terms: &SignTerms,
    ) -> Result<Preview, DomainError> {
        let team = self.team_by_code(team_code)?;
        let (ledger, players) = CapLedger::for_team(&self.store, &self.config, team);

        let cap_delta = -terms.apy;
        let cap_space_after = ledger.cap_space + cap_delta;
        let roster_count_after = players.len() + 1;
        let roster_limit = self.config.roster_limit;
        let allowed = cap_space_after >= Amount::ZERO && roster_count_after <= roster_limit;

        let mut notes = vec![
            format!(
                "Signing {} adds {} to the current cap.",
                terms.full_name,
                terms.apy.usd()
            ),
            format!("Guaranteed cash: {}", terms.guaranteed.usd()),
        ];
        if terms.signing_bonus.is_positive() {
            notes.push(format!(
                "Signing bonus of {} prorates over {} years.",
                terms.signing_bonus.usd(),
                terms.years.max(1).min(5)
            ));
        }
        if roster_count_after > roster_limit {
            notes.push(format!("Roster limit ({roster_limit}) exceeded."));
        }
        if cap_space_after < Amount::ZERO {
            notes.push("Team would be over the cap.".to_string());
        }

        Ok(Preview {
            team: team.code.clone(),
            kind: TransactionKind::Sign,
            allowed,
            cap_limit: ledger.cap_limit,
            total_cap: ledger.total_cap,
            cap_space_before: ledger.cap_space,
            cap_space_after,
            cap_delta,
            dead_money: Amount::ZERO,
            dead_money_future: Amount::ZERO,
            roster_delta: 1,
            roster_count_after,
            notes,
            payload: TransactionRequest::Sign(terms.clone()),
            partner: None,
        })
    }

    pub fn preview_trade(
        &self,
        team_code: &str,
        terms: &TradeTerms,
    ) -> Result<Preview, DomainError> {
        let team = self.team_by_code(team_code)?;
        let partner = self.team_by_code(&terms.partner_team_code)?;
        let (ledger, players) = CapLedger::for_team(&self.store, &self.config, team);
        let (partner_ledger, partner_players) =
            CapLedger::for_team(&self.store, &self.config, partner);

        let send_players: Vec<&Player> = players
            .iter()
            .filter(|p| terms.send_player_ids.contains(&p.id))
            .copied()
            .collect();
        let receive_players: Vec<&Player> = partner_players
            .iter()
            .filter(|p| terms.receive_player_ids.contains(&p.id))
            .copied()
            .collect();
        if send_players.len() != terms.send_player_ids.len() {
            return Err(DomainError::TradePlayersMissing {
                side: "outgoing",
                team: team.code.clone(),
            });
        }
        if receive_players.len() != terms.receive_player_ids.len() {
            return Err(DomainError::TradePlayersMissing {
                side: "incoming",
                team: partner.code.clone(),
            });
        }

        let cap_year = self.config.cap_year;
        let outgoing_savings: Amount = send_players
            .iter()
            .map(|p| cap::release_impact(p.active_contract(), cap_year, terms.post_june_1).savings)
            .sum();
        let incoming_cap: Amount = receive_players
            .iter()
            .map(|p| cap::cap_hit(p.active_contract(), cap_year))
            .sum();
        let cap_delta = outgoing_savings - incoming_cap;
        let cap_space_after = ledger.cap_space + cap_delta;
        let roster_delta = receive_players.len() as i64 - send_players.len() as i64;
        let roster_count_after = players.len() + receive_players.len() - send_players.len();

        // Mirrored math from the partner's side of the table.
        let partner_outgoing: Amount = receive_players
            .iter()
            .map(|p| cap::release_impact(p.active_contract(), cap_year, terms.post_june_1).savings)
            .sum();
        let partner_incoming: Amount = send_players
            .iter()
            .map(|p| cap::cap_hit(p.active_contract(), cap_year))
            .sum();
        let partner_cap_delta = partner_outgoing - partner_incoming;
        let partner_cap_space_after = partner_ledger.cap_space + partner_cap_delta;
        let partner_roster_after =
            partner_players.len() + send_players.len() - receive_players.len();

        // Cap space only gates the side(s) losing space; a trade that helps
        // both caps is always allowed. Fairness is the market's concern.
        let roster_limit = self.config.roster_limit;
        let mut allowed = true;
        if roster_count_after > roster_limit || partner_roster_after > roster_limit {
            allowed = false;
        }
        if cap_delta < Amount::ZERO && cap_space_after < Amount::ZERO {
            allowed = false;
        }
        if partner_cap_delta < Amount::ZERO && partner_cap_space_after < Amount::ZERO {
            allowed = false;
        }

        let mut notes = vec![
            format!("Outgoing savings: {}", outgoing_savings.usd()),
            format!("Incoming cap hits: {}", incoming_cap.usd()),
        ];
        if !allowed {
            notes.push("Either team would violate cap or roster constraints.".to_string());
        }

        Ok(Preview {
            team: team.code.clone(),
            kind: TransactionKind::Trade,
            allowed,
            cap_limit: ledger.cap_limit,
            total_cap: ledger.total_cap,
            cap_space_before: ledger.cap_space,
            cap_space_after,
            cap_delta,
            dead_money: Amount::ZERO,
            dead_money_future: Amount::ZERO,
            roster_delta,
            roster_count_after,
            notes,
            payload: TransactionRequest::Trade(terms.clone()),
            partner: Some(PartnerPreview {
                team: partner.code.clone(),
                cap_space_before: partner_ledger.cap_space,
                cap_space_after: partner_cap_space_after,
                cap_delta: partner_cap_delta,
                roster_delta: -roster_delta,
                roster_count_after: partner_roster_after,
            }),
        })
    }
}

/// Commits
impl Engine {
    fn team_by_code(&self, code: &str) -> Result<&Team, DomainError> {
        self.store
            .team_by_code(code)
            .ok_or_else(|| DomainError::TeamNotFound(code.to_uppercase()))
    }

    fn record_from(&self, team: &Team, preview: &Preview, undo: Option<UndoSnapshot>) -> TransactionRecord {
        let now = Utc::now();
        TransactionRecord {
            id: 0,
            team_id: team.id,
            team_code: team.code.clone(),
            kind: preview.kind,
            status: TransactionStatus::Committed,
            payload: preview.payload.clone(),
            result: TransactionResult {
                preview: preview.clone(),
                undo,
            },
            cap_delta: preview.cap_delta,
            notes: preview.notes.join("; "),
            created_at: now,
            executed_at: now,
        }
    }

    fn commit_release(&mut self, preview: &Preview) -> Result<TxId, DomainError> {
        let TransactionRequest::Release { player_id, .. } = preview.payload else {
            return Err(DomainError::MalformedPayload);
        };
        let team = self.team_by_code(&preview.team)?.clone();
        // Re-resolve by id: the preview may be stale.
        let player = self
            .store
            .player(player_id)
            .filter(|p| p.team_id == team.id)
            .ok_or_else(|| DomainError::StalePlayer {
                name: format!("Player {player_id}"),
                team: team.code.clone(),
            })?;

        let snapshot = UndoSnapshot::Release {
            player: player.clone(),
        };
        self.store.remove_player(player_id);
        let record = self.record_from(&team, preview, Some(snapshot));
        Ok(self.store.insert_transaction(record))
    }

    fn commit_sign(&mut self, preview: &Preview) -> Result<TxId, DomainError> {
        let TransactionRequest::Sign(terms) = &preview.payload else {
            return Err(DomainError::MalformedPayload);
        };
        let terms = terms.clone();
        let team = self.team_by_code(&preview.team)?.clone();

        let today = Utc::now().date_naive();
        let (first_name, last_name) = split_name(&terms.full_name);
        let player = Player {
            id: 0,
            // Date + epoch keeps synthetic ids unique across a session.
            external_id: format!("fa-{}-{}", today.format("%Y%m%d"), Utc::now().timestamp()),
            team_id: team.id,
            team_code: team.code.clone(),
            first_name,
            last_name,
            position: terms.position.clone(),
            jersey_number: None,
            status: "active".to_string(),
            height: None,
            weight: None,
            birthdate: None,
            college: None,
            experience: 0,
            roster_date: Some(today),
            roster_source: Some("Manual Entry".to_string()),
            active_contract_id: None,
            contracts: Vec::new(),
        };
        let player_id = self.store.insert_player(player);

        let years = terms.years.max(1) as i64;
        let contract = Contract {
            id: 0,
            source: "Manual Entry".to_string(),
            source_url: None,
            signed_date: Some(today),
            total_value: terms.apy.times(years),
            guaranteed: terms.guaranteed,
            average_per_year: terms.apy,
            notes: None,
            years: build_contract_years(&terms, self.config.cap_year),
        };
        self.store.attach_contract(player_id, contract);

        let record = self.record_from(&team, preview, None);
        Ok(self.store.insert_transaction(record))
    }

    fn commit_trade(&mut self, preview: &Preview) -> Result<TxId, DomainError> {
        let TransactionRequest::Trade(terms) = &preview.payload else {
            return Err(DomainError::MalformedPayload);
        };
        let terms = terms.clone();
        let team = self.team_by_code(&preview.team)?.clone();
        let partner = self.team_by_code(&terms.partner_team_code)?.clone();

        // Phase one: every player must still be where the preview saw it.
        // Nothing moves until the whole package validates.
        for (ids, expected) in [
            (&terms.send_player_ids, &team),
            (&terms.receive_player_ids, &partner),
        ] {
            for &id in ids.iter() {
                let player = self.store.player(id).ok_or(DomainError::StalePlayer {
                    name: format!("Player {id}"),
                    team: expected.code.clone(),
                })?;
                if player.team_id != expected.id {
                    return Err(DomainError::StalePlayer {
                        name: player.full_name(),
                        team: expected.code.clone(),
                    });
                }
            }
        }

        for &id in &terms.send_player_ids {
            self.store.reassign_player(id, &partner);
        }
        for &id in &terms.receive_player_ids {
            self.store.reassign_player(id, &team);
        }

        let record = self.record_from(&team, preview, None);
        Ok(self.store.insert_transaction(record))
    }
}

fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    match parts.next() {
        None => ("Player".to_string(), "Unknown".to_string()),
        Some(first) => {
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                (first.to_string(), "Unknown".to_string())
            } else {
                (first.to_string(), rest.join(" "))
            }
        }
    }
}

/// Generate the per-season breakdown for a fresh signing.
///
/// The signing bonus prorates over at most five years; roster and workout
/// bonuses land in year 0. The guarantee is consumed against each year's
/// cash, with `rolling_guarantee` recording the balance entering the year.
fn build_contract_years(terms: &SignTerms, cap_year: i32) -> Vec<ContractYear> {
    let years = terms.years.max(1) as i64;
    let proration_window = years.min(5);
    let signing_proration = if terms.signing_bonus.is_positive() {
        terms.signing_bonus.divide(proration_window)
    } else {
        Amount::ZERO
    };

    let mut remaining_guarantee = terms.guaranteed;
    let mut rows = Vec::with_capacity(years as usize);
    for index in 0..years {
        let in_window = index < proration_window;
        let proration = if in_window { signing_proration } else { Amount::ZERO };
        let roster_bonus = if index == 0 { terms.roster_bonus } else { Amount::ZERO };
        let workout_bonus = if index == 0 { terms.workout_bonus } else { Amount::ZERO };
        let base_salary = (terms.apy - proration - roster_bonus - workout_bonus).max(Amount::ZERO);
        let cap_hit = base_salary + proration + roster_bonus + workout_bonus;
        let mut cash = base_salary + roster_bonus + workout_bonus;
        if index == 0 {
            cash += terms.signing_bonus;
        }
        let guarantee_for_year = remaining_guarantee.min(cash);
        let rolling = remaining_guarantee;
        remaining_guarantee = (remaining_guarantee - guarantee_for_year).max(Amount::ZERO);

        rows.push(ContractYear {
            season: cap_year + index as i32,
            base_salary,
            signing_proration: proration,
            roster_bonus,
            workout_bonus,
            other_bonus: Amount::ZERO,
            cap_hit,
            cash,
            guaranteed: guarantee_for_year,
            rolling_guarantee: rolling,
            is_void_year: false,
        });
    }
    rows
}
