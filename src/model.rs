//! Core domain types for the cap and transaction engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Amount;
use crate::config::Season;

/// Team identifier.
pub type TeamId = u32;

/// Player identifier.
pub type PlayerId = u32;

/// Contract identifier.
pub type ContractId = u32;

/// Transaction identifier.
pub type TxId = u64;

/// Roster statuses that do not count toward the active roster.
pub const EXCLUDED_ROSTER_STATUSES: [&str; 2] = ["released", "retired"];

/// A franchise. Identity (`code`) is immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Unique uppercase abbreviation, e.g. "ARI".
    pub code: String,
    pub display_name: String,
    pub location: Option<String>,
    pub nickname: Option<String>,
}

/// A player on some team's roster, with contracts eagerly embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub external_id: String,
    pub team_id: TeamId,
    pub team_code: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub jersey_number: Option<u8>,
    pub status: String,
    pub height: Option<String>,
    pub weight: Option<u32>,
    pub birthdate: Option<NaiveDate>,
    pub college: Option<String>,
    pub experience: u8,
    pub roster_date: Option<NaiveDate>,
    pub roster_source: Option<String>,
    /// Which contract is authoritative for cap purposes. Set when the first
    /// contract is attached; resolution falls back to insertion order.
    pub active_contract_id: Option<ContractId>,
    pub contracts: Vec<Contract>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this player counts toward the active roster.
    pub fn counts_toward_roster(&self) -> bool {
        let status = self.status.to_lowercase();
        !EXCLUDED_ROSTER_STATUSES.contains(&status.as_str())
    }

    /// The contract used for cap math: the one referenced by
    /// `active_contract_id`, else the first in insertion order.
    pub fn active_contract(&self) -> Option<&Contract> {
        match self.active_contract_id {
            Some(id) => self
                .contracts
                .iter()
                .find(|c| c.id == id)
                .or_else(|| self.contracts.first()),
            None => self.contracts.first(),
        }
    }
}

/// Top-level contract terms; per-season breakdown lives in `years`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub source: String,
    pub source_url: Option<String>,
    pub signed_date: Option<NaiveDate>,
    pub total_value: Amount,
    pub guaranteed: Amount,
    pub average_per_year: Amount,
    pub notes: Option<String>,
    /// Season-sorted, seasons unique within the contract.
    pub years: Vec<ContractYear>,
}

/// Per-season breakdown of a contract. All money fields non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractYear {
    pub season: Season,
    pub base_salary: Amount,
    pub signing_proration: Amount,
    pub roster_bonus: Amount,
    pub workout_bonus: Amount,
    pub other_bonus: Amount,
    /// Explicit cap hit; when zero the engine derives base + proration + bonuses.
    pub cap_hit: Amount,
    pub cash: Amount,
    pub guaranteed: Amount,
    /// Guarantee balance outstanding entering this season.
    pub rolling_guarantee: Amount,
    pub is_void_year: bool,
}

impl ContractYear {
    /// A year with every monetary field zeroed.
    pub fn empty(season: Season) -> Self {
        Self {
            season,
            base_salary: Amount::ZERO,
            signing_proration: Amount::ZERO,
            roster_bonus: Amount::ZERO,
            workout_bonus: Amount::ZERO,
            other_bonus: Amount::ZERO,
            cap_hit: Amount::ZERO,
            cash: Amount::ZERO,
            guaranteed: Amount::ZERO,
            rolling_guarantee: Amount::ZERO,
            is_void_year: false,
        }
    }
}

/// The kind of roster move a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Release,
    Sign,
    Trade,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Release => f.write_str("release"),
            TransactionKind::Sign => f.write_str("sign"),
            TransactionKind::Trade => f.write_str("trade"),
        }
    }
}

/// Lifecycle of a committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Committed,
    Undone,
}

/// Offer terms for a free-agent signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignTerms {
    pub full_name: String,
    pub position: String,
    pub apy: Amount,
    pub guaranteed: Amount,
    pub years: u32,
    pub signing_bonus: Amount,
    pub roster_bonus: Amount,
    pub workout_bonus: Amount,
}

/// Player packages exchanged in a trade, from the initiating team's view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTerms {
    pub send_player_ids: Vec<PlayerId>,
    pub receive_player_ids: Vec<PlayerId>,
    pub partner_team_code: String,
    pub post_june_1: bool,
}

/// Type-tagged transaction input: the payload previews and commits accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionRequest {
    Release {
        player_id: PlayerId,
        post_june_1: bool,
    },
    Sign(SignTerms),
    Trade(TradeTerms),
}

impl TransactionRequest {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionRequest::Release { .. } => TransactionKind::Release,
            TransactionRequest::Sign(_) => TransactionKind::Sign,
            TransactionRequest::Trade(_) => TransactionKind::Trade,
        }
    }
}

/// Pure projection of a transaction's cap and roster consequences.
///
/// `allowed` is advisory: previews surface infeasibility as data, and the
/// commit path is where a disallowed move becomes a hard error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub team: String,
    pub kind: TransactionKind,
    pub allowed: bool,
    pub cap_limit: Amount,
    pub total_cap: Amount,
    pub cap_space_before: Amount,
    pub cap_space_after: Amount,
    pub cap_delta: Amount,
    pub dead_money: Amount,
    pub dead_money_future: Amount,
    pub roster_delta: i64,
    pub roster_count_after: usize,
    pub notes: Vec<String>,
    pub payload: TransactionRequest,
    /// Mirrored consequences for the partner team; trades only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerPreview>,
}

/// The partner side of a bilateral trade preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerPreview {
    pub team: String,
    pub cap_space_before: Amount,
    pub cap_space_after: Amount,
    pub cap_delta: Amount,
    pub roster_delta: i64,
    pub roster_count_after: usize,
}

/// State captured at commit time so the move can be reversed.
///
/// Only releases are reversible; other kinds fail fast on undo rather than
/// attempting a generic inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UndoSnapshot {
    Release {
        /// Full field-for-field capture, contracts included.
        player: Player,
    },
}

/// What a commit produced: the preview it honored plus any undo state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub preview: Preview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo: Option<UndoSnapshot>,
}

/// Immutable log entry written by a successful commit.
///
/// Never deleted; the only permitted mutation is the status flip on undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TxId,
    pub team_id: TeamId,
    pub team_code: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub payload: TransactionRequest,
    pub result: TransactionResult,
    pub cap_delta: Amount,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
}
