//! The caller-facing error taxonomy.

use thiserror::Error;

use crate::model::{PlayerId, TransactionKind, TxId};

/// Recoverable domain error surfaced to callers verbatim.
///
/// This is the only error kind the core raises. An infeasible preview is
/// *not* an error — it comes back as `allowed = false` — but forcing a
/// commit of one is, via [`DomainError::RejectedByRules`].
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("team '{0}' not found")]
    TeamNotFound(String),

    #[error("player {0} not found on the specified team")]
    PlayerNotOnTeam(PlayerId),

    #[error("{name} no longer on {team}")]
    StalePlayer { name: String, team: String },

    #[error("one or more {side} players not found on {team}")]
    TradePlayersMissing { side: &'static str, team: String },

    #[error("transaction {0} not found")]
    TransactionNotFound(TxId),

    #[error("transaction {0} already undone")]
    AlreadyUndone(TxId),

    #[error("undo supported only for releases, not {0}")]
    UndoUnsupported(TransactionKind),

    #[error("transaction {0} missing undo snapshot")]
    MissingUndoSnapshot(TxId),

    #[error("player {0} already back on a roster; release cannot be undone twice")]
    RestoreConflict(PlayerId),

    #[error("transaction rejected by cap/roster rules")]
    RejectedByRules,

    #[error("preview payload does not match its transaction type")]
    MalformedPayload,

    #[error("unknown free-agent profile '{0}'")]
    UnknownFreeAgent(String),
}
