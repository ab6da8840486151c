pub mod amount;
pub mod cap;
pub mod config;
pub mod csv;
pub mod dataset;
pub mod engine;
pub mod market;
pub mod model;
pub mod store;

pub use amount::Amount;
pub use config::{LeagueConfig, Season};
pub use engine::{DomainError, Engine};
pub use model::{Preview, TransactionKind, TransactionRequest, TxId};
pub use store::RosterStore;
