//! Read-only reference datasets: the free-agent board and prospect board.
//!
//! Loaded once at startup from JSON and injected into the evaluator; never
//! mutated at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Amount;
use crate::dataset::DatasetError;

/// A free agent available to sign, with negotiation preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeAgentProfile {
    pub id: String,
    pub name: String,
    pub position: String,
    pub age: Option<u8>,
    pub market_value: Option<Amount>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub preferred_roles: Vec<String>,
    pub last_team: Option<String>,
    /// Acceptable contract lengths, shortest to longest.
    #[serde(default)]
    pub preferred_years: Vec<u32>,
    #[serde(default)]
    pub scheme_fits: Vec<String>,
}

/// The free-agent pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeAgentBoard {
    #[serde(default)]
    pub free_agents: Vec<FreeAgentProfile>,
}

impl FreeAgentBoard {
    /// Load the board from a JSON file. A missing file yields an empty
    /// board; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn profile(&self, id: &str) -> Option<&FreeAgentProfile> {
        self.free_agents.iter().find(|p| p.id == id)
    }

    /// Market values across the pool, for median-relative value scoring.
    pub fn market_values(&self) -> Vec<Amount> {
        self.free_agents
            .iter()
            .filter_map(|p| p.market_value)
            .filter(|v| v.is_positive())
            .collect()
    }
}

/// A draft prospect on the scouting board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub name: String,
    pub position: String,
    pub grade: f64,
    pub school: Option<String>,
    pub projected_round: Option<u8>,
}

/// The scouting board, graded best-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProspectBoard {
    #[serde(default)]
    pub prospects: Vec<Prospect>,
}

impl ProspectBoard {
    /// Load the board from a JSON file. Unlike the free-agent board, a
    /// missing prospect file is an error: nothing downstream can proceed
    /// without it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::Missing {
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Prospects ordered by grade, best first.
    pub fn ranked(&self) -> Vec<&Prospect> {
        let mut ranked: Vec<&Prospect> = self.prospects.iter().collect();
        ranked.sort_by(|a, b| b.grade.total_cmp(&a.grade));
        ranked
    }
}
