//! Roster dataset loading.
//!
//! A league lives in a single JSON file: teams, their players, and each
//! player's contracts with per-season breakdowns. Loading builds a fresh
//! [`RosterStore`] with store-assigned ids, so files never carry ids.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::Amount;
use crate::config::Season;
use crate::model::{Contract, ContractYear, Player};
use crate::store::{NewTeam, RosterStore};

/// Errors raised while loading reference data from disk.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset missing at {path}")]
    Missing { path: String },

    #[error("contract for {player} repeats season {season}")]
    DuplicateSeason { player: String, season: Season },
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    teams: Vec<TeamEntry>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    code: String,
    display_name: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    players: Vec<PlayerEntry>,
}

#[derive(Debug, Deserialize)]
struct PlayerEntry {
    external_id: String,
    first_name: String,
    last_name: String,
    position: String,
    #[serde(default)]
    jersey_number: Option<u8>,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default)]
    height: Option<String>,
    #[serde(default)]
    weight: Option<u32>,
    #[serde(default)]
    birthdate: Option<NaiveDate>,
    #[serde(default)]
    college: Option<String>,
    #[serde(default)]
    experience: u8,
    #[serde(default)]
    roster_date: Option<NaiveDate>,
    #[serde(default)]
    roster_source: Option<String>,
    #[serde(default)]
    contracts: Vec<ContractEntry>,
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Deserialize)]
struct ContractEntry {
    #[serde(default = "default_source")]
    source: String,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    signed_date: Option<NaiveDate>,
    #[serde(default)]
    total_value: Amount,
    #[serde(default)]
    guaranteed: Amount,
    #[serde(default)]
    average_per_year: Amount,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    years: Vec<YearEntry>,
}

fn default_source() -> String {
    "Import".to_string()
}

#[derive(Debug, Deserialize)]
struct YearEntry {
    season: Season,
    #[serde(default)]
    base_salary: Amount,
    #[serde(default)]
    signing_proration: Amount,
    #[serde(default)]
    roster_bonus: Amount,
    #[serde(default)]
    workout_bonus: Amount,
    #[serde(default)]
    other_bonus: Amount,
    #[serde(default)]
    cap_hit: Amount,
    #[serde(default)]
    cash: Amount,
    #[serde(default)]
    guaranteed: Amount,
    #[serde(default)]
    rolling_guarantee: Amount,
    #[serde(default)]
    is_void_year: bool,
}

/// Load a league from a roster JSON file into a fresh store.
pub fn load_roster(path: impl AsRef<Path>) -> Result<RosterStore, DatasetError> {
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
    let file: RosterFile = serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let mut store = RosterStore::new();
    for team_entry in file.teams {
        let team_code = team_entry.code.to_uppercase();
        let team_id = store.insert_team(NewTeam {
            code: team_entry.code,
            display_name: team_entry.display_name,
            location: team_entry.location,
            nickname: team_entry.nickname,
        });
        for player_entry in team_entry.players {
            let full_name = format!("{} {}", player_entry.first_name, player_entry.last_name);
            let player_id = store.insert_player(Player {
                id: 0,
                external_id: player_entry.external_id,
                team_id,
                team_code: team_code.clone(),
                first_name: player_entry.first_name,
                last_name: player_entry.last_name,
                position: player_entry.position,
                jersey_number: player_entry.jersey_number,
                status: player_entry.status,
                height: player_entry.height,
                weight: player_entry.weight,
                birthdate: player_entry.birthdate,
                college: player_entry.college,
                experience: player_entry.experience,
                roster_date: player_entry.roster_date,
                roster_source: player_entry.roster_source,
                active_contract_id: None,
                contracts: Vec::new(),
            });
            for contract_entry in player_entry.contracts {
                let mut seasons = Vec::with_capacity(contract_entry.years.len());
                let years: Vec<ContractYear> = contract_entry
                    .years
                    .into_iter()
                    .map(|y| ContractYear {
                        season: y.season,
                        base_salary: y.base_salary,
                        signing_proration: y.signing_proration,
                        roster_bonus: y.roster_bonus,
                        workout_bonus: y.workout_bonus,
                        other_bonus: y.other_bonus,
                        cap_hit: y.cap_hit,
                        cash: y.cash,
                        guaranteed: y.guaranteed,
                        rolling_guarantee: y.rolling_guarantee,
                        is_void_year: y.is_void_year,
                    })
                    .collect();
                for year in &years {
                    if seasons.contains(&year.season) {
                        return Err(DatasetError::DuplicateSeason {
                            player: full_name.clone(),
                            season: year.season,
                        });
                    }
                    seasons.push(year.season);
                }
                store.attach_contract(
                    player_id,
                    Contract {
                        id: 0,
                        source: contract_entry.source,
                        source_url: contract_entry.source_url,
                        signed_date: contract_entry.signed_date,
                        total_value: contract_entry.total_value,
                        guaranteed: contract_entry.guaranteed,
                        average_per_year: contract_entry.average_per_year,
                        notes: contract_entry.notes,
                        years,
                    },
                );
            }
        }
    }
    info!(
        path = %path.display(),
        teams = store.teams().len(),
        players = store.player_count(),
        "roster dataset loaded"
    );
    Ok(store)
}
