//! Market evaluator: roster-fit and value heuristics layered on the engine.
//!
//! Scores are floating point by design — they carry no ledger invariants.
//! Feasibility always comes from an engine preview, and an accepted offer
//! commits through the engine like any other transaction.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::Amount;
use crate::cap;
use crate::engine::preview::CapLedger;
use crate::engine::{DomainError, Engine};
use crate::model::{Player, PlayerId, SignTerms, TradeTerms, TransactionKind, TxId};

mod board;
pub use board::{FreeAgentBoard, FreeAgentProfile, Prospect, ProspectBoard};

/// Ideal depth-chart size per position; anything unknown gets the default.
pub fn desired_depth(position: &str) -> u32 {
    match position.to_uppercase().as_str() {
        "QB" => 3,
        "RB" => 5,
        "WR" => 9,
        "TE" => 4,
        "OT" => 4,
        "G" => 4,
        "C" => 2,
        "DL" => 6,
        "EDGE" => 6,
        "LB" => 6,
        "CB" => 8,
        "S" => 5,
        "K" | "P" | "LS" => 1,
        _ => 4,
    }
}

/// An offer extended to a free agent on the board.
#[derive(Debug, Clone)]
pub struct FreeAgentOffer {
    pub team_code: String,
    pub free_agent_id: String,
    pub apy: Amount,
    pub years: u32,
    pub signing_bonus: Amount,
    pub roster_bonus: Amount,
    pub workout_bonus: Amount,
}

/// A trade proposed to a partner franchise.
#[derive(Debug, Clone)]
pub struct TradeOffer {
    pub team_code: String,
    pub partner_team_code: String,
    pub send_player_ids: Vec<PlayerId>,
    pub receive_player_ids: Vec<PlayerId>,
    pub post_june_1: bool,
}

/// The counterparty's response when an offer is declined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CounterOffer {
    /// Revised contract terms a free agent would entertain.
    Contract {
        apy: Amount,
        years: u32,
        signing_bonus: Amount,
    },
    /// A trade needs rebalancing rather than new terms.
    Rebalance { request: String },
}

/// Outcome of an offer evaluation. On accept, the committed transaction id
/// is attached; on decline, a counter-offer is.
#[derive(Debug, Clone, Serialize)]
pub struct OfferOutcome {
    pub accepted: bool,
    pub kind: TransactionKind,
    pub notes: Vec<String>,
    pub cap_space_after: Amount,
    pub counter: Option<CounterOffer>,
    pub transaction: Option<TxId>,
}

/// A free agent annotated with team-relative scores.
#[derive(Debug, Clone, Serialize)]
pub struct FreeAgentListing {
    pub profile: FreeAgentProfile,
    pub fit_score: u32,
    pub contender_score: u32,
    pub value_score: f64,
    pub notes: Vec<String>,
}

/// A player elsewhere in the league worth calling about.
#[derive(Debug, Clone, Serialize)]
pub struct TradeTarget {
    pub player_id: PlayerId,
    pub name: String,
    pub position: String,
    pub team_code: String,
    pub team_display_name: String,
    pub cap_hit: Amount,
    pub years_remaining: u32,
    pub fit_score: u32,
    pub availability_score: u32,
    pub contender_score: u32,
    pub notes: Vec<String>,
}

/// Negotiation heuristics over an injected, immutable free-agent board.
pub struct MarketEvaluator {
    board: FreeAgentBoard,
}

impl MarketEvaluator {
    pub fn new(board: FreeAgentBoard) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &FreeAgentBoard {
        &self.board
    }

    /// The free-agent pool scored for one team's roster and cap position.
    pub fn list_free_agents(
        &self,
        engine: &Engine,
        team_code: &str,
    ) -> Result<Vec<FreeAgentListing>, DomainError> {
        let team = engine
            .store()
            .team_by_code(team_code)
            .ok_or_else(|| DomainError::TeamNotFound(team_code.to_uppercase()))?;
        let (ledger, players) = CapLedger::for_team(engine.store(), engine.config(), team);
        let counts = position_counts(&players);
        let pool = self.board.market_values();
        let contender = contender_score(ledger.total_cap, ledger.cap_space, ledger.cap_limit);

        Ok(self
            .board
            .free_agents
            .iter()
            .map(|profile| {
                let desired = desired_depth(&profile.position);
                let have = counts.get(&profile.position).copied().unwrap_or(0);
                FreeAgentListing {
                    profile: profile.clone(),
                    fit_score: fit_score(&counts, &profile.position),
                    contender_score: contender,
                    value_score: value_score(
                        profile.market_value.unwrap_or(Amount::ZERO),
                        &pool,
                    ),
                    notes: vec![
                        format!(
                            "{} carries {have}/{desired} ideal {} bodies.",
                            team.code, profile.position
                        ),
                        format!("Cap space available: {}.", ledger.cap_space.usd()),
                    ],
                }
            })
            .collect())
    }

    /// Scan every other roster for players worth targeting, ranked by
    /// fit plus availability.
    pub fn list_trade_targets(
        &self,
        engine: &Engine,
        team_code: &str,
        limit: usize,
    ) -> Result<Vec<TradeTarget>, DomainError> {
        let store = engine.store();
        let config = engine.config();
        let target_team = store
            .team_by_code(team_code)
            .ok_or_else(|| DomainError::TeamNotFound(team_code.to_uppercase()))?;
        let (_, target_players) = CapLedger::for_team(store, config, target_team);
        let target_counts = position_counts(&target_players);

        let mut entries = Vec::new();
        for team in store.teams() {
            if team.id == target_team.id {
                continue;
            }
            let (ledger, roster) = CapLedger::for_team(store, config, team);
            let partner_counts = position_counts(&roster);
            let contender = contender_score(ledger.total_cap, ledger.cap_space, ledger.cap_limit);
            for player in roster {
                let contract = player.active_contract();
                let cap_hit = cap::cap_hit(contract, config.cap_year);
                if !cap_hit.is_positive() {
                    continue;
                }
                let desired = desired_depth(&player.position);
                let depth = partner_counts.get(&player.position).copied().unwrap_or(0);
                let surplus = depth.saturating_sub(desired);
                // Cap-strapped teams shop harder.
                let cap_pressure = (-ledger.cap_space).max(Amount::ZERO).to_float() / 2_000_000.0;
                let availability_score =
                    (35.0 + surplus as f64 * 8.0 + cap_pressure).min(95.0) as u32;
                let years_remaining = contract
                    .map(|c| {
                        c.years
                            .iter()
                            .map(|y| y.season - config.cap_year + 1)
                            .max()
                            .unwrap_or(0)
                            .max(0) as u32
                    })
                    .unwrap_or(0);
                entries.push(TradeTarget {
                    player_id: player.id,
                    name: player.full_name(),
                    position: player.position.clone(),
                    team_code: team.code.clone(),
                    team_display_name: team.display_name.clone(),
                    cap_hit,
                    years_remaining,
                    fit_score: fit_score(&target_counts, &player.position),
                    availability_score,
                    contender_score: contender,
                    notes: vec![
                        format!(
                            "{} depth at {}: {depth}/{desired}.",
                            team.code, player.position
                        ),
                        format!(
                            "Cap space after move could reach {}.",
                            (ledger.cap_space + cap_hit).usd()
                        ),
                    ],
                });
            }
        }
        entries.sort_by_key(|e| std::cmp::Reverse(e.fit_score + e.availability_score));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Decide whether a free agent takes an offer; commit the signing when
    /// they do, counter when they do not.
    pub fn evaluate_free_agent_offer(
        &self,
        engine: &mut Engine,
        offer: &FreeAgentOffer,
    ) -> Result<OfferOutcome, DomainError> {
        let profile = self
            .board
            .profile(&offer.free_agent_id)
            .ok_or_else(|| DomainError::UnknownFreeAgent(offer.free_agent_id.clone()))?
            .clone();
        let team = engine
            .store()
            .team_by_code(&offer.team_code)
            .ok_or_else(|| DomainError::TeamNotFound(offer.team_code.to_uppercase()))?;
        let (ledger, players) = CapLedger::for_team(engine.store(), engine.config(), team);
        let counts = position_counts(&players);

        let fit = fit_score(&counts, &profile.position);
        let contender = contender_score(ledger.total_cap, ledger.cap_space, ledger.cap_limit);
        let market_value = profile
            .market_value
            .filter(|v| v.is_positive())
            .unwrap_or(offer.apy);
        let value_ratio = if market_value.is_positive() {
            offer.apy.to_float() / market_value.to_float()
        } else {
            1.0
        };
        let min_years = profile.preferred_years.first().copied().unwrap_or(3);
        let max_years = profile.preferred_years.last().copied().unwrap_or(4);
        let within_years = (min_years..=max_years).contains(&offer.years);

        let interest = interest_score(value_ratio, fit, contender, within_years);

        let bonuses = offer.signing_bonus + offer.roster_bonus + offer.workout_bonus;
        let guaranteed = if bonuses.is_positive() {
            bonuses
        } else {
            offer.apy.scale(0.4)
        };
        let preview = engine.preview_sign(
            &offer.team_code,
            &SignTerms {
                full_name: profile.name.clone(),
                position: profile.position.clone(),
                apy: offer.apy,
                guaranteed,
                years: offer.years,
                signing_bonus: offer.signing_bonus,
                roster_bonus: offer.roster_bonus,
                workout_bonus: offer.workout_bonus,
            },
        )?;
        let mut notes = preview.notes.clone();

        let accepted = interest >= 0.95 && preview.allowed;
        info!(
            free_agent = %profile.name,
            team = %preview.team,
            interest = format!("{interest:.2}"),
            accepted,
            "free-agent offer evaluated"
        );
        if !accepted {
            if !preview.allowed {
                notes.push("Cap or roster limits block this contract.".to_string());
            }
            let counter = CounterOffer::Contract {
                apy: market_value
                    .scale(0.97)
                    .max(market_value)
                    .round_to_dollars(10_000),
                years: max_years,
                signing_bonus: offer.signing_bonus.max(market_value.scale(0.3)),
            };
            return Ok(OfferOutcome {
                accepted: false,
                kind: TransactionKind::Sign,
                notes,
                cap_space_after: preview.cap_space_after,
                counter: Some(counter),
                transaction: None,
            });
        }

        let transaction = engine.commit(&preview)?;
        notes.push(format!(
            "{} accepted a {}-year offer averaging {}.",
            profile.name,
            offer.years,
            offer.apy.usd()
        ));
        Ok(OfferOutcome {
            accepted: true,
            kind: TransactionKind::Sign,
            notes,
            cap_space_after: preview.cap_space_after,
            counter: None,
            transaction: Some(transaction),
        })
    }

    /// Decide whether a simulated partner takes a trade: the preview must
    /// be feasible and the cap-value exchange close enough to even.
    pub fn evaluate_trade_offer(
        &self,
        engine: &mut Engine,
        offer: &TradeOffer,
    ) -> Result<OfferOutcome, DomainError> {
        let preview = engine.preview_trade(
            &offer.team_code,
            &TradeTerms {
                send_player_ids: offer.send_player_ids.clone(),
                receive_player_ids: offer.receive_player_ids.clone(),
                partner_team_code: offer.partner_team_code.clone(),
                post_june_1: offer.post_june_1,
            },
        )?;

        let own = preview.cap_delta.to_float().abs();
        let partner_delta = preview
            .partner
            .as_ref()
            .map(|p| p.cap_delta.to_float())
            .unwrap_or(0.0);
        let fairness = if own != 0.0 && partner_delta != 0.0 {
            (partner_delta.abs() / own).clamp(0.2, 2.0)
        } else {
            1.0
        };

        info!(
            team = %preview.team,
            fairness = format!("{fairness:.2}"),
            allowed = preview.allowed,
            "trade offer evaluated"
        );
        if !preview.allowed || !(0.6..=1.4).contains(&fairness) {
            let mut notes = preview.notes.clone();
            if fairness < 0.6 {
                notes.push("Partner rejected: offer too lopsided.".to_string());
            }
            if fairness > 1.4 {
                notes.push(
                    "Your outgoing value exceeds the return; sweetener recommended.".to_string(),
                );
            }
            return Ok(OfferOutcome {
                accepted: false,
                kind: TransactionKind::Trade,
                notes,
                cap_space_after: preview.cap_space_after,
                counter: Some(CounterOffer::Rebalance {
                    request: "Adjust player mix or add draft compensation to balance the deal."
                        .to_string(),
                }),
                transaction: None,
            });
        }

        let transaction = engine.commit(&preview)?;
        let mut notes = preview.notes.clone();
        notes.push("Trade executed after AI approval.".to_string());
        Ok(OfferOutcome {
            accepted: true,
            kind: TransactionKind::Trade,
            notes,
            cap_space_after: preview.cap_space_after,
            counter: None,
            transaction: Some(transaction),
        })
    }
}

fn position_counts(players: &[&Player]) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for player in players {
        *counts.entry(player.position.clone()).or_insert(0) += 1;
    }
    counts
}

/// 40 when a position is fully stocked, scaling up to 96 as the depth
/// chart thins out relative to the ideal.
pub fn fit_score(counts: &HashMap<String, u32>, position: &str) -> u32 {
    let desired = desired_depth(position);
    let have = counts.get(position).copied().unwrap_or(0);
    let need = desired.saturating_sub(have);
    let ratio = need as f64 / desired as f64;
    (40.0 + ratio * 60.0).min(96.0) as u32
}

/// How "all-in" a team looks from its cap spending, 25..=95.
pub fn contender_score(total_cap: Amount, cap_space: Amount, cap_limit: Amount) -> u32 {
    let spend_ratio = if cap_limit.is_positive() {
        (total_cap.to_float() / cap_limit.to_float()).min(1.2)
    } else {
        0.0
    };
    let mut score = (spend_ratio * 90.0).clamp(30.0, 95.0) as u32;
    if cap_space < Amount::ZERO {
        score = score.saturating_sub(10).max(25);
    }
    score
}

/// Market value relative to the pool median, clamped to [0.5, 1.5].
pub fn value_score(market_value: Amount, pool: &[Amount]) -> f64 {
    if pool.is_empty() || !market_value.is_positive() {
        return 1.0;
    }
    let med = median(pool);
    if med <= 0.0 {
        return 1.0;
    }
    let ratio = (market_value.to_float() / med).clamp(0.5, 1.5);
    (ratio * 100.0).round() / 100.0
}

fn median(pool: &[Amount]) -> f64 {
    let mut values: Vec<f64> = pool.iter().map(|v| v.to_float()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Weighted interest in an offer: half value, a third fit, a fifth
/// contender pull, minus a dissatisfaction penalty on contract length.
fn interest_score(value_ratio: f64, fit: u32, contender: u32, within_years: bool) -> f64 {
    let mut interest =
        0.5 * value_ratio.min(1.5) + 0.3 * (fit as f64 / 100.0) + 0.2 * (contender as f64 / 100.0);
    if !within_years {
        interest -= 0.1;
    }
    interest
}
