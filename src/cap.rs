//! Pure salary-cap math: cap hits, guarantee exposure, release impact.
//!
//! Nothing here touches the roster store; every function is deterministic
//! in its inputs, which is what lets previews and commits reconcile.

use crate::Amount;
use crate::config::Season;
use crate::model::{Contract, ContractYear};

/// Cap consequences of releasing (or trading away) a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapImpact {
    pub cap_hit: Amount,
    pub savings: Amount,
    pub dead_money_current: Amount,
    pub dead_money_future: Amount,
}

impl CapImpact {
    /// Total dead money across both cap years.
    pub fn dead_money(&self) -> Amount {
        self.dead_money_current + self.dead_money_future
    }
}

/// Select the contract year charged against `target`: the exact season if
/// present, else the earliest later season, else the final season.
fn pick_year(contract: &Contract, target: Season) -> Option<&ContractYear> {
    let mut ordered: Vec<&ContractYear> = contract.years.iter().collect();
    if ordered.is_empty() {
        return None;
    }
    ordered.sort_by_key(|y| y.season);
    ordered
        .iter()
        .find(|y| y.season == target)
        .or_else(|| ordered.iter().find(|y| y.season > target))
        .copied()
        .or_else(|| ordered.last().copied())
}

/// Current-year cap charge for a contract.
///
/// With no per-season rows the fallback chain is average-per-year, then
/// total value, then zero. A year's explicit cap hit wins over the derived
/// base + proration + bonuses sum only when nonzero.
pub fn cap_hit(contract: Option<&Contract>, target: Season) -> Amount {
    let Some(contract) = contract else {
        return Amount::ZERO;
    };
    if let Some(year) = pick_year(contract, target) {
        let computed = year.base_salary
            + year.signing_proration
            + year.roster_bonus
            + year.workout_bonus
            + year.other_bonus;
        let hit = if year.cap_hit.is_positive() {
            year.cap_hit
        } else {
            computed
        };
        return hit.max(Amount::ZERO);
    }
    if contract.average_per_year.is_positive() {
        return contract.average_per_year;
    }
    if contract.total_value.is_positive() {
        return contract.total_value;
    }
    Amount::ZERO
}

/// Guaranteed-money exposure for `target`: the year's rolling guarantee if
/// positive, else the year's own guarantee, else the contract-level total.
pub fn guaranteed_amount(contract: Option<&Contract>, target: Season) -> Amount {
    let Some(contract) = contract else {
        return Amount::ZERO;
    };
    if let Some(year) = pick_year(contract, target) {
        if year.rolling_guarantee.is_positive() {
            return year.rolling_guarantee;
        }
        if year.guaranteed.is_positive() {
            return year.guaranteed;
        }
    }
    contract.guaranteed
}

/// Savings and dead money from releasing a contract.
///
/// Dead money is the guarantee exposure when one exists, else a 40%-of-hit
/// floor, and can never exceed the cap hit. A post-June-1 designation
/// splits dead money evenly across this year and next.
///
/// Single source of truth for release *and* trade cap consequences.
pub fn release_impact(contract: Option<&Contract>, target: Season, post_june_1: bool) -> CapImpact {
    let cap_hit = cap_hit(contract, target);
    if !cap_hit.is_positive() {
        return CapImpact::default();
    }
    let guaranteed = guaranteed_amount(contract, target);

    let baseline_dead = cap_hit.scale(0.4);
    let dead_money = if guaranteed.is_positive() {
        guaranteed
    } else {
        baseline_dead
    }
    .min(cap_hit);
    let savings = (cap_hit - dead_money).max(Amount::ZERO);

    let (current, future) = if post_june_1 && dead_money.is_positive() {
        dead_money.split_half()
    } else {
        (dead_money, Amount::ZERO)
    };

    CapImpact {
        cap_hit,
        savings,
        dead_money_current: current,
        dead_money_future: future,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_contract() -> Contract {
        Contract {
            id: 1,
            source: "test".into(),
            source_url: None,
            signed_date: None,
            total_value: Amount::ZERO,
            guaranteed: Amount::ZERO,
            average_per_year: Amount::ZERO,
            notes: None,
            years: Vec::new(),
        }
    }

    fn year(season: Season) -> ContractYear {
        ContractYear::empty(season)
    }

    #[test]
    fn no_contract_is_zero() {
        assert_eq!(cap_hit(None, 2025), Amount::ZERO);
        assert_eq!(guaranteed_amount(None, 2025), Amount::ZERO);
        assert_eq!(release_impact(None, 2025, false), CapImpact::default());
    }

    #[test]
    fn falls_back_to_average_per_year_then_total_value() {
        let mut contract = bare_contract();
        assert_eq!(cap_hit(Some(&contract), 2025), Amount::ZERO);

        contract.total_value = Amount::from_dollars(12_000_000);
        assert_eq!(cap_hit(Some(&contract), 2025), Amount::from_dollars(12_000_000));

        contract.average_per_year = Amount::from_dollars(4_000_000);
        assert_eq!(cap_hit(Some(&contract), 2025), Amount::from_dollars(4_000_000));
    }

    #[test]
    fn explicit_zero_cap_hit_derives_component_sum() {
        // Worked example: 5M base + 1M proration, explicit cap hit of zero.
        let mut contract = bare_contract();
        let mut y = year(2024);
        y.base_salary = Amount::from_dollars(5_000_000);
        y.signing_proration = Amount::from_dollars(1_000_000);
        contract.years.push(y);

        assert_eq!(cap_hit(Some(&contract), 2024), Amount::from_dollars(6_000_000));
    }

    #[test]
    fn explicit_cap_hit_takes_precedence() {
        let mut contract = bare_contract();
        let mut y = year(2024);
        y.base_salary = Amount::from_dollars(5_000_000);
        y.cap_hit = Amount::from_dollars(7_500_000);
        contract.years.push(y);

        assert_eq!(cap_hit(Some(&contract), 2024), Amount::from_dollars(7_500_000));
    }

    #[test]
    fn year_selection_exact_then_next_then_last() {
        let mut contract = bare_contract();
        for (season, hit) in [(2024, 4), (2026, 6), (2028, 8)] {
            let mut y = year(season);
            y.cap_hit = Amount::from_dollars(hit * 1_000_000);
            contract.years.push(y);
        }

        // exact match
        assert_eq!(cap_hit(Some(&contract), 2026), Amount::from_dollars(6_000_000));
        // no 2025 row: earliest season strictly greater
        assert_eq!(cap_hit(Some(&contract), 2025), Amount::from_dollars(6_000_000));
        // past the end: last season
        assert_eq!(cap_hit(Some(&contract), 2030), Amount::from_dollars(8_000_000));
        // before the start: first future season
        assert_eq!(cap_hit(Some(&contract), 2020), Amount::from_dollars(4_000_000));
    }

    #[test]
    fn guaranteed_prefers_rolling_then_year_then_contract() {
        let mut contract = bare_contract();
        contract.guaranteed = Amount::from_dollars(1_000_000);
        let mut y = year(2025);
        y.guaranteed = Amount::from_dollars(2_000_000);
        y.rolling_guarantee = Amount::from_dollars(3_000_000);
        contract.years.push(y);

        assert_eq!(
            guaranteed_amount(Some(&contract), 2025),
            Amount::from_dollars(3_000_000)
        );

        contract.years[0].rolling_guarantee = Amount::ZERO;
        assert_eq!(
            guaranteed_amount(Some(&contract), 2025),
            Amount::from_dollars(2_000_000)
        );

        contract.years[0].guaranteed = Amount::ZERO;
        assert_eq!(
            guaranteed_amount(Some(&contract), 2025),
            Amount::from_dollars(1_000_000)
        );
    }

    fn contract_with(cap_hit: i64, guaranteed: i64) -> Contract {
        let mut contract = bare_contract();
        contract.guaranteed = Amount::from_dollars(guaranteed);
        let mut y = year(2025);
        y.cap_hit = Amount::from_dollars(cap_hit);
        contract.years.push(y);
        contract
    }

    #[test]
    fn release_identities_hold() {
        let contract = contract_with(10_000_000, 4_000_000);
        let impact = release_impact(Some(&contract), 2025, false);

        assert_eq!(impact.cap_hit, Amount::from_dollars(10_000_000));
        assert_eq!(impact.savings + impact.dead_money(), impact.cap_hit);
        assert_eq!(
            impact.dead_money_current + impact.dead_money_future,
            impact.dead_money()
        );
        assert_eq!(impact.dead_money_future, Amount::ZERO);
    }

    #[test]
    fn post_june_1_split_example() {
        // Worked example: 10M hit, 4M guaranteed, post-June-1.
        let contract = contract_with(10_000_000, 4_000_000);
        let impact = release_impact(Some(&contract), 2025, true);

        assert_eq!(impact.savings, Amount::from_dollars(6_000_000));
        assert_eq!(impact.dead_money_current, Amount::from_dollars(2_000_000));
        assert_eq!(impact.dead_money_future, Amount::from_dollars(2_000_000));
    }

    #[test]
    fn post_june_1_split_has_no_rounding_leak() {
        // An odd-cent guarantee still splits without losing a cent.
        let mut contract = contract_with(10_000_000, 0);
        contract.guaranteed = Amount::from_scaled(300_000_001); // $3,000,000.01
        let impact = release_impact(Some(&contract), 2025, true);

        assert_eq!(
            impact.dead_money_current + impact.dead_money_future,
            Amount::from_scaled(300_000_001)
        );
        assert_eq!(impact.dead_money_current, Amount::from_scaled(150_000_001));
        assert_eq!(impact.savings + impact.dead_money(), impact.cap_hit);
    }

    #[test]
    fn no_guarantee_uses_forty_percent_floor() {
        let contract = contract_with(10_000_000, 0);
        let impact = release_impact(Some(&contract), 2025, false);

        assert_eq!(impact.dead_money_current, Amount::from_dollars(4_000_000));
        assert_eq!(impact.savings, Amount::from_dollars(6_000_000));
    }

    #[test]
    fn dead_money_clamped_to_cap_hit() {
        // Guarantee exceeding the hit: everything is dead, nothing saved.
        let contract = contract_with(5_000_000, 9_000_000);
        let impact = release_impact(Some(&contract), 2025, false);

        assert_eq!(impact.dead_money_current, Amount::from_dollars(5_000_000));
        assert_eq!(impact.savings, Amount::ZERO);
    }

    #[test]
    fn zero_cap_hit_zeroes_everything() {
        let contract = bare_contract();
        let impact = release_impact(Some(&contract), 2025, true);
        assert_eq!(impact, CapImpact::default());
    }
}
