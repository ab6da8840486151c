use std::fmt;
use std::iter::Sum;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed-point dollar amount with 2 decimal places, stored as scaled cents.
///
/// Every persisted monetary field uses this type; floating point only ever
/// appears in heuristic scores that carry no ledger invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 100;

    pub const ZERO: Amount = Amount(0);

    pub fn from_float(value: f64) -> Self {
        Amount((value * Self::SCALE as f64).round() as i64)
    }

    pub fn from_scaled(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Amount(dollars * Self::SCALE)
    }

    /// Lossy conversion for heuristic math (interest, fairness ratios).
    pub fn to_float(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn max(self, other: Amount) -> Amount {
        Amount(self.0.max(other.0))
    }

    pub fn min(self, other: Amount) -> Amount {
        Amount(self.0.min(other.0))
    }

    /// Scale by a float factor, rounded to the cent.
    pub fn scale(self, factor: f64) -> Amount {
        Amount((self.0 as f64 * factor).round() as i64)
    }

    /// Multiply by an integer count (e.g. APY x contract years). Exact.
    pub fn times(self, count: i64) -> Amount {
        Amount(self.0 * count)
    }

    /// Divide by an integer count (e.g. bonus proration), rounded to the cent.
    pub fn divide(self, count: i64) -> Amount {
        debug_assert!(count != 0);
        let doubled = 2 * self.0 / count;
        Amount((doubled + doubled.signum()) / 2)
    }

    /// Split into two halves that sum exactly back to `self`.
    ///
    /// The first half carries the extra cent when the total is odd
    /// (round-half-up at the cent).
    pub fn split_half(self) -> (Amount, Amount) {
        let first = Amount((self.0 + 1).div_euclid(2));
        (first, self - first)
    }

    /// Round to the nearest multiple of `step` whole dollars.
    pub fn round_to_dollars(self, step: i64) -> Amount {
        debug_assert!(step > 0);
        let step_cents = step * Self::SCALE;
        let half = step_cents / 2;
        let offset = if self.0 >= 0 { half } else { -half };
        Amount((self.0 + offset).div_euclid(step_cents) * step_cents)
    }

    /// Format as whole dollars with thousands separators, e.g. `$6,000,000`.
    pub fn usd(self) -> String {
        let dollars = (self.0 as f64 / Self::SCALE as f64).round() as i64;
        let sign = if dollars < 0 { "-" } else { "" };
        let digits = dollars.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{sign}${grouped}")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

// Money is a decimal string at rest ("1234.56"); inputs may also carry
// plain JSON numbers, which are rounded to the cent on the way in.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal string or number of dollars")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Ok(Amount::from_float(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::from_dollars(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .map(Amount::from_dollars)
            .map_err(|_| E::custom("dollar amount out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.trim()
            .parse::<f64>()
            .map(Amount::from_float)
            .map_err(|_| E::custom(format!("invalid decimal amount '{v}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scaled_preserves_value() {
        let amount = Amount::from_scaled(123_456);
        assert_eq!(amount, Amount(123_456));
    }

    #[test]
    fn from_float_converts_correctly() {
        assert_eq!(Amount::from_float(100.0), Amount::from_scaled(10_000));
        assert_eq!(Amount::from_float(1.5), Amount::from_scaled(150));
        assert_eq!(Amount::from_float(0.01), Amount::from_scaled(1));
    }

    #[test]
    fn from_float_rounds_to_the_cent() {
        assert_eq!(Amount::from_float(1.234), Amount::from_scaled(123));
        assert_eq!(Amount::from_float(1.235), Amount::from_scaled(124));
    }

    #[test]
    fn from_dollars_scales() {
        assert_eq!(Amount::from_dollars(5_000_000), Amount::from_float(5_000_000.0));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Amount::from_scaled(600_000_000).to_string(), "6000000.00");
        assert_eq!(Amount::from_scaled(150).to_string(), "1.50");
        assert_eq!(Amount::from_scaled(-1).to_string(), "-0.01");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn usd_groups_thousands() {
        assert_eq!(Amount::from_dollars(6_000_000).usd(), "$6,000,000");
        assert_eq!(Amount::from_dollars(950).usd(), "$950");
        assert_eq!(Amount::from_dollars(-1_234_567).usd(), "-$1,234,567");
        assert_eq!(Amount::ZERO.usd(), "$0");
    }

    #[test]
    fn arithmetic() {
        let a = Amount::from_scaled(100);
        let b = Amount::from_scaled(30);
        assert_eq!(a + b, Amount::from_scaled(130));
        assert_eq!(a - b, Amount::from_scaled(70));
        assert_eq!(-a, Amount::from_scaled(-100));

        let mut c = a;
        c += b;
        c -= Amount::from_scaled(10);
        assert_eq!(c, Amount::from_scaled(120));
    }

    #[test]
    fn sum_of_amounts() {
        let total: Amount = [10, 20, 30].into_iter().map(Amount::from_scaled).sum();
        assert_eq!(total, Amount::from_scaled(60));
    }

    #[test]
    fn scale_rounds_to_cent() {
        // 40% of a 10M cap hit
        assert_eq!(
            Amount::from_dollars(10_000_000).scale(0.4),
            Amount::from_dollars(4_000_000)
        );
        assert_eq!(Amount::from_scaled(25).scale(0.5), Amount::from_scaled(13));
    }

    #[test]
    fn divide_rounds_to_cent() {
        assert_eq!(Amount::from_dollars(5_000_000).divide(5), Amount::from_dollars(1_000_000));
        assert_eq!(Amount::from_scaled(100).divide(3), Amount::from_scaled(33));
        assert_eq!(Amount::from_scaled(200).divide(3), Amount::from_scaled(67));
    }

    #[test]
    fn split_half_sums_exactly() {
        let even = Amount::from_dollars(4_000_000);
        let (cur, fut) = even.split_half();
        assert_eq!(cur, Amount::from_dollars(2_000_000));
        assert_eq!(cur + fut, even);

        let odd = Amount::from_scaled(101);
        let (cur, fut) = odd.split_half();
        assert_eq!(cur, Amount::from_scaled(51));
        assert_eq!(fut, Amount::from_scaled(50));
        assert_eq!(cur + fut, odd);
    }

    #[test]
    fn round_to_dollars_nearest_10k() {
        assert_eq!(
            Amount::from_dollars(19_404_999).round_to_dollars(10_000),
            Amount::from_dollars(19_400_000)
        );
        assert_eq!(
            Amount::from_dollars(19_405_000).round_to_dollars(10_000),
            Amount::from_dollars(19_410_000)
        );
        assert_eq!(
            Amount::from_dollars(20_000_000).round_to_dollars(10_000),
            Amount::from_dollars(20_000_000)
        );
    }

    #[test]
    fn serde_round_trip_is_a_decimal_string() {
        let amount = Amount::from_float(1234.56);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1234.56\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn deserializes_json_numbers_as_dollars() {
        let from_int: Amount = serde_json::from_str("5000000").unwrap();
        assert_eq!(from_int, Amount::from_dollars(5_000_000));
        let from_float: Amount = serde_json::from_str("1234.5").unwrap();
        assert_eq!(from_float, Amount::from_float(1234.5));
    }

    #[test]
    fn ordering() {
        assert!(Amount::from_scaled(-1) < Amount::ZERO);
        assert!(Amount::ZERO < Amount::from_scaled(1));
    }
}
