use std::{
    fmt::{Debug, Display, Formatter},
    iter::Sum,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CENTS: i64 = 100;

/// Euro amount with two fixed decimals, stored as integer cents.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(i64);

impl Decimal {
    pub const fn int(value: i64) -> Decimal {
        Decimal(value * CENTS)
    }

    pub const fn zero() -> Decimal {
        Decimal(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl Debug for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0 as f64 / CENTS as f64)
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0 as f64 / CENTS as f64)
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, other: Decimal) -> Decimal {
        Decimal(self.0 + other.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, other: Decimal) {
        self.0 += other.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, other: Decimal) -> Decimal {
        Decimal(self.0 - other.0)
    }
}

impl std::ops::Mul<u32> for Decimal {
    type Output = Decimal;

    fn mul(self, count: u32) -> Decimal {
        Decimal(self.0 * count as i64)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, x| acc + x)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Ok(Decimal(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!("10.00", format!("{}", Decimal::int(10)));
        assert_eq!("-3.00", format!("{}", Decimal::int(-3)));
        assert_eq!("0.00", format!("{}", Decimal::zero()));
    }

    #[test]
    fn test_arithmetic() {
        let total = Decimal::int(10) * 2 + Decimal::int(50) * 1;
        assert_eq!(Decimal::int(70), total);
        assert_eq!(Decimal::int(20), total - Decimal::int(50));
    }

    #[test]
    fn test_sum() {
        let sum: Decimal = [Decimal::int(1), Decimal::int(2), Decimal::int(4)]
            .into_iter()
            .sum();
        assert_eq!(Decimal::int(7), sum);
    }
}
