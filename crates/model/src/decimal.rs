use std::{
    fmt::{Debug, Display},
    iter::Sum,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::RecordError;

const DECIMALS: u8 = 2;
const SCALE: i64 = 10i64.pow(DECIMALS as u32);

/// Money amount with two fixed decimal places.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(i64);

impl Decimal {
    pub fn int(value: i64) -> Decimal {
        Decimal(value.saturating_mul(SCALE))
    }

    /// `None` when the amount does not fit.
    pub fn checked_int(value: i64) -> Option<Decimal> {
        value.checked_mul(SCALE).map(Decimal)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn zero() -> Decimal {
        Decimal::int(0)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl Debug for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return Decimal::zero();
        }
        Decimal((value * SCALE as f64).round() as i64)
    }
}

impl TryFrom<&str> for Decimal {
    type Error = RecordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let cleaned = value
            .trim()
            .trim_start_matches(['$', '₹', '€'])
            .replace(',', "");
        let val = cleaned
            .parse::<f64>()
            .map_err(|_| RecordError::InvalidDecimal(value.to_owned()))?;
        Ok(Decimal::from(val))
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, other: Decimal) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, other: Decimal) -> Decimal {
        Decimal(self.0.saturating_add(other.0))
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, other: Decimal) -> Decimal {
        Decimal(self.0.saturating_sub(other.0))
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
        serializer.serialize_f64(self.to_f64())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Int(value) => Decimal::checked_int(value)
                .ok_or_else(|| RecordError::InvalidDecimal(value.to_string()))
                .map_err(serde::de::Error::custom),
            RawAmount::Float(value) => Ok(Decimal::from(value)),
            RawAmount::Text(value) => Decimal::try_from(value.as_str()).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let decimal = Decimal::int(123456);
        assert_eq!("123456.00", format!("{}", decimal));

        let decimal = Decimal::int(-123456);
        assert_eq!("-123456.00", format!("{}", decimal));
        let decimal = Decimal::int(0);
        assert_eq!("0.00", format!("{}", decimal));
    }

    #[test]
    fn test_from_f64_display() {
        let decimal = Decimal::from(123456.78);
        assert_eq!("123456.78", format!("{}", decimal));

        let decimal = Decimal::from(-123456.78);
        assert_eq!("-123456.78", format!("{}", decimal));

        let decimal = Decimal::from(0.0001);
        assert_eq!("0.00", format!("{}", decimal));

        let decimal = Decimal::from(0.29);
        assert_eq!("0.29", format!("{}", decimal));

        let decimal = Decimal::from(0.111);
        assert_eq!("0.11", format!("{}", decimal));

        let decimal = Decimal::from(f64::NAN);
        assert!(decimal.is_zero());
    }

    #[test]
    fn test_from_str_display() {
        let decimal = Decimal::try_from("123456.78").unwrap();
        assert_eq!("123456.78", format!("{}", decimal));

        let decimal = Decimal::try_from("-123456").unwrap();
        assert_eq!("-123456.00", format!("{}", decimal));

        let decimal = Decimal::try_from(" 1,250.50 ").unwrap();
        assert_eq!("1250.50", format!("{}", decimal));

        let decimal = Decimal::try_from("₹2,000").unwrap();
        assert_eq!("2000.00", format!("{}", decimal));

        assert_eq!(
            Decimal::try_from("n/a"),
            Err(RecordError::InvalidDecimal("n/a".to_owned()))
        );
    }

    #[test]
    fn test_addition_and_sum() {
        let decimal1 = Decimal::from(123.45);
        let decimal2 = Decimal::from(678.90);
        assert_eq!("802.35", format!("{}", decimal1 + decimal2));
        assert_eq!("-555.45", format!("{}", decimal1 - decimal2));

        let mut acc = Decimal::zero();
        acc += Decimal::from(0.1);
        acc += Decimal::from(0.2);
        assert_eq!(acc, Decimal::from(0.3));

        let total: Decimal = [0.1, 0.2, 0.3].into_iter().map(Decimal::from).sum();
        assert_eq!(total.to_f64(), 0.6);
    }

    #[test]
    fn test_deserialize() {
        let values: Vec<Decimal> =
            serde_json::from_str(r#"[10, 10.5, "12.25", "1,000"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Decimal::int(10),
                Decimal::from(10.5),
                Decimal::from(12.25),
                Decimal::int(1000)
            ]
        );
        assert!(serde_json::from_str::<Decimal>(r#""abc""#).is_err());
    }

    #[test]
    fn test_out_of_range_amounts() {
        assert!(serde_json::from_str::<Decimal>("200000000000000000").is_err());
        assert_eq!(Decimal::checked_int(i64::MAX / 10), None);
        assert_eq!(Decimal::checked_int(92233720368547758), Some(Decimal::int(92233720368547758)));

        let huge = Decimal::from(1e30);
        assert_eq!(huge + huge, huge);
        let mut acc = huge;
        acc += Decimal::int(1);
        assert_eq!(acc, huge);
    }
}
