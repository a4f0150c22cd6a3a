use std::fmt::{self, Display};

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::RecordError;

/// Percentage value in the `0..=100` scale. Accepts `12.5` and `"12.5%"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
pub struct Percent(f64);

impl Percent {
    pub fn new(value: f64) -> Percent {
        if value.is_finite() {
            Percent(value)
        } else {
            Percent(0.0)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl TryFrom<&str> for Percent {
    type Error = RecordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim().trim_end_matches('%').trim();
        if trimmed.is_empty() {
            return Ok(Percent::default());
        }
        trimmed
            .parse::<f64>()
            .map(Percent::new)
            .map_err(|_| RecordError::InvalidPercent(value.to_owned()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPercent {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D>(deserializer: D) -> Result<Percent, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawPercent::deserialize(deserializer)? {
            RawPercent::Number(value) => Ok(Percent::new(value)),
            RawPercent::Text(value) => {
                Percent::try_from(value.as_str()).map_err(serde::de::Error::custom)
            }
        }
    }
}
