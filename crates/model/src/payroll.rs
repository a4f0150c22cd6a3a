use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

use crate::{
    de, decimal::Decimal, errors::RecordError, percent::Percent,
    statistics::month::MonthKey, UNKNOWN,
};

/// One trainer-month payroll roll-up.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayrollRecord {
    #[serde(deserialize_with = "de::text")]
    pub teacher_name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub teacher_id: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub month_year: Option<String>,
    #[serde(deserialize_with = "de::count")]
    pub total_sessions: u32,
    #[serde(deserialize_with = "de::count")]
    pub total_customers: u32,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub total_paid: Decimal,
    #[serde(deserialize_with = "de::count")]
    pub cycle_sessions: u32,
    #[serde(deserialize_with = "de::count")]
    pub cycle_customers: u32,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub cycle_paid: Decimal,
    #[serde(deserialize_with = "de::count")]
    pub barre_sessions: u32,
    #[serde(deserialize_with = "de::count")]
    pub barre_customers: u32,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub barre_paid: Decimal,
    #[serde(deserialize_with = "de::count")]
    pub strength_sessions: u32,
    #[serde(deserialize_with = "de::count")]
    pub strength_customers: u32,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub strength_paid: Decimal,
    #[serde(deserialize_with = "de::count")]
    pub empty_sessions: u32,
    #[serde(deserialize_with = "de::count")]
    pub non_empty_sessions: u32,
    #[serde(rename = "new", deserialize_with = "de::count")]
    pub new_customers: u32,
    #[serde(deserialize_with = "de::count")]
    pub converted: u32,
    #[serde(deserialize_with = "de::count")]
    pub retained: u32,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub conversion: Percent,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub retention: Percent,
}

impl PayrollRecord {
    pub fn trainer(&self) -> &str {
        self.teacher_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn month(&self) -> Result<MonthKey, RecordError> {
        MonthKey::parse(self.month_year.as_deref().unwrap_or_default())
    }
}
