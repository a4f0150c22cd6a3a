use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use strum::{AsRefStr, Display, EnumString};

use crate::{date::parse_record_date, de, decimal::Decimal, errors::RecordError, UNKNOWN};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display, AsRefStr, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(from = "String", into = "String")]
pub enum ConversionStatus {
    #[strum(serialize = "Converted")]
    Converted,
    #[strum(serialize = "Not Converted")]
    NotConverted,
    #[strum(serialize = "Pending")]
    Pending,
    #[default]
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl From<String> for ConversionStatus {
    fn from(value: String) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

impl From<ConversionStatus> for String {
    fn from(value: ConversionStatus) -> Self {
        value.to_string()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display, AsRefStr, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(from = "String", into = "String")]
pub enum RetentionStatus {
    #[strum(serialize = "Retained")]
    Retained,
    #[strum(serialize = "Not Retained")]
    NotRetained,
    #[default]
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl From<String> for RetentionStatus {
    fn from(value: String) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

impl From<RetentionStatus> for String {
    fn from(value: RetentionStatus) -> Self {
        value.to_string()
    }
}

/// One client's first-visit-to-conversion record.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewClientRecord {
    #[serde(deserialize_with = "de::text")]
    pub member_id: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub first_visit_date: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub first_visit_location: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub trainer_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub conversion_status: ConversionStatus,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub retention_status: RetentionStatus,
    #[serde(deserialize_with = "de::text")]
    pub is_new: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub ltv: Decimal,
    #[serde(deserialize_with = "de::text")]
    pub membership_used: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "de::count")]
    pub conversion_span: u32,
    #[serde(deserialize_with = "de::count")]
    pub visits_post_trial: u32,
}

impl NewClientRecord {
    pub fn trainer(&self) -> &str {
        self.trainer_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn location(&self) -> &str {
        self.first_visit_location.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn payment_method(&self) -> &str {
        self.payment_method.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn membership(&self) -> &str {
        self.membership_used.as_deref().unwrap_or(UNKNOWN)
    }

    /// Raw `isNew` label, `Unknown` when absent.
    pub fn is_new_label(&self) -> &str {
        self.is_new.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn is_new_client(&self) -> bool {
        self.is_new.as_deref().is_some_and(|value| {
            let value = value.trim().to_ascii_lowercase();
            value == "yes" || value == "true" || value == "1" || value.starts_with("new")
        })
    }

    pub fn first_visit(&self) -> Result<NaiveDate, RecordError> {
        parse_record_date(self.first_visit_date.as_deref().unwrap_or_default())
    }

    pub fn is_converted(&self) -> bool {
        self.conversion_status == ConversionStatus::Converted
    }

    pub fn is_retained(&self) -> bool {
        self.retention_status == RetentionStatus::Retained
    }
}
