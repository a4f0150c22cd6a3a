use chrono::{Datelike as _, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

use crate::{
    date::parse_record_date,
    de,
    decimal::Decimal,
    errors::RecordError,
    statistics::calendar::{parse_weekday, TimeSlot},
    UNKNOWN,
};

/// One scheduled class occurrence.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    #[serde(deserialize_with = "de::text")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub time: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub day_of_week: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub trainer_name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub cleaned_class: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub class_type: Option<String>,
    #[serde(deserialize_with = "de::count")]
    pub capacity: u32,
    #[serde(deserialize_with = "de::count")]
    pub checked_in_count: u32,
    #[serde(deserialize_with = "de::count")]
    pub booked_count: u32,
    #[serde(deserialize_with = "de::count")]
    pub late_cancelled_count: u32,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub total_paid: Decimal,
    #[serde(deserialize_with = "de::count")]
    pub checked_in_with_membership: u32,
    #[serde(deserialize_with = "de::count")]
    pub checked_in_with_package: u32,
    #[serde(deserialize_with = "de::count")]
    pub checked_in_with_intro_offer: u32,
    #[serde(deserialize_with = "de::count")]
    pub checked_in_with_single_class: u32,
}

impl SessionRecord {
    /// `cleanedClass`, then `classType`, then `Unknown`.
    pub fn class_format(&self) -> &str {
        self.cleaned_class
            .as_deref()
            .or(self.class_type.as_deref())
            .unwrap_or(UNKNOWN)
    }

    pub fn trainer(&self) -> &str {
        self.trainer_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn session_date(&self) -> Result<NaiveDate, RecordError> {
        parse_record_date(self.date.as_deref().unwrap_or_default())
    }

    pub fn time_slot(&self) -> Option<TimeSlot> {
        self.time.as_deref().and_then(TimeSlot::parse)
    }

    /// `dayOfWeek` when it names a day, otherwise the weekday of `date`.
    pub fn weekday(&self) -> Option<Weekday> {
        self.day_of_week
            .as_deref()
            .and_then(parse_weekday)
            .or_else(|| self.session_date().ok().map(|date| date.weekday()))
    }

    pub fn is_empty(&self) -> bool {
        self.checked_in_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_sparse_record() {
        let record: SessionRecord = serde_json::from_value(json!({
            "date": "03/04/2024",
            "time": "07:30",
            "trainerName": "",
            "classType": "Barre 57",
            "capacity": 20,
            "checkedInCount": "12",
            "bookedCount": null,
            "totalPaid": "1,200.50",
        }))
        .unwrap();

        assert_eq!(record.class_format(), "Barre 57");
        assert_eq!(record.trainer(), UNKNOWN);
        assert_eq!(record.location(), UNKNOWN);
        assert_eq!(record.capacity, 20);
        assert_eq!(record.checked_in_count, 12);
        assert_eq!(record.booked_count, 0);
        assert_eq!(record.total_paid, Decimal::from(1200.5));
        assert_eq!(record.time_slot(), TimeSlot::new(7));
        assert_eq!(record.weekday(), Some(Weekday::Wed));
        assert!(!record.is_empty());
    }

    #[test]
    fn test_cleaned_class_wins() {
        let record = SessionRecord {
            cleaned_class: Some("Cycle".to_owned()),
            class_type: Some("PowerCycle 45".to_owned()),
            day_of_week: Some("Friday".to_owned()),
            ..Default::default()
        };
        assert_eq!(record.class_format(), "Cycle");
        assert_eq!(record.weekday(), Some(Weekday::Fri));
        assert!(record.is_empty());
    }

    #[test]
    fn test_bad_money_is_zero() {
        let record: SessionRecord =
            serde_json::from_value(json!({ "totalPaid": "free" })).unwrap();
        assert!(record.total_paid.is_zero());

        let record: SessionRecord =
            serde_json::from_str(r#"{"totalPaid": 200000000000000000, "capacity": 8}"#).unwrap();
        assert!(record.total_paid.is_zero());
        assert_eq!(record.capacity, 8);
    }
}
