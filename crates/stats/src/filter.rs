use chrono::NaiveDate;
use model::{
    client::{ConversionStatus, NewClientRecord, RetentionStatus},
    decimal::Decimal,
    errors::RecordError,
    payroll::PayrollRecord,
    session::SessionRecord,
};
use serde::Deserialize;

/// Inclusive date window, either bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// An inactive range admits everything without reading the date. An
    /// active one rejects records whose date cannot be read.
    fn admits(&self, date: impl FnOnce() -> Result<NaiveDate, RecordError>) -> bool {
        if !self.is_active() {
            return true;
        }
        date().map(|date| self.contains(date)).unwrap_or(false)
    }
}

/// Empty selection means no constraint on that dimension.
fn selected<T: PartialEq + ?Sized, S: AsRef<T>>(selection: &[S], value: &T) -> bool {
    selection.is_empty() || selection.iter().any(|item| item.as_ref() == value)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewClientFilterOptions {
    pub date_range: DateRange,
    pub locations: Vec<String>,
    pub trainers: Vec<String>,
    pub payment_methods: Vec<String>,
    pub retention_statuses: Vec<RetentionStatus>,
    pub conversion_statuses: Vec<ConversionStatus>,
    pub is_new: Vec<String>,
    pub min_ltv: Option<Decimal>,
    pub max_ltv: Option<Decimal>,
}

impl NewClientFilterOptions {
    pub fn is_empty(&self) -> bool {
        *self == NewClientFilterOptions::default()
    }

    pub fn matches(&self, record: &NewClientRecord) -> bool {
        self.date_range.admits(|| record.first_visit())
            && selected(&self.locations, record.location())
            && selected(&self.trainers, record.trainer())
            && selected(&self.payment_methods, record.payment_method())
            && (self.retention_statuses.is_empty()
                || self.retention_statuses.contains(&record.retention_status))
            && (self.conversion_statuses.is_empty()
                || self.conversion_statuses.contains(&record.conversion_status))
            && selected(&self.is_new, record.is_new_label())
            && self.min_ltv.map_or(true, |min| record.ltv >= min)
            && self.max_ltv.map_or(true, |max| record.ltv <= max)
    }

    pub fn apply(&self, records: &[NewClientRecord]) -> Vec<NewClientRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionFilter {
    pub date_range: DateRange,
    pub locations: Vec<String>,
    pub trainers: Vec<String>,
    pub formats: Vec<String>,
}

impl SessionFilter {
    pub fn matches(&self, record: &SessionRecord) -> bool {
        self.date_range.admits(|| record.session_date())
            && selected(&self.locations, record.location())
            && selected(&self.trainers, record.trainer())
            && selected(&self.formats, record.class_format())
    }

    pub fn apply(&self, records: &[SessionRecord]) -> Vec<SessionRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    /// Payroll rows are monthly roll-ups across formats: only the trainer
    /// and location selections apply to them.
    pub fn matches_payroll(&self, record: &PayrollRecord) -> bool {
        selected(&self.locations, record.location()) && selected(&self.trainers, record.trainer())
    }

    pub fn apply_payroll(&self, records: &[PayrollRecord]) -> Vec<PayrollRecord> {
        records
            .iter()
            .filter(|record| self.matches_payroll(record))
            .cloned()
            .collect()
    }
}
