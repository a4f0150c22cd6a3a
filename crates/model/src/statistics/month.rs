use std::fmt::{self, Display};

use chrono::{Datelike as _, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{date::parse_record_date, errors::RecordError};

/// Calendar month bucket key, formatted as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<MonthKey> {
        if (1..=12).contains(&month) {
            Some(MonthKey { year, month })
        } else {
            None
        }
    }

    pub fn january(year: i32) -> MonthKey {
        MonthKey { year, month: 1 }
    }

    pub fn from_date(date: NaiveDate) -> MonthKey {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> MonthKey {
        MonthKey::from_date(Local::now().date_naive())
    }

    /// Parses `2024-01`, `Jan 2024`, `January 2024` or any record date.
    pub fn parse(value: &str) -> Result<MonthKey, RecordError> {
        let trimmed = value.trim();
        if let Some((year, month)) = trimmed.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                if let Some(key) = MonthKey::new(year, month) {
                    return Ok(key);
                }
            }
        }

        let with_day = format!("1 {}", trimmed.replace('-', " "));
        for fmt in ["%d %b %Y", "%d %B %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&with_day, fmt) {
                return Ok(MonthKey::from_date(date));
            }
        }

        parse_record_date(trimmed)
            .map(MonthKey::from_date)
            .map_err(|_| RecordError::InvalidMonth(value.to_owned()))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn next(&self) -> MonthKey {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(MonthKey::from_date)
            .unwrap_or(*self)
    }

    pub fn prev(&self) -> MonthKey {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(MonthKey::from_date)
            .unwrap_or(*self)
    }

    /// Human label, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }

    /// Every month from `from` to `to`, both inclusive. Empty when `from > to`.
    pub fn sequence(from: MonthKey, to: MonthKey) -> Vec<MonthKey> {
        let mut months = vec![];
        let mut month = from;
        while month <= to {
            months.push(month);
            let next = month.next();
            if next == month {
                break;
            }
            month = next;
        }
        months
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
