use chrono::{NaiveTime, Timelike as _, Weekday};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One-hour bucket of the class start time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Serialize, Deserialize)]
pub struct TimeSlot {
    hour: u8,
}

impl Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:00", self.hour)
    }
}

impl TimeSlot {
    pub fn new(hour: u8) -> Option<Self> {
        if hour < 24 {
            Some(Self { hour })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Accepts `07:30`, `7:30 AM`, `18:00:00` and `6 PM`.
    pub fn parse(time: &str) -> Option<Self> {
        let time = time.trim().to_uppercase();
        for fmt in ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"] {
            if let Ok(parsed) = NaiveTime::parse_from_str(&time, fmt) {
                return Self::new(parsed.hour() as u8);
            }
        }

        let (hour, pm) = if let Some(hour) = time.strip_suffix("AM") {
            (hour, false)
        } else {
            (time.strip_suffix("PM")?, true)
        };
        let hour = hour.trim().parse::<u8>().ok().filter(|h| (1..=12).contains(h))?;
        Self::new(hour % 12 + if pm { 12 } else { 0 })
    }
}

pub fn parse_weekday(value: &str) -> Option<Weekday> {
    value.trim().parse::<Weekday>().ok()
}

pub fn fmt_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
