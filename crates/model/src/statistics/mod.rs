pub mod calendar;
pub mod month;

pub use calendar::{fmt_weekday, TimeSlot};
pub use month::MonthKey;
