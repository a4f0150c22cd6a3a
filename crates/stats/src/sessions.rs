use chrono::Datelike as _;
use model::{
    decimal::Decimal,
    session::SessionRecord,
    statistics::{fmt_weekday, MonthKey},
    UNKNOWN,
};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::{
    aggregate::{self, per_unit, ratio, Accumulate, Dimension, GroupKey, Grouping},
    rank::{paginate, sort_rows, Metric, SortDirection, Unit},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SessionDimension {
    Format,
    Trainer,
    Location,
    TimeSlot,
    DayOfWeek,
    Month,
    Year,
}

impl Dimension<SessionRecord> for SessionDimension {
    fn key(&self, record: &SessionRecord) -> Option<String> {
        match self {
            SessionDimension::Format => Some(record.class_format().to_owned()),
            SessionDimension::Trainer => Some(record.trainer().to_owned()),
            SessionDimension::Location => Some(record.location().to_owned()),
            SessionDimension::TimeSlot => Some(
                record
                    .time_slot()
                    .map(|slot| slot.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_owned()),
            ),
            SessionDimension::DayOfWeek => Some(
                record
                    .weekday()
                    .map(fmt_weekday)
                    .unwrap_or(UNKNOWN)
                    .to_owned(),
            ),
            SessionDimension::Month => record
                .session_date()
                .ok()
                .map(|date| MonthKey::from_date(date).to_string()),
            SessionDimension::Year => record.session_date().ok().map(|date| date.year().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStat {
    pub sessions: u32,
    pub capacity: u64,
    pub checked_in: u64,
    pub booked: u64,
    pub late_cancelled: u64,
    pub revenue: Decimal,
    pub empty_sessions: u32,
    pub non_empty_sessions: u32,
    pub membership_checkins: u64,
    pub package_checkins: u64,
    pub intro_offer_checkins: u64,
    pub single_class_checkins: u64,
}

impl Accumulate<SessionRecord> for SessionStat {
    fn extend(&mut self, record: &SessionRecord) {
        self.sessions += 1;
        self.capacity += record.capacity as u64;
        self.checked_in += record.checked_in_count as u64;
        self.booked += record.booked_count as u64;
        self.late_cancelled += record.late_cancelled_count as u64;
        self.revenue += record.total_paid;
        if record.is_empty() {
            self.empty_sessions += 1;
        } else {
            self.non_empty_sessions += 1;
        }
        self.membership_checkins += record.checked_in_with_membership as u64;
        self.package_checkins += record.checked_in_with_package as u64;
        self.intro_offer_checkins += record.checked_in_with_intro_offer as u64;
        self.single_class_checkins += record.checked_in_with_single_class as u64;
    }
}

/// Class attendance row derived from a [`SessionStat`] bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub key: GroupKey,
    pub total_sessions: u32,
    pub total_capacity: u64,
    pub total_checked_in: u64,
    pub total_booked: u64,
    pub total_late_cancelled: u64,
    pub total_revenue: Decimal,
    pub empty_sessions: u32,
    pub non_empty_sessions: u32,
    pub fill_rate: f64,
    pub show_up_rate: f64,
    pub cancellation_rate: f64,
    pub utilization: f64,
    pub avg_attendance: f64,
    pub revenue_per_session: f64,
    pub revenue_per_checkin: f64,
    pub membership_share: f64,
    pub package_share: f64,
    pub intro_offer_share: f64,
    pub single_class_share: f64,
}

impl SessionMetrics {
    pub fn new(key: GroupKey, stat: &SessionStat) -> Self {
        let sessions = stat.sessions as f64;
        let checked_in = stat.checked_in as f64;
        let booked = stat.booked as f64;
        let revenue = stat.revenue.to_f64();
        SessionMetrics {
            key,
            total_sessions: stat.sessions,
            total_capacity: stat.capacity,
            total_checked_in: stat.checked_in,
            total_booked: stat.booked,
            total_late_cancelled: stat.late_cancelled,
            total_revenue: stat.revenue,
            empty_sessions: stat.empty_sessions,
            non_empty_sessions: stat.non_empty_sessions,
            fill_rate: ratio(checked_in, stat.capacity as f64),
            show_up_rate: ratio(checked_in, booked),
            cancellation_rate: ratio(stat.late_cancelled as f64, booked),
            utilization: ratio(stat.non_empty_sessions as f64, sessions),
            avg_attendance: per_unit(checked_in, sessions),
            revenue_per_session: per_unit(revenue, sessions),
            revenue_per_checkin: per_unit(revenue, checked_in),
            membership_share: ratio(stat.membership_checkins as f64, checked_in),
            package_share: ratio(stat.package_checkins as f64, checked_in),
            intro_offer_share: ratio(stat.intro_offer_checkins as f64, checked_in),
            single_class_share: ratio(stat.single_class_checkins as f64, checked_in),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SessionMetric {
    Sessions,
    Capacity,
    CheckedIn,
    Revenue,
    #[default]
    FillRate,
    ShowUpRate,
    CancellationRate,
    Utilization,
    AvgAttendance,
    RevenuePerSession,
    RevenuePerCheckin,
    EmptySessions,
}

impl Metric<SessionMetrics> for SessionMetric {
    fn value(&self, row: &SessionMetrics) -> f64 {
        match self {
            SessionMetric::Sessions => row.total_sessions as f64,
            SessionMetric::Capacity => row.total_capacity as f64,
            SessionMetric::CheckedIn => row.total_checked_in as f64,
            SessionMetric::Revenue => row.total_revenue.to_f64(),
            SessionMetric::FillRate => row.fill_rate,
            SessionMetric::ShowUpRate => row.show_up_rate,
            SessionMetric::CancellationRate => row.cancellation_rate,
            SessionMetric::Utilization => row.utilization,
            SessionMetric::AvgAttendance => row.avg_attendance,
            SessionMetric::RevenuePerSession => row.revenue_per_session,
            SessionMetric::RevenuePerCheckin => row.revenue_per_checkin,
            SessionMetric::EmptySessions => row.empty_sessions as f64,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SessionMetric::Sessions => "Sessions",
            SessionMetric::Capacity => "Capacity",
            SessionMetric::CheckedIn => "Checked in",
            SessionMetric::Revenue => "Revenue",
            SessionMetric::FillRate => "Fill rate",
            SessionMetric::ShowUpRate => "Show-up rate",
            SessionMetric::CancellationRate => "Late cancel rate",
            SessionMetric::Utilization => "Utilization",
            SessionMetric::AvgAttendance => "Avg attendance",
            SessionMetric::RevenuePerSession => "Revenue/session",
            SessionMetric::RevenuePerCheckin => "Revenue/check-in",
            SessionMetric::EmptySessions => "Empty sessions",
        }
    }

    fn unit(&self) -> Unit {
        match self {
            SessionMetric::Sessions
            | SessionMetric::Capacity
            | SessionMetric::CheckedIn
            | SessionMetric::EmptySessions
            | SessionMetric::AvgAttendance => Unit::Count,
            SessionMetric::Revenue
            | SessionMetric::RevenuePerSession
            | SessionMetric::RevenuePerCheckin => Unit::Money,
            SessionMetric::FillRate
            | SessionMetric::ShowUpRate
            | SessionMetric::CancellationRate
            | SessionMetric::Utilization => Unit::Percent,
        }
    }
}

/// Attendance rows keyed by `dimensions`, in first-seen key order.
pub fn group_sessions(records: &[SessionRecord], dimensions: &[SessionDimension]) -> Vec<SessionMetrics> {
    aggregate::group_by::<_, _, SessionStat>(records, dimensions)
        .iter()
        .map(|bucket| bucket.derive(|key, stat| SessionMetrics::new(key.clone(), stat)))
        .collect()
}

pub fn session_totals(records: &[SessionRecord]) -> SessionMetrics {
    let stat: SessionStat = aggregate::total(records);
    SessionMetrics::new(GroupKey::single("Total"), &stat)
}

const OVERVIEW_DIMENSIONS: [SessionDimension; 5] = [
    SessionDimension::Format,
    SessionDimension::Trainer,
    SessionDimension::Location,
    SessionDimension::TimeSlot,
    SessionDimension::DayOfWeek,
];

/// Per-format, per-trainer, per-location, per-slot and per-weekday tables
/// plus totals, filled in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub by_format: Vec<SessionMetrics>,
    pub by_trainer: Vec<SessionMetrics>,
    pub by_location: Vec<SessionMetrics>,
    pub by_time_slot: Vec<SessionMetrics>,
    pub by_weekday: Vec<SessionMetrics>,
    pub totals: SessionMetrics,
}

impl ClassOverview {
    pub fn collect(records: &[SessionRecord]) -> Self {
        let mut groupings: [Grouping<String, SessionStat>; 5] = Default::default();
        let mut total = SessionStat::default();
        for record in records {
            total.extend(record);
            for (grouping, dimension) in groupings.iter_mut().zip(OVERVIEW_DIMENSIONS) {
                if let Some(key) = dimension.key(record) {
                    grouping.add(key, record);
                }
            }
        }

        let [by_format, by_trainer, by_location, by_time_slot, by_weekday] = groupings.map(|grouping| {
            grouping
                .finish()
                .iter()
                .map(|bucket| bucket.derive(|key, stat| SessionMetrics::new(GroupKey::single(key.as_str()), stat)))
                .collect::<Vec<_>>()
        });
        ClassOverview {
            by_format,
            by_trainer,
            by_location,
            by_time_slot,
            by_weekday,
            totals: SessionMetrics::new(GroupKey::single("Total"), &total),
        }
    }

    fn tables_mut(&mut self) -> [&mut Vec<SessionMetrics>; 5] {
        [
            &mut self.by_format,
            &mut self.by_trainer,
            &mut self.by_location,
            &mut self.by_time_slot,
            &mut self.by_weekday,
        ]
    }

    /// Orders every table by `metric`, highest first.
    pub fn sort_by(&mut self, metric: SessionMetric) {
        for rows in self.tables_mut() {
            sort_rows(rows, |row| metric.value(row), SortDirection::Desc);
        }
    }

    /// Keeps the zero-based `page` of every table. Totals are untouched.
    pub fn keep_page(&mut self, page: usize) {
        for rows in self.tables_mut() {
            *rows = paginate(rows, page).to_vec();
        }
    }
}
