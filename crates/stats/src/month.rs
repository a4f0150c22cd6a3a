use chrono::{Datelike as _, NaiveDate};
use log::debug;
use model::{
    client::NewClientRecord, errors::RecordError, payroll::PayrollRecord, session::SessionRecord,
    statistics::MonthKey,
};

use crate::{
    aggregate::{Accumulate, Bucket, GroupKey, Grouping},
    clients::{ConversionMetrics, ConversionStat},
    payroll::{PayrollMetrics, PayrollStat},
    sessions::{SessionMetrics, SessionStat},
};

/// First month of the month-on-month tables.
pub fn sequence_start() -> MonthKey {
    MonthKey::january(2024)
}

/// One bucket per month in `from..=to`, months without records included.
/// Records outside the window or without a month are left out.
pub fn monthly<T, A>(
    records: &[T],
    month_fn: impl Fn(&T) -> Result<MonthKey, RecordError>,
    from: MonthKey,
    to: MonthKey,
) -> Vec<Bucket<MonthKey, A>>
where
    A: Default + Accumulate<T>,
{
    let mut grouping = Grouping::seeded(MonthKey::sequence(from, to));
    let mut outside = 0;
    for record in records {
        match month_fn(record) {
            Ok(month) => {
                if !grouping.add(month, record) {
                    outside += 1;
                }
            }
            Err(err) => debug!("Skipping record: {}", err),
        }
    }
    if outside > 0 {
        debug!("{} records fall outside {}..={}", outside, from, to);
    }
    grouping.finish()
}

fn month_of(date: Result<NaiveDate, RecordError>) -> Result<MonthKey, RecordError> {
    date.map(MonthKey::from_date)
}

fn month_key(month: &MonthKey) -> GroupKey {
    GroupKey::single(month.to_string())
}

pub fn session_month_on_month(records: &[SessionRecord], from: MonthKey, to: MonthKey) -> Vec<SessionMetrics> {
    monthly::<_, SessionStat>(records, |record| month_of(record.session_date()), from, to)
        .iter()
        .map(|bucket| bucket.derive(|month, stat| SessionMetrics::new(month_key(month), stat)))
        .collect()
}

pub fn payroll_month_on_month(records: &[PayrollRecord], from: MonthKey, to: MonthKey) -> Vec<PayrollMetrics> {
    monthly::<_, PayrollStat>(records, PayrollRecord::month, from, to)
        .iter()
        .map(|bucket| bucket.derive(|month, stat| PayrollMetrics::new(month_key(month), stat)))
        .collect()
}

pub fn client_month_on_month(
    records: &[NewClientRecord],
    from: MonthKey,
    to: MonthKey,
) -> Vec<ConversionMetrics> {
    monthly::<_, ConversionStat>(records, |record| month_of(record.first_visit()), from, to)
        .iter()
        .map(|bucket| bucket.derive(|month, stat| ConversionMetrics::new(month_key(month), stat)))
        .collect()
}

/// Calendar years present in the records, oldest first. Records without a
/// readable date are left out.
pub fn session_year_on_year(records: &[SessionRecord]) -> Vec<SessionMetrics> {
    let mut years: Vec<i32> = records
        .iter()
        .filter_map(|record| record.session_date().ok())
        .map(|date| date.year())
        .collect();
    years.sort_unstable();
    years.dedup();

    let mut grouping: Grouping<i32, SessionStat> = Grouping::seeded(years);
    for record in records {
        if let Ok(date) = record.session_date() {
            grouping.add(date.year(), record);
        }
    }
    grouping
        .finish()
        .iter()
        .map(|bucket| bucket.derive(|year, stat| SessionMetrics::new(GroupKey::single(year.to_string()), stat)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{delta, period_deltas};

    fn session(date: &str, checked_in: u32) -> SessionRecord {
        SessionRecord {
            date: Some(date.to_owned()),
            capacity: 10,
            checked_in_count: checked_in,
            ..Default::default()
        }
    }

    fn key(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn test_empty_months_are_seeded() {
        let records = vec![session("10/01/2024", 5), session("2024-03-02", 8), session("garbage", 1)];
        let rows = session_month_on_month(&records, key(2024, 1), key(2024, 4));
        let keys: Vec<String> = rows.iter().map(|row| row.key.to_string()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03", "2024-04"]);
        assert_eq!(rows[0].total_checked_in, 5);
        assert_eq!(rows[1].total_sessions, 0);
        assert_eq!(rows[1].fill_rate, 0.0);
        assert_eq!(rows[2].fill_rate, 80.0);
        assert_eq!(rows[3].total_sessions, 0);
    }

    #[test]
    fn test_outside_window_is_dropped() {
        let records = vec![session("15/12/2023", 5), session("15/01/2024", 5)];
        let rows = session_month_on_month(&records, sequence_start(), key(2024, 2));
        let total: u32 = rows.iter().map(|row| row.total_sessions).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_month_on_month_deltas() {
        let records = vec![session("15/02/2024", 5), session("15/03/2024", 10)];
        let rows = session_month_on_month(&records, key(2024, 1), key(2024, 3));
        let deltas = period_deltas(&rows, |row| row.total_checked_in as f64);
        assert_eq!(deltas[1].value, 5.0);
        assert_eq!(deltas[1].percentage, 0.0);
        assert_eq!(deltas[2].percentage, 100.0);

        assert_eq!(delta(50.0, 0.0).percentage, 0.0);
    }

    #[test]
    fn test_year_on_year() {
        let records = vec![session("15/02/2025", 5), session("15/03/2024", 10), session("2025-06-01", 1)];
        let rows = session_year_on_year(&records);
        let keys: Vec<String> = rows.iter().map(|row| row.key.to_string()).collect();
        assert_eq!(keys, vec!["2024", "2025"]);
        assert_eq!(rows[1].total_sessions, 2);
    }

    #[test]
    fn test_payroll_and_clients_monthly() {
        let payroll = vec![PayrollRecord {
            month_year: Some("Feb 2024".to_owned()),
            total_sessions: 12,
            ..Default::default()
        }];
        let rows = payroll_month_on_month(&payroll, key(2024, 1), key(2024, 2));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].total_sessions, 12);

        let clients = vec![NewClientRecord {
            first_visit_date: Some("2024-01-20".to_owned()),
            ..Default::default()
        }];
        let rows = client_month_on_month(&clients, key(2024, 1), key(2024, 2));
        assert_eq!(rows[0].total_clients, 1);
        assert_eq!(rows[1].total_clients, 0);
    }
}
