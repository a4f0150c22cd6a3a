pub mod table;

use itertools::Itertools as _;
use model::statistics::MonthKey;
use stats::{
    aggregate::GroupKey,
    clients::{ClientDimension, ConversionMetric},
    delta::period_deltas,
    filter::{NewClientFilterOptions, SessionFilter},
    payroll::{PayrollDimension, PayrollMetric},
    rank::{page_count, paginate, Metric, Unit, ViewMode},
    ranked,
    sessions::{SessionMetric, SessionMetrics},
    sorted, MonthOnMonth, Statistics,
};
use table::{fmt_delta, fmt_value, Table};

const CLASS_COLUMNS: [SessionMetric; 7] = [
    SessionMetric::Sessions,
    SessionMetric::Capacity,
    SessionMetric::CheckedIn,
    SessionMetric::FillRate,
    SessionMetric::ShowUpRate,
    SessionMetric::AvgAttendance,
    SessionMetric::Revenue,
];

const TRAINER_COLUMNS: [PayrollMetric; 8] = [
    PayrollMetric::Sessions,
    PayrollMetric::Customers,
    PayrollMetric::Revenue,
    PayrollMetric::Utilization,
    PayrollMetric::ConversionRate,
    PayrollMetric::RetentionRate,
    PayrollMetric::EfficiencyScore,
    PayrollMetric::ConsistencyScore,
];

const CLIENT_COLUMNS: [ConversionMetric; 7] = [
    ConversionMetric::Clients,
    ConversionMetric::NewClients,
    ConversionMetric::Converted,
    ConversionMetric::ConversionRate,
    ConversionMetric::RetentionRate,
    ConversionMetric::AvgLtv,
    ConversionMetric::AvgConversionSpan,
];

const MONTH_COLUMNS: [SessionMetric; 4] = [
    SessionMetric::Sessions,
    SessionMetric::CheckedIn,
    SessionMetric::FillRate,
    SessionMetric::Revenue,
];

fn headers<R, M: Metric<R>>(first: &str, metrics: &[M]) -> Vec<String> {
    std::iter::once(first.to_owned())
        .chain(metrics.iter().map(|m| m.name().to_owned()))
        .collect()
}

fn cells<R, M: Metric<R>>(row: &R, metrics: &[M]) -> Vec<String> {
    metrics
        .iter()
        .map(|m| fmt_value(m.value(row), m.unit()))
        .collect()
}

pub fn metric_table<R, M: Metric<R>>(
    title: &str,
    key_header: &str,
    rows: &[R],
    key: impl Fn(&R) -> String,
    metrics: &[M],
) -> Table {
    let mut table = Table::new(title, headers(key_header, metrics));
    for row in rows {
        let mut line = vec![key(row)];
        line.extend(cells(row, metrics));
        table.push(line);
    }
    table
}

/// Title and rows of the zero-based `page`; `None` keeps every row.
fn paged<'r, R>(title: &str, rows: &'r [R], page: Option<usize>) -> (String, &'r [R]) {
    match page {
        Some(page) => (
            format!("{} (page {} of {})", title, page + 1, page_count(rows.len()).max(1)),
            paginate(rows, page),
        ),
        None => (title.to_owned(), rows),
    }
}

fn month_label(key: &GroupKey) -> String {
    let key = key.to_string();
    MonthKey::parse(&key)
        .map(|month| month.label())
        .unwrap_or(key)
}

pub fn classes(
    stats: &Statistics,
    filter: &SessionFilter,
    metric: SessionMetric,
    page: Option<usize>,
) -> String {
    let mut overview = stats.class_overview(filter);
    overview.sort_by(metric);
    let sections = [
        ("Classes by format", "Format", overview.by_format),
        ("Classes by trainer", "Trainer", overview.by_trainer),
        ("Classes by location", "Location", overview.by_location),
        ("Classes by time slot", "Time", overview.by_time_slot),
        ("Classes by day", "Day", overview.by_weekday),
    ];
    let mut msg = String::new();
    for (title, header, rows) in sections {
        let (title, rows) = paged(title, &rows, page);
        let table = metric_table(&title, header, rows, |row| row.key.to_string(), &CLASS_COLUMNS);
        msg.push_str(&table.render());
        msg.push('\n');
    }
    let totals = overview.totals;
    if totals.total_sessions > 0 {
        msg.push_str(&format!(
            "Total: {} sessions, {} checked in, fill rate {}\n",
            totals.total_sessions,
            totals.total_checked_in,
            fmt_value(totals.fill_rate, Unit::Percent),
        ));
    }
    msg
}

pub fn trainers(stats: &Statistics, metric: PayrollMetric, count: usize) -> String {
    let rows = stats.trainers_by(&[PayrollDimension::Trainer]);
    let mut msg = String::new();
    for mode in [ViewMode::Top, ViewMode::Bottom] {
        let rows = ranked(&rows, metric, mode, count);
        let title = format!("{} {} trainers by {}", mode, count, metric.name().to_lowercase());
        let table = metric_table(&title, "Trainer", &rows, |row| row.key.to_string(), &TRAINER_COLUMNS);
        msg.push_str(&table.render());
        msg.push('\n');
    }

    let breakdown = stats.format_breakdown();
    let mut table = Table::new(
        "Format breakdown",
        ["Format", "Sessions", "Share", "Revenue", "Revenue share", "Avg class"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
    );
    for share in breakdown.iter().filter(|share| share.totals.sessions > 0) {
        table.push(vec![
            share.format.to_owned(),
            share.totals.sessions.to_string(),
            format!("{:.1}%", share.session_share),
            share.totals.revenue.to_string(),
            format!("{:.1}%", share.revenue_share),
            format!("{:.1}", share.avg_class_size),
        ]);
    }
    msg.push_str(&table.render());
    msg
}

/// Period table with a trailing change column for `metric`.
pub fn delta_table<R, M: Metric<R>>(
    title: &str,
    key_header: &str,
    rows: &[R],
    key: impl Fn(&R) -> String,
    columns: &[M],
    metric: M,
) -> Table {
    let mut header = headers(key_header, columns);
    header.push(format!("Δ {}", metric.name()));
    let mut table = Table::new(title, header);
    let deltas = period_deltas(rows, |row| metric.value(row));
    for (row, delta) in rows.iter().zip(deltas) {
        let mut line = vec![key(row)];
        line.extend(cells(row, columns));
        line.push(fmt_delta(&delta));
        table.push(line);
    }
    table
}

pub fn months(mom: &MonthOnMonth, metric: SessionMetric) -> String {
    let title = format!(
        "Classes month on month ({} to {})",
        mom.from.label(),
        mom.to.label()
    );
    [
        delta_table(&title, "Month", &mom.sessions, |row| month_label(&row.key), &MONTH_COLUMNS, metric),
        delta_table(
            "Payroll month on month",
            "Month",
            &mom.payroll,
            |row| month_label(&row.key),
            &[PayrollMetric::Sessions, PayrollMetric::Revenue, PayrollMetric::Utilization],
            PayrollMetric::Revenue,
        ),
        delta_table(
            "New clients month on month",
            "Month",
            &mom.clients,
            |row| month_label(&row.key),
            &[ConversionMetric::Clients, ConversionMetric::Converted, ConversionMetric::ConversionRate],
            ConversionMetric::Clients,
        ),
    ]
    .iter()
    .map(Table::render)
    .join("\n")
}

pub fn years(rows: &[SessionMetrics], metric: SessionMetric) -> String {
    delta_table(
        "Classes year on year",
        "Year",
        rows,
        |row| row.key.to_string(),
        &MONTH_COLUMNS,
        metric,
    )
    .render()
}

pub fn clients(
    stats: &Statistics,
    filter: &NewClientFilterOptions,
    metric: ConversionMetric,
    page: Option<usize>,
) -> String {
    let sections = [
        ("Conversion by trainer", "Trainer", ClientDimension::Trainer),
        ("Conversion by location", "Location", ClientDimension::Location),
        ("Conversion by payment method", "Payment", ClientDimension::PaymentMethod),
    ];
    let mut msg = String::new();
    for (title, header, dimension) in sections {
        let rows = sorted(stats.conversion_by(&[dimension], filter), metric);
        let (title, rows) = paged(title, &rows, page);
        let table = metric_table(&title, header, rows, |row| row.key.to_string(), &CLIENT_COLUMNS);
        msg.push_str(&table.render());
        msg.push('\n');
    }
    let totals = stats.conversion_totals(filter);
    if totals.total_clients > 0 {
        msg.push_str(
            &[
                format!("{} clients", totals.total_clients),
                format!("{} converted", totals.converted),
                format!("conversion {}", fmt_value(totals.conversion_rate, Unit::Percent)),
                format!("retention {}", fmt_value(totals.retention_rate, Unit::Percent)),
            ]
            .iter()
            .join(", "),
        );
        msg.push('\n');
    }
    msg
}

#[cfg(test)]
mod tests {
    use model::{
        client::{ConversionStatus, NewClientRecord},
        decimal::Decimal,
        payroll::PayrollRecord,
        session::SessionRecord,
    };

    use super::*;

    fn session(format: &str, capacity: u32, checked_in: u32) -> SessionRecord {
        SessionRecord {
            cleaned_class: Some(format.to_owned()),
            trainer_name: Some("Anisha".to_owned()),
            date: Some("04/03/2024".to_owned()),
            capacity,
            checked_in_count: checked_in,
            ..Default::default()
        }
    }

    fn payroll(trainer: &str, paid: i64) -> PayrollRecord {
        PayrollRecord {
            teacher_name: Some(trainer.to_owned()),
            month_year: Some("Mar 2024".to_owned()),
            total_sessions: 4,
            non_empty_sessions: 4,
            cycle_sessions: 4,
            cycle_paid: Decimal::int(paid),
            total_paid: Decimal::int(paid),
            ..Default::default()
        }
    }

    #[test]
    fn test_classes_report() {
        let sessions = vec![session("Cycle", 10, 8), session("Cycle", 10, 4), session("Barre", 20, 0)];
        let stats = Statistics::new(&sessions, &[], &[]);
        let report = classes(&stats, &SessionFilter::default(), SessionMetric::FillRate, None);
        let cycle = report.lines().find(|line| line.starts_with("Cycle")).unwrap();
        assert!(cycle.contains("60.0%"));
        assert!(report.contains("Total: 3 sessions, 12 checked in"));
        let format_lines: Vec<&str> = report
            .lines()
            .skip_while(|line| !line.starts_with("Format"))
            .skip(2)
            .take(2)
            .collect();
        assert!(format_lines[0].starts_with("Cycle"));
        assert!(format_lines[1].starts_with("Barre"));
    }

    #[test]
    fn test_empty_report() {
        let stats = Statistics::new(&[], &[], &[]);
        let report = classes(&stats, &SessionFilter::default(), SessionMetric::FillRate, None);
        assert_eq!(report.matches(table::NO_DATA).count(), 5);
        assert!(!report.contains("Total:"));
        assert!(trainers(&stats, PayrollMetric::Revenue, 3).contains(table::NO_DATA));
        let filter = NewClientFilterOptions::default();
        assert!(clients(&stats, &filter, ConversionMetric::ConversionRate, None).contains(table::NO_DATA));
    }

    #[test]
    fn test_trainers_report() {
        let payroll = vec![payroll("Anisha", 900), payroll("Bret", 300), payroll("Cara", 600)];
        let stats = Statistics::new(&[], &payroll, &[]);
        let report = trainers(&stats, PayrollMetric::Revenue, 1);
        assert!(report.contains("top 1 trainers by revenue"));
        let names: Vec<&str> = report
            .lines()
            .filter(|line| ["Anisha", "Bret", "Cara"].iter().any(|n| line.starts_with(n)))
            .map(|line| line.split_whitespace().next().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Anisha", "Bret"]);
        assert!(report.contains("Format breakdown"));
        assert!(report.contains("100.0%"));
    }

    #[test]
    fn test_months_report() {
        let sessions = vec![session("Cycle", 10, 5)];
        let stats = Statistics::new(&sessions, &[], &[]);
        let mom = stats.month_on_month_until(
            MonthKey::new(2024, 4).unwrap(),
            &SessionFilter::default(),
            &NewClientFilterOptions::default(),
        );
        let report = months(&mom, SessionMetric::CheckedIn);
        assert!(report.contains("Jan 2024"));
        assert!(report.contains("Apr 2024"));
        let march = report.lines().find(|line| line.starts_with("Mar 2024")).unwrap();
        assert!(march.ends_with("→ 0.0%"));
        let april = report.lines().find(|line| line.starts_with("Apr 2024")).unwrap();
        assert!(april.ends_with("↓ 100.0%"));
    }

    #[test]
    fn test_clients_report() {
        let records = vec![
            NewClientRecord {
                trainer_name: Some("Anisha".to_owned()),
                conversion_status: ConversionStatus::Converted,
                ..Default::default()
            },
            NewClientRecord {
                trainer_name: Some("Anisha".to_owned()),
                ..Default::default()
            },
        ];
        let stats = Statistics::new(&[], &[], &records);
        let filter = NewClientFilterOptions::default();
        let report = clients(&stats, &filter, ConversionMetric::ConversionRate, None);
        assert!(report.contains("2 clients, 1 converted, conversion 50.0%"));
    }

    #[test]
    fn test_paged_classes_report() {
        let sessions: Vec<SessionRecord> = (0..12)
            .map(|idx| session(&format!("Format {:02}", idx), 10, idx))
            .collect();
        let stats = Statistics::new(&sessions, &[], &[]);

        let first = classes(&stats, &SessionFilter::default(), SessionMetric::CheckedIn, Some(0));
        assert!(first.contains("Classes by format (page 1 of 2)"));
        assert!(first.contains("Classes by trainer (page 1 of 1)"));
        assert!(first.lines().any(|line| line.starts_with("Format 11")));
        assert!(!first.lines().any(|line| line.starts_with("Format 01")));
        assert!(first.contains("Total: 12 sessions"));

        let second = classes(&stats, &SessionFilter::default(), SessionMetric::CheckedIn, Some(1));
        let is_row = |line: &&str| line.starts_with("Format 0") || line.starts_with("Format 1");
        let formats: Vec<&str> = second.lines().filter(is_row).map(|line| &line[..9]).collect();
        assert_eq!(formats, vec!["Format 01", "Format 00"]);
        assert!(second.contains("Classes by trainer (page 2 of 1)"));
        assert!(second.contains(table::NO_DATA));

        let all = classes(&stats, &SessionFilter::default(), SessionMetric::CheckedIn, None);
        assert_eq!(all.lines().filter(is_row).count(), 12);
    }
}
