use std::collections::BTreeMap;

use model::{decimal::Decimal, payroll::PayrollRecord, statistics::MonthKey};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::{
    aggregate::{self, per_unit, ratio, Accumulate, Dimension, GroupKey},
    rank::{Metric, Unit},
};

const UTILIZATION_WEIGHT: f64 = 0.4;
const RETENTION_WEIGHT: f64 = 0.3;
const CONVERSION_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PayrollDimension {
    Trainer,
    Location,
    Month,
    Year,
}

impl Dimension<PayrollRecord> for PayrollDimension {
    fn key(&self, record: &PayrollRecord) -> Option<String> {
        match self {
            PayrollDimension::Trainer => Some(record.trainer().to_owned()),
            PayrollDimension::Location => Some(record.location().to_owned()),
            PayrollDimension::Month => record.month().ok().map(|month| month.to_string()),
            PayrollDimension::Year => record.month().ok().map(|month| month.year().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FormatTotals {
    pub sessions: u64,
    pub customers: u64,
    pub revenue: Decimal,
}

impl FormatTotals {
    fn add(&mut self, sessions: u32, customers: u32, revenue: Decimal) {
        self.sessions += sessions as u64;
        self.customers += customers as u64;
        self.revenue += revenue;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayrollStat {
    pub rows: u32,
    pub sessions: u64,
    pub customers: u64,
    pub revenue: Decimal,
    pub cycle: FormatTotals,
    pub barre: FormatTotals,
    pub strength: FormatTotals,
    pub empty_sessions: u64,
    pub non_empty_sessions: u64,
    pub new_customers: u64,
    pub converted: u64,
    pub retained: u64,
    pub reported_conversion: f64,
    pub reported_retention: f64,
    pub monthly_revenue: BTreeMap<MonthKey, Decimal>,
}

impl Accumulate<PayrollRecord> for PayrollStat {
    fn extend(&mut self, record: &PayrollRecord) {
        self.rows += 1;
        self.sessions += record.total_sessions as u64;
        self.customers += record.total_customers as u64;
        self.revenue += record.total_paid;
        self.cycle
            .add(record.cycle_sessions, record.cycle_customers, record.cycle_paid);
        self.barre
            .add(record.barre_sessions, record.barre_customers, record.barre_paid);
        self.strength.add(
            record.strength_sessions,
            record.strength_customers,
            record.strength_paid,
        );
        self.empty_sessions += record.empty_sessions as u64;
        self.non_empty_sessions += record.non_empty_sessions as u64;
        self.new_customers += record.new_customers as u64;
        self.converted += record.converted as u64;
        self.retained += record.retained as u64;
        self.reported_conversion += record.conversion.value();
        self.reported_retention += record.retention.value();
        if let Ok(month) = record.month() {
            *self.monthly_revenue.entry(month).or_default() += record.total_paid;
        }
    }
}

impl PayrollStat {
    /// Count based when new-customer counts exist, otherwise the mean of
    /// the reported percentages.
    pub fn conversion_rate(&self) -> f64 {
        if self.new_customers > 0 {
            ratio(self.converted as f64, self.new_customers as f64)
        } else {
            per_unit(self.reported_conversion, self.rows as f64)
        }
    }

    pub fn retention_rate(&self) -> f64 {
        if self.new_customers > 0 {
            ratio(self.retained as f64, self.new_customers as f64)
        } else {
            per_unit(self.reported_retention, self.rows as f64)
        }
    }

    /// `100 - coefficient of variation` of monthly revenue, clamped to `0..=100`.
    pub fn consistency_score(&self) -> f64 {
        let values: Vec<f64> = self.monthly_revenue.values().map(Decimal::to_f64).collect();
        if values.is_empty() {
            return 0.0;
        }
        let mean = per_unit(values.iter().sum(), values.len() as f64);
        if mean <= 0.0 {
            return 0.0;
        }
        let variance = per_unit(
            values.iter().map(|v| (v - mean).powi(2)).sum(),
            values.len() as f64,
        );
        (100.0 - ratio(variance.sqrt(), mean)).clamp(0.0, 100.0)
    }
}

/// Trainer performance row derived from a [`PayrollStat`] bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollMetrics {
    pub key: GroupKey,
    pub total_sessions: u64,
    pub total_customers: u64,
    pub total_revenue: Decimal,
    pub empty_sessions: u64,
    pub non_empty_sessions: u64,
    pub avg_class_size: f64,
    pub revenue_per_session: f64,
    pub revenue_per_customer: f64,
    pub utilization: f64,
    pub empty_rate: f64,
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub efficiency_score: f64,
    pub consistency_score: f64,
    pub cycle_share: f64,
    pub barre_share: f64,
    pub strength_share: f64,
}

impl PayrollMetrics {
    pub fn new(key: GroupKey, stat: &PayrollStat) -> Self {
        let sessions = stat.sessions as f64;
        let revenue = stat.revenue.to_f64();
        let utilization = ratio(stat.non_empty_sessions as f64, sessions);
        let conversion_rate = stat.conversion_rate();
        let retention_rate = stat.retention_rate();
        PayrollMetrics {
            key,
            total_sessions: stat.sessions,
            total_customers: stat.customers,
            total_revenue: stat.revenue,
            empty_sessions: stat.empty_sessions,
            non_empty_sessions: stat.non_empty_sessions,
            avg_class_size: per_unit(stat.customers as f64, sessions),
            revenue_per_session: per_unit(revenue, sessions),
            revenue_per_customer: per_unit(revenue, stat.customers as f64),
            utilization,
            empty_rate: ratio(stat.empty_sessions as f64, sessions),
            conversion_rate,
            retention_rate,
            efficiency_score: efficiency_score(utilization, retention_rate, conversion_rate),
            consistency_score: stat.consistency_score(),
            cycle_share: ratio(stat.cycle.sessions as f64, sessions),
            barre_share: ratio(stat.barre.sessions as f64, sessions),
            strength_share: ratio(stat.strength.sessions as f64, sessions),
        }
    }
}

/// Weighted blend of utilization, retention and conversion on a `0..=100` scale.
pub fn efficiency_score(utilization: f64, retention_rate: f64, conversion_rate: f64) -> f64 {
    utilization.clamp(0.0, 100.0) * UTILIZATION_WEIGHT
        + retention_rate.clamp(0.0, 100.0) * RETENTION_WEIGHT
        + conversion_rate.clamp(0.0, 100.0) * CONVERSION_WEIGHT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PayrollMetric {
    Sessions,
    Customers,
    Revenue,
    AvgClassSize,
    RevenuePerSession,
    RevenuePerCustomer,
    Utilization,
    EmptyRate,
    ConversionRate,
    RetentionRate,
    #[default]
    EfficiencyScore,
    ConsistencyScore,
}

impl Metric<PayrollMetrics> for PayrollMetric {
    fn value(&self, row: &PayrollMetrics) -> f64 {
        match self {
            PayrollMetric::Sessions => row.total_sessions as f64,
            PayrollMetric::Customers => row.total_customers as f64,
            PayrollMetric::Revenue => row.total_revenue.to_f64(),
            PayrollMetric::AvgClassSize => row.avg_class_size,
            PayrollMetric::RevenuePerSession => row.revenue_per_session,
            PayrollMetric::RevenuePerCustomer => row.revenue_per_customer,
            PayrollMetric::Utilization => row.utilization,
            PayrollMetric::EmptyRate => row.empty_rate,
            PayrollMetric::ConversionRate => row.conversion_rate,
            PayrollMetric::RetentionRate => row.retention_rate,
            PayrollMetric::EfficiencyScore => row.efficiency_score,
            PayrollMetric::ConsistencyScore => row.consistency_score,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PayrollMetric::Sessions => "Sessions",
            PayrollMetric::Customers => "Customers",
            PayrollMetric::Revenue => "Revenue",
            PayrollMetric::AvgClassSize => "Avg class size",
            PayrollMetric::RevenuePerSession => "Revenue/session",
            PayrollMetric::RevenuePerCustomer => "Revenue/customer",
            PayrollMetric::Utilization => "Utilization",
            PayrollMetric::EmptyRate => "Empty rate",
            PayrollMetric::ConversionRate => "Conversion",
            PayrollMetric::RetentionRate => "Retention",
            PayrollMetric::EfficiencyScore => "Efficiency",
            PayrollMetric::ConsistencyScore => "Consistency",
        }
    }

    fn unit(&self) -> Unit {
        match self {
            PayrollMetric::Sessions | PayrollMetric::Customers | PayrollMetric::AvgClassSize => {
                Unit::Count
            }
            PayrollMetric::Revenue
            | PayrollMetric::RevenuePerSession
            | PayrollMetric::RevenuePerCustomer => Unit::Money,
            PayrollMetric::Utilization
            | PayrollMetric::EmptyRate
            | PayrollMetric::ConversionRate
            | PayrollMetric::RetentionRate => Unit::Percent,
            PayrollMetric::EfficiencyScore | PayrollMetric::ConsistencyScore => Unit::Score,
        }
    }
}

pub fn group_payroll(records: &[PayrollRecord], dimensions: &[PayrollDimension]) -> Vec<PayrollMetrics> {
    aggregate::group_by::<_, _, PayrollStat>(records, dimensions)
        .iter()
        .map(|bucket| bucket.derive(|key, stat| PayrollMetrics::new(key.clone(), stat)))
        .collect()
}

/// Session, customer and revenue split across the class formats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatShare {
    pub format: &'static str,
    pub totals: FormatTotals,
    pub session_share: f64,
    pub revenue_share: f64,
    pub avg_class_size: f64,
    pub revenue_per_session: f64,
}

pub fn format_breakdown(records: &[PayrollRecord]) -> Vec<FormatShare> {
    let stat: PayrollStat = aggregate::total(records);
    let sessions = (stat.cycle.sessions + stat.barre.sessions + stat.strength.sessions) as f64;
    let revenue = (stat.cycle.revenue + stat.barre.revenue + stat.strength.revenue).to_f64();
    [
        ("Cycle", stat.cycle),
        ("Barre", stat.barre),
        ("Strength", stat.strength),
    ]
    .into_iter()
    .map(|(format, totals)| FormatShare {
        format,
        totals,
        session_share: ratio(totals.sessions as f64, sessions),
        revenue_share: ratio(totals.revenue.to_f64(), revenue),
        avg_class_size: per_unit(totals.customers as f64, totals.sessions as f64),
        revenue_per_session: per_unit(totals.revenue.to_f64(), totals.sessions as f64),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::percent::Percent;

    fn payroll(trainer: &str, month: &str, sessions: u32, non_empty: u32, paid: i64) -> PayrollRecord {
        PayrollRecord {
            teacher_name: Some(trainer.to_owned()),
            month_year: Some(month.to_owned()),
            total_sessions: sessions,
            total_customers: non_empty * 5,
            total_paid: Decimal::int(paid),
            non_empty_sessions: non_empty,
            empty_sessions: sessions - non_empty,
            ..Default::default()
        }
    }

    #[test]
    fn test_group_by_trainer() {
        let records = vec![
            payroll("Anisha", "Jan 2025", 10, 8, 1000),
            payroll("Bret", "Jan 2025", 4, 4, 400),
            payroll("Anisha", "Feb 2025", 10, 10, 1000),
        ];
        let rows = group_payroll(&records, &[PayrollDimension::Trainer]);
        assert_eq!(rows.len(), 2);

        let anisha = &rows[0];
        assert_eq!(anisha.key.to_string(), "Anisha");
        assert_eq!(anisha.total_sessions, 20);
        assert_eq!(anisha.total_customers, 90);
        assert_eq!(anisha.utilization, 90.0);
        assert_eq!(anisha.empty_rate, 10.0);
        assert_eq!(anisha.avg_class_size, 4.5);
        assert_eq!(anisha.revenue_per_session, 100.0);
        assert_eq!(anisha.consistency_score, 100.0);
        assert_eq!(anisha.efficiency_score, 36.0);
    }

    #[test]
    fn test_conversion_sources() {
        let mut counted = payroll("Anisha", "Jan 2025", 10, 10, 0);
        counted.new_customers = 8;
        counted.converted = 2;
        counted.retained = 4;
        counted.conversion = Percent::new(90.0);
        let row = &group_payroll(&[counted], &[PayrollDimension::Trainer])[0];
        assert_eq!(row.conversion_rate, 25.0);
        assert_eq!(row.retention_rate, 50.0);

        let mut reported_a = payroll("Bret", "Jan 2025", 10, 10, 0);
        reported_a.conversion = Percent::new(20.0);
        reported_a.retention = Percent::new(40.0);
        let mut reported_b = payroll("Bret", "Feb 2025", 10, 10, 0);
        reported_b.conversion = Percent::new(30.0);
        let row = &group_payroll(&[reported_a, reported_b], &[PayrollDimension::Trainer])[0];
        assert_eq!(row.conversion_rate, 25.0);
        assert_eq!(row.retention_rate, 20.0);
    }

    #[test]
    fn test_consistency_score() {
        let records = vec![
            payroll("Anisha", "Jan 2025", 10, 10, 100),
            payroll("Anisha", "Feb 2025", 10, 10, 300),
        ];
        let row = &group_payroll(&records, &[PayrollDimension::Trainer])[0];
        assert_eq!(row.consistency_score, 50.0);

        let zero = &group_payroll(&[payroll("Cara", "Jan 2025", 0, 0, 0)], &[PayrollDimension::Trainer])[0];
        assert_eq!(zero.consistency_score, 0.0);
        assert_eq!(zero.utilization, 0.0);
        assert_eq!(zero.avg_class_size, 0.0);
        assert_eq!(zero.efficiency_score, 0.0);
    }

    #[test]
    fn test_month_dimension() {
        let records = vec![
            payroll("Anisha", "Jan 2025", 10, 10, 100),
            payroll("Bret", "2025-01", 10, 10, 100),
            payroll("Cara", "someday", 10, 10, 100),
        ];
        let rows = group_payroll(&records, &[PayrollDimension::Month]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.to_string(), "2025-01");
        assert_eq!(rows[0].total_sessions, 20);
    }

    #[test]
    fn test_format_breakdown() {
        let record = PayrollRecord {
            cycle_sessions: 6,
            cycle_customers: 60,
            cycle_paid: Decimal::int(600),
            barre_sessions: 4,
            barre_customers: 20,
            barre_paid: Decimal::int(400),
            ..Default::default()
        };
        let shares = format_breakdown(&[record]);
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].format, "Cycle");
        assert_eq!(shares[0].session_share, 60.0);
        assert_eq!(shares[0].revenue_share, 60.0);
        assert_eq!(shares[0].avg_class_size, 10.0);
        assert_eq!(shares[1].avg_class_size, 5.0);
        assert_eq!(shares[2].session_share, 0.0);
        assert_eq!(shares[2].revenue_per_session, 0.0);

        assert!(format_breakdown(&[]).iter().all(|share| share.session_share == 0.0));
    }
}
