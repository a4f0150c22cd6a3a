use chrono::Datelike as _;
use model::{
    client::{ConversionStatus, NewClientRecord},
    decimal::Decimal,
    statistics::MonthKey,
};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::{
    aggregate::{self, per_unit, ratio, Accumulate, Dimension, GroupKey},
    rank::{Metric, Unit},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ClientDimension {
    Trainer,
    Location,
    Month,
    Year,
    PaymentMethod,
    Membership,
    IsNew,
}

impl Dimension<NewClientRecord> for ClientDimension {
    fn key(&self, record: &NewClientRecord) -> Option<String> {
        match self {
            ClientDimension::Trainer => Some(record.trainer().to_owned()),
            ClientDimension::Location => Some(record.location().to_owned()),
            ClientDimension::Month => record
                .first_visit()
                .ok()
                .map(|date| MonthKey::from_date(date).to_string()),
            ClientDimension::Year => record.first_visit().ok().map(|date| date.year().to_string()),
            ClientDimension::PaymentMethod => Some(record.payment_method().to_owned()),
            ClientDimension::Membership => Some(record.membership().to_owned()),
            ClientDimension::IsNew => Some(record.is_new_label().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionStat {
    pub clients: u32,
    pub new_clients: u32,
    pub converted: u32,
    pub not_converted: u32,
    pub pending: u32,
    pub retained: u32,
    pub ltv: Decimal,
    pub conversion_span_days: u64,
    pub conversion_span_clients: u32,
    pub visits_post_trial: u64,
}

impl Accumulate<NewClientRecord> for ConversionStat {
    fn extend(&mut self, record: &NewClientRecord) {
        self.clients += 1;
        if record.is_new_client() {
            self.new_clients += 1;
        }
        match record.conversion_status {
            ConversionStatus::Converted => self.converted += 1,
            ConversionStatus::NotConverted => self.not_converted += 1,
            ConversionStatus::Pending => self.pending += 1,
            ConversionStatus::Unknown => {}
        }
        if record.is_retained() {
            self.retained += 1;
        }
        self.ltv += record.ltv;
        if record.is_converted() && record.conversion_span > 0 {
            self.conversion_span_days += record.conversion_span as u64;
            self.conversion_span_clients += 1;
        }
        self.visits_post_trial += record.visits_post_trial as u64;
    }
}

/// New-client conversion row derived from a [`ConversionStat`] bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetrics {
    pub key: GroupKey,
    pub total_clients: u32,
    pub new_clients: u32,
    pub converted: u32,
    pub not_converted: u32,
    pub pending: u32,
    pub retained: u32,
    pub total_ltv: Decimal,
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub new_client_share: f64,
    pub avg_ltv: f64,
    pub avg_conversion_span: f64,
    pub avg_visits_post_trial: f64,
}

impl ConversionMetrics {
    pub fn new(key: GroupKey, stat: &ConversionStat) -> Self {
        let clients = stat.clients as f64;
        ConversionMetrics {
            key,
            total_clients: stat.clients,
            new_clients: stat.new_clients,
            converted: stat.converted,
            not_converted: stat.not_converted,
            pending: stat.pending,
            retained: stat.retained,
            total_ltv: stat.ltv,
            conversion_rate: ratio(stat.converted as f64, clients),
            retention_rate: ratio(stat.retained as f64, clients),
            new_client_share: ratio(stat.new_clients as f64, clients),
            avg_ltv: per_unit(stat.ltv.to_f64(), clients),
            avg_conversion_span: per_unit(
                stat.conversion_span_days as f64,
                stat.conversion_span_clients as f64,
            ),
            avg_visits_post_trial: per_unit(stat.visits_post_trial as f64, clients),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ConversionMetric {
    Clients,
    NewClients,
    Converted,
    Retained,
    #[default]
    ConversionRate,
    RetentionRate,
    AvgLtv,
    TotalLtv,
    AvgConversionSpan,
    AvgVisitsPostTrial,
}

impl Metric<ConversionMetrics> for ConversionMetric {
    fn value(&self, row: &ConversionMetrics) -> f64 {
        match self {
            ConversionMetric::Clients => row.total_clients as f64,
            ConversionMetric::NewClients => row.new_clients as f64,
            ConversionMetric::Converted => row.converted as f64,
            ConversionMetric::Retained => row.retained as f64,
            ConversionMetric::ConversionRate => row.conversion_rate,
            ConversionMetric::RetentionRate => row.retention_rate,
            ConversionMetric::AvgLtv => row.avg_ltv,
            ConversionMetric::TotalLtv => row.total_ltv.to_f64(),
            ConversionMetric::AvgConversionSpan => row.avg_conversion_span,
            ConversionMetric::AvgVisitsPostTrial => row.avg_visits_post_trial,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConversionMetric::Clients => "Clients",
            ConversionMetric::NewClients => "New",
            ConversionMetric::Converted => "Converted",
            ConversionMetric::Retained => "Retained",
            ConversionMetric::ConversionRate => "Conversion",
            ConversionMetric::RetentionRate => "Retention",
            ConversionMetric::AvgLtv => "Avg LTV",
            ConversionMetric::TotalLtv => "Total LTV",
            ConversionMetric::AvgConversionSpan => "Avg days to convert",
            ConversionMetric::AvgVisitsPostTrial => "Visits after trial",
        }
    }

    fn unit(&self) -> Unit {
        match self {
            ConversionMetric::Clients
            | ConversionMetric::NewClients
            | ConversionMetric::Converted
            | ConversionMetric::Retained
            | ConversionMetric::AvgVisitsPostTrial => Unit::Count,
            ConversionMetric::ConversionRate | ConversionMetric::RetentionRate => Unit::Percent,
            ConversionMetric::AvgLtv | ConversionMetric::TotalLtv => Unit::Money,
            ConversionMetric::AvgConversionSpan => Unit::Days,
        }
    }
}

pub fn group_clients(records: &[NewClientRecord], dimensions: &[ClientDimension]) -> Vec<ConversionMetrics> {
    aggregate::group_by::<_, _, ConversionStat>(records, dimensions)
        .iter()
        .map(|bucket| bucket.derive(|key, stat| ConversionMetrics::new(key.clone(), stat)))
        .collect()
}

pub fn client_totals(records: &[NewClientRecord]) -> ConversionMetrics {
    let stat: ConversionStat = aggregate::total(records);
    ConversionMetrics::new(GroupKey::single("Total"), &stat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::client::RetentionStatus;

    fn client(trainer: &str, status: ConversionStatus, ltv: i64, span: u32) -> NewClientRecord {
        NewClientRecord {
            trainer_name: Some(trainer.to_owned()),
            conversion_status: status,
            ltv: Decimal::int(ltv),
            conversion_span: span,
            is_new: Some("Yes".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_conversion_by_trainer() {
        let mut records = vec![
            client("Anisha", ConversionStatus::Converted, 9000, 10),
            client("Anisha", ConversionStatus::NotConverted, 1000, 0),
            client("Anisha", ConversionStatus::Pending, 2000, 0),
            client("Anisha", ConversionStatus::Converted, 6000, 20),
            client("Bret", ConversionStatus::Converted, 5000, 0),
        ];
        records[0].retention_status = RetentionStatus::Retained;
        records[1].is_new = Some("No".to_owned());

        let rows = group_clients(&records, &[ClientDimension::Trainer]);
        assert_eq!(rows.len(), 2);

        let anisha = &rows[0];
        assert_eq!(anisha.total_clients, 4);
        assert_eq!(anisha.new_clients, 3);
        assert_eq!(anisha.converted, 2);
        assert_eq!(anisha.not_converted, 1);
        assert_eq!(anisha.pending, 1);
        assert_eq!(anisha.conversion_rate, 50.0);
        assert_eq!(anisha.retention_rate, 25.0);
        assert_eq!(anisha.avg_ltv, 4500.0);
        assert_eq!(anisha.avg_conversion_span, 15.0);
        assert_eq!(anisha.new_client_share, 75.0);

        let bret = &rows[1];
        assert_eq!(bret.conversion_rate, 100.0);
        assert_eq!(bret.avg_conversion_span, 0.0);
    }

    #[test]
    fn test_empty_totals() {
        let totals = client_totals(&[]);
        assert_eq!(totals.total_clients, 0);
        assert_eq!(totals.conversion_rate, 0.0);
        assert_eq!(totals.avg_ltv, 0.0);
        assert!(group_clients(&[], &[ClientDimension::Location]).is_empty());
    }

    #[test]
    fn test_month_of_first_visit() {
        let mut records = vec![
            client("Anisha", ConversionStatus::Converted, 0, 0),
            client("Anisha", ConversionStatus::Converted, 0, 0),
        ];
        records[0].first_visit_date = Some("05/02/2024".to_owned());
        let rows = group_clients(&records, &[ClientDimension::Month]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.to_string(), "2024-02");
    }
}
