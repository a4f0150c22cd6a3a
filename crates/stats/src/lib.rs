pub mod aggregate;
pub mod clients;
pub mod delta;
pub mod filter;
pub mod month;
pub mod payroll;
pub mod rank;
pub mod sessions;

use clients::{ClientDimension, ConversionMetrics};
use filter::{NewClientFilterOptions, SessionFilter};
use log::debug;
use model::{
    client::NewClientRecord, payroll::PayrollRecord, session::SessionRecord, statistics::MonthKey,
};
use payroll::{FormatShare, PayrollDimension, PayrollMetrics};
use rank::{sort_rows, Metric, SortDirection, ViewMode};
use serde::Serialize;
use sessions::{ClassOverview, SessionDimension, SessionMetrics};

/// Month-on-month tables for every record kind over the same window.
#[derive(Debug, Clone, Serialize)]
pub struct MonthOnMonth {
    pub from: MonthKey,
    pub to: MonthKey,
    pub sessions: Vec<SessionMetrics>,
    pub payroll: Vec<PayrollMetrics>,
    pub clients: Vec<ConversionMetrics>,
}

/// Read-only view over loaded records.
pub struct Statistics<'a> {
    sessions: &'a [SessionRecord],
    payroll: &'a [PayrollRecord],
    clients: &'a [NewClientRecord],
}

impl<'a> Statistics<'a> {
    pub fn new(
        sessions: &'a [SessionRecord],
        payroll: &'a [PayrollRecord],
        clients: &'a [NewClientRecord],
    ) -> Self {
        Statistics {
            sessions,
            payroll,
            clients,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.payroll.is_empty() && self.clients.is_empty()
    }

    pub fn classes_by(&self, dimensions: &[SessionDimension], filter: &SessionFilter) -> Vec<SessionMetrics> {
        let sessions = filter.apply(self.sessions);
        debug!("Grouping {} sessions by {:?}", sessions.len(), dimensions);
        sessions::group_sessions(&sessions, dimensions)
    }

    pub fn class_overview(&self, filter: &SessionFilter) -> ClassOverview {
        ClassOverview::collect(&filter.apply(self.sessions))
    }

    pub fn class_totals(&self, filter: &SessionFilter) -> SessionMetrics {
        sessions::session_totals(&filter.apply(self.sessions))
    }

    pub fn trainers_by(&self, dimensions: &[PayrollDimension]) -> Vec<PayrollMetrics> {
        payroll::group_payroll(self.payroll, dimensions)
    }

    pub fn format_breakdown(&self) -> Vec<FormatShare> {
        payroll::format_breakdown(self.payroll)
    }

    pub fn conversion_by(
        &self,
        dimensions: &[ClientDimension],
        filter: &NewClientFilterOptions,
    ) -> Vec<ConversionMetrics> {
        let clients = filter.apply(self.clients);
        debug!("Grouping {} new clients by {:?}", clients.len(), dimensions);
        clients::group_clients(&clients, dimensions)
    }

    pub fn conversion_totals(&self, filter: &NewClientFilterOptions) -> ConversionMetrics {
        clients::client_totals(&filter.apply(self.clients))
    }

    /// Tables from January 2024 through the current month.
    pub fn month_on_month(
        &self,
        session_filter: &SessionFilter,
        client_filter: &NewClientFilterOptions,
    ) -> MonthOnMonth {
        self.month_on_month_until(MonthKey::current(), session_filter, client_filter)
    }

    /// `session_filter` narrows the class table and, by trainer and location,
    /// the payroll table. `client_filter` narrows the new-client table.
    pub fn month_on_month_until(
        &self,
        to: MonthKey,
        session_filter: &SessionFilter,
        client_filter: &NewClientFilterOptions,
    ) -> MonthOnMonth {
        let from = month::sequence_start();
        let sessions = session_filter.apply(self.sessions);
        let payroll = session_filter.apply_payroll(self.payroll);
        let clients = client_filter.apply(self.clients);
        MonthOnMonth {
            from,
            to,
            sessions: month::session_month_on_month(&sessions, from, to),
            payroll: month::payroll_month_on_month(&payroll, from, to),
            clients: month::client_month_on_month(&clients, from, to),
        }
    }

    pub fn year_on_year(&self, filter: &SessionFilter) -> Vec<SessionMetrics> {
        month::session_year_on_year(&filter.apply(self.sessions))
    }
}

/// Top or bottom `count` rows of `rows` by `metric`.
pub fn ranked<R: Clone, M: Metric<R>>(rows: &[R], metric: M, mode: ViewMode, count: usize) -> Vec<R> {
    rank::rank(rows, |row| metric.value(row), mode, count)
}

/// `rows` ordered by `metric`, highest first.
pub fn sorted<R, M: Metric<R>>(mut rows: Vec<R>, metric: M) -> Vec<R> {
    sort_rows(&mut rows, |row| metric.value(row), SortDirection::Desc);
    rows
}
