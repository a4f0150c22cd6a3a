use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Rows per page in paginated tables.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Count,
    Percent,
    Money,
    Score,
    Days,
}

/// Column that a derived row can be projected onto.
pub trait Metric<R>: Copy {
    fn value(&self, row: &R) -> f64;
    fn name(&self) -> &'static str;
    fn unit(&self) -> Unit;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViewMode {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Stable sort by `metric`; equal values keep their input order.
pub fn sort_rows<R>(rows: &mut [R], metric: impl Fn(&R) -> f64, direction: SortDirection) {
    match direction {
        SortDirection::Asc => rows.sort_by(|a, b| compare(metric(a), metric(b))),
        SortDirection::Desc => rows.sort_by(|a, b| compare(metric(b), metric(a))),
    }
}

/// Top or bottom `count` rows by `metric`.
///
/// Both modes start from the stable descending order. `Bottom` reverses
/// that order instead of sorting ascending, so tied rows come out in
/// reverse input order.
pub fn rank<R: Clone>(rows: &[R], metric: impl Fn(&R) -> f64, mode: ViewMode, count: usize) -> Vec<R> {
    let mut sorted = rows.to_vec();
    sort_rows(&mut sorted, metric, SortDirection::Desc);
    if mode == ViewMode::Bottom {
        sorted.reverse();
    }
    sorted.truncate(count);
    sorted
}

pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Zero-based page of at most [`PAGE_SIZE`] rows. Out-of-range pages are empty.
pub fn paginate<R>(rows: &[R], page: usize) -> &[R] {
    let start = page.saturating_mul(PAGE_SIZE).min(rows.len());
    let end = (start + PAGE_SIZE).min(rows.len());
    &rows[start..end]
}
