use std::{
    cell::Cell,
    collections::HashMap,
    fmt::{self, Display},
    hash::Hash,
};

use log::debug;
use serde::Serialize;

/// Running sums folded from records of type `T`.
pub trait Accumulate<T> {
    fn extend(&mut self, record: &T);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<K, A> {
    pub key: K,
    pub stat: A,
}

impl<K, A> Bucket<K, A> {
    pub fn derive<R>(&self, f: impl Fn(&K, &A) -> R) -> R {
        f(&self.key, &self.stat)
    }
}

/// Bucket collector that keeps first-seen key order.
///
/// A seeded grouping only accepts the keys it was seeded with, so the
/// output always has one row per seed, even when no record hits it.
pub struct Grouping<K, A> {
    index: HashMap<K, usize>,
    buckets: Vec<Bucket<K, A>>,
    closed: bool,
}

impl<K, A> Grouping<K, A>
where
    K: Eq + Hash + Clone,
    A: Default,
{
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
            closed: false,
        }
    }

    pub fn seeded(keys: impl IntoIterator<Item = K>) -> Self {
        let mut grouping = Self::new();
        for key in keys {
            grouping.slot(key);
        }
        grouping.closed = true;
        grouping
    }

    fn slot(&mut self, key: K) -> usize {
        let buckets = &mut self.buckets;
        *self.index.entry(key.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                key,
                stat: A::default(),
            });
            buckets.len() - 1
        })
    }

    /// Folds `record` into the bucket of `key`. Returns `false` when a
    /// seeded grouping has no such key.
    pub fn add<T>(&mut self, key: K, record: &T) -> bool
    where
        A: Accumulate<T>,
    {
        let idx = if self.closed {
            match self.index.get(&key) {
                Some(idx) => *idx,
                None => return false,
            }
        } else {
            self.slot(key)
        };
        self.buckets[idx].stat.extend(record);
        true
    }

    pub fn finish(self) -> Vec<Bucket<K, A>> {
        self.buckets
    }
}

impl<K, A> Default for Grouping<K, A>
where
    K: Eq + Hash + Clone,
    A: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// One bucket per distinct key, in first-seen order. Empty input gives `[]`.
pub fn group_and_aggregate<T, K, A>(records: &[T], key_fn: impl Fn(&T) -> K) -> Vec<Bucket<K, A>>
where
    K: Eq + Hash + Clone,
    A: Default + Accumulate<T>,
{
    group_and_aggregate_filtered(records, |record| Some(key_fn(record)))
}

/// Like [`group_and_aggregate`], records with no key are skipped.
pub fn group_and_aggregate_filtered<T, K, A>(
    records: &[T],
    key_fn: impl Fn(&T) -> Option<K>,
) -> Vec<Bucket<K, A>>
where
    K: Eq + Hash + Clone,
    A: Default + Accumulate<T>,
{
    let mut grouping = Grouping::new();
    for record in records {
        if let Some(key) = key_fn(record) {
            grouping.add(key, record);
        }
    }
    grouping.finish()
}

/// Grouping dimension over records of type `T`.
pub trait Dimension<T>: Copy + Display {
    /// Bucket label of `record`, `None` when the record cannot be placed.
    fn key(&self, record: &T) -> Option<String>;
}

/// Bucket key made of one label per grouping dimension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new(parts: Vec<String>) -> Self {
        GroupKey(parts)
    }

    pub fn single(part: impl Into<String>) -> Self {
        GroupKey(vec![part.into()])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" / "))
    }
}

/// Groups `records` by the composite key of `dimensions`.
pub fn group_by<T, D, A>(records: &[T], dimensions: &[D]) -> Vec<Bucket<GroupKey, A>>
where
    D: Dimension<T>,
    A: Default + Accumulate<T>,
{
    let skipped = Cell::new(0usize);
    let buckets = group_and_aggregate_filtered(records, |record| {
        let key = dimensions
            .iter()
            .map(|dimension| dimension.key(record))
            .collect::<Option<Vec<_>>>()
            .map(GroupKey);
        if key.is_none() {
            skipped.set(skipped.get() + 1);
        }
        key
    });
    if skipped.get() > 0 {
        let names = dimensions.iter().map(|d| d.to_string()).collect::<Vec<_>>();
        debug!(
            "Skipped {} of {} records without a {} key",
            skipped.get(),
            records.len(),
            names.join("/")
        );
    }
    buckets
}

/// Sums every record into a single accumulator.
pub fn total<T, A>(records: &[T]) -> A
where
    A: Default + Accumulate<T>,
{
    let mut stat = A::default();
    for record in records {
        stat.extend(record);
    }
    stat
}

/// `numerator / denominator * 100`, or `0` when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// `numerator / denominator`, or `0` when the denominator is not positive.
pub fn per_unit(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
