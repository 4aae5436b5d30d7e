//! LootContext - tags and condition values of one loot resolution request

use crate::data::{CiMap, CiSet, LootBucketRow, LootTableEntry, LootTableRow, NumberOrString};

/// Conditions that hold for one loot resolution request
///
/// Tags are plain flags (mob type, dungeon, mutation element). Values are
/// numeric or text conditions such as `Level` or `EnemyLevel`. A condition
/// name may be answered by either; values are consulted first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LootContext {
    pub tags: CiSet,
    pub values: CiMap<NumberOrString>,
    /// Table and bucket ids excluded from resolution
    pub ignore_ids: CiSet,
    /// When non-empty, bucket rows must carry at least one of these tags
    pub bucket_tags: CiSet,
}

impl LootContext {
    pub fn new<T, V, S>(tags: T, values: V) -> Self
    where
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
        V: IntoIterator<Item = (S, NumberOrString)>,
    {
        LootContext {
            tags: tags.into_iter().collect(),
            values: values.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_ignore_ids<S: AsRef<str>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.ignore_ids = ids.into_iter().collect();
        self
    }

    pub fn with_bucket_tags<S: AsRef<str>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.bucket_tags = tags.into_iter().collect();
        self
    }

    /// Rows of `table` this context can roll
    pub fn access_loottable<'t>(&self, table: &'t LootTableEntry) -> Vec<&'t LootTableRow> {
        if self.is_ignored_id(&table.loot_table_id) {
            return Vec::new();
        }
        table
            .items
            .iter()
            .filter(|row| {
                table
                    .conditions
                    .iter()
                    .all(|condition| self.test_table_row_condition(condition, row))
            })
            .collect()
    }

    /// Whether every condition of `table` is present in this context
    pub fn access_table(&self, table: &LootTableEntry) -> bool {
        if self.is_ignored_id(&table.loot_table_id) {
            return false;
        }
        table
            .conditions
            .iter()
            .all(|condition| self.test_table_condition(condition))
    }

    /// Whether `row` of `table` passes every table condition
    pub fn access_table_row(&self, table: &LootTableEntry, row: &LootTableRow) -> bool {
        if self.is_ignored_id(&table.loot_table_id) {
            return false;
        }
        table
            .conditions
            .iter()
            .all(|condition| self.test_table_row_condition(condition, row))
    }

    /// Whether a bucket row can drop in this context
    ///
    /// `MatchOne` rows need one passing tag, all other rows need every tag.
    pub fn access_bucket_row(&self, entry: &LootBucketRow) -> bool {
        if self.is_ignored_id(&entry.loot_bucket) || self.is_excluded_entry(entry) {
            return false;
        }
        let mut tags = entry.tags.iter().map(|tag| tag.name.as_str());
        if entry.match_one {
            tags.any(|tag| self.test_bucket_condition(tag, entry))
        } else {
            tags.all(|tag| self.test_bucket_condition(tag, entry))
        }
    }

    /// Presence check: the condition is a tag or has a value
    pub fn test_table_condition(&self, condition: &str) -> bool {
        if condition.is_empty() {
            return true;
        }
        self.tags.contains(condition) || self.values.contains_key(condition)
    }

    /// Threshold check: a context value must reach the row's `Prob`
    pub fn test_table_row_condition(&self, condition: &str, row: &LootTableRow) -> bool {
        if condition.is_empty() {
            return true;
        }
        match self.values.get(condition) {
            Some(value) => value.as_f64() >= row.prob.as_f64(),
            None => self.tags.contains(condition),
        }
    }

    /// Range check: a context value must fall into the row's tag range
    ///
    /// A one-element range is a lower bound, a two-element range is inclusive
    /// on both ends. Any other shape fails.
    pub fn test_bucket_condition(&self, condition: &str, entry: &LootBucketRow) -> bool {
        if condition.is_empty() {
            return true;
        }
        match self.values.get(condition) {
            Some(value) => {
                let value = value.as_f64();
                match entry.tag(condition).map(|tag| tag.value.as_slice()) {
                    Some([min]) => *min <= value,
                    Some([min, max]) => *min <= value && value <= *max,
                    _ => false,
                }
            }
            None => self.tags.contains(condition),
        }
    }

    pub fn is_ignored_id(&self, table_or_bucket_id: &str) -> bool {
        self.ignore_ids.contains(table_or_bucket_id)
    }

    fn is_excluded_entry(&self, entry: &LootBucketRow) -> bool {
        if self.bucket_tags.is_empty() {
            return false;
        }
        !entry.tags.iter().any(|tag| self.bucket_tags.contains(&tag.name))
    }
}
