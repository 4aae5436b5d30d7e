//! IndexedTable - id-keyed lookup over an imported data table

use super::key::fold;
use std::collections::HashMap;

/// Immutable id → record index built once per table
///
/// Lookups ignore case. When two records share an id the later one wins but
/// keeps the position of the first, so iteration follows first-insertion order.
#[derive(Debug, Clone)]
pub struct IndexedTable<T> {
    records: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for IndexedTable<T> {
    fn default() -> Self {
        IndexedTable {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> IndexedTable<T> {
    /// Index `records` by the id returned from `id_of`
    pub fn from_records<F>(records: impl IntoIterator<Item = T>, id_of: F) -> Self
    where
        F: Fn(&T) -> &str,
    {
        let mut table = IndexedTable::default();
        for record in records {
            let key = fold(id_of(&record));
            match table.index.get(&key) {
                Some(&position) => table.records[position] = record,
                None => {
                    table.index.insert(key, table.records.len());
                    table.records.push(record);
                }
            }
        }
        table
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(&fold(id)).map(|&position| &self.records[position])
    }

    /// Look up an optional id, treating `None` as a miss
    pub fn get_opt(&self, id: Option<&str>) -> Option<&T> {
        id.and_then(|id| self.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&fold(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
