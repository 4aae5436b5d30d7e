//! Case-insensitive identifiers
//!
//! Every id comparison in the engine ignores case. Keys are folded once on
//! insertion and every lookup folds its query the same way.

use std::collections::{HashMap, HashSet};

/// Fold an id into its lookup form
pub fn fold(id: &str) -> String {
    id.to_lowercase()
}

/// Compare two ids ignoring case
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive `starts_with`
pub fn starts_with_ci(text: &str, prefix: &str) -> bool {
    fold(text).starts_with(&fold(prefix))
}

/// Set of ids compared without case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiSet {
    inner: HashSet<String>,
}

impl CiSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl AsRef<str>) -> bool {
        self.inner.insert(fold(id.as_ref()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(&fold(id))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CiSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = CiSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Map keyed by ids compared without case
#[derive(Debug, Clone, PartialEq)]
pub struct CiMap<V> {
    inner: HashMap<String, V>,
}

impl<V> Default for CiMap<V> {
    fn default() -> Self {
        CiMap {
            inner: HashMap::new(),
        }
    }
}

impl<V> CiMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl AsRef<str>, value: V) -> Option<V> {
        self.inner.insert(fold(id.as_ref()), value)
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.inner.get(&fold(id))
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.inner.contains_key(&fold(id))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<S: AsRef<str>, V> FromIterator<(S, V)> for CiMap<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut map = CiMap::new();
        for (id, value) in iter {
            map.insert(id, value);
        }
        map
    }
}
