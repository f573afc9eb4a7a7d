use std::collections::HashMap;
use std::fmt;

/// Sequential identifier of an entity within its table.
///
/// Identifiers start at 1 and grow by one per inserted row, which is the
/// numbering the downstream scripting tool expects in cross-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u32);

impl Id {
    /// The first identifier handed out by every table.
    pub const FIRST: Id = Id(1);

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    fn from_index(index: usize) -> Self {
        let value = u32::try_from(index + 1).expect("entity table exceeds u32::MAX rows");
        Self(value)
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insertion-ordered entity table with optional lookup by external key.
///
/// Rows are never removed or reordered, so the identifiers of a table are
/// always the contiguous range `1..=len`.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    by_key: HashMap<String, Id>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            by_key: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row built from its freshly assigned identifier.
    pub fn insert(&mut self, build: impl FnOnce(Id) -> T) -> Id {
        let id = self.next_id();
        self.rows.push(build(id));
        id
    }

    /// Returns the row registered under `key`, building and appending it first
    /// if the key has not been seen.
    ///
    /// The second element of the returned pair is `true` when a new row was
    /// created.
    pub fn insert_keyed(&mut self, key: &str, build: impl FnOnce(Id) -> T) -> (Id, bool) {
        if let Some(&id) = self.by_key.get(key) {
            return (id, false);
        }
        let id = self.insert(build);
        self.by_key.insert(key.to_string(), id);
        (id, true)
    }

    #[inline]
    pub fn id_of(&self, key: &str) -> Option<Id> {
        self.by_key.get(key).copied()
    }

    #[inline]
    pub fn get(&self, id: Id) -> Option<&T> {
        self.rows.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        (0..self.rows.len()).map(Id::from_index)
    }

    fn next_id(&self) -> Id {
        Id::from_index(self.rows.len())
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
