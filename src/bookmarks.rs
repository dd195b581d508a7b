use std::collections::HashMap;

mod category;

pub use category::{CategoryId, CategoryRegistry};

/// Line identifiers that reserve one value meaning "no line"
pub trait Sentinel: Copy + Ord {
    const INVALID: Self;

    fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

macro_rules! sentinel_max {
    ($($t:ty),*) => {
        $(impl Sentinel for $t {
            const INVALID: Self = <$t>::MAX;
        })*
    };
}

macro_rules! sentinel_neg {
    ($($t:ty),*) => {
        $(impl Sentinel for $t {
            const INVALID: Self = -1;
        })*
    };
}

sentinel_max!(usize, u32, u64);
sentinel_neg!(i32, i64);

/// Result of [`BookmarkIndex::insert_once`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(usize),
    AlreadyPresent(usize),
}

impl InsertOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }

    pub fn position(&self) -> usize {
        match self {
            InsertOutcome::Inserted(pos) | InsertOutcome::AlreadyPresent(pos) => *pos,
        }
    }
}

/// Sorted, duplicate-free set of lines with next/previous navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkIndex<T> {
    values: Vec<T>,
}

impl<T> Default for BookmarkIndex<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T: Sentinel> BookmarkIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lower_bound(&self, value: T) -> usize {
        self.values.partition_point(|v| *v < value)
    }

    /// Insert `value` unless already stored; `T::INVALID` is never stored
    pub fn insert_once(&mut self, value: T) -> InsertOutcome {
        debug_assert!(value.is_valid(), "sentinel value inserted into bookmark index");
        let pos = self.lower_bound(value);
        if self.values.get(pos) == Some(&value) {
            return InsertOutcome::AlreadyPresent(pos);
        }
        self.values.insert(pos, value);
        InsertOutcome::Inserted(pos)
    }

    pub fn remove(&mut self, value: T) -> bool {
        match self.values.binary_search(&value) {
            Ok(pos) => {
                self.values.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Mark `value` if unmarked, unmark it otherwise; true if now marked
    pub fn toggle(&mut self, value: T) -> bool {
        match self.insert_once(value) {
            InsertOutcome::Inserted(_) => true,
            InsertOutcome::AlreadyPresent(pos) => {
                self.values.remove(pos);
                false
            }
        }
    }

    /// First stored value after `start`, or `T::INVALID`
    pub fn next(&self, start: T) -> T {
        let mut pos = self.lower_bound(start);
        if self.values.get(pos) == Some(&start) {
            pos += 1;
        }
        self.values.get(pos).copied().unwrap_or(T::INVALID)
    }

    /// Last stored value before `start`, or `T::INVALID`
    pub fn prev(&self, start: T) -> T {
        match self.lower_bound(start) {
            0 => T::INVALID,
            pos => self.values[pos - 1],
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

/// One [`BookmarkIndex`] per category, created on first use
#[derive(Debug, Clone)]
pub struct Bookmarks<T> {
    by_category: HashMap<CategoryId, BookmarkIndex<T>>,
}

impl<T> Default for Bookmarks<T> {
    fn default() -> Self {
        Self {
            by_category: HashMap::new(),
        }
    }
}

impl<T: Sentinel> Bookmarks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: CategoryId) -> Option<&BookmarkIndex<T>> {
        self.by_category.get(&category)
    }

    pub fn index_mut(&mut self, category: CategoryId) -> &mut BookmarkIndex<T> {
        self.by_category.entry(category).or_default()
    }

    pub fn clear(&mut self, category: CategoryId) {
        if let Some(index) = self.by_category.get_mut(&category) {
            index.clear();
        }
    }

    /// Categories in `categories` that contain `value`
    pub fn categories_of(&self, categories: &[CategoryId], value: T) -> Vec<CategoryId> {
        categories
            .iter()
            .copied()
            .filter(|cat| self.get(*cat).is_some_and(|index| index.contains(value)))
            .collect()
    }

    /// Nearest stored value after `start` in any of `categories`
    pub fn next_in(&self, categories: &[CategoryId], start: T) -> T {
        categories
            .iter()
            .filter_map(|cat| self.get(*cat))
            .map(|index| index.next(start))
            .filter(|v| v.is_valid())
            .min()
            .unwrap_or(T::INVALID)
    }

    /// Nearest stored value before `start` in any of `categories`
    pub fn prev_in(&self, categories: &[CategoryId], start: T) -> T {
        categories
            .iter()
            .filter_map(|cat| self.get(*cat))
            .map(|index| index.prev(start))
            .filter(|v| v.is_valid())
            .max()
            .unwrap_or(T::INVALID)
    }
}
