//! The header index: an ordered, bijective name-to-position map.
//!
//! One `Headers` object is owned per table and shared by reference with
//! every row of that table. Structural changes rebuild the *same* object in
//! place, so every row observes the new layout through its existing
//! reference — an O(1)-reference update instead of an O(rows) rewrite.
//!
//! Repeated input names are deduplicated deterministically in order of first
//! appearance: `name`, `name__2`, `name__3`, ...

use crate::error::{Result, TableError};
use crate::validate;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A reference to a column: by name, or by signed position (negative counts
/// from the end, Python-slice style).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(isize),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(n) => write!(f, "'{}'", n),
            ColumnRef::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<isize> for ColumnRef {
    fn from(index: isize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<i32> for ColumnRef {
    fn from(index: i32) -> Self {
        ColumnRef::Index(index as isize)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index as isize)
    }
}

/// Ordered `name -> position` mapping with positions contiguous in `[0, n)`.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Headers {
    /// Creates an empty header index (a table with zero columns).
    pub fn empty() -> Self {
        Headers::default()
    }

    /// Builds a header index from raw names, deduplicating collisions and
    /// rejecting reserved names.
    pub fn build<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut headers = Headers::empty();
        headers.rebuild_in_place(names)?;
        Ok(headers)
    }

    /// Deduplicates repeated names in first-appearance order. The k-th
    /// repeat of `name` becomes `name__k` (numbering starts at 2); suffixed
    /// candidates that themselves collide keep counting upward.
    pub fn dedupe<I, S>(names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut next_suffix: HashMap<String, usize> = HashMap::new();
        let mut out = Vec::new();

        for raw in names {
            let name = raw.into();
            if seen.insert(name.clone()) {
                out.push(name);
                continue;
            }
            let mut n = next_suffix.get(&name).copied().unwrap_or(2);
            loop {
                let candidate = format!("{}__{}", name, n);
                n += 1;
                if seen.insert(candidate.clone()) {
                    out.push(candidate);
                    break;
                }
            }
            next_suffix.insert(name, n);
        }

        out
    }

    /// Clears and repopulates this mapping so that every row holding a
    /// shared reference observes the new column layout. Validates before
    /// clearing anything.
    pub fn rebuild_in_place<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deduped = Headers::dedupe(names);
        for name in &deduped {
            validate::ensure_not_reserved(name)?;
        }

        self.names.clear();
        self.index.clear();
        for (pos, name) in deduped.into_iter().enumerate() {
            self.index.insert(name.clone(), pos);
            self.names.push(name);
        }
        Ok(())
    }

    /// Resolves a column reference to its position. Names resolve through
    /// the mapping; indices are bounds-checked after negative normalization.
    pub fn position_of(&self, reference: &ColumnRef) -> Result<usize> {
        match reference {
            ColumnRef::Name(name) => {
                self.index
                    .get(name)
                    .copied()
                    .ok_or_else(|| TableError::NameNotFound {
                        name: name.clone(),
                        available: self.names.clone(),
                    })
            }
            ColumnRef::Index(index) => validate::normalize_index(*index, self.names.len()),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
