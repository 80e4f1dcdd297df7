//! The accessor resolver.
//!
//! There is exactly one name-resolution algorithm in the crate: a
//! [`KeySpec`] (one column, many columns, the full-row wildcard, or a
//! caller-supplied key function) resolves once through the header index to
//! an [`Accessor`], a pure `Row -> Key` extractor reused by sorting,
//! uniqueness filtering, grouping, contiguous-run detection, and
//! projection.
//!
//! Multiple columns whose resolved positions form a contiguous ascending
//! run collapse to a slice extraction; that is a performance shortcut, not
//! a semantic change.

use crate::error::Result;
use crate::headers::{ColumnRef, Headers};
use crate::row::Row;
use crate::value::Value;
use std::ops::Range;
use std::rc::Rc;

/// A resolved key: one value, or a tuple of values in the requested order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    One(Value),
    Many(Vec<Value>),
}

impl Key {
    /// The key flattened to a value list (a single value becomes a list of
    /// one). Used by nested grouping, one level per column.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Key::One(v) => vec![v],
            Key::Many(vs) => vs,
        }
    }
}

impl From<Value> for Key {
    fn from(v: Value) -> Self {
        Key::One(v)
    }
}

/// An unresolved column request. One column or many is stated by the
/// variant, so mixed-depth input cannot be expressed at all.
#[derive(Clone)]
pub enum KeySpec {
    /// All current columns, in header order.
    All,
    One(ColumnRef),
    /// Requested order matters and duplicates are legal.
    Many(Vec<ColumnRef>),
    /// A caller-supplied key function, used unmodified.
    Func(Rc<dyn Fn(&Row) -> Key>),
}

impl KeySpec {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Key + 'static,
    {
        KeySpec::Func(Rc::new(f))
    }
}

impl From<&str> for KeySpec {
    fn from(name: &str) -> Self {
        KeySpec::One(name.into())
    }
}

impl From<String> for KeySpec {
    fn from(name: String) -> Self {
        KeySpec::One(name.into())
    }
}

impl From<isize> for KeySpec {
    fn from(index: isize) -> Self {
        KeySpec::One(index.into())
    }
}

impl From<i32> for KeySpec {
    fn from(index: i32) -> Self {
        KeySpec::One(index.into())
    }
}

impl From<usize> for KeySpec {
    fn from(index: usize) -> Self {
        KeySpec::One(index.into())
    }
}

impl From<ColumnRef> for KeySpec {
    fn from(reference: ColumnRef) -> Self {
        KeySpec::One(reference)
    }
}

impl From<Vec<ColumnRef>> for KeySpec {
    fn from(refs: Vec<ColumnRef>) -> Self {
        KeySpec::Many(refs)
    }
}

impl From<Vec<&str>> for KeySpec {
    fn from(names: Vec<&str>) -> Self {
        KeySpec::Many(names.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for KeySpec {
    fn from(names: Vec<String>) -> Self {
        KeySpec::Many(names.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for KeySpec {
    fn from(names: &[&str]) -> Self {
        KeySpec::Many(names.iter().map(|n| (*n).into()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeySpec {
    fn from(names: [&str; N]) -> Self {
        KeySpec::Many(names.iter().map(|n| (*n).into()).collect())
    }
}

#[derive(Clone)]
enum Extraction {
    All,
    Single(usize),
    Slice(Range<usize>),
    Positions(Vec<usize>),
    Func(Rc<dyn Fn(&Row) -> Key>),
}

/// A resolved extractor from row to key.
#[derive(Clone)]
pub struct Accessor {
    extraction: Extraction,
}

impl Accessor {
    /// Resolves a spec against the current header layout. Every referenced
    /// name or position is validated here, before any caller mutates rows.
    pub fn resolve(spec: KeySpec, headers: &Headers) -> Result<Accessor> {
        let extraction = match spec {
            KeySpec::All => Extraction::All,
            KeySpec::Func(f) => Extraction::Func(f),
            KeySpec::One(reference) => Extraction::Single(headers.position_of(&reference)?),
            KeySpec::Many(refs) if refs.is_empty() => Extraction::All,
            KeySpec::Many(refs) => {
                let positions = refs
                    .iter()
                    .map(|r| headers.position_of(r))
                    .collect::<Result<Vec<usize>>>()?;
                if positions.len() == 1 {
                    Extraction::Single(positions[0])
                } else if is_contiguous_ascending(&positions) {
                    Extraction::Slice(positions[0]..positions[positions.len() - 1] + 1)
                } else {
                    Extraction::Positions(positions)
                }
            }
        };
        Ok(Accessor { extraction })
    }

    /// Extracts the key for one row. Jagged rows read `Null` for positions
    /// beyond their width.
    pub fn key(&self, row: &Row) -> Key {
        match &self.extraction {
            Extraction::All => Key::Many(row.values().to_vec()),
            Extraction::Single(pos) => Key::One(value_at(row, *pos)),
            Extraction::Slice(range) => {
                Key::Many(range.clone().map(|pos| value_at(row, pos)).collect())
            }
            Extraction::Positions(positions) => {
                Key::Many(positions.iter().map(|&pos| value_at(row, pos)).collect())
            }
            Extraction::Func(f) => f(row),
        }
    }

    /// True when the resolved request returns exactly one value per row.
    pub fn is_single(&self) -> bool {
        matches!(self.extraction, Extraction::Single(_))
    }
}

fn value_at(row: &Row, position: usize) -> Value {
    row.values().get(position).cloned().unwrap_or(Value::Null)
}

fn is_contiguous_ascending(positions: &[usize]) -> bool {
    positions.windows(2).all(|w| w[1] == w[0] + 1)
}
