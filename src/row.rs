//! Rows.
//!
//! A `Row` is a thin view: a shared reference to its table's header index
//! plus an owned, ordered value sequence. Rows never mutate the shared
//! header; only the owning table rebuilds it. A row whose value count
//! differs from the header width is *jagged* — a detectable condition, not
//! an error.

use crate::error::Result;
use crate::headers::{ColumnRef, Headers};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Row {
    headers: Rc<RefCell<Headers>>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(headers: Rc<RefCell<Headers>>, values: Vec<Value>) -> Self {
        Row { headers, values }
    }

    /// Gets a value by name or signed position. Unknown names fail with the
    /// list of valid names; a valid column beyond a short (jagged) row
    /// yields `Null`.
    pub fn get<R: Into<ColumnRef>>(&self, reference: R) -> Result<Value> {
        let position = self.headers.borrow().position_of(&reference.into())?;
        Ok(self.values.get(position).cloned().unwrap_or(Value::Null))
    }

    /// Sets a value by name or signed position. A short row is padded with
    /// `Null` up to the target position. Never touches the shared header.
    pub fn set<R: Into<ColumnRef>>(&mut self, reference: R, value: Value) -> Result<()> {
        let position = self.headers.borrow().position_of(&reference.into())?;
        if position >= self.values.len() {
            self.values.resize(position + 1, Value::Null);
        }
        self.values[position] = value;
        Ok(())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    /// Column names, in position order, from the shared header index.
    pub fn names(&self) -> Vec<String> {
        self.headers.borrow().names().to_vec()
    }

    pub(crate) fn headers_rc(&self) -> &Rc<RefCell<Headers>> {
        &self.headers
    }

    /// True if this row's values, run through the same deduplication used to
    /// build headers, reproduce the current name list exactly. Used to spot
    /// an accidentally-duplicated header row when concatenating tables.
    pub fn is_header_row(&self) -> bool {
        let headers = self.headers.borrow();
        if self.values.len() != headers.len() || headers.is_empty() {
            return false;
        }
        let candidate = Headers::dedupe(self.values.iter().map(|v| v.to_string()));
        candidate == headers.names()
    }

    /// True if the value count differs from the header width.
    pub fn is_jagged(&self) -> bool {
        self.values.len() != self.headers.borrow().len()
    }

    /// Identity hash: the shared header's identity plus the value sequence.
    /// Rows with equal values under different header objects hash apart.
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        (Rc::as_ptr(&self.headers) as usize).hash(&mut hasher);
        self.values.hash(&mut hasher);
        hasher.finish()
    }
}

/// Equality is value-sequence equality; header identity is deliberately
/// excluded here and carried by `identity_hash` instead.
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Row {}
