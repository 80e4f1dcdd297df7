//! The table: one shared header index plus an ordered, mutable sequence of
//! rows.
//!
//! Structural mutation (insert/delete/rename columns, restructuring) never
//! duplicates per-row data: the shared header index is rebuilt in place and
//! every row observes the new layout through its existing reference.
//! All structural operations validate fully before mutating anything.
//!
//! The header/name row is table metadata, never stored among the data rows;
//! `len()` counts data rows only.

use crate::accessor::{Accessor, Key, KeySpec};
use crate::error::{Result, TableError};
use crate::headers::{ColumnRef, Headers};
use crate::row::Row;
use crate::validate;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Sort direction for one key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A single sort key: a column reference plus its direction.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub column: ColumnRef,
    pub order: SortOrder,
}

impl SortKey {
    pub fn ascending(column: impl Into<ColumnRef>) -> Self {
        SortKey {
            column: column.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(column: impl Into<ColumnRef>) -> Self {
        SortKey {
            column: column.into(),
            order: SortOrder::Descending,
        }
    }
}

/// One element of a restructure request.
///
/// Written as strings: a bare name selects an existing column (unknown bare
/// names are a conflict), a parenthesized `"(name)"` inserts a new
/// `Null`-filled column, and [`ColumnSpec::renamed`] aliases an existing
/// column under a new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    Existing(String),
    New(String),
    Renamed { from: String, to: String },
}

impl ColumnSpec {
    pub fn parse(spec: &str) -> ColumnSpec {
        let trimmed = spec.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')') {
            ColumnSpec::New(trimmed[1..trimmed.len() - 1].trim().to_string())
        } else {
            ColumnSpec::Existing(trimmed.to_string())
        }
    }

    pub fn renamed(from: impl Into<String>, to: impl Into<String>) -> ColumnSpec {
        ColumnSpec::Renamed {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl From<&str> for ColumnSpec {
    fn from(spec: &str) -> Self {
        ColumnSpec::parse(spec)
    }
}

/// A tree of nested groupings, one level per key column. Leaves hold rows;
/// every level preserves first-seen key order.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupNode {
    Rows(Vec<Row>),
    Nested(IndexMap<Value, GroupNode>),
}

impl GroupNode {
    pub fn get(&self, key: &Value) -> Option<&GroupNode> {
        match self {
            GroupNode::Nested(map) => map.get(key),
            GroupNode::Rows(_) => None,
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            GroupNode::Rows(rows) => Some(rows),
            GroupNode::Nested(_) => None,
        }
    }

    /// Number of children at this level (0 for a leaf).
    pub fn len(&self) -> usize {
        match self {
            GroupNode::Nested(map) => map.len(),
            GroupNode::Rows(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, path: &[Value], row: Row, append: bool) {
        match self {
            // Jagged keys can land on an existing leaf early; treat it as
            // the destination rather than panicking.
            GroupNode::Rows(rows) => {
                if append {
                    rows.push(row);
                } else {
                    *rows = vec![row];
                }
            }
            GroupNode::Nested(map) => {
                let Some((head, rest)) = path.split_first() else {
                    return;
                };
                let child = map.entry(head.clone()).or_insert_with(|| {
                    if rest.is_empty() {
                        GroupNode::Rows(Vec::new())
                    } else {
                        GroupNode::Nested(IndexMap::new())
                    }
                });
                child.insert(rest, row, append);
            }
        }
    }
}

/// A maximal run of adjacent rows sharing one key. `end` is inclusive.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    pub key: Key,
    pub start: usize,
    pub end: usize,
    pub rows: &'a [Row],
}

/// Iterator over contiguous runs. An empty table yields nothing; the final
/// open run is always flushed.
pub struct Runs<'a> {
    rows: &'a [Row],
    accessor: Accessor,
    position: usize,
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.rows.len() {
            return None;
        }
        let start = self.position;
        let key = self.accessor.key(&self.rows[start]);
        let mut end = start;
        while end + 1 < self.rows.len() && self.accessor.key(&self.rows[end + 1]) == key {
            end += 1;
        }
        self.position = end + 1;
        Some(Run {
            key,
            start,
            end,
            rows: &self.rows[start..=end],
        })
    }
}

/// A fixed-field record: a uniform-width row projection with
/// identifier-safe field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    names: Rc<Vec<String>>,
    values: Vec<Value>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|pos| &self.values[pos])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Root table owning one header index and an ordered sequence of rows.
///
/// # Examples
///
/// ```
/// use rowtable::{row, Table, Value};
///
/// let mut table = Table::from_grid(vec![
///     row!["name", "score"],
///     row!["alice", 90],
///     row!["bob", 75],
/// ]).unwrap();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get_value(1, "name").unwrap(), Value::from("bob"));
///
/// table.sort_by_columns("score").unwrap();
/// assert_eq!(table.get_value(0, "name").unwrap(), Value::from("bob"));
/// ```
pub struct Table {
    headers: Rc<RefCell<Headers>>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table: zero columns, zero rows.
    pub fn new() -> Self {
        Table {
            headers: Rc::new(RefCell::new(Headers::empty())),
            rows: Vec::new(),
        }
    }

    /// Builds a table from a sequence of sequences; the first inner
    /// sequence is the header/name row. Accepts any iterator and
    /// materializes it once. Empty input yields the empty table; jagged
    /// data rows are accepted and stay detectable via [`Table::is_jagged`].
    pub fn from_grid<I>(grid: I) -> Result<Table>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let mut iter = grid.into_iter();
        let Some(name_row) = iter.next() else {
            return Ok(Table::new());
        };
        let headers = Rc::new(RefCell::new(Headers::build(
            name_row.iter().map(|v| v.to_string()),
        )?));

        // Bulk wrapping is latency-sensitive; reserve up front.
        let (lower, _) = iter.size_hint();
        let mut rows = Vec::with_capacity(lower);
        for values in iter {
            rows.push(Row::new(Rc::clone(&headers), values));
        }
        Ok(Table { headers, rows })
    }

    /// Builds a two-row table from key/value pairs: the keys become the
    /// header row, the values the single data row.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Table>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        if names.is_empty() {
            return Ok(Table::new());
        }
        let headers = Rc::new(RefCell::new(Headers::build(names)?));
        let row = Row::new(Rc::clone(&headers), values);
        Ok(Table {
            headers,
            rows: vec![row],
        })
    }

    /// Builds a table from an existing row stream. The rows' own header
    /// metadata is trusted and reused; rows are re-wrapped onto one fresh
    /// shared header index.
    pub fn from_rows(rows: Vec<Row>) -> Result<Table> {
        let Some(first) = rows.first() else {
            return Ok(Table::new());
        };
        let headers = Rc::new(RefCell::new(Headers::build(first.names())?));
        let rows = rows
            .into_iter()
            .map(|row| Row::new(Rc::clone(&headers), row.into_values()))
            .collect();
        Ok(Table { headers, rows })
    }

    // ==================== Basic access ====================

    /// Number of data rows (the header row is metadata, never counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.headers.borrow().len()
    }

    /// Column names in position order.
    pub fn names(&self) -> Vec<String> {
        self.headers.borrow().names().to_vec()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter_rows(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn get_row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(TableError::IndexOutOfRange {
            index: index as isize,
            len: self.rows.len(),
        })
    }

    pub fn get_value<R: Into<ColumnRef>>(&self, row: usize, column: R) -> Result<Value> {
        self.get_row(row)?.get(column)
    }

    pub fn set_value<R: Into<ColumnRef>>(
        &mut self,
        row: usize,
        column: R,
        value: Value,
    ) -> Result<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(row)
            .ok_or(TableError::IndexOutOfRange {
                index: row as isize,
                len,
            })?;
        row.set(column, value)
    }

    pub(crate) fn headers_rc(&self) -> &Rc<RefCell<Headers>> {
        &self.headers
    }

    fn wrap_row(&self, values: Vec<Value>) -> Row {
        Row::new(Rc::clone(&self.headers), values)
    }

    // ==================== Jaggedness ====================

    /// True if any row's width differs from the current column count.
    pub fn is_jagged(&self) -> bool {
        self.rows.iter().any(Row::is_jagged)
    }

    /// Indices of all jagged rows.
    pub fn jagged_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_jagged())
            .map(|(index, _)| index)
            .collect()
    }

    // ==================== Column mutation ====================

    /// Renames columns in place at their existing positions.
    pub fn rename(&mut self, mapping: &[(&str, &str)]) -> Result<()> {
        let mut names = self.names();
        {
            let headers = self.headers.borrow();
            for (old, new) in mapping {
                let position = headers.position_of(&ColumnRef::from(*old))?;
                names[position] = new.to_string();
            }
        }
        validate::ensure_unique(names.iter().map(String::as_str))?;
        self.headers.borrow_mut().rebuild_in_place(names)
    }

    /// Inserts one `Null`-filled column before `at` (a position, negatives
    /// allowed, or an existing name used as an anchor).
    pub fn insert_column<A: Into<ColumnRef>>(&mut self, at: A, name: &str) -> Result<()> {
        self.insert_columns(vec![(at.into(), name.to_string())])
    }

    /// Inserts one `Null`-filled column after the anchor.
    pub fn insert_column_after<A: Into<ColumnRef>>(&mut self, at: A, name: &str) -> Result<()> {
        let position = self.resolve_insert_position(&at.into(), true)?;
        self.insert_columns(vec![(
            ColumnRef::Index(position as isize),
            name.to_string(),
        )])
    }

    /// Inserts several columns at once. Positions are resolved against the
    /// current header, then applied in descending order so earlier
    /// insertions never shift the anchors of later ones.
    pub fn insert_columns(&mut self, inserts: Vec<(ColumnRef, String)>) -> Result<()> {
        // Validate everything before touching a single row.
        {
            let headers = self.headers.borrow();
            for (_, name) in &inserts {
                validate::ensure_not_reserved(name)?;
                if headers.contains(name) {
                    return Err(TableError::Conflict(name.clone()));
                }
            }
        }
        validate::ensure_unique(inserts.iter().map(|(_, name)| name.as_str()))?;

        let mut resolved: Vec<(usize, String, usize)> = Vec::with_capacity(inserts.len());
        for (input_index, (reference, name)) in inserts.iter().enumerate() {
            let position = self.resolve_insert_position(reference, false)?;
            resolved.push((position, name.clone(), input_index));
        }
        // Descending position; ties in reverse input order so equal anchors
        // end up left-to-right in request order.
        resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.cmp(&a.2)));

        let mut names = self.names();
        for (position, name, _) in resolved {
            names.insert(position, name);
            for row in &mut self.rows {
                let values = row.values_mut();
                let slot = position.min(values.len());
                values.insert(slot, Value::Null);
            }
        }
        self.headers.borrow_mut().rebuild_in_place(names)
    }

    fn resolve_insert_position(&self, reference: &ColumnRef, after: bool) -> Result<usize> {
        let headers = self.headers.borrow();
        // An `after` anchor must name an existing column, whatever the
        // reference form; a plain insert position may also be one past the
        // end.
        let anchor = match reference {
            ColumnRef::Name(_) => headers.position_of(reference)?,
            ColumnRef::Index(index) if after => {
                validate::normalize_index(*index, headers.len())?
            }
            ColumnRef::Index(index) => {
                return validate::normalize_insert_index(*index, headers.len());
            }
        };
        Ok(anchor + usize::from(after))
    }

    /// Appends columns at the end, `Null`-filled for every row.
    pub fn append_columns(&mut self, new_names: &[&str]) -> Result<()> {
        {
            let headers = self.headers.borrow();
            for name in new_names {
                validate::ensure_not_reserved(name)?;
                if headers.contains(name) {
                    return Err(TableError::DuplicateName(name.to_string()));
                }
            }
        }
        let mut names = self.names();
        names.extend(new_names.iter().map(|n| n.to_string()));
        validate::ensure_unique(names.iter().map(String::as_str))?;

        for row in &mut self.rows {
            let values = row.values_mut();
            for _ in new_names {
                values.push(Value::Null);
            }
        }
        self.headers.borrow_mut().rebuild_in_place(names)
    }

    /// Deletes the referenced columns from every row (descending-position
    /// order). Deleting all columns collapses the table to the empty state.
    pub fn delete_columns<R>(&mut self, refs: &[R]) -> Result<()>
    where
        R: Clone + Into<ColumnRef>,
    {
        let mut positions = Vec::with_capacity(refs.len());
        {
            let headers = self.headers.borrow();
            for reference in refs {
                positions.push(headers.position_of(&reference.clone().into())?);
            }
        }
        positions.sort_unstable();
        positions.dedup();

        let mut names = self.names();
        for &position in positions.iter().rev() {
            names.remove(position);
            for row in &mut self.rows {
                let values = row.values_mut();
                if position < values.len() {
                    values.remove(position);
                }
            }
        }
        if names.is_empty() {
            self.rows.clear();
        }
        self.headers.borrow_mut().rebuild_in_place(names)
    }

    /// Reshapes, renames, and inserts columns in one pass. Asymptotically
    /// cheaper than repeated insert/delete/rename when many columns move:
    /// each row's value sequence is rebuilt exactly once.
    pub fn restructure<S>(&mut self, specs: &[S]) -> Result<()>
    where
        S: Clone + Into<ColumnSpec>,
    {
        let specs: Vec<ColumnSpec> = specs.iter().map(|s| s.clone().into()).collect();
        let mut out_names: Vec<String> = Vec::with_capacity(specs.len());
        let mut sources: Vec<Option<usize>> = Vec::with_capacity(specs.len());
        {
            let headers = self.headers.borrow();
            for spec in &specs {
                match spec {
                    ColumnSpec::Existing(name) => {
                        let position = headers
                            .position_of(&ColumnRef::Name(name.clone()))
                            .map_err(|_| TableError::Conflict(name.clone()))?;
                        sources.push(Some(position));
                        out_names.push(name.clone());
                    }
                    ColumnSpec::New(name) => {
                        validate::ensure_not_reserved(name)?;
                        if headers.contains(name) {
                            return Err(TableError::Conflict(name.clone()));
                        }
                        sources.push(None);
                        out_names.push(name.clone());
                    }
                    ColumnSpec::Renamed { from, to } => {
                        let position = headers.position_of(&ColumnRef::Name(from.clone()))?;
                        validate::ensure_not_reserved(to)?;
                        sources.push(Some(position));
                        out_names.push(to.clone());
                    }
                }
            }
        }
        validate::ensure_unique(out_names.iter().map(String::as_str))?;

        for row in &mut self.rows {
            let rebuilt: Vec<Value> = sources
                .iter()
                .map(|source| match source {
                    Some(position) => row
                        .values()
                        .get(*position)
                        .cloned()
                        .unwrap_or(Value::Null),
                    None => Value::Null,
                })
                .collect();
            *row.values_mut() = rebuilt;
        }
        self.headers.borrow_mut().rebuild_in_place(out_names)
    }

    /// Replaces the full header row (re-key). Every existing row observes
    /// the new names through its shared reference.
    pub fn set_headers<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.borrow_mut().rebuild_in_place(names)
    }

    // ==================== Row mutation ====================

    /// Appends data rows. An empty table adopts the incoming data as its
    /// own: the first incoming row becomes the header. A stray header row
    /// (matching the current names after deduplication) is dropped rather
    /// than inserted as data.
    pub fn append_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let at = self.rows.len() as isize;
        self.insert_rows(at, rows)
    }

    /// Inserts data rows before position `at` (negatives count from the
    /// end). See [`Table::append_rows`] for empty-table and stray-header
    /// handling.
    pub fn insert_rows<I>(&mut self, at: isize, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        if self.num_columns() == 0 {
            // Incoming data defines the table, header row first.
            let adopted = Table::from_grid(rows)?;
            *self = adopted;
            return Ok(());
        }
        let at = validate::normalize_insert_index(at, self.rows.len())?;
        let incoming: Vec<Row> = rows
            .into_iter()
            .map(|values| self.wrap_row(values))
            .filter(|row| !row.is_header_row())
            .collect();
        self.rows.splice(at..at, incoming);
        Ok(())
    }

    /// Appends another table's rows, re-wrapping them onto this table's
    /// header index. An empty table adopts the other table's header.
    pub fn append_table(&mut self, other: &Table) -> Result<()> {
        let at = self.rows.len() as isize;
        self.insert_table(at, other)
    }

    /// Inserts another table's rows before position `at`. Inserting at the
    /// very first position replaces this table's header with the incoming
    /// one; a duplicated header row in the incoming data is dropped.
    pub fn insert_table(&mut self, at: isize, other: &Table) -> Result<()> {
        let adopt_header = self.num_columns() == 0;
        if adopt_header {
            self.headers.borrow_mut().rebuild_in_place(other.names())?;
        }
        let at = validate::normalize_insert_index(at, self.rows.len())?;
        if !adopt_header && at == 0 && other.num_columns() > 0 {
            self.headers.borrow_mut().rebuild_in_place(other.names())?;
        }
        let incoming: Vec<Row> = other
            .rows
            .iter()
            .map(|row| self.wrap_row(row.values().to_vec()))
            .filter(|row| !row.is_header_row())
            .collect();
        self.rows.splice(at..at, incoming);
        Ok(())
    }

    /// Truncates to the first `n` data rows. `n == 0` keeps just the
    /// header: columns survive, rows go.
    pub fn shorten_to(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    // ==================== Sort ====================

    /// Stable multi-key sort, in place. With uniform direction a single
    /// composite-key pass suffices; with mixed directions the keys are
    /// applied right-to-left (the last-listed column is sorted first, at
    /// lowest priority) because only a last-applied stable pass yields
    /// correct priority ordering.
    pub fn sort_by(&mut self, keys: &[SortKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let uniform = keys.windows(2).all(|pair| pair[0].order == pair[1].order);
        if uniform {
            let spec = if keys.len() == 1 {
                KeySpec::One(keys[0].column.clone())
            } else {
                KeySpec::Many(keys.iter().map(|k| k.column.clone()).collect())
            };
            let accessor = {
                let headers = self.headers.borrow();
                Accessor::resolve(spec, &headers)?
            };
            stable_sort_pass(&mut self.rows, &accessor, keys[0].order);
        } else {
            let passes: Vec<(Accessor, SortOrder)> = {
                let headers = self.headers.borrow();
                keys.iter()
                    .map(|key| {
                        Accessor::resolve(KeySpec::One(key.column.clone()), &headers)
                            .map(|accessor| (accessor, key.order))
                    })
                    .collect::<Result<_>>()?
            };
            for (accessor, order) in passes.iter().rev() {
                stable_sort_pass(&mut self.rows, accessor, *order);
            }
        }
        Ok(())
    }

    /// Copy-returning variant of [`Table::sort_by`].
    pub fn sorted_by(&self, keys: &[SortKey]) -> Result<Table> {
        let mut copy = self.clone();
        copy.sort_by(keys)?;
        Ok(copy)
    }

    /// Ascending sort over any column request (one name, many names, a
    /// position, or a key function).
    pub fn sort_by_columns<K: Into<KeySpec>>(&mut self, keys: K) -> Result<()> {
        let accessor = {
            let headers = self.headers.borrow();
            Accessor::resolve(keys.into(), &headers)?
        };
        stable_sort_pass(&mut self.rows, &accessor, SortOrder::Ascending);
        Ok(())
    }

    // ==================== Filter / uniqueness ====================

    /// Keeps rows matching the predicate, preserving order. In place.
    pub fn retain_rows<F>(&mut self, predicate: F)
    where
        F: Fn(&Row) -> bool,
    {
        self.rows.retain(|row| predicate(row));
    }

    /// Copy-returning variant of [`Table::retain_rows`].
    pub fn filtered<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Row) -> bool,
    {
        let mut copy = self.clone();
        copy.retain_rows(predicate);
        copy
    }

    /// Keeps the first row seen for each distinct key, using one running
    /// set of seen keys. In place.
    pub fn dedupe_by<K: Into<KeySpec>>(&mut self, keys: K) -> Result<()> {
        let accessor = {
            let headers = self.headers.borrow();
            Accessor::resolve(keys.into(), &headers)?
        };
        let mut seen: HashSet<Key> = HashSet::new();
        self.rows.retain(|row| seen.insert(accessor.key(row)));
        Ok(())
    }

    /// Copy-returning variant of [`Table::dedupe_by`].
    pub fn deduped_by<K: Into<KeySpec>>(&self, keys: K) -> Result<Table> {
        let mut copy = self.clone();
        copy.dedupe_by(keys)?;
        Ok(copy)
    }

    // ==================== Grouping / indexing ====================

    /// Builds key → row; later duplicates overwrite earlier ones
    /// (last wins), first-seen key order preserved.
    pub fn map_rows<K: Into<KeySpec>>(&self, keys: K) -> Result<IndexMap<Key, Row>> {
        let accessor = {
            let headers = self.headers.borrow();
            Accessor::resolve(keys.into(), &headers)?
        };
        let mut map = IndexMap::new();
        for row in &self.rows {
            map.insert(accessor.key(row), row.clone());
        }
        Ok(map)
    }

    /// Builds key → all rows with that key.
    pub fn map_rows_append<K: Into<KeySpec>>(&self, keys: K) -> Result<IndexMap<Key, Vec<Row>>> {
        let accessor = {
            let headers = self.headers.borrow();
            Accessor::resolve(keys.into(), &headers)?
        };
        let mut map: IndexMap<Key, Vec<Row>> = IndexMap::new();
        for row in &self.rows {
            map.entry(accessor.key(row)).or_default().push(row.clone());
        }
        Ok(map)
    }

    /// Re-nests a multi-column key into a tree of nested mappings, one
    /// level per key column; leaves hold the last row per full key.
    pub fn group_rows<K: Into<KeySpec>>(&self, keys: K) -> Result<GroupNode> {
        self.build_groups(keys.into(), false)
    }

    /// Like [`Table::group_rows`] but leaves retain every row per full key.
    pub fn group_rows_append<K: Into<KeySpec>>(&self, keys: K) -> Result<GroupNode> {
        self.build_groups(keys.into(), true)
    }

    fn build_groups(&self, spec: KeySpec, append: bool) -> Result<GroupNode> {
        let accessor = {
            let headers = self.headers.borrow();
            Accessor::resolve(spec, &headers)?
        };
        let mut root = GroupNode::Nested(IndexMap::new());
        for row in &self.rows {
            let path = accessor.key(row).into_values();
            root.insert(&path, row.clone(), append);
        }
        Ok(root)
    }

    /// Yields maximal runs of adjacent rows sharing an identical key. A
    /// single dissimilar row forms a run of length one.
    pub fn contiguous<K: Into<KeySpec>>(&self, keys: K) -> Result<Runs<'_>> {
        let accessor = {
            let headers = self.headers.borrow();
            Accessor::resolve(keys.into(), &headers)?
        };
        Ok(Runs {
            rows: &self.rows,
            accessor,
            position: 0,
        })
    }

    // ==================== Projections ====================

    /// Per-row dictionaries in header order; short rows read `Null`.
    pub fn to_dicts(&self) -> Vec<IndexMap<String, Value>> {
        let names = self.names();
        self.rows
            .iter()
            .map(|row| {
                names
                    .iter()
                    .enumerate()
                    .map(|(position, name)| {
                        let value = row
                            .values()
                            .get(position)
                            .cloned()
                            .unwrap_or(Value::Null);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }

    /// Fixed-field records. Requires identifier-safe header names (all
    /// offenders reported at once) and uniform row width; jagged rows are
    /// a shape error here, and only here.
    pub fn to_records(&self) -> Result<Vec<Record>> {
        let names = self.names();
        validate::ensure_field_names(&names)?;

        let width = names.len();
        for (index, row) in self.rows.iter().enumerate() {
            if row.values().len() != width {
                return Err(TableError::Shape(format!(
                    "row {} has {} values but the table has {} columns",
                    index,
                    row.values().len(),
                    width
                )));
            }
        }

        let shared = Rc::new(names);
        Ok(self
            .rows
            .iter()
            .map(|row| Record {
                names: Rc::clone(&shared),
                values: row.values().to_vec(),
            })
            .collect())
    }

    /// The persistence-collaborator contract: a sequence of sequences,
    /// names row first.
    pub fn to_grid(&self) -> Vec<Vec<Value>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.names().into_iter().map(Value::Str).collect());
        grid.extend(self.rows.iter().map(|row| row.values().to_vec()));
        grid
    }
}

impl Default for Table {
    fn default() -> Self {
        Table::new()
    }
}

/// Deep copy: a fresh header index with the same names, rows re-wrapped
/// onto it. Mutating the copy never disturbs the original's shared header.
impl Clone for Table {
    fn clone(&self) -> Self {
        let headers = Rc::new(RefCell::new(self.headers.borrow().clone()));
        let rows = self
            .rows
            .iter()
            .map(|row| Row::new(Rc::clone(&headers), row.values().to_vec()))
            .collect();
        Table { headers, rows }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ columns: {}, rows: {} }}",
            self.num_columns(),
            self.rows.len()
        )
    }
}

impl FromIterator<Vec<Value>> for Table {
    /// Materializes an iterator of value sequences, names row first. Use
    /// [`Table::from_grid`] when header build errors must be observed.
    fn from_iter<I: IntoIterator<Item = Vec<Value>>>(iter: I) -> Self {
        Table::from_grid(iter).unwrap_or_default()
    }
}

/// One stable pass: decorate with precomputed keys, sort, undecorate. A
/// descending pass uses a reversed comparator rather than reversing the
/// output, which would break stability.
fn stable_sort_pass(rows: &mut Vec<Row>, accessor: &Accessor, order: SortOrder) {
    let mut keyed: Vec<(Key, Row)> = rows
        .drain(..)
        .map(|row| (accessor.key(&row), row))
        .collect();
    match order {
        SortOrder::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }
    rows.extend(keyed.into_iter().map(|(_, row)| row));
}
