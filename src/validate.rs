//! Shape and identity checks shared by header and table operations.
//!
//! Mutating operations call these before touching any state, so failures
//! leave the table intact.

use crate::error::{Result, TableError};
use std::collections::HashSet;

/// Names the row/table API itself uses for attribute access. Data columns
/// must never shadow them, otherwise name-based access could not tell a
/// structural attribute from a data column.
pub const RESERVED_NAMES: &[&str] = &["values", "headers"];

pub(crate) fn ensure_not_reserved(name: &str) -> Result<()> {
    if RESERVED_NAMES.contains(&name) {
        return Err(TableError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// Rejects the first repeated name in `names`.
pub(crate) fn ensure_unique<'a, I>(names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(TableError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

/// Validates that every name works as a record field identifier: leading
/// ASCII letter, no embedded whitespace. Reports all offenders at once.
pub(crate) fn ensure_field_names(names: &[String]) -> Result<()> {
    let bad: Vec<String> = names
        .iter()
        .filter(|n| !is_field_name(n))
        .cloned()
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(TableError::InvalidFieldNames(bad))
    }
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    !name.chars().any(char::is_whitespace)
}

/// Normalizes a possibly-negative position into `[0, len)`.
pub(crate) fn normalize_index(index: isize, len: usize) -> Result<usize> {
    let adjusted = if index < 0 { index + len as isize } else { index };
    if adjusted < 0 || adjusted as usize >= len {
        return Err(TableError::IndexOutOfRange { index, len });
    }
    Ok(adjusted as usize)
}

/// Normalizes an insertion position into `[0, len]` (one past the end is a
/// valid insert point).
pub(crate) fn normalize_insert_index(index: isize, len: usize) -> Result<usize> {
    let adjusted = if index < 0 { index + len as isize } else { index };
    if adjusted < 0 || adjusted as usize > len {
        return Err(TableError::IndexOutOfRange { index, len });
    }
    Ok(adjusted as usize)
}
