//! Resolution of transparent rows wrappers.
//!
//! Middleware that returns its own rows type from a hook should implement
//! [`Rows::rows_unwrap`] so that capability detection sees the driver's cursor
//! and not the wrapper's (possibly narrower) shape. A wrapper that does not
//! implement it is treated as the terminal cursor.

use sqltap_core::{Error, Result, Rows};

/// Follow `rows_unwrap` until an object no longer wraps another.
///
/// At most `max_depth` levels are followed; a longer chain (including a
/// wrapper that returns itself) fails with [`Error::Cycle`].
pub fn resolve(rows: &dyn Rows, max_depth: usize) -> Result<&dyn Rows> {
    walk(rows, max_depth).map(|(terminal, _)| terminal)
}

/// Terminal cursor together with the number of wrapper levels above it.
pub(crate) fn walk(rows: &dyn Rows, max_depth: usize) -> Result<(&dyn Rows, usize)> {
    let mut current = rows;
    let mut depth = 0;
    while let Some(inner) = current.rows_unwrap() {
        if depth == max_depth {
            return Err(Error::Cycle { limit: max_depth });
        }
        depth += 1;
        current = inner;
    }
    Ok((current, depth))
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut(rows: &mut dyn Rows, max_depth: usize) -> Result<&mut dyn Rows> {
    descend(rows, 0, max_depth)
}

fn descend(rows: &mut dyn Rows, depth: usize, max_depth: usize) -> Result<&mut dyn Rows> {
    if rows.rows_unwrap().is_none() {
        return Ok(rows);
    }
    if depth == max_depth {
        return Err(Error::Cycle { limit: max_depth });
    }
    match rows.rows_unwrap_mut() {
        Some(inner) => descend(inner, depth + 1, max_depth),
        None => Err(Error::BrokenUnwrap { depth }),
    }
}

/// Number of wrapper levels above the terminal cursor.
pub fn depth(rows: &dyn Rows, max_depth: usize) -> Result<usize> {
    walk(rows, max_depth).map(|(_, depth)| depth)
}
