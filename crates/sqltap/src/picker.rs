//! Combination table of rows proxies.
//!
//! `WrappedRows<MASK>` is instantiated once per capability subset. Its
//! optional accessors answer `Some` only for the bits set in `MASK` and then
//! hand out the terminal cursor's own capability object, so introspection
//! calls reach the driver directly without going through the interceptor.
//! The 64 constructors are laid out in a static table indexed by
//! [`CapabilityMask::index`].
//!
//! Once the cursor is closed every optional accessor answers `None`. Column
//! names keep forwarding to the driver.

use sqltap_core::{
    Advance, Context, CursorState, Result, Rows, RowsColumnTypeDatabaseTypeName, RowsColumnTypeLength,
    RowsColumnTypeNullable, RowsColumnTypePrecisionScale, RowsColumnTypeScanType,
    RowsNextResultSet, Value,
};
use tracing::{trace, warn};

use crate::capability::{Capability, CapabilityMask, COMBINATIONS};
use crate::middleware::Middleware;
use crate::rows::InterceptedRows;
use crate::unwrap;

/// Builds the proxy for one capability subset.
pub type RowsConstructor = fn(InterceptedRows) -> Box<dyn Rows>;

/// Rows proxy exposing exactly the capabilities encoded in `MASK`.
pub struct WrappedRows<const MASK: u8> {
    inner: InterceptedRows,
}

impl<const MASK: u8> WrappedRows<MASK> {
    const fn has(capability: Capability) -> bool {
        MASK & capability.bit() != 0
    }

    /// Whether `capability` is in the shape and the cursor is still open.
    fn exposes(&self, capability: Capability) -> bool {
        Self::has(capability) && self.inner.state() != CursorState::Closed
    }

    pub fn mask(&self) -> CapabilityMask {
        CapabilityMask::from_bits_truncate(MASK)
    }

    pub fn intercepted(&self) -> &InterceptedRows {
        &self.inner
    }
}

impl<const MASK: u8> Rows for WrappedRows<MASK> {
    fn columns(&self) -> Vec<String> {
        self.inner.columns()
    }

    fn next(&mut self, dest: &mut [Value]) -> Result<Advance> {
        self.inner.next(dest)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn as_next_result_set(&self) -> Option<&dyn RowsNextResultSet> {
        if !self.exposes(Capability::NextResultSet) {
            return None;
        }
        self.inner.terminal().ok()?.as_next_result_set()
    }

    fn as_next_result_set_mut(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        if !self.exposes(Capability::NextResultSet) {
            return None;
        }
        self.inner.terminal_mut().ok()?.as_next_result_set_mut()
    }

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        if !self.exposes(Capability::ColumnTypeDatabaseTypeName) {
            return None;
        }
        self.inner.terminal().ok()?.as_column_type_database_type_name()
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        if !self.exposes(Capability::ColumnTypeLength) {
            return None;
        }
        self.inner.terminal().ok()?.as_column_type_length()
    }

    fn as_column_type_nullable(&self) -> Option<&dyn RowsColumnTypeNullable> {
        if !self.exposes(Capability::ColumnTypeNullable) {
            return None;
        }
        self.inner.terminal().ok()?.as_column_type_nullable()
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        if !self.exposes(Capability::ColumnTypePrecisionScale) {
            return None;
        }
        self.inner.terminal().ok()?.as_column_type_precision_scale()
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        if !self.exposes(Capability::ColumnTypeScanType) {
            return None;
        }
        self.inner.terminal().ok()?.as_column_type_scan_type()
    }
}

fn construct<const MASK: u8>(inner: InterceptedRows) -> Box<dyn Rows> {
    Box::new(WrappedRows::<MASK> { inner })
}

macro_rules! combinations {
    ($($mask:literal)*) => {
        [$(construct::<$mask> as RowsConstructor),*]
    };
}

static TABLE: [RowsConstructor; COMBINATIONS] = combinations!(
     0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
    16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
    32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
    48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63
);

/// Constructor of the proxy shape for `mask`.
pub fn proxy_constructor(mask: CapabilityMask) -> RowsConstructor {
    TABLE[mask.index()]
}

/// Wrap a cursor returned by a query hook.
///
/// The capability mask is computed on the terminal cursor beneath any
/// transparent wrappers. If resolution fails the rows are closed (bypassing
/// the interceptor, since the caller never saw them) and the error returned.
pub fn wrap_rows(mw: &Middleware, ctx: Context, mut rows: Box<dyn Rows>) -> Result<Box<dyn Rows>> {
    let resolved = unwrap::walk(rows.as_ref(), mw.max_unwrap_depth())
        .map(|(terminal, depth)| (CapabilityMask::of(terminal), depth));
    let (mask, depth) = match resolved {
        Ok(found) => found,
        Err(err) => {
            if let Err(close_err) = rows.close() {
                warn!(error = %close_err, "failed to close rows after unwrap error");
            }
            return Err(err);
        }
    };

    trace!(mask = %mask, depth, "wrapping rows");
    let inner = InterceptedRows::new(mw.clone(), ctx, rows);
    Ok(proxy_constructor(mask)(inner))
}
