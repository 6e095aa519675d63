//! Catalog of optional cursor capabilities.
//!
//! The catalog is closed and ordered: a capability's position defines its bit
//! in a [`CapabilityMask`], and a mask selects exactly one proxy shape from
//! the combination table in [`crate::picker`].

use std::fmt;

use sqltap_core::Rows;

/// One optional trait a driver cursor may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Capability {
    /// Multiple result sets ([`sqltap_core::RowsNextResultSet`]).
    NextResultSet = 0,
    /// Native column type name.
    ColumnTypeDatabaseTypeName = 1,
    /// Declared column length.
    ColumnTypeLength = 2,
    /// Column nullability.
    ColumnTypeNullable = 3,
    /// Decimal precision and scale.
    ColumnTypePrecisionScale = 4,
    /// Native scan type.
    ColumnTypeScanType = 5,
}

impl Capability {
    /// Every capability, in bit order.
    pub const ALL: [Capability; 6] = [
        Capability::NextResultSet,
        Capability::ColumnTypeDatabaseTypeName,
        Capability::ColumnTypeLength,
        Capability::ColumnTypeNullable,
        Capability::ColumnTypePrecisionScale,
        Capability::ColumnTypeScanType,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NextResultSet => "NextResultSet",
            Self::ColumnTypeDatabaseTypeName => "ColumnTypeDatabaseTypeName",
            Self::ColumnTypeLength => "ColumnTypeLength",
            Self::ColumnTypeNullable => "ColumnTypeNullable",
            Self::ColumnTypePrecisionScale => "ColumnTypePrecisionScale",
            Self::ColumnTypeScanType => "ColumnTypeScanType",
        }
    }

    /// Whether `rows` itself exposes this capability.
    ///
    /// Inspects only the given object; resolve wrappers first with
    /// [`crate::unwrap::resolve`] to test the driver's own cursor.
    pub fn is_implemented_by(self, rows: &dyn Rows) -> bool {
        match self {
            Self::NextResultSet => rows.as_next_result_set().is_some(),
            Self::ColumnTypeDatabaseTypeName => rows.as_column_type_database_type_name().is_some(),
            Self::ColumnTypeLength => rows.as_column_type_length().is_some(),
            Self::ColumnTypeNullable => rows.as_column_type_nullable().is_some(),
            Self::ColumnTypePrecisionScale => rows.as_column_type_precision_scale().is_some(),
            Self::ColumnTypeScanType => rows.as_column_type_scan_type().is_some(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of distinct capability subsets, i.e. proxy shapes.
pub const COMBINATIONS: usize = 1 << Capability::COUNT;

/// A set of capabilities, one bit per catalog entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilityMask(u8);

impl CapabilityMask {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self((COMBINATIONS - 1) as u8);

    /// Build a mask from raw bits; `None` if a bit outside the catalog is set.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 != 0 {
            return None;
        }
        Some(Self(bits))
    }

    /// Build a mask from raw bits, dropping bits outside the catalog.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Position of this mask in the combination table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Capabilities in the mask, in catalog order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Test every catalog entry against `rows` and collect the hits.
    pub fn of(rows: &dyn Rows) -> Self {
        Capability::ALL
            .into_iter()
            .filter(|c| c.is_implemented_by(rows))
            .collect()
    }

    /// All possible masks, from empty to full.
    pub fn every() -> impl Iterator<Item = Self> {
        (0..COMBINATIONS).map(|bits| Self(bits as u8))
    }
}

impl FromIterator<Capability> for CapabilityMask {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Display for CapabilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        let names: Vec<_> = self.iter().map(Capability::name).collect();
        write!(f, "{{{}}}", names.join("|"))
    }
}

impl fmt::Debug for CapabilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityMask({:#08b} {})", self.0, self)
    }
}
