//! Error types surfaced by the core engine.
//!
//! Following the teacher's house style for small, closed error sets
//! (`tcw3::ui::views::table::EditLockError`), these are hand-written enums
//! with manual `Display`/`std::error::Error` impls rather than a
//! derive-macro crate.
use std::fmt;

/// Failure kinds produced by table, region, and grid operations.
///
/// See the module-level documentation of [`crate::table`], [`crate::region`],
/// and [`crate::grid`] for which operations can return which kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridError {
    /// Out-of-range column/row, malformed cell-patch mask, or an attempt to
    /// address the header/header dead corner.
    InvalidArgument,
    /// The operation is not valid in the view's current mode (e.g. mutating
    /// a table on an owner-data grid).
    InvalidState,
    /// Allocation failed. The operation that produced this error left its
    /// receiver unchanged.
    OutOfMemory,
    /// A host `*_Changing` notification vetoed the operation.
    Cancelled,
    /// The operation requires an attached table, but the grid has none.
    NotSupported,
}

pub type Result<T> = std::result::Result<T, GridError>;

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GridError::InvalidArgument => "invalid argument",
            GridError::InvalidState => "operation not valid in the current state",
            GridError::OutOfMemory => "allocation failure",
            GridError::Cancelled => "operation was vetoed by the host",
            GridError::NotSupported => "operation requires an attached table",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for GridError {}
