//! The table resize algorithm (`spec.md` §4.1): reshape cell storage while
//! preserving the intersection of the old and new extents.
use super::{Cell, RefreshEvent, TableState};
use crate::error::Result;

/// Resize `state` in place to `new_col_count x new_row_count`, returning the
/// refresh events to emit (in order: column change, then row change).
///
/// Old cells that fall outside the new extent are simply dropped by Rust's
/// ownership rules when the old storage is discarded -- any owned text they
/// held is freed along with them, matching the "text freed when the
/// enclosing region shrinks past it" rule without a manual free pass.
pub fn apply(state: &mut TableState, new_col_count: u32, new_row_count: u32) -> Result<Vec<RefreshEvent>> {
    let old_col_count = state.col_count;
    let old_row_count = state.row_count;

    if new_col_count == old_col_count && new_row_count == old_row_count {
        return Ok(Vec::new());
    }

    let new_len = new_col_count as usize * new_row_count as usize;

    let new_cells = if new_col_count == old_col_count {
        // Column count unchanged: the row-major layout is still valid, so
        // growth/shrinkage is a single bulk resize at the tail.
        let mut cells = std::mem::take(&mut state.cells);
        cells.resize_with(new_len, Cell::default);
        cells
    } else {
        let mut new_cells: Vec<Cell> = Vec::new();
        new_cells.try_reserve_exact(new_len).map_err(|_| crate::error::GridError::OutOfMemory)?;
        new_cells.resize_with(new_len, Cell::default);
        let common_rows = old_row_count.min(new_row_count);
        let common_cols = old_col_count.min(new_col_count);
        for r in 0..common_rows {
            for c in 0..common_cols {
                let old_idx = (r * old_col_count + c) as usize;
                let new_idx = (r * new_col_count + c) as usize;
                new_cells[new_idx] = std::mem::take(&mut state.cells[old_idx]);
            }
        }
        new_cells
    };
    state.cells = new_cells;
    state.cols.resize_with(new_col_count as usize, Cell::default);
    state.rows.resize_with(new_row_count as usize, Cell::default);
    state.col_count = new_col_count;
    state.row_count = new_row_count;

    let mut events = Vec::new();
    if new_col_count != old_col_count {
        events.push(RefreshEvent::ColCountChanged {
            old: old_col_count,
            new: new_col_count,
            insertion_col: old_col_count.min(new_col_count),
        });
    }
    if new_row_count != old_row_count {
        events.push(RefreshEvent::RowCountChanged {
            old: old_row_count,
            new: new_row_count,
            insertion_row: old_row_count.min(new_row_count),
        });
    }
    Ok(events)
}
