//! The grid view engine (`spec.md` §3.3, §4.3-§4.8): geometry, scrolling,
//! selection, focus, input, paint, and label-edit, built atop the table
//! model (`crate::table`) and the region algebra (`crate::region`).
//!
//! Grounded on `tcw3::ui::views::table::Table`'s `Rc<Inner>` split between
//! identity fields and a single `RefCell<State>` guarding everything that
//! moves together on one UI-thread operation.
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use log::{debug, trace};

use crate::error::{GridError, Result};
use crate::host::{HostNotifier, LineTy, Notification, PixelRect, Veto};
use crate::region::{Rect16, Region};
use crate::table::{Cell, CellFieldMask, CellPatch, CellText, CellView, HAlign, Table, VAlign, ViewSubscription, HEADER};

pub mod edit;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod paint;
pub mod render;
pub mod scroll;
pub mod selection;
pub mod style;

pub use edit::{EditControl, EditEndReason, LabelEditOutcome};
pub use geometry::{Geometry, GeometryConfig, GeometryConfigMask, DEFAULT_SIZE};
pub use input::{ArbiterVerdict, DragArbiter, DragExtra, InputState, LineTrack, MarqueeDrag, MarqueeOp, ThresholdDragArbiter};
pub use interaction::{Key, Modifiers};
pub use paint::{Color, CustomDrawEvent, Edge, PaintSurface, ThemeElement};
pub use scroll::{ScrollDelta, ScrollState, ScrollbarRange, AUTOSCROLL_TICK_MS};
pub use selection::Selection;
pub use style::{alphabetic_label, GridStyle, HeaderMode, SelectionMode};

/// Which fields of a cell a `GetDispInfo` round-trip asks the host to fill
/// in (`spec.md` §4.6 step: "ask the host via `GetDispInfo(col, row,
/// mask=text|flags|param)`").
pub type DispInfoMask = CellFieldMask;

/// The host's answer to a `GetDispInfo` request: only the masked fields are
/// meaningful, mirroring [`crate::table::CellView`].
#[derive(Debug, Clone, Default)]
pub struct DispInfoReply {
    pub text: Option<String>,
    pub param: Option<u64>,
    pub flags: Option<crate::table::CellFlags>,
}

bitflags! {
    /// Axes a grid-level config update touches, paralleling
    /// [`GeometryConfigMask`] but for the style/mode fields that are not
    /// pure geometry.
    #[derive(Default)]
    pub struct GridConfigMask: u8 {
        const SELECTION_MODE  = 1;
        const COL_HEADER_MODE = 1 << 1;
        const ROW_HEADER_MODE = 1 << 2;
    }
}

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(1);

struct GridState {
    table: Option<Table>,
    view_sub: Option<ViewSubscription>,
    style: GridStyle,
    selection_mode: SelectionMode,
    col_header_mode: HeaderMode,
    row_header_mode: HeaderMode,
    geometry: Geometry,
    scroll_x: ScrollState,
    scroll_y: ScrollState,
    client_size: (i64, i64),
    focus: Option<(u32, u32)>,
    selection: Selection,
    hot: Option<(u32, u32)>,
    input: InputState,
    edit: Option<edit::EditSession>,
    cache_hint: Option<(u32, u32, u32, u32)>,
    /// Owner-data dimensions, meaningful only when `style` has
    /// `OWNER_DATA` set (`spec.md` §4.8: "`resize` updates only the cached
    /// dimensions on the grid; no table allocation").
    virtual_col_count: u32,
    virtual_row_count: u32,
    pending_invalidate: Vec<PixelRect>,
}

impl GridState {
    fn new(style: GridStyle) -> Self {
        Self {
            table: None,
            view_sub: None,
            style,
            selection_mode: SelectionMode::Complex,
            col_header_mode: HeaderMode::Stored,
            row_header_mode: HeaderMode::Stored,
            geometry: Geometry::new(),
            scroll_x: ScrollState::default(),
            scroll_y: ScrollState::default(),
            client_size: (0, 0),
            focus: None,
            selection: Selection::default(),
            hot: None,
            input: InputState::Idle,
            edit: None,
            cache_hint: None,
            virtual_col_count: 0,
            virtual_row_count: 0,
            pending_invalidate: Vec::new(),
        }
    }

    fn col_count(&self) -> u32 {
        if self.style.contains(GridStyle::OWNER_DATA) {
            self.virtual_col_count
        } else {
            self.table.as_ref().map_or(0, |t| t.col_count())
        }
    }

    fn row_count(&self) -> u32 {
        if self.style.contains(GridStyle::OWNER_DATA) {
            self.virtual_row_count
        } else {
            self.table.as_ref().map_or(0, |t| t.row_count())
        }
    }

    fn col_header_present(&self) -> bool {
        !self.col_header_mode.is_none()
    }

    fn row_header_present(&self) -> bool {
        !self.row_header_mode.is_none()
    }

    fn header_width(&self) -> i64 {
        self.geometry.effective_header_width(self.row_header_present())
    }

    fn header_height(&self) -> i64 {
        self.geometry.effective_header_height(self.col_header_present())
    }

    fn recompute_scroll_max(&mut self) {
        let content_w = self.geometry.total_col_width(self.col_count());
        let content_h = self.geometry.total_row_height(self.row_count());
        self.scroll_x.recompute(content_w);
        self.scroll_y.recompute(content_h);
        let page_w = (self.client_size.0 - self.header_width()).max(0);
        let page_h = (self.client_size.1 - self.header_height()).max(0);
        self.scroll_x.scroll = self.scroll_x.clamp(self.scroll_x.scroll, page_w);
        self.scroll_y.scroll = self.scroll_y.clamp(self.scroll_y.scroll, page_h);
    }

    fn invalidate(&mut self, rect: PixelRect) {
        self.pending_invalidate.push(rect);
    }
}

/// A non-shared observer of a [`Table`] plus private presentation state
/// (`spec.md` §3.3): geometry, scroll, selection, focus, and interaction.
///
/// `GridView` is a cheap `Rc`-backed handle; cloning it shares the same
/// underlying state, matching `tcw3::ui::views::table::Table`'s
/// `Rc<Inner>` pattern.
#[derive(Clone)]
pub struct GridView {
    id: u64,
    inner: Rc<RefCell<GridState>>,
}

impl std::fmt::Debug for GridView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridView").field("id", &self.id).finish()
    }
}

impl GridView {
    /// Create a grid with default geometry. If `style` includes
    /// `AUTO_TABLE` and not `OWNER_DATA`, an empty `0x0` table is created
    /// and attached immediately (`spec.md` §3.3 lifecycle).
    pub fn new(style: GridStyle) -> Self {
        let id = NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed);
        let view = GridView { id, inner: Rc::new(RefCell::new(GridState::new(style))) };
        if style.contains(GridStyle::AUTO_TABLE) && !style.contains(GridStyle::OWNER_DATA) {
            view.attach_table(Some(Table::create(0, 0)))
                .expect("auto-table attach cannot fail on construction");
        }
        view
    }

    fn install_refresh_callback(&self, table: &Table) -> ViewSubscription {
        let weak = Rc::downgrade(&self.inner);
        table.install_view(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                on_table_refresh(&inner, event);
            }
        }))
    }

    /// Attach a table (replacing any previously attached one) or detach by
    /// passing `None`. Fails under `OWNER_DATA` per `spec.md` §4.8
    /// ("`set_table` ... fail fast").
    pub fn attach_table(&self, table: Option<Table>) -> Result<()> {
        let mut state = self.inner.borrow_mut();
        if state.style.contains(GridStyle::OWNER_DATA) {
            return Err(GridError::InvalidState);
        }
        if let Some(sub) = state.view_sub.take() {
            if let Some(old_table) = state.table.take() {
                old_table.uninstall_view(sub);
            }
        }
        if let Some(t) = &table {
            state.view_sub = Some(self.install_refresh_callback(t));
        }
        state.table = table;
        state.recompute_scroll_max();
        Ok(())
    }

    pub fn table(&self) -> Option<Table> {
        self.inner.borrow().table.clone()
    }

    pub fn style(&self) -> GridStyle {
        self.inner.borrow().style
    }

    pub fn set_style(&self, style: GridStyle) {
        let mut state = self.inner.borrow_mut();
        let was_owner_data = state.style.contains(GridStyle::OWNER_DATA);
        state.style = style;
        if !was_owner_data && style.contains(GridStyle::OWNER_DATA) {
            if let Some(sub) = state.view_sub.take() {
                if let Some(old_table) = state.table.take() {
                    old_table.uninstall_view(sub);
                }
            }
        }
        state.recompute_scroll_max();
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.inner.borrow().selection_mode
    }

    pub fn set_selection_mode(&self, mode: SelectionMode) {
        self.inner.borrow_mut().selection_mode = mode;
    }

    pub fn col_header_mode(&self) -> HeaderMode {
        self.inner.borrow().col_header_mode
    }

    pub fn row_header_mode(&self) -> HeaderMode {
        self.inner.borrow().row_header_mode
    }

    pub fn set_header_modes(&self, col: HeaderMode, row: HeaderMode) {
        let mut state = self.inner.borrow_mut();
        state.col_header_mode = col;
        state.row_header_mode = row;
        state.recompute_scroll_max();
    }

    pub fn col_count(&self) -> u32 {
        self.inner.borrow().col_count()
    }

    pub fn row_count(&self) -> u32 {
        self.inner.borrow().row_count()
    }

    /// `resize` (`spec.md` §4.1, §4.8): delegates to the attached table
    /// unless the grid is owner-data, in which case only the cached
    /// dimensions and per-line size arrays are updated.
    pub fn resize(&self, new_cols: u32, new_rows: u32) -> Result<()> {
        let mut state = self.inner.borrow_mut();
        if state.style.contains(GridStyle::OWNER_DATA) {
            state.virtual_col_count = new_cols;
            state.virtual_row_count = new_rows;
        } else {
            let table = state.table.clone().ok_or(GridError::NotSupported)?;
            table.resize(new_cols, new_rows)?;
        }
        state.geometry.resize_cols(new_cols);
        state.geometry.resize_rows(new_rows);
        state.recompute_scroll_max();
        Ok(())
    }

    pub fn set_cell(&self, col: u32, row: u32, patch: &CellPatch) -> Result<()> {
        let state = self.inner.borrow();
        if state.style.contains(GridStyle::OWNER_DATA) {
            return Err(GridError::InvalidState);
        }
        let table = state.table.clone().ok_or(GridError::NotSupported)?;
        drop(state);
        table.set_cell(col, row, patch)
    }

    pub fn get_cell(&self, col: u32, row: u32, mask: CellFieldMask) -> Result<CellView> {
        let state = self.inner.borrow();
        if state.style.contains(GridStyle::OWNER_DATA) {
            return Err(GridError::InvalidState);
        }
        let table = state.table.clone().ok_or(GridError::NotSupported)?;
        drop(state);
        table.get_cell(col, row, mask)
    }

    pub fn clear(&self, mask: crate::table::ClearMask) -> Result<()> {
        let state = self.inner.borrow();
        if state.style.contains(GridStyle::OWNER_DATA) {
            return Err(GridError::InvalidState);
        }
        let table = state.table.clone().ok_or(GridError::NotSupported)?;
        drop(state);
        table.clear(mask)
    }

    // ---- geometry -----------------------------------------------------

    pub fn configure_geometry(&self, cfg: &GeometryConfig) {
        let mut state = self.inner.borrow_mut();
        state.geometry.configure(cfg);
        state.recompute_scroll_max();
    }

    pub fn reset_geometry_defaults(&self, font_cell_size: (u16, u16)) {
        let mut state = self.inner.borrow_mut();
        state.geometry.reset_to_defaults(font_cell_size);
        state.recompute_scroll_max();
    }

    /// `set_col_width`/`set_row_height` with the `*Changing`/`*Changed`
    /// veto protocol from `spec.md` §6's notification table.
    pub fn set_col_width(&self, col: u32, width: u16, host: &mut dyn HostNotifier) -> Result<()> {
        if host.column_width_changing(col, width as u32).is_denied() {
            return Err(GridError::Cancelled);
        }
        let mut state = self.inner.borrow_mut();
        let col_count = state.col_count();
        state.geometry.set_col_width(col, col_count, Some(width));
        state.recompute_scroll_max();
        drop(state);
        host.notify(Notification::ColumnWidthChanged { col, new_width: width as u32 });
        Ok(())
    }

    pub fn set_row_height(&self, row: u32, height: u16, host: &mut dyn HostNotifier) -> Result<()> {
        if host.row_height_changing(row, height as u32).is_denied() {
            return Err(GridError::Cancelled);
        }
        let mut state = self.inner.borrow_mut();
        let row_count = state.row_count();
        state.geometry.set_row_height(row, row_count, Some(height));
        state.recompute_scroll_max();
        drop(state);
        host.notify(Notification::RowHeightChanged { row, new_height: height as u32 });
        Ok(())
    }

    pub fn col_width(&self, col: u32) -> u16 {
        self.inner.borrow().geometry.col_width(col)
    }

    pub fn row_height(&self, row: u32) -> u16 {
        self.inner.borrow().geometry.row_height(row)
    }

    // ---- scrolling ------------------------------------------------------

    pub fn set_client_size(&self, w: i64, h: i64) {
        let mut state = self.inner.borrow_mut();
        state.client_size = (w, h);
        state.recompute_scroll_max();
    }

    pub fn scroll_position(&self) -> (i64, i64) {
        let state = self.inner.borrow();
        (state.scroll_x.scroll, state.scroll_y.scroll)
    }

    pub fn scrollbar_ranges(&self) -> (ScrollbarRange, ScrollbarRange) {
        let state = self.inner.borrow();
        let page_w = (state.client_size.0 - state.header_width()).max(0);
        let page_h = (state.client_size.1 - state.header_height()).max(0);
        (state.scroll_x.scrollbar_range(page_w), state.scroll_y.scrollbar_range(page_h))
    }

    /// Scroll to `(x, y)`, clamping per `spec.md` §4.3 and ending any
    /// active label edit first (scrolling is one of the implicit-commit
    /// triggers in `spec.md` §4.7 step 6).
    pub fn scroll_to(&self, x: i64, y: i64, host: &mut dyn HostNotifier) -> ScrollDelta {
        self.end_label_edit_if_active(EditEndReason::CommitImplicit, host);
        let mut state = self.inner.borrow_mut();
        let page_w = (state.client_size.0 - state.header_width()).max(0);
        let page_h = (state.client_size.1 - state.header_height()).max(0);
        let new_x = state.scroll_x.clamp(x, page_w);
        let new_y = state.scroll_y.clamp(y, page_h);
        let delta = ScrollDelta { dx: new_x - state.scroll_x.scroll, dy: new_y - state.scroll_y.scroll };
        state.scroll_x.scroll = new_x;
        state.scroll_y.scroll = new_y;
        if !delta.is_none() {
            let rect = PixelRect { x: 0, y: 0, w: state.client_size.0 as i32, h: state.client_size.1 as i32 };
            state.invalidate(rect);
        }
        delta
    }

    // ---- hit-testing ----------------------------------------------------

    /// Map a pixel coordinate to the cell under it, or `None` if it falls
    /// in the dead corner, past the last line, or outside the client area.
    pub fn cell_at(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        let state = self.inner.borrow();
        let header_w = state.header_width();
        let header_h = state.header_height();
        let col = if x < header_w {
            None
        } else {
            state.geometry.line_at(x, header_w, state.col_count(), |c| state.geometry.col_width(c))
        };
        let row = if y < header_h {
            None
        } else {
            state.geometry.line_at(y, header_h, state.row_count(), |r| state.geometry.row_height(r))
        };
        match (col, row) {
            (Some(c), Some(r)) => Some((c, r)),
            _ => None,
        }
    }

    /// The pixel rectangle of an ordinary cell, in client coordinates.
    pub fn cell_rect(&self, col: u32, row: u32) -> PixelRect {
        let state = self.inner.borrow();
        let header_w = state.header_width();
        let header_h = state.header_height();
        let x = state.geometry.col_x(col, state.scroll_x.scroll, header_w);
        let y = state.geometry.row_y(row, state.scroll_y.scroll, header_h);
        PixelRect { x: x as i32, y: y as i32, w: state.geometry.col_width(col) as i32, h: state.geometry.row_height(row) as i32 }
    }

    // ---- focus ----------------------------------------------------------

    pub fn focus(&self) -> Option<(u32, u32)> {
        self.inner.borrow().focus
    }

    /// Set the focused cell, running the veto/invalidate protocol from
    /// `spec.md` §4.4. Ends any active label edit first.
    pub fn set_focus(&self, col: u32, row: u32, host: &mut dyn HostNotifier) -> Result<()> {
        {
            let state = self.inner.borrow();
            if col == HEADER || row == HEADER || col >= state.col_count() || row >= state.row_count() {
                return Err(GridError::InvalidArgument);
            }
        }
        let old = self.inner.borrow().focus;
        if old == Some((col, row)) {
            return Ok(());
        }
        if host.focus_changing(old.unwrap_or((0, 0)), (col, row)).is_denied() {
            return Err(GridError::Cancelled);
        }
        self.end_label_edit_if_active(EditEndReason::CommitImplicit, host);
        let mut state = self.inner.borrow_mut();
        state.focus = Some((col, row));
        if let Some(old_cell) = old {
            let r = self.cell_rect_locked(&state, old_cell.0, old_cell.1);
            state.invalidate(expand(r, 1));
        }
        let r = self.cell_rect_locked(&state, col, row);
        state.invalidate(expand(r, 1));
        drop(state);
        host.notify(Notification::FocusChanged { old: old.unwrap_or((0, 0)), new: (col, row) });
        Ok(())
    }

    fn cell_rect_locked(&self, state: &GridState, col: u32, row: u32) -> PixelRect {
        let header_w = state.header_width();
        let header_h = state.header_height();
        let x = state.geometry.col_x(col, state.scroll_x.scroll, header_w);
        let y = state.geometry.row_y(row, state.scroll_y.scroll, header_h);
        PixelRect { x: x as i32, y: y as i32, w: state.geometry.col_width(col) as i32, h: state.geometry.row_height(row) as i32 }
    }

    // ---- selection --------------------------------------------------------

    pub fn selection(&self) -> Region {
        self.inner.borrow().selection.region().clone()
    }

    pub fn selection_anchor(&self) -> Option<(u32, u32)> {
        self.inner.borrow().selection.anchor()
    }

    /// `set_selection` with the mode-enforcement and install protocol from
    /// `spec.md` §4.4.
    pub fn set_selection(&self, region: Region, host: &mut dyn HostNotifier) -> Result<()> {
        let mut state = self.inner.borrow_mut();
        let mode = state.selection_mode;
        let dirty = state.selection.install(region, mode, host)?;
        if let Some(rect) = dirty {
            let px = self.rect16_to_pixels_locked(&state, rect);
            state.invalidate(px);
        }
        Ok(())
    }

    fn rect16_to_pixels_locked(&self, state: &GridState, rect: Rect16) -> PixelRect {
        let header_w = state.header_width();
        let header_h = state.header_height();
        let x0 = state.geometry.col_x(rect.x0 as u32, state.scroll_x.scroll, header_w);
        let y0 = state.geometry.row_y(rect.y0 as u32, state.scroll_y.scroll, header_h);
        let x1 = state.geometry.col_x(rect.x1 as u32, state.scroll_x.scroll, header_w);
        let y1 = state.geometry.row_y(rect.y1 as u32, state.scroll_y.scroll, header_h);
        PixelRect { x: x0 as i32, y: y0 as i32, w: (x1 - x0) as i32, h: (y1 - y0) as i32 }
    }

    /// `<Ctrl>+<Space>`: toggle membership of the focused cell in the
    /// current selection (`spec.md` §4.5) via `xor`.
    pub fn toggle_focused_cell_selection(&self, host: &mut dyn HostNotifier) -> Result<()> {
        let focus = self.focus().ok_or(GridError::InvalidState)?;
        let cell_region = Region::from_xy(focus.0 as u16, focus.1 as u16);
        let current = self.selection();
        let next = crate::region::xor(&current, &cell_region)?;
        self.set_selection(next, host)?;
        self.inner.borrow_mut().selection.set_anchor(focus);
        Ok(())
    }

    // ---- header text generation ------------------------------------------

    /// Generate the display text for a header cell according to its axis's
    /// [`HeaderMode`] (`spec.md` §6).
    pub fn header_text(&self, line_ty: LineTy, index: u32) -> String {
        let state = self.inner.borrow();
        let mode = match line_ty {
            LineTy::Col => state.col_header_mode,
            LineTy::Row => state.row_header_mode,
        };
        match mode {
            HeaderMode::None => String::new(),
            HeaderMode::Numeric => index.to_string(),
            HeaderMode::Alphabetic => alphabetic_label(index as u64 + 1),
            HeaderMode::Stored => {
                let (col, row) = match line_ty {
                    LineTy::Col => (index, HEADER),
                    LineTy::Row => (HEADER, index),
                };
                drop(state);
                match self.get_cell(col, row, CellFieldMask::TEXT) {
                    Ok(view) => match view.text {
                        CellText::Owned(s) => s,
                        _ => String::new(),
                    },
                    Err(_) => String::new(),
                }
            }
        }
    }

    // ---- pending invalidation ---------------------------------------------

    /// Drain and return the pixel rectangles the grid has queued for
    /// repaint since the last call. A real host would instead forward each
    /// rectangle to its platform's window-invalidate call as it is
    /// produced; this crate has no window of its own (`spec.md` §1), so
    /// the queue is the host's pull-based seam onto that behavior.
    pub fn take_pending_invalidation(&self) -> Vec<PixelRect> {
        std::mem::take(&mut self.inner.borrow_mut().pending_invalidate)
    }
}

fn expand(r: PixelRect, by: i32) -> PixelRect {
    use cggeom::prelude::*;
    let b: cggeom::Box2<i32> = r.into();
    cggeom::Box2::new(b.min - cgmath::Vector2::new(by, by), b.max + cgmath::Vector2::new(by, by)).into()
}

/// The table refresh callback installed by [`GridView::attach_table`]:
/// recompute scrollbar ranges on structural changes and queue the affected
/// pixel rectangle for repaint. Runs synchronously from inside the table's
/// `emit`, so it must not re-borrow anything the table itself holds
/// (`spec.md` §5: "the table must not hold any lock while invoking a
/// callback").
fn on_table_refresh(inner: &Rc<RefCell<GridState>>, event: &crate::table::RefreshEvent) {
    use crate::table::RefreshEvent::*;
    let mut state = inner.borrow_mut();
    match event {
        CellChanged { col, row } => {
            trace!("table cell changed at ({col}, {row})");
            let rect = cell_rect_for(&state, *col, *row);
            state.invalidate(rect);
        }
        RegionChanged { col0, row0, col1, row1 } => {
            debug!("table region changed [{col0},{row0})-[{col1},{row1})");
            let r0 = cell_rect_for(&state, *col0, *row0);
            let r1 = cell_rect_for(&state, col1.wrapping_sub(1), row1.wrapping_sub(1));
            state.invalidate(union_rect(r0, r1));
        }
        ColCountChanged { .. } | RowCountChanged { .. } | Cleared(_) => {
            debug!("table structure changed: {event:?}");
            state.recompute_scroll_max();
            let rect = PixelRect { x: 0, y: 0, w: state.client_size.0 as i32, h: state.client_size.1 as i32 };
            state.invalidate(rect);
        }
    }
}

fn cell_rect_for(state: &GridState, col: u32, row: u32) -> PixelRect {
    if col == HEADER || row == HEADER {
        return PixelRect { x: 0, y: 0, w: state.client_size.0 as i32, h: state.client_size.1 as i32 };
    }
    let header_w = state.header_width();
    let header_h = state.header_height();
    let x = state.geometry.col_x(col, state.scroll_x.scroll, header_w);
    let y = state.geometry.row_y(row, state.scroll_y.scroll, header_h);
    PixelRect { x: x as i32, y: y as i32, w: state.geometry.col_width(col) as i32, h: state.geometry.row_height(row) as i32 }
}

fn union_rect(a: PixelRect, b: PixelRect) -> PixelRect {
    use cggeom::prelude::*;
    let a: cggeom::Box2<i32> = a.into();
    let b: cggeom::Box2<i32> = b.into();
    a.union(&b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Veto;

    #[derive(Default)]
    struct NullHost;
    impl HostNotifier for NullHost {}

    #[test]
    fn auto_table_style_creates_empty_table() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        assert!(g.table().is_some());
        assert_eq!(g.col_count(), 0);
    }

    #[test]
    fn owner_data_rejects_table_mutation() {
        let g = GridView::new(GridStyle::OWNER_DATA);
        assert_eq!(g.attach_table(Some(Table::create(1, 1))).unwrap_err(), GridError::InvalidState);
        assert_eq!(
            g.set_cell(0, 0, &CellPatch::text(CellText::Owned("x".into()))).unwrap_err(),
            GridError::InvalidState
        );
    }

    #[test]
    fn resize_updates_virtual_dims_without_table() {
        let g = GridView::new(GridStyle::OWNER_DATA);
        g.resize(10, 20).unwrap();
        assert_eq!(g.col_count(), 10);
        assert_eq!(g.row_count(), 20);
        assert!(g.table().is_none());
    }

    #[test]
    fn focus_and_selection_are_decoupled() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.resize(5, 5).unwrap();
        let mut host = NullHost;
        g.set_focus(2, 2, &mut host).unwrap();
        assert!(g.selection().is_empty());
        g.set_selection(Region::from_rect(Rect16::new(0, 0, 2, 2)), &mut host).unwrap();
        assert_eq!(g.focus(), Some((2, 2)));
    }

    #[test]
    fn dead_corner_focus_is_rejected() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.resize(5, 5).unwrap();
        let mut host = NullHost;
        assert_eq!(g.set_focus(HEADER, HEADER, &mut host).unwrap_err(), GridError::InvalidArgument);
    }

    #[test]
    fn alphabetic_header_text() {
        let g = GridView::new(GridStyle::AUTO_TABLE);
        g.resize(30, 1).unwrap();
        g.set_header_modes(HeaderMode::Alphabetic, HeaderMode::None);
        assert_eq!(g.header_text(LineTy::Col, 0), "A");
        assert_eq!(g.header_text(LineTy::Col, 26), "AA");
    }

    #[test]
    fn scroll_to_clamps_and_queues_invalidation() {
        let g = GridView::new(GridStyle::AUTO_TABLE);
        g.resize(1000, 1000).unwrap();
        g.set_client_size(200, 200);
        let mut host = NullHost;
        let delta = g.scroll_to(-50, 1_000_000, &mut host);
        assert!(delta.dy > 0);
        let (x, y) = g.scroll_position();
        assert_eq!(x, 0);
        assert!(y > 0);
        assert!(!g.take_pending_invalidation().is_empty());
    }

    #[test]
    fn col_resize_veto_is_honored() {
        struct VetoHost;
        impl HostNotifier for VetoHost {
            fn column_width_changing(&mut self, _col: u32, _w: u32) -> Veto {
                Veto::Deny
            }
        }
        let g = GridView::new(GridStyle::AUTO_TABLE);
        g.resize(3, 3).unwrap();
        let mut host = VetoHost;
        assert_eq!(g.set_col_width(0, 100, &mut host).unwrap_err(), GridError::Cancelled);
        assert_ne!(g.col_width(0), 100);
    }

    #[test]
    fn ctrl_space_toggles_focused_cell() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.resize(5, 5).unwrap();
        let mut host = NullHost;
        g.set_focus(1, 1, &mut host).unwrap();
        g.toggle_focused_cell_selection(&mut host).unwrap();
        assert!(g.selection().contains_xy(1, 1));
        g.toggle_focused_cell_selection(&mut host).unwrap();
        assert!(g.selection().is_empty());
    }
}
