//! The shared table data model: cells, headers, and change propagation to
//! any number of registered views (`spec.md` §3.1, §4.1).
use bitflags::bitflags;
use std::fmt;
use std::rc::Rc;
use subscriber_list::SubscriberList;

use crate::error::{GridError, Result};

mod resize;

/// Sentinel column/row index addressing the header line for the other axis.
/// `(HEADER, HEADER)` is the unaddressable dead corner.
pub const HEADER: u32 = u32::MAX;

bitflags! {
    /// Packed per-cell option word: horizontal alignment (bits 0-1),
    /// vertical alignment (bits 2-3), remaining bits reserved and
    /// preserved verbatim through `CellPatch`.
    #[derive(Default)]
    pub struct CellFlags: u32 {
        const HALIGN_LEFT   = 0b01;
        const HALIGN_CENTER = 0b10;
        const HALIGN_RIGHT  = 0b11;
        const HALIGN_MASK   = 0b11;

        const VALIGN_TOP    = 0b01 << 2;
        const VALIGN_CENTER = 0b10 << 2;
        const VALIGN_BOTTOM = 0b11 << 2;
        const VALIGN_MASK   = 0b11 << 2;
    }
}

/// Horizontal alignment decoded from [`CellFlags`]. `Default` means "the
/// view decides".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Default,
    Left,
    Center,
    Right,
}

/// Vertical alignment decoded from [`CellFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Default,
    Top,
    Center,
    Bottom,
}

impl CellFlags {
    pub fn halign(self) -> HAlign {
        match (self & Self::HALIGN_MASK).bits() {
            0b01 => HAlign::Left,
            0b10 => HAlign::Center,
            0b11 => HAlign::Right,
            _ => HAlign::Default,
        }
    }

    pub fn valign(self) -> VAlign {
        match (self & Self::VALIGN_MASK).bits() >> 2 {
            0b01 => VAlign::Top,
            0b10 => VAlign::Center,
            0b11 => VAlign::Bottom,
            _ => VAlign::Default,
        }
    }
}

/// A cell's text, modeled as the sum type from `spec.md` §9 rather than a
/// sentinel pointer: `Callback` stands in for the original `TEXT_CALLBACK`
/// marker meaning "the host supplies this at paint time".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellText {
    #[default]
    None,
    Owned(String),
    Callback,
}

/// A single table cell: optional text, an opaque user parameter, and flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub text: CellText,
    pub param: u64,
    pub flags: CellFlags,
}

bitflags! {
    /// Selects which fields of a [`Cell`] a [`CellPatch`] or a `get_cell`
    /// query touches.
    pub struct CellFieldMask: u8 {
        const TEXT  = 1;
        const PARAM = 1 << 1;
        const FLAGS = 1 << 2;
        const ALL = Self::TEXT.bits | Self::PARAM.bits | Self::FLAGS.bits;
    }
}

/// A partial cell update: only the fields selected by `mask` are applied.
#[derive(Debug, Clone, Default)]
pub struct CellPatch {
    pub mask: CellFieldMask,
    pub text: CellText,
    pub param: u64,
    pub flags: CellFlags,
}

impl CellPatch {
    pub fn text(text: CellText) -> Self {
        Self { mask: CellFieldMask::TEXT, text, ..Default::default() }
    }

    fn apply(&self, cell: &mut Cell) {
        if self.mask.contains(CellFieldMask::TEXT) {
            cell.text = self.text.clone();
        }
        if self.mask.contains(CellFieldMask::PARAM) {
            cell.param = self.param;
        }
        if self.mask.contains(CellFieldMask::FLAGS) {
            cell.flags = self.flags;
        }
    }
}

/// A read-only view of a cell, masked to the fields that were requested.
#[derive(Debug, Clone, Default)]
pub struct CellView {
    pub mask: CellFieldMask,
    pub text: CellText,
    pub param: u64,
    pub flags: CellFlags,
}

bitflags! {
    /// Selects which of the three cell regions `clear` affects. The empty
    /// mask (`0`) means "all of them", per `spec.md` §4.1.
    pub struct ClearMask: u8 {
        const ORDINARY    = 1;
        const COL_HEADERS = 1 << 1;
        const ROW_HEADERS = 1 << 2;
    }
}

impl ClearMask {
    fn effective(self) -> Self {
        if self.is_empty() {
            Self::ORDINARY | Self::COL_HEADERS | Self::ROW_HEADERS
        } else {
            self
        }
    }
}

/// A structured change notification, delivered to every installed view
/// exactly once per mutation (`spec.md` §4.1's event table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    CellChanged { col: u32, row: u32 },
    /// Never mixes header cells with ordinary cells in one event.
    RegionChanged { col0: u32, row0: u32, col1: u32, row1: u32 },
    ColCountChanged { old: u32, new: u32, insertion_col: u32 },
    RowCountChanged { old: u32, new: u32, insertion_row: u32 },
    /// `clear`'s own event: a mask can span ordinary cells and both header
    /// bands in one call, and `RegionChanged` may never mix headers with
    /// ordinary cells, so a combined clear cannot be reported as a single
    /// `RegionChanged` without either violating that rule or splitting into
    /// more than one event for the mutation.
    Cleared(ClearMask),
}

type ViewCallback = Box<dyn Fn(&RefreshEvent)>;

/// Token returned by [`Table::install_view`]; pass it to
/// [`Table::uninstall_view`] to stop receiving refresh events.
pub struct ViewSubscription(subscriber_list::Subscription<ViewCallback>);

impl fmt::Debug for ViewSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewSubscription")
    }
}

struct TableState {
    col_count: u32,
    row_count: u32,
    cells: Vec<Cell>,
    cols: Vec<Cell>,
    rows: Vec<Cell>,
}

impl TableState {
    fn new(col_count: u32, row_count: u32) -> Self {
        Self {
            col_count,
            row_count,
            cells: (0..col_count as usize * row_count as usize)
                .map(|_| Cell::default())
                .collect(),
            cols: (0..col_count as usize).map(|_| Cell::default()).collect(),
            rows: (0..row_count as usize).map(|_| Cell::default()).collect(),
        }
    }

    fn slot(&mut self, col: u32, row: u32) -> Result<&mut Cell> {
        match (col, row) {
            (HEADER, HEADER) => Err(GridError::InvalidArgument),
            (HEADER, r) => self.rows.get_mut(r as usize).ok_or(GridError::InvalidArgument),
            (c, HEADER) => self.cols.get_mut(c as usize).ok_or(GridError::InvalidArgument),
            (c, r) => {
                if c >= self.col_count || r >= self.row_count {
                    return Err(GridError::InvalidArgument);
                }
                Ok(&mut self.cells[(r * self.col_count + c) as usize])
            }
        }
    }

    fn slot_ref(&self, col: u32, row: u32) -> Result<&Cell> {
        match (col, row) {
            (HEADER, HEADER) => Err(GridError::InvalidArgument),
            (HEADER, r) => self.rows.get(r as usize).ok_or(GridError::InvalidArgument),
            (c, HEADER) => self.cols.get(c as usize).ok_or(GridError::InvalidArgument),
            (c, r) => {
                if c >= self.col_count || r >= self.row_count {
                    return Err(GridError::InvalidArgument);
                }
                Ok(&self.cells[(r * self.col_count + c) as usize])
            }
        }
    }
}

/// The shared, reference-counted container of cells for a 2-D grid
/// described in `spec.md` §3.1.
///
/// `Table` is a cheap handle (an `Rc` clone); cloning it is `add_ref`, and
/// dropping the last clone frees the backing storage, matching
/// `spec.md`'s "release at 0 destroys" lifecycle while staying idiomatic.
#[derive(Clone)]
pub struct Table(Rc<TableInner>);

struct TableInner {
    state: std::cell::RefCell<TableState>,
    views: std::cell::RefCell<SubscriberList<ViewCallback>>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("Table")
            .field("col_count", &state.col_count)
            .field("row_count", &state.row_count)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

impl Table {
    /// `create`: allocate a new table with `refs == 1`.
    pub fn create(col_count: u32, row_count: u32) -> Self {
        Table(Rc::new(TableInner {
            state: std::cell::RefCell::new(TableState::new(col_count, row_count)),
            views: std::cell::RefCell::new(SubscriberList::new()),
        }))
    }

    /// `add_ref`: increment the reference count by cloning the handle.
    pub fn add_ref(&self) -> Self {
        self.clone()
    }

    /// `release`: decrement the reference count; the table is destroyed
    /// when the last handle is dropped.
    pub fn release(self) {
        drop(self)
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn col_count(&self) -> u32 {
        self.0.state.borrow().col_count
    }

    pub fn row_count(&self) -> u32 {
        self.0.state.borrow().row_count
    }

    /// Register a view's refresh callback. Views must call
    /// [`Table::uninstall_view`] (typically from their own `Drop` impl) to
    /// stop receiving events; `spec.md` §9 models this as an intrusive list
    /// entry the view itself is responsible for removing.
    pub fn install_view(&self, callback: ViewCallback) -> ViewSubscription {
        ViewSubscription(self.0.views.borrow_mut().insert(callback))
    }

    pub fn uninstall_view(&self, sub: ViewSubscription) {
        let _ = sub.0.unsubscribe();
    }

    fn emit(&self, event: RefreshEvent) {
        for cb in self.0.views.borrow().iter() {
            cb(&event);
        }
    }

    /// `set_cell`: write the fields selected by `patch.mask`.
    pub fn set_cell(&self, col: u32, row: u32, patch: &CellPatch) -> Result<()> {
        {
            let mut state = self.0.state.borrow_mut();
            let cell = state.slot(col, row)?;
            patch.apply(cell);
        }
        self.emit(RefreshEvent::CellChanged { col, row });
        Ok(())
    }

    /// `get_cell`: read the fields selected by `mask`.
    pub fn get_cell(&self, col: u32, row: u32, mask: CellFieldMask) -> Result<CellView> {
        let state = self.0.state.borrow();
        let cell = state.slot_ref(col, row)?;
        Ok(CellView {
            mask,
            text: if mask.contains(CellFieldMask::TEXT) { cell.text.clone() } else { CellText::None },
            param: if mask.contains(CellFieldMask::PARAM) { cell.param } else { 0 },
            flags: if mask.contains(CellFieldMask::FLAGS) { cell.flags } else { CellFlags::empty() },
        })
    }

    /// `clear`: free and zero the regions selected by `mask` (`0` = all).
    pub fn clear(&self, mask: ClearMask) -> Result<()> {
        let mask = mask.effective();
        {
            let mut state = self.0.state.borrow_mut();
            if mask.contains(ClearMask::ORDINARY) {
                for cell in &mut state.cells {
                    *cell = Cell::default();
                }
            }
            if mask.contains(ClearMask::COL_HEADERS) {
                for cell in &mut state.cols {
                    *cell = Cell::default();
                }
            }
            if mask.contains(ClearMask::ROW_HEADERS) {
                for cell in &mut state.rows {
                    *cell = Cell::default();
                }
            }
        }
        self.emit(RefreshEvent::Cleared(mask));
        Ok(())
    }

    /// `resize`: reshape the table to `new_col_count x new_row_count`,
    /// preserving the intersection of the old and new extents (see
    /// `spec.md` §4.1 and [`resize::apply`]).
    pub fn resize(&self, new_col_count: u32, new_row_count: u32) -> Result<()> {
        let events = {
            let mut state = self.0.state.borrow_mut();
            resize::apply(&mut state, new_col_count, new_row_count)?
        };
        for event in events {
            self.emit(event);
        }
        Ok(())
    }
}
