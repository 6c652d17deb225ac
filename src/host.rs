//! The host notifier collaborator (`spec.md` §6): the structured events the
//! grid view emits toward its embedder. This, [`crate::grid::paint::PaintSurface`],
//! [`crate::grid::edit::EditControl`], and [`crate::grid::input::DragArbiter`]
//! are the engine's only seams to a concrete windowing layer -- no backend
//! is implemented here, matching `spec.md` §1's Non-goals.
use crate::grid::{CustomDrawEvent, DispInfoMask, DispInfoReply, LabelEditOutcome};
use crate::region::Rect16;
use crate::table::Cell;

/// A column or row divider, used by the `*Track` and `*ColumnWidth`/
/// `*RowHeight` notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTy {
    Col,
    Row,
}

/// A `*_Changing` veto response: `Allow` lets the operation proceed,
/// `Deny` cancels it with [`crate::error::GridError::Cancelled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Veto {
    Allow,
    Deny,
}

impl Veto {
    pub fn is_denied(self) -> bool {
        self == Veto::Deny
    }
}

/// Mouse button used by the `NM_*Click`-style notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Structured events emitted by the grid toward its host, per `spec.md` §6.
/// Each notification conceptually carries the control id; since this crate
/// is backend-agnostic, the id is left to the host to attach (the host
/// owns exactly one `GridView` per call to its notifier in the common
/// case, so it rarely needs one, but multi-grid hosts can wrap
/// `HostNotifier` themselves to add it).
#[derive(Debug, Clone)]
pub enum Notification<'a> {
    FocusChanging { old: (u32, u32), new: (u32, u32) },
    FocusChanged { old: (u32, u32), new: (u32, u32) },
    SelectionChanging,
    SelectionChanged,
    ColumnWidthChanging { col: u32, new_width: u32 },
    ColumnWidthChanged { col: u32, new_width: u32 },
    RowHeightChanging { row: u32, new_height: u32 },
    RowHeightChanged { row: u32, new_height: u32 },
    BeginColumnTrack { col: u32 },
    EndColumnTrack { col: u32, width: u32 },
    BeginRowTrack { row: u32 },
    EndRowTrack { row: u32, height: u32 },
    BeginLabelEdit { col: u32, row: u32, cell: &'a Cell },
    EndLabelEdit { col: u32, row: u32, outcome: &'a LabelEditOutcome },
    GetDispInfo { col: u32, row: u32, mask: DispInfoMask },
    SetDispInfo { col: u32, row: u32, cell: &'a Cell },
    CacheHint { col0: u32, row0: u32, col1: u32, row1: u32 },
    CustomDraw(CustomDrawEvent<'a>),
    Click { button: MouseButton, double: bool, cell: Option<(u32, u32)> },
    SetFocus,
    KillFocus,
    ReleasedCapture,
    OutOfMemory,
}

/// The host collaborator that receives structured change events from the
/// grid and table (`spec.md` §6). `*_Changing` events return a [`Veto`];
/// everything else is a fire-and-forget notification.
///
/// A default implementation of every method is provided so hosts only need
/// to override what they care about -- matching `tcw3`'s pattern of giving
/// `ViewListener`/`WndListener` all-default trait methods.
pub trait HostNotifier {
    fn notify(&mut self, _event: Notification<'_>) {}

    /// Veto hook for `FocusChanging`. Returning `Deny` cancels the focus
    /// change and leaves all state untouched.
    fn focus_changing(&mut self, old: (u32, u32), new: (u32, u32)) -> Veto {
        self.notify(Notification::FocusChanging { old, new });
        Veto::Allow
    }

    /// Veto hook for `SelectionChanging`.
    fn selection_changing(&mut self) -> Veto {
        self.notify(Notification::SelectionChanging);
        Veto::Allow
    }

    fn column_width_changing(&mut self, col: u32, new_width: u32) -> Veto {
        self.notify(Notification::ColumnWidthChanging { col, new_width });
        Veto::Allow
    }

    fn row_height_changing(&mut self, row: u32, new_height: u32) -> Veto {
        self.notify(Notification::RowHeightChanging { row, new_height });
        Veto::Allow
    }

    /// `BeginLabelEdit`: returning `Deny` tears the edit down immediately.
    fn begin_label_edit(&mut self, col: u32, row: u32, cell: &Cell) -> Veto {
        self.notify(Notification::BeginLabelEdit { col, row, cell });
        Veto::Allow
    }

    fn end_label_edit(&mut self, col: u32, row: u32, outcome: &LabelEditOutcome) {
        self.notify(Notification::EndLabelEdit { col, row, outcome });
    }

    /// `GetDispInfo`: used in virtual mode, or for `TEXT_CALLBACK` cells.
    fn get_disp_info(&mut self, col: u32, row: u32, mask: DispInfoMask) -> DispInfoReply {
        self.notify(Notification::GetDispInfo { col, row, mask });
        DispInfoReply::default()
    }

    fn set_disp_info(&mut self, col: u32, row: u32, cell: &Cell) {
        self.notify(Notification::SetDispInfo { col, row, cell });
    }

    fn cache_hint(&mut self, col0: u32, row0: u32, col1: u32, row1: u32) {
        self.notify(Notification::CacheHint { col0, row0, col1, row1 });
    }

    fn custom_draw(&mut self, event: CustomDrawEvent<'_>) -> CustomDrawReply {
        self.notify(Notification::CustomDraw(event));
        CustomDrawReply::default()
    }
}

/// Reply from [`HostNotifier::custom_draw`]: `skip_default` corresponds to
/// `NMCUSTOMDRAW`'s `SkipDefault` return value from `spec.md` §4.6.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomDrawReply {
    pub skip_default: bool,
    pub override_text_color: Option<u32>,
    pub override_back_color: Option<u32>,
}

/// A rectangle carried in paint-related notifications, in pixel space
/// rather than `rgn16`'s cell-index space. Interconverts with
/// `cggeom::Box2<i32>`, which `grid::geometry`'s combinators (union,
/// translation) are expressed in terms of, grounded on
/// `tcw3::ui::views::table`'s use of `cgmath`/`cggeom` for the same kind of
/// quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl From<Rect16> for PixelRect {
    /// Only meaningful when the rect16 coordinates happen to already be in
    /// pixel units (used by tests); real pixel rectangles come from
    /// `grid::geometry`.
    fn from(r: Rect16) -> Self {
        PixelRect { x: r.x0 as i32, y: r.y0 as i32, w: (r.x1 - r.x0) as i32, h: (r.y1 - r.y0) as i32 }
    }
}

impl From<PixelRect> for cggeom::Box2<i32> {
    fn from(r: PixelRect) -> Self {
        use cggeom::prelude::*;
        cggeom::Box2::with_size(cgmath::Point2::new(r.x, r.y), cgmath::Vector2::new(r.w, r.h))
    }
}

impl From<cggeom::Box2<i32>> for PixelRect {
    fn from(b: cggeom::Box2<i32>) -> Self {
        use cggeom::prelude::*;
        let size = b.size();
        PixelRect { x: b.min.x, y: b.min.y, w: size.x, h: size.y }
    }
}
