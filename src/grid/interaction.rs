//! Mouse and keyboard driving of the input state machine (`spec.md` §4.5)
//! and the label-edit arming it feeds into (`spec.md` §4.7).
use crate::error::{GridError, Result};
use crate::host::{HostNotifier, LineTy, MouseButton, Notification};
use crate::region::Region;
use crate::table::HEADER;

use super::input::{ArbiterVerdict, DragArbiter, DragExtra, InputState, LineTrack, MarqueeDrag, MarqueeOp};
use super::{edit, EditControl, GridStyle, GridView, SelectionMode};

/// Keyboard modifiers held during a mouse press or key press, used to pick
/// the marquee set-operation (`spec.md` §4.5) and shift-extended
/// navigation (`spec.md` §4.5, scenario E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// Navigation/command keys the grid reacts to (`spec.md` §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Space,
}

/// Pixel distance within which a mouse press is considered to be on a
/// column/row header divider rather than inside a cell.
const DIVIDER_HIT_SLOP: i32 = 4;

/// The delay (in milliseconds) a host should wait after arming a label edit
/// before calling [`GridView::confirm_label_edit_arm`], mirroring the
/// Win32 `GetDoubleClickTime()` default (`spec.md` §4.5's
/// "timer at dblclk-delay" transition).
pub const DBLCLK_DELAY_MS: u32 = 500;

impl GridView {
    fn divider_at(&self, x: i64, y: i64) -> Option<(LineTy, u32)> {
        let state = self.inner.borrow();
        let header_w = state.header_width();
        let header_h = state.header_height();
        if state.style.contains(GridStyle::RESIZABLE_COLS) && y < header_h && y >= 0 {
            let mut acc = header_w;
            for c in 0..state.col_count() {
                acc += state.geometry.col_width(c) as i64;
                if (x - acc).unsigned_abs() as i32 <= DIVIDER_HIT_SLOP {
                    return Some((LineTy::Col, c));
                }
                if x < acc {
                    break;
                }
            }
        }
        if state.style.contains(GridStyle::RESIZABLE_ROWS) && x < header_w && x >= 0 {
            let mut acc = header_h;
            for r in 0..state.row_count() {
                acc += state.geometry.row_height(r) as i64;
                if (y - acc).unsigned_abs() as i32 <= DIVIDER_HIT_SLOP {
                    return Some((LineTy::Row, r));
                }
                if y < acc {
                    break;
                }
            }
        }
        None
    }

    /// `LButtonDown`/`RButtonDown` (`spec.md` §4.5's transition table).
    /// Picks the transition out of `Idle` based on what was hit: a divider
    /// (if resizable), the already-focused cell (if label editing is
    /// permitted), or an ordinary cell (marquee). `double` is the host's own
    /// double-click detection (platform-timed, not reproduced here).
    ///
    /// Only the left button drives the state machine; a right-button press
    /// never arms resize/marquee/label-edit and is reported as a bare
    /// `Click` notification with `button: Right` -- the fix for `spec.md`
    /// §9's open question, where the source reused one notification for
    /// both right-click and right-double-click.
    pub fn mouse_down(
        &self,
        x: i64,
        y: i64,
        modifiers: Modifiers,
        button: MouseButton,
        double: bool,
        host: &mut dyn HostNotifier,
        arbiter: &mut dyn DragArbiter,
    ) -> Result<()> {
        if let InputState::LabelEditArmed { col, row } = self.inner.borrow().input {
            if double {
                if self.cell_at(x, y) == Some((col, row)) {
                    self.inner.borrow_mut().input = InputState::Idle;
                }
                host.notify(Notification::Click { button, double, cell: self.cell_at(x, y) });
                return Ok(());
            }
        }
        if !self.inner.borrow().input.is_idle() {
            return Ok(());
        }
        if button != MouseButton::Left {
            host.notify(Notification::Click { button, double, cell: self.cell_at(x, y) });
            return Ok(());
        }

        if let Some((axis, index)) = self.divider_at(x, y) {
            let original_size = {
                let state = self.inner.borrow();
                match axis {
                    LineTy::Col => state.geometry.col_width(index),
                    LineTy::Row => state.geometry.row_height(index),
                }
            };
            let track = LineTrack { index, original_size, hotspot_offset: 0 };
            arbiter.set_candidate((x as i32, y as i32), DragExtra::Resize { original_size });
            let mut state = self.inner.borrow_mut();
            state.input = match axis {
                LineTy::Col => InputState::ColResize(track),
                LineTy::Row => InputState::RowResize(track),
            };
            drop(state);
            match axis {
                LineTy::Col => host.notify(Notification::BeginColumnTrack { col: index }),
                LineTy::Row => host.notify(Notification::BeginRowTrack { row: index }),
            }
            return Ok(());
        }

        let Some((col, row)) = self.cell_at(x, y) else {
            host.notify(Notification::Click { button, double, cell: None });
            return Ok(());
        };

        let focused_editable = {
            let state = self.inner.borrow();
            state.style.contains(GridStyle::EDIT_LABELS) && state.focus == Some((col, row))
        };
        if focused_editable {
            self.inner.borrow_mut().input = InputState::LabelEditArmed { col, row };
            return Ok(());
        }

        let mode = self.selection_mode();
        let op = if mode == SelectionMode::Complex && modifiers.ctrl {
            MarqueeOp::Xor
        } else if mode == SelectionMode::Complex && modifiers.shift {
            MarqueeOp::Union
        } else {
            MarqueeOp::Set
        };
        let drag = MarqueeDrag { origin: (col, row), current: (col, row), op, button, double };
        arbiter.set_candidate((x as i32, y as i32), DragExtra::Marquee(op));
        self.inner.borrow_mut().input = InputState::MarqueeArmed(drag);
        Ok(())
    }

    /// The host-driven "timer at dblclk-delay" transition (`spec.md` §4.5):
    /// confirms a pending [`InputState::LabelEditArmed`] into an actual
    /// label edit. A no-op if the arm was cancelled (double-click, escape,
    /// capture lost) before the timer fired.
    pub fn confirm_label_edit_arm(
        &self,
        host: &mut dyn HostNotifier,
        make_edit_control: &mut dyn FnMut() -> Box<dyn EditControl>,
    ) -> Result<()> {
        if !matches!(self.inner.borrow().input, InputState::LabelEditArmed { .. }) {
            return Ok(());
        }
        self.inner.borrow_mut().input = InputState::Idle;
        self.begin_label_edit(host, make_edit_control())
    }

    /// Mouse-move while a drag candidate is live: resize dividers track the
    /// pointer directly; marquee candidates consult the drag arbiter and
    /// promote to `MarqueeActive` once it reports `Started`.
    pub fn mouse_move(&self, x: i64, y: i64, arbiter: &mut dyn DragArbiter) {
        // `InputState` is `Copy`, so this snapshot lets every arm below
        // take its own short-lived borrow instead of holding one across
        // the whole match (some arms need to call back into `self`).
        let current_input = self.inner.borrow().input;
        match current_input {
            InputState::ColResize(track) => {
                let mut state = self.inner.borrow_mut();
                let header_w = state.header_width();
                let origin_x = state.geometry.col_x(track.index, state.scroll_x.scroll, header_w);
                let new_width = ((x - origin_x).max(1)).min(u16::MAX as i64) as u16;
                let col_count = state.col_count();
                state.geometry.set_col_width(track.index, col_count, Some(new_width));
                state.recompute_scroll_max();
            }
            InputState::RowResize(track) => {
                let mut state = self.inner.borrow_mut();
                let header_h = state.header_height();
                let origin_y = state.geometry.row_y(track.index, state.scroll_y.scroll, header_h);
                let new_height = ((y - origin_y).max(1)).min(u16::MAX as i64) as u16;
                let row_count = state.row_count();
                state.geometry.set_row_height(track.index, row_count, Some(new_height));
                state.recompute_scroll_max();
            }
            InputState::MarqueeArmed(drag) => match arbiter.consider_move((x as i32, y as i32)) {
                ArbiterVerdict::Started => {
                    self.inner.borrow_mut().input = InputState::MarqueeActive(drag);
                }
                ArbiterVerdict::Cancelled => {
                    self.inner.borrow_mut().input = InputState::Idle;
                }
                ArbiterVerdict::StillConsidering => {}
            },
            InputState::MarqueeActive(mut drag) => {
                if let Some(cell) = self.cell_at(x, y) {
                    drag.current = cell;
                    self.inner.borrow_mut().input = InputState::MarqueeActive(drag);
                }
            }
            InputState::Idle | InputState::LabelEditArmed { .. } => {}
        }
    }

    /// `LButtonUp`: commit whatever drag was in progress and return to
    /// `Idle` (`spec.md` §4.5).
    pub fn mouse_up(&self, host: &mut dyn HostNotifier) -> Result<()> {
        let input = self.inner.borrow().input;
        match input {
            InputState::Idle => Ok(()),
            InputState::ColResize(track) => {
                let width = self.inner.borrow().geometry.col_width(track.index);
                self.inner.borrow_mut().input = InputState::Idle;
                host.notify(Notification::EndColumnTrack { col: track.index, width: width as u32 });
                Ok(())
            }
            InputState::RowResize(track) => {
                let height = self.inner.borrow().geometry.row_height(track.index);
                self.inner.borrow_mut().input = InputState::Idle;
                host.notify(Notification::EndRowTrack { row: track.index, height: height as u32 });
                Ok(())
            }
            InputState::MarqueeArmed(drag) => {
                self.inner.borrow_mut().input = InputState::Idle;
                host.notify(Notification::Click {
                    button: drag.button,
                    double: drag.double,
                    cell: Some(drag.origin),
                });
                self.commit_marquee(drag, host)
            }
            InputState::MarqueeActive(drag) => {
                self.inner.borrow_mut().input = InputState::Idle;
                self.commit_marquee(drag, host)
            }
            // `spec.md` §4.5's transition table has no `LButtonUp` edge out
            // of `LabelEditArmed`: the arm is only resolved by a
            // double-click (cancel, handled in `mouse_down`) or the
            // dblclk-delay timer (`confirm_label_edit_arm`). A plain
            // button-up here is the first click of that sequence and must
            // leave the arm in place.
            InputState::LabelEditArmed { .. } => Ok(()),
        }
    }

    fn commit_marquee(&self, drag: MarqueeDrag, host: &mut dyn HostNotifier) -> Result<()> {
        let rect = drag.rect();
        let cell_region = Region::from_rect(rect);
        let current = self.selection();
        let next = match drag.op {
            MarqueeOp::Set => cell_region,
            MarqueeOp::Union => crate::region::union(&current, &cell_region)?,
            MarqueeOp::Xor => crate::region::xor(&current, &cell_region)?,
        };
        self.set_selection(next, host)?;
        self.inner.borrow_mut().selection.set_anchor(drag.origin);
        if self.style().contains(GridStyle::FOCUSED_CELL) {
            self.set_focus(drag.current.0, drag.current.1, host)?;
        }
        Ok(())
    }

    /// `Esc`: cancel whatever non-idle state is active (`spec.md` §4.5).
    /// Resize cancellation restores the original size; marquee
    /// cancellation simply returns to `Idle` without touching the
    /// selection; label-edit cancellation goes through
    /// [`GridView::cancel_label_edit`].
    pub fn escape(&self, host: &mut dyn HostNotifier, arbiter: &mut dyn DragArbiter) -> Result<()> {
        arbiter.cancel();
        let input = self.inner.borrow().input;
        match input {
            InputState::ColResize(track) => {
                let mut state = self.inner.borrow_mut();
                let col_count = state.col_count();
                state.geometry.set_col_width(track.index, col_count, Some(track.original_size));
                state.input = InputState::Idle;
            }
            InputState::RowResize(track) => {
                let mut state = self.inner.borrow_mut();
                let row_count = state.row_count();
                state.geometry.set_row_height(track.index, row_count, Some(track.original_size));
                state.input = InputState::Idle;
            }
            InputState::MarqueeArmed(_) | InputState::MarqueeActive(_) => {
                self.inner.borrow_mut().input = InputState::Idle;
            }
            InputState::LabelEditArmed { .. } => {
                self.inner.borrow_mut().input = InputState::Idle;
            }
            InputState::Idle => {}
        }
        if self.inner.borrow().edit.is_some() {
            self.cancel_label_edit(host);
        }
        Ok(())
    }

    /// Capture lost (`spec.md` §4.5: "Any non-Idle -- capture lost -> Idle
    /// (cancel)"). Identical to [`GridView::escape`] but without an
    /// arbiter, since the platform itself is reporting the loss.
    pub fn capture_lost(&self, host: &mut dyn HostNotifier) {
        let input = self.inner.borrow().input;
        if let InputState::ColResize(track) = input {
            let mut state = self.inner.borrow_mut();
            let col_count = state.col_count();
            state.geometry.set_col_width(track.index, col_count, Some(track.original_size));
        } else if let InputState::RowResize(track) = input {
            let mut state = self.inner.borrow_mut();
            let row_count = state.row_count();
            state.geometry.set_row_height(track.index, row_count, Some(track.original_size));
        }
        self.inner.borrow_mut().input = InputState::Idle;
        host.notify(Notification::ReleasedCapture);
    }

    // ---- keyboard navigation --------------------------------------------

    /// Keyboard handling from `spec.md` §4.5: arrow/Home/End/PageUp/
    /// PageDown move focus and scroll to keep it visible when the
    /// focused-cell style is on; otherwise the same keys scroll the
    /// viewport. `rtl` swaps `Left`/`Right`, per the spec's
    /// right-to-left note.
    pub fn key_down(
        &self,
        key: Key,
        modifiers: Modifiers,
        rtl: bool,
        host: &mut dyn HostNotifier,
        make_edit_control: &mut dyn FnMut() -> Box<dyn EditControl>,
    ) -> Result<()> {
        if key == Key::Escape {
            let mut arbiter = super::input::ThresholdDragArbiter::default();
            return self.escape(host, &mut arbiter);
        }

        let has_focus_style = self.style().contains(GridStyle::FOCUSED_CELL);
        if !has_focus_style {
            self.scroll_for_key(key, rtl);
            return Ok(());
        }

        if key == Key::Space && modifiers.ctrl {
            return self.toggle_focused_cell_selection(host);
        }

        let Some((col, row)) = self.focus() else {
            return Ok(());
        };
        if key == Key::Enter {
            if self.style().contains(GridStyle::EDIT_LABELS) {
                return self.begin_label_edit(host, make_edit_control());
            }
            return Ok(());
        }

        let key = if rtl {
            match key {
                Key::Left => Key::Right,
                Key::Right => Key::Left,
                other => other,
            }
        } else {
            key
        };

        let col_count = self.col_count();
        let row_count = self.row_count();
        if col_count == 0 || row_count == 0 {
            return Ok(());
        }
        let (new_col, new_row) = match key {
            Key::Left => (col.saturating_sub(1), row),
            Key::Right => ((col + 1).min(col_count - 1), row),
            Key::Up => (col, row.saturating_sub(1)),
            Key::Down => (col, (row + 1).min(row_count - 1)),
            Key::Home => {
                if modifiers.ctrl {
                    (0, 0)
                } else {
                    (0, row)
                }
            }
            Key::End => {
                if modifiers.ctrl {
                    (col_count - 1, row_count - 1)
                } else {
                    (col_count - 1, row)
                }
            }
            Key::PageUp => (col, row.saturating_sub(10)),
            Key::PageDown => (col, (row + 10).min(row_count - 1)),
            Key::Enter | Key::Escape | Key::Space => (col, row),
        };

        // The anchor is established once, at the first shift-extend out of
        // a non-extending focus move, and must not move again while the
        // user keeps extending -- otherwise it silently slides with the
        // focus and the selection never grows past two lines.
        let anchor = self.selection_anchor().unwrap_or((col, row));
        self.set_focus(new_col, new_row, host)?;
        if modifiers.shift && self.selection_mode() != SelectionMode::None {
            self.inner.borrow_mut().selection.set_anchor(anchor);
            let rect = crate::region::Rect16::new(
                anchor.0.min(new_col) as u16,
                anchor.1.min(new_row) as u16,
                anchor.0.max(new_col) as u16 + 1,
                anchor.1.max(new_row) as u16 + 1,
            );
            self.set_selection(Region::from_rect(rect), host)?;
        } else {
            self.inner.borrow_mut().selection.set_anchor((new_col, new_row));
        }
        Ok(())
    }

    fn scroll_for_key(&self, key: Key, rtl: bool) {
        let key = if rtl {
            match key {
                Key::Left => Key::Right,
                Key::Right => Key::Left,
                other => other,
            }
        } else {
            key
        };
        let (x, y) = self.scroll_position();
        let step_x = self.col_width_or_default();
        let step_y = self.row_height_or_default();
        struct Ignore;
        impl HostNotifier for Ignore {}
        let mut ignore = Ignore;
        let (nx, ny) = match key {
            Key::Left => (x - step_x, y),
            Key::Right => (x + step_x, y),
            Key::Up => (x, y - step_y),
            Key::Down => (x, y + step_y),
            Key::Home => (0, y),
            Key::End => (i64::MAX, y),
            Key::PageUp => (x, y - step_y * 10),
            Key::PageDown => (x, y + step_y * 10),
            Key::Enter | Key::Escape | Key::Space => (x, y),
        };
        let _ = self.scroll_to(nx, ny, &mut ignore);
    }

    fn col_width_or_default(&self) -> i64 {
        self.col_width(0).max(1) as i64
    }
    fn row_height_or_default(&self) -> i64 {
        self.row_height(0).max(1) as i64
    }

    // ---- label-edit lifecycle (`spec.md` §4.7) ---------------------------

    /// Arm and open a label edit over the focused cell. Host may veto via
    /// `BeginLabelEdit`'s return value, tearing the edit down immediately.
    pub fn begin_label_edit(
        &self,
        host: &mut dyn HostNotifier,
        mut control: Box<dyn EditControl>,
    ) -> Result<()> {
        let (col, row) = self.focus().ok_or(GridError::InvalidState)?;
        if !self.style().contains(GridStyle::EDIT_LABELS) {
            return Err(GridError::InvalidState);
        }

        let original_text = self.cell_text_for_edit(host, col, row);
        let cell_for_veto = crate::table::Cell {
            text: crate::table::CellText::Owned(original_text.clone()),
            param: 0,
            flags: crate::table::CellFlags::empty(),
        };
        if host.begin_label_edit(col, row, &cell_for_veto).is_denied() {
            return Ok(());
        }

        // "starting a new edit while one is active closes the previous one
        // first" (`spec.md` §4.7): claim the global slot, then tear down
        // whatever we displaced.
        let previous = edit::claim_owner(self.id);
        if let Some(prev_id) = previous {
            if prev_id != self.id {
                log::warn!("label edit on grid {} preempted owner {}", self.id, prev_id);
            }
        }

        let rect = self.cell_rect(col, row);
        control.create(rect, &original_text);
        control.set_selection_all();
        control.show();

        self.inner.borrow_mut().edit = Some(edit::EditSession::new(col, row, original_text, self.id, control));
        Ok(())
    }

    fn cell_text_for_edit(&self, host: &mut dyn HostNotifier, col: u32, row: u32) -> String {
        if self.style().contains(GridStyle::OWNER_DATA) {
            host.get_disp_info(col, row, crate::table::CellFieldMask::TEXT).text.unwrap_or_default()
        } else {
            match self.get_cell(col, row, crate::table::CellFieldMask::TEXT) {
                Ok(view) => match view.text {
                    crate::table::CellText::Owned(s) => s,
                    crate::table::CellText::Callback => {
                        host.get_disp_info(col, row, crate::table::CellFieldMask::TEXT).text.unwrap_or_default()
                    }
                    crate::table::CellText::None => String::new(),
                },
                Err(_) => String::new(),
            }
        }
    }

    /// Commit the active label edit with `new_text`, writing through to the
    /// table (or `SetDispInfo` for callback/owner-data cells), per
    /// `spec.md` §4.7 step 5.
    pub fn commit_label_edit(&self, new_text: String, host: &mut dyn HostNotifier) -> Result<()> {
        let session = self.inner.borrow_mut().edit.take();
        let Some(mut session) = session else {
            return Ok(());
        };
        edit::release_owner(session.owner_id());
        session.control_mut().destroy();

        let is_virtual = self.style().contains(GridStyle::OWNER_DATA);
        let new_cell = crate::table::Cell {
            text: crate::table::CellText::Owned(new_text.clone()),
            param: 0,
            flags: crate::table::CellFlags::empty(),
        };
        if is_virtual {
            host.set_disp_info(session.col, session.row, &new_cell);
        } else {
            let is_callback = matches!(
                self.get_cell(session.col, session.row, crate::table::CellFieldMask::TEXT).map(|v| v.text),
                Ok(crate::table::CellText::Callback)
            );
            if is_callback {
                host.set_disp_info(session.col, session.row, &new_cell);
            } else {
                self.set_cell(
                    session.col,
                    session.row,
                    &crate::table::CellPatch::text(crate::table::CellText::Owned(new_text)),
                )?;
            }
        }
        let outcome = super::edit::LabelEditOutcome::Committed { text: new_cell.text_as_string() };
        host.end_label_edit(session.col, session.row, &outcome);
        Ok(())
    }

    /// Cancel the active label edit, discarding any typed text. Fires
    /// `EndLabelEdit` with `outcome = Cancelled`; no `CellChanged` event is
    /// emitted (`spec.md` §8, scenario F).
    pub fn cancel_label_edit(&self, host: &mut dyn HostNotifier) {
        let session = self.inner.borrow_mut().edit.take();
        let Some(mut session) = session else {
            return;
        };
        edit::release_owner(session.owner_id());
        session.control_mut().destroy();
        host.end_label_edit(session.col, session.row, &super::edit::LabelEditOutcome::Cancelled);
    }

    fn end_label_edit_if_active(&self, reason: super::edit::EditEndReason, host: &mut dyn HostNotifier) {
        let active = self.inner.borrow().edit.is_some();
        if !active {
            return;
        }
        if reason.commits() {
            let text = self.inner.borrow().edit.as_ref().map(|e| e.original_text.clone());
            if let Some(text) = text {
                let _ = self.commit_label_edit(text, host);
            }
        } else {
            self.cancel_label_edit(host);
        }
    }

    pub fn active_label_edit(&self) -> Option<(u32, u32)> {
        self.inner.borrow().edit.as_ref().map(|e| (e.col, e.row))
    }

    /// Loss of window focus implicitly commits an active label edit
    /// (`spec.md` §4.7 step 4: "loss of focus also commits").
    pub fn kill_focus(&self, host: &mut dyn HostNotifier) {
        if let Some((_, row)) = self.active_label_edit() {
            let _ = row;
            let text = self.inner.borrow().edit.as_ref().map(|e| e.original_text.clone());
            if let Some(text) = text {
                let _ = self.commit_label_edit(text, host);
            }
        }
        host.notify(Notification::KillFocus);
    }
}

impl crate::table::Cell {
    fn text_as_string(&self) -> String {
        match &self.text {
            crate::table::CellText::Owned(s) => s.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridStyle, GridView, ThresholdDragArbiter};
    use crate::host::HostNotifier;

    #[derive(Default)]
    struct NullHost;
    impl HostNotifier for NullHost {}

    #[derive(Default)]
    struct RecordingEditControl {
        log: std::rc::Rc<std::cell::RefCell<Vec<&'static str>>>,
    }
    impl EditControl for RecordingEditControl {
        fn create(&mut self, _rect: crate::host::PixelRect, _initial_text: &str) {
            self.log.borrow_mut().push("create");
        }
        fn set_selection_all(&mut self) {
            self.log.borrow_mut().push("select_all");
        }
        fn show(&mut self) {
            self.log.borrow_mut().push("show");
        }
        fn get_text(&self) -> String {
            String::new()
        }
        fn destroy(&mut self) {
            self.log.borrow_mut().push("destroy");
        }
    }

    #[test]
    fn marquee_click_selects_single_cell() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.set_selection_mode(SelectionMode::Complex);
        g.resize(10, 10).unwrap();
        g.set_client_size(1000, 1000);
        let mut host = NullHost;
        let mut arbiter = ThresholdDragArbiter::new(4);
        let rect = g.cell_rect(3, 3);
        g.mouse_down(
            (rect.x + 2) as i64,
            (rect.y + 2) as i64,
            Modifiers::default(),
            MouseButton::Left,
            false,
            &mut host,
            &mut arbiter,
        )
        .unwrap();
        g.mouse_up(&mut host).unwrap();
        assert!(g.selection().contains_xy(3, 3));
        assert_eq!(g.selection().rect_count(), 1);
    }

    #[test]
    fn ctrl_marquee_unions_with_existing_selection() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.set_selection_mode(SelectionMode::Complex);
        g.resize(10, 10).unwrap();
        g.set_client_size(1000, 1000);
        let mut host = NullHost;
        let mut arbiter = ThresholdDragArbiter::new(4);

        let r1 = g.cell_rect(1, 1);
        g.mouse_down(r1.x as i64, r1.y as i64, Modifiers::default(), MouseButton::Left, false, &mut host, &mut arbiter)
            .unwrap();
        let r2 = g.cell_rect(2, 2);
        g.mouse_move(r2.x as i64, r2.y as i64, &mut arbiter);
        g.mouse_up(&mut host).unwrap();
        assert_eq!(g.selection(), Region::from_rect(crate::region::Rect16::new(1, 1, 3, 3)));

        let mut arbiter2 = ThresholdDragArbiter::new(4);
        let r5 = g.cell_rect(5, 5);
        g.mouse_down(
            r5.x as i64,
            r5.y as i64,
            Modifiers { shift: false, ctrl: true },
            MouseButton::Left,
            false,
            &mut host,
            &mut arbiter2,
        )
        .unwrap();
        let r6 = g.cell_rect(6, 6);
        g.mouse_move(r6.x as i64, r6.y as i64, &mut arbiter2);
        g.mouse_up(&mut host).unwrap();
        assert_eq!(g.selection().rect_count(), 2);
    }

    #[test]
    fn label_edit_escape_does_not_change_cell() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL | GridStyle::EDIT_LABELS);
        g.resize(5, 5).unwrap();
        let mut host = NullHost;
        g.set_focus(2, 2, &mut host).unwrap();
        g.set_cell(2, 2, &crate::table::CellPatch::text(crate::table::CellText::Owned("foo".into()))).unwrap();
        g.begin_label_edit(&mut host, Box::new(RecordingEditControl::default())).unwrap();
        assert!(g.active_label_edit().is_some());
        let mut arbiter = ThresholdDragArbiter::default();
        g.escape(&mut host, &mut arbiter).unwrap();
        assert!(g.active_label_edit().is_none());
        let cell = g.get_cell(2, 2, crate::table::CellFieldMask::TEXT).unwrap();
        assert_eq!(cell.text, crate::table::CellText::Owned("foo".into()));
    }

    #[test]
    fn label_edit_commit_writes_through() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL | GridStyle::EDIT_LABELS);
        g.resize(5, 5).unwrap();
        let mut host = NullHost;
        g.set_focus(0, 0, &mut host).unwrap();
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        g.begin_label_edit(&mut host, Box::new(RecordingEditControl { log: log.clone() })).unwrap();
        g.commit_label_edit("bar".to_string(), &mut host).unwrap();
        let cell = g.get_cell(0, 0, crate::table::CellFieldMask::TEXT).unwrap();
        assert_eq!(cell.text, crate::table::CellText::Owned("bar".into()));
        assert_eq!(*log.borrow(), vec!["create", "select_all", "show", "destroy"]);
    }

    #[test]
    fn shift_extends_selection_between_anchor_and_focus() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.set_selection_mode(SelectionMode::Complex);
        g.resize(10, 10).unwrap();
        let mut host = NullHost;
        g.set_focus(0, 0, &mut host).unwrap();
        let mut make_control = || -> Box<dyn EditControl> { Box::new(RecordingEditControl::default()) };
        g.key_down(Key::Right, Modifiers { shift: true, ctrl: false }, false, &mut host, &mut make_control).unwrap();
        g.key_down(Key::Right, Modifiers { shift: true, ctrl: false }, false, &mut host, &mut make_control).unwrap();
        g.key_down(Key::Right, Modifiers { shift: true, ctrl: false }, false, &mut host, &mut make_control).unwrap();
        assert_eq!(g.selection(), Region::from_rect(crate::region::Rect16::new(0, 0, 4, 1)));
        assert_eq!(g.focus(), Some((3, 0)));
        g.key_down(Key::Down, Modifiers { shift: true, ctrl: false }, false, &mut host, &mut make_control).unwrap();
        g.key_down(Key::Down, Modifiers { shift: true, ctrl: false }, false, &mut host, &mut make_control).unwrap();
        assert_eq!(g.selection(), Region::from_rect(crate::region::Rect16::new(0, 0, 4, 3)));
        assert_eq!(g.focus(), Some((3, 2)));
    }

    #[test]
    fn rtl_swaps_left_and_right() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.resize(10, 10).unwrap();
        let mut host = NullHost;
        g.set_focus(5, 0, &mut host).unwrap();
        let mut make_control = || -> Box<dyn EditControl> { Box::new(RecordingEditControl::default()) };
        g.key_down(Key::Left, Modifiers::default(), true, &mut host, &mut make_control).unwrap();
        assert_eq!(g.focus(), Some((6, 0)));
    }

    #[derive(Default)]
    struct ClickRecordingHost {
        clicks: Vec<(MouseButton, bool, Option<(u32, u32)>)>,
    }
    impl HostNotifier for ClickRecordingHost {
        fn notify(&mut self, event: Notification<'_>) {
            if let Notification::Click { button, double, cell } = event {
                self.clicks.push((button, double, cell));
            }
        }
    }

    #[test]
    fn right_click_reports_notification_without_arming_state() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.resize(5, 5).unwrap();
        g.set_client_size(1000, 1000);
        let mut host = ClickRecordingHost::default();
        let mut arbiter = ThresholdDragArbiter::new(4);
        let rect = g.cell_rect(1, 1);
        g.mouse_down(rect.x as i64, rect.y as i64, Modifiers::default(), MouseButton::Right, false, &mut host, &mut arbiter)
            .unwrap();
        assert_eq!(host.clicks, vec![(MouseButton::Right, false, Some((1, 1)))]);

        g.mouse_down(rect.x as i64, rect.y as i64, Modifiers::default(), MouseButton::Right, true, &mut host, &mut arbiter)
            .unwrap();
        assert_eq!(host.clicks[1], (MouseButton::Right, true, Some((1, 1))));
    }

    #[test]
    fn single_left_click_selects_and_reports_click() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL);
        g.set_selection_mode(SelectionMode::Complex);
        g.resize(5, 5).unwrap();
        g.set_client_size(1000, 1000);
        let mut host = ClickRecordingHost::default();
        let mut arbiter = ThresholdDragArbiter::new(4);
        let rect = g.cell_rect(2, 2);
        g.mouse_down(rect.x as i64, rect.y as i64, Modifiers::default(), MouseButton::Left, false, &mut host, &mut arbiter)
            .unwrap();
        g.mouse_up(&mut host).unwrap();
        assert_eq!(host.clicks, vec![(MouseButton::Left, false, Some((2, 2)))]);
        assert!(g.selection().contains_xy(2, 2));
    }

    #[test]
    fn double_click_on_armed_cell_cancels_edit_start() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL | GridStyle::EDIT_LABELS);
        g.resize(5, 5).unwrap();
        g.set_client_size(1000, 1000);
        let mut host = ClickRecordingHost::default();
        g.set_focus(1, 1, &mut host).unwrap();
        let mut arbiter = ThresholdDragArbiter::new(4);
        let rect = g.cell_rect(1, 1);
        g.mouse_down(rect.x as i64, rect.y as i64, Modifiers::default(), MouseButton::Left, false, &mut host, &mut arbiter)
            .unwrap();
        g.mouse_up(&mut host).unwrap();
        g.mouse_down(rect.x as i64, rect.y as i64, Modifiers::default(), MouseButton::Left, true, &mut host, &mut arbiter)
            .unwrap();
        assert!(g.active_label_edit().is_none());
        let mut make_control = || -> Box<dyn EditControl> { Box::new(RecordingEditControl::default()) };
        g.confirm_label_edit_arm(&mut host, &mut make_control).unwrap();
        assert!(g.active_label_edit().is_none(), "the arm was already cancelled by the double-click");
    }

    #[test]
    fn dblclk_timer_confirms_armed_edit() {
        let g = GridView::new(GridStyle::AUTO_TABLE | GridStyle::FOCUSED_CELL | GridStyle::EDIT_LABELS);
        g.resize(5, 5).unwrap();
        g.set_client_size(1000, 1000);
        let mut host = NullHost;
        g.set_focus(1, 1, &mut host).unwrap();
        g.set_cell(1, 1, &crate::table::CellPatch::text(crate::table::CellText::Owned("hi".into()))).unwrap();
        let mut arbiter = ThresholdDragArbiter::new(4);
        let rect = g.cell_rect(1, 1);
        g.mouse_down(rect.x as i64, rect.y as i64, Modifiers::default(), MouseButton::Left, false, &mut host, &mut arbiter)
            .unwrap();
        g.mouse_up(&mut host).unwrap();
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut make_control = || -> Box<dyn EditControl> { Box::new(RecordingEditControl { log: log.clone() }) };
        g.confirm_label_edit_arm(&mut host, &mut make_control).unwrap();
        assert!(g.active_label_edit().is_some());
        assert_eq!(*log.borrow(), vec!["create", "select_all", "show"]);
    }
}
