//! The mutually-exclusive input state machine (`spec.md` §4.5): mouse,
//! keyboard, capture, and timer events drive transitions between column/row
//! resize, marquee selection, and label-edit arming.
use crate::host::MouseButton;
use crate::region::Rect16;

/// The set-operation a marquee drag will apply to the current selection on
/// commit, chosen at press time from the modifier keys held and the
/// selection mode in effect (`spec.md` §4.5): only `Complex` mode may
/// choose `Union`/`Xor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarqueeOp {
    Set,
    Union,
    Xor,
}

/// A column or row divider being dragged, identified by its line index and
/// the size it had before the drag started (restored on cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTrack {
    pub index: u32,
    pub original_size: u16,
    /// Offset from the divider's pixel position to the pointer at press
    /// time, subtracted from the pointer position on every move.
    pub hotspot_offset: i32,
}

/// A marquee (rubber-band) selection drag in progress. `button`/`double`
/// are carried from the originating press so that a plain `LButtonUp`
/// ("apply click select") can still report the right
/// [`crate::host::Notification::Click`] at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarqueeDrag {
    pub origin: (u32, u32),
    pub current: (u32, u32),
    pub op: MarqueeOp,
    pub button: MouseButton,
    pub double: bool,
}

impl MarqueeDrag {
    /// Translate the drag's two corner cells into the half-open rectangle
    /// `spec.md` §4.5 describes ("inclusive on both sides" of the cell
    /// indices, hence `+1` on the high corner).
    pub fn rect(&self) -> Rect16 {
        let (c0, r0) = self.origin;
        let (c1, r1) = self.current;
        let (lo_c, hi_c) = if c0 <= c1 { (c0, c1) } else { (c1, c0) };
        let (lo_r, hi_r) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
        Rect16::new(lo_c as u16, lo_r as u16, hi_c as u16 + 1, hi_r as u16 + 1)
    }
}

/// The grid's interaction state, mutually exclusive as described by
/// `spec.md` §4.5's transition diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Idle,
    ColResize(LineTrack),
    RowResize(LineTrack),
    /// Pressed on an ordinary cell; waiting for the drag arbiter to say
    /// whether this is a click or the start of a marquee drag.
    MarqueeArmed(MarqueeDrag),
    MarqueeActive(MarqueeDrag),
    /// Pressed on the already-focused cell with label editing permitted;
    /// waiting for the double-click-delay timer or a cancelling event.
    LabelEditArmed { col: u32, row: u32 },
}

impl Default for InputState {
    fn default() -> Self {
        InputState::Idle
    }
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InputState::Idle)
    }

    /// Whether a marquee drag (armed or active) is in progress, used by the
    /// paint pipeline to decide whether to preview the drag rectangle as
    /// selected (`spec.md` §4.6 step 6).
    pub fn marquee(&self) -> Option<&MarqueeDrag> {
        match self {
            InputState::MarqueeArmed(m) | InputState::MarqueeActive(m) => Some(m),
            _ => None,
        }
    }

    pub fn marquee_mut(&mut self) -> Option<&mut MarqueeDrag> {
        match self {
            InputState::MarqueeArmed(m) | InputState::MarqueeActive(m) => Some(m),
            _ => None,
        }
    }

    pub fn col_track(&self) -> Option<&LineTrack> {
        match self {
            InputState::ColResize(t) => Some(t),
            _ => None,
        }
    }

    pub fn row_track(&self) -> Option<&LineTrack> {
        match self {
            InputState::RowResize(t) => Some(t),
            _ => None,
        }
    }
}

/// What the drag arbiter reports about a candidate press/move sequence
/// (`spec.md` §6, §9's design note: "expose a trait so tests can drive it
/// deterministically").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterVerdict {
    /// The move has not yet exceeded the drag threshold.
    StillConsidering,
    /// The threshold was exceeded; the drag is now live.
    Started,
    /// The candidate drag was abandoned (e.g. button released before the
    /// threshold, or capture was lost).
    Cancelled,
}

/// Extra payload a candidate drag carries, forwarded to
/// [`DragArbiter::set_candidate`] so a `lock()`-style inspector (were this
/// not reduced to the trait below) could recover what kind of drag is in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragExtra {
    Marquee(MarqueeOp),
    Resize { original_size: u16 },
}

/// The mouse-drag arbiter collaborator from `spec.md` §1 and §6: decides
/// when a press-move sequence has passed the system drag threshold, kept
/// abstract so the grid's press handling does not hardcode a platform
/// constant and so tests can drive it deterministically without a real
/// mouse, per `spec.md` §9.
pub trait DragArbiter {
    /// Record the candidate drag's starting point and payload.
    fn set_candidate(&mut self, origin: (i32, i32), extra: DragExtra);

    /// Report a new pointer position for the in-progress candidate and get
    /// back its verdict.
    fn consider_move(&mut self, pointer: (i32, i32)) -> ArbiterVerdict;

    /// Abandon the candidate drag (button released early, `Escape`, or
    /// capture lost).
    fn cancel(&mut self);
}

/// The reference [`DragArbiter`]: a drag starts once the pointer moves more
/// than `threshold` pixels (in either axis) from the press origin, mirroring
/// the system drag threshold `spec.md` §1 and §4.5 describe.
#[derive(Debug, Clone)]
pub struct ThresholdDragArbiter {
    threshold: i32,
    origin: Option<(i32, i32)>,
    started: bool,
}

impl ThresholdDragArbiter {
    pub fn new(threshold: i32) -> Self {
        Self { threshold, origin: None, started: false }
    }
}

impl Default for ThresholdDragArbiter {
    /// Matches the common Win32 `SM_CXDRAG`/`SM_CYDRAG` default of 4 pixels.
    fn default() -> Self {
        Self::new(4)
    }
}

impl DragArbiter for ThresholdDragArbiter {
    fn set_candidate(&mut self, origin: (i32, i32), _extra: DragExtra) {
        self.origin = Some(origin);
        self.started = false;
    }

    fn consider_move(&mut self, pointer: (i32, i32)) -> ArbiterVerdict {
        let Some((ox, oy)) = self.origin else {
            return ArbiterVerdict::Cancelled;
        };
        if self.started {
            return ArbiterVerdict::Started;
        }
        if (pointer.0 - ox).abs() > self.threshold || (pointer.1 - oy).abs() > self.threshold {
            self.started = true;
            ArbiterVerdict::Started
        } else {
            ArbiterVerdict::StillConsidering
        }
    }

    fn cancel(&mut self) {
        self.origin = None;
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_considering_within_threshold() {
        let mut a = ThresholdDragArbiter::new(4);
        a.set_candidate((10, 10), DragExtra::Marquee(MarqueeOp::Set));
        assert_eq!(a.consider_move((12, 11)), ArbiterVerdict::StillConsidering);
    }

    #[test]
    fn started_past_threshold_and_sticky() {
        let mut a = ThresholdDragArbiter::new(4);
        a.set_candidate((10, 10), DragExtra::Marquee(MarqueeOp::Set));
        assert_eq!(a.consider_move((20, 10)), ArbiterVerdict::Started);
        // Once started, stays started even if the pointer returns close.
        assert_eq!(a.consider_move((10, 10)), ArbiterVerdict::Started);
    }

    #[test]
    fn cancel_resets_candidate() {
        let mut a = ThresholdDragArbiter::new(4);
        a.set_candidate((10, 10), DragExtra::Resize { original_size: 64 });
        a.cancel();
        assert_eq!(a.consider_move((999, 999)), ArbiterVerdict::Cancelled);
    }

    #[test]
    fn marquee_rect_normalizes_corners() {
        let drag = MarqueeDrag {
            origin: (2, 2),
            current: (1, 1),
            op: MarqueeOp::Set,
            button: MouseButton::Left,
            double: false,
        };
        assert_eq!(drag.rect(), Rect16::new(1, 1, 3, 3));
    }
}
