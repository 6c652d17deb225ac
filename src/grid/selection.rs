//! Selection state and the install protocol (`spec.md` §4.4).
use crate::error::{GridError, Result};
use crate::host::{HostNotifier, Notification, Veto};
use crate::region::{Rect16, Region};

use super::style::SelectionMode;

/// The selection region plus its anchor (`selmark`), the far corner used by
/// shift-extended selections (`spec.md` §4.4).
#[derive(Debug, Clone)]
pub struct Selection {
    current: Region,
    anchor: Option<(u32, u32)>,
}

impl Default for Selection {
    fn default() -> Self {
        Self { current: Region::Empty, anchor: None }
    }
}

/// `true` iff `region` is a legal selection under `mode`.
pub fn mode_allows(mode: SelectionMode, region: &Region) -> bool {
    match mode {
        SelectionMode::None => region.is_empty(),
        SelectionMode::Single => {
            region.is_empty()
                || (region.rect_count() == 1 && {
                    let r = region.rects().next().unwrap();
                    r.x1 - r.x0 == 1 && r.y1 - r.y0 == 1
                })
        }
        SelectionMode::Rect => region.is_empty() || region.rect_count() == 1,
        SelectionMode::Complex => true,
    }
}

impl Selection {
    pub fn region(&self) -> &Region {
        &self.current
    }

    pub fn anchor(&self) -> Option<(u32, u32)> {
        self.anchor
    }

    pub fn set_anchor(&mut self, cell: (u32, u32)) {
        self.anchor = Some(cell);
    }

    /// Publish a new selection, running the install protocol from
    /// `spec.md` §4.4:
    /// 1. no-op if unchanged,
    /// 2. `SelectionChanging` veto check,
    /// 3. swap in the new region,
    /// 4. the caller invalidates the union of the two regions' extents,
    /// 5. `SelectionChanged`.
    ///
    /// Returns the union of the old and new extents for the caller to
    /// invalidate, or `Err(Cancelled)` if the host vetoed the change (in
    /// which case no state was modified).
    pub fn install(
        &mut self,
        new: Region,
        mode: SelectionMode,
        host: &mut dyn HostNotifier,
    ) -> Result<Option<Rect16>> {
        if !mode_allows(mode, &new) {
            return Err(GridError::InvalidArgument);
        }
        if new.region_eq(&self.current) {
            return Ok(None);
        }
        if host.selection_changing().is_denied() {
            return Err(GridError::Cancelled);
        }
        let old_extents = self.current.extents();
        let new_extents = new.extents();
        self.current = new;
        host.notify(Notification::SelectionChanged);

        Ok(Some(union_extents(old_extents, new_extents)))
    }
}

fn union_extents(a: Option<Rect16>, b: Option<Rect16>) -> Rect16 {
    match (a, b) {
        (None, None) => Rect16 { x0: 0, y0: 0, x1: 0, y1: 0 },
        (Some(r), None) | (None, Some(r)) => r,
        (Some(a), Some(b)) => Rect16 {
            x0: a.x0.min(b.x0),
            y0: a.y0.min(b.y0),
            x1: a.x1.max(b.x1),
            y1: a.y1.max(b.y1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Rect16;

    struct CountingHost {
        changed: u32,
        veto: bool,
    }
    impl HostNotifier for CountingHost {
        fn notify(&mut self, event: Notification<'_>) {
            if matches!(event, Notification::SelectionChanged) {
                self.changed += 1;
            }
        }
        fn selection_changing(&mut self) -> Veto {
            if self.veto {
                Veto::Deny
            } else {
                Veto::Allow
            }
        }
    }

    #[test]
    fn no_op_when_unchanged() {
        let mut sel = Selection::default();
        let mut host = CountingHost { changed: 0, veto: false };
        sel.install(Region::Empty, SelectionMode::Complex, &mut host).unwrap();
        assert_eq!(host.changed, 0);
    }

    #[test]
    fn veto_leaves_state_untouched() {
        let mut sel = Selection::default();
        let mut host = CountingHost { changed: 0, veto: true };
        let r = Region::from_rect(Rect16::new(0, 0, 2, 2));
        let err = sel.install(r, SelectionMode::Complex, &mut host).unwrap_err();
        assert_eq!(err, GridError::Cancelled);
        assert!(sel.region().is_empty());
        assert_eq!(host.changed, 0);
    }

    #[test]
    fn mode_enforcement_rejects_illegal_shapes() {
        let mut sel = Selection::default();
        let mut host = CountingHost { changed: 0, veto: false };
        let two_rects = Region::from_canonical_body(vec![
            Rect16::new(0, 0, 1, 1),
            Rect16::new(5, 5, 6, 6),
        ]);
        assert_eq!(
            sel.install(two_rects.clone(), SelectionMode::Single, &mut host).unwrap_err(),
            GridError::InvalidArgument
        );
        assert_eq!(
            sel.install(two_rects, SelectionMode::Rect, &mut host).unwrap_err(),
            GridError::InvalidArgument
        );
    }

    #[test]
    fn install_fires_exactly_once_and_returns_union_extents() {
        let mut sel = Selection::default();
        let mut host = CountingHost { changed: 0, veto: false };
        let r = Region::from_rect(Rect16::new(1, 1, 3, 3));
        let dirty = sel.install(r, SelectionMode::Complex, &mut host).unwrap().unwrap();
        assert_eq!(dirty, Rect16::new(1, 1, 3, 3));
        assert_eq!(host.changed, 1);
    }
}
