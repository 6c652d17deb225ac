//! Label-edit lifecycle (`spec.md` §4.7) and the process-wide edit-owner
//! slot (`spec.md` §9's "Global state" design note, realized as the
//! `static EDIT_OWNER: Mutex<Option<EditOwner>>` described in
//! `SPEC_FULL.md` §4.7).
use std::sync::Mutex;

use crate::host::PixelRect;

/// The embedded text-edit-control collaborator from `spec.md` §6. The grid
/// positions it over a cell rectangle, seeds it with the cell's current
/// text fully selected, and later asks it for the committed text.
pub trait EditControl {
    fn create(&mut self, rect: PixelRect, initial_text: &str);
    fn set_selection_all(&mut self);
    fn show(&mut self);
    fn get_text(&self) -> String;
    fn destroy(&mut self);
}

/// The result an [`EndLabelEdit`](crate::host::Notification::EndLabelEdit)
/// notification carries: the spec's "`cell_with_new_text_or_null`" modeled
/// as a two-armed enum instead of an optional pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelEditOutcome {
    Committed { text: String },
    Cancelled,
}

/// Why an active label edit ended, used to decide whether to write the new
/// text through to the table (`spec.md` §4.7 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEndReason {
    CommitEnter,
    CommitKillFocus,
    CancelEscape,
    /// One of the implicit-commit triggers in `spec.md` §4.7 step 6
    /// (resize, scroll, selection/focus/table/style/geometry change).
    CommitImplicit,
    CancelImplicit,
}

impl EditEndReason {
    pub fn commits(self) -> bool {
        matches!(self, EditEndReason::CommitEnter | EditEndReason::CommitKillFocus | EditEndReason::CommitImplicit)
    }
}

/// An in-progress label edit: which cell is being edited, its text before
/// editing started (restored on cancel; also the value compared against on
/// commit to decide whether a write is even necessary), and the owner id
/// registered in the global edit-owner slot.
pub struct EditSession {
    pub col: u32,
    pub row: u32,
    pub original_text: String,
    owner_id: u64,
    control: Box<dyn EditControl>,
}

impl EditSession {
    pub fn new(col: u32, row: u32, original_text: String, owner_id: u64, control: Box<dyn EditControl>) -> Self {
        Self { col, row, original_text, owner_id, control }
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    pub fn control_mut(&mut self) -> &mut dyn EditControl {
        self.control.as_mut()
    }
}

/// The process-wide edit-owner slot from `spec.md` §4.7/§9: "the current
/// edit owner is guarded by a single module-level mutex; starting a new
/// edit while one is active closes the previous one first." Contention is
/// limited to `start`/`end`/`current`, per `spec.md` §5.
static EDIT_OWNER: Mutex<Option<u64>> = Mutex::new(None);

/// Register `owner_id` as the current edit owner, returning the previous
/// owner (if any) so the caller can tear it down first -- the "starting a
/// new edit while one is active closes the previous one first" rule is
/// enforced by the grid calling this *before* creating its own edit
/// control, then tearing down whatever owner this returns.
pub fn claim_owner(owner_id: u64) -> Option<u64> {
    let mut slot = EDIT_OWNER.lock().unwrap();
    slot.replace(owner_id)
}

/// Release ownership, but only if `owner_id` still holds it (a stale
/// release from an already-superseded session is a no-op).
pub fn release_owner(owner_id: u64) {
    let mut slot = EDIT_OWNER.lock().unwrap();
    if *slot == Some(owner_id) {
        *slot = None;
    }
}

pub fn current_owner() -> Option<u64> {
    *EDIT_OWNER.lock().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_returns_previous_owner() {
        release_owner(999); // make sure we start from a clean slot in this test
        assert_eq!(claim_owner(1), None);
        assert_eq!(claim_owner(2), Some(1));
        assert_eq!(current_owner(), Some(2));
        release_owner(2);
        assert_eq!(current_owner(), None);
    }

    #[test]
    fn release_ignores_stale_owner() {
        claim_owner(10);
        release_owner(11); // not the current owner; must not clear it
        assert_eq!(current_owner(), Some(10));
        release_owner(10);
    }

    #[test]
    fn commits_classifies_reasons() {
        assert!(EditEndReason::CommitEnter.commits());
        assert!(EditEndReason::CommitKillFocus.commits());
        assert!(EditEndReason::CommitImplicit.commits());
        assert!(!EditEndReason::CancelEscape.commits());
        assert!(!EditEndReason::CancelImplicit.commits());
    }
}
