//! The grid's configuration surface (`spec.md` §6): style bits, selection
//! mode, and header generation modes.
use bitflags::bitflags;

bitflags! {
    /// Style bits controlling grid behavior, grounded on `tcw3`'s
    /// `TableFlags`/`ViewFlags` bitflags blocks.
    #[derive(Default)]
    pub struct GridStyle: u32 {
        /// Create an empty table automatically on construction.
        const AUTO_TABLE        = 1;
        /// Omit grid line drawing in the paint pipeline.
        const NO_GRID_LINES     = 1 << 1;
        /// Force offscreen composition of non-marquee paint.
        const DOUBLE_BUFFER     = 1 << 2;
        /// The attached table is owner-data (virtual mode); see `spec.md` §4.8.
        const OWNER_DATA        = 1 << 3;
        /// Columns may be resized by dragging a header divider.
        const RESIZABLE_COLS    = 1 << 4;
        /// Rows may be resized by dragging a header divider.
        const RESIZABLE_ROWS    = 1 << 5;
        /// A focused cell exists and receives keyboard navigation.
        const FOCUSED_CELL      = 1 << 6;
        /// Label editing (`spec.md` §4.7) is permitted.
        const EDIT_LABELS       = 1 << 7;
        /// Paint the selection even when the grid does not have focus.
        const SHOW_SEL_ALWAYS   = 1 << 8;
    }
}

/// The four selection modes from `spec.md` §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    None,
    Single,
    Rect,
    Complex,
}

/// Which axis a header-painting helper is drawing for; kept distinct from
/// [`crate::host::LineTy`] since the latter is part of the host-facing
/// notification surface and this one is purely an internal dispatch tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    Col,
    Row,
}

/// How a grid generates column/row header text (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Use the text stored in the table's header cells.
    Stored,
    /// Generate `0, 1, 2, ...`, the line's plain 0-based index.
    Numeric,
    /// Generate `A, B, ..., Z, AA, AB, ...`.
    Alphabetic,
    /// No header line at all; its width/height collapses to zero.
    None,
}

impl HeaderMode {
    pub fn is_none(self) -> bool {
        matches!(self, HeaderMode::None)
    }
}

/// Render a 1-based line number as a base-26 `A, B, ..., Z, AA, AB, ...`
/// label, per `spec.md` §6: "computed by repeated modulo-26 with the
/// digit-set `A..Z` and 1-based input."
pub fn alphabetic_label(one_based_index: u64) -> String {
    let mut n = one_based_index;
    let mut digits = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        digits.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabetic_sequence() {
        assert_eq!(alphabetic_label(1), "A");
        assert_eq!(alphabetic_label(26), "Z");
        assert_eq!(alphabetic_label(27), "AA");
        assert_eq!(alphabetic_label(28), "AB");
        assert_eq!(alphabetic_label(52), "AZ");
        assert_eq!(alphabetic_label(53), "BA");
        assert_eq!(alphabetic_label(702), "ZZ");
        assert_eq!(alphabetic_label(703), "AAA");
    }
}
