//! The paint-surface collaborator (`spec.md` §6) and the small stateless
//! helpers the per-cell paint step (`spec.md` §4.6) resolves against: theme
//! element selection and alignment defaulting.
use crate::host::PixelRect;
use crate::table::{Cell, HAlign, VAlign};

/// An RGB(A) color as a packed `0xAARRGGBB` word. The engine never
/// interprets the bits itself; it only forwards colors between the host's
/// custom-draw overrides and the paint surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

/// Which themed part a background/text draw call targets, mirroring the
/// Win32 `DrawThemeBackground` part identifiers `spec.md` §4.6 references
/// (`ListItem` for ordinary cells, `HeaderItem` for column/row headers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeElement {
    ListItem,
    HeaderItem,
}

/// The non-themed header fallback: a raised inner edge (`spec.md` §4.6,
/// "else a raised-inner edge").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    RaisedInner,
}

/// The abstract drawing surface the paint pipeline composes onto
/// (`spec.md` §1, §6). No concrete backend (GDI, Direct2D, ...) is
/// implemented; hosts provide one.
pub trait PaintSurface {
    fn clip_push(&mut self, rect: PixelRect);
    fn clip_pop(&mut self);
    fn fill_rect(&mut self, rect: PixelRect, color: Color);
    fn draw_edge(&mut self, rect: PixelRect, edge: Edge);
    /// Attempt a themed background fill; `false` means the current host has
    /// no theme available and the caller should fall back to
    /// [`PaintSurface::fill_rect`] / [`PaintSurface::draw_edge`].
    fn draw_themed_background(&mut self, rect: PixelRect, element: ThemeElement) -> bool;
    fn draw_themed_text(
        &mut self,
        rect: PixelRect,
        element: ThemeElement,
        text: &str,
        halign: HAlign,
        valign: VAlign,
    ) -> bool;
    fn draw_text(&mut self, rect: PixelRect, text: &str, color: Color, halign: HAlign, valign: VAlign);
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color);
    fn draw_focus_rect(&mut self, rect: PixelRect);
}

/// The custom-draw notification stages from `spec.md` §4.6: a full-pass
/// `Pre`/`PostPaint` bracketing the whole dirty rectangle, and a per-cell
/// `ItemPre`/`ItemPostPaint` bracketing each cell draw.
#[derive(Debug, Clone)]
pub enum CustomDrawEvent<'a> {
    PrePaint,
    PostPaint,
    ItemPrePaint { col: u32, row: u32, cell: &'a Cell },
    ItemPostPaint { col: u32, row: u32 },
}

/// Resolve a cell's horizontal alignment flag to a concrete side, applying
/// `spec.md` §4.6's per-kind default ("header cells default to `Center`";
/// ordinary cells leave `Default` to the view, which renders as `Left`).
pub fn resolve_halign(flag: HAlign, is_header: bool) -> HAlign {
    match flag {
        HAlign::Default => {
            if is_header {
                HAlign::Center
            } else {
                HAlign::Left
            }
        }
        other => other,
    }
}

/// Resolve a cell's vertical alignment flag, applying `spec.md` §4.6's
/// per-kind default ("header cells default to `VCenter`"; ordinary cells
/// default to `Top`).
pub fn resolve_valign(flag: VAlign, is_header: bool) -> VAlign {
    match flag {
        VAlign::Default => {
            if is_header {
                VAlign::Center
            } else {
                VAlign::Top
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_defaults_center() {
        assert_eq!(resolve_halign(HAlign::Default, true), HAlign::Center);
        assert_eq!(resolve_valign(VAlign::Default, true), VAlign::Center);
    }

    #[test]
    fn ordinary_defaults_left_top() {
        assert_eq!(resolve_halign(HAlign::Default, false), HAlign::Left);
        assert_eq!(resolve_valign(VAlign::Default, false), VAlign::Top);
    }

    #[test]
    fn explicit_alignment_passes_through() {
        assert_eq!(resolve_halign(HAlign::Right, false), HAlign::Right);
        assert_eq!(resolve_valign(VAlign::Bottom, true), VAlign::Bottom);
    }
}
