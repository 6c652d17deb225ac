//! The paint pipeline (`spec.md` §4.6): one pass over a dirty rectangle,
//! composing header cells, grid lines, ordinary cells, and the
//! marquee/focus overlay onto a [`PaintSurface`].
use crate::host::{HostNotifier, PixelRect};
use crate::table::{Cell, CellFieldMask, CellFlags, CellText};

use super::paint::{resolve_halign, resolve_valign, Color, CustomDrawEvent, Edge, PaintSurface, ThemeElement};
use super::{DispInfoReply, GridStyle, GridView};

/// Resolved, paint-ready cell content: the effective text (stored,
/// callback-supplied, or owner-data-supplied) and flags, per `spec.md`
/// §4.6's "resolve effective cell data" step.
struct ResolvedCell {
    text: String,
    flags: CellFlags,
}

impl GridView {
    /// Run the `spec.md` §4.6 paint pipeline for `dirty` (in client pixel
    /// coordinates).
    pub fn paint(&self, surface: &mut dyn PaintSurface, host: &mut dyn HostNotifier, dirty: PixelRect) {
        if host.custom_draw(CustomDrawEvent::PrePaint).skip_default {
            return;
        }

        let (col0, col1, row0, row1, header_w, header_h, col_header_present, row_header_present, has_focus_style) = {
            let state = self.inner.borrow();
            let col_count = state.col_count();
            let row_count = state.row_count();
            let header_w = state.header_width();
            let header_h = state.header_height();
            // A dirty rect's left/top edge at or before the header band
            // (the common case: a full-client repaint starts at 0) must
            // still scan from the first scrolled-in line, not come up
            // empty -- only the *end* index falls back to the line count.
            let col0 = state
                .geometry
                .line_at(dirty.x.max(header_w as i32) as i64, header_w, col_count, |c| state.geometry.col_width(c))
                .unwrap_or(0);
            let col1 = state
                .geometry
                .line_at((dirty.x + dirty.w) as i64 - 1, header_w, col_count, |c| state.geometry.col_width(c))
                .map(|c| c + 1)
                .unwrap_or(col_count);
            let row0 = state
                .geometry
                .line_at(dirty.y.max(header_h as i32) as i64, header_h, row_count, |r| state.geometry.row_height(r))
                .unwrap_or(0);
            let row1 = state
                .geometry
                .line_at((dirty.y + dirty.h) as i64 - 1, header_h, row_count, |r| state.geometry.row_height(r))
                .map(|r| r + 1)
                .unwrap_or(row_count);
            (
                col0,
                col1,
                row0,
                row1,
                header_w,
                header_h,
                state.col_header_present(),
                state.row_header_present(),
                state.style.contains(GridStyle::FOCUSED_CELL),
            )
        };

        self.update_cache_hint(col0, row0, col1, row1, host);

        surface.clip_push(dirty);

        if header_w > 0 && header_h > 0 {
            let rect = PixelRect { x: 0, y: 0, w: header_w as i32, h: header_h as i32 };
            self.paint_dead_corner(surface, rect);
        }
        if col_header_present {
            for col in col0..col1 {
                self.paint_header_cell(surface, super::style::LineAxis::Col, col, header_w, header_h);
            }
        }
        if row_header_present {
            for row in row0..row1 {
                self.paint_header_cell(surface, super::style::LineAxis::Row, row, header_w, header_h);
            }
        }

        if !self.inner.borrow().style.contains(GridStyle::NO_GRID_LINES) {
            self.paint_grid_lines(surface, col0, col1, row0, row1);
        }

        for row in row0..row1 {
            for col in col0..col1 {
                self.paint_ordinary_cell(surface, host, col, row);
            }
        }

        let marquee_rect = self.inner.borrow().input.marquee().map(|m| m.rect());
        if let Some(rect) = marquee_rect {
            let px = {
                let state = self.inner.borrow();
                self.rect16_to_pixels_locked(&state, rect)
            };
            surface.draw_focus_rect(px);
        } else if has_focus_style {
            let has_focus_outline = self.inner.borrow().focus.is_some();
            if has_focus_outline {
                let (col, row) = self.inner.borrow().focus.unwrap();
                let rect = self.cell_rect(col, row);
                surface.draw_focus_rect(rect);
                surface.draw_focus_rect(inset(rect, 1));
            }
        }

        surface.clip_pop();
        host.custom_draw(CustomDrawEvent::PostPaint);
    }

    fn update_cache_hint(&self, col0: u32, row0: u32, col1: u32, row1: u32, host: &mut dyn HostNotifier) {
        let is_virtual = self.inner.borrow().style.contains(GridStyle::OWNER_DATA);
        if !is_virtual {
            return;
        }
        let hint = (col0, row0, col1, row1);
        let changed = {
            let mut state = self.inner.borrow_mut();
            if state.cache_hint == Some(hint) {
                false
            } else {
                state.cache_hint = Some(hint);
                true
            }
        };
        if changed {
            host.cache_hint(col0, row0, col1, row1);
        }
    }

    fn paint_dead_corner(&self, surface: &mut dyn PaintSurface, rect: PixelRect) {
        if !surface.draw_themed_background(rect, ThemeElement::HeaderItem) {
            surface.draw_edge(rect, Edge::RaisedInner);
        }
    }

    fn paint_header_cell(
        &self,
        surface: &mut dyn PaintSurface,
        axis: super::style::LineAxis,
        index: u32,
        header_w: i64,
        header_h: i64,
    ) {
        let rect = {
            let state = self.inner.borrow();
            match axis {
                super::style::LineAxis::Col => {
                    let x = state.geometry.col_x(index, state.scroll_x.scroll, header_w);
                    PixelRect { x: x as i32, y: 0, w: state.geometry.col_width(index) as i32, h: header_h as i32 }
                }
                super::style::LineAxis::Row => {
                    let y = state.geometry.row_y(index, state.scroll_y.scroll, header_h);
                    PixelRect { x: 0, y: y as i32, w: header_w as i32, h: state.geometry.row_height(index) as i32 }
                }
            }
        };
        let line_ty = match axis {
            super::style::LineAxis::Col => crate::host::LineTy::Col,
            super::style::LineAxis::Row => crate::host::LineTy::Row,
        };
        let text = self.header_text(line_ty, index);

        surface.clip_push(rect);
        if !surface.draw_themed_background(rect, ThemeElement::HeaderItem) {
            surface.draw_edge(rect, Edge::RaisedInner);
        }
        if !surface.draw_themed_text(
            rect,
            ThemeElement::HeaderItem,
            &text,
            resolve_halign(crate::table::HAlign::Default, true),
            resolve_valign(crate::table::VAlign::Default, true),
        ) {
            surface.draw_text(
                rect,
                &text,
                Color(0x00000000),
                resolve_halign(crate::table::HAlign::Default, true),
                resolve_valign(crate::table::VAlign::Default, true),
            );
        }
        surface.clip_pop();
    }

    fn paint_grid_lines(&self, surface: &mut dyn PaintSurface, col0: u32, col1: u32, row0: u32, row1: u32) {
        let state = self.inner.borrow();
        let header_w = state.header_width();
        let header_h = state.header_height();
        let client_w = state.client_size.0 as i32;
        let client_h = state.client_size.1 as i32;
        let face = Color(0x00808080);
        for col in col0..=col1 {
            let x = state.geometry.col_x(col, state.scroll_x.scroll, header_w) as i32;
            surface.draw_line((x, header_h as i32), (x, client_h), face);
        }
        for row in row0..=row1 {
            let y = state.geometry.row_y(row, state.scroll_y.scroll, header_h) as i32;
            surface.draw_line((header_w as i32, y), (client_w, y), face);
        }
        if header_h > 0 {
            surface.draw_line((0, header_h as i32), (client_w, header_h as i32), face);
        }
        if header_w > 0 {
            surface.draw_line((header_w as i32, 0), (header_w as i32, client_h), face);
        }
    }

    fn paint_ordinary_cell(&self, surface: &mut dyn PaintSurface, host: &mut dyn HostNotifier, col: u32, row: u32) {
        let rect = self.cell_rect(col, row);
        let resolved = self.resolve_cell_for_paint(host, col, row);
        let selected = self.inner.borrow().selection.region().contains_xy(col as u16, row as u16)
            || self
                .inner
                .borrow()
                .input
                .marquee()
                .map(|m| m.rect().contains_xy(col as u16, row as u16))
                .unwrap_or(false);

        let cell_for_event = Cell { text: CellText::Owned(resolved.text.clone()), param: 0, flags: resolved.flags };
        let reply = host.custom_draw(CustomDrawEvent::ItemPrePaint { col, row, cell: &cell_for_event });
        if reply.skip_default {
            host.custom_draw(CustomDrawEvent::ItemPostPaint { col, row });
            return;
        }

        surface.clip_push(rect);
        let back = reply
            .override_back_color
            .map(Color)
            .unwrap_or(if selected { Color(0x003399FF) } else { Color(0x00FFFFFF) });
        if !surface.draw_themed_background(rect, ThemeElement::ListItem) {
            surface.fill_rect(rect, back);
        }
        let text_color = reply.override_text_color.map(Color).unwrap_or(Color(0x00000000));
        let halign = resolve_halign(resolved.flags.halign_enum(), false);
        let valign = resolve_valign(resolved.flags.valign_enum(), false);
        surface.draw_text(rect, &resolved.text, text_color, halign, valign);
        surface.clip_pop();

        host.custom_draw(CustomDrawEvent::ItemPostPaint { col, row });
    }

    /// Resolve a cell's effective text/flags for painting: the stored
    /// cell, unless its text is `Callback` or the grid is owner-data, in
    /// which case `GetDispInfo` supplies the masked fields (`spec.md`
    /// §4.6).
    fn resolve_cell_for_paint(&self, host: &mut dyn HostNotifier, col: u32, row: u32) -> ResolvedCell {
        let is_virtual = self.inner.borrow().style.contains(GridStyle::OWNER_DATA);
        if is_virtual {
            let reply = host.get_disp_info(col, row, CellFieldMask::ALL);
            return resolved_from_disp_info(reply);
        }
        match self.get_cell(col, row, CellFieldMask::ALL) {
            Ok(view) => match view.text {
                CellText::Callback => {
                    let reply = host.get_disp_info(col, row, CellFieldMask::TEXT | CellFieldMask::FLAGS);
                    ResolvedCell { text: reply.text.unwrap_or_default(), flags: reply.flags.unwrap_or(view.flags) }
                }
                CellText::Owned(s) => ResolvedCell { text: s, flags: view.flags },
                CellText::None => ResolvedCell { text: String::new(), flags: view.flags },
            },
            Err(_) => ResolvedCell { text: String::new(), flags: CellFlags::empty() },
        }
    }
}

fn resolved_from_disp_info(reply: DispInfoReply) -> ResolvedCell {
    ResolvedCell { text: reply.text.unwrap_or_default(), flags: reply.flags.unwrap_or_default() }
}

fn inset(r: PixelRect, by: i32) -> PixelRect {
    use cggeom::prelude::*;
    let b: cggeom::Box2<i32> = r.into();
    cggeom::Box2::new(b.min + cgmath::Vector2::new(by, by), b.max - cgmath::Vector2::new(by, by)).into()
}

trait CellFlagsExt {
    fn halign_enum(self) -> crate::table::HAlign;
    fn valign_enum(self) -> crate::table::VAlign;
}

impl CellFlagsExt for CellFlags {
    fn halign_enum(self) -> crate::table::HAlign {
        self.halign()
    }
    fn valign_enum(self) -> crate::table::VAlign {
        self.valign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridStyle, GridView};
    use crate::host::{HostNotifier, PixelRect};

    struct RecordingSurface {
        fills: usize,
        texts: Vec<String>,
        lines: usize,
    }
    impl PaintSurface for RecordingSurface {
        fn clip_push(&mut self, _rect: PixelRect) {}
        fn clip_pop(&mut self) {}
        fn fill_rect(&mut self, _rect: PixelRect, _color: Color) {
            self.fills += 1;
        }
        fn draw_edge(&mut self, _rect: PixelRect, _edge: Edge) {}
        fn draw_themed_background(&mut self, _rect: PixelRect, _element: ThemeElement) -> bool {
            false
        }
        fn draw_themed_text(&mut self, _r: PixelRect, _e: ThemeElement, _t: &str, _h: crate::table::HAlign, _v: crate::table::VAlign) -> bool {
            false
        }
        fn draw_text(&mut self, _rect: PixelRect, text: &str, _color: Color, _h: crate::table::HAlign, _v: crate::table::VAlign) {
            self.texts.push(text.to_string());
        }
        fn draw_line(&mut self, _from: (i32, i32), _to: (i32, i32), _color: Color) {
            self.lines += 1;
        }
        fn draw_focus_rect(&mut self, _rect: PixelRect) {}
    }

    #[derive(Default)]
    struct NullHost;
    impl HostNotifier for NullHost {}

    #[test]
    fn paints_every_visible_cell() {
        let g = GridView::new(GridStyle::AUTO_TABLE);
        g.resize(3, 3).unwrap();
        g.set_client_size(300, 300);
        let mut surface = RecordingSurface { fills: 0, texts: Vec::new(), lines: 0 };
        let mut host = NullHost;
        g.paint(&mut surface, &mut host, PixelRect { x: 0, y: 0, w: 300, h: 300 });
        assert_eq!(surface.texts.len(), 9);
    }

    #[test]
    fn virtual_mode_paints_via_disp_info() {
        struct DispHost;
        impl HostNotifier for DispHost {
            fn get_disp_info(&mut self, col: u32, row: u32, _mask: CellFieldMask) -> DispInfoReply {
                DispInfoReply { text: Some(format!("{col},{row}")), param: None, flags: None }
            }
        }
        let g = GridView::new(GridStyle::OWNER_DATA);
        g.resize(2, 2).unwrap();
        g.set_client_size(200, 200);
        let mut surface = RecordingSurface { fills: 0, texts: Vec::new(), lines: 0 };
        let mut host = DispHost;
        g.paint(&mut surface, &mut host, PixelRect { x: 0, y: 0, w: 200, h: 200 });
        assert!(surface.texts.contains(&"0,0".to_string()));
    }
}
