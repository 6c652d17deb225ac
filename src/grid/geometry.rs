//! Grid geometry: column widths, row heights, and pixel coordinate mapping
//! (`spec.md` §4.3).
use bitflags::bitflags;

/// Sentinel stored in a per-line size array meaning "use the default for
/// this axis" (`spec.md` §4.3).
pub const DEFAULT_SIZE: u16 = 0xFFFF;

/// The lazy per-column/per-row size array: absent until any non-default
/// size is set, at which point every entry starts out as [`DEFAULT_SIZE`].
#[derive(Debug, Clone)]
struct LineSizes {
    sizes: Option<Vec<u16>>,
    default: u16,
}

impl LineSizes {
    fn new(default: u16) -> Self {
        Self { sizes: None, default }
    }

    fn get(&self, index: usize) -> u16 {
        match &self.sizes {
            Some(v) => {
                let raw = v[index];
                if raw == DEFAULT_SIZE {
                    self.default
                } else {
                    raw
                }
            }
            None => self.default,
        }
    }

    fn set(&mut self, index: usize, len: usize, value: Option<u16>) {
        match value {
            None => {
                if let Some(v) = &mut self.sizes {
                    v[index] = DEFAULT_SIZE;
                }
            }
            Some(raw) => {
                let v = self.sizes.get_or_insert_with(|| vec![DEFAULT_SIZE; len]);
                v[index] = raw;
            }
        }
    }

    fn resize(&mut self, new_len: usize) {
        if let Some(v) = &mut self.sizes {
            v.resize(new_len, DEFAULT_SIZE);
        }
    }

    fn set_default(&mut self, default: u16) {
        self.default = default;
    }

    fn sum_prefix(&self, upto: usize) -> i64 {
        match &self.sizes {
            Some(v) => v[..upto]
                .iter()
                .map(|&raw| if raw == DEFAULT_SIZE { self.default as i64 } else { raw as i64 })
                .sum(),
            None => self.default as i64 * upto as i64,
        }
    }

    fn sum_all(&self, len: usize) -> i64 {
        self.sum_prefix(len)
    }
}

bitflags! {
    /// Selects which fields of a [`GeometryConfig`] update applies.
    pub struct GeometryConfigMask: u8 {
        const COLUMN_HEADER_HEIGHT = 1;
        const ROW_HEADER_WIDTH     = 1 << 1;
        const DEF_COLUMN_WIDTH     = 1 << 2;
        const DEF_ROW_HEIGHT       = 1 << 3;
        const PADDING_HORZ         = 1 << 4;
        const PADDING_VERT         = 1 << 5;
    }
}

/// A partial geometry update; only the fields selected by `mask` are
/// applied by [`Geometry::configure`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryConfig {
    pub mask: GeometryConfigMask,
    pub column_header_height: u16,
    pub row_header_width: u16,
    pub def_column_width: u16,
    pub def_row_height: u16,
    pub padding_horz: u16,
    pub padding_vert: u16,
}

impl Default for GeometryConfigMask {
    fn default() -> Self {
        GeometryConfigMask::empty()
    }
}

/// The grid's geometry state: header sizes, default and per-line sizes,
/// and padding.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub header_width: u16,
    pub header_height: u16,
    pub padding_horz: u16,
    pub padding_vert: u16,
    col_sizes: LineSizes,
    row_sizes: LineSizes,
}

impl Geometry {
    pub fn new() -> Self {
        let mut g = Self {
            header_width: 0,
            header_height: 0,
            padding_horz: 2,
            padding_vert: 1,
            col_sizes: LineSizes::new(64),
            row_sizes: LineSizes::new(20),
        };
        g.reset_to_defaults((64, 20));
        g
    }

    pub fn configure(&mut self, cfg: &GeometryConfig) {
        if cfg.mask.contains(GeometryConfigMask::COLUMN_HEADER_HEIGHT) {
            self.header_height = cfg.column_header_height;
        }
        if cfg.mask.contains(GeometryConfigMask::ROW_HEADER_WIDTH) {
            self.header_width = cfg.row_header_width;
        }
        if cfg.mask.contains(GeometryConfigMask::DEF_COLUMN_WIDTH) {
            self.col_sizes.set_default(cfg.def_column_width);
        }
        if cfg.mask.contains(GeometryConfigMask::DEF_ROW_HEIGHT) {
            self.row_sizes.set_default(cfg.def_row_height);
        }
        if cfg.mask.contains(GeometryConfigMask::PADDING_HORZ) {
            self.padding_horz = cfg.padding_horz;
        }
        if cfg.mask.contains(GeometryConfigMask::PADDING_VERT) {
            self.padding_vert = cfg.padding_vert;
        }
    }

    /// Reset every geometry field to the defaults derived from the current
    /// font's cell size and a `(2, 1)` pixel padding, per `spec.md` §4.3.
    pub fn reset_to_defaults(&mut self, font_cell_size: (u16, u16)) {
        self.col_sizes.set_default(font_cell_size.0);
        self.row_sizes.set_default(font_cell_size.1);
        self.header_height = font_cell_size.1;
        self.header_width = font_cell_size.0;
        self.padding_horz = 2;
        self.padding_vert = 1;
    }

    pub fn col_width(&self, col: u32) -> u16 {
        self.col_sizes.get(col as usize)
    }

    pub fn row_height(&self, row: u32) -> u16 {
        self.row_sizes.get(row as usize)
    }

    pub fn set_col_width(&mut self, col: u32, col_count: u32, width: Option<u16>) {
        self.col_sizes.set(col as usize, col_count as usize, width);
    }

    pub fn set_row_height(&mut self, row: u32, row_count: u32, height: Option<u16>) {
        self.row_sizes.set(row as usize, row_count as usize, height);
    }

    pub fn resize_cols(&mut self, new_col_count: u32) {
        self.col_sizes.resize(new_col_count as usize);
    }

    pub fn resize_rows(&mut self, new_row_count: u32) {
        self.row_sizes.resize(new_row_count as usize);
    }

    /// Header width collapsed to zero when the column-header mode is
    /// `HeaderMode::None`.
    pub fn effective_header_width(&self, row_header_present: bool) -> i64 {
        if row_header_present {
            self.header_width as i64
        } else {
            0
        }
    }

    pub fn effective_header_height(&self, col_header_present: bool) -> i64 {
        if col_header_present {
            self.header_height as i64
        } else {
            0
        }
    }

    /// `col_x(col) = header_width - scroll_x + sum(col_width(i) for i < col)`.
    pub fn col_x(&self, col: u32, scroll_x: i64, header_width: i64) -> i64 {
        header_width - scroll_x + self.col_sizes.sum_prefix(col as usize)
    }

    /// `row_y(row) = header_height - scroll_y + sum(row_height(j) for j < row)`.
    pub fn row_y(&self, row: u32, scroll_y: i64, header_height: i64) -> i64 {
        header_height - scroll_y + self.row_sizes.sum_prefix(row as usize)
    }

    /// Sum of all column widths -- the scrollable content width.
    pub fn total_col_width(&self, col_count: u32) -> i64 {
        self.col_sizes.sum_all(col_count as usize)
    }

    /// Sum of all row heights -- the scrollable content height.
    pub fn total_row_height(&self, row_count: u32) -> i64 {
        self.row_sizes.sum_all(row_count as usize)
    }

    /// Binary-search the first line whose span covers `coord`, used by the
    /// paint pipeline (`spec.md` §4.6 step 3) and hit-testing.
    ///
    /// Returns `None` if `coord` falls past the end of all lines.
    pub fn line_at(&self, coord: i64, base: i64, count: u32, size_of: impl Fn(u32) -> u16) -> Option<u32> {
        if coord < base {
            return None;
        }
        let mut acc = base;
        for i in 0..count {
            let next = acc + size_of(i) as i64;
            if coord < next {
                return Some(i);
            }
            acc = next;
        }
        None
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_widths_until_overridden() {
        let mut g = Geometry::new();
        assert_eq!(g.col_width(0), 64);
        g.set_col_width(2, 5, Some(100));
        assert_eq!(g.col_width(0), 64);
        assert_eq!(g.col_width(2), 100);
        g.set_col_width(2, 5, None);
        assert_eq!(g.col_width(2), 64);
    }

    #[test]
    fn col_x_accumulates_widths() {
        let mut g = Geometry::new();
        g.set_col_width(0, 3, Some(10));
        g.set_col_width(1, 3, Some(20));
        assert_eq!(g.col_x(0, 0, 5), 5);
        assert_eq!(g.col_x(1, 0, 5), 15);
        assert_eq!(g.col_x(2, 0, 5), 35);
        assert_eq!(g.col_x(1, 3, 5), 12);
    }

    #[test]
    fn resize_extends_with_default_sentinel() {
        let mut g = Geometry::new();
        g.set_col_width(0, 2, Some(10));
        g.resize_cols(5);
        assert_eq!(g.col_width(4), 64);
        assert_eq!(g.col_width(0), 10);
    }
}
