//! The three region combinators (`union`, `subtract`, `xor`) and the shared
//! band-sweep they are built on, per `spec.md` §4.2.
use super::{Rect16, Region};
use crate::error::{GridError, Result};

/// One band of a region: a maximal run of rectangles sharing `y0`/`y1`,
/// represented as the shared y-span plus the sorted, non-touching x-spans.
struct Band {
    y0: u16,
    y1: u16,
    spans: Vec<(u16, u16)>,
}

fn bands_of(r: &Region) -> Vec<Band> {
    match r {
        Region::Empty => Vec::new(),
        Region::Simple(rect) => vec![Band {
            y0: rect.y0,
            y1: rect.y1,
            spans: vec![(rect.x0, rect.x1)],
        }],
        Region::Complex(buf) => {
            let body = &buf[1..];
            let mut out = Vec::new();
            let mut i = 0;
            while i < body.len() {
                let (y0, y1) = (body[i].y0, body[i].y1);
                let mut spans = Vec::new();
                while i < body.len() && body[i].y0 == y0 && body[i].y1 == y1 {
                    spans.push((body[i].x0, body[i].x1));
                    i += 1;
                }
                out.push(Band { y0, y1, spans });
            }
            out
        }
    }
}

/// Whether `segment` (a `[y0, y1)` atomic slice) falls fully inside one of
/// `bands`, advancing `cursor` monotonically since both are y-ordered.
fn band_spans_at<'a>(bands: &'a [Band], cursor: &mut usize, y0: u16, y1: u16) -> &'a [(u16, u16)] {
    while *cursor < bands.len() && bands[*cursor].y1 <= y0 {
        *cursor += 1;
    }
    if *cursor < bands.len() && bands[*cursor].y0 <= y0 && bands[*cursor].y1 >= y1 {
        &bands[*cursor].spans
    } else {
        &[]
    }
}

/// Combine two sorted, non-overlapping, non-touching x-span lists into one
/// such list, including only the portions where `keep(in_a, in_b)` holds,
/// then coalesce touching output spans.
fn combine_spans(a: &[(u16, u16)], b: &[(u16, u16)], keep: impl Fn(bool, bool) -> bool) -> Vec<(u16, u16)> {
    let mut xs: Vec<u16> = Vec::with_capacity(a.len() * 2 + b.len() * 2);
    for &(x0, x1) in a {
        xs.push(x0);
        xs.push(x1);
    }
    for &(x0, x1) in b {
        xs.push(x0);
        xs.push(x1);
    }
    xs.sort_unstable();
    xs.dedup();

    let mut out: Vec<(u16, u16)> = Vec::new();
    let mut ai = 0;
    let mut bi = 0;
    for w in xs.windows(2) {
        let (x0, x1) = (w[0], w[1]);
        while ai < a.len() && a[ai].1 <= x0 {
            ai += 1;
        }
        let in_a = ai < a.len() && a[ai].0 <= x0 && a[ai].1 >= x1;
        while bi < b.len() && b[bi].1 <= x0 {
            bi += 1;
        }
        let in_b = bi < b.len() && b[bi].0 <= x0 && b[bi].1 >= x1;
        if keep(in_a, in_b) {
            if let Some(last) = out.last_mut() {
                if last.1 == x0 {
                    last.1 = x1;
                    continue;
                }
            }
            out.push((x0, x1));
        }
    }
    out
}

/// The shared sweep described in `spec.md` §4.2: walk y-ordered bands of
/// both inputs, combine each atomic y-slice's x-spans with `keep`, and
/// coalesce the result into canonical bands.
fn sweep(a: &Region, b: &Region, keep: impl Fn(bool, bool) -> bool) -> Result<Region> {
    let bands_a = bands_of(a);
    let bands_b = bands_of(b);

    let mut ys: Vec<u16> = Vec::with_capacity(bands_a.len() * 2 + bands_b.len() * 2);
    for band in bands_a.iter().chain(bands_b.iter()) {
        ys.push(band.y0);
        ys.push(band.y1);
    }
    ys.sort_unstable();
    ys.dedup();

    let mut rows: Vec<(u16, u16, Vec<(u16, u16)>)> = Vec::new();
    let mut ca = 0;
    let mut cb = 0;
    for w in ys.windows(2) {
        let (y0, y1) = (w[0], w[1]);
        let spans_a = band_spans_at(&bands_a, &mut ca, y0, y1);
        let spans_b = band_spans_at(&bands_b, &mut cb, y0, y1);
        let spans = combine_spans(spans_a, spans_b, &keep);
        if spans.is_empty() {
            continue;
        }
        if let Some(last) = rows.last_mut() {
            if last.1 == y0 && last.2 == spans {
                last.1 = y1;
                continue;
            }
        }
        rows.try_reserve(1).map_err(|_| GridError::OutOfMemory)?;
        rows.push((y0, y1, spans));
    }

    let total_rects: usize = rows.iter().map(|r| r.2.len()).sum();
    let mut body: Vec<Rect16> = Vec::new();
    body.try_reserve(total_rects).map_err(|_| GridError::OutOfMemory)?;
    for (y0, y1, spans) in &rows {
        for &(x0, x1) in spans {
            body.push(Rect16::new(x0, *y0, x1, *y1));
        }
    }

    Ok(Region::from_canonical_body(body))
}

/// `true` iff every rectangle of `small` is covered by `big`.
fn is_subset(small: &Region, big: &Region) -> bool {
    small.rects().all(|r| big.contains_rect(r))
}

fn extents_overlap(a: &Region, b: &Region) -> bool {
    match (a.extents(), b.extents()) {
        (Some(ea), Some(eb)) => ea.overlaps(&eb),
        _ => false,
    }
}

/// `A ∪ B`. See `spec.md` §4.2 for the shortcuts and the extents formula.
pub fn union(a: &Region, b: &Region) -> Result<Region> {
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    if a.region_eq(b) {
        return Ok(a.clone());
    }
    if is_subset(a, b) {
        return Ok(b.clone());
    }
    if is_subset(b, a) {
        return Ok(a.clone());
    }
    sweep(a, b, |in_a, in_b| in_a || in_b)
}

/// `A − B`.
pub fn subtract(a: &Region, b: &Region) -> Result<Region> {
    if b.is_empty() {
        return Ok(a.clone());
    }
    if a.is_empty() {
        return Ok(Region::Empty);
    }
    if !extents_overlap(a, b) {
        return Ok(a.clone());
    }
    if is_subset(a, b) {
        return Ok(Region::Empty);
    }
    sweep(a, b, |in_a, in_b| in_a && !in_b)
}

/// `A ⊕ B`.
pub fn xor(a: &Region, b: &Region) -> Result<Region> {
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    if a.region_eq(b) {
        return Ok(Region::Empty);
    }
    sweep(a, b, |in_a, in_b| in_a != in_b)
}
