use super::*;
use quickcheck_macros::quickcheck;

fn rect(x0: u16, y0: u16, x1: u16, y1: u16) -> Rect16 {
    Rect16::new(x0, y0, x1, y1)
}

fn complex(rects: &[(u16, u16, u16, u16)]) -> Region {
    Region::from_canonical_body(rects.iter().map(|&(a, b, c, d)| rect(a, b, c, d)).collect())
}

#[test]
fn empty_union_identity() {
    let a = complex(&[(0, 0, 5, 5)]);
    assert_eq!(union(&Region::Empty, &a).unwrap(), a);
    assert_eq!(union(&a, &Region::Empty).unwrap(), a);
}

#[test]
fn subtract_empty_and_from_empty() {
    let a = complex(&[(0, 0, 5, 5)]);
    assert_eq!(subtract(&a, &Region::Empty).unwrap(), a);
    assert_eq!(subtract(&Region::Empty, &a).unwrap(), Region::Empty);
}

#[test]
fn xor_self_is_empty() {
    let a = complex(&[(10, 10, 20, 20)]);
    let b = complex(&[(10, 10, 20, 20)]);
    assert_eq!(xor(&a, &b).unwrap(), Region::Empty);
}

/// Scenario B from `spec.md` §8: region union coalesces bands.
#[test]
fn scenario_b_union_coalesces_bands() {
    let a = complex(&[(10, 10, 20, 15), (10, 20, 20, 30)]);
    let b = Region::Simple(rect(10, 15, 20, 25));
    let u = union(&a, &b).unwrap();
    assert_eq!(u, Region::Simple(rect(10, 10, 20, 30)));
    assert_eq!(u.extents(), Some(rect(10, 10, 20, 30)));
}

/// Scenario C from `spec.md` §8: exact-overlap xor is empty.
#[test]
fn scenario_c_xor_exact_overlap() {
    let a = Region::Simple(rect(10, 10, 20, 20));
    let b = Region::Simple(rect(10, 10, 20, 20));
    assert_eq!(xor(&a, &b).unwrap(), Region::Empty);
}

#[test]
fn union_of_disjoint_stays_complex_and_canonical() {
    let a = Region::Simple(rect(0, 0, 5, 5));
    let b = Region::Simple(rect(10, 10, 15, 15));
    let u = union(&a, &b).unwrap();
    assert_eq!(u.rect_count(), 2);
    assert_eq!(u.extents(), Some(rect(0, 0, 15, 15)));
    assert!(u.contains_xy(2, 2));
    assert!(u.contains_xy(12, 12));
    assert!(!u.contains_xy(7, 7));
}

#[test]
fn subtract_splits_a_band() {
    // A is one wide band; B carves a hole out of the middle.
    let a = Region::Simple(rect(0, 0, 30, 10));
    let b = Region::Simple(rect(10, 0, 20, 10));
    let d = subtract(&a, &b).unwrap();
    assert_eq!(d.rect_count(), 2);
    assert!(d.contains_xy(5, 5));
    assert!(!d.contains_xy(15, 5));
    assert!(d.contains_xy(25, 5));
}

#[test]
fn contains_rect_rejects_rect_spanning_a_gap() {
    let r = complex(&[(0, 0, 10, 10), (20, 0, 30, 10)]);
    assert!(!r.contains_rect(&rect(5, 0, 25, 10)));
    assert!(r.contains_rect(&rect(2, 2, 8, 8)));
}

// --- Property-based checks (spec.md §8, items 3-5) -------------------------

fn arbitrary_region(seed: u32) -> Region {
    // A small deterministic generator: scatter a handful of unit-ish
    // rectangles across a bounded grid based on `seed`.
    let mut body = Vec::new();
    let mut s = seed.wrapping_mul(2654435761).wrapping_add(1);
    let mut next = || {
        s = s.wrapping_mul(1103515245).wrapping_add(12345);
        (s >> 16) as u16 % 12
    };
    for _ in 0..(seed % 4 + 1) {
        let x0 = next();
        let y0 = next();
        let x1 = x0 + (next() % 4) + 1;
        let y1 = y0 + (next() % 4) + 1;
        body.push(Rect16::new(x0, y0, x1, y1));
    }
    // Fold through union so overlaps collapse into a legal canonical region.
    body.into_iter().fold(Region::Empty, |acc, r| {
        union(&acc, &Region::from_rect(r)).unwrap()
    })
}

fn assert_canonical(r: &Region) {
    let body: Vec<&Rect16> = r.rects().collect();
    for w in body.windows(2) {
        // y0 must not decrease, and rectangles within the same band must be
        // strictly increasing in x0 with a gap between them.
        assert!(w[0].y0 <= w[1].y0);
        if w[0].y0 == w[1].y0 && w[0].y1 == w[1].y1 {
            assert!(w[1].x0 > w[0].x1);
        }
    }
    for rc in &body {
        assert!(rc.x0 < rc.x1 && rc.y0 < rc.y1);
    }
}

#[quickcheck]
fn prop_canonical_after_combine(sa: u32, sb: u32) -> bool {
    let a = arbitrary_region(sa);
    let b = arbitrary_region(sb);
    for r in [union(&a, &b), subtract(&a, &b), xor(&a, &b)] {
        let r = r.unwrap();
        assert_canonical(&r);
    }
    true
}

#[quickcheck]
fn prop_union_commutative_and_idempotent(sa: u32, sb: u32) -> bool {
    let a = arbitrary_region(sa);
    let b = arbitrary_region(sb);
    union(&a, &b).unwrap() == union(&b, &a).unwrap() && union(&a, &a).unwrap() == a
}

#[quickcheck]
fn prop_xor_commutative_and_self_inverse(sa: u32, sb: u32) -> bool {
    let a = arbitrary_region(sa);
    let b = arbitrary_region(sb);
    xor(&a, &b).unwrap() == xor(&b, &a).unwrap() && xor(&a, &a).unwrap() == Region::Empty
}

#[quickcheck]
fn prop_subtract_identities(sa: u32) -> bool {
    let a = arbitrary_region(sa);
    subtract(&a, &Region::Empty).unwrap() == a
        && subtract(&Region::Empty, &a).unwrap() == Region::Empty
}

#[quickcheck]
fn prop_union_contains_rect_iff_either_contains(sa: u32, sb: u32, x: u8, y: u8) -> bool {
    let a = arbitrary_region(sa);
    let b = arbitrary_region(sb);
    let u = union(&a, &b).unwrap();
    let r = Rect16::unit(x as u16, y as u16);
    u.contains_rect(&r) == (a.contains_rect(&r) || b.contains_rect(&r))
}

#[quickcheck]
fn prop_extents_consistency(sa: u32) -> bool {
    let a = arbitrary_region(sa);
    match a.extents() {
        None => a.is_empty(),
        Some(ext) => {
            let (mut x0, mut y0, mut x1, mut y1) = (u16::MAX, u16::MAX, 0, 0);
            for r in a.rects() {
                x0 = x0.min(r.x0);
                y0 = y0.min(r.y0);
                x1 = x1.max(r.x1);
                y1 = y1.max(r.y1);
            }
            ext == Rect16::new(x0, y0, x1, y1)
        }
    }
}
