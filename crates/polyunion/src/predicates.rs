//! Exact-as-possible planar predicates shared by validation, the sweep and
//! ring reconstruction.
//!
//! All comparisons use exact floating-point equality; any tolerance is
//! applied up front by [`crate::snap`].

use std::cmp::Ordering;

use geo::Coord;

/// Twice the signed area of the triangle `(a, b, c)`.
/// Positive when `c` lies to the left of `a → b` (counter-clockwise turn).
#[inline]
pub(crate) fn orient(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Signed area of a closed coordinate sequence (shoelace formula).
/// Positive for counter-clockwise rings, negative for clockwise rings.
pub fn signed_area(coords: &[Coord<f64>]) -> f64 {
    let mut a = 0.0;
    for w in coords.windows(2) {
        a += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    a / 2.0
}

/// Lexicographic `(x, y)` order, the sweep direction used throughout the crate.
#[inline]
pub(crate) fn cmp_xy(a: Coord<f64>, b: Coord<f64>) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

/// Hashable bit pattern of a coordinate; `-0.0` is folded onto `0.0`.
#[inline]
pub(crate) fn coord_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Where a point lies relative to a ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// Returns `true` if `p` lies on the closed segment `a → b`.
pub(crate) fn on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    orient(a, b, p) == 0.0
        && p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Locate `p` relative to a closed ring: boundary hits are reported
/// explicitly, otherwise the even-odd ray casting rule decides.
pub fn locate_point(p: Coord<f64>, ring: &[Coord<f64>]) -> Location {
    if ring.windows(2).any(|w| on_segment(p, w[0], w[1])) {
        return Location::Boundary;
    }

    let mut inside = false;
    for w in ring.windows(2) {
        let (pi, pj) = (w[1], w[0]);
        if (pi.y > p.y) != (pj.y > p.y)
            && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
    }

    if inside { Location::Inside } else { Location::Outside }
}

/// Intersection of two closed segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Intersection {
    None,
    Point(Coord<f64>),
    /// Collinear overlap, endpoints in sweep order.
    Overlap(Coord<f64>, Coord<f64>),
}

/// Intersect segments `a1 → a2` and `b1 → b2`.
///
/// Endpoint hits return the endpoint itself rather than a recomputed
/// coordinate, and collinear overlaps are resolved purely from the input
/// endpoints, so no new coordinates are invented unless the segments cross
/// in their interiors.
pub(crate) fn intersect_segments(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
) -> Intersection {
    let va = a2 - a1;
    let vb = b2 - b1;
    let e = b1 - a1;
    let kross = va.x * vb.y - va.y * vb.x;

    if kross != 0.0 {
        let s = (e.x * vb.y - e.y * vb.x) / kross;
        if !(0.0..=1.0).contains(&s) { return Intersection::None; }
        let t = (e.x * va.y - e.y * va.x) / kross;
        if !(0.0..=1.0).contains(&t) { return Intersection::None; }

        if s == 0.0 { return Intersection::Point(a1); }
        if s == 1.0 { return Intersection::Point(a2); }
        if t == 0.0 { return Intersection::Point(b1); }
        if t == 1.0 { return Intersection::Point(b2); }

        let p = Coord { x: a1.x + s * va.x, y: a1.y + s * va.y };
        // Rounding can land the point exactly on an endpoint.
        for end in [a1, a2, b1, b2] {
            if p == end { return Intersection::Point(end); }
        }
        return Intersection::Point(p);
    }

    // Parallel: only collinear segments can meet.
    if e.x * va.y - e.y * va.x != 0.0 {
        return Intersection::None;
    }

    let (a_lo, a_hi) = if cmp_xy(a1, a2) == Ordering::Greater { (a2, a1) } else { (a1, a2) };
    let (b_lo, b_hi) = if cmp_xy(b1, b2) == Ordering::Greater { (b2, b1) } else { (b1, b2) };
    let lo = if cmp_xy(a_lo, b_lo) == Ordering::Less { b_lo } else { a_lo };
    let hi = if cmp_xy(a_hi, b_hi) == Ordering::Greater { b_hi } else { a_hi };

    match cmp_xy(lo, hi) {
        Ordering::Greater => Intersection::None,
        Ordering::Equal => Intersection::Point(lo),
        Ordering::Less => Intersection::Overlap(lo, hi),
    }
}
