use ahash::AHashMap;
use geo::Coord;
use smallvec::SmallVec;

/// Merges vertices that lie within `tolerance` of an already seen vertex.
///
/// The first vertex seen in a neighbourhood becomes canonical, so snapping is
/// deterministic for a fixed input order. Vertices are bucketed in a grid of
/// cell size `tolerance`; a lookup inspects the 3×3 block of cells around the
/// query point and picks the nearest canonical vertex.
pub(crate) struct Snapper {
    tolerance: f64,
    cells: AHashMap<(i64, i64), SmallVec<[Coord<f64>; 1]>>,
}

impl Snapper {
    pub(crate) fn new(tolerance: f64) -> Self {
        Self { tolerance, cells: AHashMap::new() }
    }

    /// Grid cell of `c`. Cells past the `i64` range saturate; the distance
    /// check in [`Snapper::snap`] keeps that exact.
    fn cell(&self, c: Coord<f64>) -> (i64, i64) {
        ((c.x / self.tolerance).floor() as i64, (c.y / self.tolerance).floor() as i64)
    }

    /// Canonical position for `c`, registering `c` if no vertex is near.
    pub(crate) fn snap(&mut self, c: Coord<f64>) -> Coord<f64> {
        let (cx, cy) = self.cell(c);
        let tol2 = self.tolerance * self.tolerance;

        let mut best: Option<(f64, Coord<f64>)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) else { continue };
                for &v in bucket {
                    let d2 = (v.x - c.x).powi(2) + (v.y - c.y).powi(2);
                    if d2 <= tol2 && best.is_none_or(|(b, _)| d2 < b) {
                        best = Some((d2, v));
                    }
                }
            }
        }

        match best {
            Some((_, v)) => v,
            None => {
                self.cells.entry((cx, cy)).or_default().push(c);
                c
            }
        }
    }

    /// Snap every coordinate of a closed ring and drop consecutive duplicates
    /// created by the merge. The result may have collapsed below a valid ring.
    pub(crate) fn snap_ring(&mut self, coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
        let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
        for &c in coords {
            let s = self.snap(c);
            if out.last() != Some(&s) {
                out.push(s);
            }
        }
        out
    }
}
