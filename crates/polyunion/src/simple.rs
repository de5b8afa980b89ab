//! Simplicity checks for rings and between rings, backed by an R-tree of
//! segment bounding boxes.

use geo::Coord;
use rstar::RTree;

use crate::bbox::{segment_envelope, BoundingBox};
use crate::predicates::{intersect_segments, Intersection};

/// R-tree over the segments of a closed coordinate sequence.
pub(crate) fn segment_tree(coords: &[Coord<f64>]) -> RTree<BoundingBox> {
    let boxes = coords
        .windows(2)
        .enumerate()
        .map(|(i, w)| BoundingBox::segment(i, w[0], w[1]))
        .collect();
    RTree::bulk_load(boxes)
}

/// Find a point where a closed ring touches or crosses itself anywhere other
/// than at the vertex shared by two consecutive edges.
///
/// Returns `None` for a simple ring.
pub(crate) fn find_self_intersection(coords: &[Coord<f64>]) -> Option<Coord<f64>> {
    let n = coords.len().saturating_sub(1);
    if n < 3 {
        return coords.first().copied();
    }
    let tree = segment_tree(coords);

    for i in 0..n {
        let (a1, a2) = (coords[i], coords[i + 1]);
        for hit in tree.locate_in_envelope_intersecting(&segment_envelope(a1, a2)) {
            let j = hit.idx();
            if j <= i {
                continue;
            }
            let (b1, b2) = (coords[j], coords[j + 1]);

            // Consecutive edges may only meet at their shared vertex.
            let shared = if j == i + 1 {
                Some(a2)
            } else if i == 0 && j == n - 1 {
                Some(a1)
            } else {
                None
            };

            match (intersect_segments(a1, a2, b1, b2), shared) {
                (Intersection::None, _) => {}
                (Intersection::Point(p), Some(s)) if p == s => {}
                (Intersection::Point(p), _) => return Some(p),
                (Intersection::Overlap(lo, _), _) => return Some(lo),
            }
        }
    }
    None
}

/// Find a point where the boundaries of two distinct rings cross or overlap.
///
/// Touching at a single point where one ring's vertex lies on the other ring
/// is allowed; crossings through both edge interiors and collinear overlaps
/// are reported. `tree` must be [`segment_tree`] of `a`.
pub(crate) fn find_crossing(
    a: &[Coord<f64>],
    tree: &RTree<BoundingBox>,
    b: &[Coord<f64>],
) -> Option<Coord<f64>> {
    for w in b.windows(2) {
        let (b1, b2) = (w[0], w[1]);
        for hit in tree.locate_in_envelope_intersecting(&segment_envelope(b1, b2)) {
            let (a1, a2) = (a[hit.idx()], a[hit.idx() + 1]);
            match intersect_segments(a1, a2, b1, b2) {
                Intersection::None => {}
                Intersection::Point(p) => {
                    let at_vertex = p == a1 || p == a2 || p == b1 || p == b2;
                    if !at_vertex {
                        return Some(p);
                    }
                }
                Intersection::Overlap(lo, _) => return Some(lo),
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Coord<f64>> {
        points.iter().map(|&(x, y)| Coord { x, y }).collect()
    }

    #[test]
    fn square_is_simple() {
        let sq = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(find_self_intersection(&sq), None);
    }

    #[test]
    fn triangle_is_simple() {
        let tri = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(find_self_intersection(&tri), None);
    }

    #[test]
    fn bowtie_crosses_itself() {
        let bowtie = ring(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)]);
        assert_eq!(find_self_intersection(&bowtie), Some(Coord { x: 1.0, y: 1.0 }));
    }

    #[test]
    fn vertex_touching_an_edge_is_reported() {
        // (1, 0) is revisited through the spike at the bottom edge.
        let pinched = ring(&[
            (0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (1.0, 0.0), (0.0, 2.0), (0.0, 0.0),
        ]);
        assert_eq!(find_self_intersection(&pinched), Some(Coord { x: 1.0, y: 0.0 }));
    }

    #[test]
    fn collinear_spike_is_reported() {
        let spike = ring(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(find_self_intersection(&spike).is_some());
    }

    #[test]
    fn flat_ring_is_reported() {
        let flat = ring(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);
        assert!(find_self_intersection(&flat).is_some());
    }

    #[test]
    fn crossing_rings() {
        let a = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let inside = ring(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0), (1.0, 1.0)]);
        let touching = ring(&[(4.0, 2.0), (3.0, 3.0), (3.0, 1.0), (4.0, 2.0)]);
        let crossing = ring(&[(3.0, 1.0), (3.0, 2.0), (5.0, 2.0), (5.0, 1.0), (3.0, 1.0)]);
        let tree = segment_tree(&a);

        assert_eq!(find_crossing(&a, &tree, &inside), None);
        assert_eq!(find_crossing(&a, &tree, &touching), None);
        assert!(find_crossing(&a, &tree, &crossing).is_some());
    }
}
