//! Ring reconstruction: turns the directed boundary edges left by the sweep
//! into polygons.
//!
//! 1. Trace closed walks, at every vertex taking the outgoing edge with the
//!    smallest clockwise turn from the reversed incoming edge. This keeps the
//!    interior on the left and separates faces that only touch at a vertex.
//! 2. Split walks at repeated (pinch) vertices into simple loops.
//! 3. Optionally drop exactly collinear pass-through vertices, keeping the
//!    ones that were already pass-through vertices of an operand.
//! 4. Positive area loops are shells, negative ones holes. Each hole goes to
//!    the smallest shell containing it.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use ahash::{AHashMap, AHashSet};
use geo::Coord;
use rstar::{RTree, AABB};
use smallvec::SmallVec;
use tracing::warn;

use crate::bbox::{coords_bounds, BoundingBox};
use crate::error::{Result, UnionError};
use crate::polygon::{midpoint, Polygon};
use crate::predicates::{cmp_xy, coord_key, locate_point, orient, signed_area, Location};
use crate::ring::Ring;
use crate::simple::find_self_intersection;
use crate::sweep::DirectedEdge;
use crate::union::Warning;

/// Switches for [`build_polygons`] and [`normalize_polygons`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Finish<'a> {
    pub simplify_collinear: bool,
    pub validate_output: bool,
    /// Vertices (by [`coord_key`]) that collinear simplification must keep.
    pub pinned: Option<&'a AHashSet<(u64, u64)>>,
}

/// Assemble polygons from boundary edges whose interior lies on their left.
pub(crate) fn build_polygons(
    edges: &[DirectedEdge],
    finish: Finish<'_>,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Polygon>> {
    let mut shells: Vec<Vec<Coord<f64>>> = Vec::new();
    let mut holes: Vec<Vec<Coord<f64>>> = Vec::new();

    for walk in trace_walks(edges)? {
        for mut ring in split_pinches(&walk) {
            if finish.simplify_collinear {
                ring = drop_collinear(ring, finish.pinned);
            }
            let area = if ring.len() >= 4 { signed_area(&ring) } else { 0.0 };
            if area > 0.0 {
                shells.push(ring);
            } else if area < 0.0 {
                holes.push(ring);
            } else {
                let at = ring.first().copied().unwrap_or_else(Coord::zero);
                warn!(x = at.x, y = at.y, "dropping zero-area loop from union output");
                warnings.push(Warning::ZeroAreaLoop { at });
            }
        }
    }

    let polygons = assign_holes(shells, holes, warnings);
    finalize(polygons, finish)
}

/// Normalize polygons that did not go through the sweep (disjoint operands)
/// so they match the shape of traced output.
pub(crate) fn normalize_polygons(polygons: Vec<Polygon>, finish: Finish<'_>) -> Result<Vec<Polygon>> {
    let rings = polygons
        .into_iter()
        .map(|p| {
            let mut rings = p.rings().map(|r| r.coords().to_vec());
            let outer = rings.next().unwrap_or_default();
            let holes = rings.collect::<Vec<_>>();
            let prep = |r: Vec<Coord<f64>>| if finish.simplify_collinear { drop_collinear(r, finish.pinned) } else { r };
            (prep(outer), holes.into_iter().map(prep).collect())
        })
        .collect();
    finalize(rings, finish)
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

fn direction_angle(from: Coord<f64>, to: Coord<f64>) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Clockwise rotation from `reference` to `angle`, in `(0, TAU]`.
fn clockwise_turn(reference: f64, angle: f64) -> f64 {
    let turn = (reference - angle).rem_euclid(TAU);
    if turn == 0.0 { TAU } else { turn }
}

/// Closed walks covering every edge exactly once. Each walk is returned as a
/// closed coordinate list and may revisit vertices.
fn trace_walks(edges: &[DirectedEdge]) -> Result<Vec<Vec<Coord<f64>>>> {
    let mut outgoing: AHashMap<(u64, u64), SmallVec<[usize; 2]>> = AHashMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(coord_key(e.from)).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut walks = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut walk = vec![edges[start].from];
        let mut current = start;

        loop {
            let DirectedEdge { from, to } = edges[current];
            walk.push(to);

            let back = direction_angle(to, from);
            let candidates = outgoing.get(&coord_key(to)).map(|c| c.as_slice()).unwrap_or(&[]);
            let next = candidates
                .iter()
                .copied()
                .filter(|&e| !used[e] || e == start)
                .map(|e| (clockwise_turn(back, direction_angle(to, edges[e].to)), e))
                .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));

            match next {
                Some((_, e)) if e == start => break,
                Some((_, e)) => {
                    used[e] = true;
                    current = e;
                }
                None => {
                    return Err(UnionError::Reconstruction(format!(
                        "boundary walk stuck at ({}, {})",
                        to.x, to.y
                    )));
                }
            }
        }
        walks.push(walk);
    }
    Ok(walks)
}

/// Split a closed walk at every vertex it visits more than once.
fn split_pinches(walk: &[Coord<f64>]) -> Vec<Vec<Coord<f64>>> {
    let mut loops = Vec::new();
    let mut stack: Vec<Coord<f64>> = Vec::with_capacity(walk.len());
    let mut seen: AHashMap<(u64, u64), usize> = AHashMap::new();

    for &v in walk {
        let key = coord_key(v);
        if let Some(&i) = seen.get(&key) {
            let mut ring: Vec<Coord<f64>> = stack.drain(i..).collect();
            for c in &ring[1..] {
                seen.remove(&coord_key(*c));
            }
            ring.push(v);
            stack.push(v);
            loops.push(ring);
        } else {
            seen.insert(key, stack.len());
            stack.push(v);
        }
    }
    loops
}

/// Remove vertices lying exactly on the line through their neighbours,
/// treating the ring cyclically. Vertices in `pinned` always stay. Returns a
/// closed ring, possibly collapsed.
fn drop_collinear(ring: Vec<Coord<f64>>, pinned: Option<&AHashSet<(u64, u64)>>) -> Vec<Coord<f64>> {
    let mut pts: Vec<Coord<f64>> = ring;
    pts.pop();
    let is_pinned = |c: Coord<f64>| pinned.is_some_and(|set| set.contains(&coord_key(c)));

    loop {
        let n = pts.len();
        if n < 3 {
            break;
        }
        let keep: Vec<bool> = (0..n)
            .map(|i| is_pinned(pts[i]) || orient(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]) != 0.0)
            .collect();
        if keep.iter().all(|&k| k) {
            break;
        }
        // Remove one collinear vertex at a time from each run so that
        // neighbours are re-evaluated against the survivors.
        let mut out = Vec::with_capacity(n);
        let mut removed_prev = false;
        for (i, &p) in pts.iter().enumerate() {
            if !keep[i] && !removed_prev {
                removed_prev = true;
            } else {
                out.push(p);
                removed_prev = false;
            }
        }
        pts = out;
    }

    if let Some(&first) = pts.first() {
        pts.push(first);
    }
    pts
}

// ---------------------------------------------------------------------------
// Shells and holes
// ---------------------------------------------------------------------------

/// A probe point of `hole` that is not on `shell`'s boundary, located
/// against `shell`.
fn hole_inside(hole: &[Coord<f64>], shell: &[Coord<f64>]) -> bool {
    hole.windows(2)
        .map(|w| locate_point(midpoint(w[0], w[1]), shell))
        .chain(hole.iter().map(|&c| locate_point(c, shell)))
        .find(|&loc| loc != Location::Boundary)
        .is_some_and(|loc| loc == Location::Inside)
}

fn assign_holes(
    shells: Vec<Vec<Coord<f64>>>,
    holes: Vec<Vec<Coord<f64>>>,
    warnings: &mut Vec<Warning>,
) -> Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)> {
    let areas: Vec<f64> = shells.iter().map(|s| signed_area(s)).collect();
    let tree = RTree::bulk_load(
        shells
            .iter()
            .enumerate()
            .filter_map(|(i, s)| coords_bounds(s).map(|b| BoundingBox::new(i, b)))
            .collect(),
    );

    let mut assigned: Vec<Vec<Vec<Coord<f64>>>> = vec![Vec::new(); shells.len()];
    for hole in holes {
        let Some(bounds) = coords_bounds(&hole) else { continue };
        let envelope = AABB::from_corners(bounds.min().into(), bounds.max().into());
        let owner = tree
            .locate_in_envelope_intersecting(&envelope)
            .map(BoundingBox::idx)
            .filter(|&i| hole_inside(&hole, &shells[i]))
            .min_by(|&a, &b| areas[a].partial_cmp(&areas[b]).unwrap_or(Ordering::Equal));

        match owner {
            Some(i) => assigned[i].push(hole),
            None => {
                let at = hole[0];
                warn!(x = at.x, y = at.y, "dropping hole without an enclosing shell");
                warnings.push(Warning::OrphanHole { at });
            }
        }
    }

    shells.into_iter().zip(assigned).collect()
}

// ---------------------------------------------------------------------------
// Output normalization
// ---------------------------------------------------------------------------

/// Rotate a closed ring so it starts at its lexicographically smallest vertex.
fn rotate_to_min(mut ring: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    ring.pop();
    let start = ring
        .iter()
        .enumerate()
        .min_by(|a, b| cmp_xy(*a.1, *b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    ring.rotate_left(start);
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

fn min_corner(ring: &[Coord<f64>]) -> Coord<f64> {
    coords_bounds(ring).map(|b| b.min()).unwrap_or_else(Coord::zero)
}

fn finalize(
    polygons: Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)>,
    finish: Finish<'_>,
) -> Result<Vec<Polygon>> {
    let mut polygons: Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)> = polygons
        .into_iter()
        .map(|(outer, holes)| {
            let mut holes: Vec<_> = holes.into_iter().map(rotate_to_min).collect();
            holes.sort_by(|a, b| cmp_xy(min_corner(a), min_corner(b)));
            (rotate_to_min(outer), holes)
        })
        .collect();
    polygons.sort_by(|a, b| cmp_xy(min_corner(&a.0), min_corner(&b.0)));

    polygons
        .into_iter()
        .map(|(outer, holes)| {
            for ring in std::iter::once(&outer).chain(holes.iter()) {
                if ring.len() < 4 {
                    return Err(UnionError::Reconstruction("output ring collapsed".into()));
                }
                if finish.validate_output {
                    if let Some(at) = find_self_intersection(ring) {
                        return Err(UnionError::Reconstruction(format!(
                            "output ring is not simple near ({}, {})",
                            at.x, at.y
                        )));
                    }
                }
            }
            Ok(Polygon::from_parts(
                Ring::from_closed(outer),
                holes.into_iter().map(Ring::from_closed).collect(),
            ))
        })
        .collect()
}
