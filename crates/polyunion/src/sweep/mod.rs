//! Martinez–Rueda plane sweep specialised to union.
//!
//! The sweep subdivides both operands' edges at every mutual intersection,
//! classifies each resulting edge against the other operand and returns the
//! edges that bound the union, directed with the union's interior on their
//! left.

mod event;
mod queue;

use std::cmp::Ordering;

use geo::Coord;
use tracing::trace;

use crate::error::{Operand, Result};
use crate::options::UnionOptions;
use crate::polygon::Polygon;
use crate::predicates::{intersect_segments, Intersection};

use event::{compare_events, compare_segments, EdgeType, EventId, Events};
use queue::EventQueue;

/// A retained boundary edge, `from → to` with the interior on its left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DirectedEdge {
    pub from: Coord<f64>,
    pub to: Coord<f64>,
}

/// Counters reported in the per-step debug log.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SweepStats {
    pub input_edges: usize,
    pub events: usize,
    pub intersections: usize,
    pub output_edges: usize,
}

/// What [`possible_intersection`] did to a pair of neighbouring edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    None,
    /// Edges crossed or touched and were split at the meeting point.
    Crossing,
    /// Collinear edges sharing their left endpoint; the pair was classified
    /// and both need their fields recomputed.
    SharedLeft,
    /// Collinear edges overlapping elsewhere; split so the overlap becomes
    /// a shared-left case later in the sweep.
    Overlap,
}

/// Run the sweep over two operands and return the union boundary edges.
pub(crate) fn union_edges(
    left: &[Polygon],
    right: &[Polygon],
    options: &UnionOptions,
) -> Result<(Vec<DirectedEdge>, SweepStats)> {
    let mut stats = SweepStats::default();
    let n = count_edges(left, right);
    let mut evs = Events::with_capacity(4 * n);
    let mut queue = EventQueue::with_capacity(2 * n);

    let mut contour = 0;
    for (polys, operand) in [(left, Operand::Left), (right, Operand::Right)] {
        for poly in polys {
            for ring in poly.rings() {
                for w in ring.coords().windows(2) {
                    if w[0] == w[1] {
                        continue;
                    }
                    let (l, r) = evs.push_edge(w[0], w[1], operand, contour);
                    queue.push(l, &evs);
                    queue.push(r, &evs);
                    stats.input_edges += 1;
                }
                contour += 1;
            }
        }
    }

    subdivide(&mut evs, &mut queue, options, &mut stats)?;

    let edges: Vec<DirectedEdge> = evs
        .ids()
        .filter(|&id| evs[id].left && in_result(&evs, id))
        .map(|id| {
            let (p, q) = (evs[id].point, evs.other_point(id));
            if evs[id].forward {
                DirectedEdge { from: p, to: q }
            } else {
                DirectedEdge { from: q, to: p }
            }
        })
        .collect();

    stats.events = evs.len();
    stats.output_edges = edges.len();
    Ok((edges, stats))
}

fn count_edges(left: &[Polygon], right: &[Polygon]) -> usize {
    left.iter()
        .chain(right)
        .flat_map(Polygon::rings)
        .map(|r| r.num_vertices())
        .sum()
}

/// Process the queue, splitting edges at intersections and propagating the
/// in/out flags along the status line.
fn subdivide(
    evs: &mut Events,
    queue: &mut EventQueue,
    options: &UnionOptions,
    stats: &mut SweepStats,
) -> Result<()> {
    let mut status: Vec<EventId> = Vec::new();

    while let Some(event) = queue.pop(evs) {
        options.check_cancelled()?;

        if evs[event].left {
            let pos = status.partition_point(|&s| compare_segments(evs, s, event) == Ordering::Less);
            status.insert(pos, event);

            let prev = pos.checked_sub(1).map(|i| status[i]);
            let next = status.get(pos + 1).copied();
            compute_fields(evs, event, prev);

            if let Some(next) = next {
                let outcome = possible_intersection(evs, queue, event, next);
                count(stats, outcome);
                if outcome == Outcome::SharedLeft {
                    compute_fields(evs, event, prev);
                    compute_fields(evs, next, Some(event));
                }
            }
            if let Some(prev) = prev {
                let outcome = possible_intersection(evs, queue, prev, event);
                count(stats, outcome);
                if outcome == Outcome::SharedLeft {
                    let prevprev = pos.checked_sub(2).map(|i| status[i]);
                    compute_fields(evs, prev, prevprev);
                    compute_fields(evs, event, Some(prev));
                }
            }
        } else {
            let partner = evs[event].other;
            let Some(pos) = status.iter().position(|&s| s == partner) else {
                trace!(event = %event, "right event without an active partner");
                continue;
            };
            let prev = pos.checked_sub(1).map(|i| status[i]);
            let next = status.get(pos + 1).copied();
            status.remove(pos);

            if let (Some(prev), Some(next)) = (prev, next) {
                let outcome = possible_intersection(evs, queue, prev, next);
                count(stats, outcome);
            }
        }
    }
    Ok(())
}

fn count(stats: &mut SweepStats, outcome: Outcome) {
    if outcome != Outcome::None {
        stats.intersections += 1;
    }
}

/// Derive `in_out` / `other_in_out` of `event` from the edge directly below.
fn compute_fields(evs: &mut Events, event: EventId, prev: Option<EventId>) {
    let (in_out, other_in_out) = match prev {
        None => (false, true),
        Some(p) if evs[p].operand == evs[event].operand => (!evs[p].in_out, evs[p].other_in_out),
        Some(p) => {
            let other = if evs.is_vertical(p) { !evs[p].in_out } else { evs[p].in_out };
            (!evs[p].other_in_out, other)
        }
    };
    evs[event].in_out = in_out;
    evs[event].other_in_out = other_in_out;
}

/// Whether a left event's edge lies on the union boundary.
fn in_result(evs: &Events, id: EventId) -> bool {
    match evs[id].edge_type {
        EdgeType::Normal => evs[id].other_in_out,
        EdgeType::SameTransition => true,
        EdgeType::DifferentTransition | EdgeType::NonContributing => false,
    }
}

/// Split `se` at `p` and queue both new events.
fn divide_and_queue(evs: &mut Events, queue: &mut EventQueue, se: EventId, p: Coord<f64>) {
    let (r, l) = evs.divide(se, p);
    queue.push(l, evs);
    queue.push(r, evs);
}

/// Test two status neighbours (`se1` below `se2`) for intersection and split
/// them so that they only meet at shared endpoints.
fn possible_intersection(
    evs: &mut Events,
    queue: &mut EventQueue,
    se1: EventId,
    se2: EventId,
) -> Outcome {
    let (p1, q1) = (evs[se1].point, evs.other_point(se1));
    let (p2, q2) = (evs[se2].point, evs.other_point(se2));

    match intersect_segments(p1, q1, p2, q2) {
        Intersection::None => Outcome::None,
        Intersection::Point(p) => {
            if p1 == p2 || q1 == q2 {
                return Outcome::None;
            }
            if p != p1 && p != q1 {
                divide_and_queue(evs, queue, se1, p);
            }
            if p != p2 && p != q2 {
                divide_and_queue(evs, queue, se2, p);
            }
            Outcome::Crossing
        }
        Intersection::Overlap(..) => {
            if evs[se1].operand == evs[se2].operand {
                return Outcome::None;
            }
            overlap(evs, queue, se1, se2)
        }
    }
}

fn overlap(evs: &mut Events, queue: &mut EventQueue, se1: EventId, se2: EventId) -> Outcome {
    let (o1, o2) = (evs[se1].other, evs[se2].other);
    let left_coincide = evs[se1].point == evs[se2].point;
    let right_coincide = evs[o1].point == evs[o2].point;

    // Endpoints that differ, in sweep order.
    let mut ends: Vec<EventId> = Vec::with_capacity(4);
    if !left_coincide {
        if compare_events(evs, se1, se2) == Ordering::Greater {
            ends.extend([se2, se1]);
        } else {
            ends.extend([se1, se2]);
        }
    }
    if !right_coincide {
        if compare_events(evs, o1, o2) == Ordering::Greater {
            ends.extend([o2, o1]);
        } else {
            ends.extend([o1, o2]);
        }
    }

    if left_coincide {
        evs[se2].edge_type = EdgeType::NonContributing;
        evs[se1].edge_type = if evs[se1].forward == evs[se2].forward {
            EdgeType::SameTransition
        } else {
            EdgeType::DifferentTransition
        };
        if !right_coincide {
            // Trim the longer edge to the shorter one's right endpoint.
            let longer = evs[ends[1]].other;
            let at = evs[ends[0]].point;
            divide_and_queue(evs, queue, longer, at);
        }
        return Outcome::SharedLeft;
    }

    if right_coincide {
        let at = evs[ends[1]].point;
        divide_and_queue(evs, queue, ends[0], at);
        return Outcome::Overlap;
    }

    if ends[0] != evs[ends[3]].other {
        // Partial overlap.
        let (a, b) = (evs[ends[1]].point, evs[ends[2]].point);
        divide_and_queue(evs, queue, ends[0], a);
        divide_and_queue(evs, queue, ends[1], b);
    } else {
        // One edge contains the other.
        let a = evs[ends[1]].point;
        let b = evs[ends[2]].point;
        divide_and_queue(evs, queue, ends[0], a);
        let outer_left = evs[ends[3]].other;
        divide_and_queue(evs, queue, outer_left, b);
    }
    Outcome::Overlap
}
