//! Sweep events and the two orderings the sweep depends on.
//!
//! Every boundary edge contributes a *left* event at its lexicographically
//! smaller endpoint and a *right* event at the other. Events live in a flat
//! arena ([`Events`]) and refer to their partner through [`EventId`], so
//! splitting an edge only relinks indices.
//!
//! # Queue order ([`compare_events`])
//!
//! 1. smaller `x` first, then smaller `y`;
//! 2. at the same point, right events before left events;
//! 3. non-collinear edges at the same point: the edge lying below first;
//! 4. collinear edges: left operand before right operand;
//! 5. finally by arena index, so the order is total.
//!
//! # Status order ([`compare_segments`])
//!
//! Active edges are ordered bottom to top at the current sweep position.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

use geo::Coord;

use crate::error::Operand;
use crate::predicates::{cmp_xy, orient};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EventId(pub usize);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}

/// How an edge relates to a coincident edge of the other operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EdgeType {
    /// No coincident edge.
    Normal,
    /// Duplicate of a coincident edge that is classified on its behalf.
    NonContributing,
    /// Coincident with an edge whose interior lies on the same side.
    SameTransition,
    /// Coincident with an edge whose interior lies on the opposite side.
    DifferentTransition,
}

#[derive(Clone, Debug)]
pub(crate) struct SweepEvent {
    pub point: Coord<f64>,
    /// `point` is the lexicographically smaller endpoint of the edge.
    pub left: bool,
    /// Event at the other endpoint of the same edge.
    pub other: EventId,
    pub operand: Operand,
    /// Global ring index across both operands.
    pub contour: usize,
    /// The ring originally runs from the left endpoint to the right one.
    /// Since rings are normalized with the interior on the left, this fixes
    /// which side of the edge the operand's interior lies on.
    pub forward: bool,

    // Classification, meaningful on left events only.
    pub edge_type: EdgeType,
    /// The edge is an inside→outside transition of its own operand for a
    /// vertical ray coming from below.
    pub in_out: bool,
    /// Same as `in_out` for the closest edge of the other operand below.
    pub other_in_out: bool,
}

impl SweepEvent {
    pub(crate) fn new(point: Coord<f64>, left: bool, other: EventId, operand: Operand) -> Self {
        Self {
            point,
            left,
            other,
            operand,
            contour: 0,
            forward: true,
            edge_type: EdgeType::Normal,
            in_out: false,
            other_in_out: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub(crate) struct Events {
    events: Vec<SweepEvent>,
}

impl Index<EventId> for Events {
    type Output = SweepEvent;
    fn index(&self, id: EventId) -> &SweepEvent { &self.events[id.0] }
}

impl IndexMut<EventId> for Events {
    fn index_mut(&mut self, id: EventId) -> &mut SweepEvent { &mut self.events[id.0] }
}

impl Events {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { events: Vec::with_capacity(n) }
    }

    pub(crate) fn len(&self) -> usize { self.events.len() }

    pub(crate) fn ids(&self) -> impl Iterator<Item = EventId> + '_ {
        (0..self.events.len()).map(EventId)
    }

    /// Add the two events of edge `a → b` and return `(left, right)`.
    pub(crate) fn push_edge(
        &mut self,
        a: Coord<f64>,
        b: Coord<f64>,
        operand: Operand,
        contour: usize,
    ) -> (EventId, EventId) {
        let forward = cmp_xy(a, b) == Ordering::Less;
        let (lp, rp) = if forward { (a, b) } else { (b, a) };
        let l = EventId(self.events.len());
        let r = EventId(l.0 + 1);

        let mut le = SweepEvent::new(lp, true, r, operand);
        let mut re = SweepEvent::new(rp, false, l, operand);
        le.contour = contour;
        re.contour = contour;
        le.forward = forward;
        re.forward = forward;
        self.events.push(le);
        self.events.push(re);
        (l, r)
    }

    fn push(&mut self, event: SweepEvent) -> EventId {
        self.events.push(event);
        EventId(self.events.len() - 1)
    }

    pub(crate) fn other_point(&self, id: EventId) -> Coord<f64> {
        self[self[id].other].point
    }

    pub(crate) fn is_vertical(&self, id: EventId) -> bool {
        self[id].point.x == self.other_point(id).x
    }

    /// The edge of `id` passes below `p`.
    pub(crate) fn is_below(&self, id: EventId, p: Coord<f64>) -> bool {
        let e = &self[id];
        let o = self.other_point(id);
        if e.left { orient(e.point, o, p) > 0.0 } else { orient(o, e.point, p) > 0.0 }
    }

    pub(crate) fn is_above(&self, id: EventId, p: Coord<f64>) -> bool {
        !self.is_below(id, p)
    }

    /// Split the edge of left event `se` at `p`, returning the new
    /// `(right, left)` events. Both must still be queued by the caller.
    ///
    /// Afterwards `se` ends at `p` and the new left event covers the rest.
    pub(crate) fn divide(&mut self, se: EventId, p: Coord<f64>) -> (EventId, EventId) {
        let old_other = self[se].other;
        let (operand, contour, forward) = (self[se].operand, self[se].contour, self[se].forward);

        let mut r = SweepEvent::new(p, false, se, operand);
        let mut l = SweepEvent::new(p, true, old_other, operand);
        r.contour = contour;
        l.contour = contour;
        r.forward = forward;
        l.forward = forward;
        let r = self.push(r);
        let l = self.push(l);

        // Rounding may put `p` past the far endpoint; swap roles so the tail
        // edge still runs left to right.
        if compare_events(self, l, old_other) == Ordering::Greater {
            self[old_other].left = true;
            self[l].left = false;
            self[old_other].forward = !forward;
            self[l].forward = !forward;
        }

        self[old_other].other = l;
        self[se].other = r;
        (r, l)
    }
}

// ---------------------------------------------------------------------------
// Orderings
// ---------------------------------------------------------------------------

/// Queue order: `Less` means `a` is processed before `b`.
pub(crate) fn compare_events(evs: &Events, a: EventId, b: EventId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let (ea, eb) = (&evs[a], &evs[b]);

    cmp_xy(ea.point, eb.point)
        .then_with(|| match (ea.left, eb.left) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => Ordering::Equal,
        })
        .then_with(|| {
            let ob = evs.other_point(b);
            if orient(ea.point, evs.other_point(a), ob) != 0.0 {
                if evs.is_below(a, ob) { Ordering::Less } else { Ordering::Greater }
            } else {
                operand_rank(ea.operand).cmp(&operand_rank(eb.operand))
            }
        })
        .then_with(|| a.cmp(&b))
}

/// Status order for two left events: `Less` means `a` lies below `b`.
pub(crate) fn compare_segments(evs: &Events, a: EventId, b: EventId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let (ea, eb) = (&evs[a], &evs[b]);
    let (oa, ob) = (evs.other_point(a), evs.other_point(b));

    if orient(ea.point, oa, eb.point) != 0.0 || orient(ea.point, oa, ob) != 0.0 {
        // Not collinear.
        if ea.point == eb.point {
            return below_to_ordering(evs.is_below(a, ob));
        }
        if ea.point.x == eb.point.x {
            return if ea.point.y < eb.point.y { Ordering::Less } else { Ordering::Greater };
        }
        // Compare against whichever edge was inserted first.
        if compare_events(evs, a, b) == Ordering::Greater {
            return below_to_ordering(evs.is_above(b, ea.point));
        }
        return below_to_ordering(evs.is_below(a, eb.point));
    }

    if ea.operand != eb.operand {
        return operand_rank(ea.operand).cmp(&operand_rank(eb.operand));
    }
    if ea.point == eb.point {
        return ea.contour.cmp(&eb.contour).then_with(|| a.cmp(&b));
    }
    compare_events(evs, a, b)
}

#[inline]
fn below_to_ordering(below: bool) -> Ordering {
    if below { Ordering::Less } else { Ordering::Greater }
}

#[inline]
fn operand_rank(op: Operand) -> u8 {
    match op {
        Operand::Left => 0,
        Operand::Right => 1,
    }
}
