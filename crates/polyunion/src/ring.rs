use ahash::AHashSet;
use geo::{Coord, LineString, Rect};

use crate::bbox::coords_bounds;
use crate::error::{Result, UnionError};
use crate::predicates::{coord_key, locate_point, signed_area, Location};
use crate::simple::find_self_intersection;

/// A closed ring of at least three distinct vertices.
///
/// The coordinate sequence always repeats its first point at the end and has
/// no consecutive duplicates. Orientation is whatever the caller supplied;
/// [`crate::Polygon`] normalizes it.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    coords: Vec<Coord<f64>>,
}

impl Ring {
    /// Validate and build a ring.
    ///
    /// Fails with [`UnionError::InvalidRing`] when a coordinate is not finite,
    /// the ring is not closed, fewer than four coordinates remain after
    /// removing consecutive duplicates, or fewer than three distinct points
    /// are present. Simplicity is checked separately by [`Ring::validate_simple`].
    pub fn new(points: Vec<Coord<f64>>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(UnionError::InvalidRing(format!(
                "non-finite coordinate ({}, {})",
                bad.x, bad.y
            )));
        }
        if points.len() < 2 || points.first() != points.last() {
            return Err(UnionError::InvalidRing("ring is not closed".into()));
        }

        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(points.len());
        for c in points {
            let c = Coord { x: c.x + 0.0, y: c.y + 0.0 };
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }

        if coords.len() < 4 {
            return Err(UnionError::InvalidRing(format!(
                "{} coordinates after removing duplicates, at least 4 required",
                coords.len()
            )));
        }
        let distinct: AHashSet<(u64, u64)> = coords.iter().map(|&c| coord_key(c)).collect();
        if distinct.len() < 3 {
            return Err(UnionError::InvalidRing(format!(
                "{} distinct points, at least 3 required",
                distinct.len()
            )));
        }

        Ok(Self { coords })
    }

    /// Build from coordinates already known to be closed and duplicate-free.
    pub(crate) fn from_closed(coords: Vec<Coord<f64>>) -> Self {
        debug_assert!(coords.len() >= 4 && coords.first() == coords.last());
        Self { coords }
    }

    /// Closed coordinate sequence (first point repeated at the end).
    pub fn coords(&self) -> &[Coord<f64>] { &self.coords }

    /// Number of distinct vertices (the closing point is not counted).
    pub fn num_vertices(&self) -> usize { self.coords.len() - 1 }

    pub fn into_coords(self) -> Vec<Coord<f64>> { self.coords }

    /// Shoelace area, positive when counter-clockwise.
    pub fn signed_area(&self) -> f64 { signed_area(&self.coords) }

    pub fn area(&self) -> f64 { self.signed_area().abs() }

    pub fn is_ccw(&self) -> bool { self.signed_area() > 0.0 }

    pub fn bbox(&self) -> Rect<f64> {
        // A validated ring is never empty.
        coords_bounds(&self.coords).unwrap_or_else(|| Rect::new(Coord::zero(), Coord::zero()))
    }

    /// Locate a point relative to this ring, reporting boundary hits explicitly.
    pub fn locate(&self, p: Coord<f64>) -> Location { locate_point(p, &self.coords) }

    /// The same ring traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self { coords: self.coords.iter().rev().copied().collect() }
    }

    /// Orient the ring counter-clockwise (`ccw = true`) or clockwise.
    pub(crate) fn oriented(self, ccw: bool) -> Self {
        if (self.signed_area() > 0.0) == ccw { self } else { self.reversed() }
    }

    /// Fails with [`UnionError::SelfIntersectingInput`] if edges cross or touch
    /// anywhere other than at the vertex shared by consecutive edges.
    pub fn validate_simple(&self) -> Result<()> {
        match find_self_intersection(&self.coords) {
            None => Ok(()),
            Some(at) => Err(UnionError::SelfIntersectingInput { operand: None, at }),
        }
    }
}

impl From<&Ring> for LineString<f64> {
    fn from(ring: &Ring) -> Self {
        LineString::new(ring.coords.clone())
    }
}

impl TryFrom<LineString<f64>> for Ring {
    type Error = UnionError;

    fn try_from(line: LineString<f64>) -> Result<Self> {
        Ring::new(line.0)
    }
}
