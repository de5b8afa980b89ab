use geo::{Coord, Intersects, Rect};

use crate::bbox::merge_bounds;
use crate::error::{Result, UnionError};
use crate::predicates::Location;
use crate::ring::Ring;
use crate::simple::{find_crossing, segment_tree};

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// An outer ring plus zero or more holes.
///
/// The outer ring is stored counter-clockwise and every hole clockwise, so
/// the interior is always to the left of each directed edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    /// Validate hole placement and normalize orientation.
    ///
    /// Fails with [`UnionError::InvalidPolygon`] if a hole is not contained
    /// in the outer ring or two holes overlap. Holes may touch the outer ring
    /// or each other at isolated points.
    pub fn new(outer: Ring, holes: Vec<Ring>) -> Result<Self> {
        let outer_tree = segment_tree(outer.coords());

        for (h, hole) in holes.iter().enumerate() {
            if !ring_within(hole, &outer) {
                return Err(UnionError::InvalidPolygon(format!(
                    "hole {h} is not contained in the outer ring"
                )));
            }
            if let Some(at) = find_crossing(outer.coords(), &outer_tree, hole.coords()) {
                return Err(UnionError::InvalidPolygon(format!(
                    "hole {h} crosses the outer ring near ({}, {})",
                    at.x, at.y
                )));
            }
        }

        for (i, a) in holes.iter().enumerate() {
            let tree = segment_tree(a.coords());
            for (j, b) in holes.iter().enumerate().skip(i + 1) {
                if bboxes_intersect(a, b)
                    && (find_crossing(a.coords(), &tree, b.coords()).is_some()
                        || ring_overlaps_interior(a, b)
                        || ring_overlaps_interior(b, a))
                {
                    return Err(UnionError::InvalidPolygon(format!("holes {i} and {j} overlap")));
                }
            }
        }

        Ok(Self::from_parts(outer, holes))
    }

    /// Assemble without containment checks, only normalizing orientation.
    pub(crate) fn from_parts(outer: Ring, holes: Vec<Ring>) -> Self {
        Self {
            outer: outer.oriented(true),
            holes: holes.into_iter().map(|h| h.oriented(false)).collect(),
        }
    }

    /// Build from raw coordinate rings: the first is the outer ring.
    pub fn from_coords(outer: Vec<Coord<f64>>, holes: Vec<Vec<Coord<f64>>>) -> Result<Self> {
        let outer = Ring::new(outer)?;
        let holes = holes.into_iter().map(Ring::new).collect::<Result<Vec<_>>>()?;
        Self::new(outer, holes)
    }

    pub fn outer(&self) -> &Ring { &self.outer }

    pub fn holes(&self) -> &[Ring] { &self.holes }

    /// Outer ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Outer area minus hole areas.
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(Ring::area).sum::<f64>()
    }

    pub fn bbox(&self) -> Rect<f64> { self.outer.bbox() }

    /// Locate a point relative to the polygon's area: hole interiors count as
    /// outside, and hole boundaries as boundary.
    pub fn locate(&self, p: Coord<f64>) -> Location {
        match self.outer.locate(p) {
            Location::Inside => {}
            other => return other,
        }
        for hole in &self.holes {
            match hole.locate(p) {
                Location::Outside => {}
                Location::Inside => return Location::Outside,
                Location::Boundary => return Location::Boundary,
            }
        }
        Location::Inside
    }

    /// Fails with [`UnionError::SelfIntersectingInput`] if any ring is not simple.
    pub fn validate_simple(&self) -> Result<()> {
        self.rings().try_for_each(Ring::validate_simple)
    }
}

/// Every vertex of `inner` is inside or on `outer`, and every edge midpoint
/// is strictly inside.
fn ring_within(inner: &Ring, outer: &Ring) -> bool {
    let coords = inner.coords();
    coords.iter().all(|&c| outer.locate(c) != Location::Outside)
        && coords.windows(2).all(|w| outer.locate(midpoint(w[0], w[1])) == Location::Inside)
}

/// Some vertex or edge midpoint of `a` lies strictly inside `b`.
fn ring_overlaps_interior(a: &Ring, b: &Ring) -> bool {
    let coords = a.coords();
    coords.iter().any(|&c| b.locate(c) == Location::Inside)
        || coords.windows(2).any(|w| b.locate(midpoint(w[0], w[1])) == Location::Inside)
}

#[inline]
pub(crate) fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord { x: (a.x + b.x) / 2.0, y: (a.y + b.y) / 2.0 }
}

fn bboxes_intersect(a: &Ring, b: &Ring) -> bool {
    a.bbox().intersects(&b.bbox())
}

// ---------------------------------------------------------------------------
// MultiPolygon / Geometry
// ---------------------------------------------------------------------------

/// An ordered set of polygons whose interiors do not overlap.
///
/// Disjointness is not re-checked on construction; union results uphold it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self { Self { polygons } }

    pub fn polygons(&self) -> &[Polygon] { &self.polygons }

    pub fn into_polygons(self) -> Vec<Polygon> { self.polygons }

    pub fn len(&self) -> usize { self.polygons.len() }

    pub fn is_empty(&self) -> bool { self.polygons.is_empty() }

    pub fn area(&self) -> f64 { self.polygons.iter().map(Polygon::area).sum() }
}

/// A union operand or result.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Geometry {
    /// Wrap a list of polygons: exactly one gives `Polygon`, anything else
    /// `MultiPolygon`.
    pub fn from_polygons(mut polygons: Vec<Polygon>) -> Self {
        if polygons.len() == 1 {
            if let Some(p) = polygons.pop() {
                return Geometry::Polygon(p);
            }
        }
        Geometry::MultiPolygon(MultiPolygon::new(polygons))
    }

    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(mp) => mp.polygons(),
        }
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        match self {
            Geometry::Polygon(p) => vec![p],
            Geometry::MultiPolygon(mp) => mp.into_polygons(),
        }
    }

    pub fn num_polygons(&self) -> usize { self.polygons().len() }

    pub fn area(&self) -> f64 { self.polygons().iter().map(Polygon::area).sum() }

    /// Bounding box over all polygons, `None` for an empty multi-polygon.
    pub fn bbox(&self) -> Option<Rect<f64>> {
        self.polygons().iter().map(Polygon::bbox).reduce(merge_bounds)
    }

    /// GeoJSON type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Locate a point against all polygons.
    pub fn locate(&self, p: Coord<f64>) -> Location {
        let mut loc = Location::Outside;
        for poly in self.polygons() {
            match poly.locate(p) {
                Location::Inside => return Location::Inside,
                Location::Boundary => loc = Location::Boundary,
                Location::Outside => {}
            }
        }
        loc
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self { Geometry::Polygon(p) }
}

impl From<MultiPolygon> for Geometry {
    fn from(mp: MultiPolygon) -> Self { Geometry::MultiPolygon(mp) }
}

// ---------------------------------------------------------------------------
// geo conversions
// ---------------------------------------------------------------------------

impl From<&Polygon> for geo::Polygon<f64> {
    fn from(p: &Polygon) -> Self {
        geo::Polygon::new(p.outer().into(), p.holes().iter().map(Into::into).collect())
    }
}

impl TryFrom<geo::Polygon<f64>> for Polygon {
    type Error = UnionError;

    fn try_from(p: geo::Polygon<f64>) -> Result<Self> {
        let (exterior, interiors) = p.into_inner();
        let outer = Ring::try_from(exterior)?;
        let holes = interiors.into_iter().map(Ring::try_from).collect::<Result<Vec<_>>>()?;
        Polygon::new(outer, holes)
    }
}

impl From<&Geometry> for geo::MultiPolygon<f64> {
    fn from(g: &Geometry) -> Self {
        geo::MultiPolygon::new(g.polygons().iter().map(Into::into).collect())
    }
}

impl TryFrom<geo::MultiPolygon<f64>> for Geometry {
    type Error = UnionError;

    fn try_from(mp: geo::MultiPolygon<f64>) -> Result<Self> {
        let polygons = mp.into_iter().map(Polygon::try_from).collect::<Result<Vec<_>>>()?;
        Ok(Geometry::from_polygons(polygons))
    }
}
