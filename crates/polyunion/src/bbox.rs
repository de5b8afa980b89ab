use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, tagged with the index of the segment or ring
/// it was computed from.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Box around the segment `a → b`.
    pub(crate) fn segment(idx: usize, a: Coord<f64>, b: Coord<f64>) -> Self {
        Self::new(idx, Rect::new(a, b))
    }

    /// Index of the segment or ring this box belongs to.
    pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Envelope of the segment `a → b`, for querying a tree of [`BoundingBox`]es.
#[inline]
pub(crate) fn segment_envelope(a: Coord<f64>, b: Coord<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([a.x, a.y], [b.x, b.y])
}

/// Bounding rectangle of a coordinate sequence; `None` when empty.
pub(crate) fn coords_bounds(coords: &[Coord<f64>]) -> Option<Rect<f64>> {
    let first = *coords.first()?;
    let (min, max) = coords.iter().skip(1).fold((first, first), |(min, max), c| {
        (
            Coord { x: min.x.min(c.x), y: min.y.min(c.y) },
            Coord { x: max.x.max(c.x), y: max.y.max(c.y) },
        )
    });
    Some(Rect::new(min, max))
}

/// Smallest rectangle covering both `a` and `b`.
pub(crate) fn merge_bounds(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}
