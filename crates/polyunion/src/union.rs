use std::fmt;

use ahash::AHashSet;
use geo::{Coord, Rect};
use tracing::{debug, warn};

use crate::connect::{build_polygons, normalize_polygons, Finish};
use crate::error::{Operand, Result, UnionError};
use crate::options::UnionOptions;
use crate::polygon::{Geometry, Polygon};
use crate::predicates::{coord_key, orient};
use crate::ring::Ring;
use crate::snap::Snapper;
use crate::sweep::union_edges;

/// A non-fatal degeneracy met while computing a union.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A ring collapsed while snapping and was left out. `ring` 0 is the
    /// outer ring; dropping it drops the whole polygon.
    CollapsedRing { operand: Operand, polygon: usize, ring: usize },
    /// A traced output loop enclosed no area.
    ZeroAreaLoop { at: Coord<f64> },
    /// A traced hole had no shell around it.
    OrphanHole { at: Coord<f64> },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CollapsedRing { operand, polygon, ring: 0 } => {
                write!(f, "outer ring of polygon {polygon} in {operand} operand collapsed while snapping")
            }
            Warning::CollapsedRing { operand, polygon, ring } => {
                write!(f, "hole {ring} of polygon {polygon} in {operand} operand collapsed while snapping")
            }
            Warning::ZeroAreaLoop { at } => {
                write!(f, "zero-area loop near ({}, {}) dropped from output", at.x, at.y)
            }
            Warning::OrphanHole { at } => {
                write!(f, "hole near ({}, {}) has no enclosing shell", at.x, at.y)
            }
        }
    }
}

/// The union geometry plus the degeneracies met on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionResult {
    pub geometry: Geometry,
    pub warnings: Vec<Warning>,
}

/// Union of two polygon sets.
///
/// Both operands are snapped (when `options.snap_tolerance > 0`), checked for
/// simple rings and swept together. The result is a `Polygon` when one
/// component remains and a `MultiPolygon` otherwise.
///
/// # Errors
///
/// * [`UnionError::DegenerateUnion`] if an operand has no area after snapping.
/// * [`UnionError::SelfIntersectingInput`] if an operand ring is not simple.
/// * [`UnionError::Reconstruction`] if the output rings cannot be traced or
///   fail validation.
/// * [`UnionError::Cancelled`] if the cancel token fires.
pub fn union(a: &Geometry, b: &Geometry, options: &UnionOptions) -> Result<UnionResult> {
    options.check_cancelled()?;
    let mut warnings = Vec::new();

    let (left, right) = if options.snap_tolerance > 0.0 {
        let mut snapper = Snapper::new(options.snap_tolerance);
        let left = snap_operand(a.polygons(), Operand::Left, &mut snapper, &mut warnings);
        let right = snap_operand(b.polygons(), Operand::Right, &mut snapper, &mut warnings);
        (left, right)
    } else {
        (a.polygons().to_vec(), b.polygons().to_vec())
    };

    for (polys, operand) in [(&left, Operand::Left), (&right, Operand::Right)] {
        for poly in polys.iter() {
            poly.validate_simple().map_err(|err| match err {
                UnionError::SelfIntersectingInput { at, .. } => {
                    UnionError::SelfIntersectingInput { operand: Some(operand), at }
                }
                other => other,
            })?;
        }
        let area: f64 = polys.iter().map(Polygon::area).sum();
        if polys.is_empty() || area <= 0.0 {
            return Err(UnionError::DegenerateUnion { operand });
        }
    }

    let pinned = pass_through_vertices(left.iter().chain(&right));
    let finish = Finish {
        simplify_collinear: options.simplify_collinear,
        validate_output: options.validate_output,
        pinned: Some(&pinned),
    };

    let polygons = if bounds_disjoint(&left, &right) {
        debug!(left = left.len(), right = right.len(), "operands are disjoint, skipping sweep");
        normalize_polygons(left.into_iter().chain(right).collect(), finish)?
    } else {
        let (edges, stats) = union_edges(&left, &right, options)?;
        debug!(
            input_edges = stats.input_edges,
            events = stats.events,
            intersections = stats.intersections,
            output_edges = stats.output_edges,
            "sweep finished"
        );
        build_polygons(&edges, finish, &mut warnings)?
    };

    if polygons.is_empty() {
        return Err(UnionError::Reconstruction("union produced no polygons".into()));
    }

    Ok(UnionResult { geometry: Geometry::from_polygons(polygons), warnings })
}

/// Union of two single polygons.
pub fn union_polygons(a: &Polygon, b: &Polygon, options: &UnionOptions) -> Result<UnionResult> {
    union(&Geometry::Polygon(a.clone()), &Geometry::Polygon(b.clone()), options)
}

/// Snap all rings of one operand through a shared snapper, dropping rings
/// that collapse. Hole containment is not re-validated.
fn snap_operand(
    polygons: &[Polygon],
    operand: Operand,
    snapper: &mut Snapper,
    warnings: &mut Vec<Warning>,
) -> Vec<Polygon> {
    let mut out = Vec::with_capacity(polygons.len());
    for (p, poly) in polygons.iter().enumerate() {
        let mut rings = poly.rings().enumerate().map(|(r, ring)| {
            let snapped = Ring::new(snapper.snap_ring(ring.coords()));
            (r, snapped)
        });

        let Some((_, outer)) = rings.next() else { continue };
        let outer = match outer {
            Ok(outer) => outer,
            Err(_) => {
                warn!(%operand, polygon = p, "outer ring collapsed while snapping");
                warnings.push(Warning::CollapsedRing { operand, polygon: p, ring: 0 });
                // Consume the holes so their vertices still register.
                rings.for_each(drop);
                continue;
            }
        };

        let mut holes = Vec::new();
        for (r, hole) in rings {
            match hole {
                Ok(hole) => holes.push(hole),
                Err(_) => {
                    warn!(%operand, polygon = p, ring = r, "hole collapsed while snapping");
                    warnings.push(Warning::CollapsedRing { operand, polygon: p, ring: r });
                }
            }
        }
        out.push(Polygon::from_parts(outer, holes));
    }
    out
}

/// Vertices that already lie on the line through their ring neighbours in an
/// operand. Collinear simplification keeps these, so only vertices the union
/// itself made redundant are removed.
fn pass_through_vertices<'a>(polygons: impl Iterator<Item = &'a Polygon>) -> AHashSet<(u64, u64)> {
    let mut pinned = AHashSet::new();
    for ring in polygons.flat_map(Polygon::rings) {
        let coords = ring.coords();
        let pts = &coords[..coords.len() - 1];
        let n = pts.len();
        for i in 0..n {
            if orient(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]) == 0.0 {
                pinned.insert(coord_key(pts[i]));
            }
        }
    }
    pinned
}

fn operand_bounds(polys: &[Polygon]) -> Option<Rect<f64>> {
    polys.iter().map(Polygon::bbox).reduce(crate::bbox::merge_bounds)
}

/// The operands' bounding boxes are separated by a gap, so no boundary can
/// be shared.
fn bounds_disjoint(left: &[Polygon], right: &[Polygon]) -> bool {
    match (operand_bounds(left), operand_bounds(right)) {
        (Some(a), Some(b)) => {
            a.max().x < b.min().x || b.max().x < a.min().x || a.max().y < b.min().y || b.max().y < a.min().y
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::CancelToken;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        let pts = [(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size), (x0, y0)];
        Polygon::from_coords(pts.iter().map(|&(x, y)| Coord { x, y }).collect(), vec![]).unwrap()
    }

    #[test]
    fn disjoint_operands_skip_the_sweep() {
        let res = union_polygons(&square(5.0, 5.0, 1.0), &square(0.0, 0.0, 1.0), &UnionOptions::default())
            .unwrap();
        assert_eq!(res.geometry.num_polygons(), 2);
        assert_eq!(res.geometry.polygons()[0].outer().coords()[0], Coord { x: 0.0, y: 0.0 });
        assert_relative_eq!(res.geometry.area(), 2.0);
    }

    #[test]
    fn bowtie_operand_is_rejected_with_side() {
        let bowtie = Polygon::from_parts(
            Ring::new(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 2.0, y: 2.0 },
                Coord { x: 2.0, y: 0.0 },
                Coord { x: 0.0, y: 2.0 },
                Coord { x: 0.0, y: 0.0 },
            ])
            .unwrap(),
            vec![],
        );
        let err = union_polygons(&square(0.0, 0.0, 1.0), &bowtie, &UnionOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            UnionError::SelfIntersectingInput { operand: Some(Operand::Right), .. }
        ));
    }

    #[test]
    fn empty_operand_is_degenerate() {
        let empty = Geometry::MultiPolygon(Default::default());
        let err = union(&empty, &Geometry::Polygon(square(0.0, 0.0, 1.0)), &UnionOptions::default())
            .unwrap_err();
        assert_eq!(err, UnionError::DegenerateUnion { operand: Operand::Left });
    }

    #[test]
    fn sliver_collapses_under_snapping() {
        let sliver = Polygon::from_coords(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 0.001 },
                Coord { x: 0.0, y: 0.0 },
            ],
            vec![],
        )
        .unwrap();
        let options = UnionOptions::default().with_snap_tolerance(0.01);
        let err = union_polygons(&sliver, &square(0.0, 0.0, 1.0), &options).unwrap_err();
        assert_eq!(err, UnionError::DegenerateUnion { operand: Operand::Left });
    }

    #[test]
    fn snapping_closes_a_hairline_gap() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.000001, 0.0, 1.0);
        let exact = union_polygons(&a, &b, &UnionOptions::default()).unwrap();
        assert_eq!(exact.geometry.num_polygons(), 2);

        let snapped = union_polygons(&a, &b, &UnionOptions::default().with_snap_tolerance(1e-4)).unwrap();
        assert_eq!(snapped.geometry.kind(), "Polygon");
        assert_eq!(snapped.geometry.polygons()[0].outer().num_vertices(), 4);
        assert_relative_eq!(snapped.geometry.area(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn huge_coordinates_over_tiny_tolerance_do_not_overflow() {
        let options = UnionOptions::default().with_snap_tolerance(1e-18);
        let res = union_polygons(&square(0.0, 0.0, 70.0), &square(70.0, 0.0, 70.0), &options).unwrap();
        assert_eq!(res.geometry.kind(), "Polygon");
        assert_relative_eq!(res.geometry.area(), 9800.0);
    }

    #[test]
    fn input_pass_through_vertices_survive_simplification() {
        let notched = Polygon::from_coords(
            [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0), (0.0, 0.0)]
                .iter()
                .map(|&(x, y)| Coord { x, y })
                .collect(),
            vec![],
        )
        .unwrap();
        let res = union_polygons(&notched, &square(2.0, 0.0, 1.0), &UnionOptions::default()).unwrap();
        let outer: Vec<(f64, f64)> =
            res.geometry.polygons()[0].outer().coords().iter().map(|c| (c.x, c.y)).collect();
        // (1, 0) came from the input; (2, 0) and (2, 1) only became
        // redundant through the merge.
        assert_eq!(outer, vec![(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (3.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
    }

    #[test]
    fn cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let err = union_polygons(
            &square(0.0, 0.0, 1.0),
            &square(0.5, 0.0, 1.0),
            &UnionOptions::default().with_cancel(token),
        )
        .unwrap_err();
        assert_eq!(err, UnionError::Cancelled);
    }

    #[test]
    fn warnings_render() {
        let w = Warning::CollapsedRing { operand: Operand::Left, polygon: 2, ring: 0 };
        assert_eq!(w.to_string(), "outer ring of polygon 2 in left operand collapsed while snapping");
        let w = Warning::OrphanHole { at: Coord { x: 1.0, y: 2.5 } };
        assert_eq!(w.to_string(), "hole near (1, 2.5) has no enclosing shell");
    }
}
