// Integration tests for pairwise union: merging adjacent polygons, holes,
// disjoint components, and the algebraic properties a union must keep.

use approx::assert_relative_eq;
use geo::{Area, Contains};
use polyunion::{union, Geometry, Location, Polygon, UnionError, UnionOptions};

fn c(x: f64, y: f64) -> geo::Coord<f64> { geo::Coord { x, y } }

fn poly(outer: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> Polygon {
    let ring = |pts: &[(f64, f64)]| pts.iter().map(|&(x, y)| c(x, y)).collect::<Vec<_>>();
    Polygon::from_coords(ring(outer), holes.iter().map(|h| ring(h)).collect()).unwrap()
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    poly(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], &[])
}

fn merge(a: &Polygon, b: &Polygon) -> Geometry {
    union(&a.clone().into(), &b.clone().into(), &UnionOptions::default()).unwrap().geometry
}

fn merge_all(polys: &[Polygon]) -> Geometry {
    let mut acc: Geometry = polys[0].clone().into();
    for p in &polys[1..] {
        acc = union(&acc, &p.clone().into(), &UnionOptions::default()).unwrap().geometry;
    }
    acc
}

fn outer_points(g: &Geometry) -> Vec<(f64, f64)> {
    g.polygons()[0].outer().coords().iter().map(|p| (p.x, p.y)).collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn adjacent_unit_squares_merge_into_a_rectangle() {
    let a = poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)], &[]);
    let b = poly(&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.0)], &[]);
    let g = merge(&a, &b);

    assert_eq!(g.kind(), "Polygon");
    assert_eq!(
        outer_points(&g),
        vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0), (0.0, 0.0)]
    );
    assert_relative_eq!(g.area(), 2.0);
}

#[test]
fn three_disjoint_squares_stay_separate() {
    let squares = [rect(0.0, 0.0, 1.0, 1.0), rect(3.0, 0.0, 4.0, 1.0), rect(0.0, 5.0, 1.0, 6.0)];
    let g = merge_all(&squares);
    assert_eq!(g.kind(), "MultiPolygon");
    assert_eq!(g.num_polygons(), 3);
    assert_relative_eq!(g.area(), 3.0);
}

#[test]
fn closing_a_u_shape_creates_a_hole() {
    let u = poly(
        &[
            (0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (2.0, 2.0), (2.0, 1.0),
            (1.0, 1.0), (1.0, 2.0), (0.0, 2.0), (0.0, 0.0),
        ],
        &[],
    );
    let lid = rect(0.0, 2.0, 3.0, 3.0);
    let g = merge(&u, &lid);

    assert_eq!(g.kind(), "Polygon");
    let p = &g.polygons()[0];
    assert_eq!(p.outer().num_vertices(), 4);
    assert_eq!(p.holes().len(), 1);
    assert_relative_eq!(p.holes()[0].area(), 1.0);
    assert_relative_eq!(g.area(), 8.0);
    assert_eq!(g.locate(c(1.5, 1.5)), Location::Outside);
}

#[test]
fn plugging_a_hole_removes_it() {
    let frame = poly(
        &[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0), (0.0, 0.0)],
        &[&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)]],
    );
    let plug = rect(1.0, 1.0, 2.0, 2.0);
    let g = merge(&frame, &plug);

    assert_eq!(g.kind(), "Polygon");
    assert!(g.polygons()[0].holes().is_empty());
    assert_relative_eq!(g.area(), 9.0);
}

#[test]
fn contained_polygon_leaves_container_unchanged() {
    let big = rect(0.0, 0.0, 4.0, 4.0);
    let small = rect(1.0, 1.0, 2.0, 3.0);
    let g = merge(&small, &big);
    assert_eq!(outer_points(&g), vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
}

#[test]
fn corner_touch_gives_two_polygons() {
    let g = merge(&rect(0.0, 0.0, 1.0, 1.0), &rect(1.0, 1.0, 2.0, 2.0));
    assert_eq!(g.kind(), "MultiPolygon");
    assert_eq!(g.num_polygons(), 2);
    assert_relative_eq!(g.area(), 2.0);
}

#[test]
fn overlapping_squares() {
    let g = merge(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 1.0, 3.0, 3.0));
    assert_eq!(g.kind(), "Polygon");
    assert_eq!(g.polygons()[0].outer().num_vertices(), 8);
    assert_relative_eq!(g.area(), 7.0);
}

#[test]
fn partial_shared_edge() {
    let g = merge(&rect(0.0, 0.0, 2.0, 1.0), &rect(0.5, 1.0, 1.5, 2.0));
    assert_eq!(g.kind(), "Polygon");
    assert_eq!(
        outer_points(&g),
        vec![
            (0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.5, 1.0), (1.5, 2.0),
            (0.5, 2.0), (0.5, 1.0), (0.0, 1.0), (0.0, 0.0),
        ]
    );
    assert_relative_eq!(g.area(), 3.0);
}

#[test]
fn crossing_triangles_match_geo_area() {
    let up = poly(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0), (0.0, 0.0)], &[]);
    let down = poly(&[(0.0, 3.0), (2.0, -1.0), (4.0, 3.0), (0.0, 3.0)], &[]);
    let g = merge(&up, &down);

    let as_geo: geo::MultiPolygon<f64> = (&g).into();
    assert_relative_eq!(as_geo.unsigned_area(), g.area(), epsilon = 1e-9);
    assert!(g.area() < up.area() + down.area());
    assert!(g.area() > up.area().max(down.area()));
    assert_eq!(g.kind(), "Polygon");
}

#[test]
fn boundary_vertices_are_kept_without_simplification() {
    let options = UnionOptions { simplify_collinear: false, ..UnionOptions::default() };
    let res = union(&rect(0.0, 0.0, 1.0, 1.0).into(), &rect(1.0, 0.0, 2.0, 1.0).into(), &options).unwrap();
    let ring = res.geometry.polygons()[0].outer().coords().to_vec();

    assert_eq!(ring.len(), 7);
    // The shared edge itself is gone.
    for w in ring.windows(2) {
        let vertical_at_one = w[0].x == 1.0 && w[1].x == 1.0;
        assert!(!vertical_at_one, "shared edge survived: {:?}", w);
    }
}

#[test]
fn self_intersecting_operand_is_reported() {
    let bowtie = Polygon::from_coords(
        vec![c(0.0, 0.0), c(2.0, 2.0), c(2.0, 0.0), c(0.0, 2.0), c(0.0, 0.0)],
        vec![],
    )
    .unwrap();
    let err = union(&bowtie.into(), &rect(5.0, 5.0, 6.0, 6.0).into(), &UnionOptions::default())
        .unwrap_err();
    assert!(matches!(err, UnionError::SelfIntersectingInput { .. }));
    assert!(err.to_string().contains("left operand"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn union_with_itself_is_idempotent() {
    let shapes = [
        poly(&[(0.0, 0.0), (4.0, 1.0), (3.0, 5.0), (1.0, 4.0), (0.0, 0.0)], &[]),
        poly(
            &[(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0), (0.0, 0.0)],
            &[&[(2.0, 2.0), (4.0, 2.0), (3.0, 4.0), (2.0, 2.0)]],
        ),
        // (1, 0) is a pass-through vertex of the input.
        poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)], &[]),
    ];
    for shape in &shapes {
        let g = merge(shape, shape);
        assert_eq!(g.kind(), "Polygon");
        assert_relative_eq!(g.area(), shape.area());

        let mut before: Vec<(u64, u64)> =
            shape.outer().coords()[1..].iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect();
        let mut after: Vec<(u64, u64)> = g.polygons()[0].outer().coords()[1..]
            .iter()
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert_eq!(g.polygons()[0].holes().len(), shape.holes().len());
    }
}

#[test]
fn fold_order_does_not_change_area() {
    // A 2x2 block of mutually adjacent cells plus a sliver on top.
    let cells = [
        rect(0.0, 0.0, 1.0, 1.0),
        rect(1.0, 0.0, 2.0, 1.0),
        rect(0.0, 1.0, 1.0, 2.0),
        rect(1.0, 1.0, 2.0, 2.0),
        rect(0.5, 2.0, 1.5, 2.5),
    ];
    let forward = merge_all(&cells);
    let reversed: Vec<Polygon> = cells.iter().rev().cloned().collect();
    let backward = merge_all(&reversed);
    let pairs = union(
        &merge(&cells[0], &cells[3]),
        &merge_all(&[cells[1].clone(), cells[2].clone(), cells[4].clone()]),
        &UnionOptions::default(),
    )
    .unwrap()
    .geometry;

    assert_relative_eq!(forward.area(), 4.5);
    assert_relative_eq!(backward.area(), forward.area());
    assert_relative_eq!(pairs.area(), forward.area());
    assert_eq!(forward.kind(), "Polygon");
    assert_eq!(forward.polygons()[0].outer().num_vertices(), 8);
}

#[test]
fn union_area_is_bounded_by_member_sum() {
    let cases = [
        (rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0), false),
        (rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0), true),
        (rect(0.0, 0.0, 1.0, 1.0), rect(2.0, 2.0, 3.0, 3.0), true),
    ];
    for (a, b, disjoint) in cases {
        let g = merge(&a, &b);
        let sum = a.area() + b.area();
        assert!(g.area() <= sum + 1e-12);
        if disjoint {
            assert_relative_eq!(g.area(), sum);
        } else {
            assert!(g.area() < sum);
        }
    }
}

#[test]
fn every_member_lies_within_the_union() {
    let members = [
        rect(0.0, 0.0, 2.0, 1.0),
        rect(0.5, 1.0, 1.5, 2.0),
        poly(&[(2.0, 0.0), (4.0, 0.0), (2.0, 1.0), (2.0, 0.0)], &[]),
        rect(10.0, 10.0, 11.0, 11.0),
    ];
    let g = merge_all(&members);
    let as_geo: geo::MultiPolygon<f64> = (&g).into();

    for m in &members {
        let member: geo::Polygon<f64> = m.into();
        assert!(as_geo.contains(&member), "member {:?} escapes the union", m.bbox());
    }
    assert_eq!(g.num_polygons(), 2);
}
