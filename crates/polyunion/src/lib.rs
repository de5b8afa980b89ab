//! Boolean union of planar polygons.
//!
//! Two operands (each a [`Polygon`] or [`MultiPolygon`]) are merged with a
//! Martinez–Rueda plane sweep: edges are split at every mutual intersection,
//! classified against the other operand, and the surviving boundary is traced
//! back into rings. Shared edges cancel, so adjacent polygons merge into one
//! outline; disjoint pieces come back as a multi-polygon.
//!
//! ```
//! use geo::Coord;
//! use polyunion::{union_polygons, Polygon, UnionOptions};
//!
//! let square = |x0: f64| {
//!     let pts = [(x0, 0.0), (x0 + 1.0, 0.0), (x0 + 1.0, 1.0), (x0, 1.0), (x0, 0.0)];
//!     Polygon::from_coords(pts.iter().map(|&(x, y)| Coord { x, y }).collect(), vec![]).unwrap()
//! };
//! let merged = union_polygons(&square(0.0), &square(1.0), &UnionOptions::default()).unwrap();
//! assert_eq!(merged.geometry.kind(), "Polygon");
//! assert_eq!(merged.geometry.area(), 2.0);
//! ```

mod bbox;
mod cancel;
mod connect;
mod error;
mod options;
mod polygon;
mod predicates;
mod ring;
mod simple;
mod snap;
mod sweep;
mod union;

pub use cancel::CancelToken;
pub use error::{Operand, Result, UnionError};
pub use options::UnionOptions;
pub use polygon::{Geometry, MultiPolygon, Polygon};
pub use predicates::{locate_point, signed_area, Location};
pub use ring::Ring;
pub use union::{union, union_polygons, UnionResult, Warning};

/// A planar point; coordinates are compared exactly.
pub type Point = geo::Coord<f64>;
