#![doc = "Dissolve member polygons into one boundary per group"]
//!
//! Records (a group key plus a member polygon) are grouped in first-seen
//! key order, members failing validation are excluded with a diagnostic, and
//! the rest are merged with [`polyunion`]'s sweep-line union.
//!
//! ```
//! use dissolve::{DissolveConfig, Dissolver, RawPolygon, Record};
//! use geo::Coord;
//!
//! let square = |x: f64| {
//!     let c = |x, y| Coord { x, y };
//!     RawPolygon::new(vec![c(x, 0.0), c(x + 1.0, 0.0), c(x + 1.0, 1.0), c(x, 1.0), c(x, 0.0)], vec![])
//! };
//! let records = vec![Record::new("Salta", square(0.0)), Record::new("Salta", square(1.0))];
//!
//! let output = Dissolver::new(DissolveConfig::default()).run(records);
//! assert_eq!(output.results[0].geometry.area(), 2.0);
//! ```
mod config;
mod diagnostics;
mod dissolve;
mod error;
mod group;
mod reduce;

pub mod io;

pub use polyunion;

#[doc(inline)]
pub use config::{DissolveConfig, Strategy};

#[doc(inline)]
pub use diagnostics::{Diagnostic, DiagnosticKind};

#[doc(inline)]
pub use dissolve::{DissolveOutput, Dissolver, GroupResult};

#[doc(inline)]
pub use error::DissolveError;

#[doc(inline)]
pub use group::{group_records, Group, Member, RawPolygon, Record};
