use std::fmt;

use geo::Coord;
use thiserror::Error;

/// Result type for polygon construction and union operations.
pub type Result<T> = std::result::Result<T, UnionError>;

/// One side of a pairwise union.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// The first (subject) operand.
    Left,
    /// The second (clipping) operand.
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Left => write!(f, "left"),
            Operand::Right => write!(f, "right"),
        }
    }
}

/// Errors raised while building primitives or computing a union.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnionError {
    #[error("invalid ring: {0}")]
    InvalidRing(String),

    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("self-intersecting ring{} near {}", operand_suffix(.operand), fmt_coord(.at))]
    SelfIntersectingInput { operand: Option<Operand>, at: Coord<f64> },

    #[error("{operand} operand has no area left after validation")]
    DegenerateUnion { operand: Operand },

    #[error("ring reconstruction failed: {0}")]
    Reconstruction(String),

    #[error("union cancelled")]
    Cancelled,
}

fn fmt_coord(at: &Coord<f64>) -> String {
    format!("({}, {})", at.x, at.y)
}

fn operand_suffix(operand: &Option<Operand>) -> String {
    match operand {
        Some(side) => format!(" in {side} operand"),
        None => String::new(),
    }
}

impl UnionError {
    /// Returns `true` for failures local to a single input polygon, which a
    /// caller can recover from by excluding that polygon.
    pub fn is_member_local(&self) -> bool {
        matches!(
            self,
            UnionError::InvalidRing(_)
                | UnionError::InvalidPolygon(_)
                | UnionError::SelfIntersectingInput { .. }
        )
    }
}
