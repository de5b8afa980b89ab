use polyunion::UnionError;
use thiserror::Error;

/// Failures of a whole group, or of one pairwise step inside it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DissolveError {
    #[error("group '{key}' has no valid members left after filtering")]
    EmptyGroupAfterFiltering { key: String },

    #[error("group '{key}' was cancelled")]
    Cancelled { key: String },

    /// A pairwise union failed; `left` and `right` list the member indices
    /// merged into each operand.
    #[error("union of members {left:?} with {right:?} failed: {source}")]
    Step {
        left: Vec<usize>,
        right: Vec<usize>,
        #[source]
        source: UnionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_message_lists_members() {
        let err = DissolveError::Step {
            left: vec![0, 1],
            right: vec![2],
            source: UnionError::Reconstruction("boundary walk stuck".into()),
        };
        assert_eq!(
            err.to_string(),
            "union of members [0, 1] with [2] failed: ring reconstruction failed: boundary walk stuck"
        );
    }
}
