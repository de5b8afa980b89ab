use crate::cancel::CancelToken;

/// Knobs for a single pairwise [`crate::union`].
#[derive(Clone, Debug)]
pub struct UnionOptions {
    /// Vertices closer than this are merged before the sweep. `0.0` keeps
    /// exact coordinate equality.
    pub snap_tolerance: f64,
    /// Drop output vertices that lie exactly on the line through their
    /// neighbours (for example where two adjacent squares met). Vertices that
    /// were already collinear in an operand ring are kept.
    pub simplify_collinear: bool,
    /// Re-run the simplicity check on every output ring.
    pub validate_output: bool,
    pub cancel: Option<CancelToken>,
}

impl Default for UnionOptions {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.0,
            simplify_collinear: true,
            validate_output: true,
            cancel: None,
        }
    }
}

impl UnionOptions {
    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn check_cancelled(&self) -> crate::Result<()> {
        match &self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }
}
