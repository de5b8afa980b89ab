use polyunion::{union, Geometry, Operand, UnionError, UnionOptions, UnionResult};
use tracing::{debug, warn};

use crate::config::Strategy;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::DissolveError;

/// A partial union together with the group member indices it covers.
#[derive(Clone, Debug)]
pub(crate) struct Partial {
    pub geometry: Geometry,
    pub members: Vec<usize>,
}

/// Folds the validated members of one group into a single geometry.
pub(crate) struct Reducer<'a> {
    key: &'a str,
    options: &'a UnionOptions,
    parallel: bool,
}

type Reduced = (Partial, Vec<Diagnostic>);

impl<'a> Reducer<'a> {
    pub fn new(key: &'a str, options: &'a UnionOptions, parallel: bool) -> Self {
        Self { key, options, parallel }
    }

    pub fn reduce(&self, parts: Vec<Partial>, strategy: Strategy) -> Result<Reduced, DissolveError> {
        match strategy {
            Strategy::LeftFold => self.left_fold(parts),
            Strategy::BalancedTree => self.tree(parts),
        }
    }

    fn left_fold(&self, parts: Vec<Partial>) -> Result<Reduced, DissolveError> {
        let mut parts = parts.into_iter();
        let mut acc = parts.next().ok_or_else(|| self.empty())?;
        let mut diagnostics = Vec::new();
        for next in parts {
            self.check_cancelled()?;
            acc = self.step(acc, next, &mut diagnostics)?;
        }
        Ok((acc, diagnostics))
    }

    /// Halve, reduce both sides (on the pool when parallel), then merge. The
    /// split points depend only on the member count, so the step tree is the
    /// same with or without threads.
    fn tree(&self, mut parts: Vec<Partial>) -> Result<Reduced, DissolveError> {
        if parts.len() <= 1 {
            let part = parts.pop().ok_or_else(|| self.empty())?;
            return Ok((part, Vec::new()));
        }

        let right = parts.split_off(parts.len() / 2);
        let (left, right) = if self.parallel {
            rayon::join(|| self.tree(parts), || self.tree(right))
        } else {
            (self.tree(parts), self.tree(right))
        };
        let (left, mut diagnostics) = left?;
        let (right, right_diagnostics) = right?;
        diagnostics.extend(right_diagnostics);

        self.check_cancelled()?;
        let merged = self.step(left, right, &mut diagnostics)?;
        Ok((merged, diagnostics))
    }

    /// One pairwise union. A failed step keeps one side and records the
    /// other as dropped: the side the error names, or the right side when
    /// the error names neither.
    fn step(&self, left: Partial, right: Partial, diagnostics: &mut Vec<Diagnostic>) -> Result<Partial, DissolveError> {
        match union(&left.geometry, &right.geometry, self.options) {
            Ok(UnionResult { geometry, warnings }) => {
                debug!(
                    group = self.key,
                    left = ?left.members,
                    right = ?right.members,
                    polygons = geometry.num_polygons(),
                    "merged step"
                );
                for warning in warnings {
                    diagnostics.push(Diagnostic::new(
                        self.key,
                        DiagnosticKind::UnionWarning,
                        format!("union of members {:?} with {:?}: {warning}", left.members, right.members),
                    ));
                }
                let mut members = left.members;
                members.extend(right.members);
                Ok(Partial { geometry, members })
            }
            Err(UnionError::Cancelled) => Err(self.cancelled()),
            Err(source) => {
                let drop_left = matches!(
                    source,
                    UnionError::SelfIntersectingInput { operand: Some(Operand::Left), .. }
                        | UnionError::DegenerateUnion { operand: Operand::Left }
                );
                let err = DissolveError::Step {
                    left: left.members.clone(),
                    right: right.members.clone(),
                    source,
                };
                let (kept, dropped) = if drop_left { (right, left) } else { (left, right) };

                warn!(group = self.key, dropped = ?dropped.members, "{err}");
                let mut diagnostic = Diagnostic::new(
                    self.key,
                    DiagnosticKind::StepFailed,
                    format!("{err}; dropped members {:?}", dropped.members),
                );
                if let [only] = dropped.members[..] {
                    diagnostic = diagnostic.with_member(only);
                }
                diagnostics.push(diagnostic);
                Ok(kept)
            }
        }
    }

    fn check_cancelled(&self) -> Result<(), DissolveError> {
        match &self.options.cancel {
            Some(token) if token.is_cancelled() => Err(self.cancelled()),
            _ => Ok(()),
        }
    }

    fn cancelled(&self) -> DissolveError {
        DissolveError::Cancelled { key: self.key.to_string() }
    }

    fn empty(&self) -> DissolveError {
        DissolveError::EmptyGroupAfterFiltering { key: self.key.to_string() }
    }
}
