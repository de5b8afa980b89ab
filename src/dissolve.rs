use polyunion::{CancelToken, Geometry, UnionOptions};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::DissolveConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::DissolveError;
use crate::group::{group_records, Group, Record};
use crate::reduce::{Partial, Reducer};

/// The merged geometry of one group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupResult {
    pub key: String,
    pub geometry: Geometry,
    /// Indices (within the group) of the members merged into `geometry`.
    pub members: Vec<usize>,
}

/// Everything a dissolve run produced: results for the groups that
/// succeeded, the group-level failures, and all diagnostics in group order.
#[derive(Clone, Debug, Default)]
pub struct DissolveOutput {
    pub results: Vec<GroupResult>,
    pub failures: Vec<DissolveError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DissolveOutput {
    pub fn result(&self, key: &str) -> Option<&GroupResult> {
        self.results.iter().find(|r| r.key == key)
    }
}

/// Result of one group, collected before merging into [`DissolveOutput`].
struct GroupOutcome {
    result: Result<GroupResult, DissolveError>,
    diagnostics: Vec<Diagnostic>,
}

/// Groups records by key and merges each group's members.
#[derive(Clone, Debug, Default)]
pub struct Dissolver {
    config: DissolveConfig,
    cancel: Option<CancelToken>,
}

impl Dissolver {
    pub fn new(config: DissolveConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Share `token` with every union step; cancelling it stops the groups
    /// still in progress.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &DissolveConfig { &self.config }

    /// Group `records` by key (first-seen order) and dissolve every group.
    pub fn run(&self, records: Vec<Record>) -> DissolveOutput {
        self.run_groups(group_records(records))
    }

    /// Dissolve pre-grouped input. Groups run on the rayon pool when
    /// `parallel` is set; output order follows `groups` either way.
    pub fn run_groups(&self, groups: Vec<Group>) -> DissolveOutput {
        let options = self.config.union_options(self.cancel.clone());
        let outcomes: Vec<GroupOutcome> = if self.config.parallel {
            groups.into_par_iter().map(|g| self.dissolve_group(g, &options)).collect()
        } else {
            groups.into_iter().map(|g| self.dissolve_group(g, &options)).collect()
        };

        let mut output = DissolveOutput::default();
        for outcome in outcomes {
            output.diagnostics.extend(outcome.diagnostics);
            match outcome.result {
                Ok(result) => output.results.push(result),
                Err(err) => output.failures.push(err),
            }
        }
        output
    }

    fn dissolve_group(&self, group: Group, options: &UnionOptions) -> GroupOutcome {
        let (valid, mut diagnostics) = group.validate();
        let parts: Vec<Partial> = valid.into_iter()
            .map(|(index, polygon)| Partial { geometry: polygon.into(), members: vec![index] })
            .collect();
        let total = group.len();
        let key = group.key;

        let reducer = Reducer::new(&key, options, self.config.parallel);
        let result = match reducer.reduce(parts, self.config.strategy) {
            Ok((partial, step_diagnostics)) => {
                diagnostics.extend(step_diagnostics);
                info!(
                    group = %key,
                    members = partial.members.len(),
                    excluded = total - partial.members.len(),
                    polygons = partial.geometry.num_polygons(),
                    area = partial.geometry.area(),
                    "dissolved group"
                );
                Ok(GroupResult { key, geometry: partial.geometry, members: partial.members })
            }
            Err(err) => {
                warn!(group = %key, "{err}");
                let kind = match err {
                    DissolveError::Cancelled { .. } => DiagnosticKind::Cancelled,
                    _ => DiagnosticKind::EmptyGroup,
                };
                diagnostics.push(Diagnostic::new(key.as_str(), kind, err.to_string()));
                Err(err)
            }
        };

        GroupOutcome { result, diagnostics }
    }
}
