use serde::{Deserialize, Serialize};

/// What kind of problem a [`Diagnostic`] records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// An input feature could not be turned into a record (missing key,
    /// unsupported or malformed geometry).
    SkippedFeature,
    /// A member failed ring/polygon validation and was excluded.
    InvalidMember,
    /// A pairwise union failed; one operand was dropped.
    StepFailed,
    /// A union step succeeded but reported a degeneracy.
    UnionWarning,
    /// No valid member was left in the group.
    EmptyGroup,
    /// The group was cancelled.
    Cancelled,
}

/// One entry of the diagnostics list written next to the results.
///
/// `member_index` is the member's position within its group, or the feature
/// index in the input collection for [`DiagnosticKind::SkippedFeature`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub group_key: String,
    pub kind: DiagnosticKind,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_index: Option<usize>,
}

impl Diagnostic {
    pub fn new(group_key: impl Into<String>, kind: DiagnosticKind, reason: impl Into<String>) -> Self {
        Self { group_key: group_key.into(), kind, reason: reason.into(), member_index: None }
    }

    pub fn with_member(mut self, index: usize) -> Self {
        self.member_index = Some(index);
        self
    }
}
