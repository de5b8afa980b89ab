use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use polyunion::{CancelToken, UnionOptions};
use serde::{Deserialize, Serialize};

/// How the members of one group are folded together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Pairwise tree: sibling unions run in parallel and operands stay
    /// similar in size.
    #[default]
    BalancedTree,
    /// `((m0 ∪ m1) ∪ m2) ∪ …`, fully reproducible step order.
    LeftFold,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::BalancedTree => write!(f, "balanced-tree"),
            Strategy::LeftFold => write!(f, "left-fold"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "balanced-tree" | "tree" => Ok(Strategy::BalancedTree),
            "left-fold" | "fold" => Ok(Strategy::LeftFold),
            other => Err(format!("unknown strategy '{other}' (expected balanced-tree or left-fold)")),
        }
    }
}

/// Driver settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissolveConfig {
    pub strategy: Strategy,
    /// Process groups (and balanced-tree siblings) on the rayon pool.
    pub parallel: bool,
    /// Vertex snapping distance applied in every pairwise union; `0` is exact.
    pub snap_tolerance: f64,
    pub simplify_collinear: bool,
    pub validate_output: bool,
    /// Feature property holding the group key.
    pub key_property: String,
    /// Feature property holding the member name.
    pub name_property: String,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            parallel: true,
            snap_tolerance: 0.0,
            simplify_collinear: true,
            validate_output: true,
            key_property: "provincia".into(),
            name_property: "departamento".into(),
        }
    }
}

impl DissolveConfig {
    /// Load from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.snap_tolerance.is_finite() || self.snap_tolerance < 0.0 {
            bail!("snap_tolerance must be a finite, non-negative number (got {})", self.snap_tolerance);
        }
        if self.key_property.is_empty() {
            bail!("key_property must not be empty");
        }
        Ok(())
    }

    /// Options for each pairwise union, sharing `cancel` across all steps.
    pub fn union_options(&self, cancel: Option<CancelToken>) -> UnionOptions {
        UnionOptions {
            snap_tolerance: self.snap_tolerance,
            simplify_collinear: self.simplify_collinear,
            validate_output: self.validate_output,
            cancel,
        }
    }
}
