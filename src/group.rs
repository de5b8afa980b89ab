use ahash::AHashMap;
use geo::Coord;
use polyunion::Polygon;
use tracing::warn;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::DissolveError;

/// Member geometry as read from input, before any validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPolygon {
    pub outer: Vec<Coord<f64>>,
    pub holes: Vec<Vec<Coord<f64>>>,
}

impl RawPolygon {
    pub fn new(outer: Vec<Coord<f64>>, holes: Vec<Vec<Coord<f64>>>) -> Self {
        Self { outer, holes }
    }

    /// Build and check the polygon: closed rings with enough distinct
    /// points, holes inside the shell, and no self-intersections.
    pub fn validate(&self) -> polyunion::Result<Polygon> {
        let polygon = Polygon::from_coords(self.outer.clone(), self.holes.clone())?;
        polygon.validate_simple()?;
        Ok(polygon)
    }
}

/// One input row: a member geometry tagged with its group key.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub key: String,
    pub name: Option<String>,
    pub polygon: RawPolygon,
}

impl Record {
    pub fn new(key: impl Into<String>, polygon: RawPolygon) -> Self {
        Self { key: key.into(), name: None, polygon }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A record placed in its group.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    /// Position within the group, in input order.
    pub index: usize,
    /// Position of the originating record in the input.
    pub record: usize,
    pub name: Option<String>,
    pub polygon: RawPolygon,
}

/// All members sharing one key.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub key: String,
    pub members: Vec<Member>,
}

impl Group {
    pub fn len(&self) -> usize { self.members.len() }

    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// Validate every member. Returns the valid polygons tagged with their
    /// member index, and one diagnostic per excluded member.
    pub fn validate(&self) -> (Vec<(usize, Polygon)>, Vec<Diagnostic>) {
        let mut valid = Vec::with_capacity(self.members.len());
        let mut diagnostics = Vec::new();
        for member in &self.members {
            match member.polygon.validate() {
                Ok(polygon) => valid.push((member.index, polygon)),
                Err(err) => {
                    warn!(group = %self.key, member = member.index, name = ?member.name, "excluding member: {err}");
                    diagnostics.push(
                        Diagnostic::new(self.key.as_str(), DiagnosticKind::InvalidMember, err.to_string())
                            .with_member(member.index),
                    );
                }
            }
        }
        (valid, diagnostics)
    }

    /// Validate without merging. Returns the number of valid members and the
    /// diagnostics a merge would report before any union step, including the
    /// `empty-group` entry when nothing is left.
    pub fn check(&self) -> (usize, Vec<Diagnostic>) {
        let (valid, mut diagnostics) = self.validate();
        if valid.is_empty() {
            let err = DissolveError::EmptyGroupAfterFiltering { key: self.key.clone() };
            warn!(group = %self.key, "{err}");
            diagnostics.push(Diagnostic::new(self.key.as_str(), DiagnosticKind::EmptyGroup, err.to_string()));
        }
        (valid.len(), diagnostics)
    }
}

/// Partition records by key. Groups come out in order of first appearance,
/// members in input order.
pub fn group_records(records: impl IntoIterator<Item = Record>) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for (record_idx, record) in records.into_iter().enumerate() {
        let slot = match index.get(&record.key) {
            Some(&slot) => slot,
            None => {
                index.insert(record.key.clone(), groups.len());
                groups.push(Group { key: record.key.clone(), members: Vec::new() });
                groups.len() - 1
            }
        };
        let group = &mut groups[slot];
        group.members.push(Member {
            index: group.members.len(),
            record: record_idx,
            name: record.name,
            polygon: record.polygon,
        });
    }

    groups
}
