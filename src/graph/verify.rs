use serde::Serialize;

use crate::adjacency::{AdjacencyCursor, AdjacencyEntry, Direction, LabelFilter, LinkRepr};
use crate::storage::Document;
use crate::types::{GraphError, RecordId, Result};

use super::element::record_endpoint;
use super::{Graph, Vertex};

const MAX_FINDINGS: usize = 32;

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// A reference to a record that no longer exists.
    Warning,
    /// Adjacency that is one-sided or malformed.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

/// Result of checking one vertex's adjacency.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// The vertex checked.
    pub vertex: RecordId,
    /// Whether no error-level findings were recorded.
    pub success: bool,
    /// Number of adjacency entries examined.
    pub entries_checked: u64,
    /// Findings, capped at a fixed number.
    pub findings: Vec<VerifyFinding>,
}

impl VerifyReport {
    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn push(&mut self, severity: VerifySeverity, message: impl Into<String>) {
        if severity == VerifySeverity::Error {
            self.success = false;
        }
        if self.findings.len() < MAX_FINDINGS {
            self.findings.push(VerifyFinding {
                severity,
                message: message.into(),
            });
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.push(VerifySeverity::Error, message);
    }
}

impl Graph {
    /// Checks that every adjacency entry on vertex `id` has its counterpart
    /// on the other side, in both directions.
    ///
    /// A failed edge creation can leave one endpoint written without the
    /// other; this is how such state is found.
    pub fn verify_vertex(&self, id: RecordId) -> Result<VerifyReport> {
        let vertex = self.vertex(id)?.ok_or(GraphError::NotFound(id))?;
        let mut report = VerifyReport {
            vertex: id,
            success: true,
            entries_checked: 0,
            findings: Vec::new(),
        };
        let cursor = AdjacencyCursor::new(vertex.document(), Direction::Both, LabelFilter::any());
        for item in cursor {
            report.entries_checked += 1;
            match item {
                Ok(entry) => self.check_entry(&vertex, &entry, &mut report)?,
                Err(err) => report.error(err.to_string()),
            }
        }
        Ok(report)
    }

    fn check_entry(
        &self,
        vertex: &Vertex,
        entry: &AdjacencyEntry<'_>,
        report: &mut VerifyReport,
    ) -> Result<()> {
        let Some(target) = self.store.load(&entry.target)? else {
            report.push(
                VerifySeverity::Warning,
                format!("{} references missing record {}", entry.field, entry.target),
            );
            return Ok(());
        };
        let side = entry.connection.direction;
        let back = counterpart_field(entry.field, side);
        let class = target.class_name();

        if self.schema.is_vertex_type(class) {
            if !holds(&target, &back, vertex.id()) {
                report.error(format!(
                    "vertex {} has no '{back}' reference back to {}",
                    target.id(),
                    vertex.id()
                ));
            }
            return Ok(());
        }

        if !self.schema.is_edge_type(class) {
            report.error(format!(
                "{} references record {} of class '{class}'",
                entry.field,
                target.id()
            ));
            return Ok(());
        }

        if record_endpoint(&target, side) != Some(vertex.id()) {
            report.error(format!(
                "edge {} does not name {} as its '{}' vertex",
                target.id(),
                vertex.id(),
                side.as_str()
            ));
        }
        let far_side = side.opposite();
        let Some(far) = record_endpoint(&target, far_side) else {
            report.error(format!(
                "edge {} has no '{}' vertex",
                target.id(),
                far_side.as_str()
            ));
            return Ok(());
        };
        match self.store.load(&far)? {
            None => report.push(
                VerifySeverity::Warning,
                format!("edge {} points at missing vertex {far}", target.id()),
            ),
            Some(far_doc) => {
                if !holds(&far_doc, &back, target.id()) {
                    report.error(format!(
                        "vertex {far} has no '{back}' reference to edge {}",
                        target.id()
                    ));
                }
            }
        }
        Ok(())
    }
}

fn counterpart_field(field: &str, side: Direction) -> String {
    match (side.prefix(), side.opposite().prefix()) {
        (Some(own), Some(other)) => match field.strip_prefix(own) {
            Some(suffix) => format!("{other}{suffix}"),
            None => field.to_string(),
        },
        _ => field.to_string(),
    }
}

fn holds(doc: &Document, field: &str, id: RecordId) -> bool {
    matches!(LinkRepr::classify(field, doc.field(field)), Ok(Some(repr)) if repr.contains(&id))
}
