//! Field codec: maps `(direction, label)` pairs to and from vertex field names.
//!
//! Outgoing fields are prefixed `out_`, incoming ones `in_`. The base edge
//! class `E` has no suffix. Labels are escaped so that any string survives the
//! trip through a field name: a leading digit is marked with `-`, and bytes
//! outside `[A-Za-z0-9.*_-]` are percent-encoded (space becomes `+`).

use tracing::trace;

use crate::storage::{SchemaCatalog, EDGE_CLASS, VERTEX_CLASS};
use crate::types::{GraphError, Result};

/// Prefix of outgoing adjacency fields.
pub const OUT_PREFIX: &str = "out_";
/// Prefix of incoming adjacency fields.
pub const IN_PREFIX: &str = "in_";
/// Edge record field holding the source vertex.
pub const OUT_FIELD: &str = "out";
/// Edge record field holding the destination vertex.
pub const IN_FIELD: &str = "in";

const EDGE_CLASS_PREFIX: &str = "E_";
const VERTEX_CLASS_PREFIX: &str = "V_";
const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Traversal direction relative to a vertex.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Edges leaving the vertex.
    Out,
    /// Edges arriving at the vertex.
    In,
    /// Either direction.
    Both,
}

impl Direction {
    /// Whether the direction covers outgoing edges.
    pub fn includes_out(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }

    /// Whether the direction covers incoming edges.
    pub fn includes_in(self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }

    /// The reverse direction; `Both` is its own opposite.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
            Direction::Both => Direction::Both,
        }
    }

    /// Field-name prefix, or `None` for `Both`.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Direction::Out => Some(OUT_PREFIX),
            Direction::In => Some(IN_PREFIX),
            Direction::Both => None,
        }
    }

    /// Name of the edge-record field holding the endpoint on this side.
    pub fn endpoint_field(self) -> Option<&'static str> {
        match self {
            Direction::Out => Some(OUT_FIELD),
            Direction::In => Some(IN_FIELD),
            Direction::Both => None,
        }
    }

    /// Lower-case name, as used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Out => "out",
            Direction::In => "in",
            Direction::Both => "both",
        }
    }
}

/// How an adjacency field relates to the graph: its direction and label.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Connection {
    /// `Out` or `In`, never `Both`.
    pub direction: Direction,
    /// Decoded edge label; `E` for the base edge class.
    pub label: String,
}

impl Connection {
    /// Creates a connection.
    pub fn new(direction: Direction, label: impl Into<String>) -> Self {
        Self {
            direction,
            label: label.into(),
        }
    }
}

/// Escapes a label for use inside a field or class name.
pub fn encode_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 1);
    let bytes = label.as_bytes();
    if bytes.first().is_some_and(u8::is_ascii_digit) {
        out.push('-');
    }
    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            // a leading '-' would read back as the digit marker
            b'-' if idx == 0 => push_escaped(&mut out, byte),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'*' | b'_' | b'-' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => push_escaped(&mut out, byte),
        }
    }
    out
}

/// Reverses [`encode_label`]. Malformed escapes are kept literally.
pub fn decode_label(encoded: &str) -> String {
    let body = encoded.strip_prefix('-').unwrap_or(encoded).as_bytes();
    let mut out = Vec::with_capacity(body.len());
    let mut idx = 0;
    while idx < body.len() {
        match body[idx] {
            b'+' => {
                out.push(b' ');
                idx += 1;
            }
            b'%' => match (
                body.get(idx + 1).and_then(|b| hex_value(*b)),
                body.get(idx + 2).and_then(|b| hex_value(*b)),
            ) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    idx += 3;
                }
                _ => {
                    out.push(b'%');
                    idx += 1;
                }
            },
            other => {
                out.push(other);
                idx += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn push_escaped(out: &mut String, byte: u8) {
    out.push('%');
    out.push(HEX[(byte >> 4) as usize] as char);
    out.push(HEX[(byte & 0x0F) as usize] as char);
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

fn is_base_label(label: &str) -> bool {
    label.is_empty() || label == EDGE_CLASS
}

/// Field name for `label` in `direction`.
pub fn field_name(direction: Direction, label: &str) -> Result<String> {
    let prefix = direction
        .prefix()
        .ok_or_else(|| GraphError::InvalidArgument("direction not valid".into()))?;
    if is_base_label(label) {
        return Ok(prefix.to_string());
    }
    Ok(format!("{prefix}{}", encode_label(label)))
}

/// Whether `name` looks like an adjacency field of either direction.
pub fn is_adjacency_field(name: &str) -> bool {
    name.starts_with(OUT_PREFIX) || name.starts_with(IN_PREFIX)
}

/// Schema class backing edges labelled `label`.
pub fn edge_class_name(label: &str) -> String {
    if is_base_label(label) {
        EDGE_CLASS.to_string()
    } else {
        format!("{EDGE_CLASS_PREFIX}{}", encode_label(label))
    }
}

/// Schema class backing vertices labelled `label`.
pub fn vertex_class_name(label: Option<&str>) -> String {
    match label {
        None => VERTEX_CLASS.to_string(),
        Some(l) if l == VERTEX_CLASS => VERTEX_CLASS.to_string(),
        Some(l) => format!("{VERTEX_CLASS_PREFIX}{}", encode_label(l)),
    }
}

/// Field-name suffix contributed by `class`: the class name without its
/// type-group prefix, still escaped.
fn class_suffix(class: &str) -> &str {
    if class.len() == 1 {
        return class;
    }
    class
        .strip_prefix(EDGE_CLASS_PREFIX)
        .or_else(|| class.strip_prefix(VERTEX_CLASS_PREFIX))
        .unwrap_or(class)
}

/// User-facing label of a schema class.
pub fn label_of_class(class: &str) -> String {
    decode_label(class_suffix(class))
}

#[derive(Clone, Debug)]
struct LabelCandidate {
    label: String,
    suffix: String,
    subclasses: Vec<(String, String)>,
}

/// Resolved label filter used to test field names.
///
/// Built once per traversal: each requested label is escaped and expanded to
/// the labels of all its schema subclasses.
#[derive(Clone, Debug, Default)]
pub struct LabelFilter {
    candidates: Vec<LabelCandidate>,
}

impl LabelFilter {
    /// A filter matching every label.
    pub fn any() -> Self {
        Self::default()
    }

    /// Builds a filter for `labels`, in priority order.
    ///
    /// A sole `E` label means "any label".
    pub fn new<S: AsRef<str>>(catalog: &dyn SchemaCatalog, labels: &[S]) -> Self {
        if labels.len() == 1 && labels[0].as_ref().eq_ignore_ascii_case(EDGE_CLASS) {
            return Self::any();
        }
        let candidates = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                let class = edge_class_name(label);
                let subclasses = if catalog.exists(&class) {
                    catalog
                        .all_subclasses(&class)
                        .into_iter()
                        .map(|sub| {
                            let suffix = class_suffix(&sub).to_string();
                            (decode_label(&suffix), suffix)
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                LabelCandidate {
                    label: if is_base_label(label) {
                        EDGE_CLASS.to_string()
                    } else {
                        label.to_string()
                    },
                    suffix: if is_base_label(label) {
                        String::new()
                    } else {
                        encode_label(label)
                    },
                    subclasses,
                }
            })
            .collect();
        Self { candidates }
    }

    /// Whether the filter matches every label.
    pub fn is_any(&self) -> bool {
        self.candidates.is_empty()
    }

    fn resolve(&self, suffix: &str) -> Option<String> {
        if self.is_any() {
            return Some(if suffix.is_empty() {
                EDGE_CLASS.to_string()
            } else {
                decode_label(suffix)
            });
        }
        for candidate in &self.candidates {
            if candidate.suffix == suffix {
                return Some(candidate.label.clone());
            }
            if let Some((label, _)) = candidate.subclasses.iter().find(|(_, s)| s == suffix) {
                return Some(label.clone());
            }
        }
        None
    }
}

/// Tests whether `field` is an adjacency field in `direction` accepted by `filter`.
pub fn parse_connection(
    field: &str,
    direction: Direction,
    filter: &LabelFilter,
) -> Option<Connection> {
    for side in [Direction::Out, Direction::In] {
        let matches_side = match side {
            Direction::Out => direction.includes_out(),
            _ => direction.includes_in(),
        };
        if !matches_side {
            continue;
        }
        let Some(prefix) = side.prefix() else {
            continue;
        };
        if let Some(suffix) = field.strip_prefix(prefix) {
            let label = filter.resolve(suffix);
            trace!(field, direction = side.as_str(), matched = label.is_some(), "test adjacency field");
            return label.map(|label| Connection::new(side, label));
        }
    }
    None
}

/// One-shot form of [`parse_connection`] that resolves `labels` against `catalog`.
pub fn parse<S: AsRef<str>>(
    catalog: &dyn SchemaCatalog,
    field: &str,
    direction: Direction,
    labels: &[S],
) -> Option<String> {
    let filter = LabelFilter::new(catalog, labels);
    parse_connection(field, direction, &filter).map(|c| c.label)
}
