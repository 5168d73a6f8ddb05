//! Decoding of the provider's nested-array answer.
//!
//! The expected shape is
//!
//! ```text
//! [ [ [fragment, alternate, …], [fragment, …], … ], metadata, … ]
//! ```
//!
//! The first top-level element lists segments; the first element of each
//! segment is a translated fragment. Fragments are joined in order with no
//! separator. Anything else in the payload is metadata and ignored. Any
//! deviation from that shape is a [`ShapeMismatch`], never an empty string.

use std::fmt;

use serde_json::Value;

/// How one JSON node presents itself to the decoder.
enum Node<'a> {
    Text(&'a str),
    List(&'a [Value]),
    Other(Kind),
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Node::Text(s),
            Value::Array(items) => Node::List(items),
            Value::Null => Node::Other(Kind::Null),
            Value::Bool(_) => Node::Other(Kind::Bool),
            Value::Number(_) => Node::Other(Kind::Number),
            Value::Object(_) => Node::Other(Kind::Object),
        }
    }
}

/// JSON type found where something else was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    fn of(node: &Node<'_>) -> Self {
        match node {
            Node::Text(_) => Kind::String,
            Node::List(_) => Kind::Array,
            Node::Other(kind) => *kind,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Null => "null",
            Kind::Bool => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        })
    }
}

/// Where and how a payload departed from the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeMismatch {
    #[error("payload is a {0}, expected an array")]
    NotAnArray(Kind),

    #[error("payload is an empty array")]
    EmptyPayload,

    #[error("segment list is a {0}, expected an array")]
    SegmentsNotAnArray(Kind),

    #[error("segment list is empty")]
    NoSegments,

    #[error("segment {index} is a {found}, expected an array")]
    SegmentNotAnArray { index: usize, found: Kind },

    #[error("segment {index} is empty")]
    EmptySegment { index: usize },

    #[error("segment {index} starts with a {found}, expected a string")]
    FragmentNotText { index: usize, found: Kind },
}

/// Reduces a decoded provider payload to the translated text.
///
/// ```rust
/// use lingo_gate::translate::payload::extract_translation;
///
/// let payload = serde_json::json!([[["Hola","Hello",null,null,3]],null,"en"]);
/// assert_eq!(extract_translation(&payload).unwrap(), "Hola");
/// ```
pub fn extract_translation(payload: &Value) -> Result<String, ShapeMismatch> {
    let top = match Node::from(payload) {
        Node::List(items) => items,
        other => return Err(ShapeMismatch::NotAnArray(Kind::of(&other))),
    };
    let first = top.first().ok_or(ShapeMismatch::EmptyPayload)?;

    let segments = match Node::from(first) {
        Node::List(segments) if segments.is_empty() => return Err(ShapeMismatch::NoSegments),
        Node::List(segments) => segments,
        other => return Err(ShapeMismatch::SegmentsNotAnArray(Kind::of(&other))),
    };

    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| fragment(index, segment))
        .collect()
}

/// First element of one segment. Trailing elements are alternates and
/// scoring metadata.
fn fragment(index: usize, segment: &Value) -> Result<&str, ShapeMismatch> {
    let items = match Node::from(segment) {
        Node::List(items) => items,
        other => return Err(ShapeMismatch::SegmentNotAnArray { index, found: Kind::of(&other) }),
    };
    let head = items.first().ok_or(ShapeMismatch::EmptySegment { index })?;
    match Node::from(head) {
        Node::Text(text) => Ok(text),
        other => Err(ShapeMismatch::FragmentNotText { index, found: Kind::of(&other) }),
    }
}
