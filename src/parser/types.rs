//! Shared types for flame graph validation.
//!
//! This module defines the validated tree (`Node`) and the structured
//! error values produced when an input document does not describe one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated flame graph node.
///
/// `value` is the node's total weight and by convention includes the
/// weight of all of its descendants. Nothing enforces that convention:
/// a node may report less than the sum of its children.
///
/// # Example
///
/// ```
/// use flamescope::parser::types::Node;
///
/// let mut root = Node::new("main", 10.0);
/// root.add_child(Node::new("parse", 4.0));
/// assert_eq!(root.child_total(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Frame name (function, module, span...).
    pub name: String,

    /// Total weight, inclusive of descendants.
    pub value: f64,

    /// Free-form text shown on hover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Fill color for the frame, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// Text color for the frame, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Ordered children. Order drives left-to-right layout and pre-order.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a leaf node with no display attributes.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            tooltip: None,
            background_color: None,
            color: None,
            children: Vec::new(),
        }
    }

    /// Appends a child, keeping insertion order.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder-style variant of [`Node::add_child`].
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Check if this node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Sum of the direct children's `value`, 0 for a leaf.
    pub fn child_total(&self) -> f64 {
        self.children.iter().map(|c| c.value).sum()
    }

    /// Own weight: `value` minus the direct children's total. May be negative.
    pub fn self_value(&self) -> f64 {
        self.value - self.child_total()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// One step in a path from the document root to a defect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object field, e.g. `value`.
    Field(String),
    /// An array position, e.g. the `2` in `children[2]`.
    Index(usize),
}

/// Location of a defect inside the input document.
///
/// Displayed in accessor form: `children[0].children[3].value`. The empty
/// path (the document itself) displays as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, pointing at the whole document.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path extended with an object field.
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.to_string()));
        Self(segments)
    }

    /// Returns a new path extended with an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Categorizes why an input was rejected.
///
/// Callers message these differently: a parse failure means "this is not
/// JSON", a structure failure means "this JSON is not a flame graph", and a
/// depth failure means "this flame graph is nested too deeply to accept".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The text is not syntactically valid JSON.
    Parse,
    /// Valid JSON that does not have the shape of a node tree.
    Structure,
    /// Nesting exceeds the configured maximum depth.
    TooDeep,
}

impl ErrorKind {
    /// Returns a short label for the error kind.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Structure => "structure",
            ErrorKind::TooDeep => "too-deep",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Parse => "document is not valid JSON",
            ErrorKind::Structure => "document is malformed",
            ErrorKind::TooDeep => "document is too deeply nested",
        };
        write!(f, "{}", s)
    }
}

/// A single defect found while validating an input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// What class of failure this is.
    pub kind: ErrorKind,

    /// Where in the document the defect sits.
    pub path: FieldPath,

    /// Human-readable description.
    pub message: String,

    /// Description of what was expected, e.g. `"string"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Description of what was found, e.g. `"number"` or `"missing"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl ValidationError {
    /// Creates a parse failure. Parse failures always sit at the empty path.
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            path: FieldPath::root(),
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    /// Creates a structural failure for a value of the wrong type.
    pub fn type_mismatch(path: FieldPath, expected: &str, received: &str) -> Self {
        let message = if received == "missing" {
            "Required".to_string()
        } else {
            format!("Expected {}, received {}", expected, received)
        };
        Self {
            kind: ErrorKind::Structure,
            path,
            message,
            expected: Some(expected.to_string()),
            received: Some(received.to_string()),
        }
    }

    /// Creates a structural failure that is not a plain type mismatch.
    pub fn structure(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Structure,
            path,
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    /// Creates a depth-limit failure.
    pub fn too_deep(path: FieldPath, max_depth: usize) -> Self {
        Self {
            kind: ErrorKind::TooDeep,
            path,
            message: format!("Nesting exceeds the maximum depth of {}", max_depth),
            expected: None,
            received: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The ordered, non-empty list of defects from one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{} ({} error(s))", overall_kind(.0), .0.len())]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Wraps a list of errors. Returns `None` for an empty list.
    pub fn new(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Convenience for a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    /// The overall failure class.
    ///
    /// A parse failure is always alone. Otherwise any depth failure wins over
    /// plain structure failures, so callers can surface "too deeply nested".
    pub fn kind(&self) -> ErrorKind {
        overall_kind(&self.0)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a value built through [`ValidationErrors::new`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

fn overall_kind(errors: &[ValidationError]) -> ErrorKind {
    if errors.iter().any(|e| e.kind == ErrorKind::Parse) {
        ErrorKind::Parse
    } else if errors.iter().any(|e| e.kind == ErrorKind::TooDeep) {
        ErrorKind::TooDeep
    } else {
        ErrorKind::Structure
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_self_value() {
        let root = Node::new("root", 10.0)
            .with_child(Node::new("a", 4.0))
            .with_child(Node::new("b", 3.0));

        assert_eq!(root.child_total(), 7.0);
        assert_eq!(root.self_value(), 3.0);
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn test_node_negative_self_value() {
        let root = Node::new("root", 1.0).with_child(Node::new("a", 5.0));
        assert_eq!(root.self_value(), -4.0);
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let mut node = Node::new("root", 1.0);
        node.background_color = Some("#ff0000".to_string());

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["backgroundColor"], "#ff0000");
        assert!(json.get("tooltip").is_none());
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_field_path_display() {
        assert_eq!(FieldPath::root().to_string(), "<root>");
        assert_eq!(FieldPath::root().field("value").to_string(), "value");

        let path = FieldPath::root()
            .field("children")
            .index(0)
            .field("children")
            .index(3)
            .field("name");
        assert_eq!(path.to_string(), "children[0].children[3].name");
    }

    #[test]
    fn test_field_path_serializes_as_segments() {
        let path = FieldPath::root().field("children").index(2);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["children", 2]));
    }

    #[test]
    fn test_type_mismatch_messages() {
        let missing = ValidationError::type_mismatch(FieldPath::root().field("value"), "number", "missing");
        assert_eq!(missing.message, "Required");
        assert_eq!(missing.to_string(), "value: Required");

        let wrong = ValidationError::type_mismatch(FieldPath::root().field("name"), "string", "number");
        assert_eq!(wrong.message, "Expected string, received number");
        assert_eq!(wrong.expected.as_deref(), Some("string"));
    }

    #[test]
    fn test_validation_errors_kind() {
        let structure = ValidationErrors::single(ValidationError::structure(FieldPath::root(), "bad"));
        assert_eq!(structure.kind(), ErrorKind::Structure);

        let mixed = ValidationErrors::new(vec![
            ValidationError::structure(FieldPath::root(), "bad"),
            ValidationError::too_deep(FieldPath::root().field("children"), 4),
        ])
        .unwrap();
        assert_eq!(mixed.kind(), ErrorKind::TooDeep);

        assert!(ValidationErrors::new(Vec::new()).is_none());
    }

    #[test]
    fn test_validation_errors_display() {
        let errors = ValidationErrors::single(ValidationError::parse("EOF while parsing"));
        assert_eq!(errors.to_string(), "document is not valid JSON (1 error(s))");
    }

    #[test]
    fn test_error_kind_label() {
        assert_eq!(ErrorKind::Parse.label(), "parse");
        assert_eq!(ErrorKind::Structure.label(), "structure");
        assert_eq!(ErrorKind::TooDeep.label(), "too-deep");
    }
}
