//! Structural validation of untrusted flame graph JSON.
//!
//! Validation runs in two steps. The text is first parsed into a
//! `serde_json::Value`; text that is not JSON fails right there with a single
//! parse error. The value is then checked field by field against the node
//! shape, descending into `children`. Structural errors are accumulated
//! depth-first rather than stopping at the first one, so every defect in the
//! document is reported in one pass.
//!
//! serde_json's own 128-level nesting limit is disabled. Nesting is bounded
//! instead by a byte scan before parsing, sized from the configured node
//! depth, so the limit a user configures is the limit that applies.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::types::{FieldPath, Node, ValidationError, ValidationErrors};

/// Default maximum number of nested node levels, root included.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Largest accepted `max_depth`. Parsing and checking recurse once per JSON
/// level, two per node level, so this keeps both well inside a thread stack.
pub const MAX_SUPPORTED_DEPTH: usize = 512;

/// Tunables for [`Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum number of nested node levels, root included.
    /// Between 1 and [`MAX_SUPPORTED_DEPTH`].
    pub max_depth: usize,
}

impl ValidatorConfig {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.clamp(1, MAX_SUPPORTED_DEPTH),
        }
    }

    /// Deepest JSON container nesting worth parsing.
    ///
    /// A node at depth `d` sits at JSON level `2d + 1` and its `children`
    /// array at `2d + 2`. One node level of slack past the limit lets the
    /// first too-deep node be reported at its own path.
    fn nesting_limit(&self) -> usize {
        2 * self.max_depth + 3
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Turns raw text into a validated [`Node`] tree or a list of defects.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Parses and validates a JSON document.
    ///
    /// # Example
    ///
    /// ```
    /// use flamescope::parser::{ErrorKind, Validator};
    ///
    /// let validator = Validator::default();
    /// let tree = validator.validate(r#"{"name": "root", "value": 3}"#).unwrap();
    /// assert!(tree.children.is_empty());
    ///
    /// let errors = validator.validate(r#"{"name":"#).unwrap_err();
    /// assert_eq!(errors.kind(), ErrorKind::Parse);
    /// ```
    pub fn validate(&self, text: &str) -> Result<Node, ValidationErrors> {
        let nesting = nesting_depth(text);
        if nesting > self.config.nesting_limit() {
            debug!(nesting, max_depth = self.config.max_depth, "input nested too deeply to parse");
            return Err(ValidationErrors::single(ValidationError::too_deep(
                FieldPath::root(),
                self.config.max_depth,
            )));
        }

        let value = match parse_unbounded(text) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "input is not valid JSON");
                return Err(ValidationErrors::single(ValidationError::parse(format!(
                    "Invalid JSON: {}",
                    err
                ))));
            }
        };
        self.validate_value(&value)
    }

    /// Validates an already parsed JSON value.
    pub fn validate_value(&self, value: &Value) -> Result<Node, ValidationErrors> {
        let mut errors = Vec::new();
        let node = self.check_node(value, &FieldPath::root(), 0, &mut errors);

        match (node, ValidationErrors::new(errors)) {
            (Some(node), None) => {
                debug!(nodes = node.node_count(), "input validated");
                Ok(node)
            }
            (_, Some(errors)) => {
                debug!(errors = errors.len(), kind = errors.kind().label(), "input rejected");
                Err(errors)
            }
            // check_node records an error whenever it returns None
            (None, None) => Err(ValidationErrors::single(ValidationError::structure(
                FieldPath::root(),
                "Invalid node",
            ))),
        }
    }

/// Checks one node and its subtree.
    ///
    /// Returns `Some` only when the whole subtree is valid. Every `None`
    /// is accompanied by at least one pushed error.
    fn check_node(
        &self,
        value: &Value,
        path: &FieldPath,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Node> {
        if depth >= self.config.max_depth {
            errors.push(ValidationError::too_deep(path.clone(), self.config.max_depth));
            return None;
        }

        let Some(object) = value.as_object() else {
            errors.push(ValidationError::type_mismatch(
                path.clone(),
                "object",
                json_type_name(value),
            ));
            return None;
        };

        let name = required_string(object, "name", path, errors);
        let weight = required_number(object, "value", path, errors);
        let tooltip = optional_string(object, "tooltip", path, errors);
        let background_color = optional_string(object, "backgroundColor", path, errors);
        let color = optional_string(object, "color", path, errors);
        let children = self.check_children(object, path, depth, errors);

        Some(Node {
            name: name?,
            value: weight?,
            tooltip: tooltip?,
            background_color: background_color?,
            color: color?,
            children: children?,
        })
    }

    /// Checks the `children` array. An absent field is an empty list.
    fn check_children(
        &self,
        object: &Map<String, Value>,
        path: &FieldPath,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Vec<Node>> {
        let items = match object.get("children") {
            None => return Some(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                errors.push(ValidationError::type_mismatch(
                    path.field("children"),
                    "array",
                    json_type_name(other),
                ));
                return None;
            }
        };

        let children_path = path.field("children");
        let mut children = Some(Vec::with_capacity(items.len()));
        for (index, item) in items.iter().enumerate() {
            let child = self.check_node(item, &children_path.index(index), depth + 1, errors);
            // Keep going after a bad child so its siblings get reported too.
            match (child, children.as_mut()) {
                (Some(child), Some(valid)) => valid.push(child),
                (None, _) => children = None,
                (Some(_), None) => {}
            }
        }
        children
    }
}

/// Parses `text` without serde_json's fixed nesting limit.
///
/// Callers bound the nesting first with [`nesting_depth`].
fn parse_unbounded(text: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Deepest `{`/`[` nesting in `text`, ignoring brackets inside strings.
///
/// Works on malformed text too; the result is then only an upper bound on
/// what a parser would reach before failing.
fn nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Validates `text` with the default configuration.
pub fn validate(text: &str) -> Result<Node, ValidationErrors> {
    Validator::default().validate(text)
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match object.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        other => {
            errors.push(ValidationError::type_mismatch(
                path.field(field),
                "string",
                other.map_or("missing", json_type_name),
            ));
            None
        }
    }
}

fn required_number(
    object: &Map<String, Value>,
    field: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<f64> {
    match object.get(field) {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Some(v),
            _ => {
                let mut error = ValidationError::type_mismatch(path.field(field), "number", "number");
                error.message = format!("Expected a finite number, received {}", n);
                errors.push(error);
                None
            }
        },
        other => {
            errors.push(ValidationError::type_mismatch(
                path.field(field),
                "number",
                other.map_or("missing", json_type_name),
            ));
            None
        }
    }
}

/// Outer `None` means invalid; `Some(None)` means the field is absent.
fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<Option<String>> {
    match object.get(field) {
        None => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(other) => {
            errors.push(ValidationError::type_mismatch(
                path.field(field),
                "string",
                json_type_name(other),
            ));
            None
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
