//! Parser module for flamescope.
//!
//! Turns untrusted JSON text into a validated [`Node`] tree, or into the
//! full list of defects that keep it from being one.
//!
//! # Error kinds
//!
//! - **Parse** - the text is not JSON at all. Always a single error.
//! - **Structure** - JSON that is not a node tree. One error per defect,
//!   each with the field path that pinpoints it.
//! - **TooDeep** - nesting beyond [`ValidatorConfig::max_depth`].
//!
//! # Example
//!
//! ```
//! use flamescope::parser::{validate, ErrorKind};
//!
//! let tree = validate(r#"{"name": "main", "value": 10, "children": []}"#).unwrap();
//! assert_eq!(tree.name, "main");
//!
//! let errors = validate(r#"{"name": "main"}"#).unwrap_err();
//! assert_eq!(errors.kind(), ErrorKind::Structure);
//! assert_eq!(errors.errors()[0].path.to_string(), "value");
//! ```

pub mod types;
pub mod validate;

// Re-export commonly used types for convenience
pub use types::{ErrorKind, FieldPath, Node, PathSegment, ValidationError, ValidationErrors};
pub use validate::{validate, Validator, ValidatorConfig, DEFAULT_MAX_DEPTH, MAX_SUPPORTED_DEPTH};
