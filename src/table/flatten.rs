//! Tree-to-table aggregation.
//!
//! Flattens a validated [`Node`] tree into one [`FlattenedRow`] per node,
//! in pre-order, pairing each node's total weight with its self weight.

use std::sync::Arc;

use serde::Serialize;

use crate::parser::Node;

/// A flattened representation of a tree node for the metrics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedRow {
    /// Node name
    pub name: String,
    /// `value` minus the direct children's values; negative when the
    /// children claim more weight than their parent
    #[serde(rename = "self")]
    pub self_value: f64,
    /// The node's `value`, unchanged
    pub total: f64,
    /// Depth in the tree (0 = root)
    pub depth: usize,
}

impl FlattenedRow {
    /// Create a new row
    pub fn new(name: impl Into<String>, self_value: f64, total: f64, depth: usize) -> Self {
        Self {
            name: name.into(),
            self_value,
            total,
            depth,
        }
    }
}

/// Flatten the tree into a pre-order list of rows.
///
/// A node is emitted before its descendants and siblings keep their input
/// order. Traversal uses an explicit stack, so arbitrarily deep trees built
/// in code cannot exhaust the call stack.
///
/// # Example
///
/// ```
/// use flamescope::parser::Node;
/// use flamescope::table::flatten;
///
/// let root = Node::new("root", 10.0)
///     .with_child(Node::new("a", 4.0))
///     .with_child(Node::new("b", 3.0));
///
/// let rows = flatten(&root);
/// assert_eq!(rows[0].self_value, 3.0);
/// assert_eq!(rows.iter().map(|r| r.self_value).sum::<f64>(), root.value);
/// ```
pub fn flatten(root: &Node) -> Vec<FlattenedRow> {
    let mut result = Vec::new();
    let mut stack: Vec<(&Node, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        result.push(FlattenedRow {
            name: node.name.clone(),
            self_value: node.self_value(),
            total: node.value,
            depth,
        });

        // Reversed so the first child is popped first.
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    result
}

/// Memoizes [`flatten`] by tree identity.
///
/// Re-rendering on every keystroke hands the same `Arc<Node>` back until the
/// input actually changes; only a different allocation triggers a recompute.
/// [`FlattenCache::share`] keeps that identity stable when an edit produces
/// a tree equal to the cached one.
#[derive(Debug, Default)]
pub struct FlattenCache {
    entry: Option<(Arc<Node>, Arc<[FlattenedRow]>)>,
    computed: usize,
}

impl FlattenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a freshly validated tree, reusing the cached allocation when
    /// the content is unchanged (a whitespace-only edit, or an input that
    /// was briefly invalid and then restored).
    pub fn share(&self, tree: Node) -> Arc<Node> {
        match &self.entry {
            Some((cached_tree, _)) if **cached_tree == tree => Arc::clone(cached_tree),
            _ => Arc::new(tree),
        }
    }

    /// Returns the rows for `tree`, recomputing only if `tree` is a
    /// different allocation from the last call.
    pub fn rows(&mut self, tree: &Arc<Node>) -> Arc<[FlattenedRow]> {
        if let Some((cached_tree, rows)) = &self.entry {
            if Arc::ptr_eq(cached_tree, tree) {
                return Arc::clone(rows);
            }
        }

        let rows: Arc<[FlattenedRow]> = flatten(tree).into();
        self.entry = Some((Arc::clone(tree), Arc::clone(&rows)));
        self.computed += 1;
        rows
    }

    /// How many times the rows were actually computed.
    pub fn computed(&self) -> usize {
        self.computed
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
