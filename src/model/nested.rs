//! Nested `{ name, value, children }` form of a [Hierarchy].
//!
//! Hierarchical layout libraries expect a tree of plain objects where each
//! node has a `name`, leaves have a numeric `value` and interior nodes have a
//! `children` array. [Hierarchy] serializes straight into that shape without
//! an intermediate copy; [TreeNode] is the owned equivalent, used to read
//! already nested JSON and to inspect output in tests.

use crate::model::hierarchy::{Hierarchy, NodeIndex};
use crate::model::node::Node;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

// =#========================================================================#=
// TREE NODE
// =#========================================================================#=
/// Owned nested hierarchy node.
///
/// Serializes like [Hierarchy]: `value` only on leaves, `children` only on
/// the root and interior nodes. A `NaN` value serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Path segment (or root label)
    #[serde(default)]
    pub name: String,
    /// Leaf weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Children in insertion order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Creates a leaf node.
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        TreeNode {
            name: name.into(),
            value: Some(value),
            children: None,
        }
    }

    /// Creates an interior node with the given children.
    pub fn interior(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode {
            name: name.into(),
            value: None,
            children: Some(children),
        }
    }

    /// Returns `true` if this node is treated as a leaf, i.e. it has no
    /// children but a value.
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().is_none_or(|c| c.is_empty()) && self.value.is_some()
    }
}

// ============================================================================
// Conversion
// ============================================================================
impl Hierarchy {
    /// Converts this hierarchy into its owned nested form.
    pub fn to_nested(&self) -> TreeNode {
        self.nested_from(self.root_index())
    }

    fn nested_from(&self, index: NodeIndex) -> TreeNode {
        match &self[index] {
            Node::Leaf { name, value, .. } => TreeNode::leaf(name.clone(), *value),
            node => TreeNode::interior(
                node.name(),
                self.children(index)
                    .iter()
                    .map(|&child| self.nested_from(child))
                    .collect(),
            ),
        }
    }

    /// Builds a hierarchy from its nested form.
    ///
    /// A node with a non-empty `children` array becomes an interior node
    /// (any `value` on it is ignored, since it would be recomputed from its
    /// leaves anyway). A node without children but with a value becomes a
    /// leaf. A node with neither becomes an interior node without children.
    pub fn from_nested(root: TreeNode) -> Self {
        let mut tree = Hierarchy::new(root.name);
        let mut stack: Vec<(NodeIndex, TreeNode)> = root
            .children
            .unwrap_or_default()
            .into_iter()
            .rev()
            .map(|child| (tree.root_index(), child))
            .collect();

        while let Some((parent, node)) = stack.pop() {
            let children = node.children.unwrap_or_default();
            match (children.is_empty(), node.value) {
                (true, Some(value)) => {
                    tree.add_leaf(parent, node.name, value);
                }
                _ => {
                    let index = tree.add_interior(parent, node.name);
                    stack.extend(children.into_iter().rev().map(|child| (index, child)));
                }
            }
        }

        tree
    }
}

impl From<TreeNode> for Hierarchy {
    fn from(root: TreeNode) -> Self {
        Hierarchy::from_nested(root)
    }
}

impl From<&Hierarchy> for TreeNode {
    fn from(tree: &Hierarchy) -> Self {
        tree.to_nested()
    }
}

// ============================================================================
// Serialization
// ============================================================================
/// Borrowed view of one node, serialized recursively.
struct NodeRef<'a> {
    tree: &'a Hierarchy,
    index: NodeIndex,
}

/// Borrowed view of a children list.
struct ChildrenRef<'a> {
    tree: &'a Hierarchy,
    children: &'a [NodeIndex],
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = &self.tree[self.index];
        let mut state = serializer.serialize_struct("TreeNode", 2)?;
        state.serialize_field("name", node.name())?;
        match node.value() {
            Some(value) => state.serialize_field("value", &value)?,
            None => state.serialize_field(
                "children",
                &ChildrenRef {
                    tree: self.tree,
                    children: self.tree.children(self.index),
                },
            )?,
        }
        state.end()
    }
}

impl Serialize for ChildrenRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.children.iter().map(|&index| NodeRef {
            tree: self.tree,
            index,
        }))
    }
}

impl Serialize for Hierarchy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRef {
            tree: self,
            index: self.root_index(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_shape() {
        let mut tree = Hierarchy::new("root");
        let a = tree.add_interior(0, "a");
        tree.add_leaf(a, "b", 1.0);

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(
            json,
            r#"{"name":"root","children":[{"name":"a","children":[{"name":"b","value":1.0}]}]}"#
        );
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let mut tree = Hierarchy::new("root");
        tree.add_leaf(0, "x", f64::NAN);

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"name":"root","children":[{"name":"x","value":null}]}"#);
    }
}
