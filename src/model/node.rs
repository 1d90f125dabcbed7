//! Node module for hierarchy representation.

use crate::model::hierarchy::NodeIndex;

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// Represents a node of a [Hierarchy](crate::model::Hierarchy).
///
/// A node can be either:
/// - **Root**: Has children, no parent and no value
/// - **Interior**: Has a parent and children, no value
/// - **Leaf**: Has a parent and a value, no children
///
/// # Invariants
/// - `index` is the index of the node in the arena
/// - `name` is the path segment this node stands for; siblings may share names
/// - Interior and leaf nodes always have their `parent` set
/// - Only leaves carry a value, which may be `NaN` if the row's weight was
///   not numeric
#[derive(PartialEq, Debug, Clone)]
pub enum Node {
    /// Root node of the hierarchy (no parent)
    Root {
        /// Index of this node in the arena
        index: NodeIndex,
        /// Label of the whole hierarchy
        name: String,
        /// Indices of the children, in insertion order
        children: Vec<NodeIndex>,
    },
    /// Interior node (has parent and children, no value)
    Interior {
        /// Index of this node in the arena
        index: NodeIndex,
        /// Path segment of this node
        name: String,
        /// Index of the parent node
        parent: NodeIndex,
        /// Indices of the children, in insertion order
        children: Vec<NodeIndex>,
    },
    /// Leaf node (has parent and value, no children)
    Leaf {
        /// Index of this node in the arena
        index: NodeIndex,
        /// Path segment of this node
        name: String,
        /// Index of the parent node
        parent: NodeIndex,
        /// Weight taken from the row that ended in this node
        value: f64,
    },
}

impl Node {
    /// Creates a new root node without children.
    pub fn new_root(index: NodeIndex, name: impl Into<String>) -> Self {
        Node::Root {
            index,
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Creates a new interior node without children.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the arena
    /// * `name` - Path segment this node stands for
    /// * `parent` - Index of the parent node
    pub fn new_interior(index: NodeIndex, name: impl Into<String>, parent: NodeIndex) -> Self {
        Node::Interior {
            index,
            name: name.into(),
            parent,
            children: Vec::new(),
        }
    }

    /// Creates a new leaf node.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the arena
    /// * `name` - Path segment this node stands for
    /// * `parent` - Index of the parent node
    /// * `value` - Weight of the leaf
    pub fn new_leaf(index: NodeIndex, name: impl Into<String>, parent: NodeIndex, value: f64) -> Self {
        Node::Leaf {
            index,
            name: name.into(),
            parent,
            value,
        }
    }

    /// Returns the index of this node.
    pub fn index(&self) -> NodeIndex {
        match self {
            Node::Root { index, .. } | Node::Interior { index, .. } | Node::Leaf { index, .. } => {
                *index
            }
        }
    }

    /// Returns the name (path segment) of this node.
    pub fn name(&self) -> &str {
        match self {
            Node::Root { name, .. } | Node::Interior { name, .. } | Node::Leaf { name, .. } => {
                name
            }
        }
    }

    /// Returns the value if this is a leaf, else `None`.
    pub fn value(&self) -> Option<f64> {
        match self {
            Node::Leaf { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns the children if this is the root or an interior node, else `None`.
    ///
    /// An interior node may have an empty children list only transiently
    /// while the hierarchy is built.
    pub fn children(&self) -> Option<&[NodeIndex]> {
        match self {
            Node::Root { children, .. } | Node::Interior { children, .. } => Some(children),
            Node::Leaf { .. } => None,
        }
    }

    /// Returns the index of the parent if this is a non-root node, else `None`.
    pub fn parent(&self) -> Option<NodeIndex> {
        match self {
            Node::Interior { parent, .. } | Node::Leaf { parent, .. } => Some(*parent),
            Node::Root { .. } => None,
        }
    }

    /// Returns `true` if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Returns `true` if this node is an interior node.
    pub fn is_interior(&self) -> bool {
        matches!(self, Node::Interior { .. })
    }

    /// Returns `true` if this node is the root.
    pub fn is_root(&self) -> bool {
        matches!(self, Node::Root { .. })
    }

    /// Appends a child index.
    ///
    /// # Panics
    /// Panics if called on a leaf.
    pub(crate) fn push_child(&mut self, child: NodeIndex) {
        match self {
            Node::Root { children, .. } | Node::Interior { children, .. } => children.push(child),
            Node::Leaf { .. } => panic!("Cannot add child to leaf node"),
        }
    }

    /// Turns this node into a leaf with the given value, returning the
    /// children it had before (empty if it already was a leaf).
    ///
    /// # Panics
    /// Panics if called on the root.
    pub(crate) fn make_leaf(&mut self, value: f64) -> Vec<NodeIndex> {
        match self {
            Node::Root { .. } => panic!("Cannot turn root into a leaf"),
            Node::Leaf { value: v, .. } => {
                *v = value;
                Vec::new()
            }
            Node::Interior {
                index,
                name,
                parent,
                children,
            } => {
                let detached = std::mem::take(children);
                *self = Node::new_leaf(*index, std::mem::take(name), *parent, value);
                detached
            }
        }
    }

    /// Turns a leaf into an interior node without children, discarding its
    /// value. Root and interior nodes are left untouched.
    pub(crate) fn make_interior(&mut self) {
        if let Node::Leaf {
            index, name, parent, ..
        } = self
        {
            *self = Node::new_interior(*index, std::mem::take(name), *parent);
        }
    }

    /// Moves the name out of this node, leaving an empty one behind.
    pub(crate) fn take_name(&mut self) -> String {
        match self {
            Node::Root { name, .. } | Node::Interior { name, .. } | Node::Leaf { name, .. } => {
                std::mem::take(name)
            }
        }
    }
}
