//! Provides the arena-based hierarchy representation.
//!
//! Provides core data structures for representing built hierarchies:
//! * [Hierarchy] - Rooted tree of named nodes using the arena pattern
//! * [NodeIndex] as type used to index nodes in a hierarchy
//! * [PreOrderIter] and [PostOrderIter] for stack-based traversal

use crate::model::node::Node;
use std::fmt;

/// Index of a node in a hierarchy (arena).
pub type NodeIndex = usize;

/// Index of the root; the root is always the first node in the arena.
const ROOT_INDEX: NodeIndex = 0;

// =$========================================================================$=
// HIERARCHY
// =$========================================================================$=
/// A rooted tree of named [Node]s represented using the arena pattern.
///
/// Nodes are stored in a contiguous vector and referenced by [NodeIndex].
/// Parents own their children only through index lists, so there are no
/// back-references to manage and no sharing between trees.
///
/// # Structure
/// - The root is created together with the hierarchy and sits at index 0.
/// - Children are kept in insertion order.
/// - Interior nodes have children and no value, leaves have a value and
///   no children.
/// - Sibling names need not be unique.
///
/// # Construction
/// Hierarchies are usually produced by a
/// [TreeBuilder](crate::model::TreeBuilder) from rows, but can also be
/// assembled top-down with [add_interior()](Hierarchy::add_interior) and
/// [add_leaf()](Hierarchy::add_leaf).
///
/// ```
/// use rowtree::model::Hierarchy;
///
/// let mut tree = Hierarchy::new("root");
/// let a = tree.add_interior(tree.root_index(), "a");
/// tree.add_leaf(a, "b", 1.0);
/// tree.add_leaf(a, "c", 2.0);
///
/// assert_eq!(tree.num_leaves(), 2);
/// assert_eq!(tree.subtree_sum(a), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    /// Nodes of this hierarchy (arena pattern)
    nodes: Vec<Node>,
}

// ============================================================================
// New, Construction (pub)
// ============================================================================
impl Hierarchy {
    /// Creates a new hierarchy consisting of just a root with the given label.
    pub fn new(root_label: impl Into<String>) -> Self {
        Self::with_capacity(root_label, 1)
    }

    /// Creates a new hierarchy with room for `capacity` nodes (root included).
    pub fn with_capacity(root_label: impl Into<String>, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Node::new_root(ROOT_INDEX, root_label));
        Hierarchy { nodes }
    }

    /// Adds an interior node below `parent`, returning its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds or is a leaf.
    pub fn add_interior(&mut self, parent: NodeIndex, name: impl Into<String>) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new_interior(index, name, parent));
        self.nodes[parent].push_child(index);
        index
    }

    /// Adds a leaf with the given value below `parent`, returning its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds or is a leaf.
    pub fn add_leaf(&mut self, parent: NodeIndex, name: impl Into<String>, value: f64) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new_leaf(index, name, parent, value));
        self.nodes[parent].push_child(index);
        index
    }

    /// Turns the node at `index` into a leaf with `value`.
    ///
    /// Returns the children it had before; they stay in the arena but are no
    /// longer reachable from the root until [compacted()](Self::compacted)
    /// drops them.
    pub(crate) fn make_leaf(&mut self, index: NodeIndex, value: f64) -> Vec<NodeIndex> {
        self.nodes[index].make_leaf(value)
    }

    /// Turns the leaf at `index` into an interior node without children.
    pub(crate) fn make_interior(&mut self, index: NodeIndex) {
        self.nodes[index].make_interior();
    }

    /// Returns a copy of this hierarchy containing only the nodes reachable
    /// from the root, renumbered in pre-order.
    pub fn compacted(mut self) -> Self {
        let order: Vec<NodeIndex> = self.pre_order_iter().map(|n| n.index()).collect();
        if order.len() == self.nodes.len() {
            return self;
        }

        let mut new_index = vec![usize::MAX; self.nodes.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }

        let mut nodes = Vec::with_capacity(order.len());
        for (new, &old) in order.iter().enumerate() {
            let node = &mut self.nodes[old];
            let name = node.take_name();
            let rebuilt = match node {
                Node::Root { children, .. } => Node::Root {
                    index: new,
                    name,
                    children: children.iter().map(|&c| new_index[c]).collect(),
                },
                Node::Interior {
                    parent, children, ..
                } => Node::Interior {
                    index: new,
                    name,
                    parent: new_index[*parent],
                    children: children.iter().map(|&c| new_index[c]).collect(),
                },
                Node::Leaf { parent, value, .. } => Node::new_leaf(new, name, new_index[*parent], *value),
            };
            nodes.push(rebuilt);
        }

        Hierarchy { nodes }
    }
}

// ============================================================================
// Getters / Accessors, etc. (pub)
// ============================================================================
impl Hierarchy {
    /// Returns a reference to the root node.
    pub fn root(&self) -> &Node {
        &self.nodes[ROOT_INDEX]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> NodeIndex {
        ROOT_INDEX
    }

    /// Returns the label of the root.
    pub fn root_label(&self) -> &str {
        self.root().name()
    }

    /// Returns a reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self[index]
    }

    /// Returns the name of the node at the given index.
    pub fn name(&self, index: NodeIndex) -> &str {
        self[index].name()
    }

    /// Returns the value of the node at the given index, `None` unless it is a leaf.
    pub fn value(&self, index: NodeIndex) -> Option<f64> {
        self[index].value()
    }

    /// Returns the children of the node at the given index (empty for leaves).
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self[index].children().unwrap_or(&[])
    }

    /// Returns the parent of the node at the given index, `None` for the root.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self[index].parent()
    }

    /// Returns the number of leaves reachable from the root.
    pub fn num_leaves(&self) -> usize {
        self.pre_order_iter().filter(|n| n.is_leaf()).count()
    }

    /// Returns the number of interior nodes reachable from the root
    /// (the root itself not included).
    pub fn num_interior(&self) -> usize {
        self.pre_order_iter().filter(|n| n.is_interior()).count()
    }

    /// Returns the number of nodes reachable from the root, root included.
    pub fn num_nodes(&self) -> usize {
        self.pre_order_iter().count()
    }

    /// Returns `true` if the root has no children.
    pub fn is_empty(&self) -> bool {
        self.children(ROOT_INDEX).is_empty()
    }

    /// Returns the depth of the given node, i.e. its number of ancestors.
    pub fn depth(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = index;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Returns the height of the hierarchy, i.e. the largest depth of any node.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(ROOT_INDEX, 0)];
        while let Some((index, depth)) = stack.pop() {
            height = height.max(depth);
            for &child in self.children(index) {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Follows the given segments from the root and returns the node reached.
    ///
    /// At each level the first child (in insertion order) with a matching
    /// name is taken. An empty slice yields the root.
    pub fn find_path(&self, segments: &[&str]) -> Option<NodeIndex> {
        let mut current = ROOT_INDEX;
        for segment in segments {
            current = *self
                .children(current)
                .iter()
                .find(|&&child| self.name(child) == *segment)?;
        }
        Some(current)
    }

    /// Returns the sum of all leaf values in the subtree of the given node.
    ///
    /// A `NaN` leaf value makes the sum `NaN`.
    pub fn subtree_sum(&self, index: NodeIndex) -> f64 {
        self.pre_order_from(index).filter_map(|n| n.value()).sum()
    }

    /// Returns, for every node in the arena, the sum of leaf values in its
    /// subtree. Unreachable arena slots get `0.0`.
    pub fn subtree_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.nodes.len()];
        for node in self.post_order_iter() {
            let sum = match node.value() {
                Some(value) => value,
                None => self.children(node.index()).iter().map(|&c| sums[c]).sum(),
            };
            sums[node.index()] = sum;
        }
        sums
    }

    /// Returns the full path of every leaf, with segments joined by
    /// `separator` and the root label left out, together with its value.
    ///
    /// Leaves are listed in pre-order.
    pub fn leaf_paths(&self, separator: char) -> Vec<(String, f64)> {
        let mut paths = Vec::new();
        let mut stack = vec![(ROOT_INDEX, String::new())];
        while let Some((index, prefix)) = stack.pop() {
            let node = &self[index];
            let path = if node.is_root() {
                prefix
            } else if self.parent(index) == Some(ROOT_INDEX) {
                node.name().to_string()
            } else {
                format!("{prefix}{separator}{}", node.name())
            };

            match node.value() {
                Some(value) => paths.push((path, value)),
                None => {
                    for &child in self.children(index).iter().rev() {
                        stack.push((child, path.clone()));
                    }
                }
            }
        }
        paths
    }
}

// ============================================================================
// Validation (pub)
// ============================================================================
impl Hierarchy {
    /// Validates the structure and all index references.
    ///
    /// Checks:
    /// - The first node is the only root
    /// - All node indices match their position in the arena
    /// - All child indices are in bounds and point back to their parent
    /// - Every node is reached exactly once from the root
    /// - Leaf values are only on leaves (guaranteed by [Node])
    ///
    /// # Returns
    /// `true` if the hierarchy is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if !self.nodes.first().is_some_and(|n| n.is_root()) {
            return false;
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![ROOT_INDEX];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];

            // Check node index matches its arena position
            if node.index() != index {
                return false;
            }

            // Check node is not reached twice
            if seen[index] {
                return false;
            }
            seen[index] = true;

            if index != ROOT_INDEX && node.is_root() {
                return false;
            }

            for &child in self.children(index) {
                if child >= self.nodes.len() {
                    return false;
                }
                if self.nodes[child].parent() != Some(index) {
                    return false;
                }
                stack.push(child);
            }
        }

        // Every arena slot has to be reachable
        seen.into_iter().all(|s| s)
    }
}

impl std::ops::Index<NodeIndex> for Hierarchy {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
impl Hierarchy {
    /// Prints a visual representation of the hierarchy to the console.
    ///
    /// # Example Output
    /// ```text
    /// root (2 leaves, 4 nodes total)
    /// └─ a
    ///    ├─ b = 1
    ///    └─ c = 2
    /// ```
    pub fn print_tree(&self) {
        print!("{self}");
    }

    /// Helper function to recursively write a node and its children.
    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, index: NodeIndex, prefix: &str, is_last: bool) -> fmt::Result {
        let node = &self[index];
        let connector = if is_last { "└─ " } else { "├─ " };

        match node.value() {
            Some(value) => writeln!(f, "{prefix}{connector}{} = {value}", node.name())?,
            None => writeln!(f, "{prefix}{connector}{}", node.name())?,
        }

        let new_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
        let children = self.children(index);
        for (i, &child) in children.iter().enumerate() {
            self.fmt_node(f, child, &new_prefix, i + 1 == children.len())?;
        }
        Ok(())
    }
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} leaves, {} nodes total)",
            self.root_label(),
            self.num_leaves(),
            self.num_nodes()
        )?;

        let children = self.children(ROOT_INDEX);
        for (i, &child) in children.iter().enumerate() {
            self.fmt_node(f, child, "", i + 1 == children.len())?;
        }
        Ok(())
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl Hierarchy {
    /// Returns an iterator over the hierarchy in pre-order (parents before
    /// children, siblings in insertion order).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        self.pre_order_from(ROOT_INDEX)
    }

    /// Returns a pre-order iterator over the subtree of the given node.
    pub fn pre_order_from(&self, index: NodeIndex) -> PreOrderIter<'_> {
        PreOrderIter {
            tree: self,
            stack: vec![index],
        }
    }

    /// Returns an iterator over the hierarchy in post-order (children before
    /// parents). Useful for aggregating values from the leaves upward.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            tree: self,
            stack: vec![(ROOT_INDEX, false)],
        }
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// Uses an explicit stack, so deep hierarchies do not recurse.
pub struct PreOrderIter<'a> {
    tree: &'a Hierarchy,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];

        // Push children reversed, so the first child is processed first
        self.stack.extend(self.tree.children(index).iter().rev());

        Some(node)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// Each node is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Hierarchy,
    stack: Vec<(NodeIndex, bool)>, // (index, children_visited)
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            if children_visited || node.is_leaf() {
                return Some(node);
            }

            self.stack.push((index, true));
            for &child in self.tree.children(index).iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
