//! Hierarchy model and its construction from flat rows.
//!
//! # Overview
//! A [Hierarchy] is an arena of [Node]s addressed by [NodeIndex]; the root is
//! always at index 0. Nodes know their parent and their children (in
//! insertion order), but hold no references, only indices.
//!
//! [TreeBuilder] turns [Row](crate::rows::Row)s into a hierarchy, interning
//! every prefix it creates in a [PathIndex] so rows with a common prefix share
//! nodes. How paths are split, whether leaves are deduplicated and what the
//! root is called is set by a [BuilderConfig]; one preset exists per
//! [TreeVariant].
//!
//! A finished hierarchy serializes to the nested `{ name, value, children }`
//! form consumed by layout code; [TreeNode] is the owned version of that
//! form.

/// Errors for rows that cannot be placed
pub mod build_error;
/// Row-by-row hierarchy construction
pub mod builder;
/// Arena-based hierarchy and traversal
pub mod hierarchy;
/// Nested `{ name, value, children }` representation
pub mod nested;
/// Node types (root, interior, leaf)
pub mod node;
/// Prefix to node lookup used while building
pub mod path_index;

pub use build_error::{BuildError, BuildErrorKind};
pub use builder::{
    BuildStats, BuilderConfig, ConflictPolicy, RowPolicy, TreeBuilder, TreeVariant, UnknownVariant,
    build_tree,
};
pub use hierarchy::{Hierarchy, NodeIndex};
pub use nested::TreeNode;
pub use node::Node;
pub use path_index::{PathIndex, PathKey};
