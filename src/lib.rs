//! Rowtree builds hierarchies from flat rows and renders them as pages.
//!
//! Tabular datasets often describe a hierarchy implicitly: every row carries
//! a path-like identifier (`flare.analytics.cluster.MergeEdge`,
//! `src/components/App.vue`, `1.01.02`) and a numeric weight. This crate
//! turns such rows into a rooted tree with weights on the leaves, ready for
//! hierarchical layouts such as circle packing, partition, treemap or radial
//! trees.
//!
//! Core functionality provided:
//! - Rows: Read rows from CSV or JSON ([crate::rows]), with loose numeric
//!   coercion of weights.
//! - Tree builder: One [TreeBuilder](crate::model::TreeBuilder) for all
//!   input shapes, configured by a
//!   [BuilderConfig](crate::model::BuilderConfig):
//!   - `dotted`: split and joined on `.`, root `root`
//!   - `file-path`: split on `/` or `.`, joined on `/`, root `root`
//!   - `admin-code`: split on `.`, named root, every row appends its own leaf
//! - Tree model: [Hierarchy](crate::model::Hierarchy), an arena of nodes
//!   addressed by index, serializing to nested `{ name, value, children }`.
//! - Pages: HTML pages driving d3 layouts ([crate::render]) and a
//!   [PageHandler](crate::handler::PageHandler) serving configured pages
//!   ([crate::config]) from a [TextSource](crate::source::TextSource).
//!
//! Policies:
//! - Malformed rows (no path, empty path) abort the build by default, or are
//!   skipped and reported with [RowPolicy::Lenient](crate::model::RowPolicy).
//! - Non-numeric weights never fail; the leaf gets `NaN`.
//! - If rows disagree whether a path is a leaf, the last row wins by default;
//!   [ConflictPolicy::Reject](crate::model::ConflictPolicy) turns this into
//!   an error instead.
//!
//! # Usage patterns
//! 1. The quick API below builds a tree with a variant's defaults.
//! 2. Configure a [TreeBuilder](crate::model::TreeBuilder) yourself for full
//!    control over root label, row policy and conflict policy.
//!
//! ## Example Default Configuration
//! ```
//! use rowtree::{build_dotted_tree, parse_rows};
//! use rowtree::rows::{Columns, RowFormat};
//!
//! let text = "id,value\nflare.vis.Axis,24593\nflare.vis.Legend,20859\n";
//! let rows = parse_rows(text, RowFormat::Csv, &Columns::flare())?;
//! let tree = build_dotted_tree(&rows)?;
//!
//! assert_eq!(tree.num_leaves(), 2);
//! assert_eq!(tree.subtree_sum(tree.root_index()), 45452.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Example Builder Configuration
//! ```
//! use rowtree::model::{BuilderConfig, ConflictPolicy, RowPolicy, TreeBuilder};
//! use rowtree::rows::Row;
//!
//! let config = BuilderConfig::admin_code()
//!     .with_root_label("Panamá")
//!     .with_row_policy(RowPolicy::Lenient)
//!     .with_conflict_policy(ConflictPolicy::Reject);
//!
//! let mut builder = TreeBuilder::new(config);
//! builder.add_rows(&[Row::new("8.01", "1200"), Row::without_weight(""), Row::new("8.02", "950")])?;
//! let (tree, stats) = builder.finish_with_stats();
//!
//! assert_eq!(tree.root_label(), "Panamá");
//! assert_eq!(tree.num_leaves(), 2);
//! assert_eq!(stats.skipped.len(), 1);
//! # Ok::<(), rowtree::model::BuildError>(())
//! ```

pub mod config;
pub mod handler;
pub mod model;
pub mod render;
pub mod rows;
pub mod source;

pub use crate::rows::parse_rows;

use crate::model::{build_tree, BuildError, BuilderConfig, Hierarchy};
use crate::rows::Row;

// ============================================================================
// Quick API
// ============================================================================
/// Builds a hierarchy from dot-delimited paths below a root named `root`,
/// using default settings.
///
/// See [BuilderConfig::dotted] for the configuration used.
pub fn build_dotted_tree<'a, I>(rows: I) -> Result<Hierarchy, BuildError>
where
    I: IntoIterator<Item = &'a Row>,
{
    build_tree(rows, BuilderConfig::dotted())
}

/// Builds a hierarchy from slash- or dot-delimited file paths below a root
/// named `root`, using default settings.
///
/// See [BuilderConfig::file_path] for the configuration used.
///
/// # Example
/// ```
/// use rowtree::build_file_path_tree;
/// use rowtree::rows::Row;
///
/// let tree = build_file_path_tree(&[Row::new("src/app.js", "100")])?;
/// assert!(tree.find_path(&["src", "app", "js"]).is_some());
/// # Ok::<(), rowtree::model::BuildError>(())
/// ```
pub fn build_file_path_tree<'a, I>(rows: I) -> Result<Hierarchy, BuildError>
where
    I: IntoIterator<Item = &'a Row>,
{
    build_tree(rows, BuilderConfig::file_path())
}

/// Builds a hierarchy from dot-delimited administrative codes below a root
/// named `root_label`, using default settings. Every row becomes its own
/// leaf.
///
/// See [BuilderConfig::admin_code] for the configuration used.
pub fn build_admin_code_tree<'a, I>(rows: I, root_label: &str) -> Result<Hierarchy, BuildError>
where
    I: IntoIterator<Item = &'a Row>,
{
    build_tree(rows, BuilderConfig::admin_code().with_root_label(root_label))
}
