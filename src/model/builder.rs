//! Construction of a [Hierarchy] from flat rows.
//!
//! The [TreeBuilder] takes rows one at a time, splits each row's path into
//! segments and walks them from the root. Every prefix seen so far is
//! interned in a [PathIndex], so rows sharing a prefix share the node for it.
//! The last segment of a row receives the row's weight.
//!
//! # Variants
//! The three supported input shapes differ only in configuration
//! ([BuilderConfig]), not in algorithm:
//!
//! | [TreeVariant] | split on | join with | root | leaf dedupe |
//! |------|------|------|------|------|
//! | [Dotted](TreeVariant::Dotted) | `.` | `.` | `root` | yes |
//! | [FilePath](TreeVariant::FilePath) | `/` or `.` | `/` | `root` | yes |
//! | [AdminCode](TreeVariant::AdminCode) | `.` | `.` | `Costa Rica` | no |
//!
//! With leaf dedupe, the full path of a row is interned like its prefixes, so
//! a repeated path overwrites the earlier value. Without it, the last segment
//! is never looked up: every row appends a new leaf below the deepest
//! interior node, even if an identical leaf exists.
//!
//! # Policies
//! * [RowPolicy] decides what happens to a malformed or conflicting row:
//!   abort the build ([Strict](RowPolicy::Strict), default) or skip the row
//!   and record it in [BuildStats] ([Lenient](RowPolicy::Lenient)).
//! * [ConflictPolicy] decides what happens if a row disagrees with an earlier
//!   row about whether a node is a leaf:
//!   - [LastWins](ConflictPolicy::LastWins) (default): a leaf used as prefix
//!     becomes an interior node and loses its value; an interior node used as
//!     full path becomes a leaf and its subtree is dropped.
//!   - [Reject](ConflictPolicy::Reject): the row fails with a conflict error.
//!
//! A row is checked against the index before anything is created, so a row
//! that fails never leaves partial nodes behind.
//!
//! # Weights
//! Weights are coerced with [parse_weight]. Non-numeric weights do not fail
//! the build; the leaf gets `NaN` and the row is listed in
//! [BuildStats::invalid_weights].

use crate::model::build_error::{BuildError, BuildErrorKind};
use crate::model::hierarchy::{Hierarchy, NodeIndex};
use crate::model::path_index::PathIndex;
use crate::rows::{parse_weight, Columns, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default root label of the administrative code variant.
pub const DEFAULT_ADMIN_ROOT: &str = "Costa Rica";

/// Default root label of the dotted and file path variants.
pub const DEFAULT_ROOT: &str = "root";

// =#========================================================================#=
// TREE VARIANT
// =#========================================================================#=
/// Supported input shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeVariant {
    /// Dot-delimited identifiers, e.g. `flare.analytics.cluster.MergeEdge`
    Dotted,
    /// Slash- or dot-delimited file paths, e.g. `src/components/App.vue`
    FilePath,
    /// Dot-delimited administrative codes, e.g. `1.01.02`
    AdminCode,
}

impl TreeVariant {
    /// Returns the path and weight columns datasets of this shape usually have.
    pub fn default_columns(&self) -> Columns {
        match self {
            TreeVariant::Dotted => Columns::flare(),
            TreeVariant::FilePath => Columns::vue(),
            TreeVariant::AdminCode => Columns::districts(),
        }
    }

    /// Returns the name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeVariant::Dotted => "dotted",
            TreeVariant::FilePath => "file-path",
            TreeVariant::AdminCode => "admin-code",
        }
    }
}

impl fmt::Display for TreeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized variant name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tree variant '{0}' (expected dotted, file-path or admin-code)")]
pub struct UnknownVariant(pub String);

impl FromStr for TreeVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dotted" => Ok(TreeVariant::Dotted),
            "file-path" => Ok(TreeVariant::FilePath),
            "admin-code" => Ok(TreeVariant::AdminCode),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

// =#========================================================================#=
// POLICIES
// =#========================================================================#=
/// What to do with a row that cannot be placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowPolicy {
    /// Abort the build and report the row (default)
    #[default]
    Strict,
    /// Skip the row, log it and record it in [BuildStats::skipped]
    Lenient,
}

/// How to resolve rows disagreeing about whether a node is a leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The latest row decides the node's role (default)
    #[default]
    LastWins,
    /// Conflicting rows fail
    Reject,
}

// =#========================================================================#=
// BUILDER CONFIG
// =#========================================================================#=
/// Parameters of the [TreeBuilder].
///
/// Use one of the presets ([dotted()](Self::dotted),
/// [file_path()](Self::file_path), [admin_code()](Self::admin_code)) and
/// adjust with the `with_*` methods.
///
/// # Example
/// ```
/// use rowtree::model::{BuilderConfig, RowPolicy};
///
/// let config = BuilderConfig::admin_code()
///     .with_root_label("Panamá")
///     .with_row_policy(RowPolicy::Lenient);
/// assert!(!config.leaf_dedupe);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    /// Characters separating segments in the input path
    pub split_on: Vec<char>,
    /// Separator used to join segments into path index keys
    pub join_with: char,
    /// Label of the root node
    pub root_label: String,
    /// Whether full paths are interned, so a repeated path reuses its leaf
    pub leaf_dedupe: bool,
    /// Whether the root is registered in the path index under its own label
    pub index_root: bool,
    /// Handling of rows that cannot be placed
    pub row_policy: RowPolicy,
    /// Handling of leaf/interior disagreements
    pub conflict_policy: ConflictPolicy,
}

impl BuilderConfig {
    /// Dot-delimited identifiers below a root named `root`.
    pub fn dotted() -> Self {
        BuilderConfig {
            split_on: vec!['.'],
            join_with: '.',
            root_label: DEFAULT_ROOT.to_string(),
            leaf_dedupe: true,
            index_root: false,
            row_policy: RowPolicy::default(),
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// File paths split on `/` and `.`, joined with `/`, below a root named
    /// `root`. Mixed delimiters normalize to the same key, so `a/b.c` and
    /// `a.b/c` end up in the same leaf.
    pub fn file_path() -> Self {
        BuilderConfig {
            split_on: vec!['/', '.'],
            join_with: '/',
            root_label: DEFAULT_ROOT.to_string(),
            leaf_dedupe: true,
            index_root: true,
            row_policy: RowPolicy::default(),
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Dot-delimited administrative codes below a named root; every row
    /// appends its own leaf.
    pub fn admin_code() -> Self {
        BuilderConfig {
            split_on: vec!['.'],
            join_with: '.',
            root_label: DEFAULT_ADMIN_ROOT.to_string(),
            leaf_dedupe: false,
            index_root: true,
            row_policy: RowPolicy::default(),
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Returns the preset for the given variant.
    pub fn for_variant(variant: TreeVariant) -> Self {
        match variant {
            TreeVariant::Dotted => Self::dotted(),
            TreeVariant::FilePath => Self::file_path(),
            TreeVariant::AdminCode => Self::admin_code(),
        }
    }

    /// Sets the label of the root node.
    pub fn with_root_label(mut self, root_label: impl Into<String>) -> Self {
        self.root_label = root_label.into();
        self
    }

    /// Sets the [RowPolicy].
    pub fn with_row_policy(mut self, row_policy: RowPolicy) -> Self {
        self.row_policy = row_policy;
        self
    }

    /// Sets the [ConflictPolicy].
    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }

    fn splits_on(&self, c: char) -> bool {
        self.split_on.contains(&c)
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::dotted()
    }
}

// =#========================================================================#=
// BUILD STATS
// =#========================================================================#=
/// What happened while building.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildStats {
    /// Number of rows handed to the builder
    pub rows: usize,
    /// Rows skipped under [RowPolicy::Lenient]
    pub skipped: Vec<BuildError>,
    /// Indices of rows whose weight was not numeric (stored as `NaN`)
    pub invalid_weights: Vec<usize>,
    /// Leaves turned into interior nodes under [ConflictPolicy::LastWins]
    pub demoted: usize,
    /// Interior nodes turned into leaves under [ConflictPolicy::LastWins]
    pub detached: usize,
}

impl BuildStats {
    /// Number of rows that ended up in the hierarchy.
    pub fn placed(&self) -> usize {
        self.rows - self.skipped.len()
    }
}

// =#========================================================================#=
// TREE BUILDER
// =#========================================================================#=
/// Builds one [Hierarchy] from a sequence of rows.
///
/// # Builder lifecycle
/// ```text
/// new(config) ──→ add_row()* ──→ finish() ──→ Hierarchy
/// ```
/// Each builder owns its hierarchy and path index; independent builders can
/// run on different threads without sharing anything.
///
/// # Example
/// ```
/// use rowtree::model::TreeBuilder;
/// use rowtree::model::TreeVariant;
/// use rowtree::rows::Row;
///
/// let rows = vec![Row::new("a.b", "1"), Row::new("a.c", "2")];
/// let tree = TreeBuilder::for_variant(TreeVariant::Dotted).build(&rows)?;
///
/// let a = tree.find_path(&["a"]).unwrap();
/// assert_eq!(tree.children(a).len(), 2);
/// assert_eq!(tree.subtree_sum(a), 3.0);
/// # Ok::<(), rowtree::model::BuildError>(())
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    config: BuilderConfig,
    tree: Hierarchy,
    index: PathIndex,
    stats: BuildStats,
    /// Set once a subtree was detached, so `finish` has to compact
    needs_compaction: bool,
}

// ============================================================================
// Building (pub)
// ============================================================================
impl TreeBuilder {
    /// Creates a builder with an empty hierarchy for the given configuration.
    pub fn new(config: BuilderConfig) -> Self {
        let tree = Hierarchy::new(config.root_label.clone());
        let mut index = PathIndex::new();
        if config.index_root {
            index.insert(&config.root_label, tree.root_index());
        }

        TreeBuilder {
            config,
            tree,
            index,
            stats: BuildStats::default(),
            needs_compaction: false,
        }
    }

    /// Creates a builder with the preset configuration of a variant.
    pub fn for_variant(variant: TreeVariant) -> Self {
        Self::new(BuilderConfig::for_variant(variant))
    }

    /// Sets the [RowPolicy] for all following rows.
    pub fn with_row_policy(mut self, row_policy: RowPolicy) -> Self {
        self.config.row_policy = row_policy;
        self
    }

    /// Sets the [ConflictPolicy] for all following rows.
    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.config.conflict_policy = conflict_policy;
        self
    }

    /// Returns the configuration of this builder.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Returns the statistics gathered so far.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Places one row into the hierarchy.
    ///
    /// Rows are numbered in the order they are added, starting at 0; errors
    /// refer to that number.
    ///
    /// # Errors
    /// Under [RowPolicy::Strict], a [BuildError] if the row is malformed or
    /// conflicts with earlier rows. Under [RowPolicy::Lenient] such rows are
    /// skipped and this always succeeds.
    pub fn add_row(&mut self, row: &Row) -> Result<(), BuildError> {
        let row_index = self.stats.rows;
        self.stats.rows += 1;

        match self.place_row(row_index, row) {
            Ok(()) => Ok(()),
            Err(err) => match self.config.row_policy {
                RowPolicy::Strict => Err(err),
                RowPolicy::Lenient => {
                    warn!(row = row_index, error = %err, "skipping row");
                    self.stats.skipped.push(err);
                    Ok(())
                }
            },
        }
    }

    /// Places all given rows, in order.
    ///
    /// # Errors
    /// The first error [add_row()](Self::add_row) reports.
    pub fn add_rows<'a, I>(&mut self, rows: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        for row in rows {
            self.add_row(row)?;
        }
        Ok(())
    }

    /// Finalizes the building process and returns the hierarchy.
    pub fn finish(self) -> Hierarchy {
        self.finish_with_stats().0
    }

    /// Like [finish()](Self::finish), also returning the [BuildStats].
    pub fn finish_with_stats(self) -> (Hierarchy, BuildStats) {
        let tree = if self.needs_compaction {
            self.tree.compacted()
        } else {
            self.tree
        };

        info!(
            root = tree.root_label(),
            rows = self.stats.rows,
            skipped = self.stats.skipped.len(),
            invalid_weights = self.stats.invalid_weights.len(),
            leaves = tree.num_leaves(),
            "built hierarchy"
        );
        (tree, self.stats)
    }

    /// Places all rows and returns the finished hierarchy.
    ///
    /// # Errors
    /// The first [BuildError] under [RowPolicy::Strict].
    pub fn build<'a, I>(mut self, rows: I) -> Result<Hierarchy, BuildError>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        self.add_rows(rows)?;
        Ok(self.finish())
    }
}

// ============================================================================
// Row placement (private)
// ============================================================================
impl TreeBuilder {
    fn place_row(&mut self, row_index: usize, row: &Row) -> Result<(), BuildError> {
        let path = row
            .path
            .as_deref()
            .ok_or_else(|| BuildError::new(BuildErrorKind::MissingPath, row_index))?;
        if path.is_empty() {
            return Err(BuildError::new(BuildErrorKind::EmptyPath, row_index));
        }

        let segments: Vec<&str> = path.split(|c| self.config.splits_on(c)).collect();
        self.check(&segments)
            .map_err(|kind| BuildError::new(kind, row_index))?;

        let value = match row.weight.as_deref().and_then(parse_weight) {
            Some(value) => value,
            None => {
                debug!(row = row_index, weight = ?row.weight, "weight is not numeric, storing NaN");
                self.stats.invalid_weights.push(row_index);
                f64::NAN
            }
        };

        self.insert(&segments, value);
        Ok(())
    }

    /// Number of segments that are looked up in the path index.
    fn walk_len(&self, num_segments: usize) -> usize {
        if self.config.leaf_dedupe {
            num_segments
        } else {
            num_segments - 1
        }
    }

    /// Read-only pass over the index, finding every reason the row cannot be
    /// placed before any node is created.
    fn check(&self, segments: &[&str]) -> Result<(), BuildErrorKind> {
        let walk_len = self.walk_len(segments.len());
        let reject = self.config.conflict_policy == ConflictPolicy::Reject;

        let mut key = String::new();
        for (i, segment) in segments[..walk_len].iter().enumerate() {
            if i > 0 {
                key.push(self.config.join_with);
            }
            key.push_str(segment);

            // Keys are only ever registered prefix by prefix, so nothing
            // deeper can exist once a prefix is unknown
            let Some(node) = self.index.get(&key) else {
                return Ok(());
            };
            let node = &self.tree[node];
            let is_terminal = i + 1 == segments.len();

            if is_terminal {
                if node.is_root() {
                    return Err(BuildErrorKind::RootCollision(key));
                }
                if reject && node.is_interior() {
                    return Err(BuildErrorKind::InteriorUsedAsLeaf(key));
                }
            } else if reject && node.is_leaf() {
                return Err(BuildErrorKind::LeafUsedAsPrefix(key));
            }
        }
        Ok(())
    }

    /// Walks (and extends) the hierarchy along `segments`; must only be
    /// called after [check()](Self::check) accepted the row.
    fn insert(&mut self, segments: &[&str], value: f64) {
        let walk_len = self.walk_len(segments.len());
        let join_with = self.config.join_with;

        let mut current: NodeIndex = self.tree.root_index();
        let mut key = String::new();
        for (i, &segment) in segments[..walk_len].iter().enumerate() {
            if i > 0 {
                key.push(join_with);
            }
            key.push_str(segment);
            let is_terminal = i + 1 == segments.len();

            current = match self.index.get(&key) {
                Some(node) if is_terminal => {
                    let detached = self.tree.make_leaf(node, value);
                    if !detached.is_empty() {
                        let purged = self.purge_subtree(&key, &detached);
                        debug!(path = %key, purged, "interior node became a leaf, dropping its subtree");
                        self.stats.detached += 1;
                        self.needs_compaction = true;
                    }
                    node
                }
                Some(node) => {
                    if self.tree[node].is_leaf() {
                        debug!(path = %key, "leaf became an interior node, dropping its value");
                        self.tree.make_interior(node);
                        self.stats.demoted += 1;
                    }
                    node
                }
                None => {
                    let tree = &mut self.tree;
                    self.index.get_or_insert_with(&key, || {
                        if is_terminal {
                            tree.add_leaf(current, segment, value)
                        } else {
                            tree.add_interior(current, segment)
                        }
                    })
                }
            };
        }

        if !self.config.leaf_dedupe {
            // Leaves of non-deduplicating variants are never looked up
            self.tree.add_leaf(current, segments[segments.len() - 1], value);
        }
    }

    /// Unregisters the keys of all nodes below the one at `key`, given the
    /// children it was just detached from. Only the detached nodes are
    /// visited.
    ///
    /// # Returns
    /// The number of removed keys
    fn purge_subtree(&mut self, key: &str, detached: &[NodeIndex]) -> usize {
        let join_with = self.config.join_with;
        let mut purged = 0;
        let mut stack: Vec<(NodeIndex, String)> = detached
            .iter()
            .map(|&child| (child, format!("{key}{join_with}{}", self.tree.name(child))))
            .collect();

        while let Some((node, child_key)) = stack.pop() {
            if self.index.remove(&child_key).is_some() {
                purged += 1;
            }
            for &child in self.tree.children(node) {
                stack.push((child, format!("{child_key}{join_with}{}", self.tree.name(child))));
            }
        }
        purged
    }
}

// ============================================================================
// Convenience (pub)
// ============================================================================
/// Builds a hierarchy from `rows` with the given configuration.
///
/// # Errors
/// The first [BuildError] under [RowPolicy::Strict].
pub fn build_tree<'a, I>(rows: I, config: BuilderConfig) -> Result<Hierarchy, BuildError>
where
    I: IntoIterator<Item = &'a Row>,
{
    TreeBuilder::new(config).build(rows)
}
