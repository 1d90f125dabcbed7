//! Error types for hierarchy construction.
//!
//! This module provides [BuildError] and [BuildErrorKind] for representing
//! and reporting rows that could not be placed into a hierarchy.

use thiserror::Error;

// =#========================================================================#=
// BUILD ERROR KIND
// =#========================================================================#=
/// Reasons a row cannot be placed into the hierarchy.
///
/// [MissingPath](Self::MissingPath) and [EmptyPath](Self::EmptyPath) make up
/// malformed rows; the other kinds depend on previously added rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildErrorKind {
    /// The row has no path field at all.
    #[error("row has no path field")]
    MissingPath,

    /// The path field is empty, so there is no segment to place.
    #[error("path field is empty")]
    EmptyPath,

    /// A prefix of the path is already a leaf (only raised when conflicts
    /// are rejected).
    #[error("prefix '{0}' is already a leaf")]
    LeafUsedAsPrefix(String),

    /// The full path is already an interior node with children (only raised
    /// when conflicts are rejected).
    #[error("path '{0}' already has children")]
    InteriorUsedAsLeaf(String),

    /// The full path resolves to the root itself, which cannot carry a value.
    #[error("path '{0}' resolves to the root")]
    RootCollision(String),
}

// =#========================================================================#=
// BUILD ERROR
// =#========================================================================$=
/// Build error with the index of the offending row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at row {row}")]
pub struct BuildError {
    kind: BuildErrorKind,
    row: usize,
}

impl BuildError {
    /// Creates an error for the row at position `row`.
    pub fn new(kind: BuildErrorKind, row: usize) -> Self {
        Self { kind, row }
    }

    /// Get the error kind
    pub fn kind(&self) -> &BuildErrorKind {
        &self.kind
    }

    /// Get the index of the row (0-based, in input order)
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns `true` if the row itself is malformed, independent of other rows.
    pub fn is_malformed_row(&self) -> bool {
        matches!(
            self.kind,
            BuildErrorKind::MissingPath | BuildErrorKind::EmptyPath
        )
    }

    /// Returns `true` if the row clashes with the classification of a node
    /// created by an earlier row.
    pub fn is_path_conflict(&self) -> bool {
        matches!(
            self.kind,
            BuildErrorKind::LeafUsedAsPrefix(_) | BuildErrorKind::InteriorUsedAsLeaf(_)
        )
    }
}
