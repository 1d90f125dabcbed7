//! Text sources datasets are fetched from.
//!
//! This module provides the [TextSource] trait and two implementations:
//! [DirSource] reads files relative to a base directory, [MemorySource] serves
//! texts registered in memory. Remote fetching is left to callers, who can
//! implement [TextSource] for their own client.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

// =#========================================================================#=
// TEXT SOURCE (Trait)
// =#========================================================================#=
/// Trait defining how the raw text of a dataset is obtained.
///
/// Sources are shared between threads while several datasets of one page are
/// fetched in parallel, hence `Send + Sync`.
pub trait TextSource: Send + Sync {
    /// Fetches the full text stored at `location`.
    ///
    /// # Arguments
    /// * `location` - Source specific location, e.g. a relative file name
    ///
    /// # Errors
    /// [SourceError] if nothing can be read at `location`.
    fn fetch(&self, location: &str) -> Result<String, SourceError>;
}

impl<S: TextSource + ?Sized> TextSource for &S {
    fn fetch(&self, location: &str) -> Result<String, SourceError> {
        (**self).fetch(location)
    }
}

impl<S: TextSource + ?Sized> TextSource for Box<S> {
    fn fetch(&self, location: &str) -> Result<String, SourceError> {
        (**self).fetch(location)
    }
}

// =#========================================================================#=
// SOURCE ERROR
// =#========================================================================#=
/// Errors while fetching dataset text.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing is registered or stored at the location.
    #[error("nothing found at '{0}'")]
    NotFound(String),

    /// The location tries to leave the base directory.
    #[error("location '{0}' is outside of the data directory")]
    OutsideBase(String),

    /// Reading failed.
    #[error("failed to read '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

// =#========================================================================#=
// DIR SOURCE
// =#========================================================================#=
/// Reads locations as file paths relative to a base directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    base: PathBuf,
}

impl DirSource {
    /// Creates a source reading below `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        DirSource { base: base.into() }
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(location);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SourceError::OutsideBase(location.to_string()));
        }
        Ok(self.base.join(relative))
    }
}

impl TextSource for DirSource {
    fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let path = self.resolve(location)?;
        debug!(path = %path.display(), "reading dataset file");
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(location.to_string()),
            _ => SourceError::Io {
                location: location.to_string(),
                source,
            },
        })
    }
}

// =#========================================================================#=
// MEMORY SOURCE
// =#========================================================================#=
/// Serves texts registered under their location.
///
/// # Example
/// ```
/// use rowtree::source::{MemorySource, TextSource};
///
/// let source = MemorySource::new().with("flare.csv", "id,value\nflare,1\n");
/// assert!(source.fetch("flare.csv").is_ok());
/// assert!(source.fetch("vue.csv").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    texts: HashMap<String, String>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` under `location`, replacing earlier text.
    pub fn insert(&mut self, location: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(location.into(), text.into());
    }

    /// Builder style version of [insert()](Self::insert).
    pub fn with(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }
}

impl TextSource for MemorySource {
    fn fetch(&self, location: &str) -> Result<String, SourceError> {
        self.texts
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_source_rejects_escaping_locations() {
        let source = DirSource::new("data");
        assert!(matches!(source.resolve("../secret"), Err(SourceError::OutsideBase(_))));
        assert!(matches!(source.resolve("/etc/passwd"), Err(SourceError::OutsideBase(_))));
        assert_eq!(source.resolve("./a/flare.csv").unwrap(), Path::new("data/./a/flare.csv"));
    }
}
