//! Configuration of datasets and pages.
//!
//! Configuration is read from TOML. Each `[[dataset]]` names a location to
//! fetch, the input shape and optionally the columns to read; each `[[page]]`
//! shows some of those datasets in one layout.
//!
//! ```toml
//! [[dataset]]
//! name = "flare"
//! location = "flare.csv"
//! variant = "dotted"
//!
//! [[dataset]]
//! name = "distritos"
//! location = "distritos_cr.csv"
//! variant = "admin-code"
//! root_label = "Costa Rica"
//! row_policy = "lenient"
//!
//! [[page]]
//! layout = "treemap"
//! datasets = ["flare", "distritos"]
//! ```
//!
//! Without a configuration file, [Config::default] serves the three bundled
//! datasets (`flare`, `vue`, `distritos`) on all four layouts.

use crate::model::{BuilderConfig, ConflictPolicy, RowPolicy, TreeVariant};
use crate::render::Layout;
use crate::rows::{Columns, RowFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

// =#========================================================================#=
// CONFIG ERROR
// =#========================================================================#=
/// Errors while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The text is not valid TOML for a configuration.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two datasets share a name.
    #[error("dataset '{0}' is defined more than once")]
    DuplicateDataset(String),

    /// Two pages use the same layout.
    #[error("more than one page uses layout '{0}'")]
    DuplicatePage(Layout),

    /// A page refers to a dataset that is not defined.
    #[error("page '{page}' refers to unknown dataset '{dataset}'")]
    UnknownDataset { page: Layout, dataset: String },
}

// =#========================================================================#=
// DATASET CONFIG
// =#========================================================================#=
/// How the text of a dataset is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// Rows as CSV with a header line
    Csv,
    /// Rows as a JSON array of objects
    Json,
    /// An already nested `{ name, value, children }` JSON object
    Nested,
}

impl DatasetFormat {
    /// Guesses the format: a JSON object is taken as nested hierarchy, a JSON
    /// array as rows, anything else as CSV.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            DatasetFormat::Nested
        } else {
            match RowFormat::detect(text) {
                RowFormat::Json => DatasetFormat::Json,
                RowFormat::Csv => DatasetFormat::Csv,
            }
        }
    }

    /// Returns the row format, or `None` for nested input.
    pub fn row_format(&self) -> Option<RowFormat> {
        match self {
            DatasetFormat::Csv => Some(RowFormat::Csv),
            DatasetFormat::Json => Some(RowFormat::Json),
            DatasetFormat::Nested => None,
        }
    }
}

/// One dataset: where to fetch it and how to turn it into a hierarchy.
///
/// Only `name`, `location` and `variant` are required. Columns and root
/// label default to the variant's presets, the format is detected from the
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub location: String,
    pub variant: TreeVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DatasetFormat>,
    #[serde(default)]
    pub row_policy: RowPolicy,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

impl DatasetConfig {
    /// Creates a dataset using the variant's defaults.
    pub fn new(name: impl Into<String>, location: impl Into<String>, variant: TreeVariant) -> Self {
        DatasetConfig {
            name: name.into(),
            location: location.into(),
            variant,
            path_column: None,
            weight_column: None,
            root_label: None,
            format: None,
            row_policy: RowPolicy::default(),
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Returns the columns to read, falling back to the variant's defaults.
    pub fn columns(&self) -> Columns {
        let defaults = self.variant.default_columns();
        Columns {
            path: self.path_column.clone().unwrap_or(defaults.path),
            weight: self.weight_column.clone().unwrap_or(defaults.weight),
        }
    }

    /// Returns the builder configuration for this dataset.
    pub fn builder_config(&self) -> BuilderConfig {
        let mut config = BuilderConfig::for_variant(self.variant)
            .with_row_policy(self.row_policy)
            .with_conflict_policy(self.conflict_policy);
        if let Some(root_label) = &self.root_label {
            config = config.with_root_label(root_label.clone());
        }
        config
    }

    /// Returns the configured format, or the one detected from `text`.
    pub fn format_for(&self, text: &str) -> DatasetFormat {
        self.format.unwrap_or_else(|| DatasetFormat::detect(text))
    }
}

// =#========================================================================#=
// PAGE CONFIG
// =#========================================================================#=
/// One page: a layout and the datasets shown with it, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub datasets: Vec<String>,
}

impl PageConfig {
    /// Creates a page with the layout's default title.
    pub fn new<S: Into<String>>(layout: Layout, datasets: impl IntoIterator<Item = S>) -> Self {
        PageConfig {
            layout,
            title: None,
            datasets: datasets.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the configured title or the layout's default.
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| self.layout.default_title())
    }
}

// =#========================================================================#=
// CONFIG
// =#========================================================================#=
/// Datasets and the pages showing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "dataset", default)]
    pub datasets: Vec<DatasetConfig>,
    #[serde(rename = "page", default)]
    pub pages: Vec<PageConfig>,
}

impl Config {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    /// [ConfigError] if the text is not a valid configuration.
    ///
    /// # Example
    /// ```
    /// use rowtree::config::Config;
    /// use rowtree::render::Layout;
    ///
    /// let config = Config::from_toml_str(r#"
    ///     [[dataset]]
    ///     name = "vue"
    ///     location = "vue.csv"
    ///     variant = "file-path"
    ///
    ///     [[page]]
    ///     layout = "partition"
    ///     datasets = ["vue"]
    /// "#)?;
    /// assert_eq!(config.page(Layout::Partition).unwrap().datasets, ["vue"]);
    /// # Ok::<(), rowtree::config::ConfigError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    /// [ConfigError] if the file cannot be read or is not a valid
    /// configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Looks up a dataset by name.
    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Looks up the page for a layout.
    pub fn page(&self, layout: Layout) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.layout == layout)
    }

    /// Checks that names are unique and that pages only refer to defined
    /// datasets.
    ///
    /// # Errors
    /// The first problem found, as [ConfigError].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for dataset in &self.datasets {
            if !names.insert(dataset.name.as_str()) {
                return Err(ConfigError::DuplicateDataset(dataset.name.clone()));
            }
        }

        let mut layouts = HashSet::new();
        for page in &self.pages {
            if !layouts.insert(page.layout) {
                return Err(ConfigError::DuplicatePage(page.layout));
            }
            if let Some(missing) = page.datasets.iter().find(|d| !names.contains(d.as_str())) {
                return Err(ConfigError::UnknownDataset {
                    page: page.layout,
                    dataset: missing.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Config {
    /// Bundled datasets on all four layouts; the treemap page leaves out
    /// `vue`.
    fn default() -> Self {
        let all = ["flare", "vue", "distritos"];
        Config {
            datasets: vec![
                DatasetConfig::new("flare", "flare.json", TreeVariant::Dotted),
                DatasetConfig::new("vue", "vue.json", TreeVariant::FilePath),
                DatasetConfig::new("distritos", "distritos_cr.json", TreeVariant::AdminCode),
            ],
            pages: vec![
                PageConfig::new(Layout::CirclePack, all),
                PageConfig::new(Layout::Partition, all),
                PageConfig::new(Layout::Treemap, ["flare", "distritos"]),
                PageConfig::new(Layout::Radial, all),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(DatasetFormat::detect("{\"name\": \"root\"}"), DatasetFormat::Nested);
        assert_eq!(DatasetFormat::detect("[]"), DatasetFormat::Json);
        assert_eq!(DatasetFormat::detect("id,value\n"), DatasetFormat::Csv);
    }
}
