//! Request handling: fetch datasets, build hierarchies and render a page.
//!
//! A [PageHandler] answers one request per layout. All datasets of a page
//! are fetched and built in parallel (each dataset gets its own builder, so
//! nothing is shared between threads); panels keep the page's dataset order.
//! Any failure turns into a `500` response with a JSON body
//! `{"error": "<message>"}`.

use crate::config::{Config, DatasetConfig};
use crate::model::{BuildError, Hierarchy, TreeBuilder, TreeNode};
use crate::render::{
    Layout, OutlineError, Panel, RenderError, parse_outlines, render_area_map, render_page,
};
use crate::rows::{RowError, parse_rows};
use crate::source::{SourceError, TextSource};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Title of the area map page.
pub const AREA_MAP_TITLE: &str = "Area Map";

// =#========================================================================#=
// HANDLER ERROR
// =#========================================================================#=
/// Everything that can go wrong while answering a request.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("no page configured for layout '{0}'")]
    UnknownPage(Layout),

    #[error("dataset '{0}' is not configured")]
    UnknownDataset(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("dataset '{dataset}': {source}")]
    Rows {
        dataset: String,
        #[source]
        source: RowError,
    },

    #[error("dataset '{dataset}': {source}")]
    Build {
        dataset: String,
        #[source]
        source: BuildError,
    },

    #[error("dataset '{dataset}' is not a nested hierarchy: {source}")]
    Nested {
        dataset: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Outline(#[from] OutlineError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

// =#========================================================================#=
// RESPONSE
// =#========================================================================#=
/// Status, content type and body of an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    /// A `200` HTML response.
    pub fn html(body: String) -> Self {
        Response {
            status: 200,
            content_type: "text/html",
            body,
        }
    }

    /// A `500` response with `{"error": message}` as body.
    pub fn error(message: &str) -> Self {
        Response {
            status: 500,
            content_type: "application/json",
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    /// Returns `true` for a `2xx` status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<Result<String, HandlerError>> for Response {
    fn from(result: Result<String, HandlerError>) -> Self {
        match result {
            Ok(body) => Response::html(body),
            Err(err) => {
                error!(error = %err, "request failed");
                Response::error(&err.to_string())
            }
        }
    }
}

// =#========================================================================#=
// PAGE HANDLER
// =#========================================================================#=
/// Serves the configured pages from a [TextSource].
///
/// # Example
/// ```
/// use rowtree::config::Config;
/// use rowtree::handler::PageHandler;
/// use rowtree::render::Layout;
/// use rowtree::source::MemorySource;
///
/// let source = MemorySource::new()
///     .with("flare.json", "id,value\nflare.vis.Axis,24593\n")
///     .with("distritos_cr.json", "ID,POBL_2022\n1.01.01,19000\n");
/// let handler = PageHandler::new(Config::default(), source);
///
/// let response = handler.handle(Layout::Treemap);
/// assert_eq!(response.status, 200);
/// assert_eq!(handler.handle(Layout::Partition).status, 500); // vue.json is missing
/// ```
#[derive(Debug)]
pub struct PageHandler<S> {
    config: Config,
    source: S,
}

impl<S: TextSource> PageHandler<S> {
    /// Creates a handler for the given configuration and source.
    pub fn new(config: Config, source: S) -> Self {
        PageHandler { config, source }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Answers a request for the page of `layout`.
    pub fn handle(&self, layout: Layout) -> Response {
        self.render(layout).into()
    }

    /// Answers a request for the area map drawn from the outline file at
    /// `location`.
    pub fn handle_map(&self, location: &str) -> Response {
        self.render_map(location, AREA_MAP_TITLE).into()
    }

    /// Builds every dataset of the page for `layout` and renders it.
    ///
    /// # Errors
    /// The first [HandlerError] of any dataset, or of rendering.
    pub fn render(&self, layout: Layout) -> Result<String, HandlerError> {
        let page = self
            .config
            .page(layout)
            .ok_or(HandlerError::UnknownPage(layout))?;

        let panels = page
            .datasets
            .par_iter()
            .map(|name| self.load_panel(name))
            .collect::<Result<Vec<Panel>, HandlerError>>()?;

        let html = render_page(layout, page.title(), &panels)?;
        info!(%layout, panels = panels.len(), "served page");
        Ok(html)
    }

    /// Reads the outline file at `location` and renders the area map.
    ///
    /// # Errors
    /// [HandlerError] if fetching, parsing or rendering fails.
    pub fn render_map(&self, location: &str, title: &str) -> Result<String, HandlerError> {
        let text = self.source.fetch(location)?;
        let outlines = parse_outlines(&text)?;
        let html = render_area_map(title, &outlines)?;
        info!(location, areas = outlines.len(), "served area map");
        Ok(html)
    }

    fn load_panel(&self, name: &str) -> Result<Panel, HandlerError> {
        let dataset = self
            .config
            .dataset(name)
            .ok_or_else(|| HandlerError::UnknownDataset(name.to_string()))?;
        let text = self.source.fetch(&dataset.location)?;
        let tree = build_dataset(dataset, &text)?;
        Ok(Panel::new(name, tree))
    }
}

/// Turns the fetched text of a dataset into a hierarchy.
///
/// Nested input is taken as is; row input goes through a [TreeBuilder] with
/// the dataset's builder configuration.
///
/// # Errors
/// [HandlerError] if the text cannot be read or a row fails under a strict
/// row policy.
pub fn build_dataset(dataset: &DatasetConfig, text: &str) -> Result<Hierarchy, HandlerError> {
    let format = dataset.format_for(text);
    debug!(dataset = %dataset.name, ?format, "building dataset");

    let Some(row_format) = format.row_format() else {
        let root: TreeNode = serde_json::from_str(text).map_err(|source| HandlerError::Nested {
            dataset: dataset.name.clone(),
            source,
        })?;
        return Ok(Hierarchy::from_nested(root));
    };

    let rows = parse_rows(text, row_format, &dataset.columns()).map_err(|source| HandlerError::Rows {
        dataset: dataset.name.clone(),
        source,
    })?;

    let mut builder = TreeBuilder::new(dataset.builder_config());
    builder.add_rows(&rows).map_err(|source| HandlerError::Build {
        dataset: dataset.name.clone(),
        source,
    })?;
    let (tree, stats) = builder.finish_with_stats();

    if !stats.skipped.is_empty() {
        warn!(dataset = %dataset.name, skipped = stats.skipped.len(), "dataset had rows that were skipped");
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_body() {
        let response = Response::error("boom \"quoted\"");
        assert_eq!(response.status, 500);
        assert_eq!(response.content_type, "application/json");
        assert_eq!(response.body, r#"{"error":"boom \"quoted\""}"#);
        assert!(!response.is_success());
    }
}
