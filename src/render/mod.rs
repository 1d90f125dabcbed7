//! Self-contained HTML pages for hierarchies and area maps.
//!
//! Pages load d3 v7 and carry their data as embedded JSON; the layout
//! computation (packing, partitioning, tiling, radial placement) and all
//! interaction run in the browser. This module only assembles the document.
//!
//! - [render_page] - one page with a panel per hierarchy in a [Layout]
//! - [render_area_map] - filled outlines from an outline file, see
//!   [parse_outlines]

mod area_map;
mod escape;
mod page;

pub use area_map::{
    parse_outlines, project, render_area_map, Area, Bounds, OutlineError, OutlineErrorKind,
    OutlineSet, Point,
};
pub use escape::{escape_html, script_json};
pub use page::render_page;

use crate::model::Hierarchy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// d3 bundle loaded by hierarchy pages.
pub const D3_SCRIPT_URL: &str = "https://d3js.org/d3.v7.min.js";

/// d3 module imported by area map pages.
pub const D3_MODULE_URL: &str = "https://cdn.jsdelivr.net/npm/d3@7/+esm";

// =#========================================================================#=
// LAYOUT
// =#========================================================================#=
/// Hierarchical layouts a page can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Zoomable nested circles
    CirclePack,
    /// Icicle of stacked rectangles
    Partition,
    /// Squarified tiles of the leaves
    Treemap,
    /// Node-link tree around a center
    Radial,
}

impl Layout {
    /// All layouts, in the order pages are usually listed.
    pub const ALL: [Layout; 4] = [
        Layout::CirclePack,
        Layout::Partition,
        Layout::Treemap,
        Layout::Radial,
    ];

    /// Returns the name used in configuration files and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::CirclePack => "circle-pack",
            Layout::Partition => "partition",
            Layout::Treemap => "treemap",
            Layout::Radial => "radial",
        }
    }

    /// Returns the page title used when none is configured.
    pub fn default_title(&self) -> &'static str {
        match self {
            Layout::CirclePack => "Zoomable Circle Packing Layout with D3.js",
            Layout::Partition => "Partition Layout with D3.js",
            Layout::Treemap => "Multiple Treemaps",
            Layout::Radial => "Radial Tree Layout with D3.js",
        }
    }

    /// Prefix of the panel container ids and CSS class.
    pub(crate) fn container_prefix(&self) -> &'static str {
        match self {
            Layout::CirclePack => "circle",
            Layout::Partition => "partition",
            Layout::Treemap => "treemap",
            Layout::Radial => "radial",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized layout name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layout '{0}' (expected circle-pack, partition, treemap or radial)")]
pub struct UnknownLayout(pub String);

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.as_str() == s)
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}

// =#========================================================================#=
// PANEL
// =#========================================================================#=
/// One hierarchy shown on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Dataset name, shown as caption
    pub name: String,
    /// Hierarchy to lay out
    pub tree: Hierarchy,
}

impl Panel {
    /// Creates a panel.
    pub fn new(name: impl Into<String>, tree: Hierarchy) -> Self {
        Panel {
            name: name.into(),
            tree,
        }
    }
}

// =#========================================================================#=
// RENDER ERROR
// =#========================================================================#=
/// Errors while assembling a page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Embedded data could not be serialized.
    #[error("failed to serialize page data: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names_round_trip() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>(), Ok(layout));
        }
        assert_eq!(
            "sunburst".parse::<Layout>(),
            Err(UnknownLayout("sunburst".to_string()))
        );
    }
}
