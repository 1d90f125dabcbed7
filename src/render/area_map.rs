//! Outline files and the area map page drawn from them.
//!
//! An outline file lists areas one after another. A line with exactly three
//! comma separated fields opens a new area (`id,name,number`, fields may be
//! quoted); every following line with two fields is an `x,y` point of that
//! area's outline. Blank lines are ignored.
//!
//! ```text
//! "01","Alabama",1
//! -88.200,35.000
//! -85.600,34.980
//! ...
//! ```

use crate::render::escape::{escape_html, script_json};
use crate::render::{D3_MODULE_URL, RenderError};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tracing::{debug, info};

/// Input domain and output range of the x projection.
const X_DOMAIN: [f64; 2] = [-66.419422, -125.786406];
const X_RANGE: [f64; 2] = [700.0, 20.0];
/// Input domain and output range of the y projection.
const Y_DOMAIN: [f64; 2] = [23.982057, 50.508481];
const Y_RANGE: [f64; 2] = [400.0, 50.0];

/// Maximal number of characters of the offending line kept in an error.
const MAX_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// OUTLINE MODEL
// =#========================================================================#=
/// Point of an outline, in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One named area with its outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub number: String,
    pub points: Vec<Point>,
}

/// Extent of all points of an [OutlineSet].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// All areas of an outline file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineSet {
    areas: Vec<Area>,
}

impl OutlineSet {
    /// Returns the areas in file order.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Returns the number of areas.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Returns `true` if the file contained no area.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Returns the total number of points over all areas.
    pub fn num_points(&self) -> usize {
        self.areas.iter().map(|a| a.points.len()).sum()
    }

    /// Returns the extent of all points, or `None` if there are none.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.areas.iter().flat_map(|a| a.points.iter());
        let first = points.next()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }
}

// =#========================================================================#=
// OUTLINE ERROR
// =#========================================================================#=
/// Reasons an outline file cannot be read.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineErrorKind {
    /// A point appears before any area header.
    PointBeforeHeader,
    /// A point field is not a number.
    InvalidCoordinate(String),
    /// A line has neither two nor three fields.
    UnexpectedFieldCount(usize),
}

/// Outline error with the (1-based) line it occurred on.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineError {
    kind: OutlineErrorKind,
    line: usize,
    context: String,
}

impl OutlineError {
    fn new(kind: OutlineErrorKind, line: usize, content: &str) -> Self {
        Self {
            kind,
            line,
            context: content.chars().take(MAX_CONTEXT_LENGTH).collect(),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> &OutlineErrorKind {
        &self.kind
    }

    /// Get the line number (1-based)
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for OutlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OutlineErrorKind::PointBeforeHeader => write!(f, "Point before first area header")?,
            OutlineErrorKind::InvalidCoordinate(field) => write!(f, "Invalid coordinate '{field}'")?,
            OutlineErrorKind::UnexpectedFieldCount(n) => {
                write!(f, "Expected 2 or 3 fields but found {n}")?
            }
        }
        write!(f, " on line {}", self.line)?;
        if !self.context.is_empty() {
            write!(f, "\n  Line: {}", self.context)?;
        }
        Ok(())
    }
}

impl Error for OutlineError {}

// =#========================================================================#=
// PARSING
// =#========================================================================#=
/// Reads all areas of an outline file.
///
/// The last area of the file is kept like every other one.
///
/// # Errors
/// [OutlineError] for points before the first header, non-numeric
/// coordinates, or lines with an unexpected number of fields.
///
/// # Example
/// ```
/// use rowtree::render::parse_outlines;
///
/// let outlines = parse_outlines("\"01\",\"Alabama\",1\n-88.2,35.0\n-85.6,34.9\n")?;
/// assert_eq!(outlines.len(), 1);
/// assert_eq!(outlines.areas()[0].name, "Alabama");
/// assert_eq!(outlines.num_points(), 2);
/// # Ok::<(), rowtree::render::OutlineError>(())
/// ```
pub fn parse_outlines(text: &str) -> Result<OutlineSet, OutlineError> {
    let mut areas: Vec<Area> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let content = line.trim();
        if content.is_empty() {
            continue;
        }
        let line_no = i + 1;
        let fields: Vec<&str> = content.split(',').map(clean_field).collect();

        match fields.as_slice() {
            [id, name, number] => areas.push(Area {
                id: id.to_string(),
                name: name.to_string(),
                number: number.to_string(),
                points: Vec::new(),
            }),
            [x, y] => {
                let Some(area) = areas.last_mut() else {
                    return Err(OutlineError::new(OutlineErrorKind::PointBeforeHeader, line_no, content));
                };
                let x = parse_coordinate(x, line_no, content)?;
                let y = parse_coordinate(y, line_no, content)?;
                area.points.push(Point { x, y });
            }
            other => {
                return Err(OutlineError::new(
                    OutlineErrorKind::UnexpectedFieldCount(other.len()),
                    line_no,
                    content,
                ));
            }
        }
    }

    let outlines = OutlineSet { areas };
    debug!(areas = outlines.len(), points = outlines.num_points(), "read outlines");
    Ok(outlines)
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

fn parse_coordinate(field: &str, line_no: usize, content: &str) -> Result<f64, OutlineError> {
    field.parse::<f64>().map_err(|_| {
        OutlineError::new(
            OutlineErrorKind::InvalidCoordinate(field.to_string()),
            line_no,
            content,
        )
    })
}

// =#========================================================================#=
// RENDERING
// =#========================================================================#=
/// Renders an SVG page filling each area's outline.
///
/// Points go through a fixed linear projection (longitude
/// `-66.419422..-125.786406` onto `700..20`, latitude `23.982057..50.508481`
/// onto `400..50`); areas are colored with d3's ten category colors in turn.
/// Areas without points are left out.
///
/// # Errors
/// [RenderError] if the embedded data cannot be serialized.
pub fn render_area_map(title: &str, outlines: &OutlineSet) -> Result<String, RenderError> {
    let drawable: Vec<&Area> = outlines.areas().iter().filter(|a| !a.points.is_empty()).collect();
    let data = script_json(&drawable)?;

    let mut html = String::with_capacity(data.len() + 2048);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str("</head>\n<body>\n");
    html.push_str("<svg class=\"area-map\" id=\"area-map\" width=\"1000\" height=\"1000\"></svg>\n");
    html.push_str("<script type=\"module\">\n");
    html.push_str(&format!("import * as d3 from \"{D3_MODULE_URL}\";\n"));
    html.push_str(&format!(
        "const xScale = d3.scaleLinear().domain([{}, {}]).range([{}, {}]);\n",
        X_DOMAIN[0], X_DOMAIN[1], X_RANGE[0], X_RANGE[1]
    ));
    html.push_str(&format!(
        "const yScale = d3.scaleLinear().domain([{}, {}]).range([{}, {}]);\n",
        Y_DOMAIN[0], Y_DOMAIN[1], Y_RANGE[0], Y_RANGE[1]
    ));
    html.push_str(&format!("const areas = {data};\n"));
    html.push_str(AREA_MAP_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    info!(areas = drawable.len(), "rendered area map");
    Ok(html)
}

const AREA_MAP_SCRIPT: &str = r##"const outline = d3.line()
    .x(d => xScale(d.x))
    .y(d => yScale(d.y));
const colorScale = d3.scaleOrdinal(d3.schemeCategory10);

areas.forEach((area, i) => {
    d3.select("#area-map")
        .append("path")
        .attr("d", outline(area.points) + "Z")
        .attr("fill", colorScale(i % 10))
        .attr("stroke", "#000000")
        .append("title")
        .text(area.name);
});
"##;

/// Returns the SVG position a point is drawn at on the area map.
///
/// # Example
/// ```
/// use rowtree::render::{project, Point};
///
/// let (x, y) = project(Point { x: -66.419422, y: 23.982057 });
/// assert_eq!((x.round(), y.round()), (700.0, 400.0));
/// ```
pub fn project(point: Point) -> (f64, f64) {
    (
        scale(point.x, X_DOMAIN, X_RANGE),
        scale(point.y, Y_DOMAIN, Y_RANGE),
    )
}

fn scale(value: f64, domain: [f64; 2], range: [f64; 2]) -> f64 {
    let t = (value - domain[0]) / (domain[1] - domain[0]);
    range[0] + t * (range[1] - range[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_maps_domain_ends_to_range_ends() {
        let (x, y) = project(Point { x: X_DOMAIN[0], y: Y_DOMAIN[0] });
        assert!((x - 700.0).abs() < 1e-9);
        assert!((y - 400.0).abs() < 1e-9);
        let (x, y) = project(Point { x: X_DOMAIN[1], y: Y_DOMAIN[1] });
        assert!((x - 20.0).abs() < 1e-9);
        assert!((y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_display_has_line_and_context() {
        let err = parse_outlines("a,b,c\n1.0,north\n").unwrap_err();
        assert_eq!(err.line(), 2);
        let message = err.to_string();
        assert!(message.starts_with("Invalid coordinate 'north' on line 2"));
        assert!(message.contains("Line: 1.0,north"));
    }

    #[test]
    fn test_clean_field() {
        assert_eq!(clean_field(" \"Alabama\" "), "Alabama");
        assert_eq!(clean_field("12"), "12");
    }
}
