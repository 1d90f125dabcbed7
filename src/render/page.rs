//! Hierarchy pages for the four layouts.

use crate::model::Hierarchy;
use crate::render::escape::{escape_html, script_json};
use crate::render::{D3_SCRIPT_URL, Layout, Panel, RenderError};
use serde::Serialize;
use tracing::debug;

/// Panel data as embedded into the page script.
#[derive(Serialize)]
struct EmbeddedPanel<'a> {
    id: String,
    name: &'a str,
    data: &'a Hierarchy,
}

/// Renders a complete HTML page showing each panel's hierarchy in `layout`.
///
/// Panels are placed in the given order into containers `<prefix>1`,
/// `<prefix>2`, ... (e.g. `circle1` for circle packing).
///
/// # Arguments
/// * `layout` - Layout used for every panel
/// * `title` - Page title, HTML-escaped
/// * `panels` - Hierarchies to show
///
/// # Errors
/// [RenderError] if the embedded data cannot be serialized.
///
/// # Example
/// ```
/// use rowtree::render::{render_page, Layout, Panel};
/// use rowtree::build_dotted_tree;
/// use rowtree::rows::Row;
///
/// let tree = build_dotted_tree(&[Row::new("a.b", "1")])?;
/// let html = render_page(Layout::Treemap, "Sizes", &[Panel::new("flare", tree)])?;
/// assert!(html.contains(r#"<div id="treemap1" class="treemap-container""#));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render_page(layout: Layout, title: &str, panels: &[Panel]) -> Result<String, RenderError> {
    let prefix = layout.container_prefix();
    let embedded: Vec<EmbeddedPanel> = panels
        .iter()
        .enumerate()
        .map(|(i, panel)| EmbeddedPanel {
            id: format!("{prefix}{}", i + 1),
            name: &panel.name,
            data: &panel.tree,
        })
        .collect();
    let data = script_json(&embedded)?;

    let mut html = String::with_capacity(data.len() + 8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str("<style>\n");
    html.push_str(&container_style(layout));
    html.push_str(node_style(layout));
    html.push_str("</style>\n");
    html.push_str(&format!("<script src=\"{D3_SCRIPT_URL}\"></script>\n"));
    html.push_str("</head>\n<body>\n");

    for panel in &embedded {
        html.push_str(&format!(
            "<div id=\"{id}\" class=\"{prefix}-container\" title=\"{name}\"></div>\n",
            id = panel.id,
            name = escape_html(panel.name),
        ));
    }

    html.push_str("<script>\n");
    html.push_str(draw_script(layout));
    html.push_str(&format!("const panels = {data};\n"));
    html.push_str("panels.forEach(panel => draw(panel.data, panel.id));\n");
    html.push_str("</script>\n</body>\n</html>\n");

    debug!(%layout, panels = panels.len(), bytes = html.len(), "rendered page");
    Ok(html)
}

// ============================================================================
// Page parts
// ============================================================================
fn container_style(layout: Layout) -> String {
    let (width, height) = match layout {
        Layout::CirclePack | Layout::Radial => (960, 960),
        Layout::Partition | Layout::Treemap => (960, 570),
    };
    format!(
        ".{}-container {{ margin: 20px; position: relative; width: {width}px; height: {height}px; border: 1px solid black; }}\n",
        layout.container_prefix()
    )
}

fn node_style(layout: Layout) -> &'static str {
    match layout {
        Layout::CirclePack => "",
        Layout::Partition | Layout::Treemap => {
            ".node { font: 10px sans-serif; line-height: 12px; overflow: hidden; }\n"
        }
        Layout::Radial => ".link { fill: none; stroke: #555; stroke-opacity: 0.4; stroke-width: 1.5px; }\n",
    }
}

/// Defines `draw(data, containerId)` for the layout.
fn draw_script(layout: Layout) -> &'static str {
    match layout {
        Layout::CirclePack => CIRCLE_PACK_SCRIPT,
        Layout::Partition => PARTITION_SCRIPT,
        Layout::Treemap => TREEMAP_SCRIPT,
        Layout::Radial => RADIAL_SCRIPT,
    }
}

const CIRCLE_PACK_SCRIPT: &str = r##"const width = 960;
const height = width;
const color = d3.scaleLinear()
    .domain([0, 5])
    .range(["hsl(152,80%,80%)", "hsl(228,30%,40%)"])
    .interpolate(d3.interpolateHcl);
const pack = data => d3.pack()
    .size([width, height])
    .padding(3)
    (d3.hierarchy(data)
        .sum(d => d.value)
        .sort((a, b) => b.value - a.value));

function draw(data, containerId) {
    const root = pack(data);
    let focus = root;
    let view;

    const svg = d3.select("#" + containerId).append("svg")
        .attr("viewBox", `-${width / 2} -${height / 2} ${width} ${height}`)
        .attr("width", width)
        .attr("height", height)
        .attr("style", `max-width: 100%; height: auto; display: block; background: ${color(0)}; cursor: pointer;`);

    const node = svg.append("g")
        .selectAll("circle")
        .data(root.descendants().slice(1))
        .join("circle")
        .attr("fill", d => d.children ? color(d.depth) : "white")
        .attr("pointer-events", d => !d.children ? "none" : null)
        .on("mouseover", function() { d3.select(this).attr("stroke", "#000"); })
        .on("mouseout", function() { d3.select(this).attr("stroke", null); })
        .on("click", (event, d) => focus !== d && (zoom(event, d), event.stopPropagation()));

    const label = svg.append("g")
        .style("font", "10px sans-serif")
        .attr("pointer-events", "none")
        .attr("text-anchor", "middle")
        .selectAll("text")
        .data(root.descendants())
        .join("text")
        .style("fill-opacity", d => d.parent === focus ? 1 : 0)
        .style("display", d => d.parent === focus ? "inline" : "none")
        .text(d => d.data.name);

    svg.on("click", event => zoom(event, root));
    zoomTo([root.x, root.y, root.r * 2]);

    function zoomTo(v) {
        const k = width / v[2];
        view = v;
        label.attr("transform", d => `translate(${(d.x - v[0]) * k},${(d.y - v[1]) * k})`);
        node.attr("transform", d => `translate(${(d.x - v[0]) * k},${(d.y - v[1]) * k})`);
        node.attr("r", d => d.r * k);
    }

    function zoom(event, d) {
        focus = d;
        const transition = svg.transition()
            .duration(event.altKey ? 7500 : 750)
            .tween("zoom", () => {
                const i = d3.interpolateZoom(view, [focus.x, focus.y, focus.r * 2]);
                return t => zoomTo(i(t));
            });

        label
            .filter(function(d) { return d.parent === focus || this.style.display === "inline"; })
            .transition(transition)
            .style("fill-opacity", d => d.parent === focus ? 1 : 0)
            .on("start", function(d) { if (d.parent === focus) this.style.display = "inline"; })
            .on("end", function(d) { if (d.parent !== focus) this.style.display = "none"; });
    }
}
"##;

const PARTITION_SCRIPT: &str = r##"const width = 960;
const height = 570;
const color = d3.scaleOrdinal(d3.schemeCategory10);
const partition = d3.partition()
    .size([width, height])
    .padding(1)
    .round(true);

function draw(data, containerId) {
    const root = partition(d3.hierarchy(data)
        .sum(d => d.value)
        .sort((a, b) => b.height - a.height || b.value - a.value));

    const svg = d3.select("#" + containerId).append("svg")
        .attr("width", width)
        .attr("height", height)
        .style("font-family", "sans-serif");

    const node = svg.selectAll(".node")
        .data(root.descendants())
        .enter().append("g")
        .attr("class", "node")
        .attr("transform", d => `translate(${d.x0},${d.y0})`);

    node.append("rect")
        .attr("width", d => d.x1 - d.x0)
        .attr("height", d => d.y1 - d.y0)
        .attr("fill", d => color(d.depth));

    node.append("text")
        .attr("x", 4)
        .attr("y", 13)
        .text(d => d.data.name);

    node.append("title")
        .text(d => `${d.data.name}\n${d.value}`);
}
"##;

const TREEMAP_SCRIPT: &str = r##"const width = 960;
const height = 570;
const color = d3.scaleOrdinal(d3.schemeCategory10);
const treemap = d3.treemap()
    .tile(d3.treemapSquarify)
    .size([width, height])
    .paddingInner(1)
    .round(true);

function draw(data, containerId) {
    const root = treemap(d3.hierarchy(data)
        .sum(d => d.value)
        .sort((a, b) => b.height - a.height || b.value - a.value));

    const svg = d3.select("#" + containerId).append("svg")
        .attr("width", width)
        .attr("height", height)
        .style("font-family", "sans-serif");

    const node = svg.selectAll(".node")
        .data(root.leaves())
        .enter().append("g")
        .attr("class", "node")
        .attr("transform", d => `translate(${d.x0},${d.y0})`);

    node.append("rect")
        .attr("id", (d, i) => `${containerId}-leaf-${i}`)
        .attr("width", d => d.x1 - d.x0)
        .attr("height", d => d.y1 - d.y0)
        .attr("fill", d => color(d.parent ? d.parent.data.name : d.data.name));

    node.append("clipPath")
        .attr("id", (d, i) => `${containerId}-clip-${i}`)
        .append("use")
        .attr("href", (d, i) => `#${containerId}-leaf-${i}`);

    node.append("text")
        .attr("clip-path", (d, i) => `url(#${containerId}-clip-${i})`)
        .selectAll("tspan")
        .data(d => d.data.name.split(/(?=[A-Z][^A-Z])/g))
        .enter().append("tspan")
        .attr("x", 3)
        .attr("y", (d, i) => 13 + i * 10)
        .text(d => d);

    node.append("title")
        .text(d => `${d.data.name}\n${d.value}`);
}
"##;

const RADIAL_SCRIPT: &str = r##"const width = 960;
const height = 960;
const radius = width / 2;
const color = d3.scaleOrdinal(d3.schemeCategory10);
const tree = d3.tree()
    .size([2 * Math.PI, radius - 100])
    .separation((a, b) => (a.parent == b.parent ? 1 : 2) / a.depth);

function draw(data, containerId) {
    const root = d3.hierarchy(data)
        .sum(d => d.value)
        .sort((a, b) => b.height - a.height || b.value - a.value);
    tree(root);

    const svg = d3.select("#" + containerId).append("svg")
        .attr("width", width)
        .attr("height", height)
        .style("font-family", "sans-serif")
        .append("g")
        .attr("transform", `translate(${width / 2},${height / 2})`);

    svg.append("g")
        .selectAll(".link")
        .data(root.links())
        .enter().append("path")
        .attr("class", "link")
        .attr("d", d3.linkRadial()
            .angle(d => d.x)
            .radius(d => d.y));

    const node = svg.append("g")
        .selectAll(".node")
        .data(root.descendants())
        .enter().append("g")
        .attr("class", "node")
        .attr("transform", d => `rotate(${d.x * 180 / Math.PI - 90}) translate(${d.y},0)`);

    node.append("circle")
        .attr("r", 2.5)
        .attr("fill", d => color(d.depth));

    node.append("text")
        .attr("dy", "0.31em")
        .attr("x", d => d.x < Math.PI === !d.children ? 6 : -6)
        .attr("text-anchor", d => d.x < Math.PI === !d.children ? "start" : "end")
        .attr("transform", d => d.x >= Math.PI ? "rotate(180)" : null)
        .text(d => d.data.name)
        .clone(true).lower()
        .attr("stroke", "white");
}
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layout_defines_draw() {
        for layout in Layout::ALL {
            assert!(draw_script(layout).contains("function draw(data, containerId)"));
        }
    }

    #[test]
    fn test_container_style_sizes() {
        assert!(container_style(Layout::CirclePack).contains("height: 960px"));
        assert!(container_style(Layout::Treemap).contains("height: 570px"));
    }
}
