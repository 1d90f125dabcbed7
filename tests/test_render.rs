use rowtree::model::Hierarchy;
use rowtree::render::{
    Layout, OutlineErrorKind, Panel, Point, parse_outlines, render_area_map, render_page,
};
use rowtree::rows::Row;
use rowtree::{build_admin_code_tree, build_dotted_tree};

fn flare() -> Hierarchy {
    build_dotted_tree(&[
        Row::new("flare.vis.Axis", "24593"),
        Row::new("flare.vis.Legend", "20859"),
    ])
    .unwrap()
}

// ============= Hierarchy pages =============

#[test]
fn test_page_has_one_container_per_panel() {
    let districts = build_admin_code_tree(&[Row::new("1.01.01", "19000")], "Costa Rica").unwrap();
    let panels = [Panel::new("flare", flare()), Panel::new("distritos", districts)];
    let html = render_page(Layout::CirclePack, "Circles", &panels).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Circles</title>"));
    assert!(html.contains("https://d3js.org/d3.v7.min.js"));
    assert!(html.contains(r#"<div id="circle1" class="circle-container" title="flare">"#));
    assert!(html.contains(r#"<div id="circle2" class="circle-container" title="distritos">"#));
    assert!(!html.contains(r#"id="circle3""#));
    assert!(html.contains("d3.pack()"));
}

#[test]
fn test_page_embeds_nested_hierarchy() {
    let html = render_page(Layout::Partition, "Partition", &[Panel::new("flare", flare())]).unwrap();

    let expected = serde_json::to_string(&flare()).unwrap();
    assert!(html.contains(&expected));
    assert!(html.contains(r#"{"id":"partition1","name":"flare","data":"#));
    assert!(html.contains("d3.partition()"));
}

#[test]
fn test_each_layout_uses_its_d3_layout() {
    let panels = [Panel::new("flare", flare())];
    let calls = [
        (Layout::CirclePack, "d3.pack()"),
        (Layout::Partition, "d3.partition()"),
        (Layout::Treemap, "d3.treemap()"),
        (Layout::Radial, "d3.tree()"),
    ];
    for (layout, call) in calls {
        let html = render_page(layout, layout.default_title(), &panels).unwrap();
        assert!(html.contains(call), "{layout} page lacks {call}");
    }
}

#[test]
fn test_page_escapes_title_and_data() {
    let tree = build_dotted_tree(&[Row::new("</script><b>.x", "1")]).unwrap();
    let html = render_page(Layout::Treemap, "<Sizes & Counts>", &[Panel::new("a\"b", tree)]).unwrap();

    assert!(html.contains("<title>&lt;Sizes &amp; Counts&gt;</title>"));
    assert!(html.contains(r#"title="a&quot;b""#));
    assert_eq!(html.matches("</script>").count(), 2);
    assert!(html.contains(r#"<\/script><b>"#));
}

#[test]
fn test_treemap_colors_root_without_parent() {
    let empty = build_dotted_tree(&Vec::<Row>::new()).unwrap();
    let html = render_page(Layout::Treemap, "Empty", &[Panel::new("flare", empty)]).unwrap();

    assert!(html.contains(r#"{"id":"treemap1","name":"flare","data":{"name":"root","children":[]}}"#));
    assert!(html.contains("d.parent ? d.parent.data.name : d.data.name"));
    assert!(!html.contains("color(d.parent.data.name)"));
}

#[test]
fn test_page_without_panels() {
    let html = render_page(Layout::Radial, "Empty", &[]).unwrap();
    assert!(html.contains("const panels = [];"));
}

// ============= Area map =============

const OUTLINES: &str = "\"01\",\"Alabama\",1\n\
                        -88.20,35.00\n\
                        -85.60,34.98\n\
                        -85.00,31.00\n\
                        \n\
                        \"05\",\"Arkansas\",4\n\
                        -94.62,36.50\n\
                        -90.00,36.50\n\
                        -91.00,33.00\n";

#[test]
fn test_parse_outlines_keeps_last_area() {
    let outlines = parse_outlines(OUTLINES).unwrap();

    assert_eq!(outlines.len(), 2);
    assert_eq!(outlines.num_points(), 6);

    let arkansas = &outlines.areas()[1];
    assert_eq!(arkansas.id, "05");
    assert_eq!(arkansas.name, "Arkansas");
    assert_eq!(arkansas.number, "4");
    assert_eq!(arkansas.points[0], Point { x: -94.62, y: 36.5 });
}

#[test]
fn test_outline_bounds() {
    let bounds = parse_outlines(OUTLINES).unwrap().bounds().unwrap();
    assert_eq!(bounds.min_x, -94.62);
    assert_eq!(bounds.max_x, -85.0);
    assert_eq!(bounds.min_y, 31.0);
    assert_eq!(bounds.max_y, 36.5);

    assert!(parse_outlines("").unwrap().bounds().is_none());
}

#[test]
fn test_outline_errors() {
    let err = parse_outlines("1.0,2.0\n").unwrap_err();
    assert_eq!(err.kind(), &OutlineErrorKind::PointBeforeHeader);
    assert_eq!(err.line(), 1);

    let err = parse_outlines("a,b,c\n\n1.0,2.0\n1.0\n").unwrap_err();
    assert_eq!(err.kind(), &OutlineErrorKind::UnexpectedFieldCount(1));
    assert_eq!(err.line(), 4);

    let err = parse_outlines("a,b,c\n1.0,x\n").unwrap_err();
    assert_eq!(err.kind(), &OutlineErrorKind::InvalidCoordinate("x".to_string()));
}

#[test]
fn test_render_area_map() {
    let outlines = parse_outlines(&format!("{OUTLINES}\"99\",\"Empty\",9\n")).unwrap();
    let html = render_area_map("Map <USA>", &outlines).unwrap();

    assert!(html.contains("<title>Map &lt;USA&gt;</title>"));
    assert!(html.contains("https://cdn.jsdelivr.net/npm/d3@7/+esm"));
    assert!(html.contains("domain([-66.419422, -125.786406]).range([700, 20])"));
    assert!(html.contains("domain([23.982057, 50.508481]).range([400, 50])"));
    assert!(html.contains(r#""name":"Arkansas""#));
    // Areas without points are not drawn
    assert!(!html.contains(r#""name":"Empty""#));
}
