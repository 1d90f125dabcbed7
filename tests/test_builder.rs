use rowtree::model::{
    BuildErrorKind, BuilderConfig, ConflictPolicy, Hierarchy, RowPolicy, TreeBuilder, TreeVariant,
    build_tree,
};
use rowtree::rows::Row;
use rowtree::{build_admin_code_tree, build_dotted_tree, build_file_path_tree};
use std::collections::HashSet;

fn rows(pairs: &[(&str, &str)]) -> Vec<Row> {
    pairs.iter().map(|(p, w)| Row::new(*p, *w)).collect()
}

fn child_names(tree: &Hierarchy, index: usize) -> Vec<&str> {
    tree.children(index).iter().map(|&c| tree.name(c)).collect()
}

// ============= Scenarios =============

#[test]
fn test_dotted_shared_prefix() {
    let tree = build_dotted_tree(&rows(&[("a.b", "1"), ("a.c", "2")])).unwrap();

    assert_eq!(tree.root_label(), "root");
    assert_eq!(child_names(&tree, tree.root_index()), ["a"]);

    let a = tree.find_path(&["a"]).unwrap();
    assert!(tree[a].is_interior());
    assert_eq!(tree.value(a), None);
    assert_eq!(child_names(&tree, a), ["b", "c"]);

    let b = tree.find_path(&["a", "b"]).unwrap();
    let c = tree.find_path(&["a", "c"]).unwrap();
    assert!(tree[b].is_leaf());
    assert_eq!(tree.value(b), Some(1.0));
    assert_eq!(tree.value(c), Some(2.0));
    assert!(tree.is_valid());
}

#[test]
fn test_dotted_leaf_then_extended_demotes_leaf() {
    let mut builder = TreeBuilder::for_variant(TreeVariant::Dotted);
    builder.add_rows(&rows(&[("a", "5"), ("a.b", "1")])).unwrap();
    let (tree, stats) = builder.finish_with_stats();

    let a = tree.find_path(&["a"]).unwrap();
    assert!(tree[a].is_interior());
    assert_eq!(tree.value(a), None);
    assert_eq!(child_names(&tree, a), ["b"]);
    assert_eq!(tree.value(tree.find_path(&["a", "b"]).unwrap()), Some(1.0));
    assert_eq!(stats.demoted, 1);
    assert!(tree.is_valid());
}

#[test]
fn test_dotted_interior_then_terminal_detaches_subtree() {
    let mut builder = TreeBuilder::for_variant(TreeVariant::Dotted);
    builder
        .add_rows(&rows(&[("a.b.c", "1"), ("a.d", "2"), ("a.b", "7"), ("a.b.e", "3")]))
        .unwrap();
    let (tree, stats) = builder.finish_with_stats();

    // "a.b" became a leaf dropping "c", then was extended again by "a.b.e"
    let b = tree.find_path(&["a", "b"]).unwrap();
    assert_eq!(child_names(&tree, b), ["e"]);
    assert_eq!(tree.value(b), None);
    assert!(tree.find_path(&["a", "b", "c"]).is_none());
    assert_eq!(stats.detached, 1);
    assert_eq!(stats.demoted, 1);
    assert_eq!(tree.num_leaves(), 2);
    assert_eq!(tree.num_nodes(), 5);
    assert!(tree.is_valid());
}

#[test]
fn test_alternating_extend_and_truncate() {
    let n = 20_000;
    let mut builder = TreeBuilder::for_variant(TreeVariant::Dotted);
    for i in 0..n {
        builder.add_row(&Row::new(format!("p.x{i}.c"), "1")).unwrap();
        builder.add_row(&Row::new(format!("p.x{i}"), "2")).unwrap();
    }
    let (tree, stats) = builder.finish_with_stats();

    assert_eq!(stats.rows, 2 * n);
    assert_eq!(stats.detached, n);
    assert_eq!(stats.demoted, 0);
    assert_eq!(tree.num_leaves(), n);
    assert_eq!(tree.num_nodes(), n + 2);
    assert_eq!(tree.subtree_sum(tree.root_index()), 2.0 * n as f64);
    assert!(tree.find_path(&["p", "x7", "c"]).is_none());
    assert!(tree.is_valid());
}

#[test]
fn test_detached_subtree_is_rebuilt_fresh() {
    let mut builder = TreeBuilder::for_variant(TreeVariant::Dotted);
    builder
        .add_rows(&rows(&[("a.b.c.d", "1"), ("a.b.e", "2"), ("a.b", "3"), ("a.b.c.f", "4")]))
        .unwrap();
    let tree = builder.finish();

    // Neither "a.b.c" nor "a.b.e" survive the truncation to "a.b"
    let c = tree.find_path(&["a", "b", "c"]).unwrap();
    assert_eq!(child_names(&tree, c), ["f"]);
    assert!(tree.find_path(&["a", "b", "e"]).is_none());
    assert!(tree.find_path(&["a", "b", "c", "d"]).is_none());
    assert_eq!(tree.num_leaves(), 1);
    assert!(tree.is_valid());
}

#[test]
fn test_file_path_splits_on_slash_and_dot() {
    let tree = build_file_path_tree(&[Row::new("src/app.js", "100")]).unwrap();

    let src = tree.find_path(&["src"]).unwrap();
    let app = tree.find_path(&["src", "app"]).unwrap();
    let js = tree.find_path(&["src", "app", "js"]).unwrap();
    assert!(tree[src].is_interior());
    assert!(tree[app].is_interior());
    assert!(tree[js].is_leaf());
    assert_eq!(tree.value(js), Some(100.0));
    assert_eq!(tree.num_leaves(), 1);
}

#[test]
fn test_file_path_mixed_delimiters_collide() {
    let tree = build_file_path_tree(&rows(&[("a/b.c", "1"), ("a.b/c", "2")])).unwrap();

    assert_eq!(tree.num_leaves(), 1);
    assert_eq!(tree.num_nodes(), 4);
    assert_eq!(tree.value(tree.find_path(&["a", "b", "c"]).unwrap()), Some(2.0));
}

#[test]
fn test_admin_code_leaves_are_never_merged() {
    let tree = build_admin_code_tree(
        &rows(&[("1", "1000"), ("1.1", "400"), ("1.1", "600")]),
        "Costa Rica",
    )
    .unwrap();

    let root = tree.root_index();
    assert_eq!(tree.root_label(), "Costa Rica");
    assert_eq!(child_names(&tree, root), ["1", "1"]);

    let [top_leaf, province] = tree.children(root) else {
        panic!("root should have two children");
    };
    assert!(tree[*top_leaf].is_leaf());
    assert_eq!(tree.value(*top_leaf), Some(1000.0));

    assert!(tree[*province].is_interior());
    assert_eq!(child_names(&tree, *province), ["1", "1"]);
    let values: Vec<_> = tree.children(*province).iter().map(|&c| tree.value(c)).collect();
    assert_eq!(values, [Some(400.0), Some(600.0)]);
    assert!(tree.is_valid());
}

#[test]
fn test_admin_code_default_root_label() {
    let tree = build_tree(&rows(&[("1.01.01", "5")]), BuilderConfig::admin_code()).unwrap();
    assert_eq!(tree.root_label(), "Costa Rica");
    assert_eq!(tree.height(), 3);
}

// ============= Properties =============

#[test]
fn test_dedupe_leaf_count_equals_distinct_paths() {
    let input = rows(&[
        ("x.a", "1"),
        ("x.b", "2"),
        ("y.a", "3"),
        ("x.a", "4"),
        ("y.c.d", "5"),
        ("x.b", "6"),
    ]);
    let distinct: HashSet<_> = input.iter().map(|r| r.path.clone()).collect();

    let tree = build_dotted_tree(&input).unwrap();
    assert_eq!(tree.num_leaves(), distinct.len());

    // Duplicates keep the last value
    assert_eq!(tree.value(tree.find_path(&["x", "a"]).unwrap()), Some(4.0));
    assert_eq!(tree.value(tree.find_path(&["x", "b"]).unwrap()), Some(6.0));
}

#[test]
fn test_admin_code_counts() {
    let input = rows(&[
        ("1.01.01", "10"),
        ("1.01.02", "20"),
        ("1.02.01", "30"),
        ("2.01.01", "40"),
        ("1.01.01", "50"),
    ]);
    let tree = build_admin_code_tree(&input, "Costa Rica").unwrap();

    assert_eq!(tree.num_leaves(), input.len());
    // 1, 1.01, 1.02, 2, 2.01
    assert_eq!(tree.num_interior(), 5);
}

#[test]
fn test_prefix_nodes_created_once() {
    let tree = build_dotted_tree(&rows(&[("a.b.c", "1"), ("a.b.d", "2"), ("a.e", "3")])).unwrap();

    let a_nodes = tree.pre_order_iter().filter(|n| n.name() == "a").count();
    let b_nodes = tree.pre_order_iter().filter(|n| n.name() == "b").count();
    assert_eq!(a_nodes, 1);
    assert_eq!(b_nodes, 1);
    assert_eq!(tree.num_nodes(), 6);
}

#[test]
fn test_children_keep_row_order() {
    let input = rows(&[("m.z", "1"), ("m.a", "1"), ("b", "1"), ("m.k", "1"), ("a", "1")]);

    let first = build_dotted_tree(&input).unwrap();
    let second = build_dotted_tree(&input).unwrap();

    assert_eq!(child_names(&first, first.root_index()), ["m", "b", "a"]);
    let m = first.find_path(&["m"]).unwrap();
    assert_eq!(child_names(&first, m), ["z", "a", "k"]);
    assert_eq!(first, second);
}

#[test]
fn test_subtree_sum_equals_row_sum() {
    let input = rows(&[
        ("flare.vis.axis.Axis", "24593"),
        ("flare.vis.axis.Axes", "1302"),
        ("flare.vis.legend.Legend", "20859"),
        ("flare.util.Arrays", "8258"),
    ]);
    let tree = build_dotted_tree(&input).unwrap();

    let vis = tree.find_path(&["flare", "vis"]).unwrap();
    assert_eq!(tree.subtree_sum(vis), 24593.0 + 1302.0 + 20859.0);

    let sums = tree.subtree_sums();
    assert_eq!(sums[tree.root_index()], 24593.0 + 1302.0 + 20859.0 + 8258.0);
    assert_eq!(sums[vis], tree.subtree_sum(vis));
}

// ============= Row policy =============

#[test]
fn test_strict_aborts_on_missing_path() {
    let input = vec![Row::new("a", "1"), Row::default(), Row::new("b", "2")];
    let err = build_dotted_tree(&input).unwrap_err();

    assert_eq!(err.kind(), &BuildErrorKind::MissingPath);
    assert_eq!(err.row(), 1);
    assert!(err.is_malformed_row());
}

#[test]
fn test_strict_aborts_on_empty_path() {
    let err = build_file_path_tree(&[Row::new("", "1")]).unwrap_err();
    assert_eq!(err.kind(), &BuildErrorKind::EmptyPath);
    assert_eq!(err.row(), 0);
}

#[test]
fn test_lenient_skips_and_records() {
    let input = vec![
        Row::new("a.b", "1"),
        Row::without_weight(""),
        Row::default(),
        Row::new("a.c", "2"),
    ];
    let mut builder =
        TreeBuilder::for_variant(TreeVariant::Dotted).with_row_policy(RowPolicy::Lenient);
    builder.add_rows(&input).unwrap();
    let (tree, stats) = builder.finish_with_stats();

    assert_eq!(tree.num_leaves(), 2);
    assert_eq!(stats.rows, 4);
    assert_eq!(stats.placed(), 2);
    let skipped: Vec<_> = stats.skipped.iter().map(|e| e.row()).collect();
    assert_eq!(skipped, [1, 2]);
}

#[test]
fn test_interior_empty_segments_are_kept() {
    let tree = build_dotted_tree(&[Row::new("a..b", "1")]).unwrap();
    assert!(tree.find_path(&["a", "", "b"]).is_some());
}

// ============= Weights =============

#[test]
fn test_invalid_weight_is_nan_and_counted() {
    let input = vec![
        Row::new("a", "12kb"),
        Row::without_weight("b"),
        Row::new("c", " 3 "),
        Row::new("d", ""),
    ];
    let mut builder = TreeBuilder::for_variant(TreeVariant::Dotted);
    builder.add_rows(&input).unwrap();
    let (tree, stats) = builder.finish_with_stats();

    assert!(tree.value(tree.find_path(&["a"]).unwrap()).unwrap().is_nan());
    assert!(tree.value(tree.find_path(&["b"]).unwrap()).unwrap().is_nan());
    assert_eq!(tree.value(tree.find_path(&["c"]).unwrap()), Some(3.0));
    assert_eq!(tree.value(tree.find_path(&["d"]).unwrap()), Some(0.0));
    assert_eq!(stats.invalid_weights, [0, 1]);
    assert!(tree.subtree_sum(tree.root_index()).is_nan());
}

// ============= Conflicts =============

#[test]
fn test_reject_leaf_used_as_prefix() {
    let config = BuilderConfig::dotted().with_conflict_policy(ConflictPolicy::Reject);
    let err = build_tree(&rows(&[("a", "5"), ("a.b", "1")]), config).unwrap_err();

    assert_eq!(err.kind(), &BuildErrorKind::LeafUsedAsPrefix("a".to_string()));
    assert_eq!(err.row(), 1);
    assert!(err.is_path_conflict());
}

#[test]
fn test_reject_interior_used_as_leaf() {
    let config = BuilderConfig::file_path().with_conflict_policy(ConflictPolicy::Reject);
    let err = build_tree(&rows(&[("src/lib.rs", "5"), ("src/lib", "1")]), config).unwrap_err();

    assert_eq!(err.kind(), &BuildErrorKind::InteriorUsedAsLeaf("src/lib".to_string()));
}

#[test]
fn test_rejected_row_leaves_no_partial_nodes() {
    let config = BuilderConfig::dotted()
        .with_conflict_policy(ConflictPolicy::Reject)
        .with_row_policy(RowPolicy::Lenient);
    let mut builder = TreeBuilder::new(config);
    builder.add_rows(&rows(&[("a", "1"), ("a.x.y.z", "2"), ("b", "3")])).unwrap();
    let (tree, stats) = builder.finish_with_stats();

    assert_eq!(stats.skipped.len(), 1);
    assert_eq!(tree.num_nodes(), 3);
    assert_eq!(child_names(&tree, tree.root_index()), ["a", "b"]);
    assert_eq!(tree.value(tree.find_path(&["a"]).unwrap()), Some(1.0));
}

#[test]
fn test_root_label_as_full_path_collides() {
    // The file path variant registers its root under "root"
    let err = build_file_path_tree(&[Row::new("root", "1")]).unwrap_err();
    assert_eq!(err.kind(), &BuildErrorKind::RootCollision("root".to_string()));

    // ... so a prefix spelling the root label resolves to the root itself
    let tree = build_file_path_tree(&[Row::new("root/a", "1")]).unwrap();
    assert_eq!(child_names(&tree, tree.root_index()), ["a"]);

    // The dotted variant does not
    let tree = build_dotted_tree(&[Row::new("root", "1")]).unwrap();
    assert_eq!(child_names(&tree, tree.root_index()), ["root"]);
}

#[test]
fn test_builders_on_independent_threads() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                let input: Vec<Row> = (0..100)
                    .map(|i| Row::new(format!("t{t}.g{}.n{i}", i % 7), "1"))
                    .collect();
                build_dotted_tree(&input).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let tree = handle.join().unwrap();
        assert_eq!(tree.num_leaves(), 100);
        assert_eq!(tree.subtree_sum(tree.root_index()), 100.0);
    }
}
