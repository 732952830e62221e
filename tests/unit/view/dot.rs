use super::*;
use crate::kwargs;
use crate::ops::io::input;

#[test]
fn dot_lists_nodes_with_kind_colors_and_edges() {
    let src = input("media/in.mp4", kwargs! {}).unwrap();
    let flipped = src.hflip().unwrap();
    let out = flipped.output("out.mp4", kwargs! {}).unwrap();

    let dot = to_dot(&[out.clone()], &DotOpts::new()).unwrap();
    assert!(dot.starts_with("digraph ffgraph {\n  rankdir=LR;\n"));
    assert!(dot.ends_with("}\n"));
    assert!(dot.contains("[label=\"in.mp4\", shape=box, style=filled, fillcolor=\"#99cc00\"]"));
    assert!(dot.contains("[label=\"hflip\", shape=box, style=filled, fillcolor=\"#ffcc00\"]"));
    assert!(dot.contains("[label=\"out.mp4\", shape=box, style=filled, fillcolor=\"#99ccff\"]"));
    assert!(dot.contains(&format!(
        "{} -> {};",
        node_id(src.node()),
        node_id(flipped.node())
    )));
    assert!(dot.contains(&format!(
        "{} -> {} [label=\"0\"];",
        node_id(flipped.node()),
        node_id(out.node())
    )));
}

#[test]
fn labels_show_selector_and_can_be_hidden() {
    let src = input("in.mp4", kwargs! {}).unwrap();
    let split = src.audio().unwrap().asplit().unwrap();
    let a = split.index(0).output("a.wav", kwargs! {}).unwrap();

    let dot = to_dot(&[a.clone()], &DotOpts::new()).unwrap();
    assert!(dot.contains("[label=\":a\"]"));
    assert!(dot.contains("[label=\"0 \u{2192} 0\"]"));

    let bare = to_dot(&[a], &DotOpts::new().show_labels(false)).unwrap();
    assert!(!bare.contains("\u{2192}"));
    assert!(!bare.contains("[label=\":a\"]"));
}

#[test]
fn detail_adds_args_and_kwargs() {
    let out = input("in.mp4", kwargs! {})
        .unwrap()
        .trim(kwargs! { "start_frame" => 10 })
        .unwrap()
        .output("out.mp4", kwargs! {})
        .unwrap();
    let dot = to_dot(&[out], &DotOpts::new().detail(true)).unwrap();
    assert!(dot.contains("trim\\nstart_frame=10"));
    assert!(dot.contains("in.mp4\\nfilename=\\\"in.mp4\\\""));
}

#[test]
fn escape_dot_string_handles_quotes_and_newlines() {
    assert_eq!(escape_dot_string("a\"b\nc\\d"), "a\\\"b\\nc\\\\d");
}

#[test]
fn global_nodes_are_unfilled() {
    let out = input("in.mp4", kwargs! {})
        .unwrap()
        .output("out.mp4", kwargs! {})
        .unwrap()
        .overwrite_output()
        .unwrap();
    let dot = to_dot(&[out], &DotOpts::new()).unwrap();
    assert!(dot.contains("[label=\"overwrite_output\", shape=box];"));
}
