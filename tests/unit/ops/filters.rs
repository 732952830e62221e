use super::*;
use crate::ops::io::input;
use crate::{args, kwargs};

fn src(name: &str) -> FilterableStream {
    input(name, kwargs! {}).unwrap()
}

#[test]
fn single_input_filters_use_the_default_slot() {
    let s = src("in.mp4").hflip().unwrap();
    let node = s.node();
    assert_eq!(node.name(), "hflip");
    assert_eq!(node.incoming().len(), 1);
    assert_eq!(node.incoming()[0].label, Label::Default);
}

#[test]
fn crop_reorders_geometry() {
    let s = src("in.mp4").crop(10, 20, 158, 112, kwargs! {}).unwrap();
    assert_eq!(s.node().args(), args![158, 112, 10, 20].as_slice());
}

#[test]
fn drawbox_maps_thickness_to_t() {
    let s = src("in.mp4")
        .drawbox(50, 50, 120, 120, "red", Some(Value::from(5)), kwargs! {})
        .unwrap();
    assert_eq!(s.node().args(), args![50, 50, 120, 120, "red"].as_slice());
    assert_eq!(s.node().kwargs()["t"], Value::from(5));
}

#[test]
fn drawtext_escapes_text_and_skips_zero_offsets() {
    let s = src("in.mp4")
        .drawtext(Some("100%"), 0, 12, true, kwargs! {})
        .unwrap();
    let kw = s.node().kwargs();
    assert_eq!(kw["text"], Value::from("100\\%"));
    assert!(!kw.contains_key("x"));
    assert_eq!(kw["y"], Value::from(12));

    let raw = src("in.mp4")
        .drawtext(Some("100%"), 0, 0, false, kwargs! {})
        .unwrap();
    assert_eq!(raw.node().kwargs()["text"], Value::from("100%"));
}

#[test]
fn overlay_takes_two_inputs_and_defaults_eof_action() {
    let main = src("a.mp4");
    let over = src("b.mp4");
    let s = main.overlay(&over, kwargs! {}).unwrap();
    assert_eq!(s.node().incoming().len(), 2);
    assert_eq!(s.node().kwargs()["eof_action"], Value::from("repeat"));

    let s = main
        .overlay(&over, kwargs! { "eof_action" => "endall" })
        .unwrap();
    assert_eq!(s.node().kwargs()["eof_action"], Value::from("endall"));
}

#[test]
fn concat_counts_segments() {
    let a = src("a.mp4");
    let b = src("b.mp4");
    let s = a.concat(&[b.clone()], kwargs! {}).unwrap();
    assert_eq!(s.node().kwargs()["n"], Value::from(2));

    let va = concat(
        &[a.clone(), a.audio().unwrap(), b.clone(), b.audio().unwrap()],
        kwargs! { "v" => 1, "a" => 1 },
    )
    .unwrap();
    assert_eq!(va.node().kwargs()["n"], Value::from(2));

    let err = concat(&[a.clone(), b.clone(), a], kwargs! { "a" => 1 }).unwrap_err();
    assert!(err.to_string().contains("multiple of 2"));

    assert!(concat(&[b], kwargs! { "v" => 0 }).is_err());
}

#[test]
fn concat_rejects_overflowing_segment_counts() {
    let err = concat(&[src("a.mp4")], kwargs! { "v" => i64::MAX, "a" => 1 }).unwrap_err();
    assert!(matches!(err, FfgraphError::Validation(_)));
    assert!(err.to_string().contains("overflow"));
}

#[test]
fn named_single_input_filters_reject_extra_inputs() {
    let err = filter_node(
        vec![src("a.mp4"), src("b.mp4")].into(),
        "hflip",
        Vec::new(),
        Kwargs::new(),
        Arity::exactly(1),
    )
    .unwrap_err();
    assert!(err.to_string().contains("at most 1"));
}

#[test]
fn custom_filter_accepts_many_inputs() {
    let s = filter(
        vec![src("a.mp4"), src("b.mp4"), src("c.mp4")],
        "hstack",
        Vec::new(),
        kwargs! { "inputs" => 3 },
    )
    .unwrap();
    assert_eq!(s.node().incoming().len(), 3);
}

#[test]
fn split_returns_indexable_outputs() {
    let split = src("in.mp4").split().unwrap();
    let a = split.index(0);
    let b = split.index(1);
    assert_eq!(a.node(), b.node());
    assert_ne!(a, b);
    assert_eq!(split.node().name(), "split");
    assert_eq!(src("in.mp4").asplit().unwrap().node().name(), "asplit");
}
