use super::*;
use crate::graph::stream::FilterableStream;
use crate::ops::io::input;
use crate::{args, kwargs};

fn src() -> FilterableStream {
    input("in.mp4", kwargs! {}).unwrap()
}

#[test]
fn filter_body_orders_args_then_sorted_kwargs() {
    let node = src()
        .filter(
            "drawbox",
            args![50, 50, 120, 120, "red"],
            kwargs! { "t" => 5, "c" => "x" },
        )
        .unwrap()
        .node()
        .clone();
    assert_eq!(filter_body(&node, 1), "drawbox=50:50:120:120:red:c=x:t=5");
}

#[test]
fn filter_body_without_params_is_just_the_name() {
    let node = src().hflip().unwrap().node().clone();
    assert_eq!(filter_body(&node, 1), "hflip");
}

#[test]
fn null_kwargs_are_left_out_of_the_filter_body() {
    let node = src()
        .trim(kwargs! { "start_frame" => 1, "end" => Value::Null })
        .unwrap()
        .node()
        .clone();
    assert_eq!(filter_body(&node, 1), "trim=start_frame=1");

    let node = src()
        .filter("null", args![], kwargs! { "unused" => Value::Null })
        .unwrap()
        .node()
        .clone();
    assert_eq!(filter_body(&node, 1), "null");
}

#[test]
fn filter_body_escapes_values_then_the_whole_spec() {
    let node = src()
        .filter("drawtext", args![], kwargs! { "text" => "a:b,c" })
        .unwrap()
        .node()
        .clone();
    // `:` gets one backslash at the argument level; that backslash is escaped again at the
    // spec level. `,` is only a spec-level character.
    assert_eq!(filter_body(&node, 1), "drawtext=text=a\\\\:b\\,c");
}

#[test]
fn split_uses_the_outgoing_edge_count() {
    let node = src().split().unwrap().node().clone();
    assert_eq!(filter_body(&node, 3), "split=3");
}

#[test]
fn upstream_refs_drop_brackets_only_for_final_input_maps() {
    let input = src();
    let flipped = input.hflip().unwrap();
    let mut names = StreamNames::default();
    names.insert(input.node().clone(), Label::Default, "0".into());
    names.insert(flipped.node().clone(), Label::Default, "s0".into());

    let edge = |up: &FilterableStream| DagEdge {
        downstream_node: up.node().clone(),
        downstream_label: Label::Default,
        upstream_node: up.node().clone(),
        upstream_label: Label::Default,
        upstream_selector: up.selector().map(str::to_string),
    };

    assert_eq!(names.upstream_ref(&edge(&input), true).unwrap(), "0");
    assert_eq!(names.upstream_ref(&edge(&input), false).unwrap(), "[0]");
    assert_eq!(
        names
            .upstream_ref(&edge(&input.audio().unwrap()), true)
            .unwrap(),
        "0:a"
    );
    assert_eq!(names.upstream_ref(&edge(&flipped), true).unwrap(), "[s0]");
}

#[test]
fn unnamed_streams_are_compile_errors() {
    let names = StreamNames::default();
    let node = src().node().clone();
    let err = names.get(&node, &Label::Index(3)).unwrap_err();
    assert!(matches!(err, FfgraphError::Compile(_)));
}

#[test]
fn compile_prefixes_the_command() {
    let out = src().output("out.mp4", kwargs! {}).unwrap();
    let opts = CompileOpts::new()
        .cmd(["nice", "ffmpeg"])
        .overwrite_output(Some(false));
    assert_eq!(
        out.compile(&opts).unwrap(),
        vec!["nice", "ffmpeg", "-i", "in.mp4", "out.mp4", "-n"]
    );
    assert!(compile(&[out], &CompileOpts::new().cmd(Vec::<String>::new())).is_err());
    assert!(get_args(&[], None).is_err());
}
