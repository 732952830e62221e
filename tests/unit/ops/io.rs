use super::*;
use crate::kwargs;

#[test]
fn input_stores_filename_and_options() {
    let s = input("in.mp4", kwargs! { "ss" => 10.5 }).unwrap();
    let node = s.node();
    assert_eq!(node.kind(), NodeKind::Input);
    assert_eq!(node.kwargs()["filename"], Value::from("in.mp4"));
    assert_eq!(node.kwargs()["ss"], Value::from(10.5));
}

#[test]
fn f_is_an_alias_for_format() {
    let a = input("in.raw", kwargs! { "f" => "rawvideo" }).unwrap();
    let b = input("in.raw", kwargs! { "format" => "rawvideo" }).unwrap();
    assert_eq!(a, b);

    let err = input("in.raw", kwargs! { "f" => "rawvideo", "format" => "rawvideo" }).unwrap_err();
    assert!(matches!(err, FfgraphError::Validation(_)));

    let src = input("in.mp4", kwargs! {}).unwrap();
    assert!(src.output("out.mp4", kwargs! { "f" => "mp4", "format" => "mp4" }).is_err());
}

#[test]
fn filename_cannot_be_given_twice() {
    let err = input("in.mp4", kwargs! { "filename" => "other.mp4" }).unwrap_err();
    assert!(err.to_string().contains("filename"));
}

#[test]
fn output_indexes_its_streams() {
    let a = input("a.mp4", kwargs! {}).unwrap();
    let b = input("b.mp4", kwargs! {}).unwrap();
    let out = output_multi(&[a.clone(), b.clone()], "out.mp4", kwargs! {}).unwrap();
    let labels = out
        .node()
        .incoming()
        .iter()
        .map(|e| e.label.clone())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec![Label::Index(0), Label::Index(1)]);

    assert!(output_multi(&[], "out.mp4", kwargs! {}).is_err());
}

#[test]
fn map_is_copy_on_extend() {
    let a = input("a.mp4", kwargs! {}).unwrap();
    let b = input("b.mp4", kwargs! {}).unwrap();
    let out = a.output("out.mp4", kwargs! {}).unwrap();
    let extended = out.map(&b).unwrap();
    assert_eq!(out.node().incoming().len(), 1);
    assert_eq!(extended.node().incoming().len(), 2);
    assert_eq!(
        extended,
        output_multi(&[a, b], "out.mp4", kwargs! {}).unwrap()
    );
}

#[test]
fn map_rejects_non_output_nodes() {
    let a = input("a.mp4", kwargs! {}).unwrap();
    let g = a
        .output("out.mp4", kwargs! {})
        .unwrap()
        .overwrite_output()
        .unwrap();
    assert!(matches!(g.map(&a), Err(FfgraphError::Validation(_))));
}

#[test]
fn global_nodes_store_literal_args() {
    let out = input("a.mp4", kwargs! {})
        .unwrap()
        .output("out.mp4", kwargs! {})
        .unwrap();
    let y = out.overwrite_output().unwrap();
    assert_eq!(y.node().kind(), NodeKind::Global);
    assert_eq!(y.node().args(), &[Value::from("-y")]);

    let g = out.global_args(["-progress", "pipe:2"]).unwrap();
    assert_eq!(
        g.node().args(),
        &[Value::from("-progress"), Value::from("pipe:2")]
    );
    assert!(out.global_args(Vec::<String>::new()).is_err());
}

#[test]
fn merge_outputs_requires_output_streams() {
    let src = input("in.mp4", kwargs! {}).unwrap();
    let o1 = src.output("out1.mp4", kwargs! {}).unwrap();
    let o2 = src.output("out2.mp4", kwargs! {}).unwrap();
    let merged = merge_outputs(&[o1, o2]).unwrap();
    assert_eq!(merged.node().kind(), NodeKind::MergeOutputs);
    assert_eq!(merged.node().incoming().len(), 2);
    assert!(merge_outputs(&[]).is_err());
}
