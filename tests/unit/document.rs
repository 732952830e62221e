use super::*;
use crate::compile::compiler::get_args;

fn build(json: &str) -> FfgraphResult<Vec<OutputStream>> {
    GraphDocument::from_json(json)?.build(&OperatorRegistry::with_builtins())
}

#[test]
fn stream_refs_parse_label_and_selector() {
    let r = StreamRef::parse("in").unwrap();
    assert_eq!((r.id, r.label, r.selector), ("in", Label::Default, None));
    let r = StreamRef::parse("split:1").unwrap();
    assert_eq!(r.label, Label::Index(1));
    let r = StreamRef::parse("in::a").unwrap();
    assert_eq!((r.label, r.selector), (Label::Default, Some("a")));
    let r = StreamRef::parse("in:0:0:v").unwrap();
    assert_eq!(r.selector, Some("0:v"));
    assert!(StreamRef::parse(":1").is_err());
}

#[test]
fn document_compiles_like_the_fluent_api() {
    let streams = build(
        r#"{
            "nodes": [
                {"id": "in", "op": "input", "args": ["in.mp4"]},
                {"id": "trim", "op": "trim", "inputs": ["in"],
                 "kwargs": {"start_frame": 10, "end_frame": 20}},
                {"id": "out", "op": "output", "inputs": ["trim"], "args": ["out.mp4"]}
            ],
            "outputs": ["out"]
        }"#,
    )
    .unwrap();
    assert_eq!(
        get_args(&streams, None).unwrap(),
        vec![
            "-i",
            "in.mp4",
            "-filter_complex",
            "[0]trim=end_frame=20:start_frame=10[s0]",
            "-map",
            "[s0]",
            "out.mp4",
        ]
    );
}

#[test]
fn selectors_and_split_labels_resolve() {
    let streams = build(
        r#"{
            "nodes": [
                {"id": "in", "op": "input", "kwargs": {"filename": "in.mp4"}},
                {"id": "sp", "op": "split", "inputs": ["in::v"]},
                {"id": "a", "op": "hflip", "inputs": ["sp:0"]},
                {"id": "b", "op": "vflip", "inputs": ["sp:1"]},
                {"id": "out", "op": "output", "inputs": ["a", "b", "in::a"], "args": ["out.mkv"]}
            ],
            "outputs": ["out"]
        }"#,
    )
    .unwrap();
    let args = get_args(&streams, None).unwrap();
    assert_eq!(
        args[3],
        "[0:v]split=2[s0][s1];[s0]hflip[s2];[s1]vflip[s3]"
    );
    assert_eq!(
        &args[4..],
        &["-map", "[s2]", "-map", "[s3]", "-map", "0:a", "out.mkv"]
    );
}

#[test]
fn forward_and_unknown_references_are_rejected() {
    let err = build(
        r#"{
            "nodes": [
                {"id": "out", "op": "output", "inputs": ["in"], "args": ["out.mp4"]},
                {"id": "in", "op": "input", "args": ["in.mp4"]}
            ],
            "outputs": ["out"]
        }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown node id 'in'"));
    assert!(err.to_string().contains("node 'out'"));
}

#[test]
fn duplicate_ids_and_missing_outputs_are_rejected() {
    let err = build(
        r#"{"nodes": [
            {"id": "in", "op": "input", "args": ["a.mp4"]},
            {"id": "in", "op": "input", "args": ["b.mp4"]}
        ], "outputs": ["in"]}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate node id"));

    let err = build(r#"{"nodes": [], "outputs": []}"#).unwrap_err();
    assert!(err.to_string().contains("no outputs"));
}

#[test]
fn outputs_must_name_output_nodes() {
    let err = build(
        r#"{"nodes": [{"id": "in", "op": "input", "args": ["a.mp4"]}], "outputs": ["in"]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, FfgraphError::Validation(_)));
}

#[test]
fn unknown_fields_are_serde_errors() {
    let err = GraphDocument::from_json(r#"{"nodes": [], "outputs": [], "extra": 1}"#).unwrap_err();
    assert!(matches!(err, FfgraphError::Serde(_)));
}

#[test]
fn json_round_trip_preserves_the_document() {
    let doc = GraphDocument {
        nodes: vec![NodeSpec {
            id: "in".into(),
            op: "input".into(),
            inputs: Vec::new(),
            args: vec![Value::from("in.mp4")],
            kwargs: crate::kwargs! { "ss" => 1.5 },
        }],
        outputs: vec!["in".into()],
    };
    let back = GraphDocument::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(back, doc);
}
