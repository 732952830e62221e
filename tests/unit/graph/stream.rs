use super::*;
use crate::foundation::value::Kwargs;
use crate::graph::node::Arity;

fn input(filename: &str) -> NodeRef {
    NodeRef::new(
        NodeKind::Input,
        "input",
        Vec::new(),
        Vec::new(),
        crate::kwargs! { "filename" => filename },
        Arity::NONE,
    )
    .unwrap()
}

#[test]
fn audio_and_video_attach_selectors() {
    let s = FilterableStream::of(input("in.mp4"), Label::Default);
    assert_eq!(s.audio().unwrap().selector(), Some("a"));
    assert_eq!(s.video().unwrap().selector(), Some("v"));
    assert_eq!(s.select("0:a").unwrap().selector(), Some("0:a"));
    assert_eq!(s.selector(), None);
}

#[test]
fn selecting_twice_fails() {
    let s = FilterableStream::of(input("in.mp4"), Label::Default);
    let err = s.audio().unwrap().video().unwrap_err();
    assert!(err.to_string().contains("Stream already has a selector"));
}

#[test]
fn display_shows_label_selector_and_hash() {
    let node = input("in.mp4");
    let s = FilterableStream::of(node.clone(), Label::Default)
        .audio()
        .unwrap();
    assert_eq!(
        s.to_string(),
        format!("input(filename=\"in.mp4\")[:a] <{}>", node.short_hash())
    );
}

#[test]
fn typed_constructors_check_node_kind() {
    let src = input("in.mp4");
    assert!(FilterableStream::new(src.clone(), Label::Default, None).is_ok());
    assert!(matches!(
        OutputStream::new(src.clone(), Label::Default),
        Err(FfgraphError::Validation(_))
    ));

    let out = NodeRef::new(
        NodeKind::Output,
        "output",
        vec![(Label::Index(0), Stream::new(src, Label::Default, None))],
        Vec::new(),
        crate::kwargs! { "filename" => "out.mp4" },
        Arity::at_least(1),
    )
    .unwrap();
    assert!(FilterableStream::new(out.clone(), Label::Default, None).is_err());
    assert!(matches!(AnyStream::of(out).into_output(), Ok(_)));
}

#[test]
fn any_stream_conversion_errors_name_the_expected_kind() {
    let any = AnyStream::of(input("in.mp4"));
    let err = any.into_output().unwrap_err();
    assert!(err.to_string().contains("expected an output stream"));
}

#[test]
fn multi_output_labels() {
    let src = input("in.mp4");
    let split = NodeRef::new(
        NodeKind::Filter,
        "split",
        vec![(Label::Default, Stream::new(src, Label::Default, None))],
        Vec::new(),
        Kwargs::new(),
        Arity::exactly(1),
    )
    .unwrap();
    let multi = MultiOutput::new(split.clone());
    assert_eq!(multi.index(1).label(), &Label::Index(1));
    assert_eq!(multi.stream("1"), multi.index(1));
    assert_eq!(multi.stream("extra").label(), &Label::Name("extra".into()));
    assert_eq!(multi.selected("0", "v").unwrap().selector(), Some("v"));
    assert_eq!(multi.node(), &split);
}

#[test]
fn stream_spec_assigns_slot_labels() {
    let a = FilterableStream::of(input("a.mp4"), Label::Default);
    let b = FilterableStream::of(input("b.mp4"), Label::Default);

    let single = StreamSpec::from(&a).into_inputs();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].0, Label::Default);

    let list = StreamSpec::from([a.clone(), b.clone()]).into_inputs();
    assert_eq!(
        list.iter().map(|(l, _)| l.clone()).collect::<Vec<_>>(),
        vec![Label::Index(0), Label::Index(1)]
    );

    let labeled = StreamSpec::from(vec![("main".to_string(), a), ("1".to_string(), b)]);
    assert_eq!(labeled.len(), 2);
    let labeled = labeled.into_inputs();
    assert_eq!(labeled[0].0, Label::Name("main".into()));
    assert_eq!(labeled[1].0, Label::Index(1));
}
