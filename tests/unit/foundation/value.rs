use super::*;

#[test]
fn floats_keep_a_fractional_digit() {
    assert_eq!(Value::from(10.5).to_string(), "10.5");
    assert_eq!(Value::from(0.0).to_string(), "0.0");
    assert_eq!(Value::from(0.8).to_string(), "0.8");
    assert_eq!(Value::from(3.0_f32).to_string(), "3.0");
}

#[test]
fn scalars_render_as_command_line_text() {
    assert_eq!(Value::from(1000).to_string(), "1000");
    assert_eq!(Value::from(true).to_string(), "1");
    assert_eq!(Value::from(false).to_string(), "0");
    assert_eq!(Value::from("yuv420p").to_string(), "yuv420p");
    assert_eq!(Value::Null.to_string(), "");
}

#[test]
fn containers_use_filter_separators() {
    assert_eq!(Value::from(vec!["yuv420p", "rgb24"]).to_string(), "yuv420p|rgb24");
    let map = crate::kwargs! { "w" => 2, "h" => 1 };
    assert_eq!(Value::from(map).to_string(), "h=1:w=2");
}

#[test]
fn repr_quotes_strings() {
    assert_eq!(Value::from("in.mp4").repr(), "\"in.mp4\"");
    assert_eq!(Value::from((32, 24)).repr(), "[32, 24]");
    assert_eq!(Value::Null.repr(), "None");
}

#[test]
fn untagged_json_roundtrip_picks_natural_variants() {
    let v: Value = serde_json::from_str(r#"{"a": [1, 2.5, "x", null, true]}"#).unwrap();
    let Value::Map(map) = v else {
        panic!("expected map");
    };
    assert_eq!(
        map["a"],
        Value::List(vec![
            Value::Int(1),
            Value::Float(2.5),
            Value::Str("x".to_string()),
            Value::Null,
            Value::Bool(true),
        ])
    );
}

#[test]
fn kwargs_macro_sorts_keys() {
    let kw = crate::kwargs! { "start_frame" => 10, "end_frame" => 20 };
    let keys = kw.keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys, vec!["end_frame".to_string(), "start_frame".to_string()]);
}

#[test]
fn as_i64_accepts_integral_values() {
    assert_eq!(Value::from(3).as_i64(), Some(3));
    assert_eq!(Value::from(2.0).as_i64(), Some(2));
    assert_eq!(Value::from("4").as_i64(), Some(4));
    assert_eq!(Value::from(2.5).as_i64(), None);
}
