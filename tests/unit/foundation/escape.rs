use super::*;

#[test]
fn escapes_each_listed_character_once() {
    assert_eq!(escape_chars("a:b", ":"), "a\\:b");
    assert_eq!(escape_chars("a\\:b", ":\\"), "a\\\\\\:b");
    assert_eq!(
        escape_chars("a:b,c[d]e%{}f'g'h\\i", "\\':,[]%"),
        "a\\:b\\,c\\[d\\]e\\%{}f\\'g\\'h\\\\i"
    );
}

#[test]
fn numeric_values_are_stringified_first() {
    assert_eq!(escape_value(&Value::from(123), ":\\"), "123");
    assert_eq!(escape_value(&Value::from(0.5), FILTER_ARG_CHARS), "0.5");
}

#[test]
fn arg_level_escaping_adds_exactly_one_backslash() {
    for ch in ['\\', '\'', '=', ':'] {
        let input = format!("a{ch}b");
        let escaped = escape_chars(&input, FILTER_ARG_CHARS);
        assert_eq!(escaped, format!("a\\{ch}b"), "char {ch:?}");
    }
    assert_eq!(escape_chars("a,b", FILTER_ARG_CHARS), "a,b");
}

#[test]
fn spec_level_escaping_covers_graph_punctuation() {
    assert_eq!(
        escape_chars("a[b]c,d;e", FILTER_SPEC_CHARS),
        "a\\[b\\]c\\,d\\;e"
    );
    assert_eq!(escape_chars("x=1:y=2", FILTER_SPEC_CHARS), "x=1:y=2");
}
