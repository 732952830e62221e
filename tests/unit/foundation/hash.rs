use std::collections::BTreeMap;

use super::*;

#[test]
fn map_digest_ignores_insertion_order() {
    let a: BTreeMap<String, Value> = [("x", 1), ("y", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::from(v)))
        .collect();
    let b: BTreeMap<String, Value> = [("y", 2), ("x", 1)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::from(v)))
        .collect();
    assert_eq!(
        fingerprint_value(&Value::Map(a)),
        fingerprint_value(&Value::Map(b))
    );

    let mut h1 = StableHasher::new();
    let k1 = "a".to_string();
    let k2 = "b".to_string();
    let v1 = Value::from(1);
    let v2 = Value::from("z");
    h1.write_map([(&k1, &v1), (&k2, &v2)].into_iter());
    let mut h2 = StableHasher::new();
    h2.write_map([(&k2, &v2), (&k1, &v1)].into_iter());
    assert_eq!(h1.finish(), h2.finish());
}

#[test]
fn sequence_digest_is_order_sensitive() {
    let a = Value::from(vec![1, 2]);
    let b = Value::from(vec![2, 1]);
    assert_ne!(fingerprint_value(&a), fingerprint_value(&b));
}

#[test]
fn variants_do_not_collide_on_equal_text() {
    assert_ne!(
        fingerprint_value(&Value::from(1)),
        fingerprint_value(&Value::from("1"))
    );
    assert_ne!(
        fingerprint_value(&Value::Null),
        fingerprint_value(&Value::from(""))
    );
}

#[test]
fn digest_is_stable_across_calls() {
    let v = Value::from(vec![Value::from(0.8), Value::from("aecho")]);
    let a = fingerprint_value(&v);
    let b = fingerprint_value(&v.clone());
    assert_eq!(a, b);
    assert_eq!(a.as_u64(), b.as_u64());
    assert_eq!(a.to_hex().len(), 32);
    assert!(a.short_hex().len() <= 12);
}
