use crate::foundation::value::{Kwargs, Value};

/// Render kwargs as `-key value` flags in sorted key order.
///
/// A `Null` value emits the bare flag; a list emits the flag once per element.
pub fn kwargs_to_cmd_line_args(kwargs: &Kwargs) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in kwargs {
        match value {
            Value::List(items) => {
                for item in items {
                    push_flag(&mut args, key, item);
                }
            }
            other => push_flag(&mut args, key, other),
        }
    }
    args
}

fn push_flag(args: &mut Vec<String>, key: &str, value: &Value) {
    args.push(format!("-{key}"));
    if !value.is_null() {
        args.push(value.to_string());
    }
}

/// `WxH` for a `[w, h]` pair, the text itself otherwise.
pub(crate) fn video_size(value: &Value) -> String {
    match value {
        Value::List(items) if items.len() == 2 => format!("{}x{}", items[0], items[1]),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/args.rs"]
mod tests;
