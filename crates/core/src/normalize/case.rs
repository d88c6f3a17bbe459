use serde_json::{Map, Value};

/// `source_link` -> `sourceLink`. Leading underscores and already-camel keys are kept.
pub fn snake_to_camel(key: &str) -> String {
    let body = key.trim_start_matches('_');
    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..key.len() - body.len()]);

    let mut upper_next = false;
    for ch in body.chars() {
        if ch == '_' {
            upper_next = !out.is_empty() && !out.ends_with('_');
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively rewrites every object key into camel case.
///
/// When a payload carries both spellings of one field, the snake_case one wins unless
/// it is null or blank and the camelCase one is not.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        Value::Object(obj) => {
            let mut out = Map::with_capacity(obj.len());
            for (key, inner) in obj {
                let camel = snake_to_camel(&key);
                let converted = camel != key;
                let inner = camelize_keys(inner);
                let replace = match out.get(&camel) {
                    None => true,
                    Some(existing) => {
                        let (snake, camel_value) = if converted {
                            (&inner, existing)
                        } else {
                            (existing, &inner)
                        };
                        if is_blank(snake) && !is_blank(camel_value) {
                            !converted
                        } else {
                            converted
                        }
                    }
                };
                if replace {
                    out.insert(camel, inner);
                }
            }
            Value::Object(out)
        }
        other => other,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
