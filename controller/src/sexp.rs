//! Property-list helpers shared by the config loader, the recording
//! reader, and the event writer.
//!
//! lexpr reads `:foo` either as a keyword or as a symbol with a leading
//! colon depending on parser options; both spellings are accepted.

use lexpr::Value;

/// True when `v` is the plist key `key` (given without the colon).
fn is_key(v: &Value, key: &str) -> bool {
    match v {
        Value::Keyword(k) => &**k == key,
        Value::Symbol(s) => s.strip_prefix(':') == Some(key),
        _ => false,
    }
}

/// Raw value following `key` in a plist.
pub fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = value;
    while let Value::Cons(pair) = current {
        if is_key(pair.car(), key) {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Render an atom as plain text: keywords and `:symbols` lose the colon,
/// booleans become `t`/`nil`.
pub fn atom_string(val: &Value) -> String {
    match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s: &str = v;
            s.strip_prefix(':').unwrap_or(s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "t" } else { "nil" }).to_string(),
        Value::Null => "nil".to_string(),
        _ => val.to_string(),
    }
}

pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    get_value(value, key).map(atom_string)
}

pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Treats `nil` as false, anything else as true.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

/// Numeric atom as `f64`.
pub fn as_number(val: &Value) -> Option<f64> {
    match val {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Elements of a proper list. `()` and `nil` are empty; anything else
/// that is not a list yields `None`.
pub fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null => return Some(items),
            Value::Symbol(s) if &**s == "nil" => return Some(items),
            _ => return None,
        }
    }
}

/// Keys present in a plist, without the colon, in order.
pub fn plist_keys(value: &Value) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = value;
    while let Value::Cons(pair) = current {
        match pair.car() {
            Value::Keyword(k) => keys.push(k.to_string()),
            Value::Symbol(s) => {
                if let Some(k) = s.strip_prefix(':') {
                    keys.push(k.to_string());
                }
            }
            _ => {}
        }
        current = match pair.cdr() {
            Value::Cons(next) => next.cdr(),
            _ => break,
        };
    }
    keys
}

/// Format an event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}
