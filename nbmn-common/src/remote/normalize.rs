//! OMDB payload normalization
//!
//! OMDB is loose about types: lists arrive as comma-joined strings, numbers
//! arrive as strings (sometimes with thousands separators), and anything
//! missing is spelled "N/A". [`normalize_omdb`] maps a payload onto a stable
//! shape:
//!
//! | Field kind   | Result                                              |
//! |--------------|-----------------------------------------------------|
//! | list fields  | array of trimmed strings, `[]` for blank / "N/A"    |
//! | numeric      | JSON int or float, or the string "NaN"              |
//! | `Poster`     | URL string, `""` for blank / "N/A"                  |
//! | anything else| unchanged                                           |
//!
//! The transform returns a copy and can be applied to its own output
//! without changing it.

use serde_json::{Map, Number, Value};

use super::RawPayload;

/// Stored in numeric fields that could not be coerced
pub const NAN_SENTINEL: &str = "NaN";

/// OMDB's spelling of "no value"
pub const NOT_APPLICABLE: &str = "N/A";

/// Fields holding comma-delimited lists
pub const LIST_FIELDS: [&str; 5] = ["Actors", "Director", "Genre", "Language", "Writer"];

/// Poster URL field
pub const POSTER_FIELD: &str = "Poster";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numeric {
    Int,
    Float,
}

const NUMERIC_FIELDS: [(&str, Numeric); 12] = [
    ("Metascore", Numeric::Int),
    ("Year", Numeric::Int),
    ("imdbRating", Numeric::Float),
    ("imdbVotes", Numeric::Int),
    ("tomatoFresh", Numeric::Int),
    ("tomatoMeter", Numeric::Int),
    ("tomatoRating", Numeric::Float),
    ("tomatoReviews", Numeric::Int),
    ("tomatoRotten", Numeric::Int),
    ("tomatoUserMeter", Numeric::Int),
    ("tomatoUserRating", Numeric::Float),
    ("tomatoUserReviews", Numeric::Int),
];

/// Normalize an OMDB payload (see module docs). The input is not modified.
pub fn normalize_omdb(src: &RawPayload) -> RawPayload {
    let mut resp: Map<String, Value> = src.clone();

    for key in LIST_FIELDS {
        let value = match resp.get(key) {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            other => Value::Array(
                split_list(&scalar_text(other))
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
        };
        resp.insert(key.to_string(), value);
    }

    let poster = scalar_text(resp.get(POSTER_FIELD));
    let poster = if is_blank_or_na(&poster) {
        String::new()
    } else {
        poster
    };
    resp.insert(POSTER_FIELD.to_string(), Value::String(poster));

    // Best effort on numbers: only truthy values are touched
    for (key, kind) in NUMERIC_FIELDS {
        let coerced = match resp.get(key) {
            Some(value) if is_truthy(value) => coerce(value, kind),
            _ => continue,
        };
        resp.insert(key.to_string(), coerced);
    }

    resp
}

/// Split a comma-delimited value; blank and "N/A" give an empty list
pub fn split_list(text: &str) -> Vec<String> {
    if is_blank_or_na(text) {
        return Vec::new();
    }
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_blank_or_na(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.eq_ignore_ascii_case(NOT_APPLICABLE)
}

/// Trimmed text of a scalar; missing and null become ""
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn nan() -> Value {
    Value::String(NAN_SENTINEL.to_string())
}

fn coerce(value: &Value, kind: Numeric) -> Value {
    match value {
        Value::Number(n) => match kind {
            Numeric::Int => {
                if n.is_i64() || n.is_u64() {
                    value.clone()
                } else {
                    n.as_f64()
                        .filter(|f| f.is_finite())
                        .map(|f| Value::from(f.trunc() as i64))
                        .unwrap_or_else(nan)
                }
            }
            Numeric::Float => n.as_f64().map(float_value).unwrap_or_else(nan),
        },
        Value::String(s) => coerce_text(s.trim(), kind),
        Value::Bool(true) => match kind {
            Numeric::Int => Value::from(1),
            Numeric::Float => float_value(1.0),
        },
        _ => nan(),
    }
}

/// Parse a numeric field's text, "NaN" when it does not parse.
///
/// Integer fields drop thousands separators first, so `"1,234"` reads as
/// 1234 rather than failing. Float fields take the text as is.
fn coerce_text(text: &str, kind: Numeric) -> Value {
    if text == NAN_SENTINEL {
        return nan();
    }
    match kind {
        Numeric::Int => text
            .replace(',', "")
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| nan()),
        Numeric::Float => text
            .parse::<f64>()
            .ok()
            .map(float_value)
            .unwrap_or_else(nan),
    }
}

/// Finite floats become numbers; inf/NaN cannot be stored in JSON
fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or_else(nan)
}
