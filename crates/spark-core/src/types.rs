// File: crates/spark-core/src/types.rs
// Summary: Shared value model (normalized series tokens) and host-facing constants.

use std::fmt;

/// Pixels per `em` when a dimension is given in em units and the host supplies no font metrics.
pub const DEFAULT_EM_PX: f64 = 16.0;
/// Line height used for `height: auto` when the host supplies none.
pub const DEFAULT_LINE_HEIGHT: f64 = 16.0;

/// One normalized series token.
///
/// `List` carries an `(x, y)` pair for line charts or a stack for bar charts.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Null and undefined both mean "no data at this position".
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Numeric view of the token; booleans count as 1/0, text only when fully numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Key used for exact lookups in value tables.
    pub fn to_key(&self) -> String {
        match self {
            Value::Number(n) => number_to_string(*n),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(n as f64) }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self { n.map_or(Value::Null, Value::Number) }
}

impl From<(f64, f64)> for Value {
    fn from((x, y): (f64, f64)) -> Self { Value::List(vec![Value::Number(x), Value::Number(y)]) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { normalize_value(s) }
}

/// Build a value sequence from plain numbers.
pub fn values<I: IntoIterator<Item = f64>>(it: I) -> Vec<Value> {
    it.into_iter().map(Value::Number).collect()
}

/// Normalize one raw token: `null`, `undefined`, `true`, `false`, fully numeric text, else text.
pub fn normalize_value(token: &str) -> Value {
    match token {
        "undefined" => Value::Undefined,
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_number(token) {
            Some(n) => Value::Number(n),
            None => Value::Text(token.to_string()),
        },
    }
}

pub fn normalize_values<'a, I: IntoIterator<Item = &'a str>>(tokens: I) -> Vec<Value> {
    tokens.into_iter().map(normalize_value).collect()
}

/// Strict numeric parse: the whole token must be a number (`Infinity` spelled out).
pub fn parse_number(token: &str) -> Option<f64> {
    let t = token.trim();
    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Shortest round-trip rendering of a number, integers without a fraction.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}
