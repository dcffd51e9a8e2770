use indexmap::IndexMap;
use roadalign_core::Point;

use crate::error::Error;
use crate::value::Value;

/// Magnitudes at or beyond this are read as infinite.
pub const INFINITE_THRESHOLD: f64 = 1e300;

/// Read a number from a document value.
///
/// Accepts plain numbers and numeric strings. `"INF"`, `"inf"` and `"infinity"`
/// (any case, optionally signed) read as infinity.
#[must_use]
pub fn parse_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => *n,
        Value::String(s) => {
            let s = s.trim();
            let (sign, body) = match s.strip_prefix('-') {
                Some(rest) => (-1.0, rest),
                None => (1.0, s.strip_prefix('+').unwrap_or(s)),
            };
            if body.eq_ignore_ascii_case("inf") || body.eq_ignore_ascii_case("infinity") {
                sign * f64::INFINITY
            } else {
                s.parse::<f64>().ok()?
            }
        }
        _ => return None,
    };
    if n.is_nan() {
        return None;
    }
    if n.abs() >= INFINITE_THRESHOLD {
        return Some(n.signum() * f64::INFINITY);
    }
    Some(n)
}

fn parse_point(v: &Value) -> Option<Point> {
    match v {
        Value::Seq(items) if items.len() >= 2 => {
            Some(Point::new(parse_number(&items[0])?, parse_number(&items[1])?))
        }
        Value::Map(m) => Some(Point::new(
            parse_number(m.get("x")?)?,
            parse_number(m.get("y")?)?,
        )),
        Value::String(s) => {
            let mut parts = s
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|p| !p.is_empty());
            let x = parts.next()?.parse::<f64>().ok()?;
            let y = parts.next()?.parse::<f64>().ok()?;
            Some(Point::new(x, y))
        }
        _ => None,
    }
}

/// Typed view over one map of a document.
///
/// Absent keys and explicit nulls yield `Ok(None)`; present keys of the wrong
/// shape are errors.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a IndexMap<String, Value>,
    context: &'a str,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value, context: &'a str) -> Result<Self, Error> {
        let map = value.as_map().ok_or_else(|| Error::ExpectedMap {
            context: context.to_string(),
        })?;
        Ok(Self { map, context })
    }

    /// The entry under `key`, unless absent or null.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn number(&self, key: &str) -> Result<Option<f64>, Error> {
        self.raw(key)
            .map(|v| {
                parse_number(v).ok_or_else(|| Error::ExpectedNumber {
                    context: self.context.to_string(),
                    key: key.to_string(),
                })
            })
            .transpose()
    }

    pub fn point(&self, key: &str) -> Result<Option<Point>, Error> {
        self.raw(key)
            .map(|v| {
                parse_point(v).ok_or_else(|| Error::ExpectedPoint {
                    context: self.context.to_string(),
                    key: key.to_string(),
                })
            })
            .transpose()
    }

    pub fn string(&self, key: &str) -> Result<Option<&'a str>, Error> {
        self.raw(key)
            .map(|v| {
                v.as_str().ok_or_else(|| Error::ExpectedString {
                    context: self.context.to_string(),
                    key: key.to_string(),
                })
            })
            .transpose()
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>, Error> {
        self.raw(key)
            .map(|v| match v {
                Value::Bool(b) => Ok(*b),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
                _ => Err(Error::ExpectedBool {
                    context: self.context.to_string(),
                    key: key.to_string(),
                }),
            })
            .transpose()
    }

    pub fn seq(&self, key: &str) -> Result<Option<&'a [Value]>, Error> {
        self.raw(key)
            .map(|v| {
                v.as_seq().ok_or_else(|| Error::ExpectedSeq {
                    context: self.context.to_string(),
                    key: key.to_string(),
                })
            })
            .transpose()
    }

    /// A nested map, as its own [`Fields`] view.
    pub fn nested(&self, key: &str) -> Result<Option<Fields<'a>>, Error> {
        self.raw(key)
            .map(|v| Fields::new(v, self.context))
            .transpose()
    }
}
