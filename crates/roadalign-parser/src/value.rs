use indexmap::IndexMap;
use roadalign_core::Point;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Neutral nested document used for alignment input and output.
///
/// Maps keep insertion order so that serialised output follows the order the
/// writer chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Seq(Vec<Value>),
    Map(IndexMap<String, Value>),
}

/// Textual marker written for an infinite radius.
pub const INFINITY_MARKER: &str = "INF";

impl Value {
    #[must_use]
    pub fn map() -> Self {
        Value::Map(IndexMap::new())
    }

    /// A number, with infinities written as [`INFINITY_MARKER`] so the value stays
    /// representable in JSON.
    #[must_use]
    pub fn number(n: f64) -> Self {
        if n.is_infinite() {
            let marker = if n > 0.0 {
                INFINITY_MARKER.to_string()
            } else {
                format!("-{INFINITY_MARKER}")
            };
            Value::String(marker)
        } else {
            Value::Number(n)
        }
    }

    #[must_use]
    pub fn point(p: Point) -> Self {
        Value::Seq(vec![Value::Number(p.x), Value::Number(p.y)])
    }

    #[must_use]
    pub fn optional_number(n: Option<f64>) -> Self {
        n.map_or(Value::Null, Value::number)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up `key` in a map. Explicit nulls read as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key).filter(|v| !v.is_null())
    }

    /// Insert into a map value; a no-op on anything else.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        if let Value::Map(m) = self {
            m.insert(key.into(), value);
        }
    }

    /// Parse a document that is either JSON or YAML.
    pub fn from_document_str(text: &str) -> Result<Self, Error> {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Self::try_from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, Error> {
        let v: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        Self::try_from_yaml_value(&v)
    }

    fn try_from_yaml_value(v: &serde_yaml::Value) -> Result<Self, Error> {
        Ok(match v {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(*b),
            serde_yaml::Value::Number(n) => Value::Number(
                n.as_f64()
                    .or_else(|| n.as_i64().map(|i| i as f64))
                    .or_else(|| n.as_u64().map(|u| u as f64))
                    .ok_or(Error::YamlNumber)?,
            ),
            serde_yaml::Value::String(s) => Value::String(s.clone()),
            serde_yaml::Value::Sequence(seq) => Value::Seq(
                seq.iter()
                    .map(Self::try_from_yaml_value)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut out = IndexMap::new();
                for (k, vv) in map {
                    let serde_yaml::Value::String(key) = k else {
                        return Err(Error::NonStringKey);
                    };
                    out.insert(key.clone(), Self::try_from_yaml_value(vv)?);
                }
                Value::Map(out)
            }
            serde_yaml::Value::Tagged(_) => return Err(Error::UnsupportedYamlValue),
        })
    }

    pub fn try_from_json_str(s: &str) -> Result<Self, Error> {
        let v: serde_json::Value =
            serde_json::from_str(s).map_err(|e| Error::Json(e.to_string()))?;
        Ok(Self::from_json_value(&v))
    }

    #[must_use]
    pub fn from_json_value(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(a) => {
                Value::Seq(a.iter().map(Self::from_json_value).collect())
            }
            serde_json::Value::Object(o) => Value::Map(
                o.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json_value(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json_string_pretty(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Json(e.to_string()))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Point> for Value {
    fn from(p: Point) -> Self {
        Value::point(p)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Map(m)
    }
}
