//! Runtime values handed to the encoder.
//!
//! `RuntimeValue` is the closed tagged union of everything a computation can
//! return. Its JSON form is adjacently tagged:
//!
//! ```json
//! {"type": "sequence", "value": {"kind": "list", "items": [
//!     {"type": "int", "value": 1},
//!     {"type": "real", "value": 2.5}
//! ]}}
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::symbolic::{Expr, Matrix, Symbolic};

/// Flavour of a native sequence. Both encode identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    #[default]
    List,
    Tuple,
}

/// Hashable mapping keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MapKey {
    Text(String),
    Int(i64),
    Bool(bool),
    /// A symbol used as a key; stringifies to its name.
    Symbol(String),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Text(s) | MapKey::Symbol(s) => f.write_str(s),
            MapKey::Int(n) => write!(f, "{n}"),
            MapKey::Bool(b) => f.write_str(bool_text(*b)),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::Text(s.to_string())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        MapKey::Text(s)
    }
}

impl From<i64> for MapKey {
    fn from(n: i64) -> Self {
        MapKey::Int(n)
    }
}

/// Wire spelling of a boolean.
pub fn bool_text(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

/// An insertion-ordered mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<MapKey, RuntimeValue>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A re-inserted key keeps its original position.
    pub fn insert(&mut self, key: impl Into<MapKey>, value: RuntimeValue) -> Option<RuntimeValue> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &MapKey) -> Option<&RuntimeValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, MapKey, RuntimeValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, MapKey, RuntimeValue> {
        self.entries.keys()
    }

    /// Entries of `self` whose keys do not appear in `other`, in `self`'s order.
    pub fn difference(&self, other: &Mapping) -> Mapping {
        self.iter()
            .filter(|(key, _)| !other.contains_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl FromIterator<(MapKey, RuntimeValue)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (MapKey, RuntimeValue)>>(iter: T) -> Self {
        Mapping {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a MapKey, &'a RuntimeValue);
    type IntoIter = indexmap::map::Iter<'a, MapKey, RuntimeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// JSON objects cannot carry typed keys, so a mapping travels as a list of
// `[key, value]` pairs.
impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.entries.iter())
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs: Vec<(MapKey, RuntimeValue)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// A dynamically-typed runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RuntimeValue {
    Bool(bool),

    /// "No result"; encoded through the symbolic path.
    Absent,

    Symbolic(Symbolic),

    Sequence {
        #[serde(default)]
        kind: SequenceKind,
        items: Vec<RuntimeValue>,
    },

    Int(i64),

    Real(f64),

    Complex { re: f64, im: f64 },

    Text(String),

    Mapping(Mapping),

    /// A value of a type the engine cannot export (a file handle, a closure).
    Opaque { type_name: String },
}

impl RuntimeValue {
    pub fn list(items: Vec<RuntimeValue>) -> Self {
        RuntimeValue::Sequence {
            kind: SequenceKind::List,
            items,
        }
    }

    pub fn tuple(items: Vec<RuntimeValue>) -> Self {
        RuntimeValue::Sequence {
            kind: SequenceKind::Tuple,
            items,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        RuntimeValue::Text(s.into())
    }

    pub fn expr(expr: Expr) -> Self {
        RuntimeValue::Symbolic(Symbolic::Expr(expr))
    }

    pub fn matrix(matrix: Matrix) -> Self {
        RuntimeValue::Symbolic(Symbolic::Matrix(matrix))
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        RuntimeValue::Opaque {
            type_name: type_name.into(),
        }
    }

    /// Parse the adjacently-tagged JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Runtime type name, as reported in `UnsupportedType` failures.
    pub fn type_name(&self) -> &str {
        match self {
            RuntimeValue::Bool(_) => "bool",
            RuntimeValue::Absent => "NoneType",
            RuntimeValue::Symbolic(symbolic) => symbolic.type_name(),
            RuntimeValue::Sequence {
                kind: SequenceKind::List,
                ..
            } => "list",
            RuntimeValue::Sequence {
                kind: SequenceKind::Tuple,
                ..
            } => "tuple",
            RuntimeValue::Int(_) => "int",
            RuntimeValue::Real(_) => "float",
            RuntimeValue::Complex { .. } => "complex",
            RuntimeValue::Text(_) => "str",
            RuntimeValue::Mapping(_) => "dict",
            RuntimeValue::Opaque { type_name } => type_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_key_display() {
        assert_eq!(MapKey::from("x").to_string(), "x");
        assert_eq!(MapKey::Int(-3).to_string(), "-3");
        assert_eq!(MapKey::Bool(true).to_string(), "True");
        assert_eq!(MapKey::Symbol("alpha".into()).to_string(), "alpha");
    }

    #[test]
    fn test_mapping_keeps_insertion_order() {
        let mut m = Mapping::new();
        m.insert("b", RuntimeValue::Int(2));
        m.insert("a", RuntimeValue::Int(1));
        m.insert("b", RuntimeValue::Int(3));
        let keys: Vec<String> = m.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(m.get(&"b".into()), Some(&RuntimeValue::Int(3)));
    }

    #[test]
    fn test_mapping_difference() {
        let mut after = Mapping::new();
        after.insert("x", RuntimeValue::Int(1));
        after.insert("y", RuntimeValue::Int(2));
        after.insert("z", RuntimeValue::Int(3));
        let mut before = Mapping::new();
        before.insert("y", RuntimeValue::Int(0));

        let fresh = after.difference(&before);
        let keys: Vec<String> = fresh.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["x", "z"]);
        assert!(before.difference(&after).is_empty());
    }

    #[test]
    fn test_value_json_round_trip() {
        let mut m = Mapping::new();
        m.insert("b", RuntimeValue::list(vec![RuntimeValue::Real(2.5)]));
        m.insert(7_i64, RuntimeValue::Absent);
        let value = RuntimeValue::Mapping(m);

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(RuntimeValue::from_json(&json).unwrap(), value);
    }

    #[test]
    fn test_sequence_kind_defaults_to_list() {
        let json = r#"{"type":"sequence","value":{"items":[{"type":"bool","value":true}]}}"#;
        let value = RuntimeValue::from_json(json).unwrap();
        assert_eq!(value, RuntimeValue::list(vec![RuntimeValue::Bool(true)]));
        assert_eq!(value.type_name(), "list");
    }
}
