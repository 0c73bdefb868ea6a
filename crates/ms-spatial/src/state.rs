//! Cell attribute values.
//!
//! A cell's attributes are an ordered `name → Value` map.  The "current" and
//! "past" states of a cell are two instances of the same [`CellState`] type;
//! `synchronize` takes an explicit value copy from one to the other.

use std::collections::BTreeMap;
use std::fmt;

// ── Value ─────────────────────────────────────────────────────────────────────

/// A single cell attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

// ── CellState ─────────────────────────────────────────────────────────────────

/// The attribute block of a cell (or of a whole space).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellState {
    attrs: BTreeMap<String, Value>,
}

impl CellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Set `name`, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attrs.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attrs.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    #[inline]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    #[inline]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[inline]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy the named attributes from `source`.  A name absent from `source`
    /// is removed here too, so the copy is exact for every listed name.
    pub fn copy_selected(&mut self, source: &CellState, names: &[&str]) {
        for &name in names {
            match source.get(name) {
                Some(v) => {
                    self.attrs.insert(name.to_owned(), v.clone());
                }
                None => {
                    self.attrs.remove(name);
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CellState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ── SyncScope ─────────────────────────────────────────────────────────────────

/// Which attributes `synchronize` commits into the past snapshot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SyncScope<'a> {
    /// Every attribute; the past becomes an exact copy of the current state.
    #[default]
    All,
    /// Only the listed attributes.
    Only(&'a [&'a str]),
}
