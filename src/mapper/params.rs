//! Ordered emulator parameter lists.
//!
//! A `ParameterSet` says *what* applies to a node or link; turning it into
//! Python keyword arguments is the exporter's business.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// List of strings, e.g. `devices=["/dev/net/tun"]`.
    List(Vec<String>),
    /// Container environment, kept in insertion order.
    Env(#[serde(serialize_with = "serialize_pairs")] Vec<(String, String)>),
    /// Bare identifier resolved by the emulator script (`OVSKernelAP`,
    /// `NETWORK_MODE`).
    Symbol(String),
}

#[allow(clippy::ptr_arg)]
fn serialize_pairs<S: Serializer>(pairs: &Vec<(String, String)>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

impl ParamValue {
    pub fn str(value: impl Into<String>) -> Self {
        ParamValue::Str(value.into())
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        ParamValue::Symbol(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) | ParamValue::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

/// One `name=value` assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

/// Parameters in emission order. Setting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: Vec<Param>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: ParamValue) {
        match self.params.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.params.push(Param { name: name.to_string(), value }),
        }
    }

    /// Set only when `value` is present.
    pub fn set_opt(&mut self, name: &str, value: Option<ParamValue>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Append every parameter of `other`, replacing clashes.
    pub fn extend(&mut self, other: ParameterSet) {
        for param in other.params {
            self.set(&param.name, param.value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
