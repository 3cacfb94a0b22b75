//! Property store attached to every node and link.
//!
//! Values come straight from the editor's property dialogs, so they are
//! loosely typed: a port may arrive as `"6633"`, `6633` or `""`. Every reader
//! here fails soft and returns `None` rather than an error; the mapper layer
//! turns `None` into a documented default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Keys derived from a node's identity. Paste never copies them.
pub const IDENTITY_KEYS: &[&str] = &["name", "display_name"];

/// A single user-entered property value.
///
/// Anything that is not a scalar (nulls, the core dialogs' configuration
/// tables) is kept verbatim in `Other` so it survives a save, but reads as
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
    Other(serde_json::Value),
}

impl PropertyValue {
    /// Textual form, trimmed. Numbers print without a trailing `.0`.
    pub fn as_text(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Number(n) => n.to_string(),
            PropertyValue::String(s) => s.trim().to_string(),
            PropertyValue::Other(_) => String::new(),
        }
    }

    /// Numeric form. Strings are parsed; booleans are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) if n.is_finite() => Some(*n),
            PropertyValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Boolean form.
    ///
    /// Accepts `true/1/yes/on` and `false/0/no/off` in any case, plus real
    /// booleans and the numbers 0 and 1.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::Number(n) if *n == 1.0 => Some(true),
            PropertyValue::Number(n) if *n == 0.0 => Some(false),
            PropertyValue::Number(_) => None,
            PropertyValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            PropertyValue::Other(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Ordered key/value bag. Iteration order is by key so that anything derived
/// from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    values: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.values.iter()
    }

    /// Trimmed, non-empty text for `key`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(PropertyValue::as_text)
            .filter(|s| !s.is_empty())
    }

    /// First non-empty text among `keys`, in order.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Text for `key`, or `default` when absent or blank.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PropertyValue::as_number)
    }

    /// First parseable number among `keys`. A key holding garbage is skipped
    /// rather than ending the search.
    pub fn first_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.number(key))
    }

    /// Integer value; fractional numbers are rejected rather than truncated.
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.number(key)
            .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            .map(|n| n as i64)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropertyValue::as_flag)
    }

    /// Copy of this bag without the identity-derived keys.
    pub fn without_identity(&self) -> Properties {
        let values = self
            .values
            .iter()
            .filter(|(k, _)| !IDENTITY_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Properties { values }
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_trims_and_skips_blank() {
        let props: Properties = [("a", "  x  "), ("b", "   ")].into_iter().collect();
        assert_eq!(props.text("a"), Some("x".to_string()));
        assert_eq!(props.text("b"), None);
        assert_eq!(props.text("missing"), None);
        assert_eq!(props.first_text(&["b", "a"]), Some("x".to_string()));
    }

    #[test]
    fn test_number_parses_strings_and_fails_soft() {
        let mut props = Properties::new();
        props.set("port", "6653");
        props.set("cpu", 0.5);
        props.set("junk", "12abc");
        props.set("flag", true);
        assert_eq!(props.number("port"), Some(6653.0));
        assert_eq!(props.number("cpu"), Some(0.5));
        assert_eq!(props.number("junk"), None);
        assert_eq!(props.number("flag"), None);
        assert_eq!(props.integer("port"), Some(6653));
        assert_eq!(props.integer("cpu"), None);
        assert_eq!(props.first_number(&["junk", "port"]), Some(6653.0));
    }

    #[test]
    fn test_flag_values() {
        let mut props = Properties::new();
        for (key, value, expected) in [
            ("a", "true", Some(true)),
            ("b", "YES", Some(true)),
            ("c", "on", Some(true)),
            ("d", "False", Some(false)),
            ("e", "0", Some(false)),
            ("f", "maybe", None),
        ] {
            props.set(key, value);
            assert_eq!(props.flag(key), expected, "key {}", key);
        }
        props.set("g", false);
        assert_eq!(props.flag("g"), Some(false));
    }

    #[test]
    fn test_without_identity() {
        let props: Properties = [("name", "UE1"), ("display_name", "UE1"), ("UE_Power", "15")]
            .into_iter()
            .collect();
        let stripped = props.without_identity();
        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains("UE_Power"));
    }

    #[test]
    fn test_untagged_deserialization() {
        let json = r#"{"a": "text", "b": 3, "c": true}"#;
        let props: Properties = serde_json::from_str(json).unwrap();
        assert_eq!(props.get("a"), Some(&PropertyValue::String("text".into())));
        assert_eq!(props.get("b"), Some(&PropertyValue::Number(3.0)));
        assert_eq!(props.get("c"), Some(&PropertyValue::Bool(true)));
    }

    #[test]
    fn test_null_and_table_values_read_as_absent() {
        let json = r#"{"AP_SSID": null, "AMF_configs": [{"name": "amf1"}], "VGCore_Component": "amf"}"#;
        let props: Properties = serde_json::from_str(json).unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props.text("AP_SSID"), None);
        assert_eq!(props.number("AMF_configs"), None);
        assert_eq!(props.flag("AMF_configs"), None);
        assert_eq!(props.first_text(&["AP_SSID", "VGCore_Component"]), Some("amf".to_string()));

        let saved = serde_json::to_string(&props).unwrap();
        let reloaded: Properties = serde_json::from_str(&saved).unwrap();
        assert_eq!(reloaded, props);
        assert_eq!(
            reloaded.get("AMF_configs"),
            Some(&PropertyValue::Other(serde_json::json!([{"name": "amf1"}])))
        );
    }
}
