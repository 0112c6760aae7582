//! Lenient field types for inconsistently encoded API values

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Boolean that the API sends as `true`/`false`, `0`/`1` or a string.
///
/// Anything unrecognized decodes to `false`. Always serializes as a JSON bool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericBool(pub bool);

impl NumericBool {
    pub fn get(self) -> bool {
        self.0
    }
}

impl fmt::Display for NumericBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for NumericBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let value = match raw {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => parse_bool(&s).unwrap_or(false),
            _ => false,
        };
        Ok(Self(value))
    }
}

impl Serialize for NumericBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

/// Spellings the backend uses for boolean strings.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// String that sometimes arrives as a one-element array of strings.
///
/// Takes the first element of an array, `""` for an empty array or any
/// other shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexibleString(pub String);

impl FlexibleString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlexibleString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FlexibleString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let value = match raw {
            Value::String(s) => s,
            Value::Array(items) => {
                // a mixed array is treated like any other unexpected shape
                let strings: Option<Vec<String>> = items
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                strings
                    .and_then(|mut s| if s.is_empty() { None } else { Some(s.swap_remove(0)) })
                    .unwrap_or_default()
            }
            _ => String::new(),
        };
        Ok(Self(value))
    }
}

impl Serialize for FlexibleString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flag(value: Value) -> bool {
        serde_json::from_value::<NumericBool>(value).unwrap().get()
    }

    fn text(value: Value) -> String {
        serde_json::from_value::<FlexibleString>(value).unwrap().0
    }

    #[test]
    fn numeric_bool_truthy_encodings() {
        assert!(flag(json!(true)));
        assert!(flag(json!(1)));
        assert!(flag(json!(1.0)));
        assert!(flag(json!(-3)));
        assert!(flag(json!("true")));
        assert!(flag(json!("1")));
        assert!(flag(json!("T")));
    }

    #[test]
    fn numeric_bool_degrades_to_false() {
        assert!(!flag(json!(false)));
        assert!(!flag(json!(0)));
        assert!(!flag(json!(0.0)));
        assert!(!flag(json!("false")));
        assert!(!flag(json!(null)));
        assert!(!flag(json!("garbage")));
        assert!(!flag(json!({"enabled": true})));
        assert!(!flag(json!([1])));
    }

    #[test]
    fn numeric_bool_serializes_as_bool() {
        assert_eq!(serde_json::to_value(NumericBool(true)).unwrap(), json!(true));
        let decoded: NumericBool = serde_json::from_value(json!(1)).unwrap();
        assert_eq!(serde_json::to_string(&decoded).unwrap(), "true");
    }

    #[test]
    fn flexible_string_accepts_string_or_array() {
        assert_eq!(text(json!("abc")), "abc");
        assert_eq!(text(json!(["abc", "def"])), "abc");
        assert_eq!(text(json!([])), "");
        assert_eq!(text(json!(null)), "");
        assert_eq!(text(json!(42)), "");
        assert_eq!(text(json!([1, "a"])), "");
    }

    #[test]
    fn flexible_string_serializes_as_string() {
        let decoded: FlexibleString = serde_json::from_value(json!(["10.0.0.1"])).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), json!("10.0.0.1"));
    }

    #[test]
    fn adapters_inside_struct_fields() {
        #[derive(Deserialize)]
        struct Ns {
            #[serde(default)]
            ip1: FlexibleString,
            #[serde(default)]
            enabled: NumericBool,
        }

        let ns: Ns = serde_json::from_value(json!({"ip1": ["1.2.3.4"], "enabled": 1})).unwrap();
        assert_eq!(ns.ip1.as_str(), "1.2.3.4");
        assert!(ns.enabled.get());

        let ns: Ns = serde_json::from_value(json!({})).unwrap();
        assert_eq!(ns.ip1.as_str(), "");
        assert!(!ns.enabled.get());
    }
}
