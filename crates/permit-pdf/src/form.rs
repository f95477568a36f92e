//! Submitted form values

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use typst::foundations::{Dict, Value as TypstValue};

/// Flat field mapping as posted by the page; never validated
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    /// Value for `key`, `""` when absent
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values as Typst `sys.inputs`
    pub fn to_inputs(&self) -> Dict {
        let mut dict = Dict::new();
        for (key, value) in &self.0 {
            dict.insert(key.as_str().into(), TypstValue::Str(value.as_str().into()));
        }
        dict
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();
        FormData(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_values_are_stringified() {
        let form: FormData = serde_json::from_value(json!({
            "seller_name": "홍길동",
            "land1_area": 330.5,
            "app_year": 2024,
            "buyer_name": null,
            "flag": true
        }))
        .unwrap();

        assert_eq!(form.get("seller_name"), "홍길동");
        assert_eq!(form.get("land1_area"), "330.5");
        assert_eq!(form.get("app_year"), "2024");
        assert_eq!(form.get("buyer_name"), "");
        assert_eq!(form.get("flag"), "true");
        assert_eq!(form.get("missing"), "");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_value::<FormData>(json!(["a"])).is_err());
    }

    #[test]
    fn test_inputs_dict() {
        let form = FormData::new().with("use_purpose", "주거용");
        let inputs = form.to_inputs();
        assert!(inputs.contains("use_purpose"));
    }
}
