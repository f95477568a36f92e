//! Forgiving deserializers for upstream payloads
//!
//! The open-data APIs are inconsistent about scalar types (`"7"` vs `7`),
//! about list cardinality (one item is often sent as a bare object) and
//! about empty results (`""`, `null` or a missing key). These helpers let
//! the envelope types stay strict about *which* keys are present while
//! tolerating everything below them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize any scalar into a string; null and containers become `""`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(scalar_to_string).unwrap_or_default())
}

/// Deserialize into `Some(T)` when the value fits, `None` otherwise.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// String form of a JSON scalar
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// First candidate that is not empty, or `""`.
pub fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.trim().is_empty())
        .unwrap_or("")
}

/// A list that upstreams may send as an array, a single object, `""` or `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Items<T>(pub Vec<T>);

impl<T> Items<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    pub fn first(&self) -> Option<&T> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> Default for Items<T> {
    fn default() -> Self {
        Items(Vec::new())
    }
}

impl<'de, T> Deserialize<'de> for Items<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Many(Vec<T>),
            One(T),
            Blank(#[allow(dead_code)] Option<String>),
        }

        Ok(match Repr::<T>::deserialize(deserializer)? {
            Repr::Many(items) => Items(items),
            Repr::One(item) => Items(vec![item]),
            Repr::Blank(_) => Items(Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Row {
        #[serde(default, deserialize_with = "string")]
        lot: String,
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default)]
        rows: Items<Row>,
    }

    fn rows(value: Value) -> Vec<Row> {
        serde_json::from_value::<Holder>(value).unwrap().rows.into_vec()
    }

    #[test]
    fn test_numbers_and_strings_are_interchangeable() {
        let parsed = rows(json!({"rows": [{"lot": 7}, {"lot": "6"}, {"lot": null}]}));
        assert_eq!(
            parsed,
            vec![
                Row { lot: "7".into() },
                Row { lot: "6".into() },
                Row { lot: "".into() }
            ]
        );
    }

    #[test]
    fn test_single_object_becomes_one_item() {
        let parsed = rows(json!({"rows": {"lot": "12"}}));
        assert_eq!(parsed, vec![Row { lot: "12".into() }]);
    }

    #[test]
    fn test_blank_forms_are_empty() {
        assert!(rows(json!({"rows": ""})).is_empty());
        assert!(rows(json!({"rows": null})).is_empty());
        assert!(rows(json!({})).is_empty());
    }

    #[test]
    fn test_first_non_empty() {
        assert_eq!(first_non_empty(&["", " ", "05", "08"]), "05");
        assert_eq!(first_non_empty(&["", ""]), "");
    }
}
