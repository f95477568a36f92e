//! Land-use regulation (getLandUseAttr) normalization and classification
//!
//! Entries are sorted into usage *areas* (용도지역) and usage *districts*
//! (용도지구). Two strategies exist because the upstream's consumers have
//! disagreed on which entries count:
//!
//! - [`UsageStrategy::Keyword`] classifies every entry by keyword.
//! - [`UsageStrategy::IncludedOnly`] first drops entries whose inclusion flag
//!   is not "included" (포함), i.e. abutting (접합) or conflicting (저촉).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Normalized, VworldResponse};
use crate::error::LookupError;
use crate::lenient::{self, first_non_empty, Items};

/// Code-name keyword for district designations
pub const DISTRICT_CODE_KEYWORD: &str = "용도지구";

/// Display-name keyword for district designations
pub const DISTRICT_NAME_KEYWORD: &str = "지구";

/// Code-name keyword for area designations
pub const AREA_CODE_KEYWORD: &str = "용도지역";

/// Display-name keyword for area designations
pub const AREA_NAME_KEYWORD: &str = "지역";

/// Regulation code prefixes: UQA.. are areas, UQB.. are districts
const AREA_CODE_PREFIX: &str = "UQA";
const DISTRICT_CODE_PREFIX: &str = "UQB";

/// Inclusion flag value meaning the parcel lies inside the designation
const INCLUDED_FLAG: &str = "1";
const INCLUDED_NAME: &str = "포함";

/// Normalized usage record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageRecord {
    pub usage_areas: Vec<String>,
    pub usage_districts: Vec<String>,
}

impl UsageRecord {
    fn push_unique(list: &mut Vec<String>, name: &str) {
        if !list.iter().any(|existing| existing == name) {
            list.push(name.to_string());
        }
    }
}

/// How usage entries are filtered before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageStrategy {
    /// Keyword classification of every entry
    #[default]
    Keyword,
    /// Keyword classification of entries flagged "included" only
    IncludedOnly,
}

impl fmt::Display for UsageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageStrategy::Keyword => write!(f, "keyword"),
            UsageStrategy::IncludedOnly => write!(f, "included-only"),
        }
    }
}

impl FromStr for UsageStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(UsageStrategy::Keyword),
            "included-only" | "included_only" | "included" => Ok(UsageStrategy::IncludedOnly),
            other => Err(format!(
                "Unknown usage strategy '{}'. Must be 'keyword' or 'included-only'",
                other
            )),
        }
    }
}

/// Classification of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageClass {
    Area,
    District,
    Other,
}

/// One land-use regulation entry, reduced to what classification needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageEntry {
    pub name: String,
    pub code_name: String,
    pub code: String,
    pub inclusion_code: String,
    pub inclusion_name: String,
}

impl UsageEntry {
    pub fn new(name: impl Into<String>, code_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code_name: code_name.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_inclusion(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.inclusion_code = code.into();
        self.inclusion_name = name.into();
        self
    }

    pub fn classify(&self) -> UsageClass {
        if self.code_name.contains(DISTRICT_CODE_KEYWORD)
            || self.name.contains(DISTRICT_NAME_KEYWORD)
        {
            UsageClass::District
        } else if self.code_name.contains(AREA_CODE_KEYWORD)
            || self.name.contains(AREA_NAME_KEYWORD)
        {
            UsageClass::Area
        } else if self.code.starts_with(DISTRICT_CODE_PREFIX) {
            UsageClass::District
        } else if self.code.starts_with(AREA_CODE_PREFIX) {
            UsageClass::Area
        } else {
            UsageClass::Other
        }
    }

    /// Whether the parcel lies inside the designation (not abutting or conflicting)
    pub fn is_included(&self) -> bool {
        self.inclusion_code.trim() == INCLUDED_FLAG || self.inclusion_name.contains(INCLUDED_NAME)
    }
}

/// Classify entries into de-duplicated, insertion-ordered lists.
pub fn classify_usage(entries: &[UsageEntry], strategy: UsageStrategy) -> UsageRecord {
    let mut record = UsageRecord::default();

    for entry in entries {
        if entry.name.is_empty() {
            continue;
        }
        if strategy == UsageStrategy::IncludedOnly && !entry.is_included() {
            continue;
        }
        match entry.classify() {
            UsageClass::District => UsageRecord::push_unique(&mut record.usage_districts, &entry.name),
            UsageClass::Area | UsageClass::Other => {
                UsageRecord::push_unique(&mut record.usage_areas, &entry.name)
            }
        }
    }

    record
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct UsageItem {
    #[serde(rename = "prposAreaDstrcNm", deserialize_with = "lenient::string")]
    name: String,
    #[serde(deserialize_with = "lenient::string")]
    uname: String,
    #[serde(rename = "prposAreaDstrcCodeNm", deserialize_with = "lenient::string")]
    code_name: String,
    #[serde(rename = "prposAreaDstrcCode", deserialize_with = "lenient::string")]
    code: String,
    #[serde(rename = "cnflcAt", deserialize_with = "lenient::string")]
    inclusion_code: String,
    #[serde(rename = "cnflcAtNm", deserialize_with = "lenient::string")]
    inclusion_name: String,
}

impl UsageItem {
    /// Entry for the `landUses` and `landUseAttrVOList` shapes
    fn to_listing_entry(&self) -> UsageEntry {
        UsageEntry {
            name: first_non_empty(&[&self.name, &self.uname]).to_string(),
            code_name: first_non_empty(&[&self.code_name, &self.inclusion_name]).to_string(),
            code: self.code.clone(),
            inclusion_code: self.inclusion_code.clone(),
            inclusion_name: self.inclusion_name.clone(),
        }
    }

    /// Entry for the generic `response` shape, which carries no `uname`
    fn to_response_entry(&self) -> UsageEntry {
        UsageEntry {
            name: self.name.clone(),
            code_name: self.code_name.clone(),
            code: self.code.clone(),
            inclusion_code: self.inclusion_code.clone(),
            inclusion_name: self.inclusion_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsageEnvelope {
    LandUses {
        #[serde(rename = "landUses")]
        body: LandUsesBody,
    },
    AttrList {
        #[serde(rename = "landUseAttrVOList")]
        items: Items<UsageItem>,
    },
    Response {
        response: VworldResponse<UsageResult>,
    },
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct LandUsesBody {
    #[serde(default, rename = "landUse", alias = "field")]
    items: Items<UsageItem>,
}

#[derive(Debug, Default, Deserialize)]
struct UsageResult {
    #[serde(default)]
    items: Items<UsageItem>,
}

/// Extract classification entries from a `getLandUseAttr` payload.
pub fn usage_entries(raw: &Value) -> Result<Normalized<Vec<UsageEntry>>, LookupError> {
    let envelope = UsageEnvelope::deserialize(raw)
        .unwrap_or_else(|_| UsageEnvelope::Unrecognized(raw.clone()));

    let entries = match envelope {
        UsageEnvelope::LandUses { body } => body
            .items
            .into_vec()
            .iter()
            .map(UsageItem::to_listing_entry)
            .collect(),
        UsageEnvelope::AttrList { items } => items
            .into_vec()
            .iter()
            .map(UsageItem::to_listing_entry)
            .collect(),
        UsageEnvelope::Response { response } => response
            .into_result(raw)?
            .unwrap_or_default()
            .items
            .into_vec()
            .iter()
            .map(UsageItem::to_response_entry)
            .collect(),
        UsageEnvelope::Unrecognized(raw) => return Ok(Normalized::Unrecognized(raw)),
    };

    Ok(Normalized::Found(entries))
}

/// Normalize a `getLandUseAttr` payload with the given strategy.
///
/// A recognized shape always yields a record, possibly with empty lists.
pub fn normalize_land_usage(
    raw: &Value,
    strategy: UsageStrategy,
) -> Result<Normalized<UsageRecord>, LookupError> {
    let entries = usage_entries(raw)?;
    if entries.is_unrecognized() {
        tracing::warn!("Unrecognized land use envelope");
    }
    Ok(entries.map(|entries| classify_usage(&entries, strategy)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn land_uses() -> Value {
        json!({
            "landUses": {
                "field": [
                    {"prposAreaDstrcNm": "제2종일반주거지역", "prposAreaDstrcCodeNm": "용도지역", "cnflcAt": "1", "cnflcAtNm": "포함"},
                    {"prposAreaDstrcNm": "대공방어협조구역", "prposAreaDstrcCodeNm": "", "cnflcAt": "1", "cnflcAtNm": "포함"},
                    {"prposAreaDstrcNm": "제1종지구단위계획구역", "prposAreaDstrcCodeNm": "", "cnflcAt": "2", "cnflcAtNm": "저촉"},
                    {"prposAreaDstrcNm": "중요시설물보호지구", "prposAreaDstrcCodeNm": "용도지구", "cnflcAt": "3", "cnflcAtNm": "접합"},
                    {"prposAreaDstrcNm": "제2종일반주거지역", "prposAreaDstrcCodeNm": "용도지역", "cnflcAt": "1", "cnflcAtNm": "포함"},
                    {"prposAreaDstrcNm": "", "prposAreaDstrcCodeNm": "용도지역"}
                ]
            }
        })
    }

    #[test]
    fn test_keyword_strategy() {
        let record = normalize_land_usage(&land_uses(), UsageStrategy::Keyword)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(
            record,
            UsageRecord {
                usage_areas: vec![
                    "제2종일반주거지역".to_string(),
                    "대공방어협조구역".to_string(),
                ],
                usage_districts: vec![
                    "제1종지구단위계획구역".to_string(),
                    "중요시설물보호지구".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_included_only_strategy() {
        let record = normalize_land_usage(&land_uses(), UsageStrategy::IncludedOnly)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(
            record,
            UsageRecord {
                usage_areas: vec![
                    "제2종일반주거지역".to_string(),
                    "대공방어협조구역".to_string(),
                ],
                usage_districts: vec![],
            }
        );
    }

    #[test]
    fn test_attr_list_uses_uname_fallback() {
        let raw = json!({
            "landUseAttrVOList": {"uname": "자연녹지지역", "prposAreaDstrcCode": "UQA430"}
        });
        let record = normalize_land_usage(&raw, UsageStrategy::Keyword)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(record.usage_areas, vec!["자연녹지지역".to_string()]);
    }

    #[test]
    fn test_response_shape_classifies_by_display_name() {
        let raw = json!({
            "response": {
                "status": "OK",
                "result": {"items": [
                    {"prposAreaDstrcNm": "방화지구", "prposAreaDstrcCodeNm": "용도지구", "prposAreaDstrcCode": "UQB220"},
                    {"prposAreaDstrcNm": "일반상업지역", "prposAreaDstrcCode": "UQA220"},
                    {"prposAreaDstrcCodeNm": "용도지역", "prposAreaDstrcCode": "UQA100"}
                ]}
            }
        });
        let record = normalize_land_usage(&raw, UsageStrategy::Keyword)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(record.usage_districts, vec!["방화지구".to_string()]);
        assert_eq!(record.usage_areas, vec!["일반상업지역".to_string()]);
    }

    #[test]
    fn test_nameless_entry_is_dropped() {
        let raw = json!({
            "landUses": {"landUse": [{"prposAreaDstrcNm": "", "prposAreaDstrcCodeNm": "용도지역"}]}
        });
        let record = normalize_land_usage(&raw, UsageStrategy::Keyword)
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(record, UsageRecord::default());
    }

    #[test]
    fn test_code_prefix_heuristic() {
        let entry = UsageEntry::new("고도제한", "").with_code("UQB500");
        assert_eq!(entry.classify(), UsageClass::District);
        let entry = UsageEntry::new("개발제한", "").with_code("UQA999");
        assert_eq!(entry.classify(), UsageClass::Area);
        let entry = UsageEntry::new("가축사육제한구역", "");
        assert_eq!(entry.classify(), UsageClass::Other);
    }

    #[test]
    fn test_rejected_response() {
        let raw = json!({"response": {"status": "ERROR", "error": {"text": "INVALID_RANGE"}}});
        let err = normalize_land_usage(&raw, UsageStrategy::Keyword).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_unrecognized() {
        let raw = json!({"landUse": []});
        assert!(normalize_land_usage(&raw, UsageStrategy::Keyword)
            .unwrap()
            .is_unrecognized());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("keyword".parse::<UsageStrategy>(), Ok(UsageStrategy::Keyword));
        assert_eq!(
            "included-only".parse::<UsageStrategy>(),
            Ok(UsageStrategy::IncludedOnly)
        );
        assert!("merge".parse::<UsageStrategy>().is_err());
        assert_eq!(UsageStrategy::IncludedOnly.to_string(), "included-only");
    }
}
