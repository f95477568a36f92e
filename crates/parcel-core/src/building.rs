//! Building registry (data.go.kr BldRgstHubService) and VWorld land-share
//! normalization

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Normalized, VworldResponse};
use crate::error::{LookupError, REJECTED_WITHOUT_REASON};
use crate::lenient::{self, first_non_empty, Items};
use crate::unit::UnitQuery;

/// Partition category of an exclusive (private) area
pub const EXCLUSIVE_PARTITION: &str = "전유";

/// Normalized title-registry record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRecord {
    #[serde(rename(deserialize = "bldNm"), deserialize_with = "lenient::string", default)]
    pub name: String,
    #[serde(rename(deserialize = "dongNm"), deserialize_with = "lenient::string", default)]
    pub dong: String,
    #[serde(rename(deserialize = "strctCdNm"), deserialize_with = "lenient::string", default)]
    pub structure: String,
    #[serde(rename(deserialize = "mainPurpsCdNm"), deserialize_with = "lenient::string", default)]
    pub main_purpose: String,
    #[serde(rename(deserialize = "totArea"), deserialize_with = "lenient::string", default)]
    pub total_area: String,
    #[serde(rename(deserialize = "grndFlrCnt"), deserialize_with = "lenient::string", default)]
    pub ground_floor: String,
    #[serde(rename(deserialize = "ugrndFlrCnt"), deserialize_with = "lenient::string", default)]
    pub underground_floor: String,
    #[serde(rename(deserialize = "useAprDay"), deserialize_with = "lenient::string", default)]
    pub use_apr_day: String,
    #[serde(rename(deserialize = "platArea"), deserialize_with = "lenient::string", default)]
    pub plat_area: String,
}

/// Every title record for a lot plus the representative (first) one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildingSummary {
    pub buildings: Vec<BuildingRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_building: Option<BuildingRecord>,
}

impl BuildingSummary {
    pub fn new(buildings: Vec<BuildingRecord>) -> Self {
        let main_building = buildings.first().cloned();
        Self {
            buildings,
            main_building,
        }
    }
}

/// One row of the exclusive/common area registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    #[serde(rename(deserialize = "dongNm"), deserialize_with = "lenient::string", default)]
    pub dong: String,
    #[serde(rename(deserialize = "hoNm"), deserialize_with = "lenient::string", default)]
    pub ho: String,
    #[serde(rename(deserialize = "flrNoNm"), deserialize_with = "lenient::string", default)]
    pub floor: String,
    #[serde(deserialize_with = "lenient::string", default)]
    pub area: String,
    #[serde(rename(deserialize = "exposPubuseGbCdNm"), deserialize_with = "lenient::string", default)]
    pub gb: String,
    #[serde(rename(deserialize = "mainAtchGbCdNm"), deserialize_with = "lenient::string", default)]
    pub main_atch_gb: String,
    #[serde(rename(deserialize = "purpsCdNm"), deserialize_with = "lenient::string", default)]
    pub purps: String,
}

impl UnitEntry {
    pub fn is_exclusive(&self) -> bool {
        self.gb.contains(EXCLUSIVE_PARTITION)
    }
}

/// One row of the VWorld land-share (대지권등록) listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LandShareEntry {
    #[serde(rename = "buldDongNm", deserialize_with = "lenient::string")]
    pub dong: String,
    #[serde(rename = "buldHoNm", deserialize_with = "lenient::string")]
    pub ho: String,
    #[serde(rename = "buldFloorNm", deserialize_with = "lenient::string")]
    pub floor: String,
    #[serde(rename = "ldaQotaRate", deserialize_with = "lenient::string")]
    pub ratio: String,
}

/// Land share split from a `share/land area` ratio string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandShare {
    pub share: String,
    pub land_area: String,
}

impl LandShare {
    /// `"35.9790/36645.30"` → share `35.9790`, land area `36645.30`
    pub fn parse(ratio: &str) -> Self {
        match ratio.split_once('/') {
            Some((share, land_area)) => Self {
                share: share.trim().to_string(),
                land_area: land_area.trim().to_string(),
            },
            None => Self {
                share: ratio.trim().to_string(),
                land_area: String::new(),
            },
        }
    }
}

/// Which upstream produced a matched unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSource {
    Vworld,
    BuildingRegistry,
}

/// A matched unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRecord {
    pub building_name: String,
    pub dong: String,
    pub ho: String,
    pub floor: String,
    pub land_share: String,
    pub land_area: String,
    pub exclusive_area: String,
    pub purpose: String,
    pub structure: String,
    pub total_area: String,
    pub source: UnitSource,
}

impl UnitRecord {
    pub fn from_land_share(entry: &LandShareEntry, title: Option<&BuildingRecord>) -> Self {
        let share = LandShare::parse(&entry.ratio);
        let title = title.cloned().unwrap_or_default();
        Self {
            building_name: title.name,
            dong: entry.dong.clone(),
            ho: entry.ho.clone(),
            floor: entry.floor.clone(),
            land_share: share.share,
            land_area: share.land_area,
            exclusive_area: String::new(),
            purpose: title.main_purpose,
            structure: title.structure,
            total_area: title.total_area,
            source: UnitSource::Vworld,
        }
    }

    pub fn from_exclusive(entry: &UnitEntry, title: Option<&BuildingRecord>) -> Self {
        let title = title.cloned().unwrap_or_default();
        Self {
            building_name: title.name,
            dong: entry.dong.clone(),
            ho: entry.ho.clone(),
            floor: entry.floor.clone(),
            land_share: String::new(),
            land_area: title.plat_area,
            exclusive_area: entry.area.clone(),
            purpose: entry.purps.clone(),
            structure: title.structure,
            total_area: title.total_area,
            source: UnitSource::BuildingRegistry,
        }
    }
}

/// Every unit entry returned when nothing matched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitListing {
    pub units: Vec<UnitEntry>,
    pub land_area: String,
}

/// Outcome of a unit lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UnitLookup {
    Matched(UnitRecord),
    Listing(UnitListing),
}

/// First exclusive-area entry matching the query
pub fn find_exclusive_unit<'a>(entries: &'a [UnitEntry], query: &UnitQuery) -> Option<&'a UnitEntry> {
    entries
        .iter()
        .find(|entry| entry.is_exclusive() && query.matches(&entry.dong, &entry.ho))
}

/// First land-share entry matching the query
pub fn find_land_share<'a>(
    entries: &'a [LandShareEntry],
    query: &UnitQuery,
) -> Option<&'a LandShareEntry> {
    entries
        .iter()
        .find(|entry| query.matches(&entry.dong, &entry.ho))
}

/// One decoded page of a paged listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` when the payload carries no usable `totalCount`
    pub total_count: Option<usize>,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, total_count: &str) -> Self {
        let total_count = total_count.trim().parse().ok();
        Self { items, total_count }
    }

    /// Whether page `page_no` (1-based, `rows` per page) is the final one.
    /// Without a total count only a short page ends the listing.
    pub fn is_last(&self, page_no: usize, rows: usize) -> bool {
        self.items.len() < rows
            || self
                .total_count
                .is_some_and(|total| page_no * rows >= total)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
enum RegistryEnvelope<T> {
    Response { response: RegistryResponse<T> },
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct RegistryResponse<T> {
    #[serde(default, deserialize_with = "lenient::optional")]
    header: Option<RegistryHeader>,
    #[serde(default, deserialize_with = "lenient::optional")]
    body: Option<RegistryBody<T>>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryHeader {
    #[serde(default, rename = "resultCode", deserialize_with = "lenient::string")]
    code: String,
    #[serde(default, rename = "resultMsg", deserialize_with = "lenient::string")]
    message: String,
}

impl RegistryHeader {
    fn is_success(&self) -> bool {
        self.code.chars().all(|c| c == '0')
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct RegistryBody<T> {
    // `""` when the query matched nothing
    #[serde(default, deserialize_with = "lenient::optional")]
    items: Option<RegistryItems<T>>,
    #[serde(default, rename = "totalCount", deserialize_with = "lenient::string")]
    total_count: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct RegistryItems<T> {
    #[serde(default)]
    item: Items<T>,
}

/// Decode a data.go.kr registry payload into one page of rows.
pub fn registry_page<T: DeserializeOwned>(raw: &Value) -> Result<Normalized<Page<T>>, LookupError> {
    let envelope = RegistryEnvelope::<T>::deserialize(raw)
        .unwrap_or_else(|_| RegistryEnvelope::Unrecognized(raw.clone()));

    let response = match envelope {
        RegistryEnvelope::Response { response } => response,
        RegistryEnvelope::Unrecognized(raw) => {
            tracing::warn!("Unrecognized building registry envelope");
            return Ok(Normalized::Unrecognized(raw));
        }
    };

    if let Some(header) = response.header.filter(|header| !header.is_success()) {
        let message = first_non_empty(&[&header.message, REJECTED_WITHOUT_REASON]).to_string();
        return Err(LookupError::Rejected {
            message,
            raw: raw.clone(),
        });
    }

    let page = match response.body {
        Some(body) => {
            let items = body.items.map(|items| items.item.into_vec()).unwrap_or_default();
            Page::new(items, &body.total_count)
        }
        None => Page::new(Vec::new(), ""),
    };
    Ok(Normalized::Found(page))
}

/// Normalize a `getBrTitleInfo` payload.
pub fn normalize_building_title(raw: &Value) -> Result<Normalized<BuildingSummary>, LookupError> {
    Ok(registry_page::<BuildingRecord>(raw)?.map(|page| BuildingSummary::new(page.items)))
}

/// Normalize a `getBrExposPubuseAreaInfo` payload.
pub fn normalize_unit_entries(raw: &Value) -> Result<Normalized<Vec<UnitEntry>>, LookupError> {
    Ok(registry_page::<UnitEntry>(raw)?.map(|page| page.items))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LandShareEnvelope {
    Ldareg {
        #[serde(rename = "ldaregVOList")]
        body: LdaregBody,
    },
    Response {
        response: VworldResponse<LdaregResult>,
    },
    Unrecognized(Value),
}

// `List` comes first: derived structs also accept arrays positionally, so a
// two-row list would otherwise decode as `Nested` with the second row as the count.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LdaregBody {
    List(Vec<LandShareEntry>),
    Nested {
        #[serde(rename = "ldaregVOList", alias = "field")]
        items: Items<LandShareEntry>,
        #[serde(default, rename = "totalCount", deserialize_with = "lenient::string")]
        total_count: String,
    },
    Direct(Items<LandShareEntry>),
}

#[derive(Debug, Default, Deserialize)]
struct LdaregResult {
    #[serde(default)]
    items: Items<LandShareEntry>,
    #[serde(default, rename = "totalCount", deserialize_with = "lenient::string")]
    total_count: String,
}

/// Decode one page of a VWorld `ldaregList` payload.
pub fn land_share_page(raw: &Value) -> Result<Normalized<Page<LandShareEntry>>, LookupError> {
    let envelope = LandShareEnvelope::deserialize(raw)
        .unwrap_or_else(|_| LandShareEnvelope::Unrecognized(raw.clone()));

    let page = match envelope {
        LandShareEnvelope::Ldareg { body } => match body {
            LdaregBody::Nested { items, total_count } => Page::new(items.into_vec(), &total_count),
            LdaregBody::List(items) => Page::new(items, ""),
            LdaregBody::Direct(items) => Page::new(items.into_vec(), ""),
        },
        LandShareEnvelope::Response { response } => {
            let result = response.into_result(raw)?.unwrap_or_default();
            Page::new(result.items.into_vec(), &result.total_count)
        }
        LandShareEnvelope::Unrecognized(raw) => {
            tracing::warn!("Unrecognized land share envelope");
            return Ok(Normalized::Unrecognized(raw));
        }
    };
    Ok(Normalized::Found(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn title_payload() -> Value {
        json!({
            "response": {
                "header": {"resultCode": "00", "resultMsg": "NORMAL SERVICE."},
                "body": {
                    "items": {"item": [
                        {
                            "bldNm": "래미안아파트", "dongNm": "103동", "strctCdNm": "철근콘크리트구조",
                            "mainPurpsCdNm": "공동주택", "totArea": 15234.5, "grndFlrCnt": 25,
                            "ugrndFlrCnt": 2, "useAprDay": "20050314", "platArea": 36645.3
                        },
                        {"bldNm": "래미안아파트", "dongNm": "104동"}
                    ]},
                    "totalCount": 2
                }
            }
        })
    }

    #[test]
    fn test_title_summary() {
        let summary = normalize_building_title(&title_payload()).unwrap().found().unwrap();
        assert_eq!(summary.buildings.len(), 2);
        let main = summary.main_building.unwrap();
        assert_eq!(main.name, "래미안아파트");
        assert_eq!(main.dong, "103동");
        assert_eq!(main.total_area, "15234.5");
        assert_eq!(main.ground_floor, "25");
        assert_eq!(main.plat_area, "36645.3");
    }

    #[test]
    fn test_single_item_object() {
        let raw = json!({
            "response": {
                "header": {"resultCode": "00"},
                "body": {"items": {"item": {"bldNm": "단독주택"}}, "totalCount": "1"}
            }
        });
        let summary = normalize_building_title(&raw).unwrap().found().unwrap();
        assert_eq!(summary.buildings.len(), 1);
        assert_eq!(summary.buildings[0].name, "단독주택");
    }

    #[test]
    fn test_blank_items_is_empty_list() {
        let raw = json!({
            "response": {
                "header": {"resultCode": "00"},
                "body": {"items": "", "totalCount": 0}
            }
        });
        let summary = normalize_building_title(&raw).unwrap().found().unwrap();
        assert!(summary.buildings.is_empty());
        assert!(summary.main_building.is_none());
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({"buildings": []})
        );
    }

    #[test]
    fn test_result_code_rejection() {
        let raw = json!({
            "response": {"header": {"resultCode": "30", "resultMsg": "SERVICE KEY IS NOT REGISTERED ERROR."}}
        });
        let err = normalize_building_title(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.to_string(), "SERVICE KEY IS NOT REGISTERED ERROR.");
    }

    #[test]
    fn test_missing_response_is_unrecognized() {
        let raw = json!({"OpenAPI_ServiceResponse": {"cmmMsgHeader": {}}});
        assert!(normalize_building_title(&raw).unwrap().is_unrecognized());
    }

    #[test]
    fn test_unit_entries_and_exclusive_match() {
        let raw = json!({
            "response": {
                "header": {"resultCode": "00"},
                "body": {"items": {"item": [
                    {"dongNm": "103동", "hoNm": "904호", "flrNoNm": "9층", "area": 12.3,
                     "exposPubuseGbCdNm": "공용", "mainAtchGbCdNm": "주건축물", "purpsCdNm": "계단실"},
                    {"dongNm": "103동", "hoNm": "904호", "flrNoNm": "9층", "area": 84.97,
                     "exposPubuseGbCdNm": "전유", "mainAtchGbCdNm": "주건축물", "purpsCdNm": "아파트"}
                ]}}
            }
        });
        let entries = normalize_unit_entries(&raw).unwrap().found().unwrap();
        let found = find_exclusive_unit(&entries, &UnitQuery::new("103", "904")).unwrap();
        assert_eq!(found.area, "84.97");

        let title = BuildingRecord {
            name: "래미안아파트".to_string(),
            plat_area: "36645.3".to_string(),
            ..Default::default()
        };
        let record = UnitRecord::from_exclusive(found, Some(&title));
        assert_eq!(record.exclusive_area, "84.97");
        assert_eq!(record.land_area, "36645.3");
        assert_eq!(record.purpose, "아파트");
        assert_eq!(record.source, UnitSource::BuildingRegistry);
        assert_eq!(
            serde_json::to_value(&record).unwrap()["source"],
            json!("building_registry")
        );
    }

    #[test]
    fn test_land_share_page_and_record() {
        let raw = json!({
            "ldaregVOList": {
                "ldaregVOList": [
                    {"buldDongNm": "103", "buldHoNm": "903", "ldaQotaRate": "35.1/36645.30"},
                    {"buldDongNm": "103", "buldHoNm": "904", "buldFloorNm": "9", "ldaQotaRate": "35.9790/36645.30"}
                ],
                "totalCount": "1730"
            }
        });
        let page = land_share_page(&raw).unwrap().found().unwrap();
        assert_eq!(page.total_count, Some(1730));

        let entry = find_land_share(&page.items, &UnitQuery::new("103동", "904호")).unwrap();
        let record = UnitRecord::from_land_share(entry, None);
        assert_eq!(record.land_share, "35.9790");
        assert_eq!(record.land_area, "36645.30");
        assert_eq!(record.floor, "9");
        assert_eq!(record.source, UnitSource::Vworld);
    }

    #[test]
    fn test_page_without_total_count_ends_only_when_short() {
        let rows: Vec<Value> = (0..2)
            .map(|n| json!({"buldDongNm": "1", "buldHoNm": n.to_string()}))
            .collect();
        let page = land_share_page(&json!({"ldaregVOList": rows}))
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, None);
        assert!(!page.is_last(1, 2));
        assert!(page.is_last(1, 3));

        let counted = Page {
            items: vec![1, 2, 3],
            total_count: Some(6),
        };
        assert!(!counted.is_last(1, 3));
        assert!(counted.is_last(2, 3));
    }

    #[test]
    fn test_land_share_rejected() {
        let raw = json!({"response": {"status": "ERROR", "error": {"text": "INVALID_KEY"}}});
        assert_eq!(land_share_page(&raw).unwrap_err().kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_land_share_parse() {
        assert_eq!(
            LandShare::parse("35.9790/36645.30"),
            LandShare {
                share: "35.9790".to_string(),
                land_area: "36645.30".to_string()
            }
        );
        assert_eq!(LandShare::parse("12.5").land_area, "");
    }

    #[test]
    fn test_listing_serializes_untagged() {
        let lookup = UnitLookup::Listing(UnitListing {
            units: vec![UnitEntry {
                dong: "101동".to_string(),
                ho: "101호".to_string(),
                ..Default::default()
            }],
            land_area: "500".to_string(),
        });
        let value = serde_json::to_value(&lookup).unwrap();
        assert_eq!(value["land_area"], json!("500"));
        assert_eq!(value["units"][0]["ho"], json!("101호"));
    }
}
