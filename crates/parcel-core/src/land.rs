//! Land characteristics (ladfrlList) normalization

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Normalized, VworldResponse};
use crate::error::LookupError;
use crate::jimok::land_category_name;
use crate::lenient::{self, first_non_empty, Items};

/// Normalized land record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandRecord {
    pub jibun: String,
    pub jimok: String,
    pub jimok_name: String,
    pub area: String,
    pub pnu: String,
}

/// Union of the item fields seen across land-characteristics shapes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LandItem {
    #[serde(rename = "lnbrMnnm", deserialize_with = "lenient::string")]
    pub main_lot: String,
    #[serde(rename = "lnbrSlno", deserialize_with = "lenient::string")]
    pub sub_lot: String,
    #[serde(rename = "mnnmSlno", deserialize_with = "lenient::string")]
    pub lot_label: String,
    #[serde(rename = "lndcgrCode", deserialize_with = "lenient::string")]
    pub category_code: String,
    #[serde(rename = "lndcgrCodeNm", deserialize_with = "lenient::string")]
    pub category_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub jimok: String,
    #[serde(rename = "lndpclAr", deserialize_with = "lenient::string")]
    pub parcel_area: String,
    #[serde(deserialize_with = "lenient::string")]
    pub area: String,
    #[serde(deserialize_with = "lenient::string")]
    pub pnu: String,
}

/// Known land-characteristics envelopes, in decode priority order
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LandEnvelope {
    Ladfrl {
        #[serde(rename = "ladfrlVOList")]
        body: LadfrlBody,
    },
    LandFrls {
        #[serde(rename = "landFrls")]
        body: LandFrlsBody,
    },
    Response {
        response: VworldResponse<LandResult>,
    },
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LadfrlBody {
    Nested {
        #[serde(rename = "ladfrlVOList", alias = "field")]
        items: Items<LandItem>,
    },
    Direct(Items<LandItem>),
}

#[derive(Debug, Deserialize)]
struct LandFrlsBody {
    #[serde(default, rename = "landFrl", alias = "field")]
    items: Items<LandItem>,
}

#[derive(Debug, Default, Deserialize)]
struct LandResult {
    #[serde(default)]
    items: Items<LandItem>,
    #[serde(default, rename = "ladfrlVOList")]
    ladfrl: Items<LandItem>,
}

/// `main-sub`, or just `main` when the sub lot is absent or zero
pub fn join_lot_numbers(main: &str, sub: &str) -> String {
    let sub = sub.trim();
    let sub_is_zero = sub.is_empty() || sub.chars().all(|c| c == '0');
    if sub_is_zero {
        main.trim().to_string()
    } else {
        format!("{}-{}", main.trim(), sub)
    }
}

/// Normalize a `ladfrlList` payload for `pnu`.
///
/// Only the first recognized envelope is used; shapes are never merged.
pub fn normalize_land_info(raw: &Value, pnu: &str) -> Result<Normalized<LandRecord>, LookupError> {
    let envelope =
        LandEnvelope::deserialize(raw).unwrap_or_else(|_| LandEnvelope::Unrecognized(raw.clone()));

    let record = match envelope {
        LandEnvelope::Ladfrl { body } => {
            let items = match body {
                LadfrlBody::Nested { items } | LadfrlBody::Direct(items) => items,
            };
            items.first().map(|item| {
                let code = first_non_empty(&[&item.category_code, &item.jimok]);
                LandRecord {
                    jibun: join_lot_numbers(&item.main_lot, &item.sub_lot),
                    jimok: code.to_string(),
                    jimok_name: land_category_name(code).to_string(),
                    area: first_non_empty(&[&item.parcel_area, &item.area]).to_string(),
                    pnu: first_non_empty(&[&item.pnu, pnu]).to_string(),
                }
            })
        }
        LandEnvelope::LandFrls { body } => body.items.first().map(|item| {
            let code = first_non_empty(&[&item.category_code, &item.category_name]);
            LandRecord {
                jibun: item.lot_label.clone(),
                jimok: code.to_string(),
                jimok_name: land_category_name(code).to_string(),
                area: item.parcel_area.clone(),
                pnu: first_non_empty(&[&item.pnu, pnu]).to_string(),
            }
        }),
        LandEnvelope::Response { response } => {
            let result = response.into_result(raw)?.unwrap_or_default();
            let items = if result.items.is_empty() {
                result.ladfrl
            } else {
                result.items
            };
            items.first().map(|item| {
                let code = first_non_empty(&[&item.category_code, &item.category_name]);
                let jibun = if item.lot_label.is_empty() {
                    join_lot_numbers(&item.main_lot, &item.sub_lot)
                } else {
                    item.lot_label.clone()
                };
                LandRecord {
                    jibun,
                    jimok: code.to_string(),
                    jimok_name: land_category_name(code).to_string(),
                    area: item.parcel_area.clone(),
                    pnu: first_non_empty(&[&item.pnu, pnu]).to_string(),
                }
            })
        }
        LandEnvelope::Unrecognized(raw) => {
            tracing::warn!("Unrecognized land characteristics envelope for {}", pnu);
            return Ok(Normalized::Unrecognized(raw));
        }
    };

    Ok(record.map_or(Normalized::Empty, Normalized::Found))
}
