//! Individual assessed land price (getIndvdLandPriceAttr) normalization

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Normalized, VworldResponse};
use crate::error::LookupError;
use crate::lenient::{self, first_non_empty, Items};

/// Reference year used when the caller does not configure one
pub const DEFAULT_REFERENCE_YEAR: &str = "2024";

/// Normalized price record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceRecord {
    pub price: String,
    pub year: String,
    pub pnu: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceItem {
    #[serde(rename = "pblntfPclnd", deserialize_with = "lenient::string")]
    pub price: String,
    #[serde(rename = "stdrYear", deserialize_with = "lenient::string")]
    pub year: String,
    #[serde(deserialize_with = "lenient::string")]
    pub pnu: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceEnvelope {
    Prices {
        #[serde(rename = "indvdLandPrices")]
        body: PricesBody,
    },
    Response {
        response: VworldResponse<PriceResult>,
    },
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct PricesBody {
    #[serde(default, rename = "indvdLandPrice", alias = "field")]
    items: Items<PriceItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceResult {
    Features {
        #[serde(rename = "featureCollection")]
        collection: FeatureCollection,
    },
    Direct(PriceItem),
}

#[derive(Debug, Default, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Items<Feature>,
}

#[derive(Debug, Default, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: PriceItem,
}

/// Normalize a price payload; `default_year` fills an absent reference year.
pub fn normalize_land_price(
    raw: &Value,
    pnu: &str,
    default_year: &str,
) -> Result<Normalized<PriceRecord>, LookupError> {
    let envelope = PriceEnvelope::deserialize(raw)
        .unwrap_or_else(|_| PriceEnvelope::Unrecognized(raw.clone()));

    let record = |item: &PriceItem, pnu: &str| PriceRecord {
        price: item.price.clone(),
        year: first_non_empty(&[&item.year, default_year]).to_string(),
        pnu: first_non_empty(&[&item.pnu, pnu]).to_string(),
    };

    let found = match envelope {
        PriceEnvelope::Prices { body } => body.items.first().map(|item| record(item, pnu)),
        PriceEnvelope::Response { response } => match response.into_result(raw)? {
            Some(PriceResult::Features { collection }) => collection
                .features
                .first()
                .map(|feature| record(&feature.properties, pnu)),
            // A direct result never names its parcel; report the requested one.
            Some(PriceResult::Direct(item)) => Some(PriceRecord {
                pnu: pnu.to_string(),
                ..record(&item, pnu)
            }),
            None => None,
        },
        PriceEnvelope::Unrecognized(raw) => {
            tracing::warn!("Unrecognized land price envelope for {}", pnu);
            return Ok(Normalized::Unrecognized(raw));
        }
    };

    Ok(found.map_or(Normalized::Empty, Normalized::Found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PNU: &str = "1168010600107060013";

    #[test]
    fn test_indvd_land_prices_shape() {
        let raw = json!({
            "indvdLandPrices": {
                "field": [{"pnu": PNU, "pblntfPclnd": "27450000", "stdrYear": "2024"}]
            }
        });

        let record = normalize_land_price(&raw, PNU, "2024").unwrap().found().unwrap();
        assert_eq!(
            record,
            PriceRecord {
                price: "27450000".to_string(),
                year: "2024".to_string(),
                pnu: PNU.to_string(),
            }
        );
    }

    #[test]
    fn test_missing_year_uses_default() {
        let raw = json!({"indvdLandPrices": {"indvdLandPrice": {"pblntfPclnd": 1500000}}});
        let record = normalize_land_price(&raw, PNU, "2023").unwrap().found().unwrap();
        assert_eq!(record.price, "1500000");
        assert_eq!(record.year, "2023");
    }

    #[test]
    fn test_feature_collection_shape() {
        let raw = json!({
            "response": {
                "status": "OK",
                "result": {
                    "featureCollection": {
                        "features": [{"properties": {"pblntfPclnd": "990000", "stdrYear": "2022"}}]
                    }
                }
            }
        });

        let record = normalize_land_price(&raw, PNU, "2024").unwrap().found().unwrap();
        assert_eq!(record.price, "990000");
        assert_eq!(record.year, "2022");
        assert_eq!(record.pnu, PNU);
    }

    #[test]
    fn test_direct_result_shape() {
        let raw = json!({
            "response": {"status": "OK", "result": {"pblntfPclnd": "12000", "pnu": "other"}}
        });

        let record = normalize_land_price(&raw, PNU, "2024").unwrap().found().unwrap();
        assert_eq!(record.price, "12000");
        assert_eq!(record.year, "2024");
        assert_eq!(record.pnu, PNU);
    }

    #[test]
    fn test_rejected_response() {
        let raw = json!({"response": {"status": "ERROR", "error": {"text": "INCORRECT_KEY"}}});
        let err = normalize_land_price(&raw, PNU, "2024").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_unrecognized() {
        let raw = json!([1, 2, 3]);
        assert!(normalize_land_price(&raw, PNU, "2024")
            .unwrap()
            .is_unrecognized());
    }
}
