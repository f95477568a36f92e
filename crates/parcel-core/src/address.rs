//! Road-name address search (juso addrLinkApi) normalization

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LookupError, REJECTED_WITHOUT_REASON};
use crate::land::join_lot_numbers;
use crate::lenient::{self, first_non_empty, Items};
use crate::pnu::{LandType, Pnu};

/// Page requested from the address search
pub const ADDRESS_PAGE: u32 = 1;

/// Rows requested from the address search
pub const ADDRESS_ROWS: u32 = 10;

/// One address search hit with its derived parcel identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressCandidate {
    pub road_address: String,
    pub jibun_address: String,
    pub bjd_code: String,
    pub pnu: String,
    pub sido: String,
    pub sigungu: String,
    pub dong: String,
    pub jibun: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct JusoItem {
    #[serde(rename = "roadAddr", deserialize_with = "lenient::string")]
    road_address: String,
    #[serde(rename = "jibunAddr", deserialize_with = "lenient::string")]
    jibun_address: String,
    #[serde(rename = "admCd", deserialize_with = "lenient::string")]
    admin_code: String,
    #[serde(rename = "lnbrMnnm", deserialize_with = "lenient::string")]
    main_lot: String,
    #[serde(rename = "lnbrSlno", deserialize_with = "lenient::string")]
    sub_lot: String,
    #[serde(rename = "siNm", deserialize_with = "lenient::string")]
    sido: String,
    #[serde(rename = "sggNm", deserialize_with = "lenient::string")]
    sigungu: String,
    #[serde(rename = "emdNm", deserialize_with = "lenient::string")]
    dong: String,
}

impl JusoItem {
    fn into_candidate(self) -> AddressCandidate {
        let land_type = LandType::from_jibun_address(&self.jibun_address);
        let main_lot = first_non_empty(&[&self.main_lot, "0"]);
        let sub_lot = first_non_empty(&[&self.sub_lot, "0"]);
        let pnu = Pnu::derive(&self.admin_code, land_type, main_lot, sub_lot);
        let jibun = join_lot_numbers(&self.main_lot, &self.sub_lot);

        AddressCandidate {
            pnu: pnu.as_str().to_string(),
            jibun,
            road_address: self.road_address,
            jibun_address: self.jibun_address,
            bjd_code: self.admin_code,
            sido: self.sido,
            sigungu: self.sigungu,
            dong: self.dong,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct JusoEnvelope {
    #[serde(default, deserialize_with = "lenient::optional")]
    results: Option<JusoResults>,
}

#[derive(Debug, Default, Deserialize)]
struct JusoResults {
    #[serde(default, deserialize_with = "lenient::optional")]
    common: Option<JusoCommon>,
    #[serde(default)]
    juso: Items<JusoItem>,
}

#[derive(Debug, Default, Deserialize)]
struct JusoCommon {
    #[serde(default, rename = "errorCode", deserialize_with = "lenient::string")]
    code: String,
    #[serde(default, rename = "errorMessage", deserialize_with = "lenient::string")]
    message: String,
}

/// Convert an address search payload into candidates.
///
/// A juso `errorCode` other than `0` is an upstream rejection. A payload
/// without `results.juso` yields no candidates.
pub fn normalize_address_results(raw: &Value) -> Result<Vec<AddressCandidate>, LookupError> {
    let envelope = JusoEnvelope::deserialize(raw).unwrap_or_default();
    let results = envelope.results.unwrap_or_default();

    if let Some(common) = results.common {
        let code = common.code.trim();
        if !code.is_empty() && code != "0" {
            let message = first_non_empty(&[&common.message, REJECTED_WITHOUT_REASON]).to_string();
            return Err(LookupError::Rejected {
                message,
                raw: raw.clone(),
            });
        }
    }

    Ok(results
        .juso
        .into_vec()
        .into_iter()
        .map(JusoItem::into_candidate)
        .collect())
}
