//! Parcel identifier (PNU) derivation and decoding
//!
//! A PNU is 19 digits:
//!
//! | part | width | example |
//! |---|---|---|
//! | administrative (legal-dong) code | 10 | `1168010600` |
//! | land-type flag (`1` ordinary, `2` mountain) | 1 | `1` |
//! | main lot number | 4 | `0706` |
//! | sub lot number | 4 | `0013` |

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::LookupError;

/// Total width of a parcel identifier
pub const PNU_LEN: usize = 19;

/// Width of the administrative code prefix
pub const ADMIN_CODE_LEN: usize = 10;

/// Width of each lot number part
pub const LOT_WIDTH: usize = 4;

lazy_static! {
    /// `산` as its own token right before a lot number: "산 12-3", "리 산12".
    /// A bare substring test would mark every lot in 부산 or 산본 as mountain land.
    static ref MOUNTAIN_MARKER: Regex = Regex::new(r"(?:^|\s)산\s*\d").unwrap();
}

/// Land-type flag embedded at position 10 of a PNU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandType {
    Ordinary,
    Mountain,
}

impl LandType {
    pub fn flag(&self) -> char {
        match self {
            LandType::Ordinary => '1',
            LandType::Mountain => '2',
        }
    }

    /// Mountain iff the jibun address carries the mountain-land marker.
    pub fn from_jibun_address(address: &str) -> Self {
        if MOUNTAIN_MARKER.is_match(address) {
            LandType::Mountain
        } else {
            LandType::Ordinary
        }
    }
}

/// Left-pad with zeros to `width`; longer input is returned unchanged.
pub fn zero_pad(value: &str, width: usize) -> String {
    format!("{:0>width$}", value.trim(), width = width)
}

/// A parcel identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Pnu(String);

impl Pnu {
    /// Combine an administrative code, land type and lot numbers.
    pub fn derive(admin_code: &str, land_type: LandType, main_lot: &str, sub_lot: &str) -> Self {
        let mut pnu = String::with_capacity(PNU_LEN);
        pnu.push_str(admin_code.trim());
        pnu.push(land_type.flag());
        pnu.push_str(&zero_pad(main_lot, LOT_WIDTH));
        pnu.push_str(&zero_pad(sub_lot, LOT_WIDTH));
        Pnu(pnu)
    }

    /// Accept a caller-supplied identifier for registry lookups.
    ///
    /// Values shorter than 19 characters are rejected, as is anything whose
    /// first 19 characters are not ASCII digits.
    pub fn parse(value: &str) -> Result<Self, LookupError> {
        let value = value.trim();
        if value.chars().count() < PNU_LEN {
            return Err(LookupError::missing_pnu());
        }
        if !value.chars().take(PNU_LEN).all(|c| c.is_ascii_digit()) {
            return Err(LookupError::Validation(format!(
                "PNU 코드 형식이 올바르지 않습니다: {}",
                value
            )));
        }
        Ok(Pnu(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn land_type(&self) -> Option<LandType> {
        match self.0.as_bytes().get(ADMIN_CODE_LEN) {
            Some(b'1') => Some(LandType::Ordinary),
            Some(b'2') => Some(LandType::Mountain),
            _ => None,
        }
    }

    /// Split into the four building-registry query codes.
    ///
    /// Only meaningful for identifiers accepted by [`Pnu::parse`]; parts
    /// missing from a shorter value come back empty.
    pub fn registry_codes(&self) -> RegistryCodes {
        let part = |range: std::ops::Range<usize>| {
            self.0.get(range).unwrap_or_default().to_string()
        };
        RegistryCodes {
            sigungu_cd: part(0..5),
            bjdong_cd: part(5..10),
            bun: part(11..15),
            ji: part(15..19),
        }
    }
}

impl fmt::Display for Pnu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Pnu {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Building-registry query codes decoded from a PNU (flag digit skipped)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryCodes {
    /// District (sigungu) code, 5 digits
    pub sigungu_cd: String,
    /// Sub-district (legal dong) code, 5 digits
    pub bjdong_cd: String,
    /// Main lot, 4 digits
    pub bun: String,
    /// Sub lot, 4 digits
    pub ji: String,
}

impl RegistryCodes {
    /// Query parameters in the registry's own naming
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sigunguCd", self.sigungu_cd.clone()),
            ("bjdongCd", self.bjdong_cd.clone()),
            ("bun", self.bun.clone()),
            ("ji", self.ji.clone()),
        ]
    }
}
