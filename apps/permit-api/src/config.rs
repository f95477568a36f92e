//! Immutable runtime configuration

use parcel_core::{UsageStrategy, DEFAULT_REFERENCE_YEAR};

/// Development keys used when the environment provides none
pub const DEV_ADDRESS_API_KEY: &str = "devU01TX0FVVEgyMDI0MDEwMTAwMDAwMDAwMDAwMDA=";
pub const DEV_VWORLD_API_KEY: &str = "00000000-0000-0000-0000-000000000000";
pub const DEV_BUILDING_API_KEY: &str = "development-service-key";

pub const DEFAULT_JUSO_BASE_URL: &str = "https://business.juso.go.kr/addrlink/addrLinkApi.do";
pub const DEFAULT_VWORLD_BASE_URL: &str = "https://api.vworld.kr/ned/data";
pub const DEFAULT_BUILDING_BASE_URL: &str = "https://apis.data.go.kr/1613000/BldRgstHubService";

/// Upstream credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeys {
    pub address: String,
    pub vworld: String,
    pub building: String,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            address: DEV_ADDRESS_API_KEY.to_string(),
            vworld: DEV_VWORLD_API_KEY.to_string(),
            building: DEV_BUILDING_API_KEY.to_string(),
        }
    }
}

/// Upstream roots; the juso root is the full endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub juso: String,
    pub vworld: String,
    pub building: String,
}

impl Endpoints {
    pub fn new(juso: &str, vworld: &str, building: &str) -> Self {
        Self {
            juso: juso.to_string(),
            vworld: vworld.trim_end_matches('/').to_string(),
            building: building.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(
            DEFAULT_JUSO_BASE_URL,
            DEFAULT_VWORLD_BASE_URL,
            DEFAULT_BUILDING_BASE_URL,
        )
    }
}

/// Everything lookups need, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub keys: ApiKeys,
    pub endpoints: Endpoints,
    /// `stdrYear` sent to the land price API and reported when absent
    pub price_year: String,
    pub usage_strategy: UsageStrategy,
    /// Query VWorld land-share records before the building registry
    pub land_share_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keys: ApiKeys::default(),
            endpoints: Endpoints::default(),
            price_year: DEFAULT_REFERENCE_YEAR.to_string(),
            usage_strategy: UsageStrategy::default(),
            land_share_enabled: true,
        }
    }
}
