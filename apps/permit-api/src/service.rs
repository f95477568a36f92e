//! Parcel lookups composed from upstream calls
//!
//! Each lookup makes its outbound calls one after another; nothing here
//! runs concurrently within a request.

use std::str::FromStr;
use std::sync::Arc;

use parcel_core::address::{ADDRESS_PAGE, ADDRESS_ROWS};
use parcel_core::building::{find_exclusive_unit, find_land_share};
use parcel_core::error::{MISSING_ADDRESS, UNRECOGNIZED_SHAPE};
use parcel_core::{
    land_share_page, normalize_address_results, normalize_building_title, normalize_land_info,
    normalize_land_price, normalize_land_usage, normalize_unit_entries, AddressCandidate,
    BuildingRecord, BuildingSummary, LandRecord, LandShareEntry, LookupError, Normalized, Pnu,
    PriceRecord, RegistryCodes, UnitListing, UnitLookup, UnitQuery, UnitRecord, UsageRecord,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::upstream::{Api, Upstream, UpstreamRequest};

/// Rows per land-share page
pub const LAND_SHARE_ROWS: usize = 1000;

/// Land-share pages scanned before giving up
pub const LAND_SHARE_MAX_PAGES: usize = 5;

const TITLE_ROWS: u32 = 10;
const UNIT_AREA_ROWS: u32 = 1000;
const USAGE_ROWS: usize = 100;

/// Upstream payloads the debug endpoint can echo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSource {
    Address,
    LandInfo,
    LandPrice,
    LandUsage,
    BuildingTitle,
    BuildingUnits,
    LandShare,
}

impl FromStr for RawSource {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "address" => Ok(RawSource::Address),
            "land_info" => Ok(RawSource::LandInfo),
            "land_price" => Ok(RawSource::LandPrice),
            "land_usage" => Ok(RawSource::LandUsage),
            "building_title" => Ok(RawSource::BuildingTitle),
            "building_units" => Ok(RawSource::BuildingUnits),
            "land_share" => Ok(RawSource::LandShare),
            other => Err(LookupError::Validation(format!(
                "알 수 없는 source입니다: '{}'",
                other
            ))),
        }
    }
}

/// The three land sections, each captured on its own
pub struct LandOverview {
    pub pnu: String,
    pub info: Result<Normalized<LandRecord>, LookupError>,
    pub price: Result<Normalized<PriceRecord>, LookupError>,
    pub usage: Result<Normalized<UsageRecord>, LookupError>,
}

pub struct ParcelService {
    upstream: Arc<dyn Upstream>,
    config: AppConfig,
}

impl ParcelService {
    pub fn new(upstream: Arc<dyn Upstream>, config: AppConfig) -> Self {
        Self { upstream, config }
    }

    // ============================================================
    // Requests
    // ============================================================

    fn address_request(address: &str) -> UpstreamRequest {
        UpstreamRequest::new(Api::Address)
            .param("currentPage", ADDRESS_PAGE)
            .param("countPerPage", ADDRESS_ROWS)
            .param("keyword", address)
            .param("resultType", "json")
    }

    fn vworld_request(api: Api, pnu: &Pnu, rows: usize, page: usize) -> UpstreamRequest {
        UpstreamRequest::new(api)
            .param("pnu", pnu)
            .param("format", "json")
            .param("numOfRows", rows)
            .param("pageNo", page)
    }

    fn registry_request(api: Api, codes: &RegistryCodes, rows: u32) -> UpstreamRequest {
        UpstreamRequest::new(api)
            .params(codes.query_params())
            .param("numOfRows", rows)
            .param("pageNo", 1)
            .param("_type", "json")
    }

    fn price_request(&self, pnu: &Pnu) -> UpstreamRequest {
        Self::vworld_request(Api::LandPrice, pnu, 1, 1).param("stdrYear", &self.config.price_year)
    }

    fn require_address(address: &str) -> Result<&str, LookupError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(LookupError::Validation(MISSING_ADDRESS.to_string()));
        }
        Ok(address)
    }

    // ============================================================
    // Lookups
    // ============================================================

    /// Address search with a derived PNU per hit
    pub async fn resolve_address(&self, address: &str) -> Result<Vec<AddressCandidate>, LookupError> {
        let address = Self::require_address(address)?;
        info!("Address search: {}", address);

        let raw = self.upstream.fetch(Self::address_request(address)).await?;
        let candidates = normalize_address_results(&raw)?;
        debug!("Address search returned {} candidates", candidates.len());
        Ok(candidates)
    }

    pub async fn land_info(&self, pnu: &str) -> Result<Normalized<LandRecord>, LookupError> {
        let pnu = Pnu::parse(pnu)?;
        info!("Land characteristics lookup: {}", pnu);
        self.fetch_land_info(&pnu).await
    }

    pub async fn land_price(&self, pnu: &str) -> Result<Normalized<PriceRecord>, LookupError> {
        let pnu = Pnu::parse(pnu)?;
        info!("Land price lookup: {}", pnu);
        self.fetch_land_price(&pnu).await
    }

    pub async fn land_usage(&self, pnu: &str) -> Result<Normalized<UsageRecord>, LookupError> {
        let pnu = Pnu::parse(pnu)?;
        info!("Land use lookup: {}", pnu);
        self.fetch_land_usage(&pnu).await
    }

    /// Characteristics, price and usage for one parcel; one failing section
    /// leaves the others intact.
    pub async fn land_all(&self, pnu: &str) -> Result<LandOverview, LookupError> {
        let pnu = Pnu::parse(pnu)?;
        info!("Land overview lookup: {}", pnu);

        let info = self.fetch_land_info(&pnu).await;
        let price = self.fetch_land_price(&pnu).await;
        let usage = self.fetch_land_usage(&pnu).await;
        for (section, error) in [
            ("info", info.as_ref().err()),
            ("price", price.as_ref().err()),
            ("usage", usage.as_ref().err()),
        ] {
            if let Some(error) = error {
                warn!("Land overview section '{}' failed for {}: {}", section, pnu, error);
            }
        }

        Ok(LandOverview {
            pnu: pnu.to_string(),
            info,
            price,
            usage,
        })
    }

    pub async fn building_info(&self, pnu: &str) -> Result<Normalized<BuildingSummary>, LookupError> {
        let pnu = Pnu::parse(pnu)?;
        info!("Building title lookup: {}", pnu);

        let codes = pnu.registry_codes();
        let raw = self
            .upstream
            .fetch(Self::registry_request(Api::BuildingTitle, &codes, TITLE_ROWS))
            .await?;
        normalize_building_title(&raw)
    }

    /// Land share and exclusive area for one unit.
    ///
    /// Tries VWorld land-share records first, then the registry's
    /// exclusive-area rows under each dong spelling, and finally lists every
    /// unit on the lot.
    pub async fn building_unit(
        &self,
        pnu: &str,
        dong: &str,
        ho: &str,
    ) -> Result<Normalized<UnitLookup>, LookupError> {
        let pnu = Pnu::parse(pnu)?;
        let query = UnitQuery::new(dong, ho);
        let codes = pnu.registry_codes();
        info!("Unit lookup: {} dong='{}' ho='{}'", pnu, query.dong, query.ho);

        if self.config.land_share_enabled && query.has_ho() {
            match self.search_land_share(&pnu, &query).await {
                Ok(Some(entry)) => {
                    let title = self.title_record(&codes).await;
                    let record = UnitRecord::from_land_share(&entry, title.as_ref());
                    return Ok(Normalized::Found(UnitLookup::Matched(record)));
                }
                Ok(None) => debug!("No land share record for {}", pnu),
                Err(e) => warn!("Land share lookup failed for {}: {}", pnu, e),
            }
        }

        let variants = if query.has_ho() {
            query.dong_variants()
        } else {
            vec![Some(query.dong.clone()).filter(|dong| !dong.is_empty())]
        };

        let mut units = Vec::new();
        let mut answered = false;
        let mut last_error = None;
        for variant in variants {
            let mut request = Self::registry_request(Api::BuildingUnitArea, &codes, UNIT_AREA_ROWS);
            if let Some(dong) = &variant {
                request = request.param("dongNm", dong);
            }
            debug!("Exclusive area lookup with dongNm={:?}", variant);

            let fetched = self
                .upstream
                .fetch(request)
                .await
                .and_then(|raw| normalize_unit_entries(&raw));
            let entries = match fetched {
                Ok(Normalized::Found(entries)) => entries,
                Ok(Normalized::Empty) => Vec::new(),
                Ok(Normalized::Unrecognized(raw)) => return Ok(Normalized::Unrecognized(raw)),
                Err(e) => {
                    warn!("Exclusive area lookup with dongNm={:?} failed: {}", variant, e);
                    last_error = Some(e);
                    continue;
                }
            };
            answered = true;

            if let Some(entry) = find_exclusive_unit(&entries, &query) {
                let title = self.title_record(&codes).await;
                let record = UnitRecord::from_exclusive(entry, title.as_ref());
                return Ok(Normalized::Found(UnitLookup::Matched(record)));
            }
            units = entries;
        }

        // Every variant failed: report the failure instead of an empty listing
        if !answered {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let land_area = self
            .title_record(&codes)
            .await
            .map(|title| title.plat_area)
            .unwrap_or_default();
        Ok(Normalized::Found(UnitLookup::Listing(UnitListing {
            units,
            land_area,
        })))
    }

    /// Raw upstream payload for diagnosis
    pub async fn raw(
        &self,
        source: RawSource,
        pnu: &str,
        address: &str,
    ) -> Result<Value, LookupError> {
        let request = match source {
            RawSource::Address => Self::address_request(Self::require_address(address)?),
            _ => self.pnu_request(source, &Pnu::parse(pnu)?),
        };
        self.upstream.fetch(request).await
    }

    fn pnu_request(&self, source: RawSource, pnu: &Pnu) -> UpstreamRequest {
        let codes = pnu.registry_codes();
        match source {
            RawSource::LandInfo => Self::vworld_request(Api::LandInfo, pnu, 1, 1),
            RawSource::LandPrice => self.price_request(pnu),
            RawSource::LandUsage => Self::vworld_request(Api::LandUse, pnu, USAGE_ROWS, 1),
            RawSource::LandShare => Self::vworld_request(Api::LandShare, pnu, LAND_SHARE_ROWS, 1),
            RawSource::BuildingTitle => Self::registry_request(Api::BuildingTitle, &codes, TITLE_ROWS),
            RawSource::BuildingUnits | RawSource::Address => {
                Self::registry_request(Api::BuildingUnitArea, &codes, UNIT_AREA_ROWS)
            }
        }
    }

    // ============================================================
    // Helpers
    // ============================================================

    async fn fetch_land_info(&self, pnu: &Pnu) -> Result<Normalized<LandRecord>, LookupError> {
        let raw = self
            .upstream
            .fetch(Self::vworld_request(Api::LandInfo, pnu, 1, 1))
            .await?;
        normalize_land_info(&raw, pnu.as_str())
    }

    async fn fetch_land_price(&self, pnu: &Pnu) -> Result<Normalized<PriceRecord>, LookupError> {
        let raw = self.upstream.fetch(self.price_request(pnu)).await?;
        normalize_land_price(&raw, pnu.as_str(), &self.config.price_year)
    }

    async fn fetch_land_usage(&self, pnu: &Pnu) -> Result<Normalized<UsageRecord>, LookupError> {
        let raw = self
            .upstream
            .fetch(Self::vworld_request(Api::LandUse, pnu, USAGE_ROWS, 1))
            .await?;
        normalize_land_usage(&raw, self.config.usage_strategy)
    }

    /// First title record, or `None` when the registry has nothing usable
    async fn title_record(&self, codes: &RegistryCodes) -> Option<BuildingRecord> {
        let request = Self::registry_request(Api::BuildingTitle, codes, TITLE_ROWS);
        let summary = match self.upstream.fetch(request).await {
            Ok(raw) => normalize_building_title(&raw),
            Err(e) => Err(e),
        };

        match summary {
            Ok(Normalized::Found(summary)) => summary.main_building,
            Ok(_) => None,
            Err(e) => {
                warn!("Title lookup failed: {}", e);
                None
            }
        }
    }

    /// Scan land-share pages until the unit is found or the listing ends.
    async fn search_land_share(
        &self,
        pnu: &Pnu,
        query: &UnitQuery,
    ) -> Result<Option<LandShareEntry>, LookupError> {
        for page_no in 1..=LAND_SHARE_MAX_PAGES {
            let request = Self::vworld_request(Api::LandShare, pnu, LAND_SHARE_ROWS, page_no);
            let raw = self.upstream.fetch(request).await?;

            let page = match land_share_page(&raw)? {
                Normalized::Found(page) => page,
                Normalized::Empty => return Ok(None),
                Normalized::Unrecognized(_) => {
                    return Err(LookupError::Upstream(UNRECOGNIZED_SHAPE.to_string()))
                }
            };

            if let Some(entry) = find_land_share(&page.items, query) {
                debug!("Land share match on page {}", page_no);
                return Ok(Some(entry.clone()));
            }
            if page.is_last(page_no, LAND_SHARE_ROWS) {
                break;
            }
        }
        Ok(None)
    }
}
