//! Parcel identifiers and normalization of Korean public land-data responses
//!
//! Each upstream (juso address search, VWorld land characteristics, land
//! price, land use and land share, data.go.kr building registry) answers in
//! several envelope shapes. Every `normalize_*` function decodes exactly one
//! shape in a fixed priority order and reports either a record, an empty
//! result, or the raw payload when nothing matched.

pub mod address;
pub mod building;
pub mod envelope;
pub mod error;
pub mod jimok;
pub mod land;
pub mod lenient;
pub mod pnu;
pub mod price;
pub mod unit;
pub mod usage;

pub use address::{normalize_address_results, AddressCandidate};
pub use building::{
    land_share_page, normalize_building_title, normalize_unit_entries, BuildingRecord,
    BuildingSummary, LandShare, LandShareEntry, Page, UnitEntry, UnitListing, UnitLookup,
    UnitRecord, UnitSource,
};
pub use envelope::Normalized;
pub use error::{ErrorKind, LookupError};
pub use jimok::land_category_name;
pub use land::{normalize_land_info, LandRecord};
pub use pnu::{LandType, Pnu, RegistryCodes};
pub use price::{normalize_land_price, PriceRecord, DEFAULT_REFERENCE_YEAR};
pub use unit::{normalize_label, UnitQuery};
pub use usage::{classify_usage, normalize_land_usage, UsageEntry, UsageRecord, UsageStrategy};
