//! Outbound calls to the public land-data APIs
//!
//! Handlers never talk HTTP directly: every call goes through [`Upstream`]
//! so tests can substitute canned payloads.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use parcel_core::LookupError;
use serde_json::Value;
use tracing::debug;

use crate::config::{ApiKeys, AppConfig, Endpoints};

const SHORT_TIMEOUT: Duration = Duration::from_secs(10);
const LONG_TIMEOUT: Duration = Duration::from_secs(15);

/// Every upstream operation the server uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Api {
    /// juso addrLinkApi
    Address,
    /// VWorld ladfrlList
    LandInfo,
    /// VWorld getIndvdLandPriceAttr
    LandPrice,
    /// VWorld getLandUseAttr
    LandUse,
    /// VWorld ldaregList
    LandShare,
    /// data.go.kr getBrTitleInfo
    BuildingTitle,
    /// data.go.kr getBrExposPubuseAreaInfo
    BuildingUnitArea,
}

impl Api {
    pub fn operation(&self) -> &'static str {
        match self {
            Api::Address => "addrLinkApi",
            Api::LandInfo => "ladfrlList",
            Api::LandPrice => "getIndvdLandPriceAttr",
            Api::LandUse => "getLandUseAttr",
            Api::LandShare => "ldaregList",
            Api::BuildingTitle => "getBrTitleInfo",
            Api::BuildingUnitArea => "getBrExposPubuseAreaInfo",
        }
    }

    pub fn timeout(&self) -> Duration {
        match self {
            Api::LandShare | Api::BuildingUnitArea => LONG_TIMEOUT,
            _ => SHORT_TIMEOUT,
        }
    }

    fn url(&self, endpoints: &Endpoints) -> String {
        match self {
            Api::Address => endpoints.juso.clone(),
            Api::LandInfo | Api::LandPrice | Api::LandUse | Api::LandShare => {
                format!("{}/{}", endpoints.vworld, self.operation())
            }
            Api::BuildingTitle | Api::BuildingUnitArea => {
                format!("{}/{}", endpoints.building, self.operation())
            }
        }
    }

    /// Credential parameter name and value
    fn credential<'a>(&self, keys: &'a ApiKeys) -> (&'static str, &'a str) {
        match self {
            Api::Address => ("confmKey", keys.address.as_str()),
            Api::LandInfo | Api::LandPrice | Api::LandUse | Api::LandShare => {
                ("key", keys.vworld.as_str())
            }
            Api::BuildingTitle | Api::BuildingUnitArea => ("serviceKey", keys.building.as_str()),
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// One outbound call, without credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub api: Api,
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Value of a parameter, if set
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Perform the call and decode the body as JSON.
    async fn fetch(&self, request: UpstreamRequest) -> Result<Value, LookupError>;
}

/// reqwest-backed upstream
pub struct HttpUpstream {
    client: reqwest::Client,
    keys: ApiKeys,
    endpoints: Endpoints,
}

impl HttpUpstream {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            keys: config.keys.clone(),
            endpoints: config.endpoints.clone(),
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, request: UpstreamRequest) -> Result<Value, LookupError> {
        let api = request.api;
        let url = api.url(&self.endpoints);
        debug!(api = %api, params = ?request.params, "calling upstream");

        let (key_name, key) = api.credential(&self.keys);
        let response = self
            .client
            .get(&url)
            .query(&[(key_name, key)])
            .query(&request.params)
            .timeout(api.timeout())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Upstream(format!("{} 요청 시간이 초과되었습니다", api))
                } else {
                    LookupError::Upstream(format!("{} 요청 실패: {}", api, e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Upstream(format!("{} 응답 수신 실패: {}", api, e)))?;

        serde_json::from_str(&body).map_err(|e| {
            LookupError::Upstream(format!(
                "{} 응답을 해석할 수 없습니다 (HTTP {}): {}",
                api,
                status.as_u16(),
                e
            ))
        })
    }
}
