//! ipapi.com client and response model.

use serde::{Deserialize, Serialize};

use super::{GeoLocation, GeoLocator};
use crate::error::{NetworkError, Result};
use crate::http::HttpClient;

/// Public endpoint of the geolocation service.
pub const DEFAULT_BASE_URL: &str = "http://api.ipapi.com/api";

/// Parameters of one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpApiRequest {
    pub ip_address: String,
    pub access_key: String,
}

impl IpApiRequest {
    pub fn new(ip_address: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            access_key: access_key.into(),
        }
    }

    /// Request URL relative to `base_url` (without the access key).
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}/", base_url.trim_end_matches('/'), self.ip_address.trim())
    }
}

/// Full lookup document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpApiResponse {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    #[serde(rename = "type")]
    pub ip_type: Option<String>,
    pub continent_code: Option<String>,
    pub continent_name: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<Location>,
    pub time_zone: Option<TimeZone>,
    pub currency: Option<Currency>,
    pub connection: Option<Connection>,
    pub security: Option<Security>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub geoname_id: Option<i64>,
    pub capital: Option<String>,
    pub languages: Vec<Language>,
    pub country_flag: Option<String>,
    pub country_flag_emoji: Option<String>,
    pub country_flag_emoji_unicode: Option<String>,
    pub calling_code: Option<String>,
    pub is_eu: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub code: Option<String>,
    pub name: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeZone {
    pub id: Option<String>,
    pub current_time: Option<String>,
    pub gmt_offset: Option<i64>,
    pub code: Option<String>,
    pub is_daylight_saving: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub code: Option<String>,
    pub name: Option<String>,
    pub plural: Option<String>,
    pub symbol: Option<String>,
    pub symbol_native: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connection {
    pub asn: Option<i64>,
    pub isp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub is_proxy: bool,
    pub proxy_type: Option<serde_json::Value>,
    pub is_crawler: bool,
    pub crawler_name: Option<serde_json::Value>,
    pub crawler_type: Option<serde_json::Value>,
    pub is_tor: bool,
    pub threat_level: Option<String>,
    pub threat_types: Option<serde_json::Value>,
}

impl From<IpApiResponse> for GeoLocation {
    fn from(response: IpApiResponse) -> Self {
        Self {
            city: response.city.unwrap_or_default(),
            region_name: response.region_name.unwrap_or_default(),
            country_code: response.country_code.unwrap_or_default(),
        }
    }
}

/// Error document the service returns with a 200 status.
#[derive(Debug, Deserialize)]
struct ApiFailure {
    error: ApiFailureDetail,
}

#[derive(Debug, Deserialize)]
struct ApiFailureDetail {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiReply {
    Failure(ApiFailure),
    Success(IpApiResponse),
}

/// Geolocation client for ipapi.com.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    http: HttpClient,
    base_url: String,
}

impl IpApiClient {
    /// Client against the public endpoint with the default 30 s timeout.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(HttpClient::new()?))
    }

    /// Client sharing an existing HTTP client.
    pub fn with_client(http: HttpClient) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full lookup document.
    #[tracing::instrument(skip(self, request), target = "trellis_net::geo", fields(ip = %request.ip_address))]
    pub async fn location_info(&self, request: &IpApiRequest) -> Result<IpApiResponse> {
        let url = request.url(&self.base_url);
        let reply: ApiReply = self
            .http
            .get_json(&url, &[("access_key", request.access_key.as_str())])
            .await?;

        match reply {
            ApiReply::Success(response) => Ok(response),
            ApiReply::Failure(failure) => {
                tracing::warn!(
                    target: "trellis_net::geo",
                    code = failure.error.code,
                    "geolocation service returned an error"
                );
                Err(NetworkError::Api {
                    code: failure.error.code,
                    info: failure.error.info,
                })
            }
        }
    }
}

impl GeoLocator for IpApiClient {
    async fn lookup(&self, ip_address: &str, api_key: &str) -> Result<GeoLocation> {
        let request = IpApiRequest::new(ip_address, api_key);
        Ok(self.location_info(&request).await?.into())
    }
}
