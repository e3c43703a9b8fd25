//! IP geolocation.
//!
//! [`GeoLocator`] is the seam the session gate depends on; [`IpApiClient`]
//! implements it against the ipapi.com HTTP API.

mod ipapi;

pub use ipapi::{
    Connection, Currency, DEFAULT_BASE_URL, IpApiClient, IpApiRequest, IpApiResponse, Language,
    Location, Security, TimeZone,
};

use std::future::Future;

use crate::error::Result;

/// The parts of a geolocation answer a session records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLocation {
    pub city: String,
    pub region_name: String,
    pub country_code: String,
}

/// Resolves an IP address to a location.
///
/// Failures, including timeouts, propagate to the caller. Nothing is retried.
pub trait GeoLocator: Send + Sync {
    fn lookup(&self, ip_address: &str, api_key: &str)
    -> impl Future<Output = Result<GeoLocation>> + Send;
}
