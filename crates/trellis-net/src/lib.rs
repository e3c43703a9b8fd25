//! Networking for Trellis.
//!
//! - **HTTP client**: JSON-over-HTTP with a 30 second default timeout
//! - **IP validation**: public IPv4/IPv6 checks and integer conversion
//! - **IP gate**: exclusion list and country allow-list classification
//! - **Geolocation**: the [`geo::GeoLocator`] seam and an ipapi.com client
//!
//! # Example
//!
//! ```ignore
//! use trellis_net::geo::{GeoLocator, IpApiClient};
//! use trellis_net::ip::{is_valid_ip_address, IpGate};
//!
//! let address = "23.81.0.59";
//! let mut country = String::from("US");
//! if is_valid_ip_address(address) {
//!     let location = IpApiClient::new()?.lookup(address, "ACCESS_KEY").await?;
//!     country = location.country_code;
//! }
//!
//! let verdict = IpGate::default().classify(address, &country);
//! println!("{address}{}", verdict.suffix());
//! ```

pub mod error;
pub mod geo;
pub mod http;
pub mod ip;

pub use error::{NetworkError, Result};
pub use geo::{GeoLocation, GeoLocator, IpApiClient};
pub use http::{HttpClient, HttpClientBuilder};
pub use ip::{GateVerdict, IpGate, is_valid_ip_address};
