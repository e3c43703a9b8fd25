//! Allow/deny classification of inbound sessions.

use super::is_valid_ip_address;

/// Where denied sessions are sent.
pub const REDIRECT_ADDRESS: &str = "https://www.dhs.gov/topics/cybersecurity";

/// Addresses denied outright. A trailing `*` matches any final octet.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "1.158.44.32",
    "103.52.193.124",
    "112.203.116.128",
    "129.211.164.19",
    "162.55.81.190",
    "164.160.119.40",
    "168.119.64.246",
    "168.119.68.*",
    "180.163.220.*",
    "183.36.114.97",
    "194.237.137.46",
    "195.154.122.*",
    "2.83.140.177",
    "202.142.85.66",
    "212.192.241.18",
    "51.37.185.179",
    "58.20.199.28",
    "58.251.94.154",
    "62.87.131.65",
    "81.40.154.73",
    "82.11.182.154",
    "83.90.139.*",
    "84.172.99.91",
    "86.84.99.85",
    "91.156.58.*",
    "95.70.128.*",
];

/// Countries allowed through the gate.
pub const DEFAULT_INCLUDED_COUNTRIES: &[&str] = &["US", "CA"];

/// Outcome of classifying a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Address is on the exclusion list.
    Excluded,
    /// Country is not on the inclusion list.
    Foreign,
    /// Allowed.
    Ok,
}

impl GateVerdict {
    /// Suffix appended to the logged address.
    pub fn suffix(&self) -> &'static str {
        match self {
            GateVerdict::Excluded => ":Ex",
            GateVerdict::Foreign => ":Foreign",
            GateVerdict::Ok => ":Ok",
        }
    }

    pub fn is_denied(&self) -> bool {
        !matches!(self, GateVerdict::Ok)
    }
}

/// Exclusion list plus country allow-list.
#[derive(Debug, Clone)]
pub struct IpGate {
    exclusions: Vec<String>,
    included_countries: Vec<String>,
    redirect: String,
}

impl Default for IpGate {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXCLUSIONS.iter().copied(),
            DEFAULT_INCLUDED_COUNTRIES.iter().copied(),
        )
    }
}

impl IpGate {
    pub fn new<E, C>(exclusions: E, included_countries: C) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            exclusions: exclusions.into_iter().map(Into::into).collect(),
            included_countries: included_countries.into_iter().map(Into::into).collect(),
            redirect: REDIRECT_ADDRESS.to_string(),
        }
    }

    /// Override the redirect address for denied sessions.
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = redirect.into();
        self
    }

    pub fn redirect(&self) -> &str {
        &self.redirect
    }

    /// Whether `address` is on the exclusion list.
    ///
    /// Addresses that are not public IPs are never excluded.
    pub fn is_excluded(&self, address: &str) -> bool {
        if !is_valid_ip_address(address) {
            return false;
        }
        let address = address.trim();
        self.exclusions.iter().any(|entry| match entry.split_once('*') {
            Some((prefix, _)) => address.starts_with(prefix),
            None => address == entry,
        })
    }

    /// Whether `country_code` is allowed (case-insensitive).
    pub fn is_included_country(&self, country_code: &str) -> bool {
        let code = country_code.trim();
        self.included_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }

    /// Exclusion takes precedence over the country check.
    pub fn classify(&self, address: &str, country_code: &str) -> GateVerdict {
        if self.is_excluded(address) {
            GateVerdict::Excluded
        } else if !self.is_included_country(country_code) {
            GateVerdict::Foreign
        } else {
            GateVerdict::Ok
        }
    }
}
