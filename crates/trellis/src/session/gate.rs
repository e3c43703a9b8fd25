//! Admission check for new sessions.

use trellis_core::{Envelope, Relay};
use trellis_net::geo::GeoLocator;
use trellis_net::ip::{GateVerdict, IpGate, is_valid_ip_address};

use super::events::{LogEvent, SessionMessage, SessionPayload};
use super::service::SessionService;
use super::SessionRecord;
use crate::error::Result;
use crate::settings::AppSettings;

/// Sender tag on the gate's log requests.
pub const GATE_SENDER: &str = "SessionGate";

/// Result of admitting a session.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub verdict: GateVerdict,
    /// Where to send a denied visitor. `None` when admitted.
    pub redirect: Option<String>,
    /// The session as logged, address suffixed with the verdict.
    pub session: SessionRecord,
}

impl GateOutcome {
    pub fn is_denied(&self) -> bool {
        self.verdict.is_denied()
    }
}

/// Geolocates, classifies and logs a visitor's session.
pub struct SessionGate<G> {
    relay: Relay,
    locator: G,
    gate: IpGate,
    api_key: String,
    locate: bool,
    check_country: bool,
}

impl<G> std::fmt::Debug for SessionGate<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("gate", &self.gate)
            .field("locate", &self.locate)
            .field("check_country", &self.check_country)
            .finish_non_exhaustive()
    }
}

impl<G: GeoLocator> SessionGate<G> {
    /// A gate with default lists that locates every address and only
    /// admits included countries.
    pub fn new(relay: Relay, locator: G, api_key: impl Into<String>) -> Self {
        Self {
            relay,
            locator,
            gate: IpGate::default(),
            api_key: api_key.into(),
            locate: true,
            check_country: true,
        }
    }

    /// A gate configured from the `features`, `keys` and `gate` settings.
    pub fn from_settings(relay: Relay, locator: G, settings: &AppSettings) -> Self {
        Self {
            relay,
            locator,
            gate: settings.gate.ip_gate(),
            api_key: settings.keys.ipapi_key.clone(),
            locate: settings.features.get_ip_location,
            check_country: settings.features.filter_for_us_only,
        }
    }

    pub fn with_gate(mut self, gate: IpGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn ip_gate(&self) -> &IpGate {
        &self.gate
    }

    /// Admit the current session of `service`.
    ///
    /// An unverified session with a valid public address is geolocated
    /// first. The address is then classified against the exclusion list
    /// and, when country filtering is on, the included countries. The
    /// verdict suffix is appended to the address, the session is stored
    /// back into `service` and a `SessionLogRequest` is published.
    ///
    /// Geolocation and logging errors propagate; the session is left
    /// unchanged when geolocation fails.
    #[tracing::instrument(skip_all, target = "trellis::session", level = "debug")]
    pub async fn admit(&self, service: &SessionService) -> Result<GateOutcome> {
        let mut session = service
            .current()
            .unwrap_or_else(|| service.ensure_session("unknown", "unknown"));

        if self.locate && !session.verified && is_valid_ip_address(&session.ip_address) {
            let location = self
                .locator
                .lookup(&session.ip_address, &self.api_key)
                .await
                .inspect_err(|err| {
                    tracing::warn!(
                        target: "trellis::session",
                        error = %err,
                        session = %session.to_json(),
                        "geolocation failed"
                    );
                })?;
            session.city = location.city;
            session.state = location.region_name;
            session.country_code = location.country_code;
            session.verified = true;
        }

        let verdict = if self.gate.is_excluded(&session.ip_address) {
            GateVerdict::Excluded
        } else if self.check_country && !self.gate.is_included_country(&session.country_code) {
            GateVerdict::Foreign
        } else {
            GateVerdict::Ok
        };
        session.ip_address.push_str(verdict.suffix());
        service.set_current(session.clone());

        let msg: SessionMessage = Envelope::new(GATE_SENDER, LogEvent::SessionLogRequest.token())
            .with_payload(SessionPayload::Session(session.clone()));
        self.relay.publish(&msg)?;

        tracing::info!(
            target: "trellis::session",
            session_id = %session.session_id,
            address = %session.ip_address,
            country = %session.country_code,
            ?verdict,
            "session admitted"
        );
        Ok(GateOutcome {
            verdict,
            redirect: verdict.is_denied().then(|| self.gate.redirect().to_string()),
            session,
        })
    }
}
