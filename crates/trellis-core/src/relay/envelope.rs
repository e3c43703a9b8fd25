//! Multiplexing envelope carried over the relay.

/// An immutable message envelope.
///
/// Many unrelated request/response pairs share one envelope type on the
/// relay. The `token` names the request, while `sender` and
/// `correlation_key` let a subscriber pick out the messages meant for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<P> {
    sender: String,
    correlation_key: Option<String>,
    payload: Option<P>,
    token: String,
}

impl<P> Envelope<P> {
    /// Create an envelope with no correlation key and no payload.
    pub fn new(sender: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            correlation_key: None,
            payload: None,
            token: token.into(),
        }
    }

    /// Set the correlation key.
    pub fn with_correlation_key(mut self, key: impl Into<String>) -> Self {
        self.correlation_key = Some(key.into());
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn correlation_key(&self) -> Option<&str> {
        self.correlation_key.as_deref()
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Consume the envelope, returning its payload.
    pub fn into_payload(self) -> Option<P> {
        self.payload
    }

    pub fn is_token(&self, token: &str) -> bool {
        self.token == token
    }

    /// The usual subscriber filter: sender, correlation key and token all match.
    pub fn matches(&self, sender: &str, correlation_key: Option<&str>, token: &str) -> bool {
        self.sender == sender && self.correlation_key() == correlation_key && self.token == token
    }

    /// Build a reply that keeps this envelope's sender and correlation key.
    pub fn respond<Q>(&self, token: impl Into<String>, payload: Q) -> Envelope<Q> {
        Envelope {
            sender: self.sender.clone(),
            correlation_key: self.correlation_key.clone(),
            payload: Some(payload),
            token: token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let env = Envelope::new("Counter", "CounterIncrement")
            .with_correlation_key("session-1")
            .with_payload(5u64);

        assert_eq!(env.sender(), "Counter");
        assert_eq!(env.correlation_key(), Some("session-1"));
        assert_eq!(env.payload(), Some(&5));
        assert!(env.is_token("CounterIncrement"));
        assert!(env.matches("Counter", Some("session-1"), "CounterIncrement"));
        assert!(!env.matches("Counter", Some("session-2"), "CounterIncrement"));
        assert!(!env.matches("Counter", None, "CounterIncrement"));
    }

    #[test]
    fn test_respond_keeps_routing() {
        let request: Envelope<()> = Envelope::new("FetchData", "GetLogDataRequest")
            .with_correlation_key("abc");
        let response = request.respond("GetLogDataResponse", vec![1, 2, 3]);

        assert_eq!(response.sender(), "FetchData");
        assert_eq!(response.correlation_key(), Some("abc"));
        assert_eq!(response.token(), "GetLogDataResponse");
        assert_eq!(response.into_payload(), Some(vec![1, 2, 3]));
    }
}
