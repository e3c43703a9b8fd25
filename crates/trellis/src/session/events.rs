//! Relay vocabulary shared by the session components.

use std::fmt;

use trellis_core::Envelope;

use super::SessionRecord;

/// Requests and responses handled by the log manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogEvent {
    /// Reply to [`LogEvent::GetLogDataRequest`], carrying every logged session.
    GetLogDataResponse,
    /// Ask for every logged session.
    GetLogDataRequest,
    /// Delete every logged session.
    EraseLogRequest,
    /// Append the carried session to the log.
    SessionLogRequest,
}

impl LogEvent {
    pub const ALL: [LogEvent; 4] = [
        LogEvent::GetLogDataResponse,
        LogEvent::GetLogDataRequest,
        LogEvent::EraseLogRequest,
        LogEvent::SessionLogRequest,
    ];

    /// Envelope token for this event.
    pub const fn token(self) -> &'static str {
        match self {
            LogEvent::GetLogDataResponse => "GetLogDataResponse",
            LogEvent::GetLogDataRequest => "GetLogDataRequest",
            LogEvent::EraseLogRequest => "EraseLogRequest",
            LogEvent::SessionLogRequest => "SessionLogRequest",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.token() == token)
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Events published by the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterEvent {
    CounterIncrement,
}

impl CounterEvent {
    pub const fn token(self) -> &'static str {
        match self {
            CounterEvent::CounterIncrement => "CounterIncrement",
        }
    }
}

impl fmt::Display for CounterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Payload carried by session envelopes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPayload {
    Count(u64),
    Session(SessionRecord),
    Sessions(Vec<SessionRecord>),
}

/// The envelope every session component publishes and subscribes to.
pub type SessionMessage = Envelope<SessionPayload>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for event in LogEvent::ALL {
            assert_eq!(LogEvent::from_token(event.token()), Some(event));
        }
        assert_eq!(LogEvent::from_token("CounterIncrement"), None);
        assert_eq!(CounterEvent::CounterIncrement.to_string(), "CounterIncrement");
    }
}
