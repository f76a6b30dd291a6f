//! Map transport and HTTP failures onto classifier signals.

use crate::classify::{FailureSignal, ECONNABORTED, ECONNREFUSED};

use super::types::OpenAIErrorResponse;

/// Signal for a request that never produced an HTTP response.
pub fn signal_from_transport(err: &reqwest::Error) -> FailureSignal {
    if err.is_timeout() {
        FailureSignal::network(ECONNABORTED, err.to_string())
    } else if err.is_connect() {
        FailureSignal::network(ECONNREFUSED, err.to_string())
    } else {
        FailureSignal::Other(err.to_string())
    }
}

/// Signal for a non-success HTTP response.
///
/// The upstream `error.message` is used as detail when the body carries one.
pub fn signal_from_status(status: u16, body: &str) -> FailureSignal {
    let detail = serde_json::from_str::<OpenAIErrorResponse>(body)
        .ok()
        .map(|r| r.error.message)
        .filter(|m| !m.trim().is_empty());
    FailureSignal::status(status, detail)
}
