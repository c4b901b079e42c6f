//! Wire-level payload types for the Flincap API.
//!
//! # Design
//! Success payloads are not given a schema here: the upstream API owns their
//! shape, so they are returned as a raw JSON object. Only the error envelope
//! has a fixed form.

use serde::{Deserialize, Serialize};

/// A decoded JSON object, returned verbatim from successful calls.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Error body sent with every non-200 response. Missing fields decode as
/// empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}
