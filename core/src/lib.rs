//! Blocking client for the Flincap cryptocurrency-exchange API.
//!
//! # Overview
//! `FlincapClient` exposes the five Flincap endpoints (rate lookup, exchange
//! info, transaction creation, transaction lookup, transaction history).
//! Every call builds an `HttpRequest`, sends it through a `Transport`, and
//! decodes the body as a JSON object or the API's error envelope.
//!
//! # Design
//! - `FlincapClient` holds only immutable configuration and a transport
//!   handle, so one client can be shared by many threads.
//! - Requests and responses are plain data; `build_*` and the `parse_*`
//!   functions are usable without a network.
//! - Success payloads are returned as `JsonObject` because the upstream owns
//!   their schema.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{parse_acknowledgement, parse_object, FlincapClient, DEFAULT_BASE_URL};
pub use error::{DecodeContext, FlincapError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ClientConfig, Transport, UreqTransport};
pub use types::{ErrorEnvelope, JsonObject};
