//! Blocking transports that execute an `HttpRequest`.
//!
//! # Design
//! `Transport` is the single I/O seam of the crate. `UreqTransport` wraps a
//! `ureq::Agent`, which is a cheaply cloned handle over a shared connection
//! pool and safe to use from many threads at once. The agent is configured
//! with `http_status_as_error(false)` so 4xx/5xx responses come back as data
//! and the client can decode the error envelope.

use std::time::Duration;

use crate::error::{FlincapError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip on the calling thread.
///
/// Implementations must read the response body to the end before returning,
/// so no connection outlives the call.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Transport-level settings. `None` disables the corresponding limit.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound for the whole call, from connect to the last body byte.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Largest response body the transport will read. `None` reads bodies of
    /// any size.
    pub max_body_size: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            max_body_size: None,
        }
    }
}

/// Default transport backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    max_body_size: u64,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .timeout_connect(config.connect_timeout)
            .build()
            .new_agent();
        Self {
            agent,
            max_body_size: config.max_body_size.unwrap_or(u64::MAX),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&request.url), &request.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&request.url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&request.url), &request.headers).send_empty()
            }
        };
        let mut response = result.map_err(FlincapError::transport)?;

        let status = response.status().as_u16();
        // ureq caps reads at 10 MiB unless told otherwise.
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_size)
            .read_to_string()
            .map_err(FlincapError::transport)?;

        Ok(HttpResponse { status, body })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
