//! Blocking client for the Flincap exchange API.
//!
//! # Design
//! `FlincapClient` holds a base URL, an optional bearer token and a
//! transport, and never mutates any of them once built. Each operation is a
//! `build_*` method that produces an `HttpRequest`, one shared `execute`
//! round-trip, and one of the two parsers `parse_object` and
//! `parse_acknowledgement`. Path segments and query values
//! are percent-encoded while the URL is assembled.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{DecodeContext, FlincapError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ClientConfig, Transport, UreqTransport};
use crate::types::{ErrorEnvelope, JsonObject};

pub const DEFAULT_BASE_URL: &str = "https://flincap.app";

/// Synchronous client for the Flincap API.
///
/// Safe to share between threads when the transport is: calls only read the
/// client's configuration.
#[derive(Debug, Clone)]
pub struct FlincapClient<T = UreqTransport> {
    base_url: String,
    token: Option<String>,
    transport: T,
}

impl FlincapClient<UreqTransport> {
    /// Create a client for the production API. An empty `token` makes every
    /// request unauthenticated.
    pub fn new(token: &str) -> Self {
        Self::with_config(token, &ClientConfig::default())
    }

    pub fn with_config(token: &str, config: &ClientConfig) -> Self {
        Self::with_transport(token, UreqTransport::new(config))
    }
}

impl<T: Transport> FlincapClient<T> {
    pub fn with_transport(token: &str, transport: T) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: (!token.is_empty()).then(|| token.to_string()),
            transport,
        }
    }

    /// Point the client at a different host, e.g. a sandbox or a local mock.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// GET /v1/get-rate?selectedCrypt={crypto}&selectedFiat={fiat}
    pub fn get_rate(&self, crypto: &str, fiat: &str) -> Result<JsonObject> {
        let request = self.build_get_rate(crypto, fiat)?;
        parse_object(self.execute(&request)?)
    }

    /// GET /v1/get-exchange
    pub fn get_exchange(&self) -> Result<JsonObject> {
        let request = self.build_get_exchange()?;
        parse_object(self.execute(&request)?)
    }

    /// POST /v1/create-transaction
    ///
    /// Succeeds on a 200 status whatever the response body holds.
    pub fn create_transaction<B: Serialize + ?Sized>(&self, data: &B) -> Result<()> {
        let request = self.build_create_transaction(data)?;
        parse_acknowledgement(self.execute(&request)?)
    }

    /// GET /v1/get-transactions/{id}
    pub fn get_transaction(&self, id: &str) -> Result<JsonObject> {
        let request = self.build_get_transaction(id)?;
        parse_object(self.execute(&request)?)
    }

    /// GET /api/v1/get-transactions?transactionType={kind}&selectedFiat={fiat}
    ///
    /// The `/api` prefix differs from the other routes; it is what the
    /// upstream serves.
    pub fn get_transaction_history(&self, kind: &str, fiat: &str) -> Result<JsonObject> {
        let request = self.build_get_transaction_history(kind, fiat)?;
        parse_object(self.execute(&request)?)
    }

    // -----------------------------------------------------------------------
    // Request building
    // -----------------------------------------------------------------------

    pub fn build_get_rate(&self, crypto: &str, fiat: &str) -> Result<HttpRequest> {
        let url = self.endpoint(
            &["v1", "get-rate"],
            &[("selectedCrypt", crypto), ("selectedFiat", fiat)],
        )?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_get_exchange(&self) -> Result<HttpRequest> {
        let url = self.endpoint(&["v1", "get-exchange"], &[])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_create_transaction<B: Serialize + ?Sized>(&self, data: &B) -> Result<HttpRequest> {
        let body = serde_json::to_string(data).map_err(FlincapError::Encode)?;
        let url = self.endpoint(&["v1", "create-transaction"], &[])?;
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    pub fn build_get_transaction(&self, id: &str) -> Result<HttpRequest> {
        let url = self.endpoint(&["v1", "get-transactions", id], &[])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_get_transaction_history(&self, kind: &str, fiat: &str) -> Result<HttpRequest> {
        let url = self.endpoint(
            &["api", "v1", "get-transactions"],
            &[("transactionType", kind), ("selectedFiat", fiat)],
        )?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Run one round-trip through the transport. Any status is returned as
    /// data; only transport failures are errors here.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    /// Absolute URL for `segments` under the base URL, with `query` appended
    /// in order. Both are percent-encoded.
    ///
    /// Empty, `.` and `..` segments are rejected: URL normalization would
    /// resolve them against the route instead of sending them as data.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        if let Some(segment) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(FlincapError::Construction(format!(
                "path segment {segment:?} does not name a resource"
            )));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FlincapError::Construction(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| FlincapError::Construction(format!("base URL {:?} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Attach the headers every request carries.
    fn request(&self, method: HttpMethod, url: Url, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        }
    }
}

/// Decode a 200 body as a JSON object, or the error envelope otherwise.
pub fn parse_object(response: HttpResponse) -> Result<JsonObject> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|source| FlincapError::Decode {
        context: DecodeContext::ResponseData,
        source,
    })
}

/// Accept any 200 response without looking at its body.
pub fn parse_acknowledgement(response: HttpResponse) -> Result<()> {
    check_status(&response)
}

/// Turn a non-200 response into `FlincapError::Api`, or `Decode` when the
/// body is not an error envelope.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.status == 200 {
        return Ok(());
    }
    let envelope: ErrorEnvelope =
        serde_json::from_str(&response.body).map_err(|source| FlincapError::Decode {
            context: DecodeContext::ErrorResponse,
            source,
        })?;
    Err(FlincapError::Api {
        status: response.status,
        message: envelope.message,
        code: envelope.code,
    })
}
