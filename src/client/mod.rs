//! Client layer: authenticated HTTP calls to the PureSMS gateway.
//!
//! The [`GatewayClient`] issues the requests; the [`SmsGateway`] trait is the
//! seam the dispatch engine consumes, so tests can substitute a fake gateway
//! the same way this module's tests substitute a fake HTTP transport.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ApiKey, BulkAck, BulkRequest, EndpointUrl, SendAck, SendRequest};

const SEND_PATH: &str = "sms/send";
const SEND_BULK_PATH: &str = "sms/send/bulk";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
/// The gateway could not be reached at all (DNS, TLS, timeout, connection
/// reset). Distinct from a gateway *response* carrying a failure status,
/// which is a [`GatewayResponse`] with `is_success() == false`.
pub struct TransportFailure(#[source] pub Box<dyn StdError + Send + Sync>);

#[derive(Debug, Clone)]
/// Raw HTTP exchange result, kept for diagnostics alongside the decoded ack.
pub struct GatewayResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl GatewayResponse {
    /// Whether the gateway reported success (2xx).
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
/// Result of one `sms/send` call: the raw response plus the decoded ack when
/// the body parsed as JSON.
pub struct SendOutcome {
    pub response: GatewayResponse,
    pub ack: Option<SendAck>,
}

#[derive(Debug, Clone)]
/// Result of one `sms/send/bulk` call.
pub struct BulkOutcome {
    pub response: GatewayResponse,
    pub ack: Option<BulkAck>,
}

/// Gateway seam consumed by the dispatch engine.
pub trait SmsGateway: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a SendRequest,
    ) -> BoxFuture<'a, Result<SendOutcome, TransportFailure>>;

    fn send_bulk<'a>(
        &'a self,
        request: &'a BulkRequest,
    ) -> BoxFuture<'a, Result<BulkOutcome, TransportFailure>>;
}

trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        api_key: &'a ApiKey,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<GatewayResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        api_key: &'a ApiKey,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<GatewayResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(ApiKey::HEADER, api_key.as_str())
                .json(&body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_owned(),
                        value.to_str().unwrap_or_default().to_owned(),
                    )
                })
                .collect();
            let body = response.text().await?;
            Ok(GatewayResponse {
                status,
                headers,
                body,
            })
        })
    }
}

#[derive(Debug, Clone)]
/// Builder for [`GatewayClient`].
///
/// Use this when you need to customize the endpoint, timeout, or user-agent.
pub struct GatewayClientBuilder {
    api_key: ApiKey,
    endpoint: EndpointUrl,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl GatewayClientBuilder {
    /// Create a builder with the default endpoint and no timeout/user-agent
    /// override.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: EndpointUrl::default(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the gateway base URL.
    pub fn endpoint(mut self, endpoint: EndpointUrl) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set an HTTP client timeout applied to the entire request. Without one,
    /// a hung gateway is only bounded by the OS-level connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`GatewayClient`].
    pub fn build(self) -> Result<GatewayClient, TransportFailure> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| TransportFailure(Box::new(err)))?;

        Ok(GatewayClient {
            api_key: self.api_key,
            send_url: self.endpoint.join(SEND_PATH),
            bulk_url: self.endpoint.join(SEND_BULK_PATH),
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Authenticated PureSMS HTTP client.
///
/// Every call posts JSON with the `X-API-Key` header and returns the raw
/// response plus the decoded ack; interpreting non-success statuses and
/// missing ids is the dispatcher's concern.
pub struct GatewayClient {
    api_key: ApiKey,
    send_url: String,
    bulk_url: String,
    http: Arc<dyn HttpTransport>,
}

impl GatewayClient {
    /// Create a client against the default endpoint.
    ///
    /// For more customization, use [`GatewayClient::builder`].
    pub fn new(api_key: ApiKey) -> Self {
        let endpoint = EndpointUrl::default();
        Self {
            api_key,
            send_url: endpoint.join(SEND_PATH),
            bulk_url: endpoint.join(SEND_BULK_PATH),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> GatewayClientBuilder {
        GatewayClientBuilder::new(api_key)
    }

    /// Submit one message to `sms/send`.
    ///
    /// Errors only on transport failure; a gateway response with any HTTP
    /// status is a success-value carrying that status.
    pub async fn send(&self, request: &SendRequest) -> Result<SendOutcome, TransportFailure> {
        let body = crate::transport::encode_send_body(request);
        let response = self
            .http
            .post_json(&self.send_url, &self.api_key, body)
            .await
            .map_err(TransportFailure)?;

        let ack = decode_if_success(&response, crate::transport::decode_send_ack);
        Ok(SendOutcome { response, ack })
    }

    /// Submit a batch to `sms/send/bulk`.
    pub async fn send_bulk(&self, request: &BulkRequest) -> Result<BulkOutcome, TransportFailure> {
        let body = crate::transport::encode_bulk_body(request);
        let response = self
            .http
            .post_json(&self.bulk_url, &self.api_key, body)
            .await
            .map_err(TransportFailure)?;

        let ack = decode_if_success(&response, crate::transport::decode_bulk_ack);
        Ok(BulkOutcome { response, ack })
    }
}

impl SmsGateway for GatewayClient {
    fn send<'a>(
        &'a self,
        request: &'a SendRequest,
    ) -> BoxFuture<'a, Result<SendOutcome, TransportFailure>> {
        Box::pin(self.send(request))
    }

    fn send_bulk<'a>(
        &'a self,
        request: &'a BulkRequest,
    ) -> BoxFuture<'a, Result<BulkOutcome, TransportFailure>> {
        Box::pin(self.send_bulk(request))
    }
}

fn decode_if_success<T>(
    response: &GatewayResponse,
    decode: impl FnOnce(&str) -> Result<T, crate::transport::DecodeError>,
) -> Option<T> {
    if !response.is_success() {
        return None;
    }
    match decode(&response.body) {
        Ok(ack) => Some(ack),
        Err(err) => {
            tracing::debug!(status = response.status, error = %err, "gateway 2xx body did not decode");
            None
        }
    }
}
