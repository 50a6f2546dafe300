// Management API HTTP client
//
// Wraps `reqwest::Client` with RabbitMQ-specific URL construction,
// basic-auth injection, and HTTP status classification. All endpoint
// groups (users, vhosts, permissions, …) are implemented as inherent
// methods via separate files to keep this module focused on transport
// mechanics.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the RabbitMQ management API.
///
/// Handles URL construction under `/api/`, percent-encoding of path
/// segments (vhost names routinely contain `/`), basic auth, and the
/// status classification the reconcilers rely on: success range → Ok,
/// 404 → [`Error::NotFound`], other ≥400 → [`Error::Rejected`] with
/// the body verbatim.
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl ManagementClient {
    /// Create a new client from an endpoint URL and credentials.
    ///
    /// The endpoint is the management listener root, e.g.
    /// `http://localhost:15672`; the `/api/` prefix is appended per
    /// request.
    pub fn new(
        endpoint: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, endpoint, username, password)
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: &str,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(endpoint)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(format!(
                "{endpoint} cannot serve as a base URL"
            )));
        }
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password,
        })
    }

    /// The management endpoint root.
    pub fn endpoint(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/{segments…}` with each segment percent-encoded.
    ///
    /// Encoding per segment matters: the default vhost is named `/`,
    /// which must travel as `%2F` rather than introducing a path level.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            // Constructor rejected cannot-be-a-base URLs.
            let mut parts = url
                .path_segments_mut()
                .expect("endpoint validated as base URL");
            parts.pop_if_empty();
            parts.push("api");
            for segment in segments {
                parts.push(segment);
            }
        }
        url
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.authed(self.http.get(url)).send().await?;
        let resp = Self::check_status(resp).await?;

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Send a PUT with a JSON body; the broker answers 201/204 with no
    /// payload on success.
    pub(crate) async fn put_json<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("PUT {url}");

        let resp = self.authed(self.http.put(url)).json(body).send().await?;
        Self::check_status(resp).await.map(|_| ())
    }

    /// Send a DELETE; 404 surfaces as [`Error::NotFound`] so callers can
    /// apply their own idempotency policy.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.authed(self.http.delete(url)).send().await?;
        Self::check_status(resp).await.map(|_| ())
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    /// Classify the response status: success passes the response
    /// through, 404 becomes `NotFound`, anything else ≥400 becomes
    /// `Rejected` carrying the raw body.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
