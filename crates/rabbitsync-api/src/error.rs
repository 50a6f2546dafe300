use thiserror::Error;

/// Top-level error type for the `rabbitsync-api` crate.
///
/// Covers every failure mode of a single management-API round trip:
/// transport, TLS/client construction, HTTP rejection, and payload
/// decoding. `rabbitsync-core` maps these into its reconciliation
/// taxonomy; a 404 is deliberately its own variant because the core
/// treats "not found" as a state signal, not a failure.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured endpoint cannot serve as a base for API paths.
    #[error("Invalid management endpoint: {0}")]
    InvalidEndpoint(String),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Management API ──────────────────────────────────────────────
    /// The broker answered 404 for the addressed object.
    #[error("object not found (HTTP 404)")]
    NotFound,

    /// The broker rejected the request with a non-404 4xx/5xx.
    /// The body is kept verbatim for caller-side diagnostics.
    #[error("management API rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error is the broker saying "no such object".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns `true` for transport-level failures (the broker was
    /// never reached or never answered).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }
}
