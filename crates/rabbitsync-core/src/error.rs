// ── Reconciliation error taxonomy ──
//
// Every fatal error carries the operation, the object kind, and the
// natural key, so the declarative engine can render an actionable
// diagnostic without this crate formatting prose for it. Absence
// (404 on read) is NOT in this taxonomy: reads report it through
// `ReadOutcome::Absent` and deletes swallow it as idempotent success.

use std::fmt;

use thiserror::Error;

use crate::kind::ResourceKind;

/// The reconciler operation during which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        })
    }
}

/// Unified error type for reconciler operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Transport-level failure reaching the broker (network, DNS, TLS).
    /// Never retried here; the caller owns retry policy.
    #[error("cannot reach broker during {op} of {kind} {key}: {reason}")]
    RemoteUnavailable {
        op: Op,
        kind: ResourceKind,
        key: String,
        reason: String,
    },

    /// The broker answered with a non-404 4xx/5xx. The body is kept
    /// verbatim so broker-side validation failures stay diagnosable.
    #[error("broker rejected {op} of {kind} {key} (HTTP {status}): {body}")]
    RemoteRejected {
        op: Op,
        kind: ResourceKind,
        key: String,
        status: u16,
        body: String,
    },

    /// An import token failed structural validation. Raised before any
    /// broker call; no partial state is committed.
    #[error("malformed import identifier for {kind}: expected format {expected}, got {got:?}")]
    MalformedIdentifier {
        kind: ResourceKind,
        expected: &'static str,
        got: String,
    },

    /// Declared attributes failed local validation, pre-flight.
    #[error("invalid configuration for {kind} {key}: {message}")]
    ConfigurationInvalid {
        kind: ResourceKind,
        key: String,
        message: String,
    },
}

impl ReconcileError {
    /// Map a gateway error into the taxonomy.
    ///
    /// Callers intercept `NotFound` before classification wherever it
    /// has state meaning (reads, deletes); if one slips through (e.g. a
    /// put against a vanished vhost) it is reported as a 404 rejection.
    pub(crate) fn classify(
        err: rabbitsync_api::Error,
        op: Op,
        kind: ResourceKind,
        key: impl Into<String>,
    ) -> Self {
        match err {
            rabbitsync_api::Error::Rejected { status, body } => Self::RemoteRejected {
                op,
                kind,
                key: key.into(),
                status,
                body,
            },
            rabbitsync_api::Error::NotFound => Self::RemoteRejected {
                op,
                kind,
                key: key.into(),
                status: 404,
                body: "object not found".into(),
            },
            other => Self::RemoteUnavailable {
                op,
                kind,
                key: key.into(),
                reason: other.to_string(),
            },
        }
    }
}
