// ── Secret rotation tracking ──
//
// The user password is write-only: the broker stores a hash, the
// observed state stores neither. Whether an update must push new
// credential bytes is decided *solely* by the caller-supplied rotation
// version marker; the plaintext value never enters the comparison.

use secrecy::{ExposeSecret, SecretString};

use rabbitsync_api::hash;
use rabbitsync_api::models::UserInfo;

/// Outcome of comparing the declared rotation marker with the one
/// recorded at the last successful reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// Markers match: round-trip the broker's stored hash unchanged.
    Unchanged,
    /// Markers differ: hash the write-only password afresh.
    Rotate,
}

/// Compare rotation version markers.
pub fn evaluate(declared_version: &str, observed_version: &str) -> RotationDecision {
    if declared_version == observed_version {
        RotationDecision::Unchanged
    } else {
        RotationDecision::Rotate
    }
}

/// Credential fields for the outgoing full-settings payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    pub password_hash: String,
    pub hashing_algorithm: String,
}

/// Resolve the credential fields to submit.
///
/// The broker requires a complete settings document on every put, so
/// even a no-rotation update must carry the hash — byte-for-byte the
/// one the broker already stores.
pub fn resolve(
    decision: RotationDecision,
    password: &SecretString,
    current: &UserInfo,
) -> PasswordCredentials {
    match decision {
        RotationDecision::Unchanged => PasswordCredentials {
            password_hash: current.password_hash.clone(),
            hashing_algorithm: current.hashing_algorithm.clone(),
        },
        RotationDecision::Rotate => PasswordCredentials {
            password_hash: hash::salted_password_hash_sha256(password.expose_secret()),
            hashing_algorithm: hash::HASHING_ALGORITHM_SHA256.to_owned(),
        },
    }
}
