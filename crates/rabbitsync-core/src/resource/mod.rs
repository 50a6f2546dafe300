// ── Resource reconcilers ──
//
// One contract, five independent implementations. Each reconciler is
// handed an explicit `&ManagementClient` at construction — there is no
// ambient client and no shared state across instances. Every operation
// is a single broker round trip with no retries; the declarative
// engine owns retry and ordering policy.

pub mod exchange;
pub mod permission;
pub mod topic_permission;
pub mod user;
pub mod vhost;

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::kind::ResourceKind;

/// Vhost used when the declaration leaves the field unset.
pub const DEFAULT_VHOST: &str = "/";

/// Result of a Read against the broker.
///
/// `Absent` means the broker answered 404 (or, for collection-scoped
/// reads, returned no matching entry): the object was removed
/// out-of-band. That is a state signal — the caller drops its tracked
/// record exactly as if Delete had run — never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadOutcome<T> {
    Found(T),
    Absent,
}

impl<T> ReadOutcome<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }
}

/// The reconciliation contract, instantiated once per object kind.
///
/// `Desired` is the declared configuration as authored; `Observed` is
/// the record persisted by the declarative engine between cycles. The
/// engine drives the state machine: Create on first declare, periodic
/// Reads to refresh, Update for in-place deltas, destroy-then-create
/// when [`Reconcile::requires_replace`] says a delta cannot be applied
/// in place, Delete on undeclare, and Import to seed tracking from an
/// externally supplied token (key fields only — the next Read fills in
/// the rest).
#[allow(async_fn_in_trait)]
pub trait Reconcile {
    type Desired;
    type Observed: Clone;

    const KIND: ResourceKind;

    /// Validate and normalize the declaration, then declare the object
    /// on the broker. Returns the record to store as observed state.
    async fn create(&self, desired: &Self::Desired) -> Result<Self::Observed, ReconcileError>;

    /// Refresh the record from the broker. The broker is authoritative
    /// for every attribute it can report.
    async fn read(
        &self,
        prior: &Self::Observed,
    ) -> Result<ReadOutcome<Self::Observed>, ReconcileError>;

    /// Re-declare with the merged attribute set (changed fields from
    /// `desired`, the rest carried from `prior`). Only meaningful for
    /// attributes that are not replace-only.
    async fn update(
        &self,
        desired: &Self::Desired,
        prior: &Self::Observed,
    ) -> Result<Self::Observed, ReconcileError>;

    /// Remove the object. A broker 404 counts as success: the object
    /// was already gone, and deleting twice must not fail.
    async fn delete(&self, observed: &Self::Observed) -> Result<(), ReconcileError>;

    /// Decode an import token into a record seeded with key fields only.
    fn import(token: &str) -> Result<Self::Observed, ReconcileError>;

    /// Whether the delta between declaration and record can only be
    /// applied by destroying and recreating the object.
    fn requires_replace(desired: &Self::Desired, observed: &Self::Observed) -> bool;
}

// ── Shared normalization helpers ────────────────────────────────────

/// Drop empty entries from a declared tag list.
pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter().filter(|t| !t.is_empty()).cloned().collect()
}

/// Declared vhost, or the root vhost when unset.
pub(crate) fn vhost_or_default(vhost: Option<&str>) -> String {
    match vhost {
        Some(v) => v.to_owned(),
        None => DEFAULT_VHOST.to_owned(),
    }
}

/// Pre-flight check for a single-field natural key.
pub(crate) fn require_nonempty(
    kind: ResourceKind,
    field: &str,
    value: &str,
) -> Result<(), ReconcileError> {
    if value.is_empty() {
        return Err(ReconcileError::ConfigurationInvalid {
            kind,
            key: String::new(),
            message: format!("{field} must not be empty"),
        });
    }
    Ok(())
}
