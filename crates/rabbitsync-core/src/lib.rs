// rabbitsync-core: converges declared broker topology (users, vhosts,
// permission grants, topic grants, exchanges) against a broker's actual
// state via the rabbitsync-api gateway.

pub mod error;
pub mod ident;
pub mod kind;
pub mod resource;
pub mod rotation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::{Op, ReconcileError};
pub use kind::ResourceKind;
pub use resource::{ReadOutcome, Reconcile};

pub use resource::exchange::{ExchangeConfig, ExchangeReconciler, ExchangeRecord};
pub use resource::permission::{PermissionConfig, PermissionReconciler, PermissionRecord};
pub use resource::topic_permission::{
    TopicPermissionConfig, TopicPermissionReconciler, TopicPermissionRecord,
};
pub use resource::user::{UserConfig, UserReconciler, UserRecord};
pub use resource::vhost::{VhostConfig, VhostReconciler, VhostRecord};
