// Permission reconciler.
//
// Keyed on (user, vhost) — both replace-only. The three permission
// regexes update in place via the same put the create uses.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rabbitsync_api::ManagementClient;
use rabbitsync_api::models::Permissions;

use crate::error::{Op, ReconcileError};
use crate::ident;
use crate::kind::ResourceKind;
use crate::resource::{ReadOutcome, Reconcile, vhost_or_default};

/// Declared permission grant. The regex fields are required — there is
/// no implicit default for what a user may configure, write, or read.
#[derive(Debug, Clone)]
pub struct PermissionConfig {
    pub user: String,
    /// Defaults to the root vhost `/` when unset.
    pub vhost: Option<String>,
    pub configure: String,
    pub write: String,
    pub read: String,
}

/// Observed permission state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: String,
    pub user: String,
    pub vhost: String,
    pub configure: String,
    pub write: String,
    pub read: String,
}

/// Reconciler for permission grants.
pub struct PermissionReconciler<'a> {
    client: &'a ManagementClient,
}

impl<'a> PermissionReconciler<'a> {
    pub fn new(client: &'a ManagementClient) -> Self {
        Self { client }
    }
}

impl Reconcile for PermissionReconciler<'_> {
    type Desired = PermissionConfig;
    type Observed = PermissionRecord;

    const KIND: ResourceKind = ResourceKind::Permission;

    async fn create(&self, desired: &Self::Desired) -> Result<Self::Observed, ReconcileError> {
        let vhost = vhost_or_default(desired.vhost.as_deref());
        // Also rejects empty or delimiter-bearing key fields pre-flight.
        let id = ident::encode(Self::KIND, &[&desired.user, &vhost])?;

        debug!(user = %desired.user, vhost = %vhost, "creating permissions");
        self.put_permissions(desired, &vhost, &id, Op::Create).await?;

        Ok(PermissionRecord {
            id,
            user: desired.user.clone(),
            vhost,
            configure: desired.configure.clone(),
            write: desired.write.clone(),
            read: desired.read.clone(),
        })
    }

    async fn read(
        &self,
        prior: &Self::Observed,
    ) -> Result<ReadOutcome<Self::Observed>, ReconcileError> {
        debug!(user = %prior.user, vhost = %prior.vhost, "reading permissions");
        let perms = match self
            .client
            .get_permissions_in(&prior.vhost, &prior.user)
            .await
        {
            Ok(perms) => perms,
            Err(e) if e.is_not_found() => {
                warn!(
                    user = %prior.user,
                    vhost = %prior.vhost,
                    "permissions not found on broker, dropping from state"
                );
                return Ok(ReadOutcome::Absent);
            }
            Err(e) => return Err(ReconcileError::classify(e, Op::Read, Self::KIND, &prior.id)),
        };

        Ok(ReadOutcome::Found(PermissionRecord {
            id: prior.id.clone(),
            user: perms.user,
            vhost: perms.vhost,
            configure: perms.configure,
            write: perms.write,
            read: perms.read,
        }))
    }

    async fn update(
        &self,
        desired: &Self::Desired,
        prior: &Self::Observed,
    ) -> Result<Self::Observed, ReconcileError> {
        // Key fields are replace-only; an update only ever moves the
        // regex triple, re-put against the existing key.
        debug!(user = %prior.user, vhost = %prior.vhost, "updating permissions");
        self.put_permissions(desired, &prior.vhost, &prior.id, Op::Update)
            .await?;

        Ok(PermissionRecord {
            id: prior.id.clone(),
            user: prior.user.clone(),
            vhost: prior.vhost.clone(),
            configure: desired.configure.clone(),
            write: desired.write.clone(),
            read: desired.read.clone(),
        })
    }

    async fn delete(&self, observed: &Self::Observed) -> Result<(), ReconcileError> {
        debug!(user = %observed.user, vhost = %observed.vhost, "deleting permissions");
        match self
            .client
            .clear_permissions_in(&observed.vhost, &observed.user)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(ReconcileError::classify(
                e,
                Op::Delete,
                Self::KIND,
                &observed.id,
            )),
        }
    }

    fn import(token: &str) -> Result<Self::Observed, ReconcileError> {
        let mut parts = ident::decode(Self::KIND, token)?.into_iter();
        let (user, vhost) = (
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        Ok(PermissionRecord {
            id: token.to_owned(),
            user,
            vhost,
            configure: String::new(),
            write: String::new(),
            read: String::new(),
        })
    }

    fn requires_replace(desired: &Self::Desired, observed: &Self::Observed) -> bool {
        desired.user != observed.user
            || vhost_or_default(desired.vhost.as_deref()) != observed.vhost
    }
}

impl PermissionReconciler<'_> {
    async fn put_permissions(
        &self,
        desired: &PermissionConfig,
        vhost: &str,
        key: &str,
        op: Op,
    ) -> Result<(), ReconcileError> {
        let permissions = Permissions {
            configure: desired.configure.clone(),
            write: desired.write.clone(),
            read: desired.read.clone(),
        };
        self.client
            .update_permissions_in(vhost, &desired.user, &permissions)
            .await
            .map_err(|e| ReconcileError::classify(e, op, Self::KIND, key))
    }
}
