// Topic permission reconciler.
//
// Keyed on (user, vhost, exchange) — all replace-only. The broker has
// no per-exchange get: reads list every topic grant for the
// (user, vhost) pair and filter by exchange here. A list that comes
// back without our exchange means the grant is gone (absence), which
// is distinct from the list call itself failing (an error).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rabbitsync_api::ManagementClient;
use rabbitsync_api::models::TopicPermissions;

use crate::error::{Op, ReconcileError};
use crate::ident;
use crate::kind::ResourceKind;
use crate::resource::{ReadOutcome, Reconcile, vhost_or_default};

/// Declared topic permission grant.
#[derive(Debug, Clone)]
pub struct TopicPermissionConfig {
    pub user: String,
    /// Defaults to the root vhost `/` when unset.
    pub vhost: Option<String>,
    pub exchange: String,
    pub write: String,
    pub read: String,
}

/// Observed topic permission state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPermissionRecord {
    pub id: String,
    pub user: String,
    pub vhost: String,
    pub exchange: String,
    pub write: String,
    pub read: String,
}

/// Reconciler for topic permission grants.
pub struct TopicPermissionReconciler<'a> {
    client: &'a ManagementClient,
}

impl<'a> TopicPermissionReconciler<'a> {
    pub fn new(client: &'a ManagementClient) -> Self {
        Self { client }
    }
}

impl Reconcile for TopicPermissionReconciler<'_> {
    type Desired = TopicPermissionConfig;
    type Observed = TopicPermissionRecord;

    const KIND: ResourceKind = ResourceKind::TopicPermission;

    async fn create(&self, desired: &Self::Desired) -> Result<Self::Observed, ReconcileError> {
        let vhost = vhost_or_default(desired.vhost.as_deref());
        let id = ident::encode(Self::KIND, &[&desired.user, &vhost, &desired.exchange])?;

        debug!(
            user = %desired.user,
            vhost = %vhost,
            exchange = %desired.exchange,
            "creating topic permissions"
        );
        self.put_topic_permissions(desired, &vhost, &id, Op::Create)
            .await?;

        Ok(TopicPermissionRecord {
            id,
            user: desired.user.clone(),
            vhost,
            exchange: desired.exchange.clone(),
            write: desired.write.clone(),
            read: desired.read.clone(),
        })
    }

    async fn read(
        &self,
        prior: &Self::Observed,
    ) -> Result<ReadOutcome<Self::Observed>, ReconcileError> {
        debug!(
            user = %prior.user,
            vhost = %prior.vhost,
            exchange = %prior.exchange,
            "reading topic permissions"
        );
        let grants = match self
            .client
            .list_topic_permissions_of(&prior.vhost, &prior.user)
            .await
        {
            Ok(grants) => grants,
            Err(e) if e.is_not_found() => {
                warn!(
                    user = %prior.user,
                    vhost = %prior.vhost,
                    "no topic permissions on broker, dropping from state"
                );
                return Ok(ReadOutcome::Absent);
            }
            Err(e) => return Err(ReconcileError::classify(e, Op::Read, Self::KIND, &prior.id)),
        };

        // Client-side filter: the collection covers every exchange the
        // user has grants on in this vhost.
        let Some(grant) = grants.into_iter().find(|g| g.exchange == prior.exchange) else {
            warn!(
                user = %prior.user,
                vhost = %prior.vhost,
                exchange = %prior.exchange,
                "topic permission entry not found on broker, dropping from state"
            );
            return Ok(ReadOutcome::Absent);
        };

        Ok(ReadOutcome::Found(TopicPermissionRecord {
            id: prior.id.clone(),
            user: grant.user,
            vhost: grant.vhost,
            exchange: grant.exchange,
            write: grant.write,
            read: grant.read,
        }))
    }

    async fn update(
        &self,
        desired: &Self::Desired,
        prior: &Self::Observed,
    ) -> Result<Self::Observed, ReconcileError> {
        debug!(
            user = %prior.user,
            vhost = %prior.vhost,
            exchange = %prior.exchange,
            "updating topic permissions"
        );
        self.put_topic_permissions(desired, &prior.vhost, &prior.id, Op::Update)
            .await?;

        Ok(TopicPermissionRecord {
            id: prior.id.clone(),
            user: prior.user.clone(),
            vhost: prior.vhost.clone(),
            exchange: prior.exchange.clone(),
            write: desired.write.clone(),
            read: desired.read.clone(),
        })
    }

    async fn delete(&self, observed: &Self::Observed) -> Result<(), ReconcileError> {
        debug!(
            user = %observed.user,
            vhost = %observed.vhost,
            "deleting topic permissions"
        );
        match self
            .client
            .clear_topic_permissions_in(&observed.vhost, &observed.user)
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
        let (user, vhost, exchange) = (
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        Ok(TopicPermissionRecord {
            id: token.to_owned(),
            user,
            vhost,
            exchange,
            write: String::new(),
            read: String::new(),
        })
    }

    fn requires_replace(desired: &Self::Desired, observed: &Self::Observed) -> bool {
        desired.user != observed.user
            || vhost_or_default(desired.vhost.as_deref()) != observed.vhost
            || desired.exchange != observed.exchange
    }
}

impl TopicPermissionReconciler<'_> {
    async fn put_topic_permissions(
        &self,
        desired: &TopicPermissionConfig,
        vhost: &str,
        key: &str,
        op: Op,
    ) -> Result<(), ReconcileError> {
        let permissions = TopicPermissions {
            exchange: desired.exchange.clone(),
            write: desired.write.clone(),
            read: desired.read.clone(),
        };
        self.client
            .update_topic_permissions_in(vhost, &desired.user, &permissions)
            .await
            .map_err(|e| ReconcileError::classify(e, op, Self::KIND, key))
    }
}
