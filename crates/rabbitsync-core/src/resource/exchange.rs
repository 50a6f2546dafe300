// Exchange reconciler.
//
// Exchanges are immutable on the broker: a re-declare with different
// settings is rejected, so *every* attribute is a replace trigger and
// the declarative engine converges deltas as delete-then-create.
// `update` exists only to satisfy the contract and is never invoked
// with effect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rabbitsync_api::ManagementClient;
use rabbitsync_api::models::ExchangeSettings;

use crate::error::{Op, ReconcileError};
use crate::ident;
use crate::kind::ResourceKind;
use crate::resource::{ReadOutcome, Reconcile, vhost_or_default};

/// Declared exchange configuration.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub name: String,
    /// Defaults to the root vhost `/` when unset.
    pub vhost: Option<String>,
    pub exchange_type: String,
    /// Defaults to `false`.
    pub durable: Option<bool>,
    /// Defaults to `false`.
    pub auto_delete: Option<bool>,
    /// Defaults to an empty map.
    pub arguments: Option<BTreeMap<String, String>>,
}

/// Observed exchange state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: String,
    pub name: String,
    pub vhost: String,
    pub exchange_type: String,
    pub durable: bool,
    pub auto_delete: bool,
    pub arguments: BTreeMap<String, String>,
}

/// Reconciler for exchanges.
pub struct ExchangeReconciler<'a> {
    client: &'a ManagementClient,
}

impl<'a> ExchangeReconciler<'a> {
    pub fn new(client: &'a ManagementClient) -> Self {
        Self { client }
    }
}

impl Reconcile for ExchangeReconciler<'_> {
    type Desired = ExchangeConfig;
    type Observed = ExchangeRecord;

    const KIND: ResourceKind = ResourceKind::Exchange;

    async fn create(&self, desired: &Self::Desired) -> Result<Self::Observed, ReconcileError> {
        let vhost = vhost_or_default(desired.vhost.as_deref());
        let id = ident::encode(Self::KIND, &[&desired.name, &vhost])?;

        let durable = desired.durable.unwrap_or(false);
        let auto_delete = desired.auto_delete.unwrap_or(false);
        let arguments = desired.arguments.clone().unwrap_or_default();

        debug!(exchange = %desired.name, vhost = %vhost, "declaring exchange");
        let settings = ExchangeSettings {
            exchange_type: desired.exchange_type.clone(),
            durable,
            auto_delete,
            arguments: arguments.clone(),
        };
        self.client
            .declare_exchange(&vhost, &desired.name, &settings)
            .await
            .map_err(|e| ReconcileError::classify(e, Op::Create, Self::KIND, &id))?;

        Ok(ExchangeRecord {
            id,
            name: desired.name.clone(),
            vhost,
            exchange_type: desired.exchange_type.clone(),
            durable,
            auto_delete,
            arguments,
        })
    }

    async fn read(
        &self,
        prior: &Self::Observed,
    ) -> Result<ReadOutcome<Self::Observed>, ReconcileError> {
        debug!(exchange = %prior.name, vhost = %prior.vhost, "reading exchange");
        let exchange = match self.client.get_exchange(&prior.vhost, &prior.name).await {
            Ok(exchange) => exchange,
            Err(e) if e.is_not_found() => {
                warn!(
                    exchange = %prior.name,
                    vhost = %prior.vhost,
                    "exchange not found on broker, dropping from state"
                );
                return Ok(ReadOutcome::Absent);
            }
            Err(e) => return Err(ReconcileError::classify(e, Op::Read, Self::KIND, &prior.id)),
        };

        let arguments = exchange
            .arguments
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect();

        Ok(ReadOutcome::Found(ExchangeRecord {
            id: prior.id.clone(),
            name: exchange.name,
            vhost: exchange.vhost,
            exchange_type: exchange.exchange_type,
            durable: exchange.durable,
            auto_delete: exchange.auto_delete,
            arguments,
        }))
    }

    // No-op hook: every attribute requires replacement, so the engine
    // never routes a delta here.
    async fn update(
        &self,
        _desired: &Self::Desired,
        prior: &Self::Observed,
    ) -> Result<Self::Observed, ReconcileError> {
        debug!(exchange = %prior.name, vhost = %prior.vhost, "exchange update is a no-op");
        Ok(prior.clone())
    }

    async fn delete(&self, observed: &Self::Observed) -> Result<(), ReconcileError> {
        debug!(exchange = %observed.name, vhost = %observed.vhost, "deleting exchange");
        match self
            .client
            .delete_exchange(&observed.vhost, &observed.name)
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
        let (name, vhost) = (
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        Ok(ExchangeRecord {
            id: token.to_owned(),
            name,
            vhost,
            exchange_type: String::new(),
            durable: false,
            auto_delete: false,
            arguments: BTreeMap::new(),
        })
    }

    /// Any delta at all forces delete-then-create.
    fn requires_replace(desired: &Self::Desired, observed: &Self::Observed) -> bool {
        desired.name != observed.name
            || vhost_or_default(desired.vhost.as_deref()) != observed.vhost
            || desired.exchange_type != observed.exchange_type
            || desired.durable.unwrap_or(false) != observed.durable
            || desired.auto_delete.unwrap_or(false) != observed.auto_delete
            || desired.arguments.clone().unwrap_or_default() != observed.arguments
    }
}
