// Virtual host reconciler.
//
// Replace-only on `name`; description, default queue type, tracing,
// and tags update in place. `default_queue_type` gets one special
// case on read: when the declaration never set it, the broker's value
// is ignored so an unset field does not start oscillating between
// declared-null and broker-reported defaults.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rabbitsync_api::ManagementClient;
use rabbitsync_api::models::VhostSettings;

use crate::error::{Op, ReconcileError};
use crate::kind::ResourceKind;
use crate::resource::{ReadOutcome, Reconcile, normalize_tags, require_nonempty};

/// Declared vhost configuration.
#[derive(Debug, Clone, Default)]
pub struct VhostConfig {
    pub name: String,
    pub description: Option<String>,
    pub default_queue_type: Option<String>,
    pub tracing: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Observed vhost state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhostRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_queue_type: Option<String>,
    pub tracing: bool,
    pub tags: Vec<String>,
}

/// Reconciler for virtual hosts.
pub struct VhostReconciler<'a> {
    client: &'a ManagementClient,
}

impl<'a> VhostReconciler<'a> {
    pub fn new(client: &'a ManagementClient) -> Self {
        Self { client }
    }
}

impl Reconcile for VhostReconciler<'_> {
    type Desired = VhostConfig;
    type Observed = VhostRecord;

    const KIND: ResourceKind = ResourceKind::VirtualHost;

    async fn create(&self, desired: &Self::Desired) -> Result<Self::Observed, ReconcileError> {
        require_nonempty(Self::KIND, "name", &desired.name)?;

        let description = desired.description.clone().unwrap_or_default();
        let tracing = desired.tracing.unwrap_or(false);
        let tags = normalize_tags(desired.tags.as_deref().unwrap_or_default());

        debug!(vhost = %desired.name, "creating vhost");
        let settings = VhostSettings {
            description: description.clone(),
            default_queue_type: desired.default_queue_type.clone(),
            tracing,
            tags: tags.clone(),
        };
        self.client
            .put_vhost(&desired.name, &settings)
            .await
            .map_err(|e| ReconcileError::classify(e, Op::Create, Self::KIND, &desired.name))?;

        Ok(VhostRecord {
            id: desired.name.clone(),
            name: desired.name.clone(),
            description,
            default_queue_type: desired.default_queue_type.clone(),
            tracing,
            tags,
        })
    }

    async fn read(
        &self,
        prior: &Self::Observed,
    ) -> Result<ReadOutcome<Self::Observed>, ReconcileError> {
        debug!(vhost = %prior.name, "reading vhost");
        let vhost = match self.client.get_vhost(&prior.name).await {
            Ok(vhost) => vhost,
            Err(e) if e.is_not_found() => {
                warn!(vhost = %prior.name, "vhost not found on broker, dropping from state");
                return Ok(ReadOutcome::Absent);
            }
            Err(e) => return Err(ReconcileError::classify(e, Op::Read, Self::KIND, &prior.name)),
        };

        // Only refresh default_queue_type if the declaration tracks it;
        // otherwise a never-set field would pick up broker defaults and
        // read as drift forever.
        let default_queue_type = if prior.default_queue_type.is_some() {
            Some(vhost.default_queue_type.unwrap_or_default())
        } else {
            None
        };

        Ok(ReadOutcome::Found(VhostRecord {
            id: vhost.name.clone(),
            name: vhost.name,
            description: vhost.description,
            default_queue_type,
            tracing: vhost.tracing,
            tags: vhost.tags,
        }))
    }

    async fn update(
        &self,
        desired: &Self::Desired,
        prior: &Self::Observed,
    ) -> Result<Self::Observed, ReconcileError> {
        let description = desired
            .description
            .clone()
            .unwrap_or_else(|| prior.description.clone());
        let default_queue_type = desired
            .default_queue_type
            .clone()
            .or_else(|| prior.default_queue_type.clone());
        let tracing = desired.tracing.unwrap_or(prior.tracing);
        let tags = desired
            .tags
            .as_deref()
            .map_or_else(|| prior.tags.clone(), normalize_tags);

        debug!(vhost = %desired.name, "updating vhost");
        let settings = VhostSettings {
            description: description.clone(),
            default_queue_type: default_queue_type.clone(),
            tracing,
            tags: tags.clone(),
        };
        self.client
            .put_vhost(&desired.name, &settings)
            .await
            .map_err(|e| ReconcileError::classify(e, Op::Update, Self::KIND, &desired.name))?;

        Ok(VhostRecord {
            id: desired.name.clone(),
            name: desired.name.clone(),
            description,
            default_queue_type,
            tracing,
            tags,
        })
    }

    async fn delete(&self, observed: &Self::Observed) -> Result<(), ReconcileError> {
        debug!(vhost = %observed.name, "deleting vhost");
        match self.client.delete_vhost(&observed.name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(ReconcileError::classify(
                e,
                Op::Delete,
                Self::KIND,
                &observed.name,
            )),
        }
    }

    fn import(token: &str) -> Result<Self::Observed, ReconcileError> {
        if token.is_empty() {
            return Err(ReconcileError::MalformedIdentifier {
                kind: Self::KIND,
                expected: Self::KIND.import_format(),
                got: token.to_owned(),
            });
        }
        Ok(VhostRecord {
            id: token.to_owned(),
            name: token.to_owned(),
            description: String::new(),
            default_queue_type: None,
            tracing: false,
            tags: Vec::new(),
        })
    }

    fn requires_replace(desired: &Self::Desired, observed: &Self::Observed) -> bool {
        desired.name != observed.name
    }
}
