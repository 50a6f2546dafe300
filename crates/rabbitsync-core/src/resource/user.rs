// User reconciler.
//
// The only kind with a write-only secret. The password itself never
// lands in observed state; only the rotation version marker does. An
// update always fetches the broker's current settings first, because
// the put endpoint demands a complete settings document — including
// the password hash, which is round-tripped verbatim unless the
// rotation marker moved.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rabbitsync_api::ManagementClient;
use rabbitsync_api::models::UserSettings;

use crate::error::{Op, ReconcileError};
use crate::kind::ResourceKind;
use crate::resource::{ReadOutcome, Reconcile, normalize_tags, require_nonempty};
use crate::rotation;

/// Declared user configuration.
#[derive(Debug, Clone)]
pub struct UserConfig {
    pub name: String,
    /// Write-only password. Consumed on create and on rotation; never
    /// persisted or re-emitted.
    pub password: SecretString,
    /// Rotation version marker. Changing it — and only changing it —
    /// forces a password update.
    pub password_version: String,
    pub tags: Option<Vec<String>>,
}

/// Observed user state, as persisted by the declarative engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub password_version: String,
}

/// Reconciler for broker users.
pub struct UserReconciler<'a> {
    client: &'a ManagementClient,
}

impl<'a> UserReconciler<'a> {
    pub fn new(client: &'a ManagementClient) -> Self {
        Self { client }
    }
}

impl Reconcile for UserReconciler<'_> {
    type Desired = UserConfig;
    type Observed = UserRecord;

    const KIND: ResourceKind = ResourceKind::User;

    async fn create(&self, desired: &Self::Desired) -> Result<Self::Observed, ReconcileError> {
        require_nonempty(Self::KIND, "name", &desired.name)?;
        let tags = normalize_tags(desired.tags.as_deref().unwrap_or_default());

        debug!(user = %desired.name, "creating user");
        let settings = UserSettings {
            password: Some(desired.password.expose_secret().to_owned()),
            tags: tags.clone(),
            ..UserSettings::default()
        };
        self.client
            .put_user(&desired.name, &settings)
            .await
            .map_err(|e| ReconcileError::classify(e, Op::Create, Self::KIND, &desired.name))?;

        Ok(UserRecord {
            id: desired.name.clone(),
            name: desired.name.clone(),
            tags,
            password_version: desired.password_version.clone(),
        })
    }

    async fn read(
        &self,
        prior: &Self::Observed,
    ) -> Result<ReadOutcome<Self::Observed>, ReconcileError> {
        debug!(user = %prior.name, "reading user");
        let user = match self.client.get_user(&prior.name).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                warn!(user = %prior.name, "user not found on broker, dropping from state");
                return Ok(ReadOutcome::Absent);
            }
            Err(e) => return Err(ReconcileError::classify(e, Op::Read, Self::KIND, &prior.name)),
        };

        Ok(ReadOutcome::Found(UserRecord {
            id: user.name.clone(),
            name: user.name,
            tags: normalize_tags(&user.tags),
            // Not broker-observable: carried from the prior record.
            password_version: prior.password_version.clone(),
        }))
    }

    async fn update(
        &self,
        desired: &Self::Desired,
        prior: &Self::Observed,
    ) -> Result<Self::Observed, ReconcileError> {
        // The put needs the full settings payload, so fetch what the
        // broker currently stores (hash, algorithm, live tag set).
        debug!(user = %desired.name, "reading user before update");
        let current = self
            .client
            .get_user(&desired.name)
            .await
            .map_err(|e| ReconcileError::classify(e, Op::Update, Self::KIND, &desired.name))?;

        let decision = rotation::evaluate(&desired.password_version, &prior.password_version);
        let creds = rotation::resolve(decision, &desired.password, &current);

        let desired_tags = normalize_tags(desired.tags.as_deref().unwrap_or_default());
        // Unchanged tag sets are round-tripped as the broker reported
        // them rather than rewritten from the declaration.
        let outgoing_tags = if desired_tags == current.tags {
            current.tags.clone()
        } else {
            desired_tags.clone()
        };

        debug!(user = %desired.name, rotate = ?decision, "updating user");
        let settings = UserSettings {
            password: None,
            password_hash: Some(creds.password_hash),
            hashing_algorithm: Some(creds.hashing_algorithm),
            tags: outgoing_tags,
        };
        self.client
            .put_user(&desired.name, &settings)
            .await
            .map_err(|e| ReconcileError::classify(e, Op::Update, Self::KIND, &desired.name))?;

        Ok(UserRecord {
            id: desired.name.clone(),
            name: desired.name.clone(),
            tags: desired_tags,
            password_version: desired.password_version.clone(),
        })
    }

    async fn delete(&self, observed: &Self::Observed) -> Result<(), ReconcileError> {
        debug!(user = %observed.name, "deleting user");
        match self.client.delete_user(&observed.name).await {
            Ok(()) => Ok(()),
            // Already gone: deleting twice succeeds.
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
        Ok(UserRecord {
            id: token.to_owned(),
            name: token.to_owned(),
            tags: Vec::new(),
            password_version: String::new(),
        })
    }

    // Users have no replace-only attributes: everything updates in place.
    fn requires_replace(_desired: &Self::Desired, _observed: &Self::Observed) -> bool {
        false
    }
}
