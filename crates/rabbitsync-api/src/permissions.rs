// Permission endpoints

use crate::client::ManagementClient;
use crate::error::Error;
use crate::models::{PermissionInfo, Permissions};

impl ManagementClient {
    /// Grant or replace a user's permissions in a vhost.
    ///
    /// `PUT /api/permissions/{vhost}/{user}`
    pub async fn update_permissions_in(
        &self,
        vhost: &str,
        user: &str,
        permissions: &Permissions,
    ) -> Result<(), Error> {
        let url = self.api_url(&["permissions", vhost, user]);
        self.put_json(url, permissions).await
    }

    /// Fetch a user's permissions in a vhost.
    ///
    /// `GET /api/permissions/{vhost}/{user}`
    pub async fn get_permissions_in(&self, vhost: &str, user: &str) -> Result<PermissionInfo, Error> {
        let url = self.api_url(&["permissions", vhost, user]);
        self.get_json(url).await
    }

    /// Revoke a user's permissions in a vhost.
    ///
    /// `DELETE /api/permissions/{vhost}/{user}` — 404 surfaces as
    /// [`Error::NotFound`].
    pub async fn clear_permissions_in(&self, vhost: &str, user: &str) -> Result<(), Error> {
        let url = self.api_url(&["permissions", vhost, user]);
        self.delete(url).await
    }
}
