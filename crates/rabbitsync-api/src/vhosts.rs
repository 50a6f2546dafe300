// Virtual host endpoints
//
// Vhost names go into the path as a single segment; the default vhost
// `/` therefore travels as `%2F` (handled by `api_url`).

use crate::client::ManagementClient;
use crate::error::Error;
use crate::models::{VhostInfo, VhostSettings};

impl ManagementClient {
    /// Create or update a virtual host.
    ///
    /// `PUT /api/vhosts/{name}`
    pub async fn put_vhost(&self, name: &str, settings: &VhostSettings) -> Result<(), Error> {
        let url = self.api_url(&["vhosts", name]);
        self.put_json(url, settings).await
    }

    /// Fetch a virtual host.
    ///
    /// `GET /api/vhosts/{name}`
    pub async fn get_vhost(&self, name: &str) -> Result<VhostInfo, Error> {
        let url = self.api_url(&["vhosts", name]);
        self.get_json(url).await
    }

    /// Delete a virtual host.
    ///
    /// `DELETE /api/vhosts/{name}` — 404 surfaces as [`Error::NotFound`].
    pub async fn delete_vhost(&self, name: &str) -> Result<(), Error> {
        let url = self.api_url(&["vhosts", name]);
        self.delete(url).await
    }
}
