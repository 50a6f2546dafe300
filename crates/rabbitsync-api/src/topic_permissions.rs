// Topic permission endpoints
//
// The broker keys topic permissions on (user, vhost, exchange) but its
// GET endpoint is scoped to (user, vhost) and returns every exchange
// grant for the pair. Filtering by exchange is the caller's job.

use crate::client::ManagementClient;
use crate::error::Error;
use crate::models::{TopicPermissionInfo, TopicPermissions};

impl ManagementClient {
    /// Grant or replace a user's topic permissions on one exchange.
    ///
    /// `PUT /api/topic-permissions/{vhost}/{user}`
    pub async fn update_topic_permissions_in(
        &self,
        vhost: &str,
        user: &str,
        permissions: &TopicPermissions,
    ) -> Result<(), Error> {
        let url = self.api_url(&["topic-permissions", vhost, user]);
        self.put_json(url, permissions).await
    }

    /// List all topic grants for a user in a vhost, across exchanges.
    ///
    /// `GET /api/topic-permissions/{vhost}/{user}`
    pub async fn list_topic_permissions_of(
        &self,
        vhost: &str,
        user: &str,
    ) -> Result<Vec<TopicPermissionInfo>, Error> {
        let url = self.api_url(&["topic-permissions", vhost, user]);
        self.get_json(url).await
    }

    /// Revoke all of a user's topic permissions in a vhost.
    ///
    /// `DELETE /api/topic-permissions/{vhost}/{user}` — 404 surfaces as
    /// [`Error::NotFound`].
    pub async fn clear_topic_permissions_in(&self, vhost: &str, user: &str) -> Result<(), Error> {
        let url = self.api_url(&["topic-permissions", vhost, user]);
        self.delete(url).await
    }
}
