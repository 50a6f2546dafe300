// User endpoints

use crate::client::ManagementClient;
use crate::error::Error;
use crate::models::{UserInfo, UserSettings};

impl ManagementClient {
    /// Create or update a user.
    ///
    /// `PUT /api/users/{name}` — idempotent by name; the broker answers
    /// 201 on create and 204 on overwrite.
    pub async fn put_user(&self, name: &str, settings: &UserSettings) -> Result<(), Error> {
        let url = self.api_url(&["users", name]);
        self.put_json(url, settings).await
    }

    /// Fetch a user, including its stored password hash.
    ///
    /// `GET /api/users/{name}`
    pub async fn get_user(&self, name: &str) -> Result<UserInfo, Error> {
        let url = self.api_url(&["users", name]);
        self.get_json(url).await
    }

    /// Delete a user.
    ///
    /// `DELETE /api/users/{name}` — 404 surfaces as [`Error::NotFound`].
    pub async fn delete_user(&self, name: &str) -> Result<(), Error> {
        let url = self.api_url(&["users", name]);
        self.delete(url).await
    }
}
