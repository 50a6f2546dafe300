// Exchange endpoints

use crate::client::ManagementClient;
use crate::error::Error;
use crate::models::{ExchangeInfo, ExchangeSettings};

impl ManagementClient {
    /// Declare an exchange.
    ///
    /// `PUT /api/exchanges/{vhost}/{name}` — the broker rejects a
    /// re-declare with different settings (406), so this is only
    /// idempotent for identical settings.
    pub async fn declare_exchange(
        &self,
        vhost: &str,
        name: &str,
        settings: &ExchangeSettings,
    ) -> Result<(), Error> {
        let url = self.api_url(&["exchanges", vhost, name]);
        self.put_json(url, settings).await
    }

    /// Fetch an exchange.
    ///
    /// `GET /api/exchanges/{vhost}/{name}`
    pub async fn get_exchange(&self, vhost: &str, name: &str) -> Result<ExchangeInfo, Error> {
        let url = self.api_url(&["exchanges", vhost, name]);
        self.get_json(url).await
    }

    /// Delete an exchange.
    ///
    /// `DELETE /api/exchanges/{vhost}/{name}` — 404 surfaces as
    /// [`Error::NotFound`].
    pub async fn delete_exchange(&self, vhost: &str, name: &str) -> Result<(), Error> {
        let url = self.api_url(&["exchanges", vhost, name]);
        self.delete(url).await
    }
}
