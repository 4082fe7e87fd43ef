//! Authentication API client methods

use crate::client::VendorDeskClient;
use crate::config::StorageKeys;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{LoginRequest, TokenPair};
use tracing::info;

impl VendorDeskClient {
    /// Exchange username and password for a credential pair and store it.
    ///
    /// The login call carries no bearer header and a rejection is returned
    /// as-is: it never triggers a refresh or a redirect.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ClientError> {
        let request = RequestDescriptor::post("/auth/login/").with_json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let pair: TokenPair = self.send_public(&request).await?.json()?;
        self.store().store_pair(&pair)?;

        info!(username, "Logged in");
        Ok(pair)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Unlike the automatic path inside `send`, a failure here leaves the
    /// stored credentials and the navigator alone.
    pub async fn refresh(&self) -> Result<String, ClientError> {
        let refresh = self.store().refresh_token()?.ok_or_else(|| {
            ClientError::AuthenticationFailed("no refresh token stored".to_string())
        })?;

        let renewed = self.request_refresh(&refresh).await?;
        self.store().store_access(&renewed.access)?;
        if let Some(rotated) = renewed.refresh.as_deref() {
            self.store().set(StorageKeys::REFRESH_TOKEN, rotated)?;
        }
        Ok(renewed.access)
    }

    /// Erase both stored credentials
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Whether an access credential is stored
    pub fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.store().access_token()?.is_some())
    }
}
