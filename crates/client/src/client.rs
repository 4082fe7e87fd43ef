//! Authenticated API client
//!
//! Every request goes through [`VendorDeskClient::send`]. The stored access
//! token, if any, is attached as a bearer header. A 401 on the first attempt
//! triggers one refresh call; when it succeeds the request is replayed once
//! with the new token, when it fails the stored credentials are erased and the
//! navigator is sent to the login entry point.

use crate::config::{ClientConfig, DEFAULT_LOGIN_PATH, RefreshPolicy, StorageKeys};
use crate::error::ClientError;
use crate::navigation::{LogNavigator, Navigator};
use crate::request::{ApiResponse, RequestDescriptor};
use crate::storage::{CredentialStore, MemoryStore};
use crate::types::{RefreshRequest, RefreshResponse};
use reqwest::{Client, ClientBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub(crate) const REFRESH_PATH: &str = "/auth/refresh/";

/// Which dispatch of a logical request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Original,
    Replay,
    Refresh,
    Public,
}

impl Attempt {
    fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Replay => "replay",
            Self::Refresh => "refresh",
            Self::Public => "public",
        }
    }
}

/// Vendordesk API client
#[derive(Clone)]
pub struct VendorDeskClient {
    client: Client,
    base_url: String,
    login_path: String,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    refresh_policy: RefreshPolicy,
    refresh_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for VendorDeskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorDeskClient")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("refresh_policy", &self.refresh_policy)
            .finish_non_exhaustive()
    }
}

impl VendorDeskClient {
    /// Create a client with an in-memory credential store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> VendorDeskClientBuilder {
        VendorDeskClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Login entry point used for redirects
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    /// Credential store shared with the login and logout flows
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Send a request, recovering once from an expired access token
    ///
    /// # Errors
    ///
    /// Returns the backend error for non-2xx responses, `RefreshFailed` when
    /// the session had to be terminated, or a transport error
    pub async fn send(&self, request: &RequestDescriptor) -> Result<ApiResponse, ClientError> {
        let access = self.store.access_token()?;
        let response = self
            .dispatch(request, access.as_deref(), Attempt::Original)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return response.error_for_status();
        }

        debug!(
            method = %request.method(),
            path = request.path(),
            "Access token rejected, attempting refresh"
        );
        let renewed = self.recover(access.as_deref(), response).await?;

        // A 401 here propagates; the replay never refreshes again
        self.dispatch(request, Some(&renewed), Attempt::Replay)
            .await?
            .error_for_status()
    }

    /// Send a request and decode the JSON body
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); also fails if the body does not decode as `T`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<T, ClientError> {
        self.send(request).await?.json()
    }

    /// Send a request whose success carries no body
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send)
    pub async fn execute_empty(&self, request: &RequestDescriptor) -> Result<(), ClientError> {
        self.send(request).await.map(|_| ())
    }

    /// Send without credentials and without 401 recovery
    pub(crate) async fn send_public(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ApiResponse, ClientError> {
        self.dispatch(request, None, Attempt::Public)
            .await?
            .error_for_status()
    }

    /// Dedicated refresh call, bypassing the 401 handling in `send`
    pub(crate) async fn request_refresh(
        &self,
        refresh: &str,
    ) -> Result<RefreshResponse, ClientError> {
        let request = RequestDescriptor::post(REFRESH_PATH).with_json(&RefreshRequest {
            refresh: refresh.to_string(),
        })?;
        let renewed: RefreshResponse = self
            .dispatch(&request, None, Attempt::Refresh)
            .await?
            .error_for_status()?
            .json()?;

        if renewed.access.is_empty() {
            return Err(ClientError::AuthenticationFailed(
                "refresh response carried an empty access token".into(),
            ));
        }
        Ok(renewed)
    }

    /// Obtain a new access token after `rejected` was refused.
    ///
    /// Returns the token to replay with, or the error to hand to the caller
    /// after the session has been terminated.
    async fn recover(
        &self,
        rejected: Option<&str>,
        original: ApiResponse,
    ) -> Result<String, ClientError> {
        let _guard = match self.refresh_policy {
            RefreshPolicy::PerRequest => None,
            RefreshPolicy::SharedInFlight => {
                let guard = self.refresh_lock.lock().await;
                match self.store.access_token()? {
                    Some(current) if rejected != Some(current.as_str()) => {
                        debug!("Access token already refreshed by a concurrent request");
                        return Ok(current);
                    }
                    // The holder before us failed and already redirected
                    None if rejected.is_some() => {
                        debug!("Session ended by a concurrent refresh failure");
                        return Err(ClientError::RefreshFailed(Box::new(original.into_error())));
                    }
                    _ => {}
                }
                Some(guard)
            }
        };

        let Some(refresh) = self.store.refresh_token()? else {
            warn!("No refresh token stored, ending session");
            self.terminate_session();
            return Err(original.into_error());
        };

        match self.request_refresh(&refresh).await {
            Ok(renewed) => {
                self.store.store_access(&renewed.access)?;
                if let Some(rotated) = renewed.refresh.as_deref() {
                    self.store.set(StorageKeys::REFRESH_TOKEN, rotated)?;
                }
                info!("Access token refreshed");
                Ok(renewed.access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.terminate_session();
                Err(ClientError::RefreshFailed(Box::new(e)))
            }
        }
    }

    fn terminate_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to erase stored credentials");
        }
        self.navigator.redirect(&self.login_path);
    }

    async fn dispatch(
        &self,
        request: &RequestDescriptor,
        access: Option<&str>,
        attempt: Attempt,
    ) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut builder = self.client.request(request.method().clone(), url);

        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = access {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method(),
            path = request.path(),
            attempt = attempt.as_str(),
            authenticated = access.is_some(),
            "Dispatching request"
        );

        let response = ApiResponse::read(builder.send().await?).await?;

        debug!(
            path = request.path(),
            attempt = attempt.as_str(),
            status = response.status().as_u16(),
            "Response received"
        );
        Ok(response)
    }
}

/// Builder for VendorDeskClient
#[derive(Default)]
pub struct VendorDeskClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    login_path: Option<String>,
    refresh_policy: RefreshPolicy,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl VendorDeskClientBuilder {
    /// Seed the builder from loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(&config.base_url)
            .login_path(&config.login_path)
            .refresh_policy(config.refresh_policy);
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        builder
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the location the navigator is sent to when the session ends
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Set the credential store (defaults to an empty [`MemoryStore`])
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the navigator (defaults to [`LogNavigator`])
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VendorDeskClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        // Paths always start with '/', so the base must not end with one
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent(concat!(
                "vendordesk-client/",
                env!("CARGO_PKG_VERSION")
            ));
        }

        let client = client_builder.build()?;

        Ok(VendorDeskClient {
            client,
            base_url,
            login_path: self
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(LogNavigator)),
            refresh_policy: self.refresh_policy,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::mock::MockNavigator;
    use crate::types::TokenPair;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with(
        server: &MockServer,
        store: Arc<MemoryStore>,
        navigator: MockNavigator,
    ) -> VendorDeskClient {
        VendorDeskClient::builder()
            .base_url(server.uri())
            .store(store)
            .navigator(Arc::new(navigator))
            .build()
            .unwrap()
    }

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = VendorDeskClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = VendorDeskClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.login_path(), "/login");
    }

    #[tokio::test]
    async fn test_refresh_failure_redirects_to_login_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vendors/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh/"))
            .and(body_json(json!({"refresh": "R1"})))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Token is invalid or expired"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut navigator = MockNavigator::new();
        navigator
            .expect_redirect()
            .withf(|location: &str| location == "/login")
            .times(1)
            .return_const(());

        let store = Arc::new(MemoryStore::with_pair(&pair("A1", "R1")));
        let client = client_with(&server, store.clone(), navigator);

        let err = client
            .send(&RequestDescriptor::get("/vendors/"))
            .await
            .unwrap_err();

        assert!(err.is_session_terminated());
        assert_eq!(err.status(), Some(401));
        assert!(store.access_token().unwrap().is_none());
        assert!(store.refresh_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_success_never_touches_navigator() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/dashboard/stats/"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let mut navigator = MockNavigator::new();
        navigator.expect_redirect().never();

        let store = Arc::new(MemoryStore::with_pair(&pair("A1", "R1")));
        let client = client_with(&server, store, navigator);

        let body: serde_json::Value = client
            .execute(&RequestDescriptor::get("/dashboard/stats/"))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }
}
