//! Authenticated API session.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use bistro_core::error::AuthError;
use bistro_core::navigator::NoopNavigator;
use bistro_core::{
    AccessToken, ApiUrl, ClientConfig, CredentialStore, Error, Navigator, RefreshToken, Result,
};

use crate::classify::is_exempt;
use crate::client::HttpClient;
use crate::coordinator::{Admission, RefreshCoordinator, RefreshState};
use crate::pending::RefreshOutcome;
use crate::request::{ApiRequest, ApiResponse};
use crate::terminator::SessionTerminator;

/// Entry point for every call to the dashboard API.
///
/// Protected calls carry the stored access token. When the server answers
/// 401 the session refreshes the token (once, no matter how many calls fail
/// together) and replays each affected call a single time. If the refresh
/// cannot succeed the session is terminated: credentials are cleared and the
/// [`Navigator`] is sent to sign-in.
///
/// Sessions are cheap to clone and share one coordinator.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use bistro_core::{ApiUrl, ClientConfig, CredentialStore, Credentials, NoopNavigator};
/// use bistro_http::ApiSession;
///
/// # async fn example() -> Result<(), bistro_core::Error> {
/// let config = ClientConfig::new(ApiUrl::new("https://pos.example.com")?);
/// let session = ApiSession::new(
///     config,
///     Arc::new(CredentialStore::in_memory()),
///     Arc::new(NoopNavigator),
/// )?;
///
/// session.sign_in(&Credentials::new("owner@example.com", "hunter22")).await?;
/// let orders: serde_json::Value = session.get_json("/api/orders?pageSize=3").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: HttpClient,
    store: Arc<CredentialStore>,
    coordinator: RefreshCoordinator,
    terminator: SessionTerminator,
}

impl ApiSession {
    pub fn new(
        config: ClientConfig,
        store: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = HttpClient::new(&config)?;
        Ok(Self {
            inner: Arc::new(SessionInner {
                http,
                terminator: SessionTerminator::new(store.clone(), navigator),
                store,
                coordinator: RefreshCoordinator::default(),
            }),
        })
    }

    /// A session with in-memory storage and no navigation.
    pub fn in_memory(config: ClientConfig) -> Result<Self> {
        Self::new(
            config,
            Arc::new(CredentialStore::in_memory()),
            Arc::new(NoopNavigator),
        )
    }

    pub fn api_url(&self) -> &ApiUrl {
        self.inner.http.api()
    }

    /// The credential store behind this session.
    ///
    /// Writing a session here directly does not re-arm a terminated session
    /// until the next refresh finds the stored refresh token; prefer
    /// [`ApiSession::establish`].
    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.inner.coordinator.state()
    }

    /// Number of requests currently waiting on an in-flight refresh.
    pub fn queued_requests(&self) -> usize {
        self.inner.coordinator.pending_len()
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminator.is_terminated()
    }

    /// End the session now: clear credentials and navigate to sign-in.
    pub fn terminate(&self) {
        self.inner.terminator.terminate();
    }

    /// Store a freshly issued session and re-arm termination.
    ///
    /// Embedders that obtain tokens outside the account flows should store
    /// them through here rather than through [`ApiSession::store`].
    pub fn establish(&self, access: &AccessToken, refresh: Option<&RefreshToken>) -> Result<()> {
        self.inner.store.clear_setup_token();
        self.inner.store.store_session(access, refresh)?;
        self.inner.terminator.rearm();
        Ok(())
    }

    /// Send a request through the coordinator.
    ///
    /// Callers never see an intermediate 401 from a protected endpoint: they
    /// get the replayed response or the final error.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let http = &self.inner.http;

        if let Some(setup) = request.setup_token() {
            return http.execute(&request, Some(setup.as_str())).await;
        }

        if is_exempt(request.path()) {
            debug!("Exempt endpoint, sending without credentials");
            return http.execute(&request, None).await;
        }

        let mut bearer = self.inner.store.access_token()?;
        let mut retried = false;

        loop {
            let result = http
                .execute(&request, bearer.as_ref().map(AccessToken::as_str))
                .await;

            match result {
                Err(err) if err.is_expired_credential() => {
                    // One replay per request; a second 401 goes to the caller.
                    if retried {
                        warn!("Request rejected again after replay");
                        return Err(err);
                    }
                    retried = true;
                    debug!("Access token rejected, recovering");
                    bearer = Some(self.recover(bearer.as_ref()).await?);
                }
                result => return result,
            }
        }
    }

    /// Send `request` once with the stored access token.
    ///
    /// A 401 is returned as is: no refresh, no replay and no termination.
    pub(crate) async fn send_once(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let bearer = self.inner.store.access_token()?;
        self.inner
            .http
            .execute(request, bearer.as_ref().map(AccessToken::as_str))
            .await
    }

    /// Refresh the access token now.
    ///
    /// Shares the single-flight refresh with the implicit 401 path.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let current = self.inner.store.access_token()?;
        self.recover(current.as_ref()).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await?.json()
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path).json(body)?).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Obtain a usable access token after `stale` was rejected.
    async fn recover(&self, stale: Option<&AccessToken>) -> Result<AccessToken> {
        let inner = &self.inner;

        // The store is read outside the coordinator lock. If a refresh
        // finishes in between, the read may be outdated and is repeated.
        let admission = loop {
            let observed = inner.coordinator.generation();
            let current = inner.store.access_token()?;
            match inner.coordinator.admit(stale, current, observed) {
                Some(admission) => break admission,
                None => debug!("Refresh finished during store read, retrying"),
            }
        };

        match admission {
            Admission::Current(token) => Ok(token),
            Admission::Queued(waiter) => {
                let outcome = waiter.await.unwrap_or(Err(AuthError::RefreshAbandoned));
                Ok(outcome?)
            }
            Admission::Leader(lease) => {
                if inner.terminator.is_terminated() {
                    if inner.store.refresh_token()?.is_none() {
                        // Nothing to refresh until a new session is established.
                        debug!("Session already terminated, not refreshing");
                        lease.settle(Err(AuthError::SessionTerminated));
                        return Err(AuthError::SessionTerminated.into());
                    }
                    debug!("Credentials stored since termination, re-arming");
                    inner.terminator.rearm();
                }

                let outcome = self.run_refresh().await;
                if let Err(ref e) = outcome {
                    warn!(error = %e, "Refresh failed, ending session");
                    inner.terminator.terminate();
                }
                lease.settle(outcome.clone());
                Ok(outcome?)
            }
        }
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let store = &self.inner.store;

        let refresh_token = match store.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("No refresh token stored");
                return Err(AuthError::NoRefreshToken);
            }
            Err(e) => return Err(rejected(e)),
        };

        info!("Refreshing access token");
        let response = self.inner.http.refresh(&refresh_token).await.map_err(rejected)?;

        let access = AccessToken::new(response.access_token);
        store.set_access_token(&access).map_err(rejected)?;
        if let Some(rotated) = response.refresh_token {
            store
                .set_refresh_token(&RefreshToken::new(rotated))
                .map_err(rejected)?;
            debug!("Refresh token rotated");
        }

        info!("Access token refreshed");
        Ok(access)
    }
}

fn rejected(err: Error) -> AuthError {
    AuthError::RefreshRejected {
        reason: err.to_string(),
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("api", self.inner.http.api())
            .field("state", &self.inner.coordinator.state())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
