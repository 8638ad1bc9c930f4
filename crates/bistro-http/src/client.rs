//! HTTP client for the dashboard API.

use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, instrument, trace};

use bistro_core::error::{Error, ProtocolError, TransportError};
use bistro_core::{ApiUrl, ClientConfig, RefreshToken, Result};

use crate::decorate::decorate;
use crate::endpoints::{ApiErrorResponse, REFRESH, RefreshRequest, RefreshResponse};
use crate::request::{ApiRequest, ApiResponse};

/// Sends single requests. Knows nothing about sessions or retries.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl HttpClient {
    /// Create a new client for the configured API.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            api: config.api_url.clone(),
        })
    }

    /// Returns the API URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Send `request`, attaching `bearer` if given.
    #[instrument(
        skip(self, request, bearer),
        fields(method = %request.method(), path = request.path())
    )]
    pub async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse> {
        let url = self.api.endpoint(request.path());
        debug!(authenticated = bearer.is_some(), "API request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        builder = decorate(builder, bearer);

        let response = builder.send().await.map_err(transport_error)?;
        self.handle_response(response).await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, token: &RefreshToken) -> Result<RefreshResponse> {
        let request = ApiRequest::post(REFRESH).json(&RefreshRequest {
            refresh_token: token.as_str(),
        })?;
        self.execute(&request, None).await?.json()
    }

    /// Buffer a response, turning non-success statuses into protocol errors.
    async fn handle_response(&self, response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let body = response.bytes().await.map_err(transport_error)?;
            Ok(ApiResponse::new(status.as_u16(), body.to_vec()))
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ApiErrorResponse>().await {
            Ok(body) => {
                let (error, message) = body.into_message();
                ProtocolError::new(status, error, message)
            }
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}
