//! Calls to the login endpoint.

use async_trait::async_trait;
use gatehouse_core::{ErrorBody, LoginRequest, LoginSuccess};
use reqwest::StatusCode;
use url::Url;

use crate::error::ClientError;

/// Exchange credentials for a token.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Submit credentials to the server.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rejected` for any non-200 reply and
    /// `ClientError::Network` if the server cannot be reached.
    async fn login(&self, request: &LoginRequest) -> Result<LoginSuccess, ClientError>;
}

/// [`AuthTransport`] over HTTP, posting to `{base_url}/api/auth/login`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    login_url: Url,
}

impl HttpTransport {
    /// Create a transport with a default `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base_url` cannot carry a
    /// path (e.g. `mailto:`).
    pub fn new(base_url: &Url) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a transport that shares an existing `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base_url` cannot carry a
    /// path.
    pub fn with_client(client: reqwest::Client, base_url: &Url) -> Result<Self, ClientError> {
        let mut login_url = base_url.clone();
        login_url
            .path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "auth", "login"]);

        Ok(Self { client, login_url })
    }

    #[must_use]
    pub const fn login_url(&self) -> &Url {
        &self.login_url
    }
}

#[async_trait]
impl AuthTransport for HttpTransport {
    async fn login(&self, request: &LoginRequest) -> Result<LoginSuccess, ClientError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            // Fall back to the status text when the body is not the error envelope
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("Login failed").to_owned(),
            };
            tracing::debug!(%status, %message, "Login rejected");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<LoginSuccess>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_from_bare_host() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();
        let transport = HttpTransport::new(&base).unwrap();
        assert_eq!(
            transport.login_url().as_str(),
            "http://127.0.0.1:5000/api/auth/login"
        );
    }

    #[test]
    fn test_login_url_keeps_base_path() {
        let base = Url::parse("https://example.com/gate/").unwrap();
        let transport = HttpTransport::new(&base).unwrap();
        assert_eq!(
            transport.login_url().as_str(),
            "https://example.com/gate/api/auth/login"
        );

        let base = Url::parse("https://example.com/gate").unwrap();
        let transport = HttpTransport::new(&base).unwrap();
        assert_eq!(
            transport.login_url().as_str(),
            "https://example.com/gate/api/auth/login"
        );
    }

    #[test]
    fn test_login_url_rejects_opaque_base() {
        let base = Url::parse("mailto:admin@gmail.com").unwrap();
        assert!(matches!(
            HttpTransport::new(&base),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
