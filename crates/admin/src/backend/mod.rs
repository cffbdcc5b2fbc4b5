//! Client for the records/users backend.
//!
//! The backend is an opaque REST collaborator:
//!
//! ```text
//! POST   /login                 {username, password} -> {role, token}
//! POST   /logout
//! GET    /records               -> [record]
//! POST   /records               record
//! PATCH  /records/{key}         partial record
//! DELETE /records/{key}
//! GET    /usuarios              -> [account]
//! POST   /usuarios              {username, password, role}
//! PATCH  /usuarios/{id}         {password?, role?}
//! DELETE /usuarios/{id|username}
//! ```
//!
//! Every call except login carries `Authorization: Bearer <token>`. Record
//! and user collection paths are configurable.
//!
//! Controllers depend on the [`Backend`] trait rather than on
//! [`HttpBackend`] so they can be driven by an in-memory fake.

mod error;
mod types;

pub use error::BackendError;
pub use types::*;

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use roster_core::{CustomerRecord, RecordKey, RecordPatch, UserAccount, UserRef, Username};

use crate::config::BackendConfig;
use crate::models::AccessToken;

/// Operations the panel needs from the backend.
pub trait Backend: Send + Sync {
    /// Exchange credentials for a role and bearer token.
    fn login(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResponse, BackendError>> + Send;

    /// End the backend session, if it keeps one.
    fn logout(&self, token: &AccessToken)
    -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Fetch the whole record collection, in backend order.
    fn list_records(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Vec<RecordRow>, BackendError>> + Send;

    /// Append a record.
    fn create_record(
        &self,
        token: &AccessToken,
        record: &CustomerRecord,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Partially update a record in place.
    fn update_record(
        &self,
        token: &AccessToken,
        key: RecordKey,
        patch: &RecordPatch,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Remove a record.
    fn delete_record(
        &self,
        token: &AccessToken,
        key: RecordKey,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// List application user accounts (admin only).
    fn list_users(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Vec<UserAccount>, BackendError>> + Send;

    /// Create an application user account (admin only).
    fn create_user(
        &self,
        token: &AccessToken,
        account: &NewUserAccount,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Change password and/or role of an account (admin only).
    fn update_user(
        &self,
        token: &AccessToken,
        user: &UserRef,
        patch: &UserAccountPatch,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Delete an application user account (admin only).
    fn delete_user(
        &self,
        token: &AccessToken,
        user: &UserRef,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// reqwest-based [`Backend`] implementation.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: Url,
    records_path: String,
    users_path: String,
}

impl HttpBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the base URL
    /// cannot carry a path (e.g. `mailto:`).
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("roster-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                base_url: config.base_url.clone(),
                records_path: config.records_path.clone(),
                users_path: config.users_path.clone(),
            }),
        })
    }

    /// Build `base_url + path [+ /segment]`, percent-encoding the segment.
    fn endpoint(&self, path: &str, segment: Option<&str>) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| BackendError::InvalidUrl(self.inner.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Send a request and decode a JSON body.
    async fn fetch<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| BackendError::Parse(format!("Failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    /// Send a request whose success body is ignored.
    async fn execute(request: reqwest::RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Map a non-2xx response to a [`BackendError`].
    async fn parse_error(response: reqwest::Response) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let payload = serde_json::from_str::<serde_json::Value>(&body).ok();

        if status.as_u16() == 400 || status.as_u16() == 422 {
            if let Some(errors) = payload
                .as_ref()
                .and_then(roster_core::FieldErrors::from_payload)
            {
                return BackendError::Validation(errors);
            }
        }

        let message = payload.as_ref().map_or_else(
            || {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    body.clone()
                }
            },
            roster_core::describe_error_payload,
        );

        debug!(status = status.as_u16(), %message, "Backend returned an error");

        match status.as_u16() {
            401 => BackendError::Unauthorized(message),
            403 => BackendError::Forbidden(message),
            code => BackendError::Api {
                status: code,
                message,
            },
        }
    }
}

impl Backend for HttpBackend {
    #[instrument(skip(self, password), fields(username = %username))]
    async fn login(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<LoginResponse, BackendError> {
        let url = self.endpoint("/login", None)?;
        let body = LoginBody {
            username: username.as_str(),
            password: password.expose_secret(),
        };
        Self::fetch(self.inner.client.post(url).json(&body)).await
    }

    #[instrument(skip_all)]
    async fn logout(&self, token: &AccessToken) -> Result<(), BackendError> {
        let url = self.endpoint("/logout", None)?;
        Self::execute(self.inner.client.post(url).bearer_auth(token.expose())).await
    }

    #[instrument(skip_all)]
    async fn list_records(&self, token: &AccessToken) -> Result<Vec<RecordRow>, BackendError> {
        let url = self.endpoint(&self.inner.records_path, None)?;
        Self::fetch(self.inner.client.get(url).bearer_auth(token.expose())).await
    }

    #[instrument(skip_all)]
    async fn create_record(
        &self,
        token: &AccessToken,
        record: &CustomerRecord,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&self.inner.records_path, None)?;
        Self::execute(
            self.inner
                .client
                .post(url)
                .bearer_auth(token.expose())
                .json(record),
        )
        .await
    }

    #[instrument(skip(self, token, patch), fields(key = %key))]
    async fn update_record(
        &self,
        token: &AccessToken,
        key: RecordKey,
        patch: &RecordPatch,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&self.inner.records_path, Some(&key.to_string()))?;
        Self::execute(
            self.inner
                .client
                .patch(url)
                .bearer_auth(token.expose())
                .json(patch),
        )
        .await
    }

    #[instrument(skip(self, token), fields(key = %key))]
    async fn delete_record(&self, token: &AccessToken, key: RecordKey) -> Result<(), BackendError> {
        let url = self.endpoint(&self.inner.records_path, Some(&key.to_string()))?;
        Self::execute(self.inner.client.delete(url).bearer_auth(token.expose())).await
    }

    #[instrument(skip_all)]
    async fn list_users(&self, token: &AccessToken) -> Result<Vec<UserAccount>, BackendError> {
        let url = self.endpoint(&self.inner.users_path, None)?;
        Self::fetch(self.inner.client.get(url).bearer_auth(token.expose())).await
    }

    #[instrument(skip(self, token, account), fields(username = %account.username))]
    async fn create_user(
        &self,
        token: &AccessToken,
        account: &NewUserAccount,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&self.inner.users_path, None)?;
        Self::execute(
            self.inner
                .client
                .post(url)
                .bearer_auth(token.expose())
                .json(&NewUserBody::from(account)),
        )
        .await
    }

    #[instrument(skip(self, token, patch), fields(user = %user))]
    async fn update_user(
        &self,
        token: &AccessToken,
        user: &UserRef,
        patch: &UserAccountPatch,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&self.inner.users_path, Some(&user.to_string()))?;
        Self::execute(
            self.inner
                .client
                .patch(url)
                .bearer_auth(token.expose())
                .json(&UserPatchBody::from(patch)),
        )
        .await
    }

    #[instrument(skip(self, token), fields(user = %user))]
    async fn delete_user(&self, token: &AccessToken, user: &UserRef) -> Result<(), BackendError> {
        let url = self.endpoint(&self.inner.users_path, Some(&user.to_string()))?;
        Self::execute(self.inner.client.delete(url).bearer_auth(token.expose())).await
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.inner.base_url.as_str())
            .field("records_path", &self.inner.records_path)
            .field("users_path", &self.inner.users_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: Url::parse(base).unwrap(),
            records_path: "/records".to_string(),
            users_path: "/usuarios".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let backend = backend("http://localhost:8080");
        assert_eq!(
            backend.endpoint("/records", None).unwrap().as_str(),
            "http://localhost:8080/records"
        );
        assert_eq!(
            backend.endpoint("/records", Some("3")).unwrap().as_str(),
            "http://localhost:8080/records/3"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let backend = backend("https://example.com/api/");
        assert_eq!(
            backend.endpoint("/usuarios", Some("7")).unwrap().as_str(),
            "https://example.com/api/usuarios/7"
        );
    }

    #[test]
    fn test_endpoint_encodes_usernames() {
        let backend = backend("http://localhost:8080");
        assert_eq!(
            backend
                .endpoint("/usuarios", Some("joão silva/x"))
                .unwrap()
                .as_str(),
            "http://localhost:8080/usuarios/jo%C3%A3o%20silva%2Fx"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = HttpBackend::new(&BackendConfig {
            base_url: Url::parse("mailto:admin@example.com").unwrap(),
            records_path: "/records".to_string(),
            users_path: "/usuarios".to_string(),
        });
        assert!(matches!(result, Err(BackendError::InvalidUrl(_))));
    }

    #[test]
    fn test_debug_shows_paths() {
        let output = format!("{:?}", backend("http://localhost:8080"));
        assert!(output.contains("/usuarios"));
    }
}
