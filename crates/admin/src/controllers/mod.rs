//! Panel controllers.
//!
//! Each controller borrows a [`Backend`] and the process-wide
//! [`BusyIndicator`], and operates on an explicit [`PanelState`] passed in
//! by the caller. Failures never escape a controller: they are logged and
//! turned into a [`Notice`](crate::ui::Notice) (or an inline form error),
//! and the operation returns an [`Outcome`].
//!
//! Both front ends drive the same controllers: the web routes load the
//! state from the session store and save it back after the call, the CLI
//! keeps one state for the lifetime of the process.

pub mod import;
pub mod records;
pub mod session;
pub mod users;

pub use import::BulkImport;
pub use records::{RecordTable, UpdateStrategy};
pub use session::{AuthError, SessionManager};
pub use users::UserAdmin;

use tracing::warn;

use crate::backend::BackendError;
use crate::models::{AccessToken, PanelState};

/// Result of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran to completion.
    Completed,
    /// The user declined a confirmation; nothing was sent.
    Declined,
    /// The operation failed; the reason is in the panel state.
    Failed,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Completed`].
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Answer to a "are you sure?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Message shown when the stored session is gone.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Clone the bearer token, or flag the state as logged out.
pub(crate) fn require_token(state: &mut PanelState) -> Option<AccessToken> {
    let token = state.token().cloned();
    if token.is_none() {
        state.notify_error("You are not logged in.");
    }
    token
}

/// Turn a failed backend call into a notice.
///
/// A 401 means the token expired: the session is dropped so the next render
/// shows the login form.
pub(crate) fn report_failure(state: &mut PanelState, action: &str, error: &BackendError) {
    warn!(%error, action, "Backend call failed");
    if matches!(error, BackendError::Unauthorized(_)) {
        state.session = None;
        state.login_error = Some(SESSION_EXPIRED.to_string());
    }
    state.notify_error(format!("{action}: {error}"));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! In-memory [`Backend`] used by the controller tests.

    use std::sync::Mutex;

    use secrecy::{ExposeSecret, SecretString};

    use roster_core::{
        CustomerRecord, RecordKey, RecordPatch, Role, UserAccount, UserAccountId,
        UserRef, Username,
    };

    use crate::backend::{
        Backend, BackendError, LoginResponse, NewUserAccount, RecordRow, UserAccountPatch,
    };
    use crate::models::{AccessToken, PanelSession, PanelState};

    /// One recorded backend call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Login(String),
        Logout,
        ListRecords,
        CreateRecord(String),
        UpdateRecord(RecordKey),
        DeleteRecord(RecordKey),
        ListUsers,
        CreateUser(String),
        UpdateUser(UserRef),
        DeleteUser(UserRef),
    }

    #[derive(Default)]
    struct Inner {
        records: Vec<CustomerRecord>,
        users: Vec<UserAccount>,
        calls: Vec<Call>,
        fail_creates_from: Option<usize>,
        creates: usize,
        create_error: Option<serde_json::Value>,
        fail_logout: bool,
    }

    /// Positional, index-addressed fake collection, like a spreadsheet API.
    #[derive(Default)]
    pub struct FakeBackend {
        inner: Mutex<Inner>,
    }

    impl FakeBackend {
        pub fn with_records(records: Vec<CustomerRecord>) -> Self {
            let backend = Self::default();
            backend.lock().records = records;
            backend
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
            self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }

        pub fn calls(&self) -> Vec<Call> {
            self.lock().calls.clone()
        }

        pub fn records(&self) -> Vec<CustomerRecord> {
            self.lock().records.clone()
        }

        pub fn users(&self) -> Vec<UserAccount> {
            self.lock().users.clone()
        }

        pub fn add_user(&self, id: i64, username: &str, role: Role) {
            self.lock().users.push(UserAccount {
                id: Some(UserAccountId::new(id)),
                username: username.to_string(),
                role,
            });
        }

        /// Every create call after the first `n` successful ones fails.
        pub fn fail_creates_after(&self, n: usize) {
            self.lock().fail_creates_from = Some(n);
        }

        /// Account creation answers 400 with this body.
        pub fn reject_user_creation(&self, body: serde_json::Value) {
            self.lock().create_error = Some(body);
        }

        pub fn fail_logout(&self) {
            self.lock().fail_logout = true;
        }

        fn index(key: RecordKey, len: usize) -> Result<usize, BackendError> {
            match key {
                RecordKey::Index(i) if i < len => Ok(i),
                _ => Err(BackendError::Api {
                    status: 404,
                    message: "Record not found".to_string(),
                }),
            }
        }
    }

    pub fn session(role: Role) -> PanelState {
        PanelState {
            session: Some(PanelSession {
                identity: Username::parse("tester").unwrap(),
                role,
                token: AccessToken::new("token".to_string()),
            }),
            ..PanelState::default()
        }
    }

    impl Backend for FakeBackend {
        async fn login(
            &self,
            username: &Username,
            password: &SecretString,
        ) -> Result<LoginResponse, BackendError> {
            self.lock()
                .calls
                .push(Call::Login(username.as_str().to_string()));
            match (username.as_str(), password.expose_secret()) {
                ("admin", "admin123") => Ok(LoginResponse {
                    role: Role::Admin,
                    token: Some("admin-token".to_string()),
                }),
                ("maria", "senha") => Ok(LoginResponse {
                    role: Role::User,
                    token: Some("user-token".to_string()),
                }),
                ("notoken", _) => Ok(LoginResponse {
                    role: Role::User,
                    token: None,
                }),
                _ => Err(BackendError::Unauthorized(
                    "Credenciais inválidas".to_string(),
                )),
            }
        }

        async fn logout(&self, _token: &AccessToken) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::Logout);
            if inner.fail_logout {
                return Err(BackendError::Api {
                    status: 500,
                    message: "down".to_string(),
                });
            }
            Ok(())
        }

        async fn list_records(&self, _token: &AccessToken) -> Result<Vec<RecordRow>, BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::ListRecords);
            Ok(inner
                .records
                .iter()
                .map(|record| RecordRow {
                    id: None,
                    record: record.clone(),
                })
                .collect())
        }

        async fn create_record(
            &self,
            _token: &AccessToken,
            record: &CustomerRecord,
        ) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner
                .calls
                .push(Call::CreateRecord(record.full_name.clone()));
            if inner.fail_creates_from.is_some_and(|n| inner.creates >= n) {
                return Err(BackendError::Api {
                    status: 502,
                    message: "Bad Gateway".to_string(),
                });
            }
            inner.creates += 1;
            inner.records.push(record.clone());
            Ok(())
        }

        async fn update_record(
            &self,
            _token: &AccessToken,
            key: RecordKey,
            patch: &RecordPatch,
        ) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::UpdateRecord(key));
            let index = Self::index(key, inner.records.len())?;
            let merged = patch.merged_onto(&inner.records[index]);
            inner.records[index] = merged;
            Ok(())
        }

        async fn delete_record(
            &self,
            _token: &AccessToken,
            key: RecordKey,
        ) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::DeleteRecord(key));
            let index = Self::index(key, inner.records.len())?;
            inner.records.remove(index);
            Ok(())
        }

        async fn list_users(&self, _token: &AccessToken) -> Result<Vec<UserAccount>, BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::ListUsers);
            Ok(inner.users.clone())
        }

        async fn create_user(
            &self,
            _token: &AccessToken,
            account: &NewUserAccount,
        ) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner
                .calls
                .push(Call::CreateUser(account.username.as_str().to_string()));
            if let Some(body) = &inner.create_error {
                return Err(roster_core::FieldErrors::from_payload(body).map_or_else(
                    || BackendError::Api {
                        status: 400,
                        message: roster_core::describe_error_payload(body),
                    },
                    BackendError::Validation,
                ));
            }
            let id = i64::try_from(inner.users.len()).unwrap_or_default() + 1;
            inner.users.push(UserAccount {
                id: Some(UserAccountId::new(id)),
                username: account.username.as_str().to_string(),
                role: account.role,
            });
            Ok(())
        }

        async fn update_user(
            &self,
            _token: &AccessToken,
            user: &UserRef,
            patch: &UserAccountPatch,
        ) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::UpdateUser(user.clone()));
            if let Some(role) = patch.role {
                for account in &mut inner.users {
                    if &account.reference() == user {
                        account.role = role;
                    }
                }
            }
            Ok(())
        }

        async fn delete_user(&self, _token: &AccessToken, user: &UserRef) -> Result<(), BackendError> {
            let mut inner = self.lock();
            inner.calls.push(Call::DeleteUser(user.clone()));
            inner.users.retain(|account| &account.reference() != user);
            Ok(())
        }
    }
}
