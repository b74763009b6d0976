use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Employee, EmployeeId};

pub mod auth;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod session;
pub mod validation;

pub use auth::{AuthInterceptor, BasicAuthToken};
pub use config::{load_settings, normalize_base_url, ClientSettings};
pub use error::ClientError;
pub use form::{EmployeeFormController, FormLifecycle, FormPhase, SubmitOutcome, SubmitRejection};
pub use http::HttpBackend;
pub use session::{Session, SessionManager};
pub use validation::{validate_employee, EmployeeField, FieldError, ValidationErrors};

/// REST operations the client consumes.
///
/// Every call except [`EmployeeBackend::authenticate`] must pass through the
/// backend's [`AuthInterceptor`] so it carries the current credential.
#[async_trait]
pub trait EmployeeBackend: Send + Sync {
    /// The single credential-attachment rule shared with the session manager.
    fn interceptor(&self) -> &AuthInterceptor;

    /// Checks a Basic token against the backend and returns the HTTP status.
    /// Transport failures are errors; rejected credentials are not.
    async fn authenticate(&self, token: &BasicAuthToken) -> Result<u16>;

    async fn get_employee(&self, username: &str, id: &EmployeeId) -> Result<Employee>;

    async fn create_employee(&self, username: &str, employee: &Employee) -> Result<()>;

    async fn update_employee(
        &self,
        username: &str,
        id: &EmployeeId,
        employee: &Employee,
    ) -> Result<()>;
}

#[cfg(test)]
#[path = "tests/fake_backend.rs"]
mod fake_backend;

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod form_tests;

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod http_tests;
