//! Create/update form for a single employee record.
//!
//! The controller is bound to one route identifier. `"-1"` opens a blank form
//! that creates a record on submit; any other identifier loads that record and
//! updates it on submit.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::{Employee, EmployeeTarget};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::DEFAULT_DASHBOARD_ROUTE,
    error::ClientError,
    session::SessionManager,
    validation::{validate_employee, ValidationErrors},
    EmployeeBackend,
};

pub const FETCH_FAILED: &str = "Failed to fetch employee details.";
pub const CREATE_FAILED: &str = "Failed to create employee details.";
pub const UPDATE_FAILED: &str = "Failed to update employee details.";
pub const CREATED_NOTICE: &str = "Employee created successfully.";
pub const UPDATED_NOTICE: &str = "Employee details updated successfully.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    /// Waiting for the existing record to load.
    Loading,
    Ready,
    /// The record could not be loaded; the form is not rendered.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("the form is not ready for submission")]
    NotReady,
    #[error("a submission is already in flight")]
    Busy,
    #[error("the form has been closed")]
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved { notice: &'static str },
    Invalid(ValidationErrors),
    Failed(&'static str),
    Rejected(SubmitRejection),
}

/// Teardown handle for a form. Once torn down, in-flight requests are dropped
/// and their results never reach the form.
#[derive(Debug, Clone)]
pub struct FormLifecycle {
    closed: Arc<watch::Sender<bool>>,
    submitting: Arc<AtomicBool>,
}

impl FormLifecycle {
    fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                closed: Arc::new(tx),
                submitting: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    pub fn teardown(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_torn_down(&self) -> bool {
        *self.closed.borrow()
    }

    /// True while a create or update request is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }
}

/// Holds the submitting flag for the lifetime of one request. Dropping it
/// clears the flag, including when the `submit` future itself is dropped.
struct SubmitGuard(Arc<AtomicBool>);

impl SubmitGuard {
    fn begin(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn torn_down(mut closed: watch::Receiver<bool>) {
    if closed.wait_for(|closed| *closed).await.is_err() {
        // Sender gone means the form itself is gone.
        std::future::pending::<()>().await;
    }
}

pub struct EmployeeFormController {
    backend: Arc<dyn EmployeeBackend>,
    username: String,
    target: EmployeeTarget,
    dashboard_route: String,
    values: Employee,
    phase: FormPhase,
    field_errors: ValidationErrors,
    error: Option<String>,
    notice: Option<&'static str>,
    navigation: Option<String>,
    lifecycle: FormLifecycle,
    closed: watch::Receiver<bool>,
}

impl EmployeeFormController {
    /// Binds a form to `route_id` for the session's user. The session must
    /// already be authenticated.
    pub async fn for_session(
        session: &SessionManager,
        route_id: &str,
    ) -> Result<Self, ClientError> {
        let username = session
            .username()
            .await
            .ok_or(ClientError::NotAuthenticated)?;
        Self::new(session.backend(), username, route_id)
    }

    pub fn new(
        backend: Arc<dyn EmployeeBackend>,
        username: impl Into<String>,
        route_id: &str,
    ) -> Result<Self, ClientError> {
        let target = EmployeeTarget::from_route_id(route_id)
            .ok_or_else(|| ClientError::InvalidRouteId(route_id.to_string()))?;
        let phase = if target.is_new() {
            FormPhase::Ready
        } else {
            FormPhase::Loading
        };
        let (lifecycle, closed) = FormLifecycle::new();

        Ok(Self {
            backend,
            username: username.into(),
            target,
            dashboard_route: DEFAULT_DASHBOARD_ROUTE.to_string(),
            values: Employee::default(),
            phase,
            field_errors: ValidationErrors::default(),
            error: None,
            notice: None,
            navigation: None,
            lifecycle,
            closed,
        })
    }

    pub fn with_dashboard_route(mut self, route: impl Into<String>) -> Self {
        self.dashboard_route = route.into();
        self
    }

    /// Loads the bound record, or presents blank values for a new one.
    pub async fn activate(&mut self) {
        let id = match &self.target {
            EmployeeTarget::New => {
                self.values = Employee::default();
                self.phase = FormPhase::Ready;
                return;
            }
            EmployeeTarget::Existing(id) => id.clone(),
        };
        if self.lifecycle.is_torn_down() {
            return;
        }

        self.phase = FormPhase::Loading;
        self.error = None;
        let backend = Arc::clone(&self.backend);
        let username = self.username.clone();

        let result = tokio::select! {
            result = backend.get_employee(&username, &id) => result,
            () = torn_down(self.closed.clone()) => {
                debug!(employee_id = %id, "employee: form closed, dropping fetch");
                return;
            }
        };

        match result {
            Ok(employee) => {
                info!(username = %self.username, employee_id = %id, "employee: details loaded");
                self.values = employee;
                self.phase = FormPhase::Ready;
            }
            Err(err) => {
                warn!(
                    username = %self.username,
                    employee_id = %id,
                    error = %format!("{err:#}"),
                    "employee: failed to fetch details"
                );
                self.error = Some(FETCH_FAILED.to_string());
                self.phase = FormPhase::Failed(FETCH_FAILED.to_string());
            }
        }
    }

    /// Records edited values and refreshes the inline field errors.
    pub fn validate(&mut self, values: Employee) -> &ValidationErrors {
        self.field_errors = validate_employee(&values);
        self.values = values;
        &self.field_errors
    }

    /// Validates and then creates or updates the record, depending on the
    /// target the form was bound to.
    pub async fn submit(&mut self, values: Employee) -> SubmitOutcome {
        if self.lifecycle.is_torn_down() {
            return SubmitOutcome::Rejected(SubmitRejection::TornDown);
        }
        if self.phase != FormPhase::Ready {
            return SubmitOutcome::Rejected(SubmitRejection::NotReady);
        }
        if self.lifecycle.is_submitting() {
            return SubmitOutcome::Rejected(SubmitRejection::Busy);
        }

        if !self.validate(values).is_empty() {
            debug!(
                invalid_fields = self.field_errors.len(),
                "employee: submission blocked by validation"
            );
            return SubmitOutcome::Invalid(self.field_errors.clone());
        }

        let Some(in_flight) = SubmitGuard::begin(&self.lifecycle.submitting) else {
            return SubmitOutcome::Rejected(SubmitRejection::Busy);
        };
        self.error = None;
        self.notice = None;

        let payload = self.values.trimmed();
        let backend = Arc::clone(&self.backend);
        let username = self.username.clone();
        let target = self.target.clone();
        let (request, notice, failure) = match &target {
            EmployeeTarget::New => (
                backend.create_employee(&username, &payload),
                CREATED_NOTICE,
                CREATE_FAILED,
            ),
            EmployeeTarget::Existing(id) => (
                backend.update_employee(&username, id, &payload),
                UPDATED_NOTICE,
                UPDATE_FAILED,
            ),
        };

        let result = tokio::select! {
            result = request => result,
            () = torn_down(self.closed.clone()) => {
                debug!("employee: form closed, dropping submission");
                return SubmitOutcome::Rejected(SubmitRejection::TornDown);
            }
        };
        drop(in_flight);

        match result {
            Ok(()) => {
                info!(username = %self.username, "employee: {notice}");
                self.notice = Some(notice);
                self.navigation = Some(self.dashboard_route.clone());
                SubmitOutcome::Saved { notice }
            }
            Err(err) => {
                warn!(
                    username = %self.username,
                    error = %format!("{err:#}"),
                    "employee: {failure}"
                );
                self.error = Some(failure.to_string());
                SubmitOutcome::Failed(failure)
            }
        }
    }

    pub fn lifecycle(&self) -> FormLifecycle {
        self.lifecycle.clone()
    }

    pub fn target(&self) -> &EmployeeTarget {
        &self.target
    }

    pub fn values(&self) -> &Employee {
        &self.values
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FormPhase::Loading
    }

    pub fn is_submitting(&self) -> bool {
        self.lifecycle.is_submitting()
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    /// Route to navigate to after a successful submit. Taken once.
    pub fn take_navigation(&mut self) -> Option<String> {
        self.navigation.take()
    }
}
