use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Response};
use shared::{
    domain::{Employee, EmployeeId},
    error::{ApiError, ApiException},
};
use tracing::{debug, info};
use url::Url;

use crate::{
    auth::{AuthInterceptor, BasicAuthToken},
    config::ClientSettings,
    error::ClientError,
    EmployeeBackend,
};

const BASIC_AUTH_PATH: &str = "basicauth";

/// reqwest-backed [`EmployeeBackend`].
pub struct HttpBackend {
    http: Client,
    base_url: Url,
    interceptor: AuthInterceptor,
}

impl HttpBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(&settings.api_base_url).map_err(|err| ClientError::InvalidBaseUrl {
                url: settings.api_base_url.clone(),
                reason: err.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: settings.api_base_url.clone(),
                reason: "url cannot carry request paths".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            interceptor: AuthInterceptor::default(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("base url {} cannot carry request paths", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn employees_url(&self, username: &str) -> Result<Url> {
        self.endpoint(&["users", username, "employees"])
    }

    fn employee_url(&self, username: &str, id: &EmployeeId) -> Result<Url> {
        self.endpoint(&["users", username, "employees", &id.0])
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = ApiError::from_response(status.as_u16(), &body);
    Err(ApiException::new(status.as_u16(), error).into())
}

#[async_trait]
impl EmployeeBackend for HttpBackend {
    fn interceptor(&self) -> &AuthInterceptor {
        &self.interceptor
    }

    async fn authenticate(&self, token: &BasicAuthToken) -> Result<u16> {
        let url = self.endpoint(&[BASIC_AUTH_PATH])?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, token.header_value())
            .send()
            .await
            .context("authentication request failed")?;
        let status = response.status().as_u16();
        debug!(status, "http: authentication check answered");
        Ok(status)
    }

    async fn get_employee(&self, username: &str, id: &EmployeeId) -> Result<Employee> {
        let url = self.employee_url(username, id)?;
        let request = self.interceptor.apply(self.http.get(url)).await;
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to request employee {id}"))?;
        let employee = ensure_success(response)
            .await?
            .json::<Employee>()
            .await
            .with_context(|| format!("malformed employee {id} payload"))?;
        debug!(username, employee_id = %id, "http: employee fetched");
        Ok(employee)
    }

    async fn create_employee(&self, username: &str, employee: &Employee) -> Result<()> {
        let url = self.employees_url(username)?;
        let request = self.interceptor.apply(self.http.post(url).json(employee)).await;
        let response = request
            .send()
            .await
            .context("failed to send create employee request")?;
        ensure_success(response).await?;
        info!(username, "http: employee created");
        Ok(())
    }

    async fn update_employee(
        &self,
        username: &str,
        id: &EmployeeId,
        employee: &Employee,
    ) -> Result<()> {
        let url = self.employee_url(username, id)?;
        let request = self.interceptor.apply(self.http.put(url).json(employee)).await;
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to send update for employee {id}"))?;
        ensure_success(response).await?;
        info!(username, employee_id = %id, "http: employee updated");
        Ok(())
    }
}
