use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    load_settings, normalize_base_url, EmployeeFormController, FormPhase, HttpBackend,
    SessionManager, SubmitOutcome,
};
use shared::domain::{Employee, NEW_EMPLOYEE_SENTINEL};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Create or update an employee record on the backend.
#[derive(Parser, Debug)]
struct Args {
    /// Overrides `api_base_url` from client.toml / the environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: String,
    #[arg(long, env = "EMPLOYEE_CLI_PASSWORD", hide_env_values = true)]
    password: String,
    /// Employee id to edit; `-1` creates a new record.
    #[arg(long, default_value = NEW_EMPLOYEE_SENTINEL, allow_hyphen_values = true)]
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    designation: Option<String>,
}

impl Args {
    fn overlay(&self, mut values: Employee) -> Employee {
        if let Some(name) = &self.name {
            values.name = name.clone();
        }
        if let Some(email) = &self.email {
            values.email = email.clone();
        }
        if let Some(designation) = &self.designation {
            values.designation = designation.clone();
        }
        values
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(server_url) = &args.server_url {
        settings.api_base_url = normalize_base_url(server_url)?;
    }
    info!(api_base_url = %settings.api_base_url, "cli: using backend");

    let session = SessionManager::new(Arc::new(HttpBackend::new(&settings)?));
    if !session.login(&args.username, &args.password).await {
        bail!("login failed for user {}", args.username);
    }

    let mut form = EmployeeFormController::for_session(&session, &args.id)
        .await?
        .with_dashboard_route(settings.dashboard_route.clone());
    form.activate().await;
    if let FormPhase::Failed(message) = form.phase() {
        bail!("{message}");
    }

    let values = args.overlay(form.values().clone());
    let outcome = form.submit(values).await;
    session.logout().await;

    match outcome {
        SubmitOutcome::Saved { notice } => {
            println!("{notice}");
            if let Some(route) = form.take_navigation() {
                println!("-> {route}");
            }
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            for error in errors.iter() {
                eprintln!("{}: {}", error.field.as_str(), error.message);
            }
            bail!("employee form has {} invalid field(s)", errors.len())
        }
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Rejected(reason) => bail!("submission rejected: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_defaults_to_new_record_sentinel() {
        let args = Args::try_parse_from(["employee-cli", "--username", "alice", "--password", "pw"])
            .expect("args");
        assert_eq!(args.id, "-1");
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let args = Args::try_parse_from([
            "employee-cli",
            "--username",
            "alice",
            "--password",
            "pw",
            "--id",
            "42",
            "--designation",
            "Lead",
        ])
        .expect("args");

        let values = args.overlay(Employee::new("Ann", "ann@x.com", "Eng"));
        assert_eq!(values, Employee::new("Ann", "ann@x.com", "Lead"));
    }
}
