//! Client-side checks run before an employee form may be submitted.

use std::sync::OnceLock;

use regex::Regex;
use shared::domain::Employee;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Invalid email format";
pub const DESIGNATION_REQUIRED: &str = "Designation is required";

static EMAIL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn email_pattern() -> Option<&'static Regex> {
    EMAIL_PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
            )
            .ok()
        })
        .as_ref()
}

/// An email that cannot be checked is treated as malformed.
fn is_well_formed_email(email: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(email))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EmployeeField {
    Name,
    Email,
    Designation,
}

impl EmployeeField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Designation => "designation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: EmployeeField,
    pub message: &'static str,
}

/// At most one message per field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: EmployeeField) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn push(&mut self, field: EmployeeField, message: &'static str) {
        self.0.push(FieldError { field, message });
    }
}

pub fn validate_employee(values: &Employee) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if values.name.trim().is_empty() {
        errors.push(EmployeeField::Name, NAME_REQUIRED);
    }

    let email = values.email.trim();
    if email.is_empty() {
        errors.push(EmployeeField::Email, EMAIL_REQUIRED);
    } else if !is_well_formed_email(email) {
        errors.push(EmployeeField::Email, EMAIL_INVALID);
    }

    if values.designation.trim().is_empty() {
        errors.push(EmployeeField::Designation, DESIGNATION_REQUIRED);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_record_passes() {
        let errors = validate_employee(&Employee::new("Ann", "ann@x.com", "Eng"));
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn blank_form_reports_every_required_field() {
        let errors = validate_employee(&Employee::default());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(EmployeeField::Name), Some(NAME_REQUIRED));
        assert_eq!(errors.get(EmployeeField::Email), Some(EMAIL_REQUIRED));
        assert_eq!(
            errors.get(EmployeeField::Designation),
            Some(DESIGNATION_REQUIRED)
        );
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let errors = validate_employee(&Employee::new("   ", "ann@x.com", "\t"));
        assert_eq!(errors.get(EmployeeField::Name), Some(NAME_REQUIRED));
        assert_eq!(
            errors.get(EmployeeField::Designation),
            Some(DESIGNATION_REQUIRED)
        );
        assert_eq!(errors.get(EmployeeField::Email), None);
    }

    #[test]
    fn email_pattern_compiles() {
        assert!(email_pattern().is_some());
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["not-an-email", "ann@", "@x.com", "ann@x", "ann x@x.com", "ann@-x.com"] {
            let errors = validate_employee(&Employee::new("Ann", email, "Eng"));
            assert_eq!(
                errors.get(EmployeeField::Email),
                Some(EMAIL_INVALID),
                "accepted {email:?}"
            );
        }
    }

    #[test]
    fn common_email_shapes_are_accepted() {
        for email in ["ann@x.com", "first.last+tag@mail.example.org", " ann@x.com "] {
            let errors = validate_employee(&Employee::new("Ann", email, "Eng"));
            assert!(errors.is_empty(), "rejected {email:?}: {errors:?}");
        }
    }
}
