//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record persisted by the store.
//! - Validate the business key before a record can exist.
//!
//! # Invariants
//! - `registration` is non-empty, trimmed and free of control characters.
//! - A `Student` is immutable once constructed; changes produce a new value.
//! - Uniqueness of `registration` is enforced by the store index, not here.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Business key of a student record (the enrollment/registration number).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type Registration = String;

/// Validation failures raised while constructing a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// Registration is empty or whitespace-only.
    EmptyRegistration,
    /// Registration contains characters that cannot be used as a key.
    InvalidRegistration(String),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRegistration => write!(f, "registration must not be empty"),
            Self::InvalidRegistration(value) => {
                write!(f, "registration `{}` contains control characters", value.escape_debug())
            }
        }
    }
}

impl Error for StudentValidationError {}

/// Canonical student record.
///
/// Fields are private; read them through the getters. Records read back from
/// the store are rebuilt through [`Student::new`], so persisted data goes
/// through the same validation as caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    registration: Registration,
    national_id: String,
    name: String,
    email: String,
    phone: String,
}

impl Student {
    /// Creates a validated student record.
    ///
    /// The registration is trimmed; profile fields are stored as given and
    /// may be empty.
    ///
    /// # Errors
    /// - [`StudentValidationError::EmptyRegistration`] for blank keys.
    /// - [`StudentValidationError::InvalidRegistration`] for keys holding
    ///   control characters.
    pub fn new(
        registration: impl Into<String>,
        national_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, StudentValidationError> {
        let registration = normalize_registration(registration.into())?;
        Ok(Self {
            registration,
            national_id: national_id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        })
    }

    pub fn registration(&self) -> &str {
        &self.registration
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

fn normalize_registration(value: String) -> Result<Registration, StudentValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StudentValidationError::EmptyRegistration);
    }
    if trimmed.chars().any(char::is_control) {
        return Err(StudentValidationError::InvalidRegistration(trimmed.to_string()));
    }
    if trimmed.len() == value.len() {
        return Ok(value);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Student, StudentValidationError};

    #[test]
    fn new_trims_registration_and_keeps_profile_fields() {
        let student = Student::new(
            "  2023001 ",
            "123.456.789-00",
            "Ana Souza",
            "ana@example.com",
            "+55 21 99999-0000",
        )
        .unwrap();

        assert_eq!(student.registration(), "2023001");
        assert_eq!(student.national_id(), "123.456.789-00");
        assert_eq!(student.name(), "Ana Souza");
        assert_eq!(student.email(), "ana@example.com");
        assert_eq!(student.phone(), "+55 21 99999-0000");
    }

    #[test]
    fn new_rejects_blank_registration() {
        let err = Student::new("   ", "", "", "", "").unwrap_err();
        assert_eq!(err, StudentValidationError::EmptyRegistration);
    }

    #[test]
    fn new_rejects_control_characters_in_registration() {
        let err = Student::new("20\n23", "", "", "", "").unwrap_err();
        assert!(matches!(err, StudentValidationError::InvalidRegistration(_)));
        assert!(err.to_string().contains("control characters"));
    }

    #[test]
    fn profile_fields_may_be_empty() {
        let student = Student::new("2023002", "", "", "", "").unwrap();
        assert_eq!(student.name(), "");
        assert_eq!(student.email(), "");
    }
}
