//! Read-only transfer projection of a [`Student`].
//!
//! Used when a record leaves the core (CLI output, serialization). A DTO has
//! no link back to the store; mutating the record means building a new
//! [`Student`] and calling the repository.

use crate::model::student::Student;
use serde::Serialize;

/// Serializable snapshot of a student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentDto {
    registration: String,
    national_id: String,
    name: String,
    email: String,
    phone: String,
}

impl StudentDto {
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

    /// Renders the compact JSON form of this snapshot.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Student> for StudentDto {
    fn from(student: &Student) -> Self {
        Self {
            registration: student.registration().to_string(),
            national_id: student.national_id().to_string(),
            name: student.name().to_string(),
            email: student.email().to_string(),
            phone: student.phone().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StudentDto;
    use crate::model::student::Student;
    use serde_json::Value;

    #[test]
    fn dto_copies_every_field() {
        let student = Student::new("2023001", "111", "Ana", "ana@example.com", "555").unwrap();
        let dto = StudentDto::from(&student);

        assert_eq!(dto.registration(), "2023001");
        assert_eq!(dto.national_id(), "111");
        assert_eq!(dto.name(), "Ana");
        assert_eq!(dto.email(), "ana@example.com");
        assert_eq!(dto.phone(), "555");
    }

    #[test]
    fn to_json_emits_all_fields_and_escapes_quotes() {
        let student = Student::new("2023001", "111", "Ana \"Nina\"", "ana@example.com", "555")
            .unwrap();
        let json = StudentDto::from(&student).to_json().unwrap();

        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["registration"], "2023001");
        assert_eq!(parsed["national_id"], "111");
        assert_eq!(parsed["name"], "Ana \"Nina\"");
        assert_eq!(parsed["email"], "ana@example.com");
        assert_eq!(parsed["phone"], "555");
        assert_eq!(parsed.as_object().unwrap().len(), 5);
    }
}
