use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The kind of account a bearer token was issued to.
///
/// Students and teachers live in separate tables with separate credential
/// namespaces, so the same username may exist once per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    Student,
    Teacher,
}

impl PrincipalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::Student => "student",
            PrincipalType::Teacher => "teacher",
        }
    }

    /// Table holding this principal's credentials.
    pub fn table(&self) -> &'static str {
        match self {
            PrincipalType::Student => "students",
            PrincipalType::Teacher => "teachers",
        }
    }

    /// Capitalized name used in response messages.
    pub fn label(&self) -> &'static str {
        match self {
            PrincipalType::Student => "Student",
            PrincipalType::Teacher => "Teacher",
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
