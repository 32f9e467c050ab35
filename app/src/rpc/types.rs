//! Application types
//!
//! Input and output contracts of every procedure. Structure is checked by
//! serde; the `Validate` impls add the rules serde cannot express.

use serde::{Deserialize, Serialize};
use typed_rpc::{Validate, ValidationResult, ValidationRules};

// =============================================================================
// User Types
// =============================================================================

/// Input for looking up a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGetInput {
    pub id: String,
}

impl Validate for UserGetInput {
    fn validate(&self) -> ValidationResult {
        ValidationRules::new().required("id", &self.id).build()
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    pub name: String,
}

impl UserData {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Validate for UserData {
    fn validate(&self) -> ValidationResult {
        ValidationRules::new()
            .required("id", &self.id)
            .required("name", &self.name)
            .build()
    }
}

// =============================================================================
// Auth Types
// =============================================================================

/// Input for authenticating by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateInput {
    pub email: String,
}

impl Validate for AuthenticateInput {
    fn validate(&self) -> ValidationResult {
        let rules = ValidationRules::new().required("email", &self.email);
        if self.email.is_empty() {
            return rules.build();
        }
        rules.email("email", &self.email).build()
    }
}

/// Authentication result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateData {
    #[serde(default)]
    pub authenticated: bool,
}

impl Validate for AuthenticateData {
    fn validate(&self) -> ValidationResult {
        ValidationResult::ok()
    }
}

// =============================================================================
// Example Types
// =============================================================================

/// Input of the example procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleInput {
    pub id: String,
}

impl Validate for ExampleInput {
    fn validate(&self) -> ValidationResult {
        ValidationRules::new().required("id", &self.id).build()
    }
}

/// Output of the example procedure; same shape as a user
pub type ExampleData = UserData;
