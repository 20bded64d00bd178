use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("password must be at least 6 characters")]
    WeakPassword,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Shortest password the registration form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// Account role. Decides which area of the platform a user lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    /// Default page for this role after sign-in or a role mismatch.
    #[must_use]
    pub fn landing_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Student => "/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(UserError::UnknownRole(other.to_owned())),
        }
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// The signed-in account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

//
// ─── SIGN-IN / REGISTRATION INPUT ──────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_owned(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegistrationDraft {
    /// Checks the form locally before anything is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns `UserError` for a blank name, a malformed email or a short password.
    pub fn validate(self) -> Result<Self, UserError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        let email = self.email.trim().to_owned();
        if !looks_like_email(&email) {
            return Err(UserError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::WeakPassword);
        }
        Ok(Self {
            name,
            email,
            password: self.password,
            role: self.role,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
