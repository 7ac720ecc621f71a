//! Sign-up form validation and registration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{PasswordService, UserRepository};

pub const USERNAME_TAKEN: &str = "Sorry, that username already exists";
const SIGNED_IN_REDIRECT: &str = "/";
const REGISTERED_REDIRECT: &str = "/sign-up-message";

/// Values submitted on the sign-up page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub consent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    AlreadySignedIn { redirect: &'static str },
    UsernameTaken { message: &'static str },
    Registered { user: User, redirect: &'static str },
}

/// Check every field and collect all problems.
pub fn validate(form: &SignUpForm) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut fail = |field, message| errors.push(FieldError { field, message });

    let display_name = form.display_name.trim();
    if display_name.is_empty() {
        fail("display_name", "Required");
    } else if display_name.chars().count() < 2 {
        fail("display_name", "Too short");
    } else if !display_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
    {
        fail("display_name", "Only letters and numbers are allowed");
    }

    let email = form.email.trim();
    if email.is_empty() {
        fail("email", "Required");
    } else if !is_valid_email(email) {
        fail("email", "Invalid email");
    }

    if form.password.is_empty() {
        fail("password", "Password is required");
    }

    if form.confirm_password.is_empty() {
        fail("confirm_password", "Password confirm is required");
    } else if form.confirm_password != form.password {
        fail("confirm_password", "Your new password does not match");
    }

    if !form.consent {
        fail("consent", "Consent is required");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Username derived from a display name: lowercase, special characters removed.
pub fn format_lower_no_special(display_name: &str) -> String {
    display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect::<String>()
        .to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Registers new members.
#[derive(Clone)]
pub struct SignUpService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl SignUpService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Register `form` unless the viewer is already signed in or the
    /// username is taken.
    pub async fn submit(
        &self,
        signed_in: Option<&User>,
        form: &SignUpForm,
    ) -> Result<SignUpOutcome, DomainError> {
        if signed_in.is_some() {
            return Ok(SignUpOutcome::AlreadySignedIn {
                redirect: SIGNED_IN_REDIRECT,
            });
        }

        validate(form).map_err(|errors| {
            let fields: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            DomainError::Validation(fields.join(", "))
        })?;

        let username = format_lower_no_special(form.display_name.trim());
        if !self.is_username_available(&username).await? {
            tracing::debug!(username = %username, "Sign-up rejected, username taken");
            return Ok(SignUpOutcome::UsernameTaken {
                message: USERNAME_TAKEN,
            });
        }

        let password_hash = self
            .passwords
            .hash(&form.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(
            username,
            form.display_name.trim().to_string(),
            form.email.trim().to_string(),
            password_hash,
        );
        let user = self.users.save(user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(SignUpOutcome::Registered {
            user,
            redirect: REGISTERED_REDIRECT,
        })
    }

    /// Deleted profiles free their username.
    pub async fn is_username_available(&self, username: &str) -> Result<bool, DomainError> {
        let existing = self.users.find_by_username(username).await?;
        Ok(existing.is_none_or(|user| user.deleted))
    }
}
