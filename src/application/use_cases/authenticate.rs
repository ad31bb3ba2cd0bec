//! # Authenticate Use Case
//!
//! Email + login-code authentication.
//!
//! `login` sends a code; `verify` checks it and upserts the [`User`]. Session
//! issuance (JWT cookie) is left to the API layer.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::OtpService;
use crate::domain::entities::{User, normalize_email};
use crate::domain::value_objects::{Role, UserId};
use crate::infrastructure::persistence::UserRepository;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

/// Use case for email/OTP authentication.
#[derive(Debug, Clone)]
pub struct AuthenticateUseCase {
    users: Arc<dyn UserRepository>,
    otp: OtpService,
    admin_emails: HashSet<String>,
}

impl AuthenticateUseCase {
    /// Creates the use case with an empty admin list.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, otp: OtpService) -> Self {
        Self {
            users,
            otp,
            admin_emails: HashSet::new(),
        }
    }

    /// Sets the emails granted the admin role. Invalid entries are ignored.
    #[must_use]
    pub fn with_admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_emails = emails
            .into_iter()
            .filter_map(|e| normalize_email(e.as_ref()).ok())
            .collect();
        self
    }

    /// Role granted to a canonical email.
    #[must_use]
    pub fn role_for(&self, email: &str) -> Role {
        if self.admin_emails.contains(email) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Sends a login code and returns the canonical email.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEmail` for malformed addresses, or an
    /// internal error if the code cannot be delivered.
    #[instrument(skip(self))]
    pub async fn login(&self, email: &str) -> ApplicationResult<String> {
        let email = normalize_email(email)?;
        self.otp.issue(&email).await?;
        info!(email = %email, "login code sent");
        Ok(email)
    }

    /// Checks the code and returns the (possibly new) user.
    ///
    /// The role is recomputed on every login so admin list changes apply at
    /// the next sign-in.
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidEmail` for malformed addresses
    /// - `ApplicationError::Validation` if the code is not six digits
    /// - `ApplicationError::Unauthorized` if the code is rejected
    #[instrument(skip(self, code))]
    pub async fn verify(&self, email: &str, code: &str) -> ApplicationResult<User> {
        let email = normalize_email(email)?;
        self.otp.verify(&email, code).await?;

        let role = self.role_for(&email);
        let user = match self.users.find_by_email(&email).await? {
            Some(mut user) => {
                if user.role() != role {
                    info!(user_id = %user.id(), %role, "role changed");
                    user.set_role(role);
                    self.users.save(&user).await?;
                }
                user
            }
            None => {
                let user = User::new(&email, role)?;
                self.users.save(&user).await?;
                info!(user_id = %user.id(), %role, "user created");
                user
            }
        };
        Ok(user)
    }

    /// Loads the user behind a session.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthorized` if the user no longer exists.
    pub async fn current_user(&self, id: &UserId) -> ApplicationResult<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::unauthorized("session user not found"))
    }
}
