use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::RegisterCommand;
use crate::identity::errors::IdentityError;
use crate::identity::ports::IdentityRepository;
use crate::identity::ports::IdentityServicePort;

/// Argon2id hash (default cost parameters) that no password matches.
///
/// Unknown emails are verified against it so they cost as much as a wrong password.
pub const UNKNOWN_IDENTITY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$K8mQBZRzRI5uvUQqoWv6oA$8aN49HTRt5nXcREljbaYmpoeGozf4EfKZKeNwqfmpvI";

/// Domain service implementation for registration and login.
///
/// Concrete implementation of IdentityServicePort with dependency injection.
pub struct IdentityService<IR>
where
    IR: IdentityRepository,
{
    repository: Arc<IR>,
    password_hasher: auth::PasswordHasher,
}

impl<IR> IdentityService<IR>
where
    IR: IdentityRepository,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    pub fn new(repository: Arc<IR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<IR> IdentityServicePort for IdentityService<IR>
where
    IR: IdentityRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Identity, IdentityError> {
        if self.repository.count_by_email(&command.email).await? > 0 {
            tracing::info!("Registration rejected: email already registered");
            return Err(IdentityError::EmailAlreadyExists(command.email.to_string()));
        }

        if self.repository.count_by_username(&command.username).await? > 0 {
            tracing::info!(
                username = %command.username,
                "Registration rejected: username already taken"
            );
            return Err(IdentityError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(command.password.as_str())?;

        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.insert(identity).await?;
        tracing::info!(identity_id = %created.id, "Identity registered");

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let Some(identity) = self.repository.find_by_email(email).await? else {
            self.password_hasher
                .verify(password, UNKNOWN_IDENTITY_PASSWORD_HASH)?;
            return Err(IdentityError::NotFoundByEmail(email.to_string()));
        };

        if !self
            .password_hasher
            .verify(password, &identity.password_hash)?
        {
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(identity)
    }

    async fn check_readiness(&self) -> Result<(), IdentityError> {
        self.repository.ping().await
    }
}
