use async_trait::async_trait;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::Username;
use crate::identity::errors::IdentityError;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// Email uniqueness is checked before username uniqueness; nothing is
    /// persisted unless both are free.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created identity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `PasswordHashing` - Password could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Identity, IdentityError>;

    /// Verify credentials.
    ///
    /// # Arguments
    /// * `email` - Email the identity registered with
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// The matching identity
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No identity with this email
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordHashing` - Stored hash could not be checked
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Check the credential store is reachable.
    ///
    /// # Errors
    /// * `DatabaseError` - Store is unreachable
    async fn check_readiness(&self) -> Result<(), IdentityError>;
}

/// Persistence operations for identities (the credential store).
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Retrieve identity by email address.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError>;

    /// Count identities registered with `email`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn count_by_email(&self, email: &EmailAddress) -> Result<i64, IdentityError>;

    /// Count identities registered with `username`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn count_by_username(&self, username: &Username) -> Result<i64, IdentityError>;

    /// Persist a new identity.
    ///
    /// # Returns
    /// Inserted identity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, identity: Identity) -> Result<Identity, IdentityError>;

    /// Round-trip to the store.
    ///
    /// # Errors
    /// * `DatabaseError` - Store is unreachable
    async fn ping(&self) -> Result<(), IdentityError>;
}
