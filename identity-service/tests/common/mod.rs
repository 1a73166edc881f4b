pub mod postgres;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::TokenService;
use auth::TokenSettings;
use identity_service::config::CookieConfig;
use identity_service::domain::identity::models::EmailAddress;
use identity_service::domain::identity::models::Identity;
use identity_service::domain::identity::models::Username;
use identity_service::domain::identity::ports::IdentityRepository;
use identity_service::domain::identity::service::IdentityService;
use identity_service::identity::errors::IdentityError;
use identity_service::inbound::http::router::create_router;

pub const ACCESS_SECRET: &str = "test-access-secret-for-signing-at-least-32-bytes";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-signing-at-least-32-bytes";

/// Credential store double with the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: Mutex<Vec<Identity>>,
    unavailable: AtomicBool,
}

impl InMemoryIdentityRepository {
    pub fn count_by_email_sync(&self, email: &str) -> usize {
        self.identities
            .lock()
            .unwrap()
            .iter()
            .filter(|identity| identity.email.as_str() == email)
            .count()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::DatabaseError(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError> {
        self.check_available()?;
        Ok(self
            .identities
            .lock()
            .unwrap()
            .iter()
            .find(|identity| identity.email.as_str() == email)
            .cloned())
    }

    async fn count_by_email(&self, email: &EmailAddress) -> Result<i64, IdentityError> {
        self.check_available()?;
        Ok(self.count_by_email_sync(email.as_str()) as i64)
    }

    async fn count_by_username(&self, username: &Username) -> Result<i64, IdentityError> {
        self.check_available()?;
        Ok(self
            .identities
            .lock()
            .unwrap()
            .iter()
            .filter(|identity| identity.username == *username)
            .count() as i64)
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, IdentityError> {
        self.check_available()?;
        let mut identities = self.identities.lock().unwrap();
        if identities.iter().any(|i| i.username == identity.username) {
            return Err(IdentityError::UsernameAlreadyExists(
                identity.username.to_string(),
            ));
        }
        if identities.iter().any(|i| i.email == identity.email) {
            return Err(IdentityError::EmailAlreadyExists(identity.email.to_string()));
        }
        identities.push(identity.clone());
        Ok(identity)
    }

    async fn ping(&self) -> Result<(), IdentityError> {
        self.check_available()
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryIdentityRepository>,
    pub token_service: Arc<TokenService>,
    /// Client without a cookie jar; tokens travel only where a test puts them.
    pub api_client: reqwest::Client,
    /// Client that keeps cookies between requests, like a browser.
    pub browser_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryIdentityRepository::default());
        let identity_service = Arc::new(IdentityService::new(Arc::clone(&repository)));
        let token_service = Arc::new(
            TokenService::new(TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET))
                .expect("Failed to create token service"),
        );

        let router = create_router(
            identity_service,
            Arc::clone(&token_service),
            CookieConfig { secure: false },
            Duration::from_secs(10),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            token_service,
            api_client: reqwest::Client::new(),
            browser_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an identity and assert it was created
    pub async fn register(&self, username: &str, email: &str, password: &str) {
        let response = self
            .post("/v1/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    /// Log in and return the parsed response body
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/v1/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }
}
