use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn, Span};

use super::domain::{normalize_email, AuthSession, AuthUser, LoginInput, NewAccount, RegisterInput};
use super::errors::{AuthError, ConflictField};
use super::password;
use super::repository::AuthRepository;
use super::token::{Claims, TokenIssuer};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Honour `is_admin` on self-registration. Off by default.
    pub allow_admin_self_registration: bool,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::from_secs(900),
            allow_admin_self_registration: false,
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    tokens: TokenIssuer,
    allow_admin_self_registration: bool,
}

fn required(value: Option<String>, field: &str) -> Result<String, AuthError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthError::missing_field(field)),
    }
}

impl<R: AuthRepository> AuthService<R> {
    /// Fails when the token TTL cannot be represented.
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            repo,
            tokens: TokenIssuer::new(&cfg.jwt_secret, cfg.token_ttl)?,
            allow_admin_self_registration: cfg.allow_admin_self_registration,
        })
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Register a new user with a hashed password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret")).unwrap();
    /// let input = RegisterInput { email: Some("user@example.com".into()), username: Some("user".into()), password: Some("pw123".into()), is_admin: None };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip_all, fields(email, user_id))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&required(input.email, "email")?);
        let username = required(input.username, "username")?.trim().to_string();
        let password = required(input.password, "password")?;
        Span::current().record("email", email.as_str());

        if !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".into()));
        }

        // Advisory pre-checks; the unique indexes behind create_user decide.
        if self.repo.find_user_by_email(&email).await?.is_some() {
            debug!("email already registered");
            return Err(AuthError::Conflict(ConflictField::Email));
        }
        if self.repo.find_user_by_username(&username).await?.is_some() {
            debug!(%username, "username already taken");
            return Err(AuthError::Conflict(ConflictField::Username));
        }

        let requested_admin = input.is_admin.unwrap_or(false);
        let is_admin = requested_admin && self.allow_admin_self_registration;
        if requested_admin && !is_admin {
            warn!(%username, "ignoring is_admin on self-registration");
        }

        let password_hash = password::hash_password(password).await?;
        let user = self
            .repo
            .create_user(NewAccount { email, username, password_hash, is_admin })
            .await?;
        Span::current().record("user_id", user.id.0);

        let token = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, is_admin = user.is_admin, algorithm = password::ALGORITHM, "user_registered");
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and issue a token.
    ///
    /// Unknown email and wrong password both yield `AuthError::Unauthorized`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret")).unwrap();
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: Some("u@e.com".into()), username: Some("u".into()), password: Some("Passw0rd".into()), is_admin: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: Some("u@e.com".into()), password: Some("Passw0rd".into()) })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// ```
    #[instrument(skip_all, fields(email, user_id))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let (email, password) = match (input.email, input.password) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (normalize_email(&e), p),
            _ => return Err(AuthError::Validation("Email and password are required".into())),
        };
        Span::current().record("email", email.as_str());

        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            password::verify_dummy(password).await;
            warn!("login failed: unknown email");
            return Err(AuthError::Unauthorized);
        };
        Span::current().record("user_id", user.id.0);

        let Some(cred) = self.repo.get_credentials(user.id).await? else {
            password::verify_dummy(password).await;
            warn!("login failed: no credentials stored");
            return Err(AuthError::Unauthorized);
        };

        if !password::verify_password(password, cred.password_hash).await? {
            warn!("login failed: password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let token = self.tokens.issue(user.id)?;
        info!("login_succeeded");
        Ok(AuthSession { user, token })
    }

    /// Verify a bearer token's signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }

    /// Resolve the user a verified token refers to.
    #[instrument(skip_all, fields(sub = %claims.sub))]
    pub async fn current_user(&self, claims: &Claims) -> Result<AuthUser, AuthError> {
        self.lookup_subject(claims).await
    }

    /// Same lookup as [`Self::current_user`], logged as a validation probe.
    #[instrument(skip_all, fields(sub = %claims.sub))]
    pub async fn validate_token(&self, claims: &Claims) -> Result<AuthUser, AuthError> {
        let user = self.lookup_subject(claims).await?;
        info!(user_id = %user.id, "token_validated");
        Ok(user)
    }

    async fn lookup_subject(&self, claims: &Claims) -> Result<AuthUser, AuthError> {
        let id = claims.user_id()?;
        match self.repo.find_user_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %id, "token subject has no user");
                Err(AuthError::NotFound)
            }
        }
    }
}
