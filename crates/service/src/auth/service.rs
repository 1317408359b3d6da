use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, AuthUser, Claims, SigninInput, SignupInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_hours, password_algorithm: "argon2".into() }
    }
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self::new(c.jwt_secret.clone(), c.token_ttl_hours)
    }
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::SignupInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 12));
    /// let input = SignupInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthUser, AuthError> {
        let email = input.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(AuthError::Validation("invalid email".into())),
        }
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name required".into()));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        if let Some(existing) = self.repo.find_user_by_email(email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo.create_user(email, input.name.trim()).await?;
        self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{SignupInput, SigninInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("secret", 12));
    /// let _ = tokio_test::block_on(svc.signup(SignupInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.signin(SigninInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signin(&self, input: SigninInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(input.email.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = %user.id, "signin rejected: wrong password");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user_signed_in");
        Ok(AuthSession { user, token })
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = Duration::try_hours(self.cfg.token_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::TokenError(format!("token ttl out of range: {}h", self.cfg.token_ttl_hours)))?;
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check signature and expiry of an HS256 token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc_with(repo: Arc<MockAuthRepository>, secret: &str) -> AuthService {
        AuthService::new(repo, AuthConfig::new(secret, 12))
    }

    fn signup_input(email: &str) -> SignupInput {
        SignupInput { email: email.into(), name: "Kim".into(), password: "Passw0rd!".into() }
    }

    #[tokio::test]
    async fn signup_hashes_password() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = svc_with(repo.clone(), "secret");
        let user = svc.signup(signup_input("kim@example.com")).await.unwrap();

        let cred = repo.credentials_for(user.id).unwrap();
        assert_ne!(cred.password_hash, "Passw0rd!");
        assert!(cred.password_hash.starts_with("$argon2"));
        assert_eq!(cred.password_algorithm, "argon2");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_and_invalid_input() {
        let svc = svc_with(Arc::new(MockAuthRepository::default()), "secret");
        svc.signup(signup_input("kim@example.com")).await.unwrap();

        assert!(matches!(svc.signup(signup_input("kim@example.com")).await, Err(AuthError::Conflict)));
        assert!(matches!(svc.signup(signup_input("no-at-sign")).await, Err(AuthError::Validation(_))));
        let short = SignupInput { password: "short".into(), ..signup_input("lee@example.com") };
        assert!(matches!(svc.signup(short).await, Err(AuthError::Validation(_))));
        let blank = SignupInput { name: "  ".into(), ..signup_input("lee@example.com") };
        assert!(matches!(svc.signup(blank).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn signin_issues_verifiable_token() {
        let svc = svc_with(Arc::new(MockAuthRepository::default()), "secret");
        let user = svc.signup(signup_input("kim@example.com")).await.unwrap();

        let session = svc
            .signin(SigninInput { email: "kim@example.com".into(), password: "Passw0rd!".into() })
            .await
            .unwrap();
        let claims = svc.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, "kim@example.com");
        assert_eq!(claims.uid, user.id.to_string());
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[tokio::test]
    async fn signin_rejects_wrong_password_and_unknown_user() {
        let svc = svc_with(Arc::new(MockAuthRepository::default()), "secret");
        svc.signup(signup_input("kim@example.com")).await.unwrap();

        let wrong = svc.signin(SigninInput { email: "kim@example.com".into(), password: "nope-nope".into() }).await;
        assert!(matches!(wrong, Err(AuthError::Unauthorized)));
        let unknown = svc.signin(SigninInput { email: "ghost@example.com".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn verify_rejects_foreign_and_expired_tokens() {
        let repo = Arc::new(MockAuthRepository::default());
        let issuer = svc_with(repo.clone(), "other-secret");
        let verifier = svc_with(repo.clone(), "secret");
        issuer.signup(signup_input("kim@example.com")).await.unwrap();
        let session = issuer
            .signin(SigninInput { email: "kim@example.com".into(), password: "Passw0rd!".into() })
            .await
            .unwrap();
        assert!(matches!(verifier.verify_token(&session.token), Err(AuthError::Unauthorized)));
        assert!(matches!(verifier.verify_token("not.a.jwt"), Err(AuthError::Unauthorized)));

        let expired = AuthService::new(repo, AuthConfig::new("secret", -1));
        let user = AuthUser { id: uuid::Uuid::new_v4(), email: "kim@example.com".into(), name: "Kim".into() };
        let token = expired.issue_token(&user).unwrap();
        assert!(matches!(verifier.verify_token(&token), Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn oversized_ttl_is_a_token_error() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", i64::MAX / 2));
        svc.signup(signup_input("lee@example.com")).await.unwrap();
        let err = svc
            .signin(SigninInput { email: "lee@example.com".into(), password: "Passw0rd!".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenError(_)));

        let far = AuthService::new(repo, AuthConfig::new("secret", 10_000_000_000));
        let user = AuthUser { id: uuid::Uuid::new_v4(), email: "lee@example.com".into(), name: "Lee".into() };
        assert!(matches!(far.issue_token(&user), Err(AuthError::TokenError(_))));
    }
}
