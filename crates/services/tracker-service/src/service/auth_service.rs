//! Authentication service - registration, login and token verification.
//!
//! Passwords are hashed and checked through the domain `Password` value
//! object; sessions are stateless HS256 JWTs.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::user_service::check_account;
use crate::repository::UserRepository;
use common::{AppError, AppResult, JwtConfig};
use domain::{
    Normalize, Password, RequestContext, SaveTarget, User, UserDraft, UserInput, UserRole,
    SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub login: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a regular account. Any id or role in the input is ignored.
    async fn register(&self, input: UserInput) -> AppResult<User>;

    /// Check credentials and issue a token
    async fn login(&self, login: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Context for a verified token, with the role as currently stored.
    /// A token whose account no longer exists is `Unauthorized`.
    async fn resolve_context(&self, claims: &Claims) -> AppResult<RequestContext>;

    /// Sign a token for an already authenticated user
    fn issue_token(&self, user: &User) -> AppResult<TokenResponse>;
}

/// Concrete implementation of AuthService using the user repository.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, input: UserInput) -> AppResult<User> {
        let input = UserInput {
            id: Default::default(),
            role: None,
            ..input
        }
        .normalized();

        let password_hash = check_account(self.users.as_ref(), &input, SaveTarget::Insert).await?;
        let user = self
            .users
            .save(
                SaveTarget::Insert,
                UserDraft {
                    login: input.login,
                    password_hash,
                    role: UserRole::User,
                },
            )
            .await?;

        info!(user_id = user.id, "Account registered");
        Ok(user)
    }

    async fn login(&self, login: String, password: String) -> AppResult<TokenResponse> {
        let user = self.users.find_by_login(login.trim()).await?;

        // Verify against a dummy hash when the login is unknown so both
        // paths do comparable work
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::from_hash(dummy_hash.to_string()),
        };
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => self.issue_token(&user),
            _ => {
                warn!("Login rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn resolve_context(&self, claims: &Claims) -> AppResult<RequestContext> {
        let Some(user) = self.users.find_by_id(claims.sub).await? else {
            warn!(user_id = claims.sub, "Token for a missing account");
            return Err(AppError::Unauthorized);
        };

        if user.role.to_string() != claims.role {
            debug!(
                user_id = user.id,
                token_role = %claims.role,
                stored_role = %user.role,
                "Role changed since the token was issued"
            );
        }
        Ok(RequestContext::authenticated(user.id, user.role))
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.jwt.expiration_hours);

        let claims = Claims {
            sub: user.id,
            login: user.login.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.jwt.expiration_hours * SECONDS_PER_HOUR,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-testing-only-32chars".into(),
            expiration_hours: 1,
        }
    }

    fn stored_user(password: &str) -> User {
        User {
            id: 12,
            login: "alice".into(),
            password_hash: Password::new(password).unwrap().into_string(),
            role: UserRole::Admin,
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .returning(|_| Ok(Some(stored_user("secret-pass"))));

        let auth = Authenticator::new(Arc::new(users), jwt());
        let token = auth
            .login("alice".into(), "secret-pass".into())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, 12);
        assert_eq!(UserRole::from(claims.role.as_str()), UserRole::Admin);
    }

    #[tokio::test]
    async fn test_context_uses_stored_role_over_token_role() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().withf(|id| *id == 12).returning(|_| {
            Ok(Some(User {
                role: UserRole::User,
                ..stored_user("secret-pass")
            }))
        });

        let auth = Authenticator::new(Arc::new(users), jwt());
        // Issued while the account was still an admin
        let token = auth.issue_token(&stored_user("secret-pass")).unwrap();
        let claims = auth.verify_token(&token.access_token).unwrap();

        let ctx = auth.resolve_context(&claims).await.unwrap();
        assert_eq!(ctx.caller_id(), Some(12));
        assert!(!ctx.is_admin());
    }

    #[tokio::test]
    async fn test_context_for_deleted_account_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let auth = Authenticator::new(Arc::new(users), jwt());
        let token = auth.issue_token(&stored_user("secret-pass")).unwrap();
        let claims = auth.verify_token(&token.access_token).unwrap();

        assert!(matches!(
            auth.resolve_context(&claims).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_login_look_the_same() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .returning(|login| {
                Ok((login == "alice").then(|| stored_user("secret-pass")))
            });

        let auth = Authenticator::new(Arc::new(users), jwt());
        let wrong = auth.login("alice".into(), "nope-nope".into()).await;
        let unknown = auth.login("bob".into(), "secret-pass".into()).await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_ignores_requested_role() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_for_uniqueness()
            .returning(|_, _| Ok(vec![]));
        users
            .expect_save()
            .withf(|target, draft| {
                *target == SaveTarget::Insert
                    && draft.role == UserRole::User
                    && draft.password_hash.is_some()
            })
            .returning(|_, draft| {
                Ok(User {
                    id: 30,
                    login: draft.login,
                    password_hash: draft.password_hash.unwrap_or_default(),
                    role: draft.role,
                })
            });

        let auth = Authenticator::new(Arc::new(users), jwt());
        let input = UserInput {
            id: domain::RecordKey::new("1"),
            login: "newcomer".into(),
            password: Some("long-enough".into()),
            role: Some(UserRole::Admin),
        };
        let user = auth.register(input).await.unwrap();
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let auth = Authenticator::new(Arc::new(MockUserRepository::new()), jwt());
        let token = auth.issue_token(&stored_user("secret-pass")).unwrap();
        let tampered = format!("{}x", token.access_token);
        assert!(matches!(
            auth.verify_token(&tampered),
            Err(AppError::Jwt(_))
        ));
    }
}
