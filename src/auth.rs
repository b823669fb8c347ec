use crate::model::Role;
use crate::store::Datastore;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Login form payload. The form asks which role the user intends to log in
/// as; the credentials must belong to an account with that role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Name (username)
    pub name: Option<String>,
    /// Role (admin or manager)
    pub role: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret for signing/verifying tokens
    pub jwt_secret: String,
    /// Token expiration time in minutes
    pub token_expiration_minutes: i64,
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    /// Token is missing
    MissingToken,
    /// Token is invalid
    InvalidToken,
    /// Token is expired
    TokenExpired,
    /// Wrong credentials or role mismatch
    Unauthorized,
    /// Logged in, but this screen belongs to the other role
    Forbidden,
    /// Some other error
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "Not authenticated").into_response()
            }
            AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials or role").into_response()
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Not authorized").into_response(),
            AuthError::Other(err) => {
                error!("Auth error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Validated token attached to a request
#[derive(Debug, Clone)]
pub struct JwtAuth {
    pub claims: Claims,
}

impl JwtAuth {
    /// Reject the request unless the token carries the expected role
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        if self.claims.role() == Some(role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Extract a JWT token from request cookies or the Authorization header
pub fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    // First check for token in cookies
    let cookie_header = parts.headers.get(header::COOKIE);
    let mut token = None;

    if let Some(cookie) = cookie_header {
        let cookie_str = cookie.to_str().map_err(|_| AuthError::InvalidToken)?;
        for cookie_pair in cookie_str.split(';') {
            let mut parts = cookie_pair.trim().split('=');
            if let (Some("auth_token"), Some(value)) = (parts.next(), parts.next()) {
                token = Some(value.to_string());
                break;
            }
        }
    }

    // If no token in cookie, check Authorization header
    if token.is_none() {
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or(AuthError::MissingToken)?;

        let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AuthError::InvalidToken);
        }

        token = Some(auth_str.trim_start_matches("Bearer ").trim().to_string());
    }

    token.ok_or(AuthError::MissingToken)
}

/// Auth service for credential checks and token operations
pub struct AuthService {
    config: Arc<AuthConfig>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Authenticate a user against the datastore. The account's role must
    /// match the role picked on the login form.
    pub async fn authenticate(
        &self,
        store: &dyn Datastore,
        credentials: &Credentials,
    ) -> Result<(crate::model::UserAccount, String), AuthError> {
        let requested_role = Role::parse(&credentials.role).ok_or(AuthError::Unauthorized)?;

        let account = store
            .find_user(&credentials.username)
            .await
            .map_err(|e| AuthError::Other(e.to_string()))?
            .ok_or(AuthError::Unauthorized)?;

        if account.password != credentials.password || account.role != requested_role {
            return Err(AuthError::Unauthorized);
        }

        let token = self
            .generate_token(
                &account.id.to_string(),
                Some(account.username.clone()),
                account.role.as_str(),
            )
            .map_err(AuthError::Other)?;

        Ok((account, token))
    }

    /// Generate a new JWT token
    pub fn generate_token(
        &self,
        user_id: &str,
        name: Option<String>,
        role: &str,
    ) -> Result<String, String> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.token_expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            name,
            role: role.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| format!("Failed to generate token: {}", e))
    }

    /// Validate a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| {
            error!("JWT validation error: {:?}", e);
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "test_secret".to_string(),
            token_expiration_minutes: 60,
        })
    }

    #[tokio::test]
    async fn test_authenticate_role_must_match() {
        let store = MemoryStore::new();
        store.add_user("helen", "pw", Role::Manager).await.unwrap();
        let auth = service();

        let ok = auth
            .authenticate(
                &store,
                &Credentials {
                    username: "helen".to_string(),
                    password: "pw".to_string(),
                    role: "Manager".to_string(),
                },
            )
            .await;
        assert!(ok.is_ok());

        let wrong_role = auth
            .authenticate(
                &store,
                &Credentials {
                    username: "helen".to_string(),
                    password: "pw".to_string(),
                    role: "admin".to_string(),
                },
            )
            .await;
        assert!(matches!(wrong_role, Err(AuthError::Unauthorized)));

        let wrong_password = auth
            .authenticate(
                &store,
                &Credentials {
                    username: "helen".to_string(),
                    password: "nope".to_string(),
                    role: "manager".to_string(),
                },
            )
            .await;
        assert!(matches!(wrong_password, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let auth = service();
        let token = auth
            .generate_token("42", Some("helen".to_string()), "manager")
            .unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role(), Some(Role::Manager));

        assert!(auth.validate_token("not-a-token").is_err());
    }
}
