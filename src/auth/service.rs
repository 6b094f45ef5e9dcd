use chrono::DateTime;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{
    AuthError, AuthEvent, AuthResponse, JwtService, LoginRequest, MessageResponse, RefreshTokenRequest,
    RegisterRequest, TokenResponse, TokenType, UserInfo, UserSession,
};
use crate::models::{
    normalize_email, validate_body_metrics, validate_email, validate_password, NewProfile,
};
use crate::store::{DynAuthStore, UserRecord};

const AUTH_EVENT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    store: DynAuthStore,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt_service", &self.jwt_service)
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl AuthService {
    pub fn new(store: DynAuthStore, jwt_secret: &str) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            jwt_service: JwtService::new(jwt_secret),
            store,
            events,
        }
    }

    /// Receive sign-in and sign-out events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Register a new user together with the profile from the sign-up form
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let Registration { email, profile } = validate_registration(&request)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;
        let user = self.store.create_user(&email, &password_hash, &profile).await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.sign_in(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .store
            .find_user_by_email(&normalize_email(&request.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.sign_in(user).await
    }

    /// Refresh access token
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt_service
            .validate_token_of_type(&request.refresh_token, TokenType::Refresh)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        if !self
            .store
            .is_refresh_token_valid(user_id, &hash_refresh_token(&request.refresh_token))
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        let access_token = self.jwt_service.create_access_token(user_id, &claims.email)?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
        })
    }

    /// Blacklist the access token and revoke every refresh token of the user
    pub async fn logout(&self, session: &UserSession) -> Result<MessageResponse, AuthError> {
        let expires_at = DateTime::from_timestamp(session.exp as i64, 0).ok_or(AuthError::InvalidToken)?;

        self.store.blacklist_token(&session.jti, expires_at).await?;
        self.store.revoke_refresh_tokens(session.user_id).await?;

        tracing::info!(user_id = %session.user_id, "User signed out");
        // No subscribers is fine.
        let _ = self.events.send(AuthEvent::SignedOut { user_id: session.user_id });

        Ok(MessageResponse {
            message: "Successfully logged out".to_string(),
        })
    }

    pub async fn me(&self, session: &UserSession) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user_info(user))
    }

    /// Validate user session from token
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let session = self.jwt_service.extract_user_session(token)?;

        if self.store.is_token_blacklisted(&session.jti).await? {
            return Err(AuthError::InvalidToken);
        }

        Ok(session)
    }

    async fn sign_in(&self, user: UserRecord) -> Result<AuthResponse, AuthError> {
        let (access_token, refresh_token) = self.jwt_service.create_token_pair(user.id, &user.email)?;

        let claims = self.jwt_service.validate_token(&refresh_token)?;
        let expires_at = DateTime::from_timestamp(claims.exp as i64, 0).ok_or(AuthError::InvalidToken)?;
        self.store
            .store_refresh_token(user.id, &hash_refresh_token(&refresh_token), expires_at)
            .await?;

        let _ = self.events.send(AuthEvent::SignedIn { user_id: user.id });

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
            user: user_info(user),
        })
    }
}

fn user_info(user: UserRecord) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", md5::compute(token))
}

/// A checked sign-up form: the normalized email and the profile row it describes.
#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub profile: NewProfile,
}

/// Check the sign-up form and build the profile row it describes.
pub fn validate_registration(request: &RegisterRequest) -> Result<Registration, AuthError> {
    let missing = [
        ("email", request.email.trim().is_empty()),
        ("password", request.password.is_empty()),
        ("confirm_password", request.confirm_password.is_empty()),
        ("full_name", request.full_name.trim().is_empty()),
        ("age", request.age.is_none()),
        ("weight_kg", request.weight_kg.is_none()),
        ("height_cm", request.height_cm.is_none()),
        ("goal", request.goal.trim().is_empty()),
    ];
    let missing: Vec<&str> = missing
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AuthError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if request.password != request.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    validate_password(&request.password).map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
    let email = normalize_email(&request.email);
    validate_email(&email).map_err(|e| AuthError::EmailValidation(e.to_string()))?;
    validate_body_metrics(request.age, request.weight_kg, request.height_cm)
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    Ok(Registration {
        email,
        profile: NewProfile {
            full_name: request.full_name.trim().to_string(),
            age: request.age.unwrap_or_default(),
            weight_kg: request.weight_kg.unwrap_or_default(),
            height_cm: request.height_cm.unwrap_or_default(),
            goal: request.goal.trim().to_string(),
        },
    })
}
