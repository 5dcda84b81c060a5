use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::core::db::{Store, UserConstraint};
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{hash_password, verify_password};
use crate::models::models::User;
use crate::token::TokenCodec;

/// Per-request caller identity, decided once at the boundary and passed
/// down explicitly. There is no ambient or thread-local equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { subject: String },
}

impl AuthState {
    pub fn subject(&self) -> Option<&str> {
        match self {
            AuthState::Authenticated { subject } => Some(subject),
            AuthState::Anonymous => None,
        }
    }
}

/// What a successful register or login hands back: the wire token plus the
/// authentication state established for the rest of the request.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub auth: AuthState,
}

/// Creates an account and signs the caller in.
///
/// Username is checked before email, so a request that collides on both
/// reports the username conflict. The store re-checks both under its write
/// lock; these pre-checks just keep the common path cheap.
pub fn register(
    store: &Store,
    codec: &TokenCodec,
    username: &str,
    email: &str,
    password: &str,
) -> ApiResult<Session> {
    if store.username_exists(username) {
        return Err(ApiError::DuplicateUsername);
    }
    if store.email_exists(email) {
        return Err(ApiError::DuplicateEmail);
    }

    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        bio: None,
        image_url: None,
        created_at: Utc::now(),
    };
    let user = store.insert_user(user).map_err(|constraint| match constraint {
        UserConstraint::Username => ApiError::DuplicateUsername,
        UserConstraint::Email => ApiError::DuplicateEmail,
    })?;
    debug!(username = %user.username, "registered user");
    Ok(issue_session(codec, &user.username))
}

/// Signs in by username or email. The token subject is always the stored
/// username, whichever identifier the caller presented. Unknown identifier
/// and wrong password are indistinguishable to the caller.
pub fn login(
    store: &Store,
    codec: &TokenCodec,
    username_or_email: &str,
    password: &str,
) -> ApiResult<Session> {
    let user = store
        .user_by_username(username_or_email)
        .or_else(|| store.user_by_email(username_or_email))
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        debug!(username = %user.username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }
    debug!(username = %user.username, "login succeeded");
    Ok(issue_session(codec, &user.username))
}

fn issue_session(codec: &TokenCodec, subject: &str) -> Session {
    Session {
        token: codec.issue(subject, Utc::now()),
        auth: AuthState::Authenticated { subject: subject.to_string() },
    }
}

/// Boundary helper: turns a presented token into the request's
/// [`AuthState`]. Tampered, malformed, and expired tokens all come back
/// `Anonymous`; nothing here errors.
pub fn authenticate(codec: &TokenCodec, token: &str, now: DateTime<Utc>) -> AuthState {
    match codec.verify_subject(token) {
        Ok(subject) if codec.is_valid(token, &subject, now) => {
            AuthState::Authenticated { subject }
        }
        _ => AuthState::Anonymous,
    }
}

/// Resolves the request's authentication state to a stored user.
///
/// Anonymous callers and subjects that no longer resolve both report
/// `Unauthenticated`; the caller learns nothing about which accounts
/// exist.
pub fn current_user(store: &Store, auth: &AuthState) -> ApiResult<User> {
    let subject = auth.subject().ok_or(ApiError::Unauthenticated)?;
    store.user_by_username(subject).ok_or(ApiError::Unauthenticated)
}
