use std::fmt;

use thiserror::Error;

use crate::token::TokenError;

/// Which table a not-found or ownership failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Post,
    Comment,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::User => write!(f, "user"),
            Resource::Post => write!(f, "post"),
            Resource::Comment => write!(f, "comment"),
        }
    }
}

/// Coarse classification the embedding boundary maps onto its own status
/// codes. Everything an operation can fail with collapses into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthenticated,
    Internal,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("username already in use")]
    DuplicateUsername,
    #[error("email already in use")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("users cannot follow themselves")]
    SelfFollow,
    #[error("already following this user")]
    AlreadyFollowing,
    #[error("post already liked")]
    AlreadyLiked,
    #[error("{0}")]
    InvalidContent(String),
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("cannot modify another user's {0}")]
    NotOwner(Resource),
    #[error("no authenticated user")]
    Unauthenticated,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::DuplicateUsername
            | ApiError::DuplicateEmail
            | ApiError::SelfFollow
            | ApiError::AlreadyFollowing
            | ApiError::AlreadyLiked
            | ApiError::InvalidContent(_)
            | ApiError::NotOwner(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => {
                ErrorKind::Unauthenticated
            }
            ApiError::Hash(_) => ErrorKind::Internal,
        }
    }
}

/// Token failures carry diagnostics, but to callers they all mean the same
/// thing: no authenticated user.
impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        ApiError::Unauthenticated
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(ApiError::DuplicateUsername.kind(), ErrorKind::Validation);
        assert_eq!(ApiError::SelfFollow.kind(), ErrorKind::Validation);
        assert_eq!(ApiError::NotOwner(Resource::Comment).kind(), ErrorKind::Validation);
        assert_eq!(ApiError::NotFound(Resource::Post).kind(), ErrorKind::NotFound);
        assert_eq!(ApiError::Unauthenticated.kind(), ErrorKind::Unauthenticated);
        assert_eq!(ApiError::InvalidCredentials.kind(), ErrorKind::Unauthenticated);
        assert_eq!(ApiError::Hash("oom".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn token_errors_collapse_to_unauthenticated() {
        let err: ApiError = TokenError::Malformed.into();
        assert_eq!(err, ApiError::Unauthenticated);
        let err: ApiError = TokenError::SignatureMismatch.into();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn messages_name_the_resource() {
        assert_eq!(ApiError::NotFound(Resource::User).to_string(), "user not found");
        assert_eq!(
            ApiError::NotOwner(Resource::Comment).to_string(),
            "cannot modify another user's comment"
        );
    }
}
