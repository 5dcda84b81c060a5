//! Social backend core: accounts with signed-token sessions, the
//! follow/like graph, and the newsfeed composed from it.
//!
//! This crate is the service layer only. HTTP routing, request parsing and
//! status-code mapping belong to whatever embeds it; persistence is the
//! in-process store in [`core::db`]. Operations take the store explicitly
//! and, where the caller's identity matters, an [`auth::AuthState`]. There
//! is no global request context.

pub mod auth;
pub mod comments;
pub mod config;
pub mod core;
pub mod follow;
pub mod models;
pub mod posts;
pub mod token;
pub mod users;

pub use crate::auth::{authenticate, current_user, login, register, AuthState, Session};
pub use crate::core::db::Store;
pub use crate::core::errors::{ApiError, ApiResult, ErrorKind, Resource};
pub use crate::core::page::{Page, PageRequest};
pub use crate::token::{TokenCodec, TokenError};
