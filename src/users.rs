use tracing::debug;
use uuid::Uuid;

use crate::config::{MAX_BIO, MAX_IMAGE_URL};
use crate::core::db::Store;
use crate::core::errors::{ApiError, ApiResult, Resource};
use crate::core::helpers::validate_len;
use crate::models::models::{ProfileUpdate, User, UserView};

pub fn get_profile(store: &Store, user_id: Uuid) -> ApiResult<UserView> {
    store
        .user(user_id)
        .map(|user| UserView::from(&user))
        .ok_or(ApiError::NotFound(Resource::User))
}

pub fn get_profile_by_username(store: &Store, username: &str) -> ApiResult<UserView> {
    store
        .user_by_username(username)
        .map(|user| UserView::from(&user))
        .ok_or(ApiError::NotFound(Resource::User))
}

/// Applies a partial update to the caller's profile. Fields left `None`
/// keep their stored value; an empty string clears the field.
pub fn update_profile(store: &Store, caller: &User, update: ProfileUpdate) -> ApiResult<UserView> {
    let mut user = caller.clone();

    if let Some(bio) = update.bio {
        validate_len("bio", &bio, MAX_BIO)?;
        user.bio = if bio.is_empty() { None } else { Some(bio) };
    }
    if let Some(url) = update.image_url {
        validate_len("image url", &url, MAX_IMAGE_URL)?;
        user.image_url = if url.is_empty() { None } else { Some(url) };
    }

    if !store.update_user(&user) {
        return Err(ApiError::NotFound(Resource::User));
    }
    debug!(username = %user.username, "profile updated");
    Ok(UserView::from(&user))
}
