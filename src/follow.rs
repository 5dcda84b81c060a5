use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::db::Store;
use crate::core::errors::{ApiError, ApiResult, Resource};
use crate::models::models::{Follow, UserView};

/// Creates the follower → target edge.
///
/// The self-follow check runs before any store access, so a self-follow on
/// an id the store has never seen still reports `SelfFollow`, not
/// `NotFound`.
pub fn follow_user(store: &Store, follower_id: Uuid, target_id: Uuid) -> ApiResult<()> {
    if follower_id == target_id {
        return Err(ApiError::SelfFollow);
    }
    if store.user(target_id).is_none() {
        return Err(ApiError::NotFound(Resource::User));
    }
    if store.follow_exists(follower_id, target_id) {
        return Err(ApiError::AlreadyFollowing);
    }

    let edge = Follow { follower_id, following_id: target_id, created_at: Utc::now() };
    store.insert_follow(edge).map_err(|_| {
        warn!(%follower_id, %target_id, "duplicate follow raced past the pre-check");
        ApiError::AlreadyFollowing
    })?;
    debug!(%follower_id, %target_id, "follow edge created");
    Ok(())
}

/// Removes the follower → target edge. Deleting an edge that is not there
/// is a no-op, so a repeated unfollow succeeds.
pub fn unfollow_user(store: &Store, follower_id: Uuid, target_id: Uuid) -> ApiResult<()> {
    if store.user(target_id).is_none() {
        return Err(ApiError::NotFound(Resource::User));
    }
    if store.remove_follow(follower_id, target_id) {
        debug!(%follower_id, %target_id, "follow edge removed");
    }
    Ok(())
}

/// Users following `user_id`, oldest edge first.
pub fn get_followers(store: &Store, user_id: Uuid) -> ApiResult<Vec<UserView>> {
    if store.user(user_id).is_none() {
        return Err(ApiError::NotFound(Resource::User));
    }
    Ok(store.followers_of(user_id).iter().map(UserView::from).collect())
}

/// Users that `user_id` follows, oldest edge first.
pub fn get_following(store: &Store, user_id: Uuid) -> ApiResult<Vec<UserView>> {
    if store.user(user_id).is_none() {
        return Err(ApiError::NotFound(Resource::User));
    }
    Ok(store.following_of(user_id).iter().map(UserView::from).collect())
}
