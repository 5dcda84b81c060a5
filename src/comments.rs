use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::MAX_COMMENT_CONTENT;
use crate::core::db::Store;
use crate::core::errors::{ApiError, ApiResult, Resource};
use crate::core::helpers::validate_content;
use crate::models::models::{Comment, CommentView, User, UserView};

pub fn add_comment(
    store: &Store,
    author: &User,
    post_id: Uuid,
    content: &str,
) -> ApiResult<CommentView> {
    validate_content("comment content", content, MAX_COMMENT_CONTENT)?;
    if store.post(post_id).is_none() {
        return Err(ApiError::NotFound(Resource::Post));
    }

    let comment = store.insert_comment(Comment {
        id: Uuid::new_v4(),
        post_id,
        user_id: author.id,
        content: content.to_string(),
        created_at: Utc::now(),
    });
    debug!(comment_id = %comment.id, %post_id, "comment added");
    enrich(store, &comment)
}

/// Rewrites the caller's own comment.
pub fn update_comment(
    store: &Store,
    caller: &User,
    comment_id: Uuid,
    content: &str,
) -> ApiResult<CommentView> {
    validate_content("comment content", content, MAX_COMMENT_CONTENT)?;
    let comment = store.comment(comment_id).ok_or(ApiError::NotFound(Resource::Comment))?;
    if comment.user_id != caller.id {
        return Err(ApiError::NotOwner(Resource::Comment));
    }

    let updated = store
        .update_comment(comment_id, content)
        .ok_or(ApiError::NotFound(Resource::Comment))?;
    debug!(%comment_id, "comment updated");
    enrich(store, &updated)
}

/// Deletes the caller's own comment.
pub fn delete_comment(store: &Store, caller: &User, comment_id: Uuid) -> ApiResult<()> {
    let comment = store.comment(comment_id).ok_or(ApiError::NotFound(Resource::Comment))?;
    if comment.user_id != caller.id {
        return Err(ApiError::NotOwner(Resource::Comment));
    }
    store.delete_comment(comment_id);
    debug!(%comment_id, "comment deleted");
    Ok(())
}

/// Comments on a post, oldest first.
pub fn get_comments(store: &Store, post_id: Uuid) -> ApiResult<Vec<CommentView>> {
    if store.post(post_id).is_none() {
        return Err(ApiError::NotFound(Resource::Post));
    }
    store
        .comments_for_post(post_id)
        .iter()
        .map(|comment| enrich(store, comment))
        .collect()
}

fn enrich(store: &Store, comment: &Comment) -> ApiResult<CommentView> {
    let author = store.user(comment.user_id).ok_or(ApiError::NotFound(Resource::User))?;
    Ok(CommentView {
        id: comment.id,
        content: comment.content.clone(),
        created_at: comment.created_at,
        author: UserView::from(&author),
    })
}
