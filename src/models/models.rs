use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// === Entities ===

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Follow edge, keyed by (follower, following). At most one edge per pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Like edge, keyed by (user, post). At most one edge per pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// === Projections returned to callers ===

/// Public view of a user. Never carries the password hash.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            image_url: user.image_url.clone(),
            created_at: user.created_at,
        }
    }
}

/// A post joined with its author and the like count as of the query.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PostView {
    pub id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
    pub author: UserView,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: UserView,
}

// === Write payloads ===

#[derive(Deserialize, Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub image_url: Option<String>,
}

/// Partial profile update. `None` means "leave the field as it is";
/// an empty string clears it.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub image_url: Option<String>,
}
