use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::page::{Page, PageRequest};
use crate::models::models::{Comment, Follow, Like, Post, User};

/// Unique-index violation on the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConstraint {
    Username,
    Email,
}

/// Composite-key violation on an edge table: the (owner, target) pair
/// already has a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateEdge;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    users_by_name: HashMap<String, Uuid>,
    users_by_email: HashMap<String, Uuid>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    follows: BTreeMap<(Uuid, Uuid), Follow>,
    likes: BTreeMap<(Uuid, Uuid), Like>,
}

/// In-process relational store. Uniqueness lives here, inside the write
/// lock, so it holds regardless of what callers checked beforehand. Edge
/// tables are keyed by their composite pair; follows order by
/// (follower, following), likes by (user, post).
#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // === Users ===

    /// Inserts a user, enforcing unique username and email. The username
    /// index is checked first, matching how registration reports conflicts.
    pub fn insert_user(&self, user: User) -> Result<User, UserConstraint> {
        let mut t = self.tables.write();
        if t.users_by_name.contains_key(&user.username) {
            return Err(UserConstraint::Username);
        }
        if t.users_by_email.contains_key(&user.email) {
            return Err(UserConstraint::Email);
        }
        t.users_by_name.insert(user.username.clone(), user.id);
        t.users_by_email.insert(user.email.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.tables.read().users.get(&id).cloned()
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        let t = self.tables.read();
        t.users_by_name.get(username).and_then(|id| t.users.get(id)).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let t = self.tables.read();
        t.users_by_email.get(email).and_then(|id| t.users.get(id)).cloned()
    }

    pub fn username_exists(&self, username: &str) -> bool {
        self.tables.read().users_by_name.contains_key(username)
    }

    pub fn email_exists(&self, email: &str) -> bool {
        self.tables.read().users_by_email.contains_key(email)
    }

    /// Writes the mutable profile fields only. Username and email never
    /// change after registration, so the unique indexes stay untouched.
    pub fn update_user(&self, user: &User) -> bool {
        let mut t = self.tables.write();
        match t.users.get_mut(&user.id) {
            Some(row) => {
                row.bio = user.bio.clone();
                row.image_url = user.image_url.clone();
                true
            }
            None => false,
        }
    }

    // === Posts ===

    pub fn insert_post(&self, post: Post) -> Post {
        self.tables.write().posts.insert(post.id, post.clone());
        post
    }

    pub fn post(&self, id: Uuid) -> Option<Post> {
        self.tables.read().posts.get(&id).cloned()
    }

    /// Deletes a post with its likes and comments in one critical section,
    /// children first. Returns false when the post does not exist.
    pub fn delete_post(&self, id: Uuid) -> bool {
        let mut t = self.tables.write();
        if !t.posts.contains_key(&id) {
            return false;
        }
        t.likes.retain(|key, _| key.1 != id);
        t.comments.retain(|_, comment| comment.post_id != id);
        t.posts.remove(&id);
        true
    }

    /// All posts whose author is in `authors`, newest first. Ties on the
    /// timestamp order by post id descending so repeated reads page the
    /// same way.
    pub fn posts_by_authors(&self, authors: &[Uuid], req: PageRequest) -> Page<Post> {
        let t = self.tables.read();
        let mut posts: Vec<Post> = t
            .posts
            .values()
            .filter(|post| authors.contains(&post.user_id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Page::paginate(posts, req)
    }

    // === Comments ===

    pub fn insert_comment(&self, comment: Comment) -> Comment {
        self.tables.write().comments.insert(comment.id, comment.clone());
        comment
    }

    pub fn comment(&self, id: Uuid) -> Option<Comment> {
        self.tables.read().comments.get(&id).cloned()
    }

    /// Rewrites a comment's content, returning the updated row, or `None`
    /// if the comment is gone.
    pub fn update_comment(&self, id: Uuid, content: &str) -> Option<Comment> {
        let mut t = self.tables.write();
        let row = t.comments.get_mut(&id)?;
        row.content = content.to_string();
        Some(row.clone())
    }

    pub fn delete_comment(&self, id: Uuid) -> bool {
        self.tables.write().comments.remove(&id).is_some()
    }

    /// Comments on a post, oldest first; ties order by comment id.
    pub fn comments_for_post(&self, post_id: Uuid) -> Vec<Comment> {
        let t = self.tables.read();
        let mut comments: Vec<Comment> = t
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        comments
    }

    // === Follows ===

    pub fn insert_follow(&self, follow: Follow) -> Result<(), DuplicateEdge> {
        let mut t = self.tables.write();
        match t.follows.entry((follow.follower_id, follow.following_id)) {
            Entry::Occupied(_) => Err(DuplicateEdge),
            Entry::Vacant(slot) => {
                slot.insert(follow);
                Ok(())
            }
        }
    }

    /// Removes the edge if present. Returns whether anything was deleted.
    pub fn remove_follow(&self, follower_id: Uuid, following_id: Uuid) -> bool {
        self.tables.write().follows.remove(&(follower_id, following_id)).is_some()
    }

    pub fn follow_exists(&self, follower_id: Uuid, following_id: Uuid) -> bool {
        self.tables.read().follows.contains_key(&(follower_id, following_id))
    }

    /// Ids this user follows, via a range scan over the composite key.
    pub fn following_ids(&self, follower_id: Uuid) -> Vec<Uuid> {
        let t = self.tables.read();
        t.follows
            .range((follower_id, Uuid::nil())..=(follower_id, Uuid::max()))
            .map(|(key, _)| key.1)
            .collect()
    }

    /// Users who follow `user_id`, in the order the edges were created.
    /// The reverse direction has no index of its own, hence the scan.
    pub fn followers_of(&self, user_id: Uuid) -> Vec<User> {
        let t = self.tables.read();
        let mut edges: Vec<&Follow> = t
            .follows
            .values()
            .filter(|edge| edge.following_id == user_id)
            .collect();
        edges.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.follower_id.cmp(&b.follower_id))
        });
        edges
            .into_iter()
            .filter_map(|edge| t.users.get(&edge.follower_id).cloned())
            .collect()
    }

    /// Users that `user_id` follows, in the order the edges were created.
    pub fn following_of(&self, user_id: Uuid) -> Vec<User> {
        let t = self.tables.read();
        let mut edges: Vec<&Follow> = t
            .follows
            .values()
            .filter(|edge| edge.follower_id == user_id)
            .collect();
        edges.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.following_id.cmp(&b.following_id))
        });
        edges
            .into_iter()
            .filter_map(|edge| t.users.get(&edge.following_id).cloned())
            .collect()
    }

    // === Likes ===

    pub fn insert_like(&self, like: Like) -> Result<(), DuplicateEdge> {
        let mut t = self.tables.write();
        match t.likes.entry((like.user_id, like.post_id)) {
            Entry::Occupied(_) => Err(DuplicateEdge),
            Entry::Vacant(slot) => {
                slot.insert(like);
                Ok(())
            }
        }
    }

    pub fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> bool {
        self.tables.write().likes.remove(&(user_id, post_id)).is_some()
    }

    pub fn like_exists(&self, user_id: Uuid, post_id: Uuid) -> bool {
        self.tables.read().likes.contains_key(&(user_id, post_id))
    }

    /// Number of like edges pointing at the post; zero for unknown posts.
    pub fn like_count(&self, post_id: Uuid) -> u64 {
        self.tables.read().likes.keys().filter(|key| key.1 == post_id).count() as u64
    }
}
