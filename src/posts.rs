use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{MAX_IMAGE_URL, MAX_POST_CONTENT};
use crate::core::db::Store;
use crate::core::errors::{ApiError, ApiResult, Resource};
use crate::core::helpers::{validate_content, validate_len};
use crate::core::page::{Page, PageRequest};
use crate::models::models::{Like, NewPost, Post, PostView, User, UserView};

pub fn create_post(store: &Store, author: &User, new_post: NewPost) -> ApiResult<PostView> {
    validate_content("post content", &new_post.content, MAX_POST_CONTENT)?;
    if let Some(url) = &new_post.image_url {
        validate_len("image url", url, MAX_IMAGE_URL)?;
    }

    let post = store.insert_post(Post {
        id: Uuid::new_v4(),
        user_id: author.id,
        content: new_post.content,
        image_url: new_post.image_url,
        created_at: Utc::now(),
    });
    debug!(post_id = %post.id, author = %author.username, "post created");
    enrich(store, &post)
}

pub fn get_post(store: &Store, post_id: Uuid) -> ApiResult<PostView> {
    let post = store.post(post_id).ok_or(ApiError::NotFound(Resource::Post))?;
    enrich(store, &post)
}

/// Deletes the caller's own post together with its likes and comments.
pub fn delete_post(store: &Store, caller: &User, post_id: Uuid) -> ApiResult<()> {
    let post = store.post(post_id).ok_or(ApiError::NotFound(Resource::Post))?;
    if post.user_id != caller.id {
        return Err(ApiError::NotOwner(Resource::Post));
    }
    store.delete_post(post_id);
    debug!(%post_id, "post deleted");
    Ok(())
}

pub fn like_post(store: &Store, caller: &User, post_id: Uuid) -> ApiResult<()> {
    if store.post(post_id).is_none() {
        return Err(ApiError::NotFound(Resource::Post));
    }
    if store.like_exists(caller.id, post_id) {
        return Err(ApiError::AlreadyLiked);
    }

    let edge = Like { user_id: caller.id, post_id, created_at: Utc::now() };
    store.insert_like(edge).map_err(|_| {
        warn!(user_id = %caller.id, %post_id, "duplicate like raced past the pre-check");
        ApiError::AlreadyLiked
    })?;
    debug!(user_id = %caller.id, %post_id, "post liked");
    Ok(())
}

/// Removing a like that is not there is a no-op, so a repeated unlike
/// succeeds.
pub fn unlike_post(store: &Store, caller: &User, post_id: Uuid) -> ApiResult<()> {
    if store.post(post_id).is_none() {
        return Err(ApiError::NotFound(Resource::Post));
    }
    if store.remove_like(caller.id, post_id) {
        debug!(user_id = %caller.id, %post_id, "post unliked");
    }
    Ok(())
}

/// Live like count for a post; zero when the post does not exist.
pub fn like_count(store: &Store, post_id: Uuid) -> u64 {
    store.like_count(post_id)
}

/// The caller's newsfeed: posts by everyone they follow plus their own,
/// newest first. One query resolves the follow set, one fetches the post
/// page, and each post picks up its like count as of this call.
pub fn get_feed(store: &Store, caller: &User, req: PageRequest) -> ApiResult<Page<PostView>> {
    let mut audience = store.following_ids(caller.id);
    // the caller always sees their own posts, follows or not
    audience.push(caller.id);
    let posts = store.posts_by_authors(&audience, req);
    enrich_page(store, posts)
}

/// One user's posts, newest first.
pub fn get_user_posts(store: &Store, user_id: Uuid, req: PageRequest) -> ApiResult<Page<PostView>> {
    if store.user(user_id).is_none() {
        return Err(ApiError::NotFound(Resource::User));
    }
    let posts = store.posts_by_authors(&[user_id], req);
    enrich_page(store, posts)
}

fn enrich_page(store: &Store, posts: Page<Post>) -> ApiResult<Page<PostView>> {
    let Page { items, page, size, total } = posts;
    let mut views = Vec::with_capacity(items.len());
    for post in &items {
        views.push(enrich(store, post)?);
    }
    Ok(Page { items: views, page, size, total })
}

/// Joins the author projection and the live like count onto a stored post.
fn enrich(store: &Store, post: &Post) -> ApiResult<PostView> {
    let author = store.user(post.user_id).ok_or(ApiError::NotFound(Resource::User))?;
    Ok(PostView {
        id: post.id,
        content: post.content.clone(),
        image_url: post.image_url.clone(),
        created_at: post.created_at,
        like_count: store.like_count(post.id),
        author: UserView::from(&author),
    })
}

#[cfg(test)]
mod tests {
    use crate::follow::follow_user;

    use super::*;

    fn seed_user(store: &Store, name: &str) -> User {
        store
            .insert_user(User {
                id: Uuid::new_v4(),
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "x".to_string(),
                bio: None,
                image_url: None,
                created_at: Utc::now(),
            })
            .unwrap()
    }

    fn text_post(content: &str) -> NewPost {
        NewPost { content: content.to_string(), image_url: None }
    }

    #[test]
    fn create_post_returns_the_enriched_view() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let view = create_post(&store, &alice, text_post("hello world")).unwrap();
        assert_eq!(view.content, "hello world");
        assert_eq!(view.like_count, 0);
        assert_eq!(view.author.username, "alice");
        assert_eq!(get_post(&store, view.id).unwrap(), view);
    }

    #[test]
    fn create_post_rejects_blank_and_oversized_content() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        assert!(matches!(
            create_post(&store, &alice, text_post("  \n ")),
            Err(ApiError::InvalidContent(_))
        ));
        assert!(matches!(
            create_post(&store, &alice, text_post(&"x".repeat(MAX_POST_CONTENT + 1))),
            Err(ApiError::InvalidContent(_))
        ));
        let long_url = NewPost {
            content: "ok".to_string(),
            image_url: Some("https://example.com/".to_string() + &"a".repeat(MAX_IMAGE_URL)),
        };
        assert!(matches!(create_post(&store, &alice, long_url), Err(ApiError::InvalidContent(_))));
    }

    #[test]
    fn feed_with_no_follows_is_own_posts_newest_first() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let first = create_post(&store, &alice, text_post("first")).unwrap();
        let second = create_post(&store, &alice, text_post("second")).unwrap();

        let feed = get_feed(&store, &alice, PageRequest::new(0, 10)).unwrap();
        let ids: Vec<Uuid> = feed.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(feed.total, 2);
    }

    #[test]
    fn feed_merges_followed_authors_and_skips_strangers() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let bob = seed_user(&store, "bob");
        let stranger = seed_user(&store, "stranger");
        follow_user(&store, alice.id, bob.id).unwrap();

        let a1 = create_post(&store, &alice, text_post("a1")).unwrap();
        let b1 = create_post(&store, &bob, text_post("b1")).unwrap();
        create_post(&store, &stranger, text_post("noise")).unwrap();
        let a2 = create_post(&store, &alice, text_post("a2")).unwrap();

        let feed = get_feed(&store, &alice, PageRequest::new(0, 10)).unwrap();
        let ids: Vec<Uuid> = feed.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a2.id, b1.id, a1.id]);
        assert_eq!(feed.total, 3);
    }

    #[test]
    fn feed_like_counts_are_current() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let bob = seed_user(&store, "bob");
        follow_user(&store, alice.id, bob.id).unwrap();
        let post = create_post(&store, &bob, text_post("like me")).unwrap();

        like_post(&store, &alice, post.id).unwrap();
        like_post(&store, &bob, post.id).unwrap();

        let feed = get_feed(&store, &alice, PageRequest::default()).unwrap();
        assert_eq!(feed.items[0].like_count, 2);

        unlike_post(&store, &alice, post.id).unwrap();
        let feed = get_feed(&store, &alice, PageRequest::default()).unwrap();
        assert_eq!(feed.items[0].like_count, 1);
    }

    #[test]
    fn feed_pages_slice_the_timeline() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        for i in 0..5 {
            create_post(&store, &alice, text_post(&format!("post {i}"))).unwrap();
        }

        let page = get_feed(&store, &alice, PageRequest::new(1, 2)).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.items[0].content, "post 2");
        assert_eq!(page.items[1].content, "post 1");

        let past_the_end = get_feed(&store, &alice, PageRequest::new(9, 2)).unwrap();
        assert!(past_the_end.items.is_empty());
        assert_eq!(past_the_end.total, 5);
    }

    #[test]
    fn liking_twice_is_rejected_and_unknown_posts_are_not_found() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let post = create_post(&store, &alice, text_post("hi")).unwrap();

        like_post(&store, &alice, post.id).unwrap();
        assert_eq!(like_post(&store, &alice, post.id), Err(ApiError::AlreadyLiked));
        assert_eq!(like_count(&store, post.id), 1);

        let ghost = Uuid::new_v4();
        assert_eq!(like_post(&store, &alice, ghost), Err(ApiError::NotFound(Resource::Post)));
        assert_eq!(unlike_post(&store, &alice, ghost), Err(ApiError::NotFound(Resource::Post)));
        assert_eq!(like_count(&store, ghost), 0);
    }

    #[test]
    fn unlike_without_a_like_is_a_noop() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let post = create_post(&store, &alice, text_post("hi")).unwrap();
        unlike_post(&store, &alice, post.id).unwrap();
        assert_eq!(like_count(&store, post.id), 0);
    }

    #[test]
    fn only_the_author_deletes_a_post() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let bob = seed_user(&store, "bob");
        let post = create_post(&store, &alice, text_post("mine")).unwrap();

        assert_eq!(delete_post(&store, &bob, post.id), Err(ApiError::NotOwner(Resource::Post)));
        assert!(get_post(&store, post.id).is_ok());

        delete_post(&store, &alice, post.id).unwrap();
        assert_eq!(get_post(&store, post.id), Err(ApiError::NotFound(Resource::Post)));
        assert_eq!(delete_post(&store, &alice, post.id), Err(ApiError::NotFound(Resource::Post)));
    }

    #[test]
    fn user_posts_cover_one_author_only() {
        let store = Store::new();
        let alice = seed_user(&store, "alice");
        let bob = seed_user(&store, "bob");
        create_post(&store, &alice, text_post("a1")).unwrap();
        create_post(&store, &bob, text_post("b1")).unwrap();

        let page = get_user_posts(&store, alice.id, PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].author.username, "alice");

        let err = get_user_posts(&store, Uuid::new_v4(), PageRequest::default()).unwrap_err();
        assert_eq!(err, ApiError::NotFound(Resource::User));
    }
}
