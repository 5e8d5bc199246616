use chrono::Utc;
use tracing::info;

use faniko_types::api::{NewPost, NumberLike, UpdatePostRequest};
use faniko_types::models::{Post, Visibility};

use crate::validate::{non_blank, same_name};
use crate::{Result, Store, StoreError};

/// An uploaded media file attached to a post.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub filename: String,
    pub mime: Option<String>,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub post_id: u64,
    pub likes: usize,
    pub liked_by_me: bool,
}

impl Store {
    pub fn list_posts(&self, username: &str) -> Result<Vec<Post>> {
        self.with_tables(|t| {
            let creator = t.creator(username)?;
            Ok(t.posts
                .iter()
                .filter(|p| same_name(&p.username, &creator.username))
                .cloned()
                .collect())
        })
    }

    pub fn create_post(&self, username: &str, new: NewPost, media: Option<MediaFile>) -> Result<Post> {
        self.with_tables_mut(|t| {
            let creator = t.creator(username)?;
            let (creator_id, creator_username) = (creator.id, creator.username.clone());

            let title = new.title.trim().to_string();
            let visibility = new.visibility.trim();
            if title.is_empty() || visibility.is_empty() {
                return Err(StoreError::Invalid("Missing required fields"));
            }
            let visibility =
                Visibility::parse(visibility).ok_or(StoreError::Invalid("Invalid visibility"))?;

            let price = match visibility {
                Visibility::Ppv => Some(new.price.as_ref().and_then(|p| p.nonzero()).unwrap_or(0.0)),
                Visibility::Free => None,
            };

            let (media_filename, media_mime) = match media {
                Some(m) => (Some(m.filename), m.mime),
                None => (None, None),
            };

            let post = Post {
                id: t.post_ids.next(),
                creator_id,
                username: creator_username,
                title,
                visibility,
                price,
                description: new.description.unwrap_or_default(),
                created_at: Utc::now(),
                media_filename,
                media_mime,
                likes: 0,
                liked_by: Vec::new(),
            };
            t.posts.push(post.clone());

            info!(
                "New post: id={} creator={} visibility={:?} price={:?}",
                post.id, post.username, post.visibility, post.price
            );
            Ok(post)
        })
    }

    pub fn update_post(&self, username: &str, post_id: u64, req: UpdatePostRequest) -> Result<Post> {
        self.with_tables_mut(|t| {
            t.creator_index(username)?;
            let idx = t.post_index(username, post_id)?;

            let visibility = req
                .visibility
                .as_ref()
                .map(|raw| {
                    raw.as_deref()
                        .and_then(Visibility::parse)
                        .ok_or(StoreError::Invalid("Invalid visibility"))
                })
                .transpose()?;

            let post = &mut t.posts[idx];

            if let Some(title) = non_blank(req.title.as_deref()) {
                post.title = title;
            }

            let requested_price = req
                .price
                .as_ref()
                .and_then(Option::as_ref)
                .and_then(NumberLike::nonzero);
            match visibility {
                Some(Visibility::Ppv) => {
                    post.visibility = Visibility::Ppv;
                    post.price = Some(requested_price.or(post.price).unwrap_or(0.0));
                }
                Some(Visibility::Free) => {
                    post.visibility = Visibility::Free;
                    post.price = None;
                }
                None => {
                    if req.price.is_some() && post.visibility == Visibility::Ppv {
                        post.price = Some(requested_price.unwrap_or(0.0));
                    }
                }
            }

            if let Some(description) = req.description {
                post.description = description;
            }

            info!(
                "Updated post: id={} visibility={:?} price={:?}",
                post.id, post.visibility, post.price
            );
            Ok(post.clone())
        })
    }

    /// Remove a post and its unlock records. Transactions stay so earnings
    /// still count what fans already paid for.
    pub fn delete_post(&self, username: &str, post_id: u64) -> Result<Post> {
        self.with_tables_mut(|t| {
            t.creator_index(username)?;
            let idx = t.post_index(username, post_id)?;
            let post = t.posts.remove(idx);

            t.unlocked_posts
                .retain(|u| !(u.post_id == post_id && same_name(&u.creator_username, username)));

            info!("Deleted post: id={} creator={}", post.id, post.username);
            Ok(post)
        })
    }

    /// Like the post if the fan hasn't yet, otherwise take the like back.
    pub fn toggle_like(&self, username: &str, post_id: u64, fan_username: Option<&str>) -> Result<LikeToggle> {
        self.with_tables_mut(|t| {
            t.creator_index(username)?;
            let idx = t.post_index(username, post_id)?;

            let fan = non_blank(fan_username).ok_or(StoreError::Invalid("Missing fan username."))?;

            let post = &mut t.posts[idx];
            let liked_by_me = match post.liked_by.iter().position(|name| same_name(name, &fan)) {
                Some(pos) => {
                    post.liked_by.remove(pos);
                    false
                }
                None => {
                    post.liked_by.push(fan.clone());
                    true
                }
            };
            post.likes = post.liked_by.len();

            info!(
                "Like toggle: post={} fan={} likes={} liked_by_me={}",
                post.id, fan, post.likes, liked_by_me
            );
            Ok(LikeToggle {
                post_id: post.id,
                likes: post.likes,
                liked_by_me,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::KycFiles;
    use faniko_types::api::{CreatorApplication, NumberLike};
    use faniko_types::models::UnlockedPost;

    fn store_with_creator(username: &str) -> Store {
        let store = Store::new();
        store
            .create_creator(
                CreatorApplication {
                    display_name: "Creator".into(),
                    username: username.into(),
                    email: format!("{}@x.io", username),
                    account_type: "free".into(),
                    price: None,
                },
                KycFiles::default(),
            )
            .unwrap();
        store
    }

    fn new_post(title: &str, visibility: &str, price: Option<&str>) -> NewPost {
        NewPost {
            title: title.into(),
            visibility: visibility.into(),
            price: price.map(NumberLike::from),
            description: None,
        }
    }

    #[test]
    fn test_create_and_list_posts() {
        let store = store_with_creator("luna");
        let media = MediaFile {
            filename: "media-abc.mp4".into(),
            mime: Some("video/mp4".into()),
        };
        let p = store
            .create_post("LUNA", new_post("  Hello ", "ppv", Some("4.5")), Some(media))
            .unwrap();
        assert_eq!(p.id, 1);
        assert_eq!(p.creator_id, 1);
        assert_eq!(p.title, "Hello");
        assert_eq!(p.price, Some(4.5));
        assert_eq!(p.description, "");
        assert_eq!(p.media_mime.as_deref(), Some("video/mp4"));

        let free = store
            .create_post("luna", new_post("Free one", "free", Some("9")), None)
            .unwrap();
        assert_eq!(free.price, None);

        let ppv_no_price = store
            .create_post("luna", new_post("Cheap", "ppv", Some("abc")), None)
            .unwrap();
        assert_eq!(ppv_no_price.price, Some(0.0));

        let posts = store.list_posts("luna").unwrap();
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(matches!(store.list_posts("ghost"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_create_post_rejections() {
        let store = store_with_creator("luna");
        let err = store.create_post("luna", new_post("   ", "free", None), None).unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Missing required fields")));

        let err = store.create_post("luna", new_post("Hi", "secret", None), None).unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Invalid visibility")));

        let err = store.create_post("ghost", new_post("Hi", "free", None), None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Creator not found")));
    }

    #[test]
    fn test_update_post() {
        let store = store_with_creator("luna");
        store.create_post("luna", new_post("Hello", "free", None), None).unwrap();

        let p = store
            .update_post(
                "luna",
                1,
                UpdatePostRequest {
                    visibility: Some(Some("ppv".into())),
                    price: Some(Some(NumberLike::Number(3.0))),
                    description: Some("new text".into()),
                    title: Some("  ".into()),
                },
            )
            .unwrap();
        assert_eq!(p.visibility, Visibility::Ppv);
        assert_eq!(p.price, Some(3.0));
        assert_eq!(p.description, "new text");
        assert_eq!(p.title, "Hello");

        let p = store
            .update_post(
                "luna",
                1,
                UpdatePostRequest {
                    price: Some(Some(NumberLike::from("nope"))),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(p.price, Some(0.0));

        let p = store
            .update_post(
                "luna",
                1,
                UpdatePostRequest {
                    visibility: Some(Some("free".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(p.price, None);

        let err = store
            .update_post("luna", 99, UpdatePostRequest::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Post not found")));

        let err = store
            .update_post(
                "luna",
                1,
                UpdatePostRequest {
                    visibility: Some(Some("hidden".into())),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Invalid visibility")));
    }

    #[test]
    fn test_post_must_belong_to_creator() {
        let store = store_with_creator("luna");
        store
            .create_creator(
                CreatorApplication {
                    display_name: "Sol".into(),
                    username: "sol".into(),
                    email: "sol@x.io".into(),
                    account_type: "free".into(),
                    price: None,
                },
                KycFiles::default(),
            )
            .unwrap();
        store.create_post("luna", new_post("Hello", "free", None), None).unwrap();

        let err = store.delete_post("sol", 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Post not found")));
    }

    #[test]
    fn test_delete_post_drops_unlocks_and_never_reuses_ids() {
        let store = store_with_creator("luna");
        store.create_post("luna", new_post("One", "ppv", Some("2")), None).unwrap();
        store.create_post("luna", new_post("Two", "ppv", Some("2")), None).unwrap();
        store
            .with_tables_mut(|t| {
                t.unlocked_posts.push(UnlockedPost {
                    creator_username: "luna".into(),
                    fan_username: "bob".into(),
                    post_id: 1,
                    created_at: Utc::now(),
                });
                Ok(())
            })
            .unwrap();

        let deleted = store.delete_post("luna", 1).unwrap();
        assert_eq!(deleted.title, "One");
        assert!(store.with_tables(|t| Ok(t.unlocked_posts.is_empty())).unwrap());

        let next = store.create_post("luna", new_post("Three", "free", None), None).unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn test_like_toggle() {
        let store = store_with_creator("luna");
        store.create_post("luna", new_post("Hello", "free", None), None).unwrap();

        let t = store.toggle_like("luna", 1, Some(" Bob ")).unwrap();
        assert_eq!((t.likes, t.liked_by_me), (1, true));

        let t = store.toggle_like("luna", 1, Some("ann")).unwrap();
        assert_eq!((t.likes, t.liked_by_me), (2, true));

        // Case-insensitive match removes Bob's like.
        let t = store.toggle_like("luna", 1, Some("BOB")).unwrap();
        assert_eq!((t.likes, t.liked_by_me), (1, false));

        let post = &store.list_posts("luna").unwrap()[0];
        assert_eq!(post.liked_by, vec!["ann".to_string()]);
        assert_eq!(post.likes, post.liked_by.len());

        let err = store.toggle_like("luna", 1, Some("  ")).unwrap_err();
        assert!(matches!(err, StoreError::Invalid("Missing fan username.")));
    }
}
