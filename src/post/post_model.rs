use crate::user::model::PublicUser;
use crate::utils::error::CustomError;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A comment embedded in its post document. There are no comment routes;
/// the field exists so stored documents round-trip intact.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    pub author: ObjectId,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of users who liked the post; each id appears at most once.
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    pub author: ObjectId,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        title: String,
        content: String,
        author: ObjectId,
        tags: Vec<String>,
        media: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Post {
            id: ObjectId::new(),
            title,
            content,
            media,
            tags,
            likes: Vec::new(),
            author,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a like. Rejects a second like from the same user so the
    /// `likes` array stays a set.
    pub fn add_like(&mut self, user_id: ObjectId) -> Result<(), CustomError> {
        if self.likes.contains(&user_id) {
            return Err(CustomError::ConflictError("already liked".to_string()));
        }
        self.likes.push(user_id);
        Ok(())
    }

    /// Withdraw a like previously recorded for this user.
    pub fn remove_like(&mut self, user_id: ObjectId) -> Result<(), CustomError> {
        if !self.likes.contains(&user_id) {
            return Err(CustomError::ConflictError("not liked yet".to_string()));
        }
        self.likes.retain(|id| *id != user_id);
        Ok(())
    }
}

/// Text fields of the post-creation form; the media file travels alongside.
#[derive(Debug, Default)]
pub struct CreatePostData {
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl CreatePostData {
    pub fn validate(&self) -> Result<(), CustomError> {
        if self.title.trim().is_empty() {
            return Err(CustomError::ValidationError("title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(CustomError::ValidationError(
                "content is required".to_string(),
            ));
        }
        if self.author.trim().is_empty() {
            return Err(CustomError::ValidationError(
                "author is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial-update fields of the post-edit form.
#[derive(Debug, Default)]
pub struct EditPostData {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A post as returned by the listing endpoint, with the author reference
/// expanded to a password-free user view. `author` is None when the
/// referenced user no longer exists.
#[derive(Debug, Serialize)]
pub struct PostWithAuthor {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub media: Vec<String>,
    pub tags: Vec<String>,
    pub likes: Vec<ObjectId>,
    pub author: Option<PublicUser>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostWithAuthor {
    pub fn from_post(post: Post, author: Option<PublicUser>) -> Self {
        PostWithAuthor {
            id: post.id,
            title: post.title,
            content: post.content,
            media: post.media,
            tags: post.tags,
            likes: post.likes,
            author,
            comments: post.comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post::new(
            "hello".to_string(),
            "world".to_string(),
            ObjectId::new(),
            vec![],
            vec![],
        )
    }

    #[test]
    fn new_post_starts_with_no_likes_or_media() {
        let p = Post::new(
            "t".to_string(),
            "c".to_string(),
            ObjectId::new(),
            vec!["rust".to_string()],
            vec![],
        );
        assert!(p.likes.is_empty());
        assert!(p.media.is_empty());
        assert!(p.comments.is_empty());
    }

    #[test]
    fn second_like_from_same_user_is_a_conflict() {
        // Note: the persisted update is a plain $set of the whole array, so
        // two truly concurrent likes can still last-write-win at the store.
        // This guards the single-request rule only.
        let mut p = post();
        let u = ObjectId::new();

        p.add_like(u).unwrap();
        assert_eq!(p.likes.len(), 1);

        let err = p.add_like(u).unwrap_err();
        assert!(matches!(err, CustomError::ConflictError(_)));
        assert_eq!(p.likes.len(), 1);
    }

    #[test]
    fn like_then_dislike_restores_prior_state() {
        let mut p = post();
        let u = ObjectId::new();
        let before = p.likes.clone();

        p.add_like(u).unwrap();
        p.remove_like(u).unwrap();
        assert_eq!(p.likes, before);
    }

    #[test]
    fn dislike_without_like_is_a_conflict() {
        let mut p = post();
        let err = p.remove_like(ObjectId::new()).unwrap_err();
        assert!(matches!(err, CustomError::ConflictError(_)));
    }

    #[test]
    fn create_form_requires_title_content_author() {
        let mut data = CreatePostData {
            title: "t".to_string(),
            content: "c".to_string(),
            author: ObjectId::new().to_hex(),
            tags: vec![],
        };
        assert!(data.validate().is_ok());

        data.title = "   ".to_string();
        assert!(matches!(
            data.validate().unwrap_err(),
            CustomError::ValidationError(_)
        ));
    }
}
