use crate::utils::error::CustomError;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Bookmarked post ids; kept duplicate-free. Deleting a post does not
    /// remove it here, so stale ids can linger.
    #[serde(default)]
    pub bookmarks: Vec<ObjectId>,
    /// Ids of users this user follows; never contains the user's own id.
    #[serde(default)]
    pub following: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Add a bookmark. Returns false when the post was already bookmarked
    /// (callers treat that as a silent no-op, not an error).
    pub fn add_bookmark(&mut self, post_id: ObjectId) -> bool {
        if self.bookmarks.contains(&post_id) {
            return false;
        }
        self.bookmarks.push(post_id);
        true
    }

    /// Remove a bookmark. Returns false when it was not present.
    pub fn remove_bookmark(&mut self, post_id: ObjectId) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|id| *id != post_id);
        self.bookmarks.len() != before
    }

    /// Follow another user. Rejects following oneself; a repeat follow is a
    /// silent no-op (returns false).
    pub fn follow(&mut self, target_id: ObjectId) -> Result<bool, CustomError> {
        if self.id == Some(target_id) {
            return Err(CustomError::ValidationError(
                "cannot follow yourself".to_string(),
            ));
        }
        if self.following.contains(&target_id) {
            return Ok(false);
        }
        self.following.push(target_id);
        Ok(true)
    }

    /// Unfollow. Returns false when the target was not being followed.
    pub fn unfollow(&mut self, target_id: ObjectId) -> bool {
        let before = self.following.len();
        self.following.retain(|id| *id != target_id);
        self.following.len() != before
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

/// Body carrying the acting user's id, e.g. `{ "userId": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdBody {
    pub user_id: String,
}

/// A user as exposed over HTTP: everything except the password.
#[derive(Debug, Serialize, Clone)]
pub struct PublicUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub bookmarks: Vec<ObjectId>,
    pub following: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            bookmarks: user.bookmarks,
            following: user.following,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Some(ObjectId::new()),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            bio: None,
            bookmarks: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn bookmark_twice_keeps_one_entry() {
        let mut u = user();
        let p = ObjectId::new();

        assert!(u.add_bookmark(p));
        assert!(!u.add_bookmark(p));
        assert_eq!(u.bookmarks.iter().filter(|id| **id == p).count(), 1);
    }

    #[test]
    fn remove_bookmark_is_tolerant_of_absence() {
        let mut u = user();
        let p = ObjectId::new();

        assert!(!u.remove_bookmark(p));
        u.add_bookmark(p);
        assert!(u.remove_bookmark(p));
        assert!(u.bookmarks.is_empty());
    }

    #[test]
    fn follow_then_unfollow_restores_state() {
        let mut u = user();
        let target = ObjectId::new();
        let before = u.following.clone();

        assert!(u.follow(target).unwrap());
        assert!(u.following.contains(&target));
        assert!(!u.follow(target).unwrap());
        assert_eq!(u.following.len(), 1);

        assert!(u.unfollow(target));
        assert_eq!(u.following, before);
    }

    #[test]
    fn self_follow_is_rejected() {
        let mut u = user();
        let own_id = u.id.unwrap();
        let err = u.follow(own_id).unwrap_err();
        assert!(matches!(err, CustomError::ValidationError(_)));
        assert!(u.following.is_empty());
    }

    #[test]
    fn public_view_has_no_password_field() {
        let public = PublicUser::from(user());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("username").is_some());
    }
}
