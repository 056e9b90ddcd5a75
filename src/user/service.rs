use crate::database::DB_NAME;
use crate::user::model::{CreateUserRequest, PublicUser, UpdateUserRequest, User};
use crate::utils::error::CustomError;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<User>("users");
        UserService { collection }
    }

    fn parse_id(id: &str, what: &str) -> Result<ObjectId, CustomError> {
        ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError(format!("Invalid {} ID", what)))
    }

    async fn find_by_id(&self, user_id: ObjectId) -> Result<User, CustomError> {
        self.collection
            .find_one(doc! { "_id": user_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch user".into()))?
            .ok_or_else(|| CustomError::NotFoundError("User not found".into()))
    }

    /// Persist the membership lists after an in-memory mutation. Plain $set
    /// of the whole array; concurrent writers last-write-win.
    async fn save_lists(&self, user: &User) -> Result<(), CustomError> {
        let bookmarks = to_bson(&user.bookmarks)
            .map_err(|_| CustomError::InternalServerError("Failed to encode bookmarks".into()))?;
        let following = to_bson(&user.following)
            .map_err(|_| CustomError::InternalServerError("Failed to encode following".into()))?;

        self.collection
            .update_one(
                doc! { "_id": user.id },
                doc! { "$set": {
                    "bookmarks": bookmarks,
                    "following": following,
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to update user".into()))?;

        Ok(())
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<PublicUser, CustomError> {
        if req.username.trim().is_empty() {
            return Err(CustomError::ValidationError("username is required".into()));
        }
        if req.email.trim().is_empty() {
            return Err(CustomError::ValidationError("email is required".into()));
        }
        if req.password.trim().is_empty() {
            return Err(CustomError::ValidationError("password is required".into()));
        }

        let now = Utc::now();
        let mut user = User {
            id: None,
            username: req.username,
            email: req.email,
            password: req.password,
            bio: req.bio,
            bookmarks: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let result = self.collection.insert_one(&user).await.map_err(|e| {
            if matches!(*e.kind, mongodb::error::ErrorKind::Write(_)) {
                CustomError::ValidationError(format!("User rejected by store: {}", e))
            } else {
                CustomError::InternalServerError("Failed to create user".into())
            }
        })?;

        user.id = result.inserted_id.as_object_id();
        Ok(PublicUser::from(user))
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, CustomError> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch users".into()))?;

        let users: Vec<User> = cursor
            .try_collect()
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to collect users".into()))?;

        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn update_user(
        &self,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<Option<PublicUser>, CustomError> {
        let object_id = Self::parse_id(id, "user")?;

        let mut update_doc = doc! {
            "$set": { "updated_at": Utc::now().to_rfc3339() }
        };
        let set = update_doc.get_document_mut("$set").unwrap();
        if let Some(username) = req.username {
            set.insert("username", username);
        }
        if let Some(email) = req.email {
            set.insert("email", email);
        }
        if let Some(password) = req.password {
            set.insert("password", password);
        }
        if let Some(bio) = req.bio {
            set.insert("bio", bio);
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": object_id }, update_doc)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to update user".into()))?;

        Ok(updated.map(PublicUser::from))
    }

    pub async fn add_bookmark(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> Result<PublicUser, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        let post_id = Self::parse_id(post_id, "post")?;

        let mut user = self.find_by_id(user_id).await?;
        // A repeat bookmark is a silent no-op, not an error
        if user.add_bookmark(post_id) {
            self.save_lists(&user).await?;
        }
        Ok(PublicUser::from(user))
    }

    pub async fn remove_bookmark(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> Result<PublicUser, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        let post_id = Self::parse_id(post_id, "post")?;

        let mut user = self.find_by_id(user_id).await?;
        if user.remove_bookmark(post_id) {
            self.save_lists(&user).await?;
        }
        Ok(PublicUser::from(user))
    }

    /// Raw bookmark ids, not expanded posts. Stale ids from since-deleted
    /// posts are returned as-is.
    pub async fn list_bookmarks(&self, user_id: &str) -> Result<Vec<ObjectId>, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        let user = self.find_by_id(user_id).await?;
        Ok(user.bookmarks)
    }

    pub async fn follow_user(
        &self,
        user_id: &str,
        target_id: &str,
    ) -> Result<PublicUser, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        let target_id = Self::parse_id(target_id, "user")?;

        let mut user = self.find_by_id(user_id).await?;
        // Both sides must exist before the edge is recorded
        self.find_by_id(target_id).await?;

        if user.follow(target_id)? {
            self.save_lists(&user).await?;
        }
        Ok(PublicUser::from(user))
    }

    pub async fn unfollow_user(
        &self,
        user_id: &str,
        target_id: &str,
    ) -> Result<PublicUser, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        let target_id = Self::parse_id(target_id, "user")?;

        let mut user = self.find_by_id(user_id).await?;
        self.find_by_id(target_id).await?;

        if user.unfollow(target_id) {
            self.save_lists(&user).await?;
        }
        Ok(PublicUser::from(user))
    }
}
