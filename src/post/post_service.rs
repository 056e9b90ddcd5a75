use crate::database::DB_NAME;
use crate::post::post_model::{CreatePostData, EditPostData, Post, PostWithAuthor};
use crate::user::model::{PublicUser, User};
use crate::utils::error::CustomError;
use crate::utils::uploads::{FileUpload, MediaUpload, UploadService};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use std::collections::HashMap;

pub struct PostService<U = UploadService> {
    collection: Collection<Post>,
    users: Collection<User>,
    uploader: U,
}

impl<U: MediaUpload> PostService<U> {
    pub fn new(client: &Client, uploader: U) -> Self {
        let db = client.database(DB_NAME);
        PostService {
            collection: db.collection::<Post>("posts"),
            users: db.collection::<User>("users"),
            uploader,
        }
    }

    fn parse_id(id: &str, what: &str) -> Result<ObjectId, CustomError> {
        ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError(format!("Invalid {} ID", what)))
    }

    /// All posts, each with its author expanded to a password-free view.
    /// Authors are fetched in one `$in` query and joined in memory; a post
    /// whose author has vanished keeps `author: null`.
    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, CustomError> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch posts".into()))?;

        let posts: Vec<Post> = cursor
            .try_collect()
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to collect posts".into()))?;

        let mut author_ids: Vec<ObjectId> = posts.iter().map(|p| p.author).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut authors: HashMap<ObjectId, PublicUser> = HashMap::new();
        if !author_ids.is_empty() {
            let cursor = self
                .users
                .find(doc! { "_id": { "$in": author_ids } })
                .await
                .map_err(|_| CustomError::InternalServerError("Failed to fetch authors".into()))?;
            let users: Vec<User> = cursor
                .try_collect()
                .await
                .map_err(|_| CustomError::InternalServerError("Failed to collect authors".into()))?;
            for user in users {
                if let Some(id) = user.id {
                    authors.insert(id, PublicUser::from(user));
                }
            }
        }

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author).cloned();
                PostWithAuthor::from_post(post, author)
            })
            .collect())
    }

    /// Create a post, uploading the media file first when one is attached.
    /// An upload failure aborts before anything is persisted.
    pub async fn create_post(
        &self,
        data: CreatePostData,
        media_file: Option<FileUpload>,
    ) -> Result<Post, CustomError> {
        data.validate()?;
        let author = Self::parse_id(&data.author, "author")?;

        let media = self.resolve_media(media_file).await?;

        let post = Post::new(data.title, data.content, author, data.tags, media);

        self.collection
            .insert_one(&post)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to create post".into()))?;

        Ok(post)
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, CustomError> {
        let object_id = Self::parse_id(id, "post")?;

        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch post".into()))
    }

    /// Partial update. A new media file is uploaded only after the post is
    /// confirmed to exist, then replaces the whole `media` list.
    pub async fn edit_post(
        &self,
        id: &str,
        data: EditPostData,
        media_file: Option<FileUpload>,
    ) -> Result<Option<Post>, CustomError> {
        let object_id = Self::parse_id(id, "post")?;

        let existing = self
            .collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch post".into()))?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut update_doc = doc! {
            "$set": { "updated_at": Utc::now().to_rfc3339() }
        };
        let set = update_doc.get_document_mut("$set").unwrap();
        if let Some(title) = data.title {
            set.insert("title", title);
        }
        if let Some(content) = data.content {
            set.insert("content", content);
        }
        if let Some(author) = data.author {
            set.insert("author", Self::parse_id(&author, "author")?);
        }
        if let Some(tags) = data.tags {
            let tags = to_bson(&tags)
                .map_err(|_| CustomError::InternalServerError("Failed to encode tags".into()))?;
            set.insert("tags", tags);
        }
        if let Some(file) = media_file {
            let media = self.resolve_media(Some(file)).await?;
            set.insert("media", media);
        }

        self.collection
            .find_one_and_update(doc! { "_id": object_id }, update_doc)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to update post".into()))
    }

    pub async fn like_post(&self, post_id: &str, user_id: &str) -> Result<Post, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        self.ensure_user_exists(user_id).await?;

        let mut post = self.fetch_post(post_id).await?;
        post.add_like(user_id)?;
        self.save_likes(&mut post).await?;
        Ok(post)
    }

    pub async fn dislike_post(&self, post_id: &str, user_id: &str) -> Result<Post, CustomError> {
        let user_id = Self::parse_id(user_id, "user")?;
        self.ensure_user_exists(user_id).await?;

        let mut post = self.fetch_post(post_id).await?;
        post.remove_like(user_id)?;
        self.save_likes(&mut post).await?;
        Ok(post)
    }

    /// Delete the post document only. Bookmarks pointing at it are left
    /// alone; readers of bookmark lists see stale ids.
    pub async fn delete_post(&self, id: &str) -> Result<bool, CustomError> {
        let object_id = Self::parse_id(id, "post")?;

        let result = self
            .collection
            .delete_one(doc! { "_id": object_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to delete post".into()))?;

        Ok(result.deleted_count > 0)
    }

    /// Turn an optional attachment into the post's `media` list.
    async fn resolve_media(
        &self,
        media_file: Option<FileUpload>,
    ) -> Result<Vec<String>, CustomError> {
        match media_file {
            Some(file) => Ok(vec![self.uploader.upload(file).await?]),
            None => Ok(Vec::new()),
        }
    }

    async fn ensure_user_exists(&self, user_id: ObjectId) -> Result<(), CustomError> {
        self.users
            .find_one(doc! { "_id": user_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch user".into()))?
            .ok_or_else(|| CustomError::NotFoundError("User not found".into()))?;
        Ok(())
    }

    async fn fetch_post(&self, post_id: &str) -> Result<Post, CustomError> {
        let object_id = Self::parse_id(post_id, "post")?;
        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch post".into()))?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))
    }

    /// Write back the likes array. Plain $set, so two concurrent toggles on
    /// the same post can lose one of the writes.
    async fn save_likes(&self, post: &mut Post) -> Result<(), CustomError> {
        post.updated_at = Utc::now();
        let likes = to_bson(&post.likes)
            .map_err(|_| CustomError::InternalServerError("Failed to encode likes".into()))?;

        self.collection
            .update_one(
                doc! { "_id": post.id },
                doc! { "$set": {
                    "likes": likes,
                    "updated_at": post.updated_at.to_rfc3339(),
                }},
            )
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to update post".into()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ClientOptions;

    /// Returns a canned URL, or refuses when none is configured.
    struct StubUploader {
        url: Option<String>,
    }

    impl MediaUpload for StubUploader {
        async fn upload(&self, _file: FileUpload) -> Result<String, CustomError> {
            self.url
                .clone()
                .ok_or_else(|| CustomError::UploadError("upload refused".to_string()))
        }
    }

    // The driver connects lazily, so no store I/O happens unless a
    // collection operation is actually awaited.
    async fn service(uploader: StubUploader) -> PostService<StubUploader> {
        let options = ClientOptions::parse("mongodb://localhost:27017")
            .await
            .unwrap();
        let client = Client::with_options(options).unwrap();
        PostService::new(&client, uploader)
    }

    fn attachment() -> FileUpload {
        FileUpload::new("photo.jpg".to_string(), vec![1, 2, 3], None)
    }

    #[actix_web::test]
    async fn media_holds_exactly_the_url_the_uploader_returned() {
        let svc = service(StubUploader {
            url: Some("https://cdn.example/photo.jpg".to_string()),
        })
        .await;

        let media = svc.resolve_media(Some(attachment())).await.unwrap();
        assert_eq!(media, vec!["https://cdn.example/photo.jpg".to_string()]);

        let none = svc.resolve_media(None).await.unwrap();
        assert!(none.is_empty());
    }

    #[actix_web::test]
    async fn failed_upload_aborts_creation_before_any_store_write() {
        let svc = service(StubUploader { url: None }).await;
        let data = CreatePostData {
            title: "t".to_string(),
            content: "c".to_string(),
            author: ObjectId::new().to_hex(),
            tags: vec![],
        };

        // Reaching the insert would surface a store error against the
        // unconnected client; getting the upload error back proves the
        // post was never persisted.
        let err = svc.create_post(data, Some(attachment())).await.unwrap_err();
        assert!(matches!(err, CustomError::UploadError(_)));
    }
}
