use crate::post::post_model::{CreatePostData, EditPostData};
use crate::post::post_service::PostService;
use crate::user::model::UserIdBody;
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;
use crate::utils::uploads::FileUpload;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use serde_json::json;
use std::collections::HashMap;

/// Pull the text fields and the optional `media` file out of a multipart
/// form. The file is buffered in memory for the lifetime of the request.
async fn extract_post_form(
    mut payload: Multipart,
) -> Result<(HashMap<String, String>, Option<FileUpload>), CustomError> {
    let mut fields = HashMap::new();
    let mut media: Option<FileUpload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| CustomError::BadRequestError(format!("Malformed multipart field: {}", e)))?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        let field_name = content_disposition.get_name().unwrap_or("").to_string();

        if field_name == "media" {
            let file_name = content_disposition
                .get_filename()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field.content_type().map(|ct| ct.to_string());

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    CustomError::BadRequestError(format!("Error reading file chunk: {}", e))
                })?;
                data.extend_from_slice(&chunk);
            }

            if !data.is_empty() {
                media = Some(FileUpload::new(file_name, data, content_type));
            }
        } else {
            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    CustomError::BadRequestError(format!("Error reading form field: {}", e))
                })?;
                data.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(data).map_err(|_| {
                CustomError::BadRequestError(format!("Field '{}' is not valid UTF-8", field_name))
            })?;
            fields.insert(field_name, value);
        }
    }

    Ok((fields, media))
}

fn parse_tags(raw: Option<&String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

pub async fn list_posts(
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_posts().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "posts": posts,
    })))
}

pub async fn create_post(
    post_service: web::Data<PostService>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let (fields, media_file) = extract_post_form(payload).await?;

    let data = CreatePostData {
        title: fields.get("title").cloned().unwrap_or_default(),
        content: fields.get("content").cloned().unwrap_or_default(),
        author: fields.get("author").cloned().unwrap_or_default(),
        tags: parse_tags(fields.get("tags")),
    };

    let post = post_service.create_post(data, media_file).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "post": post,
    })))
}

pub async fn get_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.get_post(&post_id.into_inner()).await?;

    match post {
        Some(p) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Post fetched successfully",
            "httpStatusCode": 200,
            "service": service_name(),
            "post": p,
        }))),
        None => Err(CustomError::NotFoundError("Post not found".into())),
    }
}

pub async fn edit_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let (fields, media_file) = extract_post_form(payload).await?;

    let data = EditPostData {
        title: fields.get("title").cloned(),
        content: fields.get("content").cloned(),
        author: fields.get("author").cloned(),
        tags: fields.get("tags").map(|raw| parse_tags(Some(raw))),
    };

    let updated = post_service
        .edit_post(&post_id.into_inner(), data, media_file)
        .await?;

    match updated {
        Some(p) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Post updated successfully",
            "httpStatusCode": 200,
            "service": service_name(),
            "post": p,
        }))),
        None => Err(CustomError::NotFoundError("Post not found".into())),
    }
}

pub async fn like_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    body: web::Json<UserIdBody>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .like_post(&post_id.into_inner(), &body.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post liked",
        "httpStatusCode": 200,
        "service": service_name(),
        "post": post,
    })))
}

pub async fn dislike_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    body: web::Json<UserIdBody>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .dislike_post(&post_id.into_inner(), &body.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post disliked",
        "httpStatusCode": 200,
        "service": service_name(),
        "post": post,
    })))
}

pub async fn delete_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let deleted = post_service.delete_post(&post_id.into_inner()).await?;

    if deleted {
        Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Post deleted successfully",
            "httpStatusCode": 200,
            "service": service_name(),
        })))
    } else {
        Err(CustomError::NotFoundError("Post not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_tags;

    #[test]
    fn tags_split_on_commas_and_drop_blanks() {
        let raw = "rust, web , ,backend".to_string();
        assert_eq!(parse_tags(Some(&raw)), vec!["rust", "web", "backend"]);
        assert!(parse_tags(None).is_empty());
    }
}
