use crate::user::model::{CreateUserRequest, UpdateUserRequest, UserIdBody};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;
use actix_web::{HttpResponse, web};
use serde_json::json;

pub async fn create_user(
    user_service: web::Data<UserService>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.create_user(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User saved successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "user": user,
    })))
}

pub async fn list_users(
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    let users = user_service.list_users().await?;

    if users.is_empty() {
        return Err(CustomError::NotFoundError("Failed to find users".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Users fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "users": users,
    })))
}

pub async fn update_user(
    user_id: web::Path<String>,
    user_service: web::Data<UserService>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let updated = user_service
        .update_user(&user_id.into_inner(), body.into_inner())
        .await?;

    match updated {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "User updated successfully",
            "httpStatusCode": 200,
            "service": service_name(),
            "user": user,
        }))),
        None => Err(CustomError::NotFoundError("User not found".into())),
    }
}

pub async fn add_bookmark(
    post_id: web::Path<String>,
    user_service: web::Data<UserService>,
    body: web::Json<UserIdBody>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service
        .add_bookmark(&body.user_id, &post_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post bookmarked",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": user,
    })))
}

pub async fn remove_bookmark(
    post_id: web::Path<String>,
    user_service: web::Data<UserService>,
    body: web::Json<UserIdBody>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service
        .remove_bookmark(&body.user_id, &post_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Bookmark removed",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": user,
    })))
}

pub async fn list_bookmarks(
    user_id: web::Path<String>,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    let bookmarks = user_service.list_bookmarks(&user_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Bookmarks fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "bookmarks": bookmarks,
    })))
}

pub async fn follow_user(
    follow_user_id: web::Path<String>,
    user_service: web::Data<UserService>,
    body: web::Json<UserIdBody>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service
        .follow_user(&body.user_id, &follow_user_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User followed",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": user,
    })))
}

pub async fn unfollow_user(
    follow_user_id: web::Path<String>,
    user_service: web::Data<UserService>,
    body: web::Json<UserIdBody>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service
        .unfollow_user(&body.user_id, &follow_user_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User unfollowed",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": user,
    })))
}
