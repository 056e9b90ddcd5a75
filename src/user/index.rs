use super::controller::{
    add_bookmark, create_user, follow_user, list_bookmarks, list_users, remove_bookmark,
    unfollow_user, update_user,
};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/user", web::post().to(create_user))
        .route("/api/user", web::get().to(list_users))
        .route("/api/user/update/{user_id}", web::post().to(update_user))
        .route("/api/users/bookmark/{post_id}", web::post().to(add_bookmark))
        .route(
            "/api/users/remove-bookmark/{post_id}",
            web::post().to(remove_bookmark),
        )
        .route(
            "/api/users/bookmark/{user_id}",
            web::get().to(list_bookmarks),
        )
        .route(
            "/api/users/follow/{follow_user_id}",
            web::post().to(follow_user),
        )
        .route(
            "/api/users/unfollow/{follow_user_id}",
            web::post().to(unfollow_user),
        );
}
