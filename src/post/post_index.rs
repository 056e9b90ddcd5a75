use super::post_controller::{
    create_post, delete_post, dislike_post, edit_post, get_post, like_post, list_posts,
};
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/post", web::get().to(list_posts))
        .route("/api/post/{post_id}", web::get().to(get_post))
        .route("/api/user/post", web::post().to(create_post))
        .route("/api/user/posts/{post_id}", web::delete().to(delete_post))
        .route("/api/posts/edit/{post_id}", web::post().to(edit_post))
        .route("/api/posts/like/{post_id}", web::post().to(like_post))
        .route("/api/posts/dislike/{post_id}", web::post().to(dislike_post));
}
