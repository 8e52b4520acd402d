use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, middleware::log_errors, routes};

// 帖子相关的路由
fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post", post(routes::post::create_post))
        .route("/posts/{lat}/{lon}", get(routes::post::find_nearby_posts))
}

// 识别目标相关的路由
fn target_routes() -> Router<AppState> {
    Router::new().route("/target", post(routes::target::update_target))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(post_routes())
        .merge(target_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
