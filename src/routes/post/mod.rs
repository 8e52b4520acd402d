mod handler;
mod model;

pub use handler::{create_post, find_nearby_posts};
pub use model::parse_point;
