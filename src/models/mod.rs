mod point;
mod post;

pub use point::Point;
pub use post::{NearbyPost, NewPost, Post, PostId, PostType, UnknownPostType};
