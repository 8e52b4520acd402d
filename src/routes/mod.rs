pub mod post;
pub mod target;
