mod handler;
mod model;

pub use handler::update_target;
pub use model::{UpdateTargetRequest, VWS_CONTENT_TYPE};
