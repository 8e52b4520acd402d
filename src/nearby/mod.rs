// 附近帖子查询
// 读取半径 -> 读取全部帖子 -> 逐条计算距离并过滤

mod radius;

use std::sync::Arc;
use std::time::Duration;

use crate::database::PostStore;
use crate::error::NearbyError;
use crate::models::{NearbyPost, Point, Post};
use crate::utils::distance_in_feet;

pub use radius::{RADIUS_KEY, RadiusProvider, StoredRadius};

/// 附近帖子查询引擎
///
/// 没有空间索引，每次查询都全量扫描。返回结果保持存储层的顺序，
/// 不按距离排序。
#[derive(Clone)]
pub struct NearbyPosts {
    store: Arc<dyn PostStore>,
    radius: Arc<dyn RadiusProvider>,
    timeout: Option<Duration>,
}

impl NearbyPosts {
    pub fn new(store: Arc<dyn PostStore>, radius: Arc<dyn RadiusProvider>) -> Self {
        Self {
            store,
            radius,
            timeout: None,
        }
    }

    /// 整个查询的超时时间，超时视为存储不可用
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn find_nearby(&self, point: Point) -> Result<Vec<NearbyPost>, NearbyError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.scan(point))
                .await
                .map_err(|_| {
                    NearbyError::StorageUnavailable(format!("query timed out after {:?}", limit))
                })?,
            None => self.scan(point).await,
        }
    }

    async fn scan(&self, point: Point) -> Result<Vec<NearbyPost>, NearbyError> {
        // 半径必须先读到，否则不读取帖子
        let radius = self.radius.radius().await?;
        tracing::debug!("got radius {}", radius);

        let snapshot = self
            .store
            .read_all_posts()
            .await
            .map_err(|e| NearbyError::StorageUnavailable(e.to_string()))?;

        let mut nearby = Vec::new();
        for (id, post) in snapshot {
            let location = match post_location(&id, &post) {
                Ok(location) => location,
                Err(e) => {
                    tracing::warn!("skipping post: {}", e);
                    continue;
                }
            };

            let distance = distance_in_feet(point, location);
            tracing::trace!("post {} distance {}", id, distance);

            // 包含边界
            if distance <= radius {
                nearby.push(NearbyPost { id, post });
            }
        }

        Ok(nearby)
    }
}

fn post_location(id: &str, post: &Post) -> Result<Point, NearbyError> {
    match post.location {
        Some(location) if location.is_finite() => Ok(location),
        _ => Err(NearbyError::MalformedLocation { id: id.to_string() }),
    }
}
