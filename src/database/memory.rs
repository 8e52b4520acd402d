use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostStore, StorageError};
use crate::config::Config;
use crate::models::{Post, PostId};
use crate::nearby::RADIUS_KEY;

/// 进程内存储，未配置数据库时使用
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: RwLock<Vec<(PostId, Post)>>,
    constants: RwLock<HashMap<String, Value>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置写入初始常量，目前只有搜索半径
    pub async fn seeded(config: &Config) -> Self {
        let store = Self::new();
        if let Some(radius) = config.radius_in_ft {
            store.set_config(RADIUS_KEY, Value::from(radius)).await;
        }
        store
    }

    pub async fn set_config(&self, key: &str, value: Value) {
        self.constants.write().await.insert(key.to_string(), value);
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn append_post(&self, post: &Post) -> Result<PostId, StorageError> {
        let id = Uuid::new_v4().to_string();
        self.posts.write().await.push((id.clone(), post.clone()));
        Ok(id)
    }

    async fn read_all_posts(&self) -> Result<Vec<(PostId, Post)>, StorageError> {
        Ok(self.posts.read().await.clone())
    }

    async fn read_config(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.constants.read().await.get(key).cloned())
    }
}
