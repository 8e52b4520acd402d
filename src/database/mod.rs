// 存储模块
// 帖子与常量的读写接口，以及 Postgres / 内存两种实现

mod memory;
mod postgres;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Post, PostId};

pub use memory::MemoryPostStore;
pub use postgres::PgPostStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// 帖子存储接口
///
/// 写入只追加；读取返回某一时刻全部帖子的快照，顺序与写入顺序一致。
#[async_trait]
pub trait PostStore: Send + Sync {
    /// 追加一条帖子，返回存储层分配的ID
    async fn append_post(&self, post: &Post) -> Result<PostId, StorageError>;

    /// 读取全部帖子
    async fn read_all_posts(&self) -> Result<Vec<(PostId, Post)>, StorageError>;

    /// 读取常量配置，不存在时返回 None
    async fn read_config(&self, key: &str) -> Result<Option<Value>, StorageError>;
}
