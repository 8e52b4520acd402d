use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{PostStore, StorageError};
use crate::models::{Point, Post, PostId, PostType};

const CREATE_POSTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS posts (
        seq BIGSERIAL PRIMARY KEY,
        id TEXT NOT NULL UNIQUE,
        author TEXT NOT NULL,
        posted_at BIGINT NOT NULL,
        post_type TEXT,
        url TEXT,
        latitude DOUBLE PRECISION,
        longitude DOUBLE PRECISION,
        marker TEXT
    )
"#;

const CREATE_CONSTANTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS constants (
        key TEXT PRIMARY KEY,
        value JSONB NOT NULL
    )
"#;

/// Postgres 帖子存储
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建表（幂等）
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_POSTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CONSTANTS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// 定义原始数据结构，用于从数据库查询
#[derive(sqlx::FromRow)]
struct PostRow {
    id: String,
    author: String,
    posted_at: i64,
    post_type: Option<String>,
    url: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    marker: Option<String>,
}

impl PostRow {
    fn into_entry(self) -> (PostId, Post) {
        let post_type = self.post_type.and_then(|ty| match ty.parse::<PostType>() {
            Ok(ty) => Some(ty),
            Err(e) => {
                tracing::warn!("post {} has {}", self.id, e);
                None
            }
        });
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Point::new(lat, lon)),
            _ => None,
        };

        (
            self.id,
            Post {
                author: self.author,
                time: self.posted_at,
                post_type,
                url: self.url,
                location,
                marker: self.marker,
            },
        )
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn append_post(&self, post: &Post) -> Result<PostId, StorageError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO posts
                (id, author, posted_at, post_type, url, latitude, longitude, marker)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&id)
        .bind(&post.author)
        .bind(post.time)
        .bind(post.post_type.map(|ty| ty.as_str()))
        .bind(post.url.as_deref())
        .bind(post.location.map(|p| p.lat))
        .bind(post.location.map(|p| p.lon))
        .bind(post.marker.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn read_all_posts(&self) -> Result<Vec<(PostId, Post)>, StorageError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author, posted_at, post_type, url, latitude, longitude, marker
            FROM posts
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_entry).collect())
    }

    async fn read_config(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value = sqlx::query_scalar::<_, Value>("SELECT value FROM constants WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }
}
