use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Point;

/// 存储层分配的帖子ID
pub type PostId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Image,
    Video,
    Gif,
    Object,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Image => "image",
            PostType::Video => "video",
            PostType::Gif => "gif",
            PostType::Object => "object",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPostType(pub String);

impl fmt::Display for UnknownPostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown post type: {}", self.0)
    }
}

impl std::error::Error for UnknownPostType {}

impl FromStr for PostType {
    type Err = UnknownPostType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(PostType::Text),
            "image" => Ok(PostType::Image),
            "video" => Ok(PostType::Video),
            "gif" => Ok(PostType::Gif),
            "object" => Ok(PostType::Object),
            other => Err(UnknownPostType(other.to_string())),
        }
    }
}

/// 已写入的帖子
///
/// `time` 由服务端在写入时设置（毫秒时间戳）。`location` 可能缺失，
/// 查询时会跳过没有有效位置的帖子。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub author: String,
    pub time: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<PostType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

// 创建帖子请求，客户端传入的 time 字段会被忽略
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub author: String,
    #[serde(rename = "type", default)]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub location: Option<Point>,
    #[serde(default)]
    pub marker: Option<String>,
}

impl NewPost {
    pub fn into_post(self, time: i64) -> Post {
        Post {
            author: self.author,
            time,
            post_type: self.post_type,
            url: self.url,
            location: self.location,
            marker: self.marker,
        }
    }
}

/// 查询结果：帖子加上存储层分配的ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPost {
    pub id: PostId,
    #[serde(flatten)]
    pub post: Post,
}
