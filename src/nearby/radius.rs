use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::PostStore;
use crate::error::NearbyError;

/// 常量表中搜索半径的键
pub const RADIUS_KEY: &str = "RADIUS_IN_FT";

#[async_trait]
pub trait RadiusProvider: Send + Sync {
    /// 当前搜索半径（英尺）
    async fn radius(&self) -> Result<f64, NearbyError>;
}

/// 每次查询都从存储中读取半径，不做缓存
#[derive(Clone)]
pub struct StoredRadius {
    store: Arc<dyn PostStore>,
}

impl StoredRadius {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RadiusProvider for StoredRadius {
    async fn radius(&self) -> Result<f64, NearbyError> {
        let value = self
            .store
            .read_config(RADIUS_KEY)
            .await
            .map_err(|e| NearbyError::ConfigUnavailable(e.to_string()))?
            .ok_or_else(|| NearbyError::ConfigUnavailable(format!("{} is not set", RADIUS_KEY)))?;

        parse_radius(&value)
    }
}

// 数字或数字字符串都接受
fn parse_radius(value: &Value) -> Result<f64, NearbyError> {
    let radius = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match radius {
        Some(r) if r.is_finite() => Ok(r),
        _ => Err(NearbyError::ConfigUnavailable(format!(
            "{} has unusable value {}",
            RADIUS_KEY, value
        ))),
    }
}
