use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// 未设置时使用内存存储
    pub database_url: Option<String>,
    /// 未设置时不启用限流
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub query_timeout_secs: Option<u64>,
    /// 内存存储启动时写入的搜索半径（英尺）
    pub radius_in_ft: Option<f64>,
    pub vuforia_access_key: String,
    pub vuforia_secret_key: String,
    pub vuforia_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            server_host: "0.0.0.0".into(),
            server_port: 5000,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            query_timeout_secs: None,
            radius_in_ft: None,
            vuforia_access_key: String::new(),
            vuforia_secret_key: String::new(),
            vuforia_base_url: "https://vws.vuforia.com".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        Ok(Config {
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            server_host: optional("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed("PORT")?.unwrap_or(defaults.server_port),
            rate_limit_window_secs: parsed("RATE_LIMIT_WINDOW")?
                .unwrap_or(defaults.rate_limit_window_secs),
            rate_limit_requests: parsed("RATE_LIMIT_REQUESTS")?
                .unwrap_or(defaults.rate_limit_requests),
            query_timeout_secs: parsed("QUERY_TIMEOUT_SECS")?,
            radius_in_ft: parsed("RADIUS_IN_FT")?,
            vuforia_access_key: optional("VUFORIA_ACCESS_KEY").unwrap_or_default(),
            vuforia_secret_key: optional("VUFORIA_SECRET_KEY").unwrap_or_default(),
            vuforia_base_url: optional("VUFORIA_BASE_URL").unwrap_or(defaults.vuforia_base_url),
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }
}

// 空字符串视为未设置
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}
