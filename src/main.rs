use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use nearby_posts::{
    AppState,
    config::Config,
    database::{MemoryPostStore, PgPostStore, PostStore},
    middleware::{RateLimiter, rate_limit},
    router::create_router,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置存储，未配置数据库时使用内存存储
    let store: Arc<dyn PostStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'nearby_posts';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(database_url)
                .await
                .expect("Failed to connect to Postgres");

            let store = PgPostStore::new(pool);
            store
                .ensure_schema()
                .await
                .expect("Failed to create database schema");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, posts are kept in memory only");
            if config.radius_in_ft.is_none() {
                tracing::warn!("RADIUS_IN_FT not set, nearby queries will fail");
            }
            Arc::new(MemoryPostStore::seeded(&config).await)
        }
    };

    let state = AppState::new(config.clone(), store);
    let router = create_router(state);

    // 配置了 Redis 时启用限流
    let router = match &config.redis_url {
        Some(redis_url) => {
            let redis_client =
                redis::Client::open(redis_url.clone()).expect("Failed to create Redis client");
            let rate_limiter = Arc::new(RateLimiter::new(redis_client, config.clone()));
            router.layer(axum::middleware::from_fn_with_state(rate_limiter, rate_limit))
        }
        None => {
            tracing::info!("REDIS_URL not set, rate limiting disabled");
            router
        }
    };

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Running on {}. Press <Ctrl + C> to quit.", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
