use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bookshelf::{
    AppState,
    config::Config,
    database::{self, PgBookRepository, PgTokenRepository, PgUserRepository},
    router::create_router,
};
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

    // 设置数据库连接池
    let pool = database::connect(&config)
        .await
        .expect("Failed to connect to Postgres");

    if config.run_migrations {
        database::migrate(&pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations applied");
    }

    // 设置应用状态
    let state = AppState::new(
        config.clone(),
        Arc::new(PgBookRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgTokenRepository::new(pool)),
    )
    .expect("Failed to build application state");

    let router = create_router(state);

    // 开发模式下允许所有来源的跨域请求
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
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
