mod api;
mod application;
mod domain;
mod infrastructure;
mod ports;

use api::AppState;
use application::PaymentService;
use infrastructure::{GatewayAdapter, HttpCompletionNotifier, InMemoryOrderRepository, MySqlOrderRepository, PayConfig};
use ports::OrderRepositoryPort;
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Payment Service...");

    let config = PayConfig::from_env();
    info!(
        "Gateway: {}, secret: {}, consumer: {}",
        config.gateway_base_url.as_deref().unwrap_or("<unset>"),
        if config.gateway_secret.is_some() { "configured" } else { "<unset>" },
        config.notify_consumer_url.as_deref().unwrap_or("<unset>"),
    );
    if config.gateway().is_err() {
        warn!("Gateway URL or secret missing, order creation will fail until configured");
    }

    let gateway = Arc::new(GatewayAdapter::new(config.clone()));
    let notifier = Arc::new(HttpCompletionNotifier::new(config.notify_consumer_url.clone()));

    match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            info!("Connecting to database...");
            let pool = MySqlPool::connect(&database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database connected successfully");

            let repository = Arc::new(MySqlOrderRepository::new(Arc::new(pool)));
            serve(gateway, repository, notifier, config).await
        }
        Err(_) => {
            warn!("DATABASE_URL not set, orders are kept in memory only");
            let repository = Arc::new(InMemoryOrderRepository::new());
            serve(gateway, repository, notifier, config).await
        }
    }
}

async fn serve<R: OrderRepositoryPort + 'static>(
    gateway: Arc<GatewayAdapter>,
    repository: Arc<R>,
    notifier: Arc<HttpCompletionNotifier>,
    config: Arc<PayConfig>,
) -> anyhow::Result<()> {
    // 创建支付服务
    let payment_service = Arc::new(PaymentService::new(gateway, repository, notifier, config));

    let app = api::create_router(AppState { payment_service });

    // 启动服务器
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /api/pay/create - Create payment");
    info!("  POST /api/pay/notify - Gateway callback");
    info!("  GET  /api/pay/status/:trade_id - Query payment");
    info!("  GET  /api/pay/return - Post-payment redirect");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
