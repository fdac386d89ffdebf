use std::sync::Arc;

use dotenvy::dotenv;
use ticketing_service::config::AppConfig;
use ticketing_service::domain::checkin::CheckInClock;
use ticketing_service::infrastructure::notifier::LogNotifier;
use ticketing_service::infrastructure::phonepe::PhonePeGateway;
use ticketing_service::{build_server, create_pool, run_migrations, Integrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    let gateway = PhonePeGateway::new(config.phonepe.clone()).map_err(std::io::Error::other)?;
    let integrations = Integrations {
        gateway: Arc::new(gateway),
        notifier: Arc::new(LogNotifier),
        payment_redirect_url: config.payment_redirect_url.clone(),
        clock: CheckInClock::new(config.checkin_timezone),
    };

    log::info!(
        "Starting server at http://{}:{} (check-in timezone {})",
        config.host,
        config.port,
        config.checkin_timezone
    );

    build_server(pool, integrations, &config.host, config.port)?.await
}
