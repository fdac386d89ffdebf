pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

use application::{
    billing_service::BillingService, catalog_service::CatalogService,
    checkin_service::CheckInService, issuance_service::IssuanceService,
    order_service::OrderService, payment_service::PaymentService,
};
use domain::checkin::CheckInClock;
use domain::ports::{Notifier, PaymentGateway};
use errors::AppError;
use infrastructure::{
    billing_repo::DieselBillingRepository, catalog_repo::DieselCatalogRepository,
    checkin_repo::DieselCheckInRepository, issuance_repo::DieselIssuanceRepository,
    order_repo::DieselOrderRepository, payment_repo::DieselPaymentRepository,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Outbound collaborators and settings that are not backed by the database.
pub struct Integrations {
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub payment_redirect_url: String,
    pub clock: CheckInClock,
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    integrations: Integrations,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let catalog = web::Data::new(CatalogService::new(DieselCatalogRepository::new(pool.clone())));
    let billing = web::Data::new(BillingService::new(DieselBillingRepository::new(pool.clone())));
    let orders = web::Data::new(OrderService::new(DieselOrderRepository::new(pool.clone())));
    let payments = web::Data::new(PaymentService::new(
        DieselPaymentRepository::new(pool.clone()),
        integrations.gateway,
        integrations.notifier,
        integrations.payment_redirect_url,
    ));
    let issuance = web::Data::new(IssuanceService::new(
        DieselIssuanceRepository::new(pool.clone()),
        integrations.clock,
    ));
    let check_ins = web::Data::new(CheckInService::new(
        DieselCheckInRepository::new(pool),
        integrations.clock,
    ));
    let openapi = openapi::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(catalog.clone())
            .app_data(billing.clone())
            .app_data(orders.clone())
            .app_data(payments.clone())
            .app_data(issuance.clone())
            .app_data(check_ins.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::bad_request(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                AppError::bad_request(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                AppError::bad_request(err.to_string()).into()
            }))
            .wrap(Logger::default())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}

fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{billing, catalog, checkin, issued_passes, orders, payments};

    cfg.route("/events", web::post().to(catalog::create_event))
        .route(
            "/events/{id}/sub-events",
            web::post().to(catalog::create_sub_event),
        )
        .service(
            web::scope("/sub-events")
                .route("/{id}", web::get().to(catalog::get_sub_event))
                .route("/{id}/capacity", web::put().to(catalog::resize_sub_event))
                .route("/{id}/active", web::put().to(catalog::set_sub_event_active))
                .route("/{id}/passes", web::get().to(catalog::list_passes)),
        )
        .route("/passes", web::post().to(catalog::create_pass))
        .route(
            "/billing-users",
            web::post().to(billing::register_billing_user),
        )
        .route("/order/create", web::post().to(orders::create_order))
        .service(
            web::scope("/orders")
                .route("", web::get().to(orders::list_orders))
                .route("/{id}", web::get().to(orders::get_order)),
        )
        .service(
            web::scope("/payment")
                .route("/initiate", web::post().to(payments::initiate_payment))
                .route(
                    "/phonepe/callback",
                    web::post().to(payments::phonepe_callback),
                )
                .route("/status", web::get().to(payments::force_confirm))
                .route(
                    "/{merchant_order_id}/sync",
                    web::post().to(payments::sync_payment),
                ),
        )
        .service(
            web::scope("/issued-passes")
                .route("/sponsored", web::post().to(issued_passes::issue_sponsored))
                .route("/{id}", web::get().to(issued_passes::get_issued_pass)),
        )
        .service(
            web::scope("/checkin")
                .route("/issued-pass", web::post().to(checkin::check_in))
                .route("/scan", web::post().to(checkin::scan))
                .route("/today", web::get().to(checkin::todays_check_ins)),
        );
}
