pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod middleware;
pub mod notifications;
pub mod schema;

use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use config::Settings;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::health::health_check,
    ),
    components(schemas(
        handlers::orders::CreateOrderRequest,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::OrderResponse,
        handlers::orders::ListOrdersResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "orders", description = "Order management"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to the configured host/port.
///
/// The caller is responsible for `.await`-ing (or spawning) the returned
/// server. The notification worker is wired separately in `main`.
pub fn build_server(pool: DbPool, settings: Settings) -> std::io::Result<actix_web::dev::Server> {
    let service = OrderService::new(Arc::new(DieselOrderRepository::new(pool.clone())));
    let host = settings.host.clone();
    let port = settings.port;

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(handlers::path_config())
            .wrap(Logger::default())
            .wrap(middleware::RequestId)
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .route("/health", web::get().to(handlers::health::health_check))
            .service(handlers::orders::routes())
    })
    .bind((host, port))?
    .run())
}
