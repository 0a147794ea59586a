use std::sync::Arc;

use dotenvy::dotenv;

use order_api::config::Settings;
use order_api::infrastructure::order_repo::DieselOrderRepository;
use order_api::notifications::dispatcher::Dispatcher;
use order_api::notifications::retry::RetryConfig;
use order_api::notifications::worker::NotificationWorker;
use order_api::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().expect("Invalid configuration");

    let pool = create_pool(&settings.database_url);
    run_migrations(&pool);

    let repo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let dispatcher = Dispatcher::new(repo, settings.slack.clone(), RetryConfig::default())
        .expect("Failed to build Slack client");
    let worker = NotificationWorker::new(pool.clone(), dispatcher, settings.outbox_poll_interval);
    tokio::spawn(worker.run());

    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(pool, settings)?.await
}
