use std::time::Duration;

use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Settings;
use crate::db::DbPool;
use crate::schema::order_outbox;

const CACHE_PING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub cache: String,
    pub queue: String,
}

fn flag(ok: bool) -> String {
    if ok { "ok" } else { "error" }.to_string()
}

async fn check_database(pool: DbPool) -> bool {
    let result = web::block(move || -> Result<(), String> {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map_err(|e| e.to_string())?;
        Ok(())
    })
    .await;

    match result {
        Ok(Ok(())) => true,
        _ => {
            log::error!("Database health check failed");
            false
        }
    }
}

async fn check_cache(redis_url: String) -> bool {
    let ping = async {
        let client = redis::Client::open(redis_url.as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await?;
        Ok::<_, redis::RedisError>(())
    };

    match tokio::time::timeout(CACHE_PING_TIMEOUT, ping).await {
        Ok(Ok(())) => true,
        _ => {
            log::error!("Redis health check failed");
            false
        }
    }
}

/// The notification queue is the outbox table; being able to count its
/// pending rows is what "reachable" means here.
async fn check_queue(pool: DbPool) -> bool {
    let result = web::block(move || -> Result<i64, String> {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        order_outbox::table
            .filter(order_outbox::processed_at.is_null())
            .count()
            .get_result(&mut conn)
            .map_err(|e| e.to_string())
    })
    .await;

    match result {
        Ok(Ok(_)) => true,
        _ => {
            log::error!("Outbox queue health check failed");
            false
        }
    }
}

/// GET /health
///
/// Reports store, cache, and queue reachability as independent flags for
/// load balancers and container orchestration.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All components reachable", body = HealthResponse),
        (status = 503, description = "One or more components unreachable", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health_check(
    pool: web::Data<DbPool>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let database = check_database(pool.get_ref().clone()).await;
    let cache = check_cache(settings.redis_url.clone()).await;
    let queue = check_queue(pool.get_ref().clone()).await;

    let healthy = database && cache && queue;
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database: flag(database),
        cache: flag(cache),
        queue: flag(queue),
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
