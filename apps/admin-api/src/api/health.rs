//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use mongodb::Database;
use serde_json::Value;

/// `GET /ready`, answering 503 while MongoDB is unreachable
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(db)
}

async fn readiness_check(State(db): State<Database>) -> (StatusCode, Json<Value>) {
    let mongodb: HealthCheckFuture = Box::pin(async move {
        let status = database::mongodb::check_health_detailed(&db).await;
        tracing::debug!(
            response_time_ms = status.response_time_ms,
            "MongoDB readiness ping"
        );
        if status.healthy {
            Ok(())
        } else {
            Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}
