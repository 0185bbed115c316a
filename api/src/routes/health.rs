use actix_web::{web, HttpResponse};
use std::time::Duration;

use qz_core::errors::DomainError;
use qz_shared::{error_codes, ErrorResponse};

use crate::app::AppState;

/// Upper bound for the database probe
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Handler for GET /health
///
/// Answers 200 when the database answers within [`HEALTH_PROBE_TIMEOUT`],
/// 503 otherwise.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    match tokio::time::timeout(HEALTH_PROBE_TIMEOUT, probe_database(&state)).await {
        Ok(Ok(())) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "quizprep-api",
            "version": env!("CARGO_PKG_VERSION"),
            "database": state.context.provider_kind().map(|kind| kind.as_str()),
            "timestamp": state.clock.now().to_rfc3339(),
        })),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Health check failed");
            unavailable("Database is unavailable")
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = HEALTH_PROBE_TIMEOUT.as_millis() as u64,
                "Health check timed out"
            );
            unavailable("Database health check timed out")
        }
    }
}

async fn probe_database(state: &AppState) -> Result<(), DomainError> {
    // Fails unless the context finished initializing
    state.context.provider()?;

    if let Some(database) = &state.database {
        let pool = database.default_database().await?;
        if !pool.health_check().await? {
            return Err(DomainError::Internal {
                message: "unexpected health check result".to_string(),
            });
        }
    }
    Ok(())
}

fn unavailable(message: &str) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
        error_codes::SERVICE_UNAVAILABLE,
        message,
    ))
}
