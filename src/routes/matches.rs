use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::PipelineError;
use crate::models::{
    ErrorResponse, GetMatchesQuery, HealthResponse, MatchListResponse, RunMatchQuery,
    RunMatchResponse,
};
use crate::routes::AppState;
use crate::services::store::StoreError;

/// Configure matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/match/run", web::post().to(run_match))
        .route("/match", web::get().to(get_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);
    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Trigger a matching run for a job
///
/// POST /api/v1/match/run?job_title=Data%20Engineer&top_k=100&top_n=10
async fn run_match(
    state: web::Data<AppState>,
    query: web::Query<RunMatchQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let top_k = query.top_k.unwrap_or(state.matching.default_top_k);
    let top_n = query.top_n.unwrap_or(state.matching.default_top_n);

    tracing::info!(
        "Running match for job '{}' (top_k: {}, top_n: {})",
        query.job_title,
        top_k,
        top_n
    );

    match state.pipeline.run(&query.job_title, top_k, top_n).await {
        Ok(report) => HttpResponse::Ok().json(RunMatchResponse {
            job_title: report.job.title,
            pool_size: report.pool_size,
            matched: report.matched,
            reranked: report.reranked,
        }),
        Err(PipelineError::JobNotFound(title)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Job not found".to_string(),
            message: format!("no posting with title '{}'", title),
            status_code: 404,
        }),
        Err(PipelineError::Persistence {
            written,
            failed,
            source,
        }) => {
            tracing::error!(
                "Persistence failure for job '{}': {} written, {} unconfirmed: {}",
                query.job_title,
                written,
                failed,
                source
            );
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Persistence failure".to_string(),
                message: format!("{} rows written, {} rows unconfirmed", written, failed),
                status_code: 500,
            })
        }
        Err(PipelineError::Store(e)) => {
            tracing::error!("Store error during match run: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Store error".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Read persisted match rows for a job, score descending
///
/// GET /api/v1/match?job_title=Data%20Engineer&k=10
async fn get_matches(
    state: web::Data<AppState>,
    query: web::Query<GetMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let job = match state.store.find_job(&query.job_title).await {
        Ok(job) => job,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Job not found".to_string(),
                message: format!("no posting with title '{}'", query.job_title),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to resolve job '{}': {}", query.job_title, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Store error".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    match state.store.matches_for_job(&job.id, query.k).await {
        Ok(items) => HttpResponse::Ok().json(MatchListResponse {
            job_title: job.title,
            items,
        }),
        Err(e) => {
            tracing::error!("Failed to read matches for job '{}': {}", job.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Store error".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
