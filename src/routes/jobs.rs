use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{ErrorResponse, IngestResponse, JobIngestPayload, UpsertOutcome};
use crate::routes::AppState;

/// Configure job ingestion routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/jobs/ingest", web::post().to(ingest_jobs));
}

/// Ingest one posting or a batch
///
/// POST /api/v1/jobs/ingest
///
/// Accepts either a single posting object or an array of them. The whole
/// payload is validated before any store mutation; re-ingesting the same
/// discriminator key updates the stored posting in place.
async fn ingest_jobs(
    state: web::Data<AppState>,
    payload: web::Json<JobIngestPayload>,
) -> impl Responder {
    let postings = payload.into_inner().into_postings();

    if postings.is_empty() {
        return HttpResponse::Ok().json(IngestResponse {
            status: "ok".to_string(),
            ingested: 0,
            inserted: 0,
            updated: 0,
        });
    }

    // Validate everything up front so a bad batch mutates nothing
    for (i, posting) in postings.iter().enumerate() {
        if let Err(errors) = posting.validate() {
            tracing::info!("Validation failed for posting {} in ingest batch: {}", i, errors);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                message: format!("posting {}: {}", i, errors),
                status_code: 400,
            });
        }
    }

    let total = postings.len();
    let mut inserted = 0;
    let mut updated = 0;

    for posting in postings {
        let title = posting.title.clone();
        match state.store.upsert_job(posting.into_posting()).await {
            Ok(UpsertOutcome::Inserted { .. }) => inserted += 1,
            Ok(UpsertOutcome::Updated { .. }) => updated += 1,
            Err(e) => {
                tracing::error!("Failed to upsert posting '{}': {}", title, e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Ingest failed".to_string(),
                    message: format!(
                        "{} of {} postings ingested before failure: {}",
                        inserted + updated,
                        total,
                        e
                    ),
                    status_code: 500,
                });
            }
        }
    }

    tracing::info!(
        "Ingested {} postings ({} inserted, {} updated)",
        total,
        inserted,
        updated
    );

    HttpResponse::Ok().json(IngestResponse {
        status: "ok".to_string(),
        ingested: total,
        inserted,
        updated,
    })
}
