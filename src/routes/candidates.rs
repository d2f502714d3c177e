use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    normalize_skills, CandidateIn, CandidateProfile, CreateCandidateResponse, ErrorResponse,
    Location, UploadCvQuery,
};
use crate::routes::AppState;
use crate::services::extraction::{extract_text, ExtractedProfile};

/// Configure candidate routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/candidates", web::post().to(create_candidate))
        .route("/candidates/upload_cv", web::post().to(upload_cv));
}

/// Create a candidate from a structured form payload
///
/// POST /api/v1/candidates
async fn create_candidate(
    state: web::Data<AppState>,
    payload: web::Json<CandidateIn>,
) -> impl Responder {
    if let Err(errors) = payload.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let profile = payload.into_inner().into_profile();
    let skills = profile.skills_declared.clone();

    match state.store.insert_candidate(profile).await {
        Ok(candidate_id) => HttpResponse::Ok().json(CreateCandidateResponse {
            candidate_id,
            skills_detected: skills,
        }),
        Err(e) => {
            tracing::error!("Failed to store candidate: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to store candidate".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Create a candidate from an uploaded CV
///
/// POST /api/v1/candidates/upload_cv?full_name=...&email=...&city=...&country=...
///
/// The request body is the raw PDF. Text extraction and the extraction
/// model are both best-effort: a candidate with no detectable skills is
/// stored rather than rejected.
async fn upload_cv(
    state: web::Data<AppState>,
    query: web::Query<UploadCvQuery>,
    body: web::Bytes,
) -> impl Responder {
    let text = extract_text(&body);

    let extracted = match &state.extractor {
        Some(extractor) => extractor.extract_profile(&text).await,
        None => ExtractedProfile::default(),
    };
    let extracted = extracted.with_keyword_fallback(&text);

    let query = query.into_inner();
    let profile = CandidateProfile {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: query.full_name.trim().to_string(),
        email: query.email,
        location: Location {
            city: query.city,
            country: query.country,
            remote: None,
        },
        skills_declared: normalize_skills(extracted.skills),
        summary: extracted.summary,
        experiences: extracted.experiences,
        education: extracted.education,
        languages: extracted.languages,
        profile_source: "cv".to_string(),
        created_at: chrono::Utc::now(),
    };

    let skills = profile.skills_declared.clone();

    match state.store.insert_candidate(profile).await {
        Ok(candidate_id) => {
            tracing::info!(
                "Stored CV candidate {} with {} detected skills",
                candidate_id,
                skills.len()
            );
            HttpResponse::Ok().json(CreateCandidateResponse {
                candidate_id,
                skills_detected: skills,
            })
        }
        Err(e) => {
            tracing::error!("Failed to store CV candidate: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to store candidate".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
