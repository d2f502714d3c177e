mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::{MatchPipeline, RerankPolicy, ScoringConfig};
use routes::AppState;
use services::{OpenRouterClient, PgStore, ProfileExtractor, RerankClient};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        panic!("Configuration error: {}", e);
    });

    // Initialize logging; RUST_LOG overrides the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Talent Algo matching service...");
    info!("Configuration loaded successfully");

    // Initialize the profile store (runs migrations on startup)
    let store = Arc::new(
        PgStore::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!("Profile store initialized");

    // Scoring configuration
    let scoring = ScoringConfig {
        weight_base: settings.scoring.weight_base,
        location_bonus: settings.scoring.location_bonus,
    };

    // Optional re-ranker: matching degrades to heuristic-only without it
    let mut pipeline = MatchPipeline::new(store.clone(), scoring);

    if settings.reranker.enabled && !settings.reranker.api_key.is_empty() {
        let gateway = OpenRouterClient::new(
            settings.reranker.base_url.clone(),
            settings.reranker.api_key.clone(),
            settings.reranker.timeout_secs,
        );
        let reranker = Arc::new(RerankClient::new(gateway, settings.reranker.model.clone()));
        let policy = RerankPolicy {
            mode: settings.reranker.mode,
            blend_weight: settings.reranker.blend_weight,
            shortlist_size: settings.reranker.shortlist_size,
        };
        pipeline = pipeline.with_reranker(reranker, policy);
        info!("Re-ranker enabled (model: {})", settings.reranker.model);
    } else {
        info!("Re-ranker disabled, using heuristic scoring only");
    }

    // Optional CV extraction model; keyword fallback still applies without it
    let extractor = if settings.extraction.enabled && !settings.extraction.api_key.is_empty() {
        let gateway = OpenRouterClient::new(
            settings.extraction.base_url.clone(),
            settings.extraction.api_key.clone(),
            settings.extraction.timeout_secs,
        );
        info!("Profile extractor enabled (model: {})", settings.extraction.model);
        Some(Arc::new(ProfileExtractor::new(
            gateway,
            settings.extraction.model.clone(),
        )))
    } else {
        info!("Profile extractor disabled, keyword fallback only");
        None
    };

    info!(
        "Matcher configured (weight_base: {}, location_bonus: {})",
        scoring.weight_base, scoring.location_bonus
    );

    // Build application state
    let app_state = AppState {
        store,
        pipeline: Arc::new(pipeline),
        extractor,
        matching: settings.matching.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
