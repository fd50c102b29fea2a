use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::EngineError;
use crate::models::{
    DeleteModelResponse, ErrorResponse, HealthResponse, PartitionQuery, PredictRequest,
    PredictResponse, TrainResponse,
};
use crate::services::{Catalog, Recommender};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender<dyn Catalog>,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/train", web::post().to(train))
        .route("/predict", web::post().to(predict))
        .route("/analytics", web::get().to(analytics))
        .route("/admin/delete-model", web::post().to(delete_model));
}

/// Map an engine error onto the JSON error body
pub fn error_response(err: &EngineError) -> HttpResponse {
    let body = |status: u16| ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
        status_code: status,
    };

    match err {
        EngineError::NotFound(_) => HttpResponse::NotFound().json(body(404)),
        EngineError::Validation(_)
        | EngineError::NoTrainingData
        | EngineError::InsufficientLabelDiversity => HttpResponse::BadRequest().json(body(400)),
        _ => {
            tracing::error!("Request failed: {}", err);
            HttpResponse::InternalServerError().json(body(500))
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state
        .recommender
        .catalog()
        .health_check()
        .await
        .unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Train endpoint
///
/// POST /api/v1/train?partition=football
async fn train(state: web::Data<AppState>, query: web::Query<PartitionQuery>) -> impl Responder {
    match state.recommender.train(query.partition.as_deref()).await {
        Ok((partition, outcome)) => HttpResponse::Ok().json(TrainResponse {
            status: "trained".to_string(),
            partition: partition.to_string(),
            outcome,
        }),
        Err(e) => {
            tracing::info!("Training rejected: {}", e);
            error_response(&e)
        }
    }
}

/// Predict endpoint
///
/// POST /api/v1/predict?partition=football
///
/// Request body:
/// ```json
/// {
///   "questionnaire_id": 1,
///   "blend": 0.5,
///   "weights_profile": "sentiment_v1"
/// }
/// ```
async fn predict(
    state: web::Data<AppState>,
    query: web::Query<PartitionQuery>,
    req: web::Json<PredictRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_error".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let result = state
        .recommender
        .predict(
            req.questionnaire_id,
            req.blend,
            req.weights_profile.as_deref(),
            query.partition.as_deref(),
        )
        .await;

    match result {
        Ok(prediction) => HttpResponse::Ok().json(PredictResponse {
            questionnaire_id: req.questionnaire_id,
            scores: prediction.scores,
            model_used: prediction.model_used,
            weights_profile: prediction.profile,
        }),
        Err(e) => error_response(&e),
    }
}

/// Answer and feedback statistics
async fn analytics(state: web::Data<AppState>) -> impl Responder {
    match state.recommender.analytics().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

/// Remove the stored model of a partition
///
/// POST /api/v1/admin/delete-model?partition=football
async fn delete_model(
    state: web::Data<AppState>,
    query: web::Query<PartitionQuery>,
) -> impl Responder {
    match state.recommender.delete_model(query.partition.as_deref()).await {
        Ok((partition, removed)) => {
            tracing::info!("Deleted model for partition {}: {:?}", partition, removed);
            HttpResponse::Ok().json(DeleteModelResponse {
                status: "ok".to_string(),
                partition: partition.to_string(),
                removed,
            })
        }
        Err(e) => error_response(&e),
    }
}
