use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::{
    analyzer,
    app_state::AppState,
    business::{self, BusinessProfile},
    error::ServiceError,
    generator::fallback_hashtags,
    models::{channel_name, AiInsight, ContentRequest, GeneratedContent, PerformanceScores},
    notify::{self, EventKind},
};

// --- Payloads y Respuestas de la API ---

// Las plataformas de las operaciones secundarias son texto libre: un canal
// fuera del catálogo no debe impedir la respuesta.

#[derive(Deserialize)]
pub struct AnalyzePayload {
    #[serde(default)]
    content: String,
    #[serde(default)]
    platform: Option<String>,
}

#[derive(Deserialize)]
pub struct VariationsPayload {
    #[serde(default)]
    content: String,
    #[serde(default)]
    platforms: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagsPayload {
    #[serde(default)]
    content: String,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    business_id: Option<String>,
}

#[derive(Serialize)]
pub struct HashtagsResponse {
    hashtags: Vec<String>,
}

#[derive(Deserialize)]
pub struct InsightPayload {
    #[serde(rename = "type", default)]
    insight_type: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    store: &'static str,
    llm_configured: bool,
    llm_model: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/businesses", get(list_businesses_handler))
        .route("/api/businesses/:business_id", get(get_business_handler))
        // Operaciones secundarias: siempre 200, con valores de reserva si falla la IA.
        .route("/api/content/analyze", post(analyze_content_handler))
        .route("/api/content/variations", post(variations_handler))
        .route("/api/content/hashtags", post(hashtags_handler))
        .route("/api/:business_id/content", get(list_content_handler))
        .route(
            "/api/:business_id/content/generate",
            post(generate_content_handler),
        )
        .route("/api/:business_id/content/:id", get(get_content_handler))
        .route("/api/:business_id/insights", get(list_insights_handler))
        .route(
            "/api/:business_id/insights/analyze",
            post(analyze_insights_handler),
        )
        .route("/api/:business_id/insights/:id", get(get_insight_handler))
        .route("/ws", get(notify::websocket_handler))
        .with_state(app_state)
}

// --- Handlers ---

#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: state.store.backend(),
        llm_configured: state.generator.is_some(),
        llm_model: state.config.llm_chat_model.clone(),
    })
}

#[axum::debug_handler]
async fn list_businesses_handler() -> Json<&'static [BusinessProfile]> {
    Json(business::all())
}

#[axum::debug_handler]
async fn get_business_handler(
    Path(business_id): Path<String>,
) -> Result<Json<&'static BusinessProfile>, ServiceError> {
    Ok(Json(business::resolve(&business_id)?))
}

#[axum::debug_handler]
async fn generate_content_handler(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GeneratedContent>), ServiceError> {
    // Orden: negocio (404) → cuerpo (400) → credencial (503).
    let profile = business::resolve(&business_id)?;
    let Json(request) = payload?;
    request.validate()?;
    let generator = state.require_generator()?;

    let draft = generator.generate_content(&request, profile).await?;
    let saved = state
        .store
        .save_content(draft)
        .await
        .map_err(ServiceError::Storage)?;
    info!("Contenido {} generado para {}", saved.id, business_id);

    state.notifier.notify(EventKind::ContentCreated, &saved);
    Ok((StatusCode::CREATED, Json(saved)))
}

#[axum::debug_handler]
async fn list_content_handler(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> Result<Json<Vec<GeneratedContent>>, ServiceError> {
    let profile = business::resolve(&business_id)?;
    let contents = state
        .store
        .list_content(profile.id)
        .await
        .map_err(ServiceError::Storage)?;
    Ok(Json(contents))
}

#[axum::debug_handler]
async fn get_content_handler(
    State(state): State<AppState>,
    Path((business_id, id)): Path<(String, String)>,
) -> Result<Json<GeneratedContent>, ServiceError> {
    let profile = business::resolve(&business_id)?;
    state
        .store
        .get_content(profile.id, &id)
        .await
        .map_err(ServiceError::Storage)?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Contenido no encontrado: {id}")))
}

#[axum::debug_handler]
async fn analyze_insights_handler(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    payload: Result<Json<InsightPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<AiInsight>), ServiceError> {
    let profile = business::resolve(&business_id)?;
    let Json(payload) = payload?;
    let generator = state.require_generator()?;

    let draft = generator
        .generate_insight(&payload.insight_type, profile, payload.data.as_ref())
        .await?;
    let saved = state
        .store
        .save_insight(draft)
        .await
        .map_err(ServiceError::Storage)?;
    info!("Insight {} ({}) generado para {}", saved.id, saved.draft.insight_type, business_id);

    state.notifier.notify(EventKind::AiInsightCreated, &saved);
    Ok((StatusCode::CREATED, Json(saved)))
}

#[axum::debug_handler]
async fn list_insights_handler(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> Result<Json<Vec<AiInsight>>, ServiceError> {
    let profile = business::resolve(&business_id)?;
    let insights = state
        .store
        .list_insights(profile.id)
        .await
        .map_err(ServiceError::Storage)?;
    Ok(Json(insights))
}

#[axum::debug_handler]
async fn get_insight_handler(
    State(state): State<AppState>,
    Path((business_id, id)): Path<(String, String)>,
) -> Result<Json<AiInsight>, ServiceError> {
    let profile = business::resolve(&business_id)?;
    state
        .store
        .get_insight(profile.id, &id)
        .await
        .map_err(ServiceError::Storage)?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Insight no encontrado: {id}")))
}

#[axum::debug_handler]
async fn analyze_content_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzePayload>, JsonRejection>,
) -> Json<PerformanceScores> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Cuerpo de análisis inválido ({}); valores por defecto.", rejection.body_text());
            return Json(PerformanceScores::fallback());
        }
    };
    if payload.content.trim().is_empty() {
        return Json(PerformanceScores::fallback());
    }
    let platform = channel_name(payload.platform.as_deref());
    Json(analyzer::score(state.generator.as_ref(), &payload.content, &platform).await)
}

#[axum::debug_handler]
async fn variations_handler(
    State(state): State<AppState>,
    payload: Result<Json<VariationsPayload>, JsonRejection>,
) -> Json<BTreeMap<String, String>> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Cuerpo de variaciones inválido: {}", rejection.body_text());
            return Json(BTreeMap::new());
        }
    };
    let platforms: Vec<String> = payload
        .platforms
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| channel_name(Some(p)))
        .collect();
    Json(analyzer::variations(state.generator.as_ref(), &payload.content, &platforms).await)
}

#[axum::debug_handler]
async fn hashtags_handler(
    State(state): State<AppState>,
    payload: Result<Json<HashtagsPayload>, JsonRejection>,
) -> Json<HashtagsResponse> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Cuerpo de hashtags inválido: {}", rejection.body_text());
            return Json(HashtagsResponse {
                hashtags: fallback_hashtags(),
            });
        }
    };
    let profile = payload.business_id.as_deref().and_then(|id| {
        business::resolve(id)
            .map_err(|e| warn!("Hashtags sin contexto de negocio: {}", e))
            .ok()
    });
    let platform = channel_name(payload.platform.as_deref());
    let hashtags =
        analyzer::hashtags(state.generator.as_ref(), &payload.content, &platform, profile).await;
    Json(HashtagsResponse { hashtags })
}
