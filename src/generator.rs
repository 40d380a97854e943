//! Cliente de generación: prompt → modelo → validación/coerción del JSON.
//!
//! `generate_content`, `generate_insight` y `analyze` son todo-o-nada y
//! devuelven `ServiceError::GenerationFailed`. `variations` y `hashtags`
//! nunca fallan: cada sub-petición que falla se sustituye por un valor
//! de reserva.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use futures::future::join_all;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    business::BusinessProfile,
    error::ServiceError,
    llm::{extract_json_object, CompletionRequest, CompletionService},
    models::{
        ContentDraft, ContentRequest, ContentStatus, InsightDraft, InsightKind,
        PerformanceScores, Platform, Priority,
    },
    prompts,
};

pub const DEFAULT_SEO_SCORE: u8 = 75;
pub const DEFAULT_CONFIDENCE: f64 = 0.75;
pub const MAX_HASHTAGS: usize = 15;

const FALLBACK_HASHTAGS: &[&str] = &[
    "hawaii",
    "aloha",
    "shoplocal",
    "supportlocal",
    "smallbusiness",
    "fresh",
    "local",
    "authentic",
    "islandlife",
    "madeinhawaii",
];

/// Etiquetas genéricas usadas cuando no se pueden generar hashtags.
pub fn fallback_hashtags() -> Vec<String> {
    FALLBACK_HASHTAGS.iter().map(|t| t.to_string()).collect()
}

// --- Esquemas de respuesta del modelo (todo opcional, se valida al coercer) ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    title: Option<Value>,
    content: Option<Value>,
    hashtags: Option<Value>,
    word_count: Option<Value>,
    estimated_read_time: Option<Value>,
    seo_score: Option<Value>,
    engagement_score: Option<Value>,
    virality_score: Option<Value>,
    sentiment_score: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    engagement_prediction: Option<Value>,
    virality_score: Option<Value>,
    sentiment_score: Option<Value>,
    suggestions: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsight {
    title: Option<Value>,
    content: Option<Value>,
    priority: Option<Value>,
    actionable: Option<Value>,
    confidence: Option<Value>,
    recommendations: Option<Value>,
}

#[derive(Clone)]
pub struct ContentGenerator {
    llm: Arc<dyn CompletionService>,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn CompletionService>) -> Self {
        Self { llm }
    }

    /// Genera un contenido para el negocio. No persiste nada.
    ///
    /// La petición llega ya validada (`ContentRequest::validate`).
    pub async fn generate_content(
        &self,
        request: &ContentRequest,
        profile: &BusinessProfile,
    ) -> Result<ContentDraft, ServiceError> {
        debug_assert!(request.validate().is_ok());

        let completion = CompletionRequest::json(
            prompts::build_content_prompt(request, profile),
            0.8,
            1000,
        )
        .with_system(prompts::content_system_prompt(profile));

        let response = self
            .llm
            .complete(completion)
            .await
            .map_err(ServiceError::GenerationFailed)?;
        let raw: RawContent = parse_json(&response).map_err(ServiceError::GenerationFailed)?;
        let mut draft =
            coerce_content(raw, request, profile).map_err(ServiceError::GenerationFailed)?;

        if request.include_hashtags && draft.hashtags.as_ref().map_or(true, Vec::is_empty) {
            debug!("El modelo no devolvió hashtags; se generan aparte.");
            let platform = request.platform.unwrap_or(Platform::Instagram);
            draft.hashtags = Some(
                self.hashtags(&draft.content, platform.as_str(), Some(profile))
                    .await,
            );
        }

        Ok(draft)
    }

    /// Genera un insight con la plantilla correspondiente al `insight_type`.
    pub async fn generate_insight(
        &self,
        insight_type: &str,
        profile: &BusinessProfile,
        data: Option<&Value>,
    ) -> Result<InsightDraft, ServiceError> {
        let kind = InsightKind::from_type(insight_type);
        let completion = CompletionRequest::json(
            prompts::build_insight_prompt(kind, profile, data),
            0.7,
            800,
        )
        .with_system(prompts::insight_system_prompt(profile));

        let response = self
            .llm
            .complete(completion)
            .await
            .map_err(ServiceError::GenerationFailed)?;
        let raw: RawInsight = parse_json(&response).map_err(ServiceError::GenerationFailed)?;
        coerce_insight(raw, kind, insight_type, profile).map_err(ServiceError::GenerationFailed)
    }

    /// Predice el rendimiento de un texto ya generado.
    pub async fn analyze(
        &self,
        content: &str,
        platform: &str,
    ) -> Result<PerformanceScores, ServiceError> {
        let completion =
            CompletionRequest::json(prompts::build_analysis_prompt(content, platform), 0.3, 500);
        let response = self
            .llm
            .complete(completion)
            .await
            .map_err(ServiceError::GenerationFailed)?;
        let raw: RawAnalysis = parse_json(&response).map_err(ServiceError::GenerationFailed)?;
        Ok(coerce_analysis(raw))
    }

    /// Adapta el texto a cada canal. Una sub-petición fallida devuelve el texto original.
    pub async fn variations(
        &self,
        content: &str,
        platforms: &[String],
    ) -> BTreeMap<String, String> {
        let unique: BTreeSet<&str> = platforms.iter().map(String::as_str).collect();
        let tasks = unique.into_iter().map(|platform| async move {
            let completion = CompletionRequest::text(
                prompts::build_variation_prompt(content, platform),
                0.7,
                300,
            );
            let adapted = match self.llm.complete(completion).await {
                Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
                Ok(_) => {
                    warn!("Variación vacía para {}; se usa el texto original.", platform);
                    content.to_string()
                }
                Err(e) => {
                    warn!("Fallo al generar la variación para {}: {:#}", platform, e);
                    content.to_string()
                }
            };
            (platform.to_string(), adapted)
        });

        join_all(tasks).await.into_iter().collect()
    }

    /// Genera hashtags para el texto; ante cualquier fallo devuelve el conjunto genérico.
    pub async fn hashtags(
        &self,
        content: &str,
        platform: &str,
        profile: Option<&BusinessProfile>,
    ) -> Vec<String> {
        let completion = CompletionRequest::text(
            prompts::build_hashtag_prompt(content, platform, profile),
            0.6,
            200,
        );
        match self.llm.complete(completion).await {
            Ok(answer) => {
                let tags = parse_hashtag_lines(&answer);
                if tags.is_empty() {
                    warn!("El modelo no devolvió hashtags utilizables; se usan los genéricos.");
                    fallback_hashtags()
                } else {
                    tags
                }
            }
            Err(e) => {
                warn!("Fallo al generar hashtags: {:#}", e);
                fallback_hashtags()
            }
        }
    }
}

fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T> {
    let object = extract_json_object(response)?;
    serde_json::from_str(object).with_context(|| {
        format!("No se pudo interpretar el JSON del modelo. Respuesta LLM: '{response}'")
    })
}

// --- Coerción de campos ---

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Puntuación en [0,100].
fn score(value: Option<&Value>) -> Option<u8> {
    number(value).map(|n| n.clamp(0.0, 100.0).round() as u8)
}

fn count(value: Option<&Value>) -> Option<u32> {
    number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64).round() as u32)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| text(Some(item)))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Limpia una lista de hashtags: sin `#`, sin vacíos ni duplicados, máximo 15.
///
/// Cada elemento (o cada trozo separado por `,` o `#`) es una sola etiqueta:
/// "poke bowl" se convierte en "pokebowl".
pub fn normalize_hashtags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for item in raw {
        for token in item.as_ref().split([',', '#']) {
            let joined: String = strip_list_marker(token)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let tag = joined.trim_matches(|c: char| !c.is_alphanumeric() && c != '_');
            if tag.is_empty() || tag.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if seen.insert(tag.to_lowercase()) {
                tags.push(tag.to_string());
            }
        }
    }
    tags.truncate(MAX_HASHTAGS);
    tags
}

/// Quita numeraciones y viñetas de lista ("3. ", "- ", "* ") al inicio.
fn strip_list_marker(token: &str) -> &str {
    let token = token.trim();
    let without_number = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if without_number.len() < token.len() {
        if let Some(rest) = without_number
            .strip_prefix('.')
            .or_else(|| without_number.strip_prefix(')'))
        {
            return rest.trim_start();
        }
        return token;
    }
    token.trim_start_matches(['-', '*', '•']).trim_start()
}

/// Interpreta la respuesta de texto libre del modelo como lista de hashtags.
pub fn parse_hashtag_lines(answer: &str) -> Vec<String> {
    normalize_hashtags(answer.lines())
}

fn coerce_content(
    raw: RawContent,
    request: &ContentRequest,
    profile: &BusinessProfile,
) -> Result<ContentDraft> {
    let content = text(raw.content.as_ref())
        .ok_or_else(|| anyhow!("La respuesta del modelo no incluye el campo 'content'"))?;
    let title = text(raw.title.as_ref()).unwrap_or_else(|| {
        format!("{} for {}", request.content_type.label(), request.topic.trim())
    });

    let hashtags = request
        .include_hashtags
        .then(|| normalize_hashtags(string_list(raw.hashtags.as_ref())));

    let word_count = count(raw.word_count.as_ref()).unwrap_or_else(|| word_count(&content));

    Ok(ContentDraft {
        business_id: profile.id.to_string(),
        title,
        hashtags,
        word_count,
        estimated_read_time: count(raw.estimated_read_time.as_ref()),
        seo_score: Some(score(raw.seo_score.as_ref()).unwrap_or(DEFAULT_SEO_SCORE)),
        engagement_score: score(raw.engagement_score.as_ref()),
        virality_score: score(raw.virality_score.as_ref()),
        sentiment_score: score(raw.sentiment_score.as_ref()),
        content_type: request.content_type,
        platform: request.platform,
        tone: request.tone,
        target_audience: request.target_audience.clone(),
        call_to_action: request.call_to_action().map(str::to_string),
        status: ContentStatus::Draft,
        content,
    })
}

fn coerce_analysis(raw: RawAnalysis) -> PerformanceScores {
    let fallback = PerformanceScores::fallback();
    let suggestions = string_list(raw.suggestions.as_ref());
    PerformanceScores {
        engagement_prediction: score(raw.engagement_prediction.as_ref())
            .unwrap_or(fallback.engagement_prediction),
        virality_score: score(raw.virality_score.as_ref()).unwrap_or(fallback.virality_score),
        sentiment_score: score(raw.sentiment_score.as_ref()).unwrap_or(fallback.sentiment_score),
        suggestions: if suggestions.is_empty() {
            fallback.suggestions
        } else {
            suggestions
        },
    }
}

/// Confianza en [0,1]. Valores en (1,100] se leen como porcentaje.
fn confidence(value: Option<&Value>) -> f64 {
    match number(value) {
        Some(n) if n > 1.0 && n <= 100.0 => n / 100.0,
        Some(n) => n.clamp(0.0, 1.0),
        None => DEFAULT_CONFIDENCE,
    }
}

fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_insight(
    raw: RawInsight,
    kind: InsightKind,
    insight_type: &str,
    profile: &BusinessProfile,
) -> Result<InsightDraft> {
    let content = text(raw.content.as_ref())
        .ok_or_else(|| anyhow!("La respuesta del modelo no incluye el campo 'content'"))?;
    let priority = text(raw.priority.as_ref())
        .and_then(|p| Priority::parse(&p))
        .unwrap_or_default();
    let insight_type = match insight_type.trim() {
        "" => "general".to_string(),
        other => other.to_string(),
    };

    Ok(InsightDraft {
        business_id: profile.id.to_string(),
        title: text(raw.title.as_ref()).unwrap_or_else(|| kind.default_title().to_string()),
        content,
        category: kind.category(),
        priority,
        actionable: flag(raw.actionable.as_ref()).unwrap_or(true),
        confidence: confidence(raw.confidence.as_ref()),
        metadata: json!({
            "generatedAt": Utc::now().to_rfc3339(),
            "recommendations": string_list(raw.recommendations.as_ref()),
        }),
        applied: false,
        insight_type,
    })
}
