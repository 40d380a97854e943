//! Modelos de dominio: peticiones de contenido, artefactos persistidos
//! (contenido generado e insights) y puntuaciones de rendimiento.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;

pub const DEFAULT_MAX_LENGTH: u32 = 280;
pub const MAX_LENGTH_RANGE: RangeInclusive<u32> = 20..=5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    SocialPost,
    EmailCampaign,
    BlogPost,
    ProductDescription,
    MenuDescription,
}

impl ContentType {
    /// Nombre legible, usado en prompts y títulos por defecto.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SocialPost => "social media post",
            Self::EmailCampaign => "email campaign",
            Self::BlogPost => "blog post",
            Self::ProductDescription => "product description",
            Self::MenuDescription => "menu description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    Tiktok,
    Email,
    Website,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Tiktok => "tiktok",
            Self::Email => "email",
            Self::Website => "website",
        }
    }

    /// `None` si el nombre no es una de las plataformas conocidas.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "instagram" => Some(Self::Instagram),
            "facebook" => Some(Self::Facebook),
            "twitter" => Some(Self::Twitter),
            "tiktok" => Some(Self::Tiktok),
            "email" => Some(Self::Email),
            "website" => Some(Self::Website),
            _ => None,
        }
    }
}

/// Nombre de canal para las operaciones secundarias: admite plataformas fuera
/// del catálogo. Vacío o ausente equivale a `instagram`.
pub fn channel_name(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        Some(name) => name.to_lowercase(),
        None => Platform::Instagram.as_str().to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Casual,
    Enthusiastic,
    Educational,
    Playful,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Enthusiastic => "enthusiastic",
            Self::Educational => "educational",
            Self::Playful => "playful",
        }
    }
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}

/// Petición de generación de contenido. Nunca se persiste tal cual.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub platform: Option<Platform>,
    // Un `topic` ausente se trata como vacío para responder 400 y no 422.
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub include_hashtags: bool,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

impl ContentRequest {
    /// Única validación previa a la llamada al modelo.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.topic.trim().is_empty() {
            return Err(ServiceError::ValidationFailed(
                "el campo 'topic' es obligatorio".to_string(),
            ));
        }
        if !MAX_LENGTH_RANGE.contains(&self.max_length) {
            return Err(ServiceError::ValidationFailed(format!(
                "'maxLength' debe estar entre {} y {}",
                MAX_LENGTH_RANGE.start(),
                MAX_LENGTH_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Llamada a la acción, ignorando valores en blanco.
    pub fn call_to_action(&self) -> Option<&str> {
        self.call_to_action
            .as_deref()
            .map(str::trim)
            .filter(|cta| !cta.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
}

/// Campos de un contenido generado, antes de que el almacén le asigne id y fecha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    pub business_id: String,
    pub title: String,
    pub content: String,
    pub hashtags: Option<Vec<String>>,
    pub word_count: u32,
    pub estimated_read_time: Option<u32>,
    pub seo_score: Option<u8>,
    pub engagement_score: Option<u8>,
    pub virality_score: Option<u8>,
    pub sentiment_score: Option<u8>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub platform: Option<Platform>,
    pub tone: Tone,
    pub target_audience: String,
    pub call_to_action: Option<String>,
    pub status: ContentStatus,
}

/// Contenido generado y persistido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub id: String,
    #[serde(flatten)]
    pub draft: ContentDraft,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    SocialTrend,
    CompetitorAnalysis,
    Sentiment,
    Pricing,
    MenuSuggestion,
    MarketAnalysis,
}

/// Plantilla de análisis seleccionada a partir del campo `type` de la petición.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Trend,
    Competitor,
    Sentiment,
    Pricing,
    MenuSuggestion,
    General,
}

impl InsightKind {
    /// Los tipos no reconocidos caen en la plantilla genérica.
    pub fn from_type(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "trend-analysis" | "trend" | "social-trend" | "social-trends" => Self::Trend,
            "competitor-analysis" | "competitor" => Self::Competitor,
            "sentiment-analysis" | "sentiment" => Self::Sentiment,
            "pricing" | "pricing-optimization" => Self::Pricing,
            "menu-suggestion" | "menu-suggestions" => Self::MenuSuggestion,
            _ => Self::General,
        }
    }

    pub fn category(&self) -> InsightCategory {
        match self {
            Self::Trend => InsightCategory::SocialTrend,
            Self::Competitor => InsightCategory::CompetitorAnalysis,
            Self::Sentiment => InsightCategory::Sentiment,
            Self::Pricing => InsightCategory::Pricing,
            Self::MenuSuggestion => InsightCategory::MenuSuggestion,
            Self::General => InsightCategory::MarketAnalysis,
        }
    }

    /// Título usado cuando el modelo no devuelve uno.
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Trend => "Trend Analysis Report",
            Self::Competitor => "Competitor Analysis Report",
            Self::Sentiment => "Sentiment Analysis Report",
            Self::Pricing => "Pricing Optimization Report",
            Self::MenuSuggestion => "Menu Suggestion Report",
            Self::General => "Business Insights Report",
        }
    }
}

/// Campos de un insight, antes de que el almacén le asigne id y fecha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightDraft {
    pub business_id: String,
    pub title: String,
    pub content: String,
    /// Valor `type` tal y como llegó en la petición.
    #[serde(rename = "type")]
    pub insight_type: String,
    pub category: InsightCategory,
    pub priority: Priority,
    pub actionable: bool,
    pub confidence: f64,
    pub metadata: Value,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub id: String,
    #[serde(flatten)]
    pub draft: InsightDraft,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceScores {
    pub engagement_prediction: u8,
    pub virality_score: u8,
    pub sentiment_score: u8,
    pub suggestions: Vec<String>,
}

impl PerformanceScores {
    /// Resultado conservador cuando el análisis no está disponible.
    pub fn fallback() -> Self {
        Self {
            engagement_prediction: 50,
            virality_score: 25,
            sentiment_score: 75,
            suggestions: vec![
                "Add more visual elements".to_string(),
                "Include a stronger call-to-action".to_string(),
                "Use trending hashtags".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_request_applies_defaults() {
        let req: ContentRequest = serde_json::from_value(json!({
            "type": "social_post",
            "topic": "Daily Fresh Catch Special"
        }))
        .unwrap();
        assert_eq!(req.content_type, ContentType::SocialPost);
        assert_eq!(req.tone, Tone::Friendly);
        assert_eq!(req.max_length, DEFAULT_MAX_LENGTH);
        assert!(!req.include_hashtags);
        assert!(req.platform.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn whitespace_topic_fails_validation() {
        let req: ContentRequest =
            serde_json::from_value(json!({ "type": "blog_post", "topic": "   " })).unwrap();
        assert!(matches!(req.validate(), Err(ServiceError::ValidationFailed(_))));

        let missing: ContentRequest =
            serde_json::from_value(json!({ "type": "blog_post" })).unwrap();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn max_length_out_of_bounds_fails_validation() {
        let req: ContentRequest = serde_json::from_value(json!({
            "type": "social_post",
            "topic": "Poke",
            "maxLength": 10
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_call_to_action_is_ignored() {
        let req: ContentRequest = serde_json::from_value(json!({
            "type": "social_post",
            "topic": "Poke",
            "callToAction": "  "
        }))
        .unwrap();
        assert_eq!(req.call_to_action(), None);
    }

    #[test]
    fn channel_names_accept_unknown_platforms() {
        assert_eq!(Platform::parse(" TikTok "), Some(Platform::Tiktok));
        assert_eq!(Platform::parse("linkedin"), None);
        assert_eq!(channel_name(Some("LinkedIn ")), "linkedin");
        assert_eq!(channel_name(Some("  ")), "instagram");
        assert_eq!(channel_name(None), "instagram");
    }

    #[test]
    fn insight_type_aliases_and_fallback() {
        assert_eq!(InsightKind::from_type("trend-analysis"), InsightKind::Trend);
        assert_eq!(InsightKind::from_type("Competitor_Analysis"), InsightKind::Competitor);
        assert_eq!(InsightKind::from_type("sentiment"), InsightKind::Sentiment);
        assert_eq!(InsightKind::from_type("menu_suggestions"), InsightKind::MenuSuggestion);
        assert_eq!(InsightKind::from_type("weather-forecast"), InsightKind::General);
        assert_eq!(InsightKind::from_type(""), InsightKind::General);
    }

    #[test]
    fn generated_content_serializes_flat_camel_case() {
        let content = GeneratedContent {
            id: "c-1".into(),
            draft: ContentDraft {
                business_id: "allii-fish-market".into(),
                title: "Fresh Catch".into(),
                content: "Limu Ahi Poke Bowl today".into(),
                hashtags: Some(vec!["poke".into()]),
                word_count: 4,
                estimated_read_time: None,
                seo_score: Some(80),
                engagement_score: None,
                virality_score: None,
                sentiment_score: None,
                content_type: ContentType::SocialPost,
                platform: Some(Platform::Instagram),
                tone: Tone::Enthusiastic,
                target_audience: "seafood lovers".into(),
                call_to_action: None,
                status: ContentStatus::Draft,
            },
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["businessId"], "allii-fish-market");
        assert_eq!(value["type"], "social_post");
        assert_eq!(value["platform"], "instagram");
        assert_eq!(value["status"], "draft");

        let back: GeneratedContent = serde_json::from_value(value).unwrap();
        assert_eq!(back, content);
    }
}
