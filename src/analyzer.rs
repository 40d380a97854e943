//! Operaciones secundarias (puntuación, variaciones, hashtags) que nunca
//! fallan hacia el llamante, aunque el servicio de IA no esté configurado
//! o no responda.

use std::collections::BTreeMap;

use tracing::warn;

use crate::{
    business::BusinessProfile,
    generator::{fallback_hashtags, ContentGenerator},
    models::PerformanceScores,
};

/// Puntúa un texto; ante cualquier fallo devuelve `PerformanceScores::fallback()`.
pub async fn score(
    generator: Option<&ContentGenerator>,
    content: &str,
    platform: &str,
) -> PerformanceScores {
    let Some(generator) = generator else {
        warn!("Análisis solicitado sin servicio de IA configurado; se devuelven valores por defecto.");
        return PerformanceScores::fallback();
    };
    match generator.analyze(content, platform).await {
        Ok(scores) => scores,
        Err(e) => {
            warn!("Fallo en el análisis de contenido: {}", e);
            PerformanceScores::fallback()
        }
    }
}

/// Variaciones por canal; sin servicio de IA todas son el texto original.
pub async fn variations(
    generator: Option<&ContentGenerator>,
    content: &str,
    platforms: &[String],
) -> BTreeMap<String, String> {
    match generator {
        Some(generator) => generator.variations(content, platforms).await,
        None => platforms
            .iter()
            .map(|p| (p.clone(), content.to_string()))
            .collect(),
    }
}

pub async fn hashtags(
    generator: Option<&ContentGenerator>,
    content: &str,
    platform: &str,
    profile: Option<&BusinessProfile>,
) -> Vec<String> {
    match generator {
        Some(generator) => generator.hashtags(content, platform, profile).await,
        None => fallback_hashtags(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedCompletion;
    use std::sync::Arc;

    #[tokio::test]
    async fn unreachable_service_yields_fallback_scores() {
        let generator = ContentGenerator::new(Arc::new(ScriptedCompletion::failing()));
        let scores = score(Some(&generator), "Fresh ahi", "instagram").await;
        assert_eq!(scores, PerformanceScores::fallback());
        assert_eq!(scores.engagement_prediction, 50);
        assert_eq!(scores.virality_score, 25);
        assert_eq!(scores.sentiment_score, 75);
        assert_eq!(scores.suggestions.len(), 3);
    }

    #[tokio::test]
    async fn unparsable_analysis_yields_fallback_scores() {
        let generator = ContentGenerator::new(Arc::new(ScriptedCompletion::always("great post!")));
        let scores = score(Some(&generator), "Fresh ahi", "twitter").await;
        assert_eq!(scores, PerformanceScores::fallback());
    }

    #[tokio::test]
    async fn successful_analysis_is_returned() {
        let generator = ContentGenerator::new(Arc::new(ScriptedCompletion::always(
            r#"{"engagementPrediction": 80, "viralityScore": 40, "sentimentScore": 90, "suggestions": ["Post at lunch", "Add a photo", "Tag Honolulu"]}"#,
        )));
        let scores = score(Some(&generator), "Fresh ahi", "instagram").await;
        assert_eq!(scores.engagement_prediction, 80);
        assert_eq!(scores.suggestions[2], "Tag Honolulu");
    }

    #[tokio::test]
    async fn without_generator_everything_degrades() {
        assert_eq!(
            score(None, "x", "email").await,
            PerformanceScores::fallback()
        );

        let map = variations(None, "Aloha", &["facebook".to_string(), "linkedin".to_string()]).await;
        assert_eq!(map["facebook"], "Aloha");
        assert_eq!(map["linkedin"], "Aloha");

        assert_eq!(
            hashtags(None, "Aloha", "instagram", None).await,
            fallback_hashtags()
        );
    }
}
