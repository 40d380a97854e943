//! Construcción de prompts a partir de la petición y del perfil de negocio.
//!
//! Todo es puro y determinista: mismo perfil y misma petición producen
//! exactamente el mismo texto.

use serde_json::Value;

use crate::{
    business::BusinessProfile,
    models::{ContentRequest, InsightKind, Platform},
};

/// Mensaje de sistema para la generación de contenido.
pub fn content_system_prompt(profile: &BusinessProfile) -> String {
    format!(
        "You are {role}. You write for {name}. Create authentic, engaging content that drives customer action.",
        role = profile.expert_role,
        name = profile.name,
    )
}

/// Instrucción completa para generar un contenido.
pub fn build_content_prompt(request: &ContentRequest, profile: &BusinessProfile) -> String {
    let target = match request.platform {
        Some(platform) => format!("a {} for {}", request.content_type.label(), platform.as_str()),
        None => format!("a {}", request.content_type.label()),
    };

    let mut prompt = format!(
        "You are creating content for {name}, a {kind} in {location}.\n\n\
         BUSINESS CONTEXT:\n{context}\n\n\
         Create {target} with these specifications:\n\
         - Topic: {topic}\n\
         - Tone: {tone}\n\
         - Target Audience: {audience}\n\
         - Keywords to include: {keywords}\n",
        name = profile.name,
        kind = profile.business_type,
        location = profile.location,
        context = profile.context,
        target = target,
        topic = request.topic.trim(),
        tone = request.tone.as_str(),
        audience = request.target_audience,
        keywords = request.keywords.join(", "),
    );
    if let Some(cta) = request.call_to_action() {
        prompt.push_str(&format!("- Call to Action: {cta}\n"));
    }
    prompt.push_str(&format!(
        "- Maximum length: {} characters\n",
        request.max_length
    ));

    let mut rules = vec![
        format!("Make it authentic and specific to {}", profile.name),
        format!(
            "Reference only real items from the {} menu: {}. Never invent products",
            profile.name,
            profile.menu_items.join(", ")
        ),
        format!(
            "Use the brand's own vocabulary when appropriate: {}",
            profile.vocabulary.join(", ")
        ),
        format!("Highlight these specialties: {}", profile.specialties.join(", ")),
        "Include sensory details and make it engaging and actionable".to_string(),
    ];
    if request.include_hashtags {
        rules.push("Include relevant hashtags in the \"hashtags\" field, without the # symbol".to_string());
    }

    prompt.push_str("\nIMPORTANT REQUIREMENTS:\n");
    for (i, rule) in rules.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
    }

    prompt.push_str("\nRespond with a single JSON object with exactly these fields:\n{\n");
    prompt.push_str("  \"title\": string (engaging title or headline),\n");
    prompt.push_str("  \"content\": string (main content body),\n");
    if request.include_hashtags {
        prompt.push_str("  \"hashtags\": array of strings,\n");
    }
    prompt.push_str(
        "  \"wordCount\": integer,\n  \
         \"estimatedReadTime\": integer minutes or null,\n  \
         \"seoScore\": integer 0-100,\n  \
         \"engagementScore\": integer 0-100,\n  \
         \"viralityScore\": integer 0-100,\n  \
         \"sentimentScore\": integer 0-100\n}",
    );
    prompt
}

/// Mensaje de sistema para los análisis de negocio.
pub fn insight_system_prompt(profile: &BusinessProfile) -> String {
    format!(
        "You are a business analyst specializing in {kind} businesses like {name}. \
         Provide data-driven insights that are specific, actionable, and culturally aware.",
        kind = profile.business_type,
        name = profile.name,
    )
}

/// Instrucción de análisis según la plantilla elegida.
pub fn build_insight_prompt(
    kind: InsightKind,
    profile: &BusinessProfile,
    data: Option<&Value>,
) -> String {
    let summary = profile.market_summary;
    let menu = profile.menu_items.join(", ");
    let task = match kind {
        InsightKind::Trend => format!(
            "Analyze current food/beverage trends for {summary}. Focus on trending ingredients, \
             preparation styles and customer preferences. Provide 3-5 actionable insights about \
             menu items, pricing, or marketing opportunities."
        ),
        InsightKind::Competitor => format!(
            "Analyze the competitive landscape for {summary}. Identify key differentiators, \
             competitor pricing changes, promotions and opportunities."
        ),
        InsightKind::Sentiment => format!(
            "Analyze customer sentiment and feedback for {summary}. Provide insights on customer \
             satisfaction and improvement areas."
        ),
        InsightKind::Pricing => format!(
            "Analyze pricing optimization for {summary}. Current items: {menu}. Consider market \
             positioning, cost margins and customer demand."
        ),
        InsightKind::MenuSuggestion => format!(
            "Suggest new items for {summary} that complement the current offering: {menu}. \
             Leverage seasonal and trending ingredients while staying authentic to the brand."
        ),
        InsightKind::General => {
            format!("Provide business insights for {summary} based on current market conditions.")
        }
    };

    let mut prompt = format!("BUSINESS CONTEXT:\n{}\n\n{task}\n", profile.context);
    if let Some(data) = data.filter(|d| !d.is_null()) {
        prompt.push_str(&format!("\nSupporting data (JSON):\n{data}\n"));
    }
    prompt.push_str(
        "\nRespond with a single JSON object with exactly these fields:\n{\n  \
         \"title\": string,\n  \
         \"content\": string (the full analysis),\n  \
         \"priority\": \"low\" | \"medium\" | \"high\",\n  \
         \"actionable\": boolean,\n  \
         \"confidence\": number between 0 and 1,\n  \
         \"recommendations\": array of strings\n}",
    );
    prompt
}

/// Instrucción para predecir el rendimiento de un texto ya generado.
pub fn build_analysis_prompt(content: &str, platform: &str) -> String {
    format!(
        "Analyze this {platform} content and predict its performance:\n\n\
         Content: \"{content}\"\n\n\
         Respond with a single JSON object with exactly these fields:\n{{\n  \
         \"engagementPrediction\": integer 0-100,\n  \
         \"viralityScore\": integer 0-100,\n  \
         \"sentimentScore\": integer 0-100,\n  \
         \"suggestions\": array of 3 strings\n}}",
    )
}

fn platform_requirements(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => "- Maximum 280 characters",
        Platform::Instagram => "- Visual-focused, emoji-friendly",
        Platform::Facebook => "- Community-focused, conversational",
        Platform::Tiktok => "- Trendy, energetic, youth-oriented",
        Platform::Email => "- Start with a short subject line, then a preview-friendly opening",
        Platform::Website => "- Scannable, SEO-friendly paragraphs",
    }
}

/// Instrucción para adaptar un texto a un canal. Los canales fuera del
/// catálogo no llevan requisitos específicos.
pub fn build_variation_prompt(content: &str, platform: &str) -> String {
    let requirements = Platform::parse(platform)
        .map(|p| format!("Platform-specific requirements:\n{}\n\n", platform_requirements(p)))
        .unwrap_or_default();
    format!(
        "Adapt this content for {platform} while maintaining the core message:\n\n\
         Original content: \"{content}\"\n\n\
         {requirements}\
         Respond with only the adapted content, no additional text."
    )
}

/// Instrucción para generar hashtags, opcionalmente anclada a un negocio.
pub fn build_hashtag_prompt(
    content: &str,
    platform: &str,
    profile: Option<&BusinessProfile>,
) -> String {
    let about = profile
        .map(|p| format!(" about {} ({})", p.name, p.business_type))
        .unwrap_or_default();
    let location = profile.map(|p| p.location).unwrap_or("the business location");
    format!(
        "Generate relevant hashtags for this {platform} content{about}:\n\n\
         Content: \"{content}\"\n\n\
         Requirements:\n\
         - 10-15 hashtags\n\
         - Mix of popular and niche tags\n\
         - Include location-based tags for {location}\n\
         - Include product-specific tags\n\
         - Include some trending tags\n\n\
         Respond with only the hashtags, one per line, without the # symbol."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business;
    use crate::models::Tone;
    use serde_json::json;

    fn fresh_catch_request() -> ContentRequest {
        serde_json::from_value(json!({
            "type": "social_post",
            "platform": "instagram",
            "topic": "Daily Fresh Catch Special",
            "tone": "enthusiastic",
            "targetAudience": "seafood lovers",
            "keywords": ["fresh", "daily", "catch"],
            "includeHashtags": true
        }))
        .unwrap()
    }

    #[test]
    fn content_prompt_carries_request_and_profile() {
        let profile = business::resolve("allii-fish-market").unwrap();
        let req = fresh_catch_request();
        let prompt = build_content_prompt(&req, profile);

        assert!(prompt.contains(profile.context));
        assert!(prompt.contains("a social media post for instagram"));
        assert!(prompt.contains("Topic: Daily Fresh Catch Special"));
        assert!(prompt.contains("Tone: enthusiastic"));
        assert!(prompt.contains("Target Audience: seafood lovers"));
        assert!(prompt.contains("Keywords to include: fresh, daily, catch"));
        assert!(prompt.contains("Maximum length: 280 characters"));
        assert!(prompt.contains("Limu Ahi Poke Bowl"));
        assert!(prompt.contains("ohana"));
        assert!(prompt.contains("\"hashtags\": array of strings"));
        assert!(!prompt.contains("Call to Action"));
    }

    #[test]
    fn content_prompt_is_deterministic_and_business_specific() {
        let fish = business::resolve("allii-fish-market").unwrap();
        let coconut = business::resolve("allii-coconut-water").unwrap();
        let mut req = fresh_catch_request();
        req.include_hashtags = false;
        req.tone = Tone::Professional;
        req.call_to_action = Some("Order online today".into());

        assert_eq!(build_content_prompt(&req, fish), build_content_prompt(&req, fish));

        let coconut_prompt = build_content_prompt(&req, coconut);
        assert!(coconut_prompt.contains("Sparkling Coconut Water"));
        assert!(!coconut_prompt.contains("Limu Ahi"));
        assert!(coconut_prompt.contains("Call to Action: Order online today"));
        assert!(!coconut_prompt.contains("\"hashtags\""));
    }

    #[test]
    fn insight_prompt_selects_template_and_embeds_data() {
        let profile = business::resolve("allii-coconut-water").unwrap();
        let trend = build_insight_prompt(InsightKind::Trend, profile, None);
        assert!(trend.contains("trends"));
        assert!(trend.contains("\"confidence\""));

        let data = json!({ "reviews": ["So refreshing!"] });
        let sentiment = build_insight_prompt(InsightKind::Sentiment, profile, Some(&data));
        assert!(sentiment.contains("customer sentiment"));
        assert!(sentiment.contains("So refreshing!"));

        let general = build_insight_prompt(InsightKind::from_type("unknown"), profile, None);
        assert!(general.contains("based on current market conditions"));
    }

    #[test]
    fn variation_prompt_uses_platform_rules() {
        let prompt = build_variation_prompt("Fresh ahi today", "twitter");
        assert!(prompt.contains("Maximum 280 characters"));
        assert!(prompt.contains("Fresh ahi today"));
    }

    #[test]
    fn variation_prompt_for_unknown_channel_omits_requirements() {
        let prompt = build_variation_prompt("Fresh ahi today", "linkedin");
        assert!(prompt.contains("Adapt this content for linkedin"));
        assert!(!prompt.contains("Platform-specific requirements"));
        assert!(prompt.contains("Respond with only the adapted content"));
    }

    #[test]
    fn hashtag_prompt_without_profile_stays_generic() {
        let prompt = build_hashtag_prompt("Fresh ahi today", "instagram", None);
        assert!(prompt.contains("without the # symbol"));
        assert!(!prompt.contains("Allii"));
    }
}
