//! Abstracción sobre Rig para llamar al servicio de completado (xAI/Grok u OpenAI).
//!
//! El resto del servicio sólo conoce el trait `CompletionService`; la
//! credencial se inyecta al construir el cliente, nunca se lee de un global.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rig::completion::Prompt;
use serde_json::json;

use crate::config::{AppConfig, LlmProvider};

/// Una petición al modelo: mensajes de sistema y usuario más los parámetros de muestreo.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    /// Pide al proveedor un único objeto JSON como salida.
    pub json_mode: bool,
    pub temperature: f64,
    pub max_tokens: u64,
}

impl CompletionRequest {
    pub fn text(prompt: String, temperature: f64, max_tokens: u64) -> Self {
        Self {
            system: None,
            prompt,
            json_mode: false,
            temperature,
            max_tokens,
        }
    }

    pub fn json(prompt: String, temperature: f64, max_tokens: u64) -> Self {
        Self {
            json_mode: true,
            ..Self::text(prompt, temperature, max_tokens)
        }
    }

    pub fn with_system(mut self, system: String) -> Self {
        self.system = Some(system);
        self
    }
}

/// Servicio externo de completado. Cada llamada es independiente (sin memoria).
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Implementación real basada en Rig.
#[derive(Debug, Clone)]
pub struct RigCompletionService {
    provider: LlmProvider,
    chat_model: String,
    api_key: String,
}

impl RigCompletionService {
    pub fn new(provider: LlmProvider, chat_model: String, api_key: String) -> Self {
        Self {
            provider,
            chat_model,
            api_key,
        }
    }

    /// Devuelve `None` si no hay credencial configurada.
    pub fn from_config(cfg: &AppConfig) -> Option<Self> {
        let api_key = cfg.llm_api_key.clone()?;
        Some(Self::new(
            cfg.llm_provider.clone(),
            cfg.llm_chat_model.clone(),
            api_key,
        ))
    }

    fn additional_params(request: &CompletionRequest) -> Option<serde_json::Value> {
        request
            .json_mode
            .then(|| json!({ "response_format": { "type": "json_object" } }))
    }

    async fn complete_with_xai(&self, request: &CompletionRequest) -> Result<String> {
        use rig::client::CompletionClient as _;
        use rig::providers::xai;

        let client = xai::Client::new(&self.api_key);
        let mut builder = client
            .agent(&self.chat_model)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);
        if let Some(system) = &request.system {
            builder = builder.preamble(system);
        }
        if let Some(params) = Self::additional_params(request) {
            builder = builder.additional_params(params);
        }
        let agent = builder.build();

        let answer = agent.prompt(request.prompt.as_str()).await?;
        Ok(answer)
    }

    async fn complete_with_openai(&self, request: &CompletionRequest) -> Result<String> {
        use rig::client::CompletionClient as _;
        use rig::providers::openai;

        let client = openai::Client::new(&self.api_key);
        let mut builder = client
            .agent(&self.chat_model)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);
        if let Some(system) = &request.system {
            builder = builder.preamble(system);
        }
        if let Some(params) = Self::additional_params(request) {
            builder = builder.additional_params(params);
        }
        let agent = builder.build();

        let answer = agent.prompt(request.prompt.as_str()).await?;
        Ok(answer)
    }
}

#[async_trait]
impl CompletionService for RigCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        match self.provider {
            LlmProvider::Xai => self.complete_with_xai(&request).await,
            LlmProvider::OpenAI => self.complete_with_openai(&request).await,
        }
    }
}

/// Limpia la respuesta del LLM para quedarse sólo con el objeto JSON.
///
/// Aunque se pida modo JSON, algunos modelos envuelven la salida en
/// bloques ```json o añaden texto alrededor.
pub fn extract_json_object(response: &str) -> Result<&str> {
    let trimmed = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = trimmed
        .find('{')
        .ok_or_else(|| anyhow!("La respuesta del modelo no contiene un objeto JSON"))?;
    let end = trimmed
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| anyhow!("La respuesta del modelo contiene un objeto JSON incompleto"))?;
    Ok(&trimmed[start..=end])
}
