//! Carga y gestión de configuración de la aplicación (servidor, LLM y Neo4j).

use std::env;
use anyhow::{anyhow, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    Xai,
    OpenAI,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "xai" | "grok" => Ok(Self::Xai),
            "openai" => Ok(Self::OpenAI),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }

    /// Variable de entorno de la que se toma la credencial si no hay `LLM_API_KEY`.
    fn api_key_var(&self) -> &'static str {
        match self {
            Self::Xai => "XAI_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Credenciales de Neo4j. Sólo existen si las tres variables están definidas.
#[derive(Clone, Debug)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub static_dir: String,

    pub llm_provider: LlmProvider,
    pub llm_chat_model: String,
    /// Sin credencial el servicio arranca igual; sólo fallan los endpoints de generación.
    pub llm_api_key: Option<String>,

    pub neo4j: Option<Neo4jConfig>,
    pub event_channel_capacity: usize,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_addr = var("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3322".to_string());
        let static_dir = var("STATIC_DIR").unwrap_or_else(|| "frontend".to_string());

        let llm_provider_str = var("LLM_PROVIDER").unwrap_or_else(|| "xai".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;

        let llm_chat_model =
            var("LLM_CHAT_MODEL").unwrap_or_else(|| "grok-2-1212".to_string());
        let llm_api_key = var("LLM_API_KEY").or_else(|| var(llm_provider.api_key_var()));

        let neo4j = match (var("NEO4J_URI"), var("NEO4J_USER"), var("NEO4J_PASSWORD")) {
            (Some(uri), Some(user), Some(password)) => Some(Neo4jConfig { uri, user, password }),
            _ => None,
        };

        let event_channel_capacity = match var("EVENT_CHANNEL_CAPACITY") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("EVENT_CHANNEL_CAPACITY inválido: {raw}"))?,
            None => 100,
        };

        Ok(Self {
            server_addr,
            static_dir,
            llm_provider,
            llm_chat_model,
            llm_api_key,
            neo4j,
            event_channel_capacity,
        })
    }
}
