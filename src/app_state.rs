use std::sync::Arc;

use crate::{
    config::AppConfig, error::ServiceError, generator::ContentGenerator, notify::Notifier,
    store::ArtifactStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ArtifactStore>,
    /// `None` si no hay credencial del proveedor LLM.
    pub generator: Option<ContentGenerator>,
    pub notifier: Notifier,
}

impl AppState {
    /// Generador para los endpoints estrictos; sin credencial responden 503.
    pub fn require_generator(&self) -> Result<&ContentGenerator, ServiceError> {
        self.generator.as_ref().ok_or(ServiceError::LlmUnavailable)
    }
}
