// Módulos de la aplicación
mod analyzer;
mod api;
mod app_state;
mod business;
mod config;
mod error;
mod generator;
mod llm;
mod models;
mod neo4j_client;
mod notify;
mod prompts;
mod store;

use crate::{
    app_state::AppState,
    generator::ContentGenerator,
    llm::RigCompletionService,
    notify::Notifier,
    store::{ArtifactStore, MemoryStore},
};
use anyhow::Context;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().context("Error al cargar la configuración")?;

    // 3. Almacén: Neo4j si está configurado, memoria en otro caso
    let store: Arc<dyn ArtifactStore> = match &cfg.neo4j {
        Some(neo4j_cfg) => {
            let graph = neo4j_client::connect_from_config(neo4j_cfg)
                .await
                .context("Error conectando a Neo4j")?;
            neo4j_client::ensure_schema(&graph)
                .await
                .context("Error asegurando el esquema de Neo4j")?;
            Arc::new(neo4j_client::Neo4jStore::new(Arc::new(graph)))
        }
        None => {
            warn!("NEO4J_URI/NEO4J_USER/NEO4J_PASSWORD no definidos: los artefactos se guardan sólo en memoria.");
            Arc::new(MemoryStore::new())
        }
    };

    // 4. Servicio de IA
    let generator = match RigCompletionService::from_config(&cfg) {
        Some(service) => {
            info!(
                "Servicio de IA: {:?} con el modelo {}",
                cfg.llm_provider, cfg.llm_chat_model
            );
            Some(ContentGenerator::new(Arc::new(service)))
        }
        None => {
            warn!("Sin credencial del proveedor LLM: generación e insights responderán 503.");
            None
        }
    };

    // 5. Crear estado compartido de la aplicación
    let app_state = AppState {
        notifier: Notifier::new(cfg.event_channel_capacity),
        config: cfg.clone(),
        store,
        generator,
    };

    // 6. Configurar el router de la API y el servicio de ficheros estáticos
    let app = api::create_router(app_state)
        .fallback_service(ServeDir::new(&cfg.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 7. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&cfg.server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", cfg.server_addr))?;
    info!("🚀 Servidor escuchando en http://{}", cfg.server_addr);

    // Apagado ordenado con Ctrl+C.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
