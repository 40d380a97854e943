//! Almacén de artefactos sobre Neo4j.
//!
//! Cada artefacto es un nodo (:GeneratedContent o :AiInsight) con `id`,
//! `business_id`, `created_at` y el resto de campos serializados en `payload`.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use neo4rs::{query, Graph, Row};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use url::Url;

use crate::{
    config::Neo4jConfig,
    models::{AiInsight, ContentDraft, GeneratedContent, InsightDraft},
    store::{new_identity, ArtifactStore},
};

const CONTENT_LABEL: &str = "GeneratedContent";
const INSIGHT_LABEL: &str = "AiInsight";

pub async fn connect_from_config(cfg: &Neo4jConfig) -> Result<Graph> {
    let url = Url::parse(&cfg.uri)?;
    let host = url.host_str().unwrap_or("localhost");
    let port = url.port().unwrap_or(7687);
    let addr = format!("{host}:{port}");

    info!("Conectando a Neo4j en {addr}...");
    let graph = Graph::new(&addr, &cfg.user, &cfg.password).await?;
    info!("Conexión a Neo4j OK");
    Ok(graph)
}

/// Crea constraints e índices para los artefactos.
pub async fn ensure_schema(graph: &Graph) -> Result<()> {
    let statements = [
        "CREATE CONSTRAINT generated_content_id IF NOT EXISTS
         FOR (c:GeneratedContent)
         REQUIRE c.id IS UNIQUE",
        "CREATE CONSTRAINT ai_insight_id IF NOT EXISTS
         FOR (i:AiInsight)
         REQUIRE i.id IS UNIQUE",
        "CREATE INDEX generated_content_business IF NOT EXISTS
         FOR (c:GeneratedContent)
         ON (c.business_id)",
        "CREATE INDEX ai_insight_business IF NOT EXISTS
         FOR (i:AiInsight)
         ON (i.business_id)",
    ];

    for stmt in statements {
        graph.run(query(stmt)).await?;
    }

    info!("Esquema de Neo4j asegurado (constraints e índices de artefactos).");
    Ok(())
}

/// Marca temporal de ancho fijo: el orden lexicográfico coincide con el temporal.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Fecha inválida en Neo4j: {raw}"))?
        .with_timezone(&Utc))
}

/// Fila de Neo4j ya decodificada: id, fecha y el borrador deserializado.
fn decode_row<D: DeserializeOwned>(row: &Row) -> Result<(String, DateTime<Utc>, D)> {
    let id: String = row
        .get("id")
        .ok_or_else(|| anyhow!("Falta campo 'id' en resultado de Neo4j"))?;
    let created_at: String = row
        .get("created_at")
        .ok_or_else(|| anyhow!("Falta campo 'created_at' en resultado de Neo4j"))?;
    let payload: String = row
        .get("payload")
        .ok_or_else(|| anyhow!("Falta campo 'payload' en resultado de Neo4j"))?;
    let draft = serde_json::from_str(&payload)
        .with_context(|| format!("Payload inválido en el artefacto {id}"))?;
    Ok((id, parse_timestamp(&created_at)?, draft))
}

pub struct Neo4jStore {
    graph: Arc<Graph>,
}

impl Neo4jStore {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    async fn create<D: Serialize>(
        &self,
        label: &str,
        business_id: &str,
        draft: &D,
    ) -> Result<(String, DateTime<Utc>)> {
        let (id, created_at) = new_identity();
        let cypher = format!(
            "CREATE (a:{label} {{id: $id, business_id: $business_id, created_at: $created_at, payload: $payload}})"
        );
        self.graph
            .run(
                query(&cypher)
                    .param("id", id.clone())
                    .param("business_id", business_id.to_string())
                    .param("created_at", format_timestamp(&created_at))
                    .param("payload", serde_json::to_string(draft)?),
            )
            .await?;
        Ok((id, created_at))
    }

    async fn fetch<D: DeserializeOwned>(
        &self,
        label: &str,
        business_id: &str,
        id: Option<&str>,
    ) -> Result<Vec<(String, DateTime<Utc>, D)>> {
        let filter = if id.is_some() { " AND a.id = $id" } else { "" };
        let cypher = format!(
            "MATCH (a:{label}) WHERE a.business_id = $business_id{filter}
             RETURN a.id AS id, a.created_at AS created_at, a.payload AS payload
             ORDER BY a.created_at DESC"
        );
        let mut q = query(&cypher).param("business_id", business_id.to_string());
        if let Some(id) = id {
            q = q.param("id", id.to_string());
        }

        let mut cursor = self.graph.execute(q).await?;
        let mut output = Vec::new();
        while let Some(row) = cursor.next().await? {
            output.push(decode_row(&row)?);
        }
        Ok(output)
    }
}

#[async_trait]
impl ArtifactStore for Neo4jStore {
    async fn save_content(&self, draft: ContentDraft) -> Result<GeneratedContent> {
        let (id, created_at) = self
            .create(CONTENT_LABEL, &draft.business_id, &draft)
            .await?;
        Ok(GeneratedContent {
            id,
            draft,
            created_at,
        })
    }

    async fn list_content(&self, business_id: &str) -> Result<Vec<GeneratedContent>> {
        let rows = self.fetch(CONTENT_LABEL, business_id, None).await?;
        Ok(rows
            .into_iter()
            .map(|(id, created_at, draft)| GeneratedContent {
                id,
                draft,
                created_at,
            })
            .collect())
    }

    async fn get_content(&self, business_id: &str, id: &str) -> Result<Option<GeneratedContent>> {
        let rows = self.fetch(CONTENT_LABEL, business_id, Some(id)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|(id, created_at, draft)| GeneratedContent {
                id,
                draft,
                created_at,
            }))
    }

    async fn save_insight(&self, draft: InsightDraft) -> Result<AiInsight> {
        let (id, created_at) = self
            .create(INSIGHT_LABEL, &draft.business_id, &draft)
            .await?;
        Ok(AiInsight {
            id,
            draft,
            created_at,
        })
    }

    async fn list_insights(&self, business_id: &str) -> Result<Vec<AiInsight>> {
        let rows = self.fetch(INSIGHT_LABEL, business_id, None).await?;
        Ok(rows
            .into_iter()
            .map(|(id, created_at, draft)| AiInsight {
                id,
                draft,
                created_at,
            })
            .collect())
    }

    async fn get_insight(&self, business_id: &str, id: &str) -> Result<Option<AiInsight>> {
        let rows = self.fetch(INSIGHT_LABEL, business_id, Some(id)).await?;
        Ok(rows.into_iter().next().map(|(id, created_at, draft)| AiInsight {
            id,
            draft,
            created_at,
        }))
    }

    fn backend(&self) -> &'static str {
        "neo4j"
    }
}
