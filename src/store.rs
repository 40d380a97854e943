//! Almacén de artefactos (contenido generado e insights), siempre
//! particionado por identificador de negocio.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AiInsight, ContentDraft, GeneratedContent, InsightDraft};

/// Operaciones de persistencia. Los listados devuelven lo más reciente primero.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save_content(&self, draft: ContentDraft) -> Result<GeneratedContent>;
    async fn list_content(&self, business_id: &str) -> Result<Vec<GeneratedContent>>;
    async fn get_content(&self, business_id: &str, id: &str) -> Result<Option<GeneratedContent>>;

    async fn save_insight(&self, draft: InsightDraft) -> Result<AiInsight>;
    async fn list_insights(&self, business_id: &str) -> Result<Vec<AiInsight>>;
    async fn get_insight(&self, business_id: &str, id: &str) -> Result<Option<AiInsight>>;

    /// Nombre del backend, para el endpoint de salud.
    fn backend(&self) -> &'static str;
}

/// Identificador y fecha asignados por el servidor al guardar.
pub fn new_identity() -> (String, DateTime<Utc>) {
    (Uuid::new_v4().to_string(), Utc::now())
}

/// Almacén en memoria, en orden de inserción.
#[derive(Default)]
pub struct MemoryStore {
    contents: RwLock<Vec<GeneratedContent>>,
    insights: RwLock<Vec<AiInsight>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("El almacén en memoria quedó inconsistente (lock envenenado)")
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn save_content(&self, draft: ContentDraft) -> Result<GeneratedContent> {
        let (id, created_at) = new_identity();
        let stored = GeneratedContent {
            id,
            draft,
            created_at,
        };
        self.contents.write().map_err(poisoned)?.push(stored.clone());
        Ok(stored)
    }

    async fn list_content(&self, business_id: &str) -> Result<Vec<GeneratedContent>> {
        let contents = self.contents.read().map_err(poisoned)?;
        Ok(contents
            .iter()
            .rev()
            .filter(|c| c.draft.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn get_content(&self, business_id: &str, id: &str) -> Result<Option<GeneratedContent>> {
        let contents = self.contents.read().map_err(poisoned)?;
        Ok(contents
            .iter()
            .find(|c| c.id == id && c.draft.business_id == business_id)
            .cloned())
    }

    async fn save_insight(&self, draft: InsightDraft) -> Result<AiInsight> {
        let (id, created_at) = new_identity();
        let stored = AiInsight {
            id,
            draft,
            created_at,
        };
        self.insights.write().map_err(poisoned)?.push(stored.clone());
        Ok(stored)
    }

    async fn list_insights(&self, business_id: &str) -> Result<Vec<AiInsight>> {
        let insights = self.insights.read().map_err(poisoned)?;
        Ok(insights
            .iter()
            .rev()
            .filter(|i| i.draft.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn get_insight(&self, business_id: &str, id: &str) -> Result<Option<AiInsight>> {
        let insights = self.insights.read().map_err(poisoned)?;
        Ok(insights
            .iter()
            .find(|i| i.id == id && i.draft.business_id == business_id)
            .cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{content_draft, insight_draft};
    use super::*;

    #[tokio::test]
    async fn saved_content_round_trips() {
        let store = MemoryStore::new();
        let draft = content_draft("allii-fish-market", "Fresh Catch");
        let saved = store.save_content(draft.clone()).await.unwrap();
        assert!(!saved.id.is_empty());

        let listed = store.list_content("allii-fish-market").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].draft, draft);
        assert_eq!(listed[0].id, saved.id);
    }

    #[tokio::test]
    async fn lists_are_tenant_scoped_and_newest_first() {
        let store = MemoryStore::new();
        store.save_content(content_draft("allii-fish-market", "first")).await.unwrap();
        store.save_content(content_draft("allii-coconut-water", "other")).await.unwrap();
        store.save_content(content_draft("allii-fish-market", "second")).await.unwrap();

        let titles: Vec<_> = store
            .list_content("allii-fish-market")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.draft.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);

        store.save_insight(insight_draft("allii-coconut-water", "a")).await.unwrap();
        store.save_insight(insight_draft("allii-coconut-water", "b")).await.unwrap();
        let insights = store.list_insights("allii-coconut-water").await.unwrap();
        assert_eq!(insights[0].draft.title, "b");
        assert!(store.list_insights("allii-fish-market").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_does_not_cross_tenants() {
        let store = MemoryStore::new();
        let saved = store
            .save_insight(insight_draft("allii-fish-market", "mine"))
            .await
            .unwrap();
        assert!(store
            .get_insight("allii-fish-market", &saved.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_insight("allii-coconut-water", &saved.id)
            .await
            .unwrap()
            .is_none());
    }
}
