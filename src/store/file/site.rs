//! JSON-backed site snapshot store.
//!
//! One file holds the whole site: content types, taxonomies, terms and
//! items. The snapshot is loaded at startup, mutated in memory behind a
//! lock, and written back atomically after every mutation.
//!
//! Term counts are a cached value: deleting items does NOT touch them.
//! Only `refresh_counts` recomputes counts from the items actually
//! present, which is exactly why the term cleanup forces a refresh before
//! trusting any count.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use crate::store::{
    ContentStore, ContentType, ItemQuery, StorageError, StorageResult, TaxonomyRef, Term, TermStore,
};

// ============================================================================
// Snapshot Model
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawContentType {
    id: String,
    label: String,
    /// Taxonomy identifiers usable with this type.
    #[serde(default)]
    taxonomies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTaxonomy {
    id: String,
    label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Item {
    id: u64,
    content_type: String,
    title: String,
    #[serde(default)]
    terms: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SiteData {
    #[serde(default)]
    types: Vec<RawContentType>,
    #[serde(default)]
    taxonomies: Vec<RawTaxonomy>,
    #[serde(default)]
    terms: Vec<Term>,
    #[serde(default)]
    items: Vec<Item>,
}

impl SiteData {
    fn resolve_type(&self, raw: &RawContentType) -> ContentType {
        let taxonomies = raw
            .taxonomies
            .iter()
            .filter_map(|tax_id| {
                self.taxonomies
                    .iter()
                    .find(|t| &t.id == tax_id)
                    .map(|t| TaxonomyRef {
                        id: t.id.clone(),
                        label: t.label.clone(),
                    })
            })
            .collect();
        ContentType {
            id: raw.id.clone(),
            label: raw.label.clone(),
            taxonomies,
        }
    }

    fn count_for_term(&self, term_id: u64) -> u64 {
        self.items
            .iter()
            .filter(|item| item.terms.contains(&term_id))
            .count() as u64
    }
}

// ============================================================================
// FileSiteStore
// ============================================================================

/// Site snapshot store serving both the content and the term interfaces.
pub struct FileSiteStore {
    path: PathBuf,
    data: RwLock<SiteData>,
}

impl FileSiteStore {
    /// Load the snapshot at `path`. A missing file yields an empty site.
    pub async fn load(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StorageError::file_deserialization(&path, e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "site snapshot not found, starting empty");
                SiteData::default()
            }
            Err(e) => return Err(StorageError::file_io(&path, e)),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    #[cfg(test)]
    fn from_parts(path: impl Into<PathBuf>, json: serde_json::Value) -> Self {
        Self {
            path: path.into(),
            data: RwLock::new(serde_json::from_value(json).expect("valid site fixture")),
        }
    }

    /// Write the snapshot atomically: serialize to a sibling temp file,
    /// then rename over the target.
    async fn persist(&self, data: &SiteData) -> StorageResult<()> {
        let contents = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::file_io(parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|e| StorageError::file_io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FileSiteStore {
    async fn list_types(&self) -> StorageResult<Vec<ContentType>> {
        let data = self.data.read().await;
        let mut types: Vec<ContentType> = data
            .types
            .iter()
            .map(|raw| data.resolve_type(raw))
            .filter(|t| !t.taxonomies.is_empty())
            .collect();
        types.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(types)
    }

    async fn get_type(&self, id: &str) -> StorageResult<Option<ContentType>> {
        let data = self.data.read().await;
        Ok(data
            .types
            .iter()
            .find(|raw| raw.id == id)
            .map(|raw| data.resolve_type(raw)))
    }

    async fn taxonomy_exists(&self, id: &str) -> StorageResult<bool> {
        let data = self.data.read().await;
        Ok(data.taxonomies.iter().any(|t| t.id == id))
    }

    async fn find_ids(&self, query: &ItemQuery) -> StorageResult<Vec<u64>> {
        let data = self.data.read().await;
        let mut ids: Vec<u64> = data
            .items
            .iter()
            .filter(|item| item.content_type == query.content_type)
            .filter(|item| match &query.term_ids {
                Some(terms) => item.terms.iter().any(|t| terms.contains(t)),
                None => true,
            })
            .map(|item| item.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn title(&self, id: u64) -> StorageResult<Option<String>> {
        let data = self.data.read().await;
        Ok(data
            .items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.title.clone()))
    }

    async fn delete_item(&self, id: u64) -> StorageResult<bool> {
        let mut data = self.data.write().await;
        let before = data.items.len();
        data.items.retain(|item| item.id != id);
        if data.items.len() == before {
            return Ok(false);
        }
        self.persist(&data).await?;
        Ok(true)
    }
}

#[async_trait]
impl TermStore for FileSiteStore {
    async fn list_terms(&self, taxonomy: &str) -> StorageResult<Vec<Term>> {
        let data = self.data.read().await;
        let mut terms: Vec<Term> = data
            .terms
            .iter()
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(terms)
    }

    async fn get_term(&self, id: u64, taxonomy: &str) -> StorageResult<Option<Term>> {
        let data = self.data.read().await;
        Ok(data
            .terms
            .iter()
            .find(|t| t.id == id && t.taxonomy == taxonomy)
            .cloned())
    }

    async fn refresh_counts(&self, ids: &[u64], taxonomy: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        for term_id in ids {
            let count = data.count_for_term(*term_id);
            if let Some(term) = data
                .terms
                .iter_mut()
                .find(|t| t.id == *term_id && t.taxonomy == taxonomy)
            {
                term.count = count;
            }
        }
        self.persist(&data).await
    }

    async fn delete_term(&self, id: u64, taxonomy: &str) -> StorageResult<bool> {
        let mut data = self.data.write().await;
        let before = data.terms.len();
        data.terms.retain(|t| !(t.id == id && t.taxonomy == taxonomy));
        if data.terms.len() == before {
            return Ok(false);
        }
        self.persist(&data).await?;
        Ok(true)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn fixture() -> serde_json::Value {
        json!({
            "types": [
                {"id": "article", "label": "Articles", "taxonomies": ["category"]},
                {"id": "attachment", "label": "Attachments", "taxonomies": []}
            ],
            "taxonomies": [
                {"id": "category", "label": "Categories"}
            ],
            "terms": [
                {"id": 5, "taxonomy": "category", "name": "News Archive", "slug": "news-archive", "count": 2},
                {"id": 9, "taxonomy": "category", "name": "Archived", "slug": "archived", "count": 1}
            ],
            "items": [
                {"id": 102, "content_type": "article", "title": "Second", "terms": [5]},
                {"id": 101, "content_type": "article", "title": "First", "terms": [5, 9]}
            ]
        })
    }

    fn store(dir: &Path) -> FileSiteStore {
        FileSiteStore::from_parts(dir.join("site.json"), fixture())
    }

    #[tokio::test]
    async fn load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSiteStore::load(dir.path().join("absent.json")).await.unwrap();
        assert!(store.list_types().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_types_skips_taxonomy_less_types() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let types = store.list_types().await.unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].id, "article");
        assert_eq!(types[0].taxonomies[0].label, "Categories");
    }

    #[tokio::test]
    async fn find_ids_sorted_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let query = ItemQuery {
            content_type: "article".to_string(),
            taxonomy: "category".to_string(),
            term_ids: None,
        };
        assert_eq!(store.find_ids(&query).await.unwrap(), vec![101, 102]);

        let restricted = ItemQuery {
            term_ids: Some(vec![9]),
            ..query
        };
        assert_eq!(store.find_ids(&restricted).await.unwrap(), vec![101]);
    }

    #[tokio::test]
    async fn delete_item_leaves_counts_stale_until_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(store.delete_item(101).await.unwrap());
        assert!(store.delete_item(102).await.unwrap());
        assert!(!store.delete_item(102).await.unwrap());

        // Counts still reflect the snapshot values.
        assert_eq!(store.get_term(5, "category").await.unwrap().unwrap().count, 2);

        store.refresh_counts(&[5, 9], "category").await.unwrap();
        assert_eq!(store.get_term(5, "category").await.unwrap().unwrap().count, 0);
        assert_eq!(store.get_term(9, "category").await.unwrap().unwrap().count, 0);
    }

    #[tokio::test]
    async fn delete_term_removes_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(store.delete_term(5, "category").await.unwrap());
        assert!(store.get_term(5, "category").await.unwrap().is_none());
        assert!(!store.delete_term(5, "category").await.unwrap());
    }

    #[tokio::test]
    async fn mutations_persist_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.delete_item(101).await.unwrap();
        drop(store);

        let reloaded = FileSiteStore::load(dir.path().join("site.json")).await.unwrap();
        let query = ItemQuery {
            content_type: "article".to_string(),
            taxonomy: "category".to_string(),
            term_ids: None,
        };
        assert_eq!(reloaded.find_ids(&query).await.unwrap(), vec![102]);
    }
}
