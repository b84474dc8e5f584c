use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use log::info;
use serde_json::{Map, Value, json};

use crate::{
    db::{
        collection::{JsonCollection, merge_patch},
        settings::SettingsStore,
    },
    error::AppResult,
    models::{Audit, ContentItem, ISSUE_STATUS_FIXED, Issue, Keyword, Link, Site},
};

// Composite storage over every collection of the dashboard
#[derive(Clone)]
pub struct AppStorage {
    pub root: PathBuf,
    pub sites: Arc<JsonCollection<Site>>,
    pub audits: Arc<JsonCollection<Audit>>,
    pub issues: Arc<JsonCollection<Issue>>,
    pub content: Arc<JsonCollection<ContentItem>>,
    pub keywords: Arc<JsonCollection<Keyword>>,
    pub links: Arc<JsonCollection<Link>>,
    pub settings: Arc<SettingsStore>,
}

impl AppStorage {
    /// Opens the collections under `base_path`, creating the directory if
    /// it does not exist yet. Collection files are created on first write.
    pub fn new(base_path: &str) -> anyhow::Result<Self> {
        let root = PathBuf::from(base_path);
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory {}", root.display()))?;

        Ok(Self {
            sites: Arc::new(JsonCollection::open(&root, "sites.json")),
            audits: Arc::new(JsonCollection::open(&root, "audits.json")),
            issues: Arc::new(JsonCollection::open(&root, "issues.json")),
            content: Arc::new(JsonCollection::open(&root, "content.json")),
            keywords: Arc::new(JsonCollection::open(&root, "keywords.json")),
            links: Arc::new(JsonCollection::open(&root, "links.json")),
            settings: Arc::new(SettingsStore::open(&root, "config.json")),
            root,
        })
    }
}

// Operations that touch more than a single record
impl AppStorage {
    /// Stores a new audit and, when it belongs to a known site, rolls that
    /// site's score forward. Locks are taken audits first, then sites.
    pub async fn create_audit(&self, audit: Audit) -> AppResult<Audit> {
        let mut audits = self.audits.lock().await;
        let mut all_audits = audits.load().await;
        all_audits.push(audit.clone());
        audits.save(&all_audits).await?;

        if !audit.site_id.is_empty() {
            let mut sites = self.sites.lock().await;
            let mut all_sites = sites.load().await;
            if let Some(site) = all_sites.iter_mut().find(|s| s.id == audit.site_id) {
                site.record_audit(audit.score, audit.created_at);
                sites.save(&all_sites).await?;
                info!(
                    "Site {} score moved to {} after audit {}",
                    audit.site_id, audit.score, audit.id
                );
            }
        }

        Ok(audit)
    }

    /// Applies a partial update to an issue. Moving an issue into the
    /// `fixed` status stamps `fixedAt`.
    pub async fn update_issue(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> AppResult<Option<Issue>> {
        self.issues
            .update_with(id, |current| {
                let mut patch = patch;
                let becomes_fixed = patch.get("status").and_then(Value::as_str)
                    == Some(ISSUE_STATUS_FIXED)
                    && current.status != ISSUE_STATUS_FIXED;
                if becomes_fixed {
                    patch.insert("fixedAt".to_string(), json!(Utc::now()));
                }
                merge_patch(current, patch)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryReport;
    use serde_json::json;

    fn storage() -> (tempfile::TempDir, AppStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::new(dir.path().to_str().unwrap()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_new_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        AppStorage::new(nested.to_str().unwrap()).unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_create_audit_rolls_site_score() {
        let (_dir, storage) = storage();
        let site = Site {
            id: "site-1".into(),
            current_score: 40,
            ..Default::default()
        };
        storage.sites.insert(site).await.unwrap();

        let mut audit = Audit {
            id: "audit-1".into(),
            site_id: "site-1".into(),
            score: 66,
            created_at: Utc::now(),
            ..Default::default()
        };
        audit.categories.technical = CategoryReport {
            score: 80,
            issues: vec![],
        };
        let stored = storage.create_audit(audit.clone()).await.unwrap();
        assert_eq!(stored, audit);

        let site = storage.sites.get("site-1").await.unwrap();
        assert_eq!(site.previous_score, 40);
        assert_eq!(site.current_score, 66);
        assert_eq!(site.last_audit, Some(audit.created_at));
        assert_eq!(site.score_history.len(), 1);
        assert_eq!(storage.audits.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_audit_for_unknown_site_keeps_sites_untouched() {
        let (_dir, storage) = storage();
        let audit = Audit {
            id: "a".into(),
            site_id: "ghost".into(),
            score: 10,
            ..Default::default()
        };
        storage.create_audit(audit).await.unwrap();
        assert!(storage.sites.list().await.is_empty());
        assert_eq!(storage.audits.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fixing_an_issue_stamps_fixed_at_once() {
        let (_dir, storage) = storage();
        storage
            .issues
            .insert(Issue {
                id: "i1".into(),
                status: "open".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let patch = json!({"status": "fixed"}).as_object().unwrap().clone();
        let fixed = storage.update_issue("i1", patch.clone()).await.unwrap().unwrap();
        let stamp = fixed.fixed_at.expect("fixedAt set");

        let again = storage.update_issue("i1", patch).await.unwrap().unwrap();
        assert_eq!(again.fixed_at, Some(stamp));
    }

    #[tokio::test]
    async fn test_update_issue_unknown_id() {
        let (_dir, storage) = storage();
        let res = storage.update_issue("nope", Map::new()).await.unwrap();
        assert!(res.is_none());
    }
}
