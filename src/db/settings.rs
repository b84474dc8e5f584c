use std::{io::ErrorKind, path::{Path, PathBuf}};

use log::warn;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{db::collection::write_json_atomic, error::AppResult};

/// Free-form dashboard settings kept as a single JSON object
/// (API keys of third-party tools, preferred CMS, and so on).
pub struct SettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SettingsStore {
    pub fn open(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
            lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Map<String, Value> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Overlays `patch` on the stored settings and returns the result.
    pub async fn merge(&self, patch: Map<String, Value>) -> AppResult<Map<String, Value>> {
        let _guard = self.lock.lock().await;
        let mut settings = self.read().await;
        settings.extend(patch);
        write_json_atomic(&self.path, &settings).await?;
        Ok(settings)
    }

    async fn read(&self) -> Map<String, Value> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to read {}: {}", self.path.display(), e);
                }
                return Map::new();
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Ignoring malformed settings file {}", self.path.display());
                Map::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_merge_is_shallow_and_persistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path(), "config.json");
        assert!(store.load().await.is_empty());

        let first = json!({"semrushKey": "abc", "ahrefsKey": "def"});
        store.merge(first.as_object().unwrap().clone()).await.unwrap();

        let second = json!({"ahrefsKey": ""});
        let merged = store.merge(second.as_object().unwrap().clone()).await.unwrap();
        assert_eq!(Value::Object(merged), json!({"semrushKey": "abc", "ahrefsKey": ""}));

        let reopened = SettingsStore::open(dir.path(), "config.json");
        assert_eq!(reopened.load().await.get("semrushKey"), Some(&json!("abc")));
    }

    #[tokio::test]
    async fn test_non_object_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "[1,2]").unwrap();
        let store = SettingsStore::open(dir.path(), "config.json");
        assert!(store.load().await.is_empty());
    }
}
