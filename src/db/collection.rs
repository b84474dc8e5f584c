use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    error::{AppError, AppResult},
    models::Record,
};

/// A flat JSON array of records stored in a single file.
///
/// The file is re-read on every operation so hand edits are picked up. All
/// read-modify-write cycles run under the collection's mutex; writes go to a
/// temp file first and are renamed over the old file.
pub struct JsonCollection<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

/// Exclusive access to a collection, for operations spanning several steps
/// or several collections.
///
/// Entries that do not decode as `T` are held back on load and written out
/// again unchanged on save.
pub struct CollectionGuard<'a, T> {
    collection: &'a JsonCollection<T>,
    held_back: Vec<Value>,
    _guard: MutexGuard<'a, ()>,
}

impl<T> JsonCollection<T>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    pub fn open(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn lock(&self) -> CollectionGuard<'_, T> {
        CollectionGuard {
            collection: self,
            held_back: Vec::new(),
            _guard: self.lock.lock().await,
        }
    }

    pub async fn list(&self) -> Vec<T> {
        self.lock().await.load().await
    }

    pub async fn list_where<F>(&self, mut predicate: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut records = self.list().await;
        records.retain(|r| predicate(r));
        records
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.list().await.into_iter().find(|r| r.id() == id)
    }

    pub async fn insert(&self, record: T) -> AppResult<T> {
        let mut guard = self.lock().await;
        let mut records = guard.load().await;
        records.push(record.clone());
        guard.save(&records).await?;
        Ok(record)
    }

    /// Shallow-merges `patch` over the stored record with the given id.
    /// Returns `None` when no record has that id.
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> AppResult<Option<T>> {
        self.update_with(id, |current| merge_patch(current, patch))
            .await
    }

    /// Replaces the record with the given id by whatever `f` builds from it.
    pub async fn update_with<F>(&self, id: &str, f: F) -> AppResult<Option<T>>
    where
        F: FnOnce(&T) -> AppResult<T>,
    {
        let mut guard = self.lock().await;
        let mut records = guard.load().await;
        let Some(slot) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        *slot = f(slot)?;
        let updated = slot.clone();
        guard.save(&records).await?;
        Ok(Some(updated))
    }

    /// Removes every record with the given id and returns how many were
    /// dropped. Unknown ids are not an error.
    pub async fn delete(&self, id: &str) -> AppResult<usize> {
        let mut guard = self.lock().await;
        let mut records = guard.load().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = before - records.len() + guard.discard_held_back(id);
        guard.save(&records).await?;
        Ok(removed)
    }
}

impl<T> CollectionGuard<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads the whole collection. A missing or unreadable file is an empty
    /// collection. Entries that no longer decode are held back in the guard.
    pub async fn load(&mut self) -> Vec<T> {
        self.held_back.clear();
        let path = &self.collection.path;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        let values: Vec<Value> = match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(e) => {
                warn!("Ignoring malformed collection {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match T::deserialize(&value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Keeping undecodable record in {} as is: {}", path.display(), e);
                    self.held_back.push(value);
                }
            }
        }
        records
    }

    /// Writes `records` followed by the entries held back by the last load.
    pub async fn save(&self, records: &[T]) -> AppResult<()> {
        let mut values = Vec::with_capacity(records.len() + self.held_back.len());
        for record in records {
            values.push(serde_json::to_value(record)?);
        }
        values.extend(self.held_back.iter().cloned());
        write_json_atomic(&self.collection.path, &values).await
    }

    /// Drops held-back entries whose `id` matches and returns how many went.
    fn discard_held_back(&mut self, id: &str) -> usize {
        let before = self.held_back.len();
        self.held_back
            .retain(|v| v.get("id").and_then(Value::as_str) != Some(id));
        before - self.held_back.len()
    }
}

/// Serializes `value` as pretty JSON and atomically replaces `path` with it.
pub async fn write_json_atomic<V: Serialize + ?Sized>(path: &Path, value: &V) -> AppResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Overlays the keys of `patch` on the JSON form of `record`, like
/// `{...record, ...patch}`. The id never changes.
pub fn merge_patch<T>(record: &T, mut patch: Map<String, Value>) -> AppResult<T>
where
    T: Serialize + DeserializeOwned,
{
    patch.remove("id");
    let mut merged = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        other => {
            return Err(AppError::serialization(format!(
                "record is not a JSON object: {}",
                other
            )));
        }
    };
    merged.extend(patch);
    serde_json::from_value(Value::Object(merged))
        .map_err(|e| AppError::validation(format!("Invalid field value: {}", e)))
}
