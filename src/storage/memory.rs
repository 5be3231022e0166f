// src/storage/memory.rs

use std::collections::HashSet;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    models::attachment::MediaKind,
    storage::{ObjectStore, StorageError, StoredObject, UploadFile},
};

/// In-process object store for tests and local runs.
///
/// Every upload gets an image-shaped delivery URL, like an `auto` upload
/// endpoint that does not report a resource type.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    base_url: String,
    counter: AtomicUsize,
    fail_uploads_after: Mutex<Option<usize>>,
    fail_deletes: AtomicBool,
    keyless: Mutex<HashSet<String>>,
    uploads: Mutex<Vec<(String, String)>>,
    deletes: Mutex<Vec<(String, MediaKind)>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            base_url: "https://cdn.example.test/demo".to_string(),
            ..Default::default()
        }
    }

    /// Lets the first `n` uploads succeed, then rejects every later one.
    pub fn fail_uploads_after(&self, n: usize) {
        *lock(&self.fail_uploads_after) = Some(n);
    }

    /// Uploads of `file_name` come back without a storage key.
    pub fn without_storage_key(&self, file_name: &str) {
        lock(&self.keyless).insert(file_name.to_string());
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// `(storage_key, file_name)` of every accepted upload, in order.
    pub fn uploads(&self) -> Vec<(String, String)> {
        lock(&self.uploads).clone()
    }

    /// `(storage_key, kind)` of every delete attempt, in order.
    pub fn deletes(&self) -> Vec<(String, MediaKind)> {
        lock(&self.deletes).clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject, StorageError> {
        let accepted = lock(&self.uploads).len();
        if let Some(limit) = *lock(&self.fail_uploads_after) {
            if accepted >= limit {
                return Err(StorageError::Rejected {
                    status: 503,
                    message: format!("upload of {} refused", file.file_name),
                });
            }
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let storage_key = format!("feeds/obj-{}", n);
        let url = format!("{}/image/upload/{}-{}", self.base_url, storage_key, file.file_name);

        lock(&self.uploads).push((storage_key.clone(), file.file_name.clone()));

        let keyless = lock(&self.keyless).contains(&file.file_name);

        Ok(StoredObject {
            url,
            storage_key: (!keyless).then_some(storage_key),
            resource_kind: None,
        })
    }

    async fn delete(&self, storage_key: &str, kind: MediaKind) -> Result<(), StorageError> {
        lock(&self.deletes).push((storage_key.to_string(), kind));

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Transport("connection reset".to_string()));
        }
        Ok(())
    }
}

// Poisoning is ignored: the guarded collections are only ever added to.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
