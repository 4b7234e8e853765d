//! Shared test fixtures: in-memory metadata store and a scripted remote
//! storage whose `exists()` answers can be forced to fail per key.

use async_trait::async_trait;
use chrono::Utc;
use galleria_core::{AppError, MediaKind, MediaRecord, RecordUpdate, StorageType};
use galleria_db::MediaStore;
use galleria_storage::{Storage, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory MediaStore double.
#[derive(Default, Clone)]
pub struct MemoryMediaStore {
    records: Arc<Mutex<Vec<MediaRecord>>>,
}

impl MemoryMediaStore {
    pub fn with_records(records: Vec<MediaRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn records(&self) -> Vec<MediaRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn get(&self, filename: &str) -> Result<Option<MediaRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.filename == filename)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<MediaRecord>, AppError> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(records)
    }

    async fn update_details(
        &self,
        filename: &str,
        update: &RecordUpdate,
    ) -> Result<Option<MediaRecord>, AppError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.filename == filename) {
            Some(record) => {
                update.apply(record);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_storage(
        &self,
        filename: &str,
        url: &str,
        thumbnail: Option<&str>,
        storage_type: StorageType,
    ) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.filename == filename)
            .ok_or_else(|| AppError::NotFound(format!("File not found: {}", filename)))?;
        record.url = url.to_string();
        record.thumbnail = thumbnail.map(String::from);
        record.storage_type = storage_type;
        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.filename != filename);
        Ok(records.len() < before)
    }

    async fn list_local(&self) -> Result<Vec<MediaRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.storage_type == StorageType::Local)
            .cloned()
            .collect())
    }
}

/// Scripted remote storage: objects live in a map; `exists()` can be forced
/// to answer false for chosen keys even after a successful put, simulating an
/// upload that "succeeds" at the transport level but fails verification.
#[derive(Default)]
pub struct MockRemoteStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_exists: Mutex<HashSet<String>>,
    put_count: AtomicUsize,
}

impl MockRemoteStorage {
    pub fn fail_exists_for(&self, key: &str) {
        self.fail_exists.lock().unwrap().insert(key.to_string());
    }

    pub fn preload(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl Storage for MockRemoteStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data);
        Ok(self.public_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        if self.fail_exists.lock().unwrap().contains(key) {
            return Ok(false);
        }
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://remote.example/tenant:media/{}", key)
    }

    async fn presigned_url(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        Ok(format!("{}?sig=test", self.public_url(key)))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Remote
    }
}

/// Build a local record pointing at `/uploads/{filename}`.
pub fn local_record(filename: &str, thumbnail: bool) -> MediaRecord {
    MediaRecord {
        filename: filename.to_string(),
        original_filename: format!("original-{}", filename),
        name: filename.to_string(),
        url: format!("/uploads/{}", filename),
        thumbnail: thumbnail.then(|| {
            format!(
                "/uploads/{}",
                galleria_storage::thumbnail_key(filename)
            )
        }),
        storage_type: StorageType::Local,
        kind: if filename.ends_with(".mp4") {
            MediaKind::Video
        } else {
            MediaKind::Image
        },
        content_type: if filename.ends_with(".mp4") {
            "video/mp4".to_string()
        } else {
            "image/jpeg".to_string()
        },
        file_size: 10,
        dimensions: None,
        date: None,
        location: None,
        tags: vec![],
        photographer: None,
        uploaded_at: Utc::now(),
    }
}
