//! Shared test fixtures: in-memory metadata store, scripted transcoder, and
//! an app assembled against a tempdir-backed local storage.

use async_trait::async_trait;
use axum_test::TestServer;
use galleria_api::setup::routes::build_router;
use galleria_api::state::AppState;
use galleria_core::{
    AppError, Config, Dimensions, MediaRecord, RecordUpdate, StorageType,
};
use galleria_db::MediaStore;
use galleria_processing::{TranscodeError, Transcoder};
use galleria_storage::{LocalStorage, StorageRouter};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const TEST_PASSWORD: &str = "gallery-secret";

/// In-memory MediaStore double.
#[derive(Default, Clone)]
pub struct MemoryMediaStore {
    records: Arc<Mutex<Vec<MediaRecord>>>,
}

impl MemoryMediaStore {
    pub fn records(&self) -> Vec<MediaRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.filename == record.filename) {
            return Err(AppError::Internal(format!(
                "Duplicate filename: {}",
                record.filename
            )));
        }
        records.push(record.clone());
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

/// Scripted transcoder double: either yields a fixed frame and dimensions or
/// fails everything.
pub struct FakeTranscoder {
    pub working: bool,
}

pub const FAKE_FRAME: &[u8] = b"\xFF\xD8fake-jpeg-frame";

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn extract_frame(&self, _source: &Path) -> Result<Vec<u8>, TranscodeError> {
        if self.working {
            Ok(FAKE_FRAME.to_vec())
        } else {
            Err(TranscodeError::Undecodable("scripted failure".to_string()))
        }
    }

    async fn probe_dimensions(&self, _source: &Path) -> Result<Dimensions, TranscodeError> {
        if self.working {
            Ok(Dimensions {
                width: 1920,
                height: 1080,
            })
        } else {
            Err(TranscodeError::Undecodable("scripted failure".to_string()))
        }
    }
}

pub fn test_config(upload_dir: &Path, password: Option<&str>) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        database_url: "postgresql://unused/test".to_string(),
        gallery_password: password.map(String::from),
        s3_endpoint: None,
        s3_region: None,
        s3_bucket: None,
        s3_access_key_id: None,
        s3_secret_access_key: None,
        s3_tenant_id: None,
        upload_dir: upload_dir.to_string_lossy().to_string(),
        local_base_url: "/uploads".to_string(),
        max_upload_size_bytes: 1024 * 1024,
        image_allowed_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        image_allowed_content_types: vec!["image/jpeg".into(), "image/png".into()],
        video_allowed_extensions: vec!["mp4".into(), "mov".into()],
        video_allowed_content_types: vec!["video/mp4".into(), "video/quicktime".into()],
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryMediaStore,
    pub upload_dir: std::path::PathBuf,
}

/// Assemble the app against local storage in `root`, an in-memory store, and
/// the given transcoder.
pub async fn test_app_with(
    root: &Path,
    password: Option<&str>,
    transcoder: Arc<dyn Transcoder>,
) -> TestApp {
    let upload_dir = root.join("uploads");
    let config = test_config(&upload_dir, password);

    let local = LocalStorage::new(upload_dir.clone(), "/uploads".to_string())
        .await
        .unwrap();
    let storage = StorageRouter::new(Arc::new(local), None);

    let store = MemoryMediaStore::default();
    let state = Arc::new(AppState::new(
        config,
        Arc::new(store.clone()),
        storage,
        transcoder,
    ));

    let server = TestServer::new(build_router(state)).unwrap();
    TestApp {
        server,
        store,
        upload_dir,
    }
}

pub async fn test_app(root: &Path) -> TestApp {
    test_app_with(
        root,
        Some(TEST_PASSWORD),
        Arc::new(FakeTranscoder { working: true }),
    )
    .await
}

/// Count regular files under the uploads root, recursively.
pub fn stored_file_count(dir: &Path) -> usize {
    fn walk(dir: &Path, count: &mut usize) {
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, count);
                } else {
                    *count += 1;
                }
            }
        }
    }
    let mut count = 0;
    walk(dir, &mut count);
    count
}
