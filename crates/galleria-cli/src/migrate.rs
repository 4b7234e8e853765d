//! Local-to-remote storage migration
//!
//! Operator-invoked batch job, not part of the live request path. Every
//! record still pointing at local storage gets its file (and thumbnail, if
//! any) uploaded to remote storage, verified via `exists()`, and only then
//! has its URLs rewritten. Local files are never deleted here; that is a
//! separate, manual operator action.

use anyhow::{Context, Result};
use chrono::Utc;
use galleria_core::{MediaRecord, StorageType};
use galleria_db::MediaStore;
use galleria_storage::{thumbnail_key, Storage};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Report candidates without writing to storage or the metadata store.
    pub dry_run: bool,
    /// Only check remote existence of already-migrated records.
    pub verify_only: bool,
    /// Directory the pre-migration record snapshot is written to.
    pub backup_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct MigrationFailure {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct MigrationReport {
    /// Records a normal run would process.
    pub candidates: usize,
    /// Files (and thumbnails) uploaded to remote storage.
    pub uploaded: usize,
    /// Records whose remote copy passed the existence check.
    pub verified: usize,
    /// Records skipped because the local file no longer exists.
    pub skipped: usize,
    /// Records whose migration failed; their metadata is untouched.
    pub failed: usize,
    pub failures: Vec<MigrationFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<PathBuf>,
}

enum FileOutcome {
    Migrated,
    SkippedMissing,
}

pub struct Migrator {
    store: Arc<dyn MediaStore>,
    local: Arc<dyn Storage>,
    remote: Arc<dyn Storage>,
}

impl Migrator {
    pub fn new(
        store: Arc<dyn MediaStore>,
        local: Arc<dyn Storage>,
        remote: Arc<dyn Storage>,
    ) -> Self {
        Self {
            store,
            local,
            remote,
        }
    }

    pub async fn run(&self, options: &MigrationOptions) -> Result<MigrationReport> {
        if options.verify_only {
            return self.verify_remote_records().await;
        }

        let candidates = self
            .store
            .list_local()
            .await
            .context("Failed to list local records")?;

        let mut report = MigrationReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        tracing::info!(
            candidates = candidates.len(),
            dry_run = options.dry_run,
            "Starting storage migration"
        );

        if candidates.is_empty() {
            return Ok(report);
        }

        if !options.dry_run {
            report.backup_file = Some(self.backup_records(&options.backup_dir).await?);
        }

        for record in &candidates {
            if options.dry_run {
                // Read-only pass: same candidate set, zero writes anywhere.
                continue;
            }

            match self.migrate_record(record).await {
                Ok(FileOutcome::Migrated) => {
                    report.uploaded += 1;
                    report.verified += 1;
                    tracing::info!(filename = %record.filename, "Record migrated and verified");
                }
                Ok(FileOutcome::SkippedMissing) => {
                    report.skipped += 1;
                    report.failures.push(MigrationFailure {
                        filename: record.filename.clone(),
                        reason: "Local file missing on disk".to_string(),
                    });
                    tracing::warn!(filename = %record.filename, "Local file missing, skipped");
                }
                Err(e) => {
                    // One broken file must not abort the batch.
                    report.failed += 1;
                    report.failures.push(MigrationFailure {
                        filename: record.filename.clone(),
                        reason: e.to_string(),
                    });
                    tracing::error!(
                        filename = %record.filename,
                        error = %e,
                        "Migration failed; record left untouched"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Snapshot all records to a timestamped JSON file before any mutation.
    async fn backup_records(&self, backup_dir: &PathBuf) -> Result<PathBuf> {
        let records = self
            .store
            .list()
            .await
            .context("Failed to snapshot records for backup")?;

        tokio::fs::create_dir_all(backup_dir)
            .await
            .with_context(|| format!("Failed to create backup dir {}", backup_dir.display()))?;

        let path = backup_dir.join(format!(
            "media-records-{}.json",
            Utc::now().format("%Y%m%d-%H%M%S")
        ));
        let json =
            serde_json::to_string_pretty(&records).context("Failed to serialize backup")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write backup {}", path.display()))?;

        tracing::info!(path = %path.display(), records = records.len(), "Backup written");
        Ok(path)
    }

    /// Migrate one record. The record is only rewritten after every uploaded
    /// object passes its existence check; any earlier failure leaves the
    /// record pointing at local storage.
    async fn migrate_record(&self, record: &MediaRecord) -> Result<FileOutcome> {
        if !self.local.exists(&record.filename).await? {
            return Ok(FileOutcome::SkippedMissing);
        }

        let data = self
            .local
            .download(&record.filename)
            .await
            .context("Failed to read local file")?;

        self.remote
            .put(&record.filename, data, &record.content_type)
            .await
            .context("Remote upload failed")?;

        if !self
            .remote
            .exists(&record.filename)
            .await
            .context("Remote existence check failed")?
        {
            anyhow::bail!("Upload not visible in remote storage");
        }

        // Thumbnail follows only after the primary is verified.
        let mut new_thumbnail = None;
        if record.thumbnail.is_some() {
            let thumb_key = thumbnail_key(&record.filename);
            if self.local.exists(&thumb_key).await? {
                let thumb_data = self
                    .local
                    .download(&thumb_key)
                    .await
                    .context("Failed to read local thumbnail")?;

                self.remote
                    .put(&thumb_key, thumb_data, "image/jpeg")
                    .await
                    .context("Remote thumbnail upload failed")?;

                if !self
                    .remote
                    .exists(&thumb_key)
                    .await
                    .context("Remote thumbnail existence check failed")?
                {
                    anyhow::bail!("Thumbnail upload not visible in remote storage");
                }

                new_thumbnail = Some(self.remote.public_url(&thumb_key));
            } else {
                tracing::warn!(
                    filename = %record.filename,
                    "Record has a thumbnail URL but no local thumbnail file; migrating without it"
                );
            }
        }

        let new_url = self.remote.public_url(&record.filename);
        self.store
            .update_storage(
                &record.filename,
                &new_url,
                new_thumbnail.as_deref(),
                StorageType::Remote,
            )
            .await
            .context("Failed to rewrite record storage fields")?;

        Ok(FileOutcome::Migrated)
    }

    /// Verify-only mode: check remote existence of already-migrated records,
    /// without touching local-storage ones.
    async fn verify_remote_records(&self) -> Result<MigrationReport> {
        let records = self.store.list().await.context("Failed to list records")?;

        let mut report = MigrationReport::default();

        for record in records
            .iter()
            .filter(|r| r.storage_type == StorageType::Remote)
        {
            report.candidates += 1;

            let mut ok = self
                .remote
                .exists(&record.filename)
                .await
                .with_context(|| format!("Existence check failed for {}", record.filename))?;

            if ok && record.thumbnail.is_some() {
                ok = self.remote.exists(&thumbnail_key(&record.filename)).await?;
            }

            if ok {
                report.verified += 1;
            } else {
                report.failed += 1;
                report.failures.push(MigrationFailure {
                    filename: record.filename.clone(),
                    reason: "Object missing in remote storage".to_string(),
                });
            }
        }

        Ok(report)
    }
}
