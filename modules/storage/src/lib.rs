// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Storage Modul for the race replay generator
//!
//! Provides the interface and filesystem implementation to persist and load
//! generated race records. Each record is stored as a `.race` JSON file
//! named after its id; sessions known to have no usable data carry an empty
//! `.rejected` marker so they are never probed again.

use async_trait::async_trait;
use common::record::CanonicalRaceRecord;
use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::read_dir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info};

/// Persistence interface for generated race records.
///
/// Ids are the live feed's session keys; records generated from the
/// historical archive use negative synthetic ids to keep the two spaces
/// apart.
#[async_trait]
pub trait RecordStorage {
    async fn save(&self, id: i64, record: &CanonicalRaceRecord) -> io::Result<()>;
    async fn load(&self, id: i64) -> io::Result<CanonicalRaceRecord>;
    /// Ids of all stored records, ascending.
    async fn ids(&self) -> io::Result<Vec<i64>>;
    /// Permanently marks a session as having no usable data.
    async fn mark_rejected(&self, id: i64) -> io::Result<()>;
    async fn is_rejected(&self, id: i64) -> bool;
}

/// A file system–based implementation of [`RecordStorage`].
///
/// ## Important
///
/// `FsRecordStorage` **does not implement any internal synchronization or
/// locking mechanisms**. Therefore, **only one instance should be used per
/// `root_dir` in the application at any time**.
pub struct FsRecordStorage {
    root_dir: PathBuf,
}

impl FsRecordStorage {
    pub fn new(root_dir: &Path) -> Self {
        if let Err(e) = DirBuilder::new().recursive(true).create(root_dir) {
            error!(
                "Failed to create record storage folder {}. Error: {}",
                root_dir.display(),
                e
            );
        }
        info!("Using record storage folder: {}", root_dir.display());
        FsRecordStorage {
            root_dir: root_dir.to_path_buf(),
        }
    }

    fn file_path(&self, id: i64, extension: &str) -> PathBuf {
        let mut file_path = self.root_dir.clone();
        file_path.push(id.to_string());
        file_path.set_extension(extension);
        file_path
    }

    /// Writes the bytes and syncs them to disk before returning.
    async fn save_bytes(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn load_file(&self, path: &Path) -> io::Result<String> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut json = String::default();
        file.read_to_string(&mut json).await?;
        Ok(json)
    }
}

#[async_trait]
impl RecordStorage for FsRecordStorage {
    async fn save(&self, id: i64, record: &CanonicalRaceRecord) -> io::Result<()> {
        let json = CanonicalRaceRecord::to_json(record)?;
        let file_path = self.file_path(id, "race");
        self.save_bytes(&file_path, json.as_bytes()).await?;
        debug!("Stored race record {} in {}", id, file_path.display());
        Ok(())
    }

    async fn load(&self, id: i64) -> io::Result<CanonicalRaceRecord> {
        let file_path = self.file_path(id, "race");
        let json = self.load_file(&file_path).await?;
        let record = CanonicalRaceRecord::from_json(&json)?;
        debug!("Loaded race record {} from {}", id, file_path.display());
        Ok(record)
    }

    async fn ids(&self) -> io::Result<Vec<i64>> {
        let mut dirs = read_dir(&self.root_dir).await?;
        let mut result = vec![];
        while let Some(entry) = dirs.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.file_type().is_file() {
                continue;
            }
            if let Some(ext) = entry.path().extension()
                && ext == "race"
                && let Some(stem) = entry.path().file_stem()
                && let Ok(id) = stem.to_string_lossy().parse::<i64>()
            {
                debug!("Found race record {} in {}", id, self.root_dir.display());
                result.push(id);
            }
        }
        result.sort_unstable();
        Ok(result)
    }

    async fn mark_rejected(&self, id: i64) -> io::Result<()> {
        let file_path = self.file_path(id, "rejected");
        self.save_bytes(&file_path, &[]).await?;
        debug!("Marked session {} as rejected", id);
        Ok(())
    }

    async fn is_rejected(&self, id: i64) -> bool {
        self.file_path(id, "rejected").is_file()
    }
}
