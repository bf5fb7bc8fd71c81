use super::layout::StandardFile;
use crate::core::io::manifest::{MANIFEST_FILE_NAME, Manifest, ManifestError};
use crate::core::io::table::{self, TableIoError};
use crate::core::models::ids::Cid;
use crate::core::models::table::{RowKey, Table};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Archive '{0}' not found")]
    NotFound(String),

    #[error("Invalid archive path '{0}'. Expected '<archive>/<file>' with no '..' components.")]
    InvalidPath(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Table(#[from] TableIoError),
}

/// A local directory holding one sub-directory per curated archive.
///
/// Paths handed to the store are always relative, in the form `"<archive>/<file>"`
/// (e.g. `"burton_2022/molecules.csv"`).
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf,
}

impl ArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_dir(&self, archive: &str) -> PathBuf {
        self.root.join(archive)
    }

    /// Maps `"<archive>/<file>"` to a path under the root, rejecting escapes from it.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ArchiveError> {
        let rel = Path::new(relative);
        let normal_parts = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !normal_parts || rel.components().count() < 2 {
            return Err(ArchiveError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(rel))
    }

    /// Names of all archives under the root that carry a manifest, sorted.
    pub fn list_archives(&self) -> Result<Vec<String>, ArchiveError> {
        let entries = fs::read_dir(&self.root).map_err(|e| self.io_error(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(&self.root, e))?;
            let path = entry.path();
            if path.is_dir() && path.join(MANIFEST_FILE_NAME).is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        debug!("Found {} archive(s) under {:?}", names.len(), &self.root);
        Ok(names)
    }

    pub fn load_manifest(&self, archive: &str) -> Result<Manifest, ArchiveError> {
        let dir = self.archive_dir(archive);
        if !dir.is_dir() {
            return Err(ArchiveError::NotFound(archive.to_string()));
        }
        Ok(Manifest::from_path(&dir.join(MANIFEST_FILE_NAME))?)
    }

    /// Processed files of an archive with their manifest descriptions.
    pub fn show_files(&self, archive: &str) -> Result<Vec<(String, String)>, ArchiveError> {
        let manifest = self.load_manifest(archive)?;
        Ok(manifest
            .processed_files()
            .map(|(name, desc)| (name.to_string(), desc.to_string()))
            .collect())
    }

    /// Loads a table using the index convention of its standard file name.
    ///
    /// Behavior files are keyed by `(Stimulus, Subject)` when both columns are present.
    /// Non-standard files, and standard files missing their conventional index column,
    /// are indexed on their first column.
    pub fn load_table(&self, relative: &str) -> Result<Table, ArchiveError> {
        let path = self.resolve(relative)?;
        let index = conventional_index(&path)?;
        let index: Vec<&str> = index.iter().map(String::as_str).collect();
        Ok(table::read_table_from_path(&path, &index)?)
    }

    pub fn load_table_with_index(
        &self,
        relative: &str,
        index_columns: &[&str],
    ) -> Result<Table, ArchiveError> {
        let path = self.resolve(relative)?;
        Ok(table::read_table_from_path(&path, index_columns)?)
    }

    /// Loads a CID-indexed table keeping only the rows for `cids`.
    pub fn load_table_for(&self, relative: &str, cids: &[Cid]) -> Result<Table, ArchiveError> {
        let table = self.load_table(relative)?;
        let keys: Vec<RowKey> = cids.iter().map(|&cid| RowKey::from(cid)).collect();
        Ok(table.select(keys.iter()))
    }

    pub fn save_table(&self, table: &Table, relative: &str) -> Result<PathBuf, ArchiveError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }
        table::write_table_to_path(&path, table)?;
        info!("Saved {} row(s) to {:?}", table.len(), &path);
        Ok(path)
    }

    /// Lists `file` under `[processed]` in the archive's manifest, creating the manifest
    /// when the archive has none yet. An existing description is replaced.
    pub fn register_processed(
        &self,
        archive: &str,
        file: &str,
        description: &str,
    ) -> Result<PathBuf, ArchiveError> {
        let path = self.resolve(&format!("{archive}/{MANIFEST_FILE_NAME}"))?;
        let mut manifest = if path.is_file() {
            Manifest::from_path(&path)?
        } else {
            Manifest::default()
        };
        manifest
            .processed
            .insert(file.to_string(), description.to_string());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }
        manifest.write_to_path(&path)?;
        debug!("Registered '{}' in {:?}", file, &path);
        Ok(path)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> ArchiveError {
        ArchiveError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

pub(crate) fn conventional_index(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let standard = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(StandardFile::classify);
    let Some(expected) = standard.and_then(|s| s.index_column()) else {
        return Ok(Vec::new());
    };

    let headers = table::read_headers_from_path(path)?;
    let has = |name: &str| headers.iter().any(|h| h == name);
    if !has(expected) {
        return Ok(Vec::new());
    }
    if standard.is_some_and(|s| s.is_long_format()) && has("Subject") {
        return Ok(vec![expected.to_string(), "Subject".to_string()]);
    }
    Ok(vec![expected.to_string()])
}
