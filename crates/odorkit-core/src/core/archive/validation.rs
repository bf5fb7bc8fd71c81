use super::layout::{MAX_INLINE_FILE_BYTES, StandardFile, is_misnamed_behavior_file};
use super::store::{ArchiveError, ArchiveStore, conventional_index};
use crate::core::io::manifest::{MANIFEST_FILE_NAME, Manifest};
use crate::core::io::table;
use crate::core::models::molecule::CID_COLUMN;
use crate::core::models::table::RowKey;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A deviation from the archive layout conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingManifest,
    InvalidManifest { message: String },
    ListedFileMissing { file: String },
    UnlistedFile { file: String },
    WrongIndex { file: String, expected: String, found: String },
    UnreadableTable { file: String, message: String },
    NonStandardName { file: String },
    OversizedFile { file: String, bytes: u64 },
    UnknownMolecule { cid: String },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::MissingManifest
            | Issue::InvalidManifest { .. }
            | Issue::ListedFileMissing { .. }
            | Issue::WrongIndex { .. }
            | Issue::UnreadableTable { .. } => Severity::Error,
            Issue::UnlistedFile { .. }
            | Issue::NonStandardName { .. }
            | Issue::OversizedFile { .. }
            | Issue::UnknownMolecule { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingManifest => write!(f, "missing {MANIFEST_FILE_NAME}"),
            Issue::InvalidManifest { message } => write!(f, "invalid manifest: {message}"),
            Issue::ListedFileMissing { file } => {
                write!(f, "'{file}' is listed in the manifest but does not exist")
            }
            Issue::UnlistedFile { file } => write!(f, "'{file}' is not listed in the manifest"),
            Issue::WrongIndex {
                file,
                expected,
                found,
            } => write!(
                f,
                "'{file}' should be indexed on '{expected}' but its first column is '{found}'"
            ),
            Issue::UnreadableTable { file, message } => write!(f, "'{file}': {message}"),
            Issue::NonStandardName { file } => write!(
                f,
                "'{file}' looks like a behavior file; use 'behavior.csv' or 'behavior_<n>.csv'"
            ),
            Issue::OversizedFile { file, bytes } => write!(
                f,
                "'{file}' is {bytes} bytes; files over {MAX_INLINE_FILE_BYTES} bytes should be stored externally"
            ),
            Issue::UnknownMolecule { cid } => {
                write!(f, "stimuli.csv references CID {cid}, which is not in molecules.csv")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub archive: String,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
    }
}

impl ArchiveStore {
    /// Checks an archive against the layout conventions.
    ///
    /// Only a missing archive directory is an `Err`; everything else is reported as an
    /// [`Issue`] so that one run lists every problem.
    pub fn validate(&self, archive: &str) -> Result<ValidationReport, ArchiveError> {
        let dir = self.archive_dir(archive);
        if !dir.is_dir() {
            return Err(ArchiveError::NotFound(archive.to_string()));
        }
        info!("Validating archive '{}' at {:?}", archive, &dir);

        let mut issues = Vec::new();
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        let manifest = if manifest_path.is_file() {
            match Manifest::from_path(&manifest_path) {
                Ok(m) => Some(m),
                Err(e) => {
                    issues.push(Issue::InvalidManifest {
                        message: e.to_string(),
                    });
                    None
                }
            }
        } else {
            issues.push(Issue::MissingManifest);
            None
        };

        let present = list_files(&dir)?;

        if let Some(manifest) = &manifest {
            for (file, _) in manifest.processed_files() {
                if !dir.join(file).is_file() {
                    issues.push(Issue::ListedFileMissing {
                        file: file.to_string(),
                    });
                }
            }
            for (file, _) in &present {
                if file != MANIFEST_FILE_NAME && !manifest.lists(file) {
                    issues.push(Issue::UnlistedFile { file: file.clone() });
                }
            }
        }

        for (file, bytes) in &present {
            if *bytes > MAX_INLINE_FILE_BYTES {
                issues.push(Issue::OversizedFile {
                    file: file.clone(),
                    bytes: *bytes,
                });
            }
            if is_misnamed_behavior_file(file) {
                issues.push(Issue::NonStandardName { file: file.clone() });
            }
            if let Some(standard) = StandardFile::classify(file) {
                check_standard_table(&dir.join(file), file, standard, &mut issues);
            }
        }

        check_stimuli_molecules(&dir, &mut issues);

        debug!("Archive '{}' validation found {} issue(s).", archive, issues.len());
        Ok(ValidationReport {
            archive: archive.to_string(),
            issues,
        })
    }
}

fn list_files(dir: &Path) -> Result<Vec<(String, u64)>, ArchiveError> {
    let io_error = |source| ArchiveError::Io {
        path: dir.to_string_lossy().to_string(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let metadata = entry.metadata().map_err(io_error)?;
        if metadata.is_file() {
            files.push((
                entry.file_name().to_string_lossy().to_string(),
                metadata.len(),
            ));
        }
    }
    files.sort();
    Ok(files)
}

fn check_standard_table(path: &Path, file: &str, standard: StandardFile, issues: &mut Vec<Issue>) {
    let Some(expected) = standard.index_column() else {
        return;
    };
    let headers = match table::read_headers_from_path(path) {
        Ok(h) => h,
        Err(e) => {
            issues.push(Issue::UnreadableTable {
                file: file.to_string(),
                message: e.to_string(),
            });
            return;
        }
    };
    let found = headers.first().cloned().unwrap_or_default();
    if found != expected {
        issues.push(Issue::WrongIndex {
            file: file.to_string(),
            expected: expected.to_string(),
            found,
        });
        return;
    }

    let loaded = conventional_index(path).and_then(|index| {
        let index: Vec<&str> = index.iter().map(String::as_str).collect();
        Ok(table::read_table_from_path(path, &index)?)
    });
    if let Err(e) = loaded {
        issues.push(Issue::UnreadableTable {
            file: file.to_string(),
            message: e.to_string(),
        });
    }
}

fn check_stimuli_molecules(dir: &Path, issues: &mut Vec<Issue>) {
    let stimuli_path = dir.join(StandardFile::Stimuli.file_name());
    let molecules_path = dir.join(StandardFile::Molecules.file_name());
    if !stimuli_path.is_file() || !molecules_path.is_file() {
        return;
    }
    let (Ok(stimuli), Ok(molecules)) = (
        table::read_table_from_path(&stimuli_path, &["Stimulus"]),
        table::read_table_from_path(&molecules_path, &[CID_COLUMN]),
    ) else {
        return;
    };
    let Some(referenced) = stimuli.column(CID_COLUMN) else {
        return;
    };

    let mut reported = HashSet::new();
    for cid in referenced {
        let cid = cid.trim();
        if cid.is_empty() || !reported.insert(cid.to_string()) {
            continue;
        }
        if !molecules.contains_key(&RowKey::single(cid)) {
            issues.push(Issue::UnknownMolecule {
                cid: cid.to_string(),
            });
        }
    }
}
