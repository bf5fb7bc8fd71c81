use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const MANIFEST_FILE_NAME: &str = "manifest.toml";

/// File name → description, as listed under one manifest section.
pub type FileSection = BTreeMap<String, String>;

/// Citation and credit for the original data source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>, // authors, tags, notes, ...
}

/// The machine-readable `manifest.toml` describing one archive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub source: Source,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub raw: FileSection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parsed: FileSection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub processed: FileSection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub code: FileSection,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ManifestError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ManifestError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn processed_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.processed
            .iter()
            .map(|(name, desc)| (name.as_str(), desc.as_str()))
    }

    pub fn raw_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.raw
            .iter()
            .map(|(name, desc)| (name.as_str(), desc.as_str()))
    }

    /// Looks a file up in every section, processed files first.
    pub fn describe(&self, file: &str) -> Option<&str> {
        [&self.processed, &self.parsed, &self.raw, &self.code]
            .into_iter()
            .find_map(|section| section.get(file))
            .map(String::as_str)
    }

    pub fn lists(&self, file: &str) -> bool {
        self.describe(file).is_some()
    }
}

impl FromStr for Manifest {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
