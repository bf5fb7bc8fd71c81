use crate::error::{CliError, Result};
use directories::ProjectDirs;
use futures_util::StreamExt;
use odorkit::core::archive::store::ArchiveStore;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const PATH_CONFIG_FILE: &str = "path.conf";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Copy)]
pub enum DataProgress {
    DownloadStarted { total_size: Option<u64> },
    Downloading { downloaded: u64 },
}

/// Owns the local data directory where archives are stored.
#[derive(Debug)]
pub struct DataManager {
    base_path: PathBuf,
}

impl DataManager {
    pub fn new() -> Result<Self> {
        let path = Self::determine_data_path()?;
        debug!("DataManager initialized with path: {:?}", &path);
        Ok(Self { base_path: path })
    }

    pub fn with_custom_path(path: PathBuf) -> Self {
        Self { base_path: path }
    }

    pub fn get_data_path(&self) -> &Path {
        &self.base_path
    }

    pub fn store(&self) -> ArchiveStore {
        ArchiveStore::new(&self.base_path)
    }

    /// Downloads `relative` (`"<archive>/<file>"`) from `remote_url` into the data directory.
    ///
    /// The body is streamed to a `.part` file that replaces the target only once the
    /// download has completed.
    pub async fn fetch_file(
        &self,
        remote_url: &str,
        relative: &str,
        force: bool,
        mut progress_callback: impl FnMut(DataProgress),
    ) -> Result<PathBuf> {
        let target = self.store().resolve(relative)?;
        if target.exists() && !force {
            return Err(CliError::Data(format!(
                "'{}' already exists. Use --force to overwrite.",
                target.display()
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let url = remote_file_url(remote_url, relative);
        info!("Sending request to {}", url);
        let client = reqwest::Client::new();
        let response = client.get(&url).send().await?.error_for_status()?;

        let total_size = response.content_length();
        progress_callback(DataProgress::DownloadStarted { total_size });

        let partial = partial_path(&target);
        let written = stream_to_file(response, &partial, &mut progress_callback).await;
        let downloaded = match written {
            Ok(downloaded) => downloaded,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        info!("Saved {} byte(s) to {:?}", downloaded, &target);
        Ok(target)
    }

    pub fn set_custom_path(path: &Path) -> Result<()> {
        if !path.is_absolute() {
            return Err(CliError::Argument(format!(
                "Data path must be absolute: {}",
                path.display()
            )));
        }
        let path_str = path.to_str().ok_or_else(|| {
            CliError::Argument(format!("Data path is not valid UTF-8: {}", path.display()))
        })?;
        let config_path = Self::get_path_config_file()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, path_str).map_err(CliError::from)
    }

    pub fn reset_path() -> Result<()> {
        if let Ok(config_path) = Self::get_path_config_file() {
            if config_path.exists() {
                fs::remove_file(config_path)?;
            }
        }
        Ok(())
    }

    /// The config file used when `--config` is not given, if one exists.
    pub fn default_config_file() -> Option<PathBuf> {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .filter(|path| path.is_file())
    }

    fn determine_data_path() -> Result<PathBuf> {
        match Self::get_path_config_file() {
            Ok(config_path) if config_path.exists() => {
                let custom_path_str = fs::read_to_string(&config_path)?.trim().to_string();
                if custom_path_str.is_empty() {
                    warn!("Custom path config file is empty, falling back to default path.");
                    Self::get_default_data_path()
                } else {
                    Ok(PathBuf::from(custom_path_str))
                }
            }
            _ => Self::get_default_data_path(),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "odorkit", "odorkit")
    }

    fn get_path_config_file() -> Result<PathBuf> {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join(PATH_CONFIG_FILE))
            .ok_or_else(|| CliError::Data("Could not determine config directory path.".to_string()))
    }

    fn get_default_data_path() -> Result<PathBuf> {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                CliError::Data("Could not determine default data directory path.".to_string())
            })
    }
}

/// `molecules.csv` downloads to `molecules.csv.part`.
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    progress_callback: &mut impl FnMut(DataProgress),
) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        progress_callback(DataProgress::Downloading { downloaded });
    }
    file.flush().await?;
    Ok(downloaded)
}

pub fn remote_file_url(remote_url: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        remote_url.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}
