use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::error::{CliError, Result};
use odorkit::engine::config::LookupConfigBuilder;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Merges built-in defaults, the config file (if any) and `--set` overrides, in increasing
/// order of precedence.
pub fn build_config(config_path: Option<&Path>, set_values: &[String]) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, set_values)?;

    let pubchem = file_config.pubchem.take().unwrap_or_default();
    let archive = file_config.archive.take().unwrap_or_default();

    let lookup = LookupConfigBuilder::new()
        .base_url(pubchem.base_url.unwrap_or(defaults.base_url))
        .batch_size(pubchem.batch_size.unwrap_or(defaults.batch_size))
        .requests_per_second(
            pubchem
                .requests_per_second
                .unwrap_or(defaults.requests_per_second),
        )
        .timeout(Duration::from_secs(
            pubchem.timeout_secs.unwrap_or(defaults.timeout_secs),
        ))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let remote_url = archive
        .remote_url
        .unwrap_or(defaults.remote_url)
        .trim_end_matches('/')
        .to_string();

    debug!(?lookup, %remote_url, "Configuration resolved.");
    Ok(AppConfig { lookup, remote_url })
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", expected, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "pubchem.base-url" => {
                config
                    .pubchem
                    .get_or_insert_with(Default::default)
                    .base_url = Some(value_str.trim().to_string());
            }
            "pubchem.batch-size" => {
                config
                    .pubchem
                    .get_or_insert_with(Default::default)
                    .batch_size = Some(parse_value(key, value_str, "integer")?);
            }
            "pubchem.requests-per-second" => {
                config
                    .pubchem
                    .get_or_insert_with(Default::default)
                    .requests_per_second = Some(parse_value(key, value_str, "float")?);
            }
            "pubchem.timeout-secs" => {
                config
                    .pubchem
                    .get_or_insert_with(Default::default)
                    .timeout_secs = Some(parse_value(key, value_str, "integer")?);
            }
            "archive.remote-url" => {
                config
                    .archive
                    .get_or_insert_with(Default::default)
                    .remote_url = Some(value_str.trim().to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odorkit::engine::config::LookupConfig;
    use std::fs;
    use tempfile::tempdir;

    fn set(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_apply_without_file_or_overrides() {
        let app = build_config(None, &[]).expect("build ok");
        assert_eq!(app.lookup, LookupConfig::default());
        assert_eq!(app.remote_url, DefaultsConfig::default().remote_url);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(
            &cfg_path,
            r#"
            [pubchem]
            base-url = "http://localhost:8080/rest/pug/"
            batch-size = 25
            timeout-secs = 5

            [archive]
            remote-url = "https://example.org/archives/"
            "#,
        )
        .unwrap();

        let app = build_config(Some(cfg_path.as_path()), &[]).expect("build ok");
        assert_eq!(app.lookup.base_url, "http://localhost:8080/rest/pug");
        assert_eq!(app.lookup.batch_size, 25);
        assert_eq!(app.lookup.timeout, Duration::from_secs(5));
        assert_eq!(
            app.lookup.requests_per_second,
            DefaultsConfig::default().requests_per_second
        );
        assert_eq!(app.remote_url, "https://example.org/archives");
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(&cfg_path, "[pubchem]\nbatch-size = 25\n").unwrap();

        let app = build_config(
            Some(cfg_path.as_path()),
            &set(&[
                "pubchem.batch-size=10",
                "pubchem.requests-per-second=1.5",
                "archive.remote-url=https://mirror.example.org",
            ]),
        )
        .expect("build ok");

        assert_eq!(app.lookup.batch_size, 10);
        assert!((app.lookup.requests_per_second - 1.5).abs() < 1e-12);
        assert_eq!(app.remote_url, "https://mirror.example.org");
    }

    #[test]
    fn invalid_overrides_are_config_errors() {
        for bad in [
            "pubchem.batch-size",
            "pubchem.batch-size=many",
            "pubchem.batch-size=0",
            "pubchem.requests-per-second=-1",
            "pubchem.requests-per-second=1e-30",
            "optimization.num-solutions=3",
        ] {
            let result = build_config(None, &set(&[bad]));
            assert!(matches!(result, Err(CliError::Config(_))), "{bad} should fail");
        }
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = build_config(Some(dir.path().join("absent.toml").as_path()), &[]);
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
