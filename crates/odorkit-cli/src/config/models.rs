use odorkit::engine::config::LookupConfig;

/// Settings resolved from defaults, the config file and `--set` overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub lookup: LookupConfig,
    pub remote_url: String, // base URL of the remote archive repository
}
