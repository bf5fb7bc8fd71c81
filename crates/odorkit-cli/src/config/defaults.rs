use odorkit::engine::config::{
    DEFAULT_BASE_URL, DEFAULT_BATCH_SIZE, DEFAULT_REQUESTS_PER_SECOND, DEFAULT_TIMEOUT,
};

pub const DEFAULT_REMOTE_URL: &str = "https://raw.githubusercontent.com/pyrfume/pyrfume-data/main";

pub struct DefaultsConfig {
    pub base_url: String,
    pub batch_size: usize,
    pub requests_per_second: f64,
    pub timeout_secs: u64,
    pub remote_url: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
        }
    }
}
