pub(crate) const DEFAULT_USER_AGENT: &str = concat!("webload/", env!("CARGO_PKG_VERSION"));

/// Config filenames picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["webload.toml", "webload.json"];

pub(super) const DEFAULT_REQUESTS: &str = "100";
pub(super) const DEFAULT_CONCURRENCY: &str = "10";
pub(super) const DEFAULT_TIMEOUT: &str = "30s";
