pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadpool/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_LOG_FILE: &str = "./loadtest.log";
pub(crate) const DEFAULT_DELAY_MS: u64 = 10;
pub(crate) const DEFAULT_LOOKBACK_SECS: u8 = 5;
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["loadpool.toml", "loadpool.json"];
