use serde::Deserialize;

/// Config file contents; every field mirrors a CLI flag and is optional.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub logfile: Option<String>,
    pub listen: Option<u16>,
    pub control: Option<ControlList>,
    #[serde(alias = "random-fails")]
    pub random_fails: Option<u64>,
    pub workers: Option<usize>,
    #[serde(alias = "delay-ms")]
    pub delay_ms: Option<u64>,
    pub lookback: Option<u64>,
    #[serde(alias = "request-timeout")]
    pub request_timeout_ms: Option<u64>,
    pub duration: Option<u64>,
    #[serde(alias = "no-ui")]
    pub no_ui: Option<bool>,
    pub verbose: Option<bool>,
}

/// Slaves as one comma-separated string or as a list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ControlList {
    Joined(String),
    Entries(Vec<String>),
}
