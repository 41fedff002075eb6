use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ClusterError;
use crate::ring::SLOTS;

/// Cap on buffered, not yet decoded report bytes from one slave.
pub const MAX_REPORT_BYTES: usize = 4 * 1024 * 1024;
pub const STATUS_OK: &str = "ok";

/// Completions per second-of-minute, as a slave reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsForInterval {
    #[serde(rename = "StatsForSecond")]
    pub counts_by_second: BTreeMap<String, i64>,
    #[serde(rename = "Status")]
    pub status: String,
}

impl Default for StatsForInterval {
    fn default() -> Self {
        Self {
            counts_by_second: BTreeMap::new(),
            status: STATUS_OK.to_owned(),
        }
    }
}

impl StatsForInterval {
    pub fn record(&mut self, second: u32) {
        let count = self.counts_by_second.entry(second.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.counts_by_second
            .values()
            .copied()
            .fold(0i64, i64::saturating_add)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts_by_second.is_empty()
    }
}

/// Splits one read from the master into resize deltas.
///
/// Every whitespace-separated token must be a signed decimal integer; a bare
/// `2` with no delimiter is a single command. A read holding only whitespace,
/// such as a trailing newline split from its command, yields no deltas.
///
/// # Errors
///
/// Returns an error for non-UTF-8 input or any token that is not an integer.
pub fn parse_commands(bytes: &[u8]) -> Result<Vec<i64>, ClusterError> {
    let text =
        std::str::from_utf8(bytes).map_err(|source| ClusterError::CommandInvalidUtf8 { source })?;
    text.split_ascii_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|source| ClusterError::InvalidCommand {
                    value: token.to_owned(),
                    source,
                })
        })
        .collect()
}

#[must_use]
pub fn encode_command(delta: i64) -> String {
    format!("{}\n", delta)
}

/// One report as a JSON object followed by a newline.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn encode_report(report: &StatsForInterval) -> Result<Vec<u8>, ClusterError> {
    let mut payload = serde_json::to_vec(report).map_err(|source| ClusterError::Serialize {
        context: "slave report",
        source,
    })?;
    payload.push(b'\n');
    Ok(payload)
}

/// Second-of-minute from a report key.
///
/// # Errors
///
/// Returns an error when the label is not an integer in `0..60`.
pub fn parse_second_label(label: &str) -> Result<u32, ClusterError> {
    let limit = u32::try_from(SLOTS).unwrap_or(60);
    match label.trim().parse::<u32>() {
        Ok(second) if second < limit => Ok(second),
        Ok(_) | Err(_) => Err(ClusterError::InvalidSecond {
            label: label.to_owned(),
        }),
    }
}

/// Incremental decoder for a stream of concatenated report objects.
///
/// Objects may be newline-delimited or back to back; an incomplete tail is
/// kept until more bytes arrive.
#[derive(Debug, Default)]
pub struct ReportDecoder {
    pending: Vec<u8>,
}

impl ReportDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feeds `bytes` and returns every report now complete.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or when the undecoded backlog grows
    /// beyond [`MAX_REPORT_BYTES`].
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<StatsForInterval>, ClusterError> {
        self.pending.extend_from_slice(bytes);

        let mut reports = Vec::new();
        let mut stream =
            serde_json::Deserializer::from_slice(&self.pending).into_iter::<StatsForInterval>();
        let failure = loop {
            match stream.next() {
                Some(Ok(report)) => reports.push(report),
                Some(Err(err)) if err.is_eof() => break None,
                Some(Err(err)) => break Some(err),
                None => break None,
            }
        };
        let consumed = stream.byte_offset();

        if let Some(source) = failure {
            return Err(ClusterError::Deserialize {
                context: "slave report",
                source,
            });
        }
        self.pending.drain(..consumed.min(self.pending.len()));
        if self.pending.len() > MAX_REPORT_BYTES {
            return Err(ClusterError::ReportTooLarge {
                max_bytes: MAX_REPORT_BYTES,
            });
        }
        Ok(reports)
    }
}
