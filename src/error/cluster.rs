use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection error to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Read error from {addr}: {source}")]
    Read {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Write error to {addr}: {source}")]
    Write {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection closed.")]
    ConnectionClosed,
    #[error("Invalid resize command '{value}': {source}")]
    InvalidCommand {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Resize command was not valid UTF-8: {source}")]
    CommandInvalidUtf8 {
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("Invalid second label '{label}' in slave report.")]
    InvalidSecond { label: String },
    #[error("Report exceeded max size ({max_bytes} bytes).")]
    ReportTooLarge { max_bytes: usize },
    #[error("Serialization error during {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Deserialization error during {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Command channel closed.")]
    CommandChannelClosed,
    #[error("Completion channel closed.")]
    CompletionChannelClosed,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
