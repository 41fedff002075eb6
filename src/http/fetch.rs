use async_trait::async_trait;
use url::Url;

/// What one GET produced, before success is decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Response { status: u16, bytes: i64 },
    TransportError { message: String },
}

impl FetchOutcome {
    /// A request counts as a success only with status 200.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Response { status: 200, .. })
    }

    /// Body length, `-1` when nothing was read.
    #[must_use]
    pub const fn byte_count(&self) -> i64 {
        match self {
            Self::Response { bytes, .. } => *bytes,
            Self::TransportError { .. } => -1,
        }
    }
}

/// Issues a single GET and reports what came back.
///
/// Implementations never fail: transport problems are part of the outcome.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}
