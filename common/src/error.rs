use thiserror::Error;

/// Configuration problems found before any probing begins.
///
/// This is the only error class that aborts a scan outright; everything that
/// happens per host or per metric resolves to default/absent values instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid scan target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("community string must not be empty")]
    EmptyCommunity,

    #[error("community string contains non-printable characters")]
    MalformedCommunity,

    #[error("worker limit must be at least 1")]
    NoWorkers,

    #[error("echo probe count must be at least 1")]
    NoEchoProbes,
}
