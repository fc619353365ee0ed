//! Error types for inkframe

use thiserror::Error;

/// Result type alias for inkframe operations
pub type Result<T> = std::result::Result<T, Error>;

/// inkframe error type
#[derive(Error, Debug)]
pub enum Error {
    // Resource errors
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    // Negotiation errors
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Filter not configured: {0}")]
    NotConfigured(String),

    // Option errors
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Frame errors
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    // Pipeline errors
    #[error("Pipeline already running")]
    PipelineAlreadyRunning,

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error was raised while configuring a filter or link
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat(_)
                | Error::InvalidGeometry(_)
                | Error::NotConfigured(_)
                | Error::UnknownFilter(_)
                | Error::InvalidOption(_)
                | Error::Config(_)
                | Error::ConfigParse(_)
        )
    }

    /// Check if this is an allocation failure
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Error::OutOfMemory(_))
    }
}

/// Allocate a zeroed byte buffer, reporting exhaustion instead of aborting
pub(crate) fn try_alloc(len: usize, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory(format!("could not allocate {} bytes for {}", len, what)))?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(Error::OutOfMemory("tone".into()).is_resource_exhaustion());
        assert!(!Error::OutOfMemory("tone".into()).is_config_error());
        assert!(Error::UnsupportedFormat("nv12".into()).is_config_error());
        assert!(Error::InvalidGeometry("odd".into()).is_config_error());
    }

    #[test]
    fn test_try_alloc_zeroed() {
        let buf = try_alloc(64, "test").unwrap();
        assert_eq!(buf.len(), 64);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_try_alloc_overflow_is_oom() {
        let err = try_alloc(usize::MAX, "huge").unwrap_err();
        assert!(err.is_resource_exhaustion());
    }
}
