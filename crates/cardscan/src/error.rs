use crate::config::ConfigError;
use crate::io::FrameIoError;
use cardscan_fingerprint::FingerprintError;

/// Errors produced while setting up or running a scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("reference database is empty; nothing to match against")]
    EmptyDatabase,

    #[error("frame capture failed after {attempts} attempt(s): {source}")]
    Capture {
        attempts: u32,
        #[source]
        source: FrameIoError,
    },

    #[error("cannot display frame: {0}")]
    Display(#[source] FrameIoError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
