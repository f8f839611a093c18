use miette::Diagnostic;
use thiserror::Error;

/// The ways a download backend can fail.
///
/// Closed on purpose: the ripper decides its next step from the variant alone.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BackendError {
    /// The direct fetch path broke: network, protocol or unexpected payload
    #[error("Direct fetch failed: {0}")]
    Api(String),

    /// The backend reported the video as missing, private or removed
    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}
