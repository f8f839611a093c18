/// Counters accumulated over one run.
///
/// Owned by the batch and lent mutably to the ripper for each video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Number of times the fallback downloader was invoked
    pub fallback_invocations: u32,

    /// Number of fallback downloads reporting the video as not found
    pub fallback_failures: u32,

    /// Any other failure: backend errors, malformed files left behind, bad targets
    pub other_errors: u32,
}
