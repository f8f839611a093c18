use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::{
    delay::{DelayWindow, Sleeper},
    io::{self, FileCheck},
    outside::{BackendError, DirectFetcher, GenericDownloader},
    types::{DownloadTarget, RunStatistics},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Direct,
    Fallback,
}

/// Why a video could not be ripped.
///
/// Only the fallback can fail a video: a primary failure always leads to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The fallback reported the video as not found
    NotFound,
    /// The fallback failed for any other reason
    Backend,
    /// The fallback claimed success but wrote nothing
    Missing,
    /// The fallback wrote a malformed file, which was removed
    Malformed,
    /// The fallback wrote a malformed file which could not be removed
    MalformedLeftBehind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOutcome {
    Success(Backend),
    Failed(FailureReason),
}

impl VideoOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Steps of a single video download
#[derive(Debug)]
enum State {
    Start,
    PrimaryFailed,
    Validated(Backend),
    Failed(FailureReason),
}

/// Downloads one video at a time: directly first, then with the fallback downloader
pub struct VideoRipper<'a> {
    direct: &'a dyn DirectFetcher,
    fallback: &'a dyn GenericDownloader,
    delay: DelayWindow,
    sleeper: &'a dyn Sleeper,
    /// Removes a malformed file
    purge: fn(&Path) -> std::io::Result<()>,
}

impl<'a> VideoRipper<'a> {
    pub fn new(
        direct: &'a dyn DirectFetcher,
        fallback: &'a dyn GenericDownloader,
        delay: DelayWindow,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            direct,
            fallback,
            delay,
            sleeper,
            purge: io::purge,
        }
    }

    #[cfg(test)]
    pub fn with_purge(self, purge: fn(&Path) -> std::io::Result<()>) -> Self {
        Self { purge, ..self }
    }

    /// Rip the video to its target path.
    ///
    /// Never fails: every error is logged, counted in `stats` and turned into the outcome.
    /// On success the file is valid and dated with the video creation time.
    pub fn rip(&self, target: &DownloadTarget, stats: &mut RunStatistics) -> VideoOutcome {
        let mut state = State::Start;
        loop {
            debug!("{state:?}");
            state = match state {
                State::Start => self.attempt_primary(target),
                State::PrimaryFailed => self.attempt_fallback(target, stats),
                State::Validated(backend) => {
                    Self::finalize(target);
                    return VideoOutcome::Success(backend);
                }
                State::Failed(reason) => return VideoOutcome::Failed(reason),
            }
        }
    }

    fn attempt_primary(&self, target: &DownloadTarget) -> State {
        let path = &target.file_path;

        let bytes = match self.direct.fetch(&target.source_url) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Video download failed: {err}");
                return State::PrimaryFailed;
            }
        };

        if let Err(err) = io::write_atomic(path, &bytes) {
            warn!("Could not write {}: {err}", path.display());
            return State::PrimaryFailed;
        }

        match io::check_file(path) {
            FileCheck::Valid(size) => {
                info!("Done! ({size} bytes)");
                State::Validated(Backend::Direct)
            }
            FileCheck::Missing => {
                warn!("Verification failed: {} is missing", path.display());
                State::PrimaryFailed
            }
            FileCheck::Undersized(size) => {
                warn!("Verification failed: only {size} bytes");
                if let Err(err) = (self.purge)(path) {
                    error!("Could not delete malformed {}: {err}", path.display());
                }
                State::PrimaryFailed
            }
        }
    }

    fn attempt_fallback(&self, target: &DownloadTarget, stats: &mut RunStatistics) -> State {
        let path = &target.file_path;
        stats.fallback_invocations += 1;

        let pause = self.delay.sample();
        info!(
            "Falling back to the generic downloader in {:.2} seconds",
            pause.as_secs_f64()
        );
        self.sleeper.sleep(pause);

        match self.fallback.download(&target.source_url, path) {
            Ok(()) => {}
            Err(BackendError::NotFound(msg)) => {
                warn!("Error 404 - not found: {msg}");
                stats.fallback_failures += 1;
                return State::Failed(FailureReason::NotFound);
            }
            Err(err) => {
                error!("Fallback download failed: {err}");
                stats.other_errors += 1;
                return State::Failed(FailureReason::Backend);
            }
        }

        match io::check_file(path) {
            FileCheck::Valid(size) => {
                info!("Done with fallback! ({size} bytes)");
                State::Validated(Backend::Fallback)
            }
            FileCheck::Missing => {
                warn!("Fallback reported success but {} is missing", path.display());
                State::Failed(FailureReason::Missing)
            }
            FileCheck::Undersized(size) => match (self.purge)(path) {
                Ok(()) => {
                    warn!("Fallback produced a malformed file ({size} bytes), removed it");
                    State::Failed(FailureReason::Malformed)
                }
                Err(err) => {
                    error!(
                        "Fallback produced a malformed file ({size} bytes) that could not be deleted: {}: {err}",
                        path.display()
                    );
                    stats.other_errors += 1;
                    State::Failed(FailureReason::MalformedLeftBehind)
                }
            },
        }
    }

    /// Date the file with the video creation time. Best-effort.
    fn finalize(target: &DownloadTarget) {
        if let Err(err) = io::set_file_times(&target.file_path, target.creation_timestamp) {
            warn!(
                "Could not set the times of {}: {err}",
                target.file_path.display()
            );
        }
    }
}
