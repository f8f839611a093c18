use std::path::Path;

use tracing::{error, info, warn};

use crate::{
    already_processed::AlreadyDownloaded,
    filename::FilenameCodec,
    io,
    result::Result,
    ripper::VideoRipper,
    types::{DownloadTarget, RunStatistics, VideoRecord},
};

/// What happened to every video of a run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// URLs of the videos downloaded during this run
    pub successes: Vec<String>,
    /// URLs of the videos that could not be downloaded
    pub failures: Vec<String>,
    /// Ids of the videos already on disk
    pub skipped: Vec<String>,
    pub stats: RunStatistics,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len() + self.skipped.len()
    }

    pub fn log_summary(&self) {
        for url in &self.failures {
            warn!("Failed: {url}");
        }

        info!("All {} videos processed", self.total());
        info!("Successes: {}", self.successes.len());
        info!("Failures: {}", self.failures.len());
        info!("Skipped: {}", self.skipped.len());
        info!("Fallback counter: {}", self.stats.fallback_invocations);
        info!("Error 404 counter: {}", self.stats.fallback_failures);
        info!("Other errors counter: {}", self.stats.other_errors);
    }
}

/// Rips a list of videos into one directory, one after the other
pub struct Batch<'a> {
    ripper: VideoRipper<'a>,
    codec: &'a FilenameCodec,
    out_dir: &'a Path,
    skip_existing: bool,
}

impl<'a> Batch<'a> {
    pub fn new(
        ripper: VideoRipper<'a>,
        codec: &'a FilenameCodec,
        out_dir: &'a Path,
        skip_existing: bool,
    ) -> Self {
        Self {
            ripper,
            codec,
            out_dir,
            skip_existing,
        }
    }

    /// Process the videos in the given order.
    ///
    /// Only setting up the output directory can fail, before anything is downloaded.
    pub fn run(&self, videos: &[VideoRecord]) -> Result<BatchReport> {
        io::ensure_dir(self.out_dir)?;

        let already = if self.skip_existing {
            let already = AlreadyDownloaded::scan(self.out_dir, self.codec)?;
            info!("{} videos already downloaded", already.len());
            already
        } else {
            AlreadyDownloaded::default()
        };

        let mut report = BatchReport::default();
        let total = videos.len();

        for (index, video) in videos.iter().enumerate() {
            info!("Downloading video: {} / {total}", index + 1);

            if already.contains(&video.id) {
                info!("Video {} already exists, skipping", video.id);
                report.skipped.push(video.id.clone());
                continue;
            }

            let target = match DownloadTarget::new(video, self.out_dir, self.codec) {
                Ok(target) => target,
                Err(err) => {
                    error!("Could not name video {}: {err}", video.id);
                    report.stats.other_errors += 1;
                    report.failures.push(video.url());
                    continue;
                }
            };
            info!("{}", target.file_path.display());

            let outcome = self.ripper.rip(&target, &mut report.stats);
            if outcome.is_success() {
                report.successes.push(target.source_url);
            } else {
                warn!("Video download failed: {outcome:?}");
                report.failures.push(target.source_url);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        delay::DelayWindow,
        outside::BackendError,
        result::Error,
        testing::{video, FakeDirect, FakeFallback, FallbackReply, RecordingSleeper},
        types::Zone,
    };

    struct Fixture {
        _dir: TempDir,
        out_dir: PathBuf,
        codec: FilenameCodec,
        sleeper: RecordingSleeper,
    }

    impl Fixture {
        fn new() -> Self {
            Self::in_zone(Zone::Utc)
        }

        fn in_zone(zone: Zone) -> Self {
            let dir = TempDir::new().unwrap();
            let out_dir = dir.path().join("_rips").join("someone");
            Self {
                _dir: dir,
                out_dir,
                codec: FilenameCodec::new(zone),
                sleeper: RecordingSleeper::default(),
            }
        }

        fn run(
            &self,
            direct: &FakeDirect,
            fallback: &FakeFallback,
            skip_existing: bool,
            videos: &[VideoRecord],
        ) -> Result<BatchReport> {
            let delay = DelayWindow::from_secs(1.0, 3.0).unwrap();
            let ripper = VideoRipper::new(direct, fallback, delay, &self.sleeper);
            Batch::new(ripper, &self.codec, &self.out_dir, skip_existing).run(videos)
        }
    }

    #[test]
    fn test_primary_then_fallback_scenario() {
        let fx = Fixture::new();
        let videos = [video("1", 1_600_000_000), video("2", 1_600_000_100)];
        let (url1, url2) = (videos[0].url(), videos[1].url());

        let direct = FakeDirect::default()
            .reply(&url1, Ok(1500))
            .reply(&url2, Err(BackendError::Api("blocked".to_string())));
        let fallback = FakeFallback::default().reply(&url2, FallbackReply::Writes(2000));

        let report = fx.run(&direct, &fallback, true, &videos).unwrap();

        assert_eq!(report.successes, vec![url1, url2.clone()]);
        assert!(report.failures.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(report.stats.fallback_invocations, 1);
        assert_eq!(*fallback.calls.borrow(), vec![url2]);

        let first = fx.out_dir.join("2020-09-13T12_26_40_1.mp4");
        let second = fx.out_dir.join("2020-09-13T12_28_20_2.mp4");
        assert_eq!(std::fs::metadata(first).unwrap().len(), 1500);
        assert_eq!(std::fs::metadata(second).unwrap().len(), 2000);
    }

    #[test]
    fn test_existing_video_is_skipped_without_network() {
        let fx = Fixture::new();
        std::fs::create_dir_all(&fx.out_dir).unwrap();
        std::fs::write(fx.out_dir.join("2020-09-13T12_26_40_123.mp4"), vec![0u8; 2048]).unwrap();

        let direct = FakeDirect::default();
        let fallback = FakeFallback::default();
        let report = fx
            .run(&direct, &fallback, true, &[video("123", 1_600_000_000)])
            .unwrap();

        assert_eq!(report.skipped, vec!["123".to_string()]);
        assert!(report.successes.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(direct.call_count(), 0);
        assert_eq!(fallback.call_count(), 0);
    }

    #[test]
    fn test_malformed_leftover_is_downloaded_again() {
        let fx = Fixture::new();
        std::fs::create_dir_all(&fx.out_dir).unwrap();
        let path = fx.out_dir.join("2020-09-13T12_26_40_123.mp4");
        std::fs::write(&path, vec![0u8; 10]).unwrap();

        let videos = [video("123", 1_600_000_000)];
        let direct = FakeDirect::default().reply(&videos[0].url(), Ok(3000));
        let report = fx
            .run(&direct, &FakeFallback::default(), true, &videos)
            .unwrap();

        assert_eq!(report.successes, vec![videos[0].url()]);
        assert_eq!(std::fs::metadata(path).unwrap().len(), 3000);
    }

    #[test]
    fn test_second_run_downloads_nothing() {
        let fx = Fixture::new();
        let videos = [video("1", 1_600_000_000), video("2", 1_600_000_100)];
        let direct = FakeDirect::default()
            .reply(&videos[0].url(), Ok(1500))
            .reply(&videos[1].url(), Ok(2500));
        let fallback = FakeFallback::default();

        let first = fx.run(&direct, &fallback, true, &videos).unwrap();
        assert_eq!(first.successes.len(), 2);
        assert_eq!(direct.call_count(), 2);

        let second = fx.run(&direct, &fallback, true, &videos).unwrap();
        assert!(second.successes.is_empty());
        assert!(second.failures.is_empty());
        assert_eq!(second.skipped, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(direct.call_count(), 2);
        assert_eq!(fallback.call_count(), 0);
    }

    #[test]
    fn test_skip_existing_disabled_downloads_again() {
        let fx = Fixture::new();
        let videos = [video("1", 1_600_000_000)];
        let direct = FakeDirect::default().reply(&videos[0].url(), Ok(1500));
        let fallback = FakeFallback::default();

        fx.run(&direct, &fallback, false, &videos).unwrap();
        let second = fx.run(&direct, &fallback, false, &videos).unwrap();

        assert_eq!(second.successes.len(), 1);
        assert!(second.skipped.is_empty());
        assert_eq!(direct.call_count(), 2);
    }

    #[test]
    fn test_failures_are_collected_and_counted() {
        let fx = Fixture::new();
        let videos = [
            video("gone", 1_600_000_000),
            video("tiny", 1_600_000_100),
            video("fine", 1_600_000_200),
        ];
        let direct = FakeDirect::default()
            .reply(&videos[1].url(), Ok(10))
            .reply(&videos[2].url(), Ok(5000));
        let fallback = FakeFallback::default()
            .reply(
                &videos[0].url(),
                FallbackReply::Fails(BackendError::NotFound("404".to_string())),
            )
            .reply(&videos[1].url(), FallbackReply::Writes(10));

        let report = fx.run(&direct, &fallback, true, &videos).unwrap();

        assert_eq!(report.successes, vec![videos[2].url()]);
        assert_eq!(report.failures, vec![videos[0].url(), videos[1].url()]);
        assert_eq!(report.total(), 3);
        assert_eq!(
            report.stats,
            RunStatistics {
                fallback_invocations: 2,
                fallback_failures: 1,
                other_errors: 0,
            }
        );
        assert_eq!(std::fs::read_dir(&fx.out_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_out_of_range_timestamp_fails_the_video_only() {
        let fx = Fixture::new();
        let videos = [video("bad", i64::MAX), video("good", 1_600_000_000)];
        let direct = FakeDirect::default().reply(&videos[1].url(), Ok(1500));

        let report = fx
            .run(&direct, &FakeFallback::default(), true, &videos)
            .unwrap();

        assert_eq!(report.failures, vec![videos[0].url()]);
        assert_eq!(report.successes, vec![videos[1].url()]);
        assert_eq!(report.stats.other_errors, 1);
        assert_eq!(direct.call_count(), 1);
    }

    #[test]
    fn test_last_representable_second_fails_ahead_of_utc() {
        let fx = Fixture::in_zone(Zone::from_code("Asia/Tokyo").unwrap());
        let videos = [video("late", 253_402_300_799), video("good", 1_600_000_000)];
        let direct = FakeDirect::default().reply(&videos[1].url(), Ok(1500));

        let report = fx
            .run(&direct, &FakeFallback::default(), true, &videos)
            .unwrap();

        assert_eq!(report.failures, vec![videos[0].url()]);
        assert_eq!(report.successes, vec![videos[1].url()]);
        assert_eq!(report.stats.other_errors, 1);
        assert!(fx.out_dir.join("2020-09-13T21_26_40_good.mp4").exists());
    }

    #[test]
    fn test_output_path_must_be_a_directory() {
        let fx = Fixture::new();
        std::fs::create_dir_all(fx.out_dir.parent().unwrap()).unwrap();
        std::fs::write(&fx.out_dir, b"oops").unwrap();

        let direct = FakeDirect::default();
        let err = fx
            .run(&direct, &FakeFallback::default(), true, &[video("1", 1_600_000_000)])
            .unwrap_err();

        assert!(matches!(err, Error::NotADirectory(_)));
        assert_eq!(direct.call_count(), 0);
    }
}
