use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{Command, Output},
};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    command::{assert_success_command, run_command, Capture, YT_DL, YT_DLP},
    BackendError,
};
use crate::{
    settings::Settings,
    types::{VideoRecord, SITE_URL},
};

/// Interface for enumerating the videos posted by a user
pub trait VideoLister {
    /// List the user's videos in the order the provider returns them.
    ///
    /// If `limit` is set, at most that many videos are returned.
    fn list_videos(&self, user: &str, limit: Option<usize>)
        -> Result<Vec<VideoRecord>, BackendError>;
}

/// Interface for downloaders taking a page URL and writing the video themselves
pub trait GenericDownloader {
    /// Download the video of the page to exactly `destination`
    fn download(&self, url: &str, destination: &Path) -> Result<(), BackendError>;
}

/// Interface for the [youtube-dl](https://github.com/ytdl-org/youtube-dl) program
#[derive(Debug)]
pub struct Ytdl {
    program: &'static str,
    socket_timeout: String,
}

/// Markers of an `ERROR:` line saying the video cannot be obtained at all
const UNAVAILABLE_MARKERS: [&str; 7] = [
    "unavailable",
    "not available",
    "404",
    "not found",
    "private",
    "removed",
    "does not exist",
];

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new(settings: &Settings) -> miette::Result<Self> {
        let socket_timeout = settings.ytdl_socket_timeout_secs.to_string();

        // Check `yt-dlp`
        if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self {
                program: YT_DLP,
                socket_timeout,
            })
        } else if assert_success_command(YT_DL, |cmd| cmd.arg("--version")).is_ok() {
            // Check `youtube-dl`
            Ok(Self {
                program: YT_DL,
                socket_timeout,
            })
        } else {
            miette::bail!("Neither yt-dlp nor youtube-dl found")
        }
    }

    pub fn program(&self) -> &'static str {
        self.program
    }

    fn run<F>(&self, f: F, capture: Capture) -> Result<Output, BackendError>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        run_command(
            self.program,
            |cmd| f(cmd.args(["--socket-timeout", self.socket_timeout.as_str()])),
            capture,
        )
        .map_err(|err| BackendError::Other(format!("Could not run {}: {err}", self.program)))
    }

    /// Run the command and check if it failed with saying the stream is unavailable.
    /// In that case, return [`BackendError::NotFound`].
    ///
    /// Any other non-success status is a [`BackendError::Other`].
    fn run_check_availability<F>(&self, f: F, capture: Capture) -> Result<Output, BackendError>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = self.run(f, capture | Capture::STDERR)?;
        check_status(self.program, &res)?;
        Ok(res)
    }
}

impl VideoLister for Ytdl {
    fn list_videos(
        &self,
        user: &str,
        limit: Option<usize>,
    ) -> Result<Vec<VideoRecord>, BackendError> {
        let feed = format!("{SITE_URL}/@{user}");
        let limit = limit.map(|n| n.to_string());

        let res = self.run(
            |cmd| {
                cmd.arg("--ignore-errors")
                    .arg("--skip-download")
                    .arg("--dump-json");
                if let Some(limit) = &limit {
                    cmd.args(["--playlist-end", limit.as_str()]);
                }
                cmd.arg("--").arg(&feed)
            },
            Capture::STDOUT | Capture::STDERR,
        )?;

        // Some entries may fail while the others are fine: only give up when nothing came out
        let videos = parse_feed(&String::from_utf8_lossy(&res.stdout), user);
        if videos.is_empty() {
            check_status(self.program, &res)?;
        }

        Ok(videos)
    }
}

impl GenericDownloader for Ytdl {
    fn download(&self, url: &str, destination: &Path) -> Result<(), BackendError> {
        let template = output_template(destination);

        self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .args([OsStr::new("-o"), template.as_os_str()])
                    .arg("--no-continue") // Or else fails when file already exists, even an empty one
                    .args(["-f", "best[ext=mp4]/best"])
                    .arg("--")
                    .arg(url)
            },
            Capture::empty(),
        )?;

        Ok(())
    }
}

/// Classify a finished command from its status and `ERROR:` lines.
///
/// A success status wins over any recoverable error printed along the way.
fn check_status(program: &str, res: &Output) -> Result<(), BackendError> {
    if res.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&res.stderr);
    if let Some(line) = find_unavailable(&stderr) {
        return Err(BackendError::NotFound(line.to_owned()));
    }

    let reason = stderr
        .lines()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .unwrap_or("no error message");
    Err(BackendError::Other(format!(
        "{program} did run but was not successful ({}): {reason}",
        res.status
    )))
}

fn find_unavailable(stderr: &str) -> Option<&str> {
    stderr.lines().map(str::trim).find(|line| {
        let lower = line.to_lowercase();
        line.starts_with("ERROR:") && UNAVAILABLE_MARKERS.iter().any(|m| lower.contains(m))
    })
}

/// `-o` takes an output template: escape the `%` so the path is used verbatim
fn output_template(path: &Path) -> OsString {
    match path.to_str() {
        Some(s) => s.replace('%', "%%").into(),
        None => path.as_os_str().to_owned(),
    }
}

/// The subset of the `--dump-json` output that is needed
#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: String,
    timestamp: Option<i64>,
    uploader: Option<String>,
}

/// Parse one JSON object per line, in order.
/// Lines that cannot be parsed are logged and skipped.
fn parse_feed(stdout: &str, user: &str) -> Vec<VideoRecord> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<FeedEntry>(line) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unparsable listing entry: {err}");
                None
            }
        })
        .map(|entry| {
            let creation_timestamp = entry.timestamp.unwrap_or_else(|| {
                warn!("Video {} has no creation time, using the epoch", entry.id);
                0
            });
            debug!("Listed video {} ({creation_timestamp})", entry.id);

            VideoRecord {
                id: entry.id,
                creation_timestamp,
                author_handle: entry.uploader.unwrap_or_else(|| user.to_owned()),
            }
        })
        .collect()
}
