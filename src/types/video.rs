use std::path::{Path, PathBuf};

use crate::{filename::FilenameCodec, result::Result};

pub const SITE_URL: &str = "https://www.tiktok.com";

/// A video as described by the listing provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    /// Seconds since the Unix epoch
    pub creation_timestamp: i64,
    pub author_handle: String,
}

impl VideoRecord {
    /// The canonical page URL of the video
    pub fn url(&self) -> String {
        format!(
            "{SITE_URL}/@{}/video/{}?lang=en",
            self.author_handle, self.id
        )
    }
}

/// Where a video comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub file_path: PathBuf,
    pub source_url: String,
    pub creation_timestamp: i64,
}

impl DownloadTarget {
    pub fn new(video: &VideoRecord, out_dir: &Path, codec: &FilenameCodec) -> Result<Self> {
        let file_name = codec.format(video.creation_timestamp, &video.id)?;

        Ok(Self {
            file_path: out_dir.join(file_name),
            source_url: video.url(),
            creation_timestamp: video.creation_timestamp,
        })
    }
}
