use std::sync::OnceLock;

use regex::Regex;
use time::{
    format_description::FormatItem, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

use crate::{
    result::{Error, Result},
    types::Zone,
};

pub const EXTENSION: &str = "mp4";

/// ISO 8601 to the second, without offset, with `_` instead of `:`
/// as some filesystems reject the latter.
const STAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]_[minute]_[second]");

/// A name starting with the canonical timestamp: everything after it is the id,
/// even if the id itself contains underscores.
const CANONICAL_PATTERN: &str =
    r"(?i)^(?P<stamp>\d{4}-\d{2}-\d{2}T\d{2}_\d{2}_\d{2})_(?P<id>.+)\.mp4$";

/// Any other `<anything>_<anything>.mp4` name: the id is after the last underscore
const GENERIC_PATTERN: &str = r"(?i)^(?P<stamp>.+)_(?P<id>[^_]+)\.mp4$";

static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        [
            Regex::new(CANONICAL_PATTERN).unwrap(),
            Regex::new(GENERIC_PATTERN).unwrap(),
        ]
    })
}

/// What can be recovered from a video file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Wall-clock time in the zone the name was written with, if recognizable
    pub local_time: Option<PrimitiveDateTime>,
    pub id: String,
}

/// Converts between (timestamp, id) pairs and sortable file names
#[derive(Debug, Clone, Copy)]
pub struct FilenameCodec {
    zone: Zone,
}

impl FilenameCodec {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Build the file name of a video, e.g. `2020-09-13T12_26_40_<id>.mp4`
    pub fn format(&self, timestamp: i64, id: &str) -> Result<String> {
        Ok(format!("{}_{id}.{EXTENSION}", self.render(timestamp)?))
    }

    /// Render an epoch timestamp in the configured zone
    pub fn render(&self, timestamp: i64) -> Result<String> {
        let datetime = OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|_| Error::TimestampOutOfRange(timestamp))?;
        self.render_datetime(datetime)
    }

    /// Render the current instant, e.g. for log file names
    pub fn format_now(&self) -> Result<String> {
        self.render_datetime(OffsetDateTime::now_utc())
    }

    fn render_datetime(&self, datetime: OffsetDateTime) -> Result<String> {
        let local = self
            .zone
            .convert(datetime)
            .ok_or_else(|| Error::TimestampOutOfRange(datetime.unix_timestamp()))?;
        Ok(local.format(STAMP_FORMAT)?)
    }

    /// Recover the id (and, best-effort, the time) from a file name.
    /// Return None if the name does not look like a video file name.
    pub fn parse(&self, name: &str) -> Option<ParsedName> {
        let captures = patterns().iter().find_map(|re| re.captures(name))?;

        let id = captures.name("id")?.as_str().to_owned();
        let local_time = captures
            .name("stamp")
            .and_then(|stamp| PrimitiveDateTime::parse(stamp.as_str(), STAMP_FORMAT).ok());

        Some(ParsedName { local_time, id })
    }
}
