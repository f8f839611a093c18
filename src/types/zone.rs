use std::fmt::Debug;

use time::{OffsetDateTime, UtcOffset};
use time_tz::{timezones, Offset, TimeZone, Tz};

use crate::result::{Error, Result};

/// The timezone used to render dates in filenames and log lines.
#[derive(Clone, Copy)]
pub enum Zone {
    Utc,
    Named(&'static Tz),
}

impl Zone {
    /// Resolve a timezone code: `UTC` (any case) or an IANA name.
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case("utc") {
            return Ok(Self::Utc);
        }

        timezones::get_by_name(code)
            .map(Self::Named)
            .ok_or_else(|| Error::UnknownTimezone(code.to_owned()))
    }

    /// Express the instant in this timezone.
    ///
    /// `None` when the local date-time falls outside the range `time` can represent.
    pub fn convert(self, datetime: OffsetDateTime) -> Option<OffsetDateTime> {
        let offset = match self {
            Self::Utc => UtcOffset::UTC,
            Self::Named(tz) => tz.get_offset_utc(&datetime).to_utc(),
        };
        datetime.checked_to_offset(offset)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Utc => "UTC",
            Self::Named(tz) => tz.name(),
        }
    }
}

impl Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone({})", self.name())
    }
}
