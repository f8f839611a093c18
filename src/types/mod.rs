mod stats;
mod video;
mod zone;

pub use stats::RunStatistics;
pub use video::{DownloadTarget, VideoRecord, SITE_URL};
pub use zone::Zone;
