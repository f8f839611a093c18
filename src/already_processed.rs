use std::{collections::BTreeSet, path::Path};

use tracing::debug;

use crate::{
    filename::FilenameCodec,
    io::{check_file, FileCheck},
    result::Result,
};

/// Ids of the videos already present in the output directory
#[derive(Debug, Default)]
pub struct AlreadyDownloaded {
    ids: BTreeSet<String>,
}

impl AlreadyDownloaded {
    /// Read the directory once and collect the ids of every valid video file in it.
    ///
    /// Malformed leftovers are not counted so that they get downloaded again.
    pub fn scan(dir: &Path, codec: &FilenameCodec) -> Result<Self> {
        let mut ids = BTreeSet::new();

        for entry in dir.read_dir()? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(parsed) = file_name.to_str().and_then(|name| codec.parse(name)) else {
                continue;
            };

            match check_file(&entry.path()) {
                FileCheck::Valid(_) => {
                    debug!("Found video {} ({:?})", parsed.id, parsed.local_time);
                    ids.insert(parsed.id);
                }
                check => debug!("Ignoring {file_name:?}: {check:?}"),
            }
        }

        Ok(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}
