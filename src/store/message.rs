use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Storage for the single outbound message body.
///
/// Only the first line of the file is significant: multi-line messages are truncated to
/// their first line on load. This mirrors the established file format and is kept as a
/// known limitation.
#[derive(Debug, Clone)]
pub struct MessageStore {
    path: PathBuf,
}

impl MessageStore {
    /// Store at `<data_dir>/messages/message.txt`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("messages").join("message.txt"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First line of the (trimmed) message file, or `None` if the file does not exist.
    ///
    /// An existing but empty file yields `Some("")`; callers decide whether that blocks a
    /// dispatch.
    pub fn load(&self) -> io::Result<Option<String>> {
        let Some(data) = super::read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "message file not found");
            return Ok(None);
        };

        let first = data.trim().lines().next().unwrap_or_default().to_owned();
        Ok(Some(first))
    }

    /// Overwrite the message file with `text` verbatim.
    pub fn save(&self, text: &str) -> io::Result<()> {
        info!(path = %self.path.display(), chars = text.chars().count(), "saving message");
        super::write_file(&self.path, text)
    }
}
