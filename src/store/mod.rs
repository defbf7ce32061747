//! Flat-file storage for credentials, the outbound message and the target list.
//!
//! Layout under the data directory:
//!
//! ```text
//! api_credentials/<provider>_credentials.txt
//! messages/message.txt
//! target_numbers/numbers.txt
//! ```

mod credentials;
mod message;
mod targets;

use std::io;
use std::path::Path;

pub use credentials::{CredentialStore, MalformedCredentials, parse_credentials};
pub use message::MessageStore;
pub use targets::TargetList;

/// Write `data` to `path`, creating parent directories first.
fn write_file(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}

/// Read `path`, mapping a missing file to `None`.
fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
