//! Sources for the most recently observed external command.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use signd_core::CommandContext;

/// Default location the shell hook writes to: `~/.signd/last_command`.
pub fn default_command_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".signd").join("last_command"))
}

/// Reads the last command from a file kept up to date by a shell hook.
///
/// The file is read on every call so the value is current at dispatch time.
/// Only the last non-empty line counts.
#[derive(Debug, Clone)]
pub struct CommandFile {
    path: PathBuf,
}

impl CommandFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CommandContext for CommandFile {
    fn last_command(&self) -> Option<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Failed to read last command");
                return None;
            }
        };
        contents
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}

/// In-process last command, set by whoever observes commands.
#[derive(Debug, Default)]
pub struct SharedCommand {
    last: RwLock<Option<String>>,
}

impl SharedCommand {
    pub fn record(&self, command: impl Into<String>) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = Some(command.into());
    }

    pub fn clear(&self) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CommandContext for SharedCommand {
    fn last_command(&self) -> Option<String> {
        self.last.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
