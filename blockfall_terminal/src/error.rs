use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not read settings file {}: {source}", .path.display())]
    SettingsRead { path: PathBuf, source: io::Error },
    #[error("malformed settings file {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not open log file {}: {source}", .path.display())]
    LogFile { path: PathBuf, source: io::Error },
}
