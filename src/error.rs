use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuzzError {
    /// Pre-flight failure: nothing can be tested, so the run aborts.
    #[error("could not find command '{command}' (working directory: {})", working_dir.display())]
    CommandNotFound { command: String, working_dir: PathBuf },

    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error while {stage}: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read seed file {}: {source}", path.display())]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FuzzError {
    pub(crate) fn io(stage: &'static str, source: std::io::Error) -> Self {
        FuzzError::Io { stage, source }
    }
}

pub type Result<T, E = FuzzError> = std::result::Result<T, E>;
