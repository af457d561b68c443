use std::path::PathBuf;

/// Errors from the plumbing around the scenes: config files, the terminal
/// and the control channel.
/// Scene and theme operations never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error reading or writing a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file exists but is not valid TOML for [`crate::config::Config`].
    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config could not be encoded as TOML.
    #[error("failed to write {path}: {source}")]
    ConfigSerialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    /// Refused to overwrite an existing config file.
    #[error("config file already exists: {0}")]
    ConfigExists(PathBuf),

    /// No platform config directory could be determined.
    #[error("no config directory available on this platform")]
    NoConfigDir,

    /// Terminal setup, input or output failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Malformed line on the control channel.
    #[error("invalid control message: {0}")]
    Control(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
