use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A content file exists but does not satisfy its collection schema.
    #[error("Schema error in {file:?}: {message}")]
    Schema { file: PathBuf, message: String },

    /// The page store could not answer a lookup. Distinct from "not found".
    #[error("Page store unavailable while looking up '{path}': {message}")]
    StoreUnavailable { path: String, message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn schema(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Schema {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn store_unavailable(path: impl Into<String>, message: impl ToString) -> Self {
        Error::StoreUnavailable {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
