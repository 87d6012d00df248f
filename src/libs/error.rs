#[derive(thiserror::Error, Debug)]
pub enum MhgError {
    /// A malformed or incomplete alignment report record
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        /// The line number (1-based)
        line: usize,
        message: String,
    },
    /// Edge removal failed to converge; never expected to happen
    #[error("component {component} did not stabilize after removing {removed} edges")]
    ConflictUnresolvable { component: usize, removed: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MhgError {
    pub fn parse(file: &str, line: usize, message: impl Into<String>) -> Self {
        MhgError::Parse {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MhgError>;
