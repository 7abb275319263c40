use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Explorer(#[from] sql_explorer::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index not found: {0}")]
    IndexNotFound(String),
}

pub type CliResult<T> = Result<T, CliError>;
