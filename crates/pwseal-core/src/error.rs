use thiserror::Error;

pub type PwsealResult<T> = Result<T, PwsealError>;

#[derive(Debug, Error)]
pub enum PwsealError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
