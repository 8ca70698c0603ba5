use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Process inspection or foreground lookup failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// SIGSTOP/SIGCONT could not be delivered
    #[error("Signal error: {0}")]
    Signal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
