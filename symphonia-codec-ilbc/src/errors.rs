use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported iLBC mode: {0} ms")]
    UnsupportedMode(u32),
    #[error("Invalid iLBC frame length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength { expected: usize, actual: usize },
    #[error("Invalid PCM length: expected {expected} samples, got {actual}")]
    InvalidPcmLength { expected: usize, actual: usize },
    #[error("Output buffer too small: expected {expected}, got {actual}")]
    OutputTooSmall { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for symphonia_core::errors::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::UnsupportedMode(_) => {
                symphonia_core::errors::Error::Unsupported("ilbc: unsupported mode")
            }
            Error::InvalidFrameLength { .. } => {
                symphonia_core::errors::Error::DecodeError("ilbc: invalid frame length")
            }
            Error::InvalidPcmLength { .. } | Error::OutputTooSmall { .. } => {
                symphonia_core::errors::Error::DecodeError("ilbc: invalid buffer length")
            }
        }
    }
}
