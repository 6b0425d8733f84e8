use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("incomplete frame: header declares {declared} payload bytes but {available} are available")]
    Incomplete { declared: usize, available: usize },

    #[error("invalid frame payload: {0}")]
    InvalidPayload(String),

    #[error("payload of {0} bytes does not fit a single-byte length field")]
    PayloadTooLarge(usize),

    #[error("chat frame body is {len} bytes, budget is {budget}")]
    MessageTooLong { len: usize, budget: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
