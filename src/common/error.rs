use thiserror::Error;

use super::metadata::{ECLevel, Version};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    #[error("Input too large: no capacity left after version {version} at ec level {ec_level:?}")]
    InputTooLarge { version: Version, ec_level: ECLevel },
    #[error("Encoding region too small: {required} bits for {available} free modules")]
    EncodingRegionTooSmall { required: usize, available: usize },
    #[error("Invalid version")]
    InvalidVersion,
    #[error("Invalid masking pattern")]
    InvalidMaskingPattern,
}

pub type QRResult<T> = Result<T, QRError>;
