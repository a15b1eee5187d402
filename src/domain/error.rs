//! Domain error types.

/// Top-level error type for swingtrader.
///
/// Sizing rejections are not errors — they come back as a
/// [`crate::domain::sizing::SizingResult`] with a zero amount and a reason
/// code. Errors here mean the inputs themselves were unusable.
#[derive(Debug, thiserror::Error)]
pub enum SwingtraderError {
    #[error("empty candle series")]
    NoCandles,

    #[error("candle series not in ascending date order at index {index}")]
    NonMonotonicCandles { index: usize },

    #[error("malformed candle at index {index}: {reason}")]
    MalformedCandle { index: usize, reason: String },

    #[error("insufficient data: have {have} bars, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("candle file error: {reason}")]
    CandleFile { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SwingtraderError> for std::process::ExitCode {
    fn from(err: &SwingtraderError) -> Self {
        let code: u8 = match err {
            SwingtraderError::Io(_) => 1,
            SwingtraderError::ConfigParse { .. } | SwingtraderError::ConfigInvalid { .. } => 2,
            SwingtraderError::CandleFile { .. } => 3,
            SwingtraderError::NoCandles
            | SwingtraderError::NonMonotonicCandles { .. }
            | SwingtraderError::MalformedCandle { .. }
            | SwingtraderError::InsufficientData { .. }
            | SwingtraderError::InvalidInput { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = SwingtraderError::InsufficientData { have: 10, need: 22 };
        assert_eq!(err.to_string(), "insufficient data: have 10 bars, need 22");

        let err = SwingtraderError::NonMonotonicCandles { index: 7 };
        assert!(err.to_string().contains("index 7"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SwingtraderError = io.into();
        assert!(matches!(err, SwingtraderError::Io(_)));
    }
}
