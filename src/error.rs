//! Error taxonomy shared by layout, buffer, terminal and input code

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A container's children do not fit and none of them may shrink
    #[error("layout overflow in panel `{panel}`: children need {needed} cells but only {available} are available")]
    LayoutOverflow {
        panel: String,
        needed: i64,
        available: i64,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("terminal capability `{0}` is not supported")]
    CapabilityFailure(String),

    #[error("input reader stopped: {0}")]
    ReaderFatal(String),

    #[error("input queue is full")]
    QueueFull,

    #[error("input queue is closed")]
    QueueClosed,

    #[error("terminal is already acquired")]
    TerminalInUse,

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        Error::OutOfRange(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_message_names_panel() {
        let err = Error::LayoutOverflow {
            panel: "root.body".to_string(),
            needed: 50,
            available: 40,
        };
        let msg = err.to_string();
        assert!(msg.contains("root.body"));
        assert!(msg.contains("50"));
        assert!(msg.contains("40"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
