// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation

/// All errors that can occur in the ness-lan-bridge library.
#[derive(Debug, thiserror::Error)]
pub enum NessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid checksum in received packet")]
    Checksum,

    #[error("packet truncated or carrying trailing data")]
    Truncation,

    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    #[error("unknown command 0x{0:02x}")]
    UnknownCommand(u8),

    #[error("unknown request ID 0x{0:02x}")]
    UnknownRequest(u8),

    #[error("unknown event type 0x{0:02x}")]
    UnknownEventType(u8),

    #[error("connection closed")]
    Disconnected,

    #[error("event channel closed")]
    ChannelClosed,
}

impl NessError {
    /// Whether this error came out of the decode path. Decode errors are
    /// recoverable: the offending frame is dropped and processing continues
    /// with the next line from the panel.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            NessError::Checksum
                | NessError::Truncation
                | NessError::MalformedPacket(_)
                | NessError::UnknownCommand(_)
                | NessError::UnknownRequest(_)
                | NessError::UnknownEventType(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NessError>;
