use std::io;

/// Errors raised while decoding or encoding a single primitive value or
/// packet payload.
///
/// These are purely codec-level failures; framer- and connection-level
/// failures build on top of this type in `mc_net` and `mc_client`
/// respectively.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed VarInt: continuation bit set past the fifth byte")]
    MalformedVarInt,

    #[error("malformed VarLong: continuation bit set past the tenth byte")]
    MalformedVarLong,

    #[error("string is not valid UTF-8")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("string length {0} exceeds the protocol maximum of {1}")]
    StringTooLong(usize, usize),

    #[error("boolean byte {0} is neither 0 nor 1")]
    InvalidBoolean(u8),

    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("packet id {packet_id} is not registered for state {state:?} direction {direction:?}")]
    UnexpectedPacket {
        state: crate::state::State,
        direction: crate::direction::Direction,
        packet_id: i32,
    },

    #[error("illegal state transition: {from:?} -> {to:?}")]
    IllegalStateTransition {
        from: crate::state::State,
        to: crate::state::State,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
