//! Wire primitives, the `Packet` trait, the connection state machine, and
//! the codec-level error taxonomy for the Minecraft Java Edition protocol.
//!
//! This crate has no knowledge of sockets, compression, or dispatch -- see
//! `mc_net` for the framer and `mc_client` for everything above it.

mod direction;
mod error;
mod packet;
mod state;
mod types;

pub use direction::Direction;
pub use error::{Error, Result};
pub use packet::Packet;
pub use state::State;
pub use types::{
    decode_array_with_count, decode_boolean_strict, decode_prefixed_array, encode_array,
    encode_prefixed_array, Angle, Decode, Encode, Position, VarInt, VarLong, MAX_STRING_LENGTH,
};

pub use uuid::Uuid;
