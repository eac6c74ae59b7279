//! Length-prefixed, optionally zlib-compressed packet framing over an async
//! byte stream, plus the in-memory buffer the dispatcher hands packet
//! payloads through.
//!
//! This crate knows nothing about packet IDs beyond the raw integer read off
//! the wire, and nothing about connection state -- see `mc_client` for both.

mod buffer;
mod framer;

pub use buffer::PacketBuffer;
pub use framer::{read_frame, write_frame, FramerError, Threshold};
