//! The short, mostly-synchronous sub-protocols that drive the connection
//! from Handshaking through Play.

pub mod configuration;
pub mod handshake;
pub mod login;
pub mod status;

use mc_protocol::{Direction, Packet, State};

use crate::error::{Error, Result};

/// Fails with `UnexpectedPacket` unless the just-received id matches `P`.
fn expect<P: Packet>(state: State, packet_id: i32) -> Result<()> {
    if packet_id == P::ID {
        Ok(())
    } else {
        Err(Error::UnexpectedPacket {
            state,
            direction: P::DIRECTION,
            packet_id,
        })
    }
}

fn unexpected(state: State, direction: Direction, packet_id: i32) -> Error {
    Error::UnexpectedPacket {
        state,
        direction,
        packet_id,
    }
}
