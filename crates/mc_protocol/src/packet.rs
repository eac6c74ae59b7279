use std::io::{Read, Write};

use crate::direction::Direction;
use crate::error::Result;
use crate::state::State;

/// A single wire packet type.
///
/// Packet types are plain Rust types carrying their own
/// `STATE`/`DIRECTION`/`ID` as associated constants rather than being
/// registered into a runtime table of trait objects. `mc_client::registry`
/// builds the `(State, Direction, id) -> decode` lookup as a `match` over
/// these constants, which the compiler can check for id collisions within a
/// `(state, direction)` pair at the match-arm level.
///
/// Packet ID numbers are only unique within a `(STATE, DIRECTION)` pair --
/// the same numeric ID is routinely reused across different states, which is
/// exactly why `STATE` is part of the identity here rather than folded away.
pub trait Packet: Sized {
    const STATE: State;
    const DIRECTION: Direction;
    const ID: i32;

    fn decode_body(reader: &mut impl Read) -> Result<Self>;
    fn encode_body(&self, writer: &mut impl Write) -> Result<()>;
}
