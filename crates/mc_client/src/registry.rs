//! Maps `(state, direction, packet id)` to a human-readable name for logging.
//!
//! There is deliberately no runtime table here: every packet type already
//! carries its own `STATE`/`DIRECTION`/`ID` as associated constants (see
//! [`mc_protocol::Packet`]), and a handler that subscribes to a given type
//! decodes it directly. This module exists only for the debug/log path,
//! where the dispatcher wants a name to print for a packet nobody
//! subscribed to.

use mc_protocol::{Direction, State};
use pretty_hex::PrettyHex;

/// Best-effort packet name for logging. `None` means this engine carries no
/// schema for that id -- expected for the hundred-plus Play packets outside
/// this crate's scope, not an error condition on its own.
pub fn packet_name(state: State, direction: Direction, packet_id: i32) -> Option<&'static str> {
    use Direction::*;
    use State::*;

    Some(match (state, direction, packet_id) {
        (Handshaking, Serverbound, 0x00) => "Handshake",
        (Status, Serverbound, 0x00) => "StatusRequest",
        (Status, Clientbound, 0x00) => "StatusResponse",
        (Status, Serverbound, 0x01) => "PingRequest",
        (Status, Clientbound, 0x01) => "PongResponse",
        (Login, Serverbound, 0x00) => "LoginStart",
        (Login, Clientbound, 0x01) => "EncryptionRequest",
        (Login, Clientbound, 0x02) => "LoginSuccess",
        (Login, Clientbound, 0x03) => "SetCompression",
        (Login, Serverbound, 0x03) => "LoginAcknowledged",
        (Configuration, Serverbound, 0x03) => "FinishConfiguration",
        (Configuration, Clientbound, 0x03) => "FinishConfiguration",
        (Play, Clientbound, 0x00) => "BundleDelimiter",
        (Play, Clientbound, 0x01) => "SpawnEntity",
        (Play, Clientbound, 0x1D) => "Disconnect",
        (Play, Clientbound, 0x24) => "KeepAlive",
        (Play, Clientbound, 0x5A) => "EntityVelocity",
        (Play, Clientbound, 0x65) => "StartConfiguration",
        _ => return None,
    })
}

/// Renders a payload nobody recognized as a hex dump for a debug log line.
pub fn describe_unknown(payload: &[u8]) -> String {
    format!("{:?}", payload.hex_dump())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_id_resolves_differently_per_state() {
        assert_eq!(
            packet_name(State::Handshaking, Direction::Serverbound, 0x00),
            Some("Handshake")
        );
        assert_eq!(
            packet_name(State::Status, Direction::Serverbound, 0x00),
            Some("StatusRequest")
        );
        assert_eq!(
            packet_name(State::Login, Direction::Serverbound, 0x00),
            Some("LoginStart")
        );
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        assert_eq!(packet_name(State::Play, Direction::Clientbound, 0x7F), None);
    }
}
