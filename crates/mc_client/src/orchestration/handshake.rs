use mc_protocol::State;

use crate::client::Client;
use crate::error::Result;
use crate::packets::Handshake;

/// Sends the handshake packet and advances the state machine to the state it
/// names. This is always the first packet on a fresh connection.
pub async fn send_handshake(client: &mut Client, next_state: i32) -> Result<()> {
    let config = client.config();
    let handshake = Handshake {
        protocol_version: config.protocol_version,
        server_address: config.host.clone(),
        server_port: config.port,
        next_state,
    };
    client.send(&handshake).await?;

    let target = match next_state {
        crate::packets::HANDSHAKE_STATUS_NEXT => State::Status,
        _ => State::Login,
    };
    client.transition_state(target)
}
