use std::io::Cursor;

use mc_protocol::{Decode, Direction, State, Uuid};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::offline::offline_uuid;
use crate::packets::{
    EncryptionRequest, LoginAcknowledged, LoginStart, LoginSuccess, SetCompression,
    HANDSHAKE_LOGIN_NEXT,
};

/// The identity the server settled on, once login completes.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub uuid: Uuid,
    pub username: String,
}

/// Runs the login sub-protocol: handshake with `next_state = Login`,
/// Login-Start with the offline-mode UUID, then branches on whatever the
/// server sends back until Login-Success arrives.
///
/// Returns [`Error::UnsupportedAuthentication`] immediately if the server
/// requires online-mode encryption -- completing that exchange is out of
/// scope here.
pub async fn login(client: &mut Client, username: &str) -> Result<LoginOutcome> {
    super::handshake::send_handshake(client, HANDSHAKE_LOGIN_NEXT).await?;

    let uuid = offline_uuid(username);
    client
        .send(&LoginStart {
            username: username.to_string(),
            uuid,
        })
        .await?;

    loop {
        let (packet_id, payload) = client.recv().await?;
        match packet_id {
            EncryptionRequest::ID => return Err(Error::UnsupportedAuthentication),
            SetCompression::ID => {
                let packet = SetCompression::decode_body(&mut Cursor::new(payload))?;
                let threshold = packet.threshold.max(0) as u32;
                client.set_compression_threshold(Some(threshold));
            }
            LoginSuccess::ID => {
                let packet = LoginSuccess::decode_body(&mut Cursor::new(payload))?;
                client.send(&LoginAcknowledged).await?;
                client.transition_state(State::Configuration)?;
                return Ok(LoginOutcome {
                    uuid: packet.uuid,
                    username: packet.username,
                });
            }
            other => {
                return Err(super::unexpected(State::Login, Direction::Clientbound, other));
            }
        }
    }
}
