use std::io::Cursor;
use std::time::{Duration, Instant};

use mc_protocol::Decode;
use serde::Deserialize;

use super::expect;
use crate::client::Client;
use crate::error::Result;
use crate::packets::{PingRequest, PongResponse, StatusRequest, StatusResponse, HANDSHAKE_STATUS_NEXT};

/// The server-status JSON document, permissively parsed -- fields this
/// struct doesn't know about are simply ignored rather than rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusDocument {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    /// A raw JSON value because the chat component it carries can be either
    /// a bare string or a structured object, depending on server version.
    pub description: serde_json::Value,
    #[serde(default)]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
    #[serde(default)]
    pub sample: Vec<StatusPlayerSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPlayerSample {
    pub name: String,
    pub id: String,
}

/// The outcome of a status query: the parsed document plus the round-trip
/// latency measured from the ping/pong exchange.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub document: StatusDocument,
    pub latency: Duration,
}

/// Runs the full status sub-protocol: handshake with `next_state = Status`,
/// an empty status request, then a ping/pong round trip used only to time
/// the connection -- the server echoes the ping payload verbatim.
pub async fn query_status(client: &mut Client) -> Result<StatusReport> {
    super::handshake::send_handshake(client, HANDSHAKE_STATUS_NEXT).await?;

    client.send(&StatusRequest).await?;
    let (packet_id, payload) = client.recv().await?;
    expect::<StatusResponse>(client.state(), packet_id)?;
    let response = StatusResponse::decode_body(&mut Cursor::new(payload))?;
    let document: StatusDocument = serde_json::from_str(&response.json)?;

    let nonce = 0x4D435354_i64; // arbitrary, only needs to round-trip
    let started = Instant::now();
    client.send(&PingRequest { payload: nonce }).await?;
    let (packet_id, payload) = client.recv().await?;
    expect::<PongResponse>(client.state(), packet_id)?;
    let pong = PongResponse::decode_body(&mut Cursor::new(payload))?;
    let latency = started.elapsed();

    if pong.payload != nonce {
        log::warn!("status pong payload did not match the ping nonce");
    }

    Ok(StatusReport { document, latency })
}
