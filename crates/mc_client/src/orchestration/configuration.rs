use mc_protocol::State;

use crate::client::Client;
use crate::error::Result;
use crate::packets::{FinishConfigurationClientbound, FinishConfigurationServerbound};

/// Drains server-initiated configuration packets (registry data, feature
/// flags, resource pack pushes -- none of which this engine models) until
/// Finish-Configuration arrives, echoes it, and enters Play.
///
/// Also used to re-drive Configuration when the server sends
/// Start-Configuration from Play; the caller is responsible for having
/// already transitioned into Configuration before calling this.
pub async fn run(client: &mut Client) -> Result<()> {
    loop {
        let (packet_id, payload) = client.recv().await?;

        if packet_id == FinishConfigurationClientbound::ID {
            client.send(&FinishConfigurationServerbound).await?;
            client.transition_state(State::Play)?;
            return Ok(());
        }

        client.dispatch(packet_id, &payload).await;
    }
}
