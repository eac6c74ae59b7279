//! Connects to a server, runs the status sub-protocol, and prints the
//! server's MOTD along with the measured round-trip latency.

use mc_client::{Client, ClientConfig};
use mc_client::orchestration::status::query_status;

const HOST: &str = "localhost";
const PORT: u16 = 25565;

#[async_std::main]
async fn main() {
    pretty_env_logger::init();

    let config = ClientConfig {
        host: HOST.to_string(),
        port: PORT,
        protocol_version: 767,
        username: "status_ping".to_string(),
        bundle_cap: None,
    };

    let mut client = match Client::connect(config).await {
        Ok(client) => client,
        Err(err) => {
            log::error!("could not connect to {HOST}:{PORT}: {err}");
            return;
        }
    };

    match query_status(&mut client).await {
        Ok(report) => {
            println!(
                "{} ({} online / {} max) -- {:?}",
                report.document.version.name,
                report.document.players.online,
                report.document.players.max,
                report.latency
            );
        }
        Err(err) => log::error!("status query failed: {err}"),
    }

    client.disconnect();
}
