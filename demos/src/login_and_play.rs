//! Logs in, drives the configuration sub-protocol, registers a couple of
//! Play-state handlers, and runs the receive loop until the server closes
//! the connection.

use mc_client::orchestration::{configuration, login};
use mc_client::packets::{Disconnect, KeepAlive};
use mc_client::{Client, ClientConfig};

const HOST: &str = "localhost";
const PORT: u16 = 25565;
const USERNAME: &str = "login_and_play";

#[async_std::main]
async fn main() {
    pretty_env_logger::init();

    let config = ClientConfig {
        host: HOST.to_string(),
        port: PORT,
        protocol_version: 767,
        username: USERNAME.to_string(),
        bundle_cap: None,
    };

    let mut client = match Client::connect(config).await {
        Ok(client) => client,
        Err(err) => {
            log::error!("could not connect to {HOST}:{PORT}: {err}");
            return;
        }
    };

    let outcome = match login::login(&mut client, USERNAME).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("login failed: {err}");
            return;
        }
    };
    log::info!("logged in as {} ({})", outcome.username, outcome.uuid);

    if let Err(err) = configuration::run(&mut client).await {
        log::error!("configuration failed: {err}");
        return;
    }

    client.dispatcher_mut().subscribe::<KeepAlive, _, _>(|packet| async move {
        log::debug!("keep-alive {}", packet.keep_alive_id);
        Ok(())
    });

    client.dispatcher_mut().subscribe::<Disconnect, _, _>(|packet| async move {
        log::info!("disconnected by server: {}", packet.reason);
        Ok(())
    });

    client.dispatcher_mut().subscribe_state_any(
        mc_protocol::State::Play,
        "play_logger",
        |buffer| async move {
            log::trace!("play packet ({} bytes)", buffer.remaining().len());
            Ok(())
        },
    );

    if let Err(err) = client.run().await {
        log::error!("connection lost: {err}");
    }
}
