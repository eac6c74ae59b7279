use async_net::TcpStream;
use mc_net::Threshold;
use mc_protocol::{Packet, State};

use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};

/// Everything the embedder supplies; there is no config file or environment
/// variable lookup anywhere in this crate.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: i32,
    pub username: String,
    /// Overrides [`crate::dispatcher::DEFAULT_BUNDLE_CAP`] when set.
    pub bundle_cap: Option<usize>,
}

/// Owns the socket, the connection state, the compression threshold, and the
/// dispatcher's subscription table. All outbound writes go through [`send`],
/// which serializes them -- there is no way to get a second writer handle to
/// race against.
pub struct Client {
    config: ClientConfig,
    socket: Option<TcpStream>,
    state: State,
    threshold: Threshold,
    dispatcher: Dispatcher,
}

impl Client {
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let socket = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(mc_net::FramerError::from)?;
        let dispatcher = match config.bundle_cap {
            Some(cap) => Dispatcher::with_bundle_cap(cap),
            None => Dispatcher::new(),
        };
        Ok(Client {
            config,
            socket: Some(socket),
            state: State::Handshaking,
            threshold: None,
            dispatcher,
        })
    }

    /// Closes the socket. Idempotent -- calling this twice, or dropping a
    /// `Client` without calling it, both leave no socket open.
    pub fn disconnect(&mut self) {
        self.socket = None;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn set_compression_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }

    pub(crate) fn transition_state(&mut self, next: State) -> Result<()> {
        self.state = self.state.transition_to(next)?;
        Ok(())
    }

    fn socket_mut(&mut self) -> Result<&mut TcpStream> {
        self.socket.as_mut().ok_or(Error::NotConnected)
    }

    pub async fn send<P: Packet>(&mut self, packet: &P) -> Result<()> {
        let mut payload = Vec::new();
        packet.encode_body(&mut payload)?;
        let threshold = self.threshold;
        let socket = self.socket_mut()?;
        mc_net::write_frame(socket, P::ID, &payload, threshold).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<(i32, Vec<u8>)> {
        let threshold = self.threshold;
        let socket = self.socket_mut()?;
        let (packet_id, payload) = mc_net::read_frame(socket, threshold).await?;
        Ok((packet_id, payload))
    }

    /// Hands a received packet to the dispatcher at the client's current
    /// state.
    pub async fn dispatch(&mut self, packet_id: i32, payload: &[u8]) {
        let state = self.state;
        self.dispatcher.dispatch(state, packet_id, payload).await;
    }

    /// Runs the receive loop once Play has been entered: reads packets,
    /// dispatches them, and transparently handles the server sending
    /// Start-Configuration by re-entering Configuration and waiting for a
    /// fresh Finish-Configuration before resuming Play dispatch.
    ///
    /// Returns on a fatal framer/codec error, or once the socket has been
    /// closed via [`disconnect`](Self::disconnect).
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let (packet_id, payload) = match self.recv().await {
                Ok(pair) => pair,
                Err(Error::NotConnected) => return Ok(()),
                Err(err) => return Err(err),
            };

            if self.state == State::Play
                && packet_id == crate::packets::StartConfiguration::ID
            {
                self.transition_state(State::Configuration)?;
                crate::orchestration::configuration::run(self).await?;
                continue;
            }

            self.dispatch(packet_id, &payload).await;
        }
    }
}

// `Client` needs no custom `Drop`: the socket is an `Option<TcpStream>`, and
// dropping a `TcpStream` already closes the underlying connection.
// `disconnect` just makes that happen on demand instead of waiting for the
// embedder to drop the whole `Client`.
