use mc_protocol::State;

/// Top-level error type an embedder matches on.
///
/// Framer and codec failures are fatal to the connection and bubble straight
/// up through [`recv`](crate::client::Client::recv); `HandlerError` and
/// `UnexpectedPacket` are soft failures the receive loop logs and continues
/// past.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Protocol(#[from] mc_protocol::Error),

    #[error(transparent)]
    Framer(#[from] mc_net::FramerError),

    #[error("packet id {packet_id} is not registered for state {state:?} direction {direction:?}")]
    UnexpectedPacket {
        state: State,
        direction: mc_protocol::Direction,
        packet_id: i32,
    },

    #[error("handler failed while processing packet id {packet_id} in state {state:?}: {source}")]
    Handler {
        state: State,
        packet_id: i32,
        #[source]
        source: HandlerError,
    },

    #[error("server requires online-mode authentication, which this client does not implement")]
    UnsupportedAuthentication,

    #[error("the server's status response was not valid JSON: {0}")]
    MalformedStatus(#[from] serde_json::Error),

    #[error("connection is not open")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by a subscriber. Boxed so handlers can report any
/// failure without this crate needing to know its shape.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
