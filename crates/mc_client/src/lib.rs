//! Everything above the wire: the packet registry, the event dispatcher
//! (with the Play-state bundle rule), the client facade, and the
//! handshake/status/login/configuration orchestration that drives a fresh
//! connection to Play.

pub mod client;
pub mod dispatcher;
mod error;
mod offline;
pub mod orchestration;
pub mod packets;
pub mod registry;

pub use client::{Client, ClientConfig};
pub use dispatcher::Dispatcher;
pub use error::{Error, HandlerError, Result};
pub use offline::offline_uuid;
