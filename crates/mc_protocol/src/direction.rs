/// Which side of the connection originated a packet.
///
/// Named `Serverbound`/`Clientbound` rather than `Inbound`/`Outbound`
/// because this crate only ever plays the client side of the connection, so
/// "inbound" would always mean clientbound and "outbound" would always mean
/// serverbound -- spelling out which one avoids a layer of indirection at
/// every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Sent by the client, received by the server.
    Serverbound,
    /// Sent by the server, received by the client.
    Clientbound,
}
