//! Subscription table and inbound packet fan-out, including the Play-state
//! bundle aggregation rule.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use mc_net::PacketBuffer;
use mc_protocol::{Direction, Packet, State};

use crate::error::HandlerError;
use crate::packets::BundleDelimiter;
use crate::registry;

/// Default safety cap on accumulated bundle packets before bundling is
/// disabled for the rest of the session. Not part of the wire protocol --
/// a local guard against a misbehaving or malicious server.
pub const DEFAULT_BUNDLE_CAP: usize = 32;

type HandlerFn = Box<dyn Fn(PacketBuffer) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

struct Subscription {
    label: &'static str,
    handler: HandlerFn,
}

enum BundleState {
    NotBundling,
    Accumulating(Vec<(i32, Vec<u8>)>),
}

/// Routes decoded-or-not packet bytes to whoever subscribed to them.
///
/// Registration (`subscribe`/`subscribe_any`/`subscribe_state_any`) is meant
/// to happen once, before the receive loop starts; nothing here prevents
/// calling them later, but the subscription table is not synchronized, so
/// doing so concurrently with `dispatch` is the caller's problem.
pub struct Dispatcher {
    exact: HashMap<(State, i32), Vec<Subscription>>,
    any_any: Vec<Subscription>,
    state_any: HashMap<State, Vec<Subscription>>,
    bundle_cap: usize,
    bundle_state: BundleState,
    bundling_disabled: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_bundle_cap(DEFAULT_BUNDLE_CAP)
    }

    pub fn with_bundle_cap(bundle_cap: usize) -> Self {
        Dispatcher {
            exact: HashMap::new(),
            any_any: Vec::new(),
            state_any: HashMap::new(),
            bundle_cap,
            bundle_state: BundleState::NotBundling,
            bundling_disabled: false,
        }
    }

    /// Subscribes to a specific packet type, decoding it once before handing
    /// it to `handler`. This is the ergonomic path for the common case of a
    /// single subscriber per packet type.
    pub fn subscribe<P, F, Fut>(&mut self, handler: F)
    where
        P: Packet + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let wrapped: HandlerFn = Box::new(move |mut buffer: PacketBuffer| {
            let handler = handler.clone();
            Box::pin(async move {
                let packet = P::decode_body(&mut buffer).map_err(|err| Box::new(err) as HandlerError)?;
                handler(packet).await
            })
        });
        self.exact
            .entry((P::STATE, P::ID))
            .or_default()
            .push(Subscription {
                label: std::any::type_name::<P>(),
                handler: wrapped,
            });
    }

    /// Subscribes to every packet regardless of state or id, receiving the
    /// raw, undecoded payload.
    pub fn subscribe_any<F, Fut>(&mut self, label: &'static str, handler: F)
    where
        F: Fn(PacketBuffer) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.any_any.push(Subscription {
            label,
            handler: Box::new(move |buffer| Box::pin(handler(buffer))),
        });
    }

    /// Subscribes to every packet id within one state, receiving the raw,
    /// undecoded payload.
    pub fn subscribe_state_any<F, Fut>(&mut self, state: State, label: &'static str, handler: F)
    where
        F: Fn(PacketBuffer) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.state_any
            .entry(state)
            .or_default()
            .push(Subscription {
                label,
                handler: Box::new(move |buffer| Box::pin(handler(buffer))),
            });
    }

    /// Dispatches one received packet. In Play state, with bundling still
    /// enabled, this may defer the dispatch into the active bundle instead
    /// of running it immediately.
    pub async fn dispatch(&mut self, state: State, packet_id: i32, payload: &[u8]) {
        if state == State::Play && !self.bundling_disabled {
            self.dispatch_bundled(packet_id, payload).await;
        } else {
            self.dispatch_immediate(state, packet_id, payload).await;
        }
    }

    async fn dispatch_bundled(&mut self, packet_id: i32, payload: &[u8]) {
        if packet_id == BundleDelimiter::ID {
            let previous =
                std::mem::replace(&mut self.bundle_state, BundleState::Accumulating(Vec::new()));
            if let BundleState::Accumulating(pending) = previous {
                self.bundle_state = BundleState::NotBundling;
                self.flush_bundle(pending).await;
                self.dispatch_immediate(State::Play, packet_id, payload).await;
            }
            return;
        }

        let should_flush = match &mut self.bundle_state {
            BundleState::Accumulating(pending) => {
                pending.push((packet_id, payload.to_vec()));
                pending.len() > self.bundle_cap
            }
            BundleState::NotBundling => false,
        };

        if should_flush {
            let pending = match std::mem::replace(&mut self.bundle_state, BundleState::NotBundling)
            {
                BundleState::Accumulating(pending) => pending,
                BundleState::NotBundling => Vec::new(),
            };
            self.bundling_disabled = true;
            log::warn!(
                "bundle grew past the cap of {} packets; disabling bundling for the rest of the session",
                self.bundle_cap
            );
            self.flush_bundle(pending).await;
        } else if matches!(self.bundle_state, BundleState::NotBundling) {
            self.dispatch_immediate(State::Play, packet_id, payload).await;
        }
    }

    async fn flush_bundle(&self, pending: Vec<(i32, Vec<u8>)>) {
        for (packet_id, payload) in pending {
            self.dispatch_immediate(State::Play, packet_id, &payload).await;
        }
    }

    async fn dispatch_immediate(&self, state: State, packet_id: i32, payload: &[u8]) {
        let handlers = self.collect_handlers(state, packet_id);

        if handlers.is_empty() {
            let name = registry::packet_name(state, Direction::Clientbound, packet_id)
                .map(|name| format!(" ({name})"))
                .unwrap_or_default();
            log::debug!(
                "unhandled packet{name}: state={state:?} id=0x{packet_id:02x}\n{}",
                registry::describe_unknown(payload)
            );
            return;
        }

        if handlers.len() == 1 {
            let buffer = PacketBuffer::new(payload.to_vec());
            let sub = handlers[0];
            if let Err(err) = (sub.handler)(buffer).await {
                log::error!(
                    "handler {} failed for state={state:?} id=0x{packet_id:02x}: {err}",
                    sub.label
                );
            }
            return;
        }

        let buffer = PacketBuffer::new(payload.to_vec());
        let (labels, futures): (Vec<_>, Vec<_>) = handlers
            .iter()
            .map(|sub| (sub.label, (sub.handler)(buffer.snapshot())))
            .unzip();

        for (label, result) in labels.into_iter().zip(join_all(futures).await) {
            if let Err(err) = result {
                log::error!(
                    "handler {label} failed for state={state:?} id=0x{packet_id:02x}: {err}"
                );
            }
        }
    }

    /// Exact `(state, id)` subscribers, then any/any, then state/any-id --
    /// the fixed fan-out order.
    fn collect_handlers(&self, state: State, packet_id: i32) -> Vec<&Subscription> {
        let mut handlers = Vec::new();
        if let Some(subs) = self.exact.get(&(state, packet_id)) {
            handlers.extend(subs.iter());
        }
        handlers.extend(self.any_any.iter());
        if let Some(subs) = self.state_any.get(&state) {
            handlers.extend(subs.iter());
        }
        handlers
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::packets::{EntityVelocity, KeepAlive, SpawnEntity};
    use mc_protocol::Uuid;
    use std::sync::Mutex;

    fn encode_body<P: Packet>(packet: &P) -> Vec<u8> {
        let mut buf = Vec::new();
        packet.encode_body(&mut buf).unwrap();
        buf
    }

    #[async_std::test]
    async fn unhandled_packet_is_silently_discarded() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(State::Status, 0x00, &[]).await;
    }

    #[async_std::test]
    async fn fan_out_order_is_exact_then_any_any_then_state_any() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        let tag = order.clone();
        dispatcher.subscribe::<KeepAlive, _, _>(move |_packet| {
            let tag = tag.clone();
            async move {
                tag.lock().unwrap().push("exact");
                Ok(())
            }
        });

        let tag = order.clone();
        dispatcher.subscribe_any("any_any", move |_buf| {
            let tag = tag.clone();
            async move {
                tag.lock().unwrap().push("any_any");
                Ok(())
            }
        });

        let tag = order.clone();
        dispatcher.subscribe_state_any(State::Play, "state_any", move |_buf| {
            let tag = tag.clone();
            async move {
                tag.lock().unwrap().push("state_any");
                Ok(())
            }
        });

        let payload = encode_body(&KeepAlive { keep_alive_id: 7 });
        dispatcher
            .dispatch(State::Play, KeepAlive::ID, &payload)
            .await;

        let recorded = order.lock().unwrap().clone();
        assert_eq!(recorded, vec!["exact", "any_any", "state_any"]);
    }

    #[async_std::test]
    async fn bundle_releases_accumulated_handlers_before_closing_delimiter() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        for label in ["A", "B", "C"] {
            let tag = order.clone();
            dispatcher.subscribe_state_any(State::Play, "catch-all", move |_buf| {
                let tag = tag.clone();
                async move {
                    tag.lock().unwrap().push(label);
                    Ok(())
                }
            });
        }

        let spawn_entity = SpawnEntity {
            entity_id: 1,
            entity_uuid: Uuid::nil(),
            entity_type: 0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            pitch: mc_protocol::Angle(0),
            yaw: mc_protocol::Angle(0),
            head_yaw: mc_protocol::Angle(0),
            data: 0,
            velocity_x: 0,
            velocity_y: 0,
            velocity_z: 0,
        };
        let entity_velocity = EntityVelocity {
            entity_id: 1,
            velocity_x: 1,
            velocity_y: 1,
            velocity_z: 1,
        };
        let keep_alive = KeepAlive { keep_alive_id: 99 };

        dispatcher.dispatch(State::Play, BundleDelimiter::ID, &[]).await; // D (open)
        dispatcher
            .dispatch(State::Play, SpawnEntity::ID, &encode_body(&spawn_entity))
            .await; // A
        dispatcher
            .dispatch(State::Play, EntityVelocity::ID, &encode_body(&entity_velocity))
            .await; // B
        dispatcher.dispatch(State::Play, BundleDelimiter::ID, &[]).await; // D (close)
        dispatcher
            .dispatch(State::Play, KeepAlive::ID, &encode_body(&keep_alive))
            .await; // C

        let recorded = order.lock().unwrap().clone();
        assert_eq!(recorded, vec!["A", "B", "C"]);
    }

    #[async_std::test]
    async fn bundle_cap_disables_bundling_for_the_session() {
        let seen = Arc::new(Mutex::new(0usize));
        let mut dispatcher = Dispatcher::with_bundle_cap(2);

        let tag = seen.clone();
        dispatcher.subscribe_state_any(State::Play, "counter", move |_buf| {
            let tag = tag.clone();
            async move {
                *tag.lock().unwrap() += 1;
                Ok(())
            }
        });

        dispatcher.dispatch(State::Play, BundleDelimiter::ID, &[]).await;
        for _ in 0..5 {
            dispatcher.dispatch(State::Play, KeepAlive::ID, &[]).await;
        }

        // Cap of 2 forces an early release partway through -- by the time
        // we're done, every packet must have reached the handler exactly
        // once, and bundling must no longer be buffering.
        assert_eq!(*seen.lock().unwrap(), 5);
        assert!(dispatcher.bundling_disabled);
    }
}
