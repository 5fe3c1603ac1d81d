use crate::{TransportError, TICK_TOPIC};
use pipeline_model::{wire, TickEvent};
use std::fmt;

/// MDG's side of channel T: a PUB socket bound to `tcp://*:<port>`.
///
/// `publish` never blocks: if the publisher's send-HWM is exceeded it
/// returns [`TransportError::WouldBlock`] and the caller is expected to drop
/// the tick and increment its own `dropped_ticks` counter.
pub struct TickPublisher {
    socket: zmq::Socket,
}

impl fmt::Debug for TickPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickPublisher").finish_non_exhaustive()
    }
}

impl TickPublisher {
    /// Binds a PUB socket at `bind_addr` (e.g. `tcp://*:5555`) with the given
    /// send high-water-mark.
    pub fn bind(bind_addr: &str, hwm: i32) -> Result<Self, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::PUB)?;
        socket.set_sndhwm(hwm)?;
        socket.bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Encodes and publishes `event` with topic `TICK`. Non-blocking: maps a
    /// full send buffer to [`TransportError::WouldBlock`] rather than
    /// stalling the caller's thread.
    pub fn publish(&self, event: &TickEvent) -> Result<(), TransportError> {
        let (topic, payload) = wire::encode_frame(TICK_TOPIC, event)?;
        match self
            .socket
            .send_multipart([topic, payload], zmq::DONTWAIT)
        {
            Ok(()) => Ok(()),
            Err(zmq::Error::EAGAIN) => Err(TransportError::WouldBlock),
            Err(e) => Err(TransportError::Zmq(e)),
        }
    }
}

/// SE's side of channel T: a SUB socket connected to the MDG publisher,
/// subscribed to the `TICK` topic, with a bounded receive timeout so the
/// Strategy Engine's poll loop never blocks indefinitely.
pub struct TickSubscriber {
    socket: zmq::Socket,
}

impl fmt::Debug for TickSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickSubscriber").finish_non_exhaustive()
    }
}

impl TickSubscriber {
    /// Connects a SUB socket to `connect_addr` (e.g. `tcp://<host>:5555`)
    /// with a `poll_timeout_ms` applied to every [`Self::recv`] call.
    pub fn connect(connect_addr: &str, poll_timeout_ms: i32) -> Result<Self, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::SUB)?;
        socket.set_rcvtimeo(poll_timeout_ms)?;
        socket.connect(connect_addr)?;
        socket.set_subscribe(TICK_TOPIC.as_bytes())?;
        Ok(Self { socket })
    }

    /// Polls for the next tick, waiting up to the configured timeout.
    /// Returns [`TransportError::Timeout`] on an empty poll window — this is
    /// the normal, expected outcome of most poll iterations, not an error
    /// condition a caller should log loudly.
    pub fn recv(&self) -> Result<TickEvent, TransportError> {
        let frames = match self.socket.recv_multipart(0) {
            Ok(frames) => frames,
            Err(zmq::Error::EAGAIN) => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Zmq(e)),
        };
        let [topic, payload] = <[Vec<u8>; 2]>::try_from(frames).map_err(|_| {
            TransportError::Codec(pipeline_model::wire::CodecError::UnexpectedTopic {
                expected: TICK_TOPIC.to_string(),
                actual: "<malformed frame>".to_string(),
            })
        })?;
        Ok(wire::decode_frame(TICK_TOPIC, &topic, &payload)?)
    }
}
