use crate::TransportError;
use pipeline_model::{wire, TradingSignal};
use std::fmt;

/// SE's side of channel S: a PUSH socket connecting to the OEG puller.
pub struct SignalPusher {
    socket: zmq::Socket,
}

impl fmt::Debug for SignalPusher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalPusher").finish_non_exhaustive()
    }
}

impl SignalPusher {
    /// Connects a PUSH socket to `connect_addr` (e.g. `tcp://<host>:5556`)
    /// with the given send high-water-mark.
    pub fn connect(connect_addr: &str, hwm: i32) -> Result<Self, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::PUSH)?;
        socket.set_sndhwm(hwm)?;
        socket.connect(connect_addr)?;
        Ok(Self { socket })
    }

    /// Pushes `signal` as a single binary-encoded frame. Non-blocking: a
    /// full queue surfaces as [`TransportError::WouldBlock`] so the caller
    /// can drop the newest signal rather than stall.
    pub fn push(&self, signal: &TradingSignal) -> Result<(), TransportError> {
        let payload = wire::encode(signal)?;
        match self.socket.send(payload, zmq::DONTWAIT) {
            Ok(()) => Ok(()),
            Err(zmq::Error::EAGAIN) => Err(TransportError::WouldBlock),
            Err(e) => Err(TransportError::Zmq(e)),
        }
    }
}

/// OEG's side of channel S: a PULL socket bound at `tcp://*:5556`, with a
/// bounded receive timeout so the poll loop never blocks indefinitely.
pub struct SignalPuller {
    socket: zmq::Socket,
}

impl fmt::Debug for SignalPuller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalPuller").finish_non_exhaustive()
    }
}

impl SignalPuller {
    pub fn bind(bind_addr: &str, poll_timeout_ms: i32) -> Result<Self, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::PULL)?;
        socket.set_rcvtimeo(poll_timeout_ms)?;
        socket.bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Polls for the next signal, waiting up to the configured timeout.
    pub fn recv(&self) -> Result<TradingSignal, TransportError> {
        let payload = match self.socket.recv_bytes(0) {
            Ok(bytes) => bytes,
            Err(zmq::Error::EAGAIN) => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Zmq(e)),
        };
        Ok(wire::decode(&payload)?)
    }
}
