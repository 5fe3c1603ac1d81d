use crate::TransportError;
use pipeline_model::{wire, ORequest, OResponse};
use std::fmt;

/// OEG's side of channel O: a REQ socket connecting to the DGW replier.
///
/// Each [`Self::request`] call opens a fresh REQ socket rather than reusing
/// one across calls. `libzmq`'s REQ socket enforces a strict
/// send-then-receive state machine; a socket that times out waiting for a
/// reply cannot safely be reused for a subsequent send without extra
/// bookkeeping. Opening a short-lived socket per request sidesteps that
/// lockout entirely and still guarantees no call blocks indefinitely, at
/// the cost of a fresh TCP handshake per call — acceptable at this
/// system's order-submission rate.
pub struct OrderRequester {
    connect_addr: String,
    timeout_ms: i32,
}

impl fmt::Debug for OrderRequester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderRequester")
            .field("connect_addr", &self.connect_addr)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl OrderRequester {
    /// `connect_addr` is the DGW replier's address (e.g. `tcp://<host>:5557`),
    /// `timeout_ms` the configured `order_request_timeout_ms` bound.
    pub fn new(connect_addr: impl Into<String>, timeout_ms: i32) -> Self {
        Self {
            connect_addr: connect_addr.into(),
            timeout_ms,
        }
    }

    /// Sends `request` and waits up to `timeout_ms` for a reply.
    /// [`TransportError::Timeout`] is the signal OEG's retry policy acts on.
    pub fn request(&self, request: &ORequest) -> Result<OResponse, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::REQ)?;
        socket.set_rcvtimeo(self.timeout_ms)?;
        socket.set_sndtimeo(self.timeout_ms)?;
        socket.set_linger(0)?;
        socket.connect(&self.connect_addr)?;

        let payload = wire::encode(request)?;
        match socket.send(payload, 0) {
            Ok(()) => {}
            Err(zmq::Error::EAGAIN) => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Zmq(e)),
        }

        let reply = match socket.recv_bytes(0) {
            Ok(bytes) => bytes,
            Err(zmq::Error::EAGAIN) => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Zmq(e)),
        };
        Ok(wire::decode(&reply)?)
    }
}

/// DGW's production side of channel O: a ROUTER socket bound at
/// `tcp://*:5557`, matched against OEG's REQ client.
///
/// Unlike [`OrderReplier`]'s REP socket, ROUTER does not force strict
/// recv/send alternation: many requests from distinct peers can be read
/// ahead of their replies being sent, and replies can be sent in any order.
/// That is the precondition for DGW's bounded handler queue and `BUSY`
/// backpressure response (spec.md §4.D) — a plain REP socket would
/// serialize one request at a time and could never observe a full queue.
pub struct OrderRouter {
    socket: zmq::Socket,
}

impl fmt::Debug for OrderRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderRouter").finish_non_exhaustive()
    }
}

impl OrderRouter {
    pub fn bind(bind_addr: &str, poll_timeout_ms: i32) -> Result<Self, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::ROUTER)?;
        socket.set_rcvtimeo(poll_timeout_ms)?;
        socket.bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Polls for the next request, returning the peer's routing identity
    /// alongside the decoded request. A timeout is the normal idle case and
    /// lets DGW's reader loop check its shutdown flag.
    pub fn recv(&self) -> Result<(Vec<u8>, ORequest), TransportError> {
        let frames = match self.socket.recv_multipart(0) {
            Ok(frames) => frames,
            Err(zmq::Error::EAGAIN) => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Zmq(e)),
        };
        let identity = frames.first().cloned().unwrap_or_default();
        let payload = frames.last().cloned().unwrap_or_default();
        Ok((identity, wire::decode(&payload)?))
    }

    /// Replies to `identity`, the routing identity a prior [`Self::recv`]
    /// returned. May be called in any order relative to other in-flight
    /// requests' replies, from any thread, as long as calls don't overlap
    /// (the socket itself still isn't safe for concurrent use).
    pub fn reply(&self, identity: &[u8], response: &OResponse) -> Result<(), TransportError> {
        let payload = wire::encode(response)?;
        self.socket
            .send_multipart([identity.to_vec(), Vec::new(), payload], 0)?;
        Ok(())
    }
}

/// A simple test double for DGW's replier, usable wherever a single-client
/// REP/REQ exchange is enough (e.g. OEG's own unit tests). Production code
/// talks to [`OrderRouter`] instead.
pub struct OrderReplier {
    socket: zmq::Socket,
}

impl fmt::Debug for OrderReplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderReplier").finish_non_exhaustive()
    }
}

impl OrderReplier {
    pub fn bind(bind_addr: &str, poll_timeout_ms: i32) -> Result<Self, TransportError> {
        let ctx = crate::new_context();
        let socket = ctx.socket(zmq::REP)?;
        socket.set_rcvtimeo(poll_timeout_ms)?;
        socket.bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Polls for the next request. A timeout here is the normal idle case
    /// and lets DGW's handler loop check its shutdown flag.
    pub fn recv(&self) -> Result<ORequest, TransportError> {
        let payload = match self.socket.recv_bytes(0) {
            Ok(bytes) => bytes,
            Err(zmq::Error::EAGAIN) => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Zmq(e)),
        };
        Ok(wire::decode(&payload)?)
    }

    /// Replies to the request most recently returned by [`Self::recv`].
    /// Must be called exactly once per successful `recv` (REP's state
    /// machine requirement).
    pub fn reply(&self, response: &OResponse) -> Result<(), TransportError> {
        let payload = wire::encode(response)?;
        self.socket.send(payload, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_model::{GetPositionsParams, HealthCheckResult};

    #[test]
    fn router_round_trips_a_request_from_a_req_client() {
        let bind = "tcp://127.0.0.1:17661";
        let router = OrderRouter::bind(bind, 200).unwrap();
        let requester = OrderRequester::new(bind, 1_000);

        let server = std::thread::spawn(move || {
            let (identity, request) = router.recv().unwrap();
            assert_eq!(request, ORequest::HealthCheck);
            router
                .reply(
                    &identity,
                    &OResponse::HealthCheck(HealthCheckResult {
                        ok: true,
                        broker_connected: true,
                        uptime_secs: 7,
                    }),
                )
                .unwrap();
        });

        let response = requester.request(&ORequest::HealthCheck).unwrap();
        assert_eq!(
            response,
            OResponse::HealthCheck(HealthCheckResult {
                ok: true,
                broker_connected: true,
                uptime_secs: 7
            })
        );
        server.join().unwrap();
    }

    #[test]
    fn router_serves_two_peers_read_ahead_of_their_replies() {
        let bind = "tcp://127.0.0.1:17662";
        let router = OrderRouter::bind(bind, 200).unwrap();
        let a = OrderRequester::new(bind, 2_000);
        let b = OrderRequester::new(bind, 2_000);

        let client_a = std::thread::spawn(move || {
            a.request(&ORequest::GetPositions(GetPositionsParams {
                account: "ACC-A".into(),
                symbol: None,
            }))
        });
        let client_b = std::thread::spawn(move || {
            b.request(&ORequest::GetPositions(GetPositionsParams {
                account: "ACC-B".into(),
                symbol: None,
            }))
        });

        // Read both requests off the wire before replying to either —
        // exactly what a plain REP socket cannot do.
        let (id1, req1) = loop {
            match router.recv() {
                Ok(v) => break v,
                Err(TransportError::Timeout) => continue,
                Err(e) => panic!("{e}"),
            }
        };
        let (id2, req2) = loop {
            match router.recv() {
                Ok(v) => break v,
                Err(TransportError::Timeout) => continue,
                Err(e) => panic!("{e}"),
            }
        };
        assert_ne!(req1, req2);

        router.reply(&id2, &OResponse::GetPositions(Vec::new())).unwrap();
        router.reply(&id1, &OResponse::GetPositions(Vec::new())).unwrap();

        assert!(client_a.join().unwrap().is_ok());
        assert!(client_b.join().unwrap().is_ok());
    }
}
