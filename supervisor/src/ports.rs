//! Startup step 1 (spec.md §4.E): "Verify channel ports T, S, O are
//! bindable (probe bind/release)" before anything else starts, so a port
//! conflict fails fast instead of surfacing as a confusing mid-bootstrap
//! transport error from MDG, DGW or a spawned worker.

use std::net::TcpListener;

/// A configured bind address could not be probed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortProbeError {
    #[error("{address:?} is not a bindable tcp:// address")]
    Unparseable { address: String },
    #[error("port {port} ({address:?}) is already in use")]
    InUse { address: String, port: u16 },
}

/// Extracts the port from a `tcp://*:PORT` or `tcp://host:PORT` address, the
/// only two forms this workspace's `Config` ever produces.
fn extract_port(address: &str) -> Option<u16> {
    address.rsplit_once(':').and_then(|(_, port)| port.parse().ok())
}

/// Binds `0.0.0.0:<port>` momentarily and releases it, proving the port is
/// currently free. ZeroMQ's own bind happens later, on the real socket type
/// (PUB/ROUTER); this is a cheap preflight that fails fast on a port
/// collision before any component starts.
pub fn probe_bindable(address: &str) -> Result<(), PortProbeError> {
    let port = extract_port(address).ok_or_else(|| PortProbeError::Unparseable {
        address: address.to_string(),
    })?;
    TcpListener::bind(("0.0.0.0", port))
        .map(drop)
        .map_err(|_| PortProbeError::InUse {
            address: address.to_string(),
            port,
        })
}

/// Probes every bind address the pipeline's three channels use.
pub fn probe_all(config: &pipeline_core::Config) -> Result<(), PortProbeError> {
    probe_bindable(&config.market_bind)?;
    probe_bindable(&config.signal_bind)?;
    probe_bindable(&config.order_bind)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_port_from_wildcard_and_host_forms() {
        assert_eq!(extract_port("tcp://*:5555"), Some(5555));
        assert_eq!(extract_port("tcp://127.0.0.1:5556"), Some(5556));
    }

    #[test]
    fn unparseable_address_is_reported() {
        assert!(probe_bindable("not-an-address").is_err());
    }

    #[test]
    fn a_free_port_probes_clean_and_can_be_reused_immediately_after() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        assert!(probe_bindable(&format!("tcp://*:{port}")).is_ok());
    }

    #[test]
    fn a_held_port_is_reported_as_in_use() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let result = probe_bindable(&format!("tcp://*:{port}"));
        assert!(matches!(result, Err(PortProbeError::InUse { .. })));
        drop(listener);
    }
}
