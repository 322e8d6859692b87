//! Port-forward tunnels bound to a resource/container pair.
//!
//! The [`TunnelRegistry`] holds at most one tunnel per [`TunnelId`]. Each
//! tunnel runs its blocking forwarding call on a dedicated
//! [`TunnelSession`] thread and reports lifecycle changes as
//! [`TunnelEvent`]s through the registry's notifier.

mod forwarder;
mod ports;
mod registry;
mod session;

use std::fmt;

pub use forwarder::{ForwardHandle, Forwarder, StopSignal, TcpForwarder};
pub use ports::{Container, ContainerPort, PortCandidate, Protocol, tcp_port_candidates};
pub use registry::{TunnelInfo, TunnelRegistry};
pub use session::TunnelSession;

/// Identity of a tunnel: resource path plus container name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TunnelId {
    pub path: String,
    pub container: String,
}

impl TunnelId {
    pub fn new(path: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            container: container.into(),
        }
    }
}

impl fmt::Display for TunnelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.container)
    }
}

/// Local bind and remote target of a tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortTunnel {
    pub address: String,
    pub local_port: u16,
    pub remote_port: u16,
}

impl PortTunnel {
    pub fn new(address: impl Into<String>, local_port: u16, remote_port: u16) -> Self {
        Self {
            address: address.into(),
            local_port,
            remote_port,
        }
    }

    pub fn local_addr(&self) -> String {
        format!("{}:{}", self.address, self.local_port)
    }
}

impl fmt::Display for PortTunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}->{}", self.address, self.local_port, self.remote_port)
    }
}

/// Registry-visible state of a tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelState {
    Starting,
    Active,
    /// Stop requested, forwarding call still unwinding.
    Stopping,
}

impl TunnelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TunnelState::Starting => "Starting",
            TunnelState::Active => "Active",
            TunnelState::Stopping => "Stopping",
        }
    }
}

/// Lifecycle notification, delivered in order per tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelEvent {
    Activated { id: TunnelId, spec: PortTunnel },
    /// Forwarding call returned cleanly.
    Stopped { id: TunnelId },
    Failed { id: TunnelId, message: String },
}

impl TunnelEvent {
    pub fn id(&self) -> &TunnelId {
        match self {
            TunnelEvent::Activated { id, .. }
            | TunnelEvent::Stopped { id }
            | TunnelEvent::Failed { id, .. } => id,
        }
    }
}

/// Errors raised by tunnel operations.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("port {addr} is unavailable: {source}")]
    PortUnavailable {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("a port-forward is already active on {0}")]
    AlreadyActive(TunnelId),
    #[error("no tunnel found for {0}")]
    NotFound(TunnelId),
    #[error("no tcp ports found on {0}")]
    NoTcpPorts(String),
    #[error("port-forward failed to start: {0}")]
    Start(String),
    #[error("port-forward failed: {0}")]
    Forward(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let id = TunnelId::new("default/nginx", "web");
        assert_eq!(id.to_string(), "default/nginx:web");

        let spec = PortTunnel::new("localhost", 8080, 80);
        assert_eq!(spec.local_addr(), "localhost:8080");
        assert_eq!(spec.to_string(), "localhost:8080->80");
    }

    #[test]
    fn error_messages() {
        let err = TunnelError::AlreadyActive(TunnelId::new("default/nginx", "web"));
        assert_eq!(
            err.to_string(),
            "a port-forward is already active on default/nginx:web"
        );
        let err = TunnelError::NoTcpPorts("default/nginx".into());
        assert_eq!(err.to_string(), "no tcp ports found on default/nginx");
    }
}
