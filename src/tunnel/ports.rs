//! Container port enumeration for the port-forward dialog.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PortTunnel, TunnelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

/// A port declared by a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    #[serde(default)]
    pub name: String,
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
}

impl ContainerPort {
    pub fn tcp(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            protocol: Protocol::Tcp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
}

/// A TCP port offered by the port-forward dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub container: String,
    pub port_name: String,
    pub port: u16,
}

impl PortCandidate {
    /// Tunnel spec bound to the same local port as the remote one.
    pub fn tunnel(&self, address: &str) -> PortTunnel {
        PortTunnel::new(address, self.port, self.port)
    }
}

impl fmt::Display for PortCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port_name.is_empty() {
            write!(f, "{}:{}", self.container, self.port)
        } else {
            write!(f, "{}/{}:{}", self.container, self.port_name, self.port)
        }
    }
}

/// Lists the TCP ports of `containers` in declaration order.
pub fn tcp_port_candidates(
    path: &str,
    containers: &[Container],
) -> Result<Vec<PortCandidate>, TunnelError> {
    let candidates: Vec<PortCandidate> = containers
        .iter()
        .flat_map(|co| {
            co.ports
                .iter()
                .filter(|p| p.protocol == Protocol::Tcp)
                .map(|p| PortCandidate {
                    container: co.name.clone(),
                    port_name: p.name.clone(),
                    port: p.port,
                })
        })
        .collect();

    if candidates.is_empty() {
        return Err(TunnelError::NoTcpPorts(path.to_string()));
    }
    Ok(candidates)
}
