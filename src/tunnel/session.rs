//! One tunnel's lifecycle on its own thread.

use std::io;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use super::forwarder::ForwardHandle;
use super::registry::TunnelRegistry;
use super::{PortTunnel, TunnelEvent, TunnelId};

/// Runs a started forwarding call to completion.
///
/// The session is the only writer of its entry's state after start: it
/// marks the entry active, blocks in the forwarding call, then removes the
/// entry. Events for one tunnel are therefore emitted in order.
pub struct TunnelSession {
    id: TunnelId,
    spec: PortTunnel,
    handle: Box<dyn ForwardHandle>,
    registry: TunnelRegistry,
}

impl TunnelSession {
    pub fn new(
        id: TunnelId,
        spec: PortTunnel,
        handle: Box<dyn ForwardHandle>,
        registry: TunnelRegistry,
    ) -> Self {
        Self {
            id,
            spec,
            handle,
            registry,
        }
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("pf-{}", self.id.container))
            .spawn(move || self.run())
    }

    fn run(self) {
        let Self {
            id,
            spec,
            handle,
            registry,
        } = self;

        registry.set_active(&id);
        info!(tunnel = %id, %spec, "port-forward active");
        registry.notify(TunnelEvent::Activated {
            id: id.clone(),
            spec,
        });

        let result = handle.run();
        registry.remove(&id);

        match result {
            Ok(()) => {
                info!(tunnel = %id, "port-forward stopped");
                registry.notify(TunnelEvent::Stopped { id });
            }
            Err(e) => {
                error!(tunnel = %id, error = %e, "port-forward failed");
                registry.notify(TunnelEvent::Failed {
                    id,
                    message: e.to_string(),
                });
            }
        }
    }
}
