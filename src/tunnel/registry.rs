//! Tunnel registry: at most one tunnel per identity.

use std::collections::HashMap;
use std::fmt;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::forwarder::{Forwarder, StopSignal};
use super::session::TunnelSession;
use super::{PortTunnel, TunnelError, TunnelEvent, TunnelId, TunnelState};

/// Receives tunnel lifecycle events, typically by queueing them for the
/// UI loop.
pub type Notifier = Arc<dyn Fn(TunnelEvent) + Send + Sync>;

struct Entry {
    spec: PortTunnel,
    state: TunnelState,
    started_at: DateTime<Local>,
    stop: StopSignal,
}

/// Snapshot of a registry entry for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelInfo {
    pub id: TunnelId,
    pub spec: PortTunnel,
    pub state: TunnelState,
    pub started_at: DateTime<Local>,
}

/// Shared registry of running tunnels. Cloning shares the same map.
#[derive(Clone)]
pub struct TunnelRegistry {
    entries: Arc<Mutex<HashMap<TunnelId, Entry>>>,
    notify: Notifier,
}

impl fmt::Debug for TunnelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelRegistry")
            .field("tunnels", &self.len())
            .finish()
    }
}

impl Default for TunnelRegistry {
    fn default() -> Self {
        Self::new(|_| {})
    }
}

impl TunnelRegistry {
    pub fn new(notify: impl Fn(TunnelEvent) + Send + Sync + 'static) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(notify),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TunnelId, Entry>> {
        // A panicking session cannot leave an entry half-written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a tunnel for `id`.
    ///
    /// The local port is probed first; an unavailable port or an identity
    /// that already has a tunnel fails without touching the registry. On
    /// success the forwarding call runs on its own session thread.
    pub fn start(
        &self,
        forwarder: &dyn Forwarder,
        id: TunnelId,
        spec: PortTunnel,
    ) -> Result<(), TunnelError> {
        probe(&spec)?;

        if self.contains(&id) {
            warn!(tunnel = %id, "port-forward already active");
            return Err(TunnelError::AlreadyActive(id));
        }

        // The provider may be slow; the map stays unlocked meanwhile.
        let handle = forwarder.start(&id, &spec)?;

        {
            let mut entries = self.lock();
            if entries.contains_key(&id) {
                warn!(tunnel = %id, "port-forward started concurrently, dropping");
                return Err(TunnelError::AlreadyActive(id));
            }
            entries.insert(
                id.clone(),
                Entry {
                    spec: spec.clone(),
                    state: TunnelState::Starting,
                    started_at: Local::now(),
                    stop: handle.stopper(),
                },
            );
        }

        info!(tunnel = %id, %spec, "starting port-forward");
        let session = TunnelSession::new(id.clone(), spec, handle, self.clone());
        if let Err(e) = session.spawn() {
            self.remove(&id);
            return Err(TunnelError::Io(e));
        }
        Ok(())
    }

    /// Stops the tunnel for `id`. The entry disappears once its forwarding
    /// call has returned.
    pub fn stop(&self, id: &TunnelId) -> Result<(), TunnelError> {
        let mut entries = self.lock();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| TunnelError::NotFound(id.clone()))?;
        entry.state = TunnelState::Stopping;
        entry.stop.stop();
        debug!(tunnel = %id, "stop requested");
        Ok(())
    }

    /// Stops every tunnel.
    pub fn stop_all(&self) {
        let mut entries = self.lock();
        if !entries.is_empty() {
            info!(count = entries.len(), "stopping all port-forwards");
        }
        for entry in entries.values_mut() {
            entry.state = TunnelState::Stopping;
            entry.stop.stop();
        }
    }

    /// Tunnels sorted by identity.
    pub fn list(&self) -> Vec<TunnelInfo> {
        let mut tunnels: Vec<TunnelInfo> = self
            .lock()
            .iter()
            .map(|(id, e)| TunnelInfo {
                id: id.clone(),
                spec: e.spec.clone(),
                state: e.state,
                started_at: e.started_at,
            })
            .collect();
        tunnels.sort_by(|a, b| a.id.cmp(&b.id));
        tunnels
    }

    pub fn contains(&self, id: &TunnelId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn state(&self, id: &TunnelId) -> Option<TunnelState> {
        self.lock().get(id).map(|e| e.state)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Marks `id` active unless a stop was already requested.
    pub(super) fn set_active(&self, id: &TunnelId) {
        if let Some(entry) = self.lock().get_mut(id) {
            if entry.state == TunnelState::Starting {
                entry.state = TunnelState::Active;
            }
        }
    }

    pub(super) fn remove(&self, id: &TunnelId) {
        self.lock().remove(id);
    }

    pub(super) fn notify(&self, event: TunnelEvent) {
        (self.notify)(event);
    }
}

/// Binds and immediately releases the local address of `spec`.
fn probe(spec: &PortTunnel) -> Result<(), TunnelError> {
    match TcpListener::bind((spec.address.as_str(), spec.local_port)) {
        Ok(_listener) => Ok(()),
        Err(source) => {
            warn!(addr = %spec.local_addr(), error = %source, "local port unavailable");
            Err(TunnelError::PortUnavailable {
                addr: spec.local_addr(),
                source,
            })
        }
    }
}
