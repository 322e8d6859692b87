//! Forwarding provider contract and a plain TCP forwarder.

use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{PortTunnel, TunnelError, TunnelId};

/// Starts forwarding calls.
pub trait Forwarder: Send + Sync {
    /// Prepares a tunnel. The returned handle does the blocking work.
    fn start(&self, id: &TunnelId, spec: &PortTunnel)
    -> Result<Box<dyn ForwardHandle>, TunnelError>;
}

/// A started forwarding call.
pub trait ForwardHandle: Send {
    /// Forwards until the peer goes away, an error occurs or a stop is
    /// signaled. Blocks the calling thread.
    fn run(self: Box<Self>) -> Result<(), TunnelError>;

    /// Signal that makes [`ForwardHandle::run`] return.
    fn stopper(&self) -> StopSignal;
}

/// Cloneable stop switch shared between a registry entry and its handle.
#[derive(Debug, Clone)]
pub struct StopSignal(Arc<watch::Sender<bool>>);

impl StopSignal {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self(Arc::new(tx)), rx)
    }

    pub fn stop(&self) {
        self.0.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}

/// Accepts local TCP connections and pipes each one to
/// `upstream_host:remote_port`.
#[derive(Debug, Clone)]
pub struct TcpForwarder {
    upstream_host: String,
}

impl TcpForwarder {
    pub fn new(upstream_host: impl Into<String>) -> Self {
        Self {
            upstream_host: upstream_host.into(),
        }
    }
}

impl Forwarder for TcpForwarder {
    fn start(
        &self,
        id: &TunnelId,
        spec: &PortTunnel,
    ) -> Result<Box<dyn ForwardHandle>, TunnelError> {
        let listener = StdTcpListener::bind((spec.address.as_str(), spec.local_port)).map_err(
            |source| TunnelError::PortUnavailable {
                addr: spec.local_addr(),
                source,
            },
        )?;
        listener.set_nonblocking(true)?;

        let upstream = format!("{}:{}", self.upstream_host, spec.remote_port);
        debug!(tunnel = %id, local = %spec.local_addr(), %upstream, "tcp forwarder bound");

        let (stop, rx) = StopSignal::new();
        Ok(Box::new(TcpForwardHandle {
            id: id.clone(),
            listener,
            upstream,
            stop,
            rx,
        }))
    }
}

struct TcpForwardHandle {
    id: TunnelId,
    listener: StdTcpListener,
    upstream: String,
    stop: StopSignal,
    rx: watch::Receiver<bool>,
}

impl ForwardHandle for TcpForwardHandle {
    fn run(self: Box<Self>) -> Result<(), TunnelError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let Self {
            id,
            listener,
            upstream,
            rx,
            ..
        } = *self;
        rt.block_on(serve(id, listener, upstream, rx))
    }

    fn stopper(&self) -> StopSignal {
        self.stop.clone()
    }
}

async fn serve(
    id: TunnelId,
    listener: StdTcpListener,
    upstream: String,
    mut stop: watch::Receiver<bool>,
) -> Result<(), TunnelError> {
    let listener = TcpListener::from_std(listener)?;
    let mut conns = JoinSet::new();

    loop {
        if *stop.borrow_and_update() {
            break;
        }
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            accepted = listener.accept() => {
                let (inbound, peer) = accepted
                    .map_err(|e| TunnelError::Forward(format!("accept failed: {e}")))?;
                debug!(tunnel = %id, %peer, "connection accepted");
                let upstream = upstream.clone();
                conns.spawn(async move { pipe(inbound, &upstream).await });
            }
            Some(joined) = conns.join_next(), if !conns.is_empty() => {
                match joined {
                    Ok(Ok((sent, received))) => debug!(tunnel = %id, sent, received, "connection closed"),
                    Ok(Err(e)) => warn!(tunnel = %id, error = %e, "connection failed"),
                    Err(e) => warn!(tunnel = %id, error = %e, "connection task aborted"),
                }
            }
        }
    }

    info!(tunnel = %id, open = conns.len(), "tcp forwarder stopping");
    conns.shutdown().await;
    Ok(())
}

async fn pipe(mut inbound: TcpStream, upstream: &str) -> std::io::Result<(u64, u64)> {
    let mut outbound = TcpStream::connect(upstream).await?;
    tokio::io::copy_bidirectional(&mut inbound, &mut outbound).await
}
