//! Port-forward support for container-bearing views.

use tracing::{info, warn};

use super::actions::{Action, BoundAction, KeyActions, KeyBinding};
use super::{ResourceViewer, ViewContext, ViewError, ViewOutcome};
use crate::source::{POD_KIND, Resource};
use crate::table::TableController;
use crate::tunnel::{
    Forwarder, PortCandidate, PortTunnel, TunnelError, TunnelId, TunnelRegistry,
    tcp_port_candidates,
};

/// Wraps a viewer and adds the `Shift+F` port-forward action.
pub struct PortForwardExtender<V> {
    inner: V,
}

impl<V: ResourceViewer> PortForwardExtender<V> {
    pub fn new(mut inner: V) -> Self {
        inner.actions_mut().add(
            KeyBinding::shift('f'),
            BoundAction::new("Port-Forward", Action::PortForward, true),
        );
        Self { inner }
    }

    /// Opens the dialog for the selected row's TCP ports.
    fn port_forward(&self, ctx: &ViewContext<'_>) -> Result<ViewOutcome, ViewError> {
        let Some(path) = self.inner.table().selected_row_id() else {
            return Ok(ViewOutcome::Done);
        };
        let kind = self.inner.kind();
        if kind != POD_KIND {
            return Err(ViewError::NotForwardable(kind.to_string()));
        }

        let Resource::Pod(pod) = ctx.source.get(kind, path, None)? else {
            return Err(ViewError::NotForwardable(kind.to_string()));
        };
        let candidates = tcp_port_candidates(path, &pod.containers)?;
        let dialog = PortForwardDialog::new(path, candidates, &ctx.config.forward.address)?;
        Ok(ViewOutcome::OpenPortForward(dialog))
    }
}

impl<V: ResourceViewer> ResourceViewer for PortForwardExtender<V> {
    fn table(&self) -> &TableController {
        self.inner.table()
    }

    fn table_mut(&mut self) -> &mut TableController {
        self.inner.table_mut()
    }

    fn actions(&self) -> &KeyActions {
        self.inner.actions()
    }

    fn actions_mut(&mut self) -> &mut KeyActions {
        self.inner.actions_mut()
    }

    fn refresh_actions(&mut self) {
        self.inner.refresh_actions();
    }

    fn handle(
        &mut self,
        action: &Action,
        ctx: &ViewContext<'_>,
    ) -> Result<ViewOutcome, ViewError> {
        match action {
            Action::PortForward => self.port_forward(ctx),
            _ => self.inner.handle(action, ctx),
        }
    }
}

/// Focused input of the port-forward dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogField {
    ContainerPort,
    Address,
    LocalPort,
}

/// Editable state of the port-forward dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortForwardDialog {
    path: String,
    candidates: Vec<PortCandidate>,
    selected: usize,
    address: String,
    local_port: String,
    field: DialogField,
}

impl PortForwardDialog {
    /// Local port defaults to the first candidate's port.
    pub fn new(
        path: &str,
        candidates: Vec<PortCandidate>,
        address: &str,
    ) -> Result<Self, TunnelError> {
        let Some(first) = candidates.first() else {
            return Err(TunnelError::NoTcpPorts(path.to_string()));
        };
        let local_port = first.port.to_string();
        Ok(Self {
            path: path.to_string(),
            candidates,
            selected: 0,
            address: address.to_string(),
            local_port,
            field: DialogField::ContainerPort,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn candidates(&self) -> &[PortCandidate] {
        &self.candidates
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn candidate(&self) -> &PortCandidate {
        &self.candidates[self.selected]
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn local_port(&self) -> &str {
        &self.local_port
    }

    pub fn field(&self) -> DialogField {
        self.field
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            DialogField::ContainerPort => DialogField::Address,
            DialogField::Address => DialogField::LocalPort,
            DialogField::LocalPort => DialogField::ContainerPort,
        };
    }

    pub fn select_up(&mut self) {
        if self.field == DialogField::ContainerPort && self.selected > 0 {
            self.selected -= 1;
            self.local_port = self.candidate().port.to_string();
        }
    }

    pub fn select_down(&mut self) {
        if self.field == DialogField::ContainerPort && self.selected + 1 < self.candidates.len() {
            self.selected += 1;
            self.local_port = self.candidate().port.to_string();
        }
    }

    pub fn input(&mut self, c: char) {
        match self.field {
            DialogField::ContainerPort => {}
            DialogField::Address if !c.is_whitespace() => self.address.push(c),
            DialogField::LocalPort if c.is_ascii_digit() && self.local_port.len() < 5 => {
                self.local_port.push(c)
            }
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.field {
            DialogField::ContainerPort => {}
            DialogField::Address => {
                self.address.pop();
            }
            DialogField::LocalPort => {
                self.local_port.pop();
            }
        }
    }

    /// Identity and spec of the tunnel the dialog describes.
    pub fn request(&self) -> Result<(TunnelId, PortTunnel), ViewError> {
        let local_port = self
            .local_port
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ViewError::InvalidPort(self.local_port.clone()))?;
        if self.address.is_empty() {
            return Err(ViewError::EmptyAddress);
        }

        let co = self.candidate();
        let mut spec = co.tunnel(&self.address);
        spec.local_port = local_port;
        Ok((TunnelId::new(&self.path, &co.container), spec))
    }
}

/// Starts the tunnel described by `dialog`.
pub fn start_forward(
    registry: &TunnelRegistry,
    forwarder: &dyn Forwarder,
    dialog: &PortForwardDialog,
) -> Result<TunnelId, ViewError> {
    let (id, spec) = dialog.request()?;
    if let Err(e) = registry.start(forwarder, id.clone(), spec.clone()) {
        warn!(tunnel = %id, %spec, error = %e, "port-forward not started");
        return Err(e.into());
    }
    info!(tunnel = %id, %spec, "port-forward requested");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::config::Config;
    use crate::source::{DataSource, MockCluster};
    use crate::tunnel::TcpForwarder;
    use crate::view::Browser;

    fn pods(ns: &str) -> (PortForwardExtender<Browser>, MockCluster) {
        let mut src = MockCluster::typical_cluster();
        src.set_kind(POD_KIND).unwrap();
        src.set_namespace(ns);
        let mut v = PortForwardExtender::new(Browser::new(POD_KIND, &Config::default()));
        src.refresh(v.table_mut());
        (v, src)
    }

    fn free_port() -> u16 {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    }

    #[test]
    fn opens_dialog_with_tcp_ports() {
        let (mut v, src) = pods("default");
        let cfg = Config::default();
        let ctx = ViewContext {
            source: &src,
            config: &cfg,
        };
        assert_eq!(v.table().selected_row_id(), Some("default/api-6d8f7b9c4-k2m4n"));

        let out = v.dispatch(KeyBinding::shift('f'), &ctx).unwrap().unwrap();
        let ViewOutcome::OpenPortForward(dialog) = out else {
            panic!("expected dialog, got {out:?}");
        };
        let offered: Vec<String> = dialog.candidates().iter().map(|c| c.to_string()).collect();
        assert_eq!(offered, vec!["api/http:8080", "envoy/admin:9901"]);
        assert_eq!(dialog.address(), "localhost");
        assert_eq!(dialog.local_port(), "8080");
    }

    #[test]
    fn udp_only_pod_has_no_tcp_ports() {
        let (mut v, src) = pods("kube-system");
        let cfg = Config::default();
        let ctx = ViewContext {
            source: &src,
            config: &cfg,
        };
        assert_eq!(
            v.table().selected_row_id(),
            Some("kube-system/coredns-5d78c9869d-9xk2l")
        );

        let err = v.handle(&Action::PortForward, &ctx).unwrap_err();
        assert!(matches!(err, ViewError::Tunnel(TunnelError::NoTcpPorts(_))));
        assert_eq!(
            err.to_string(),
            "no tcp ports found on kube-system/coredns-5d78c9869d-9xk2l"
        );
    }

    #[test]
    fn other_actions_reach_the_base_viewer() {
        let (mut v, src) = pods("default");
        let cfg = Config::default();
        let ctx = ViewContext {
            source: &src,
            config: &cfg,
        };
        v.dispatch(KeyBinding::ctrl('w'), &ctx).unwrap().unwrap();
        assert!(v.table().is_wide());
    }

    #[test]
    fn dialog_editing() {
        let candidates = vec![
            PortCandidate {
                container: "api".into(),
                port_name: "http".into(),
                port: 8080,
            },
            PortCandidate {
                container: "envoy".into(),
                port_name: "admin".into(),
                port: 9901,
            },
        ];
        let mut d = PortForwardDialog::new("default/api", candidates, "localhost").unwrap();

        d.select_down();
        assert_eq!(d.candidate().container, "envoy");
        assert_eq!(d.local_port(), "9901");
        d.select_down();
        assert_eq!(d.selected(), 1);

        d.next_field();
        d.next_field();
        assert_eq!(d.field(), DialogField::LocalPort);
        d.backspace();
        d.input('x');
        d.input('2');
        assert_eq!(d.local_port(), "9902");

        let (id, spec) = d.request().unwrap();
        assert_eq!(id, TunnelId::new("default/api", "envoy"));
        assert_eq!(spec, PortTunnel::new("localhost", 9902, 9901));

        for _ in 0..4 {
            d.backspace();
        }
        assert!(matches!(d.request(), Err(ViewError::InvalidPort(_))));
    }

    #[test]
    fn empty_candidates_are_rejected() {
        let err = PortForwardDialog::new("default/job", vec![], "localhost").unwrap_err();
        assert!(matches!(err, TunnelError::NoTcpPorts(_)));
    }

    #[test]
    fn start_forward_registers_once() {
        let registry = TunnelRegistry::default();
        let forwarder = TcpForwarder::new("127.0.0.1");
        let candidates = vec![PortCandidate {
            container: "web".into(),
            port_name: String::new(),
            port: 80,
        }];
        let mut d = PortForwardDialog::new("default/web", candidates, "127.0.0.1").unwrap();
        d.next_field();
        d.next_field();
        d.backspace();
        d.backspace();
        for c in free_port().to_string().chars() {
            d.input(c);
        }

        let id = start_forward(&registry, &forwarder, &d).unwrap();
        assert!(registry.contains(&id));

        for _ in 0..5 {
            d.backspace();
        }
        for c in free_port().to_string().chars() {
            d.input(c);
        }
        let err = start_forward(&registry, &forwarder, &d).unwrap_err();
        assert!(matches!(err, ViewError::Tunnel(TunnelError::AlreadyActive(_))));
        assert_eq!(registry.len(), 1);

        registry.stop_all();
    }
}
