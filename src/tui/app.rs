//! Main TUI application.

use std::io;
use std::time::Instant;

use crossterm::event::{KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::{Screen, render};
use super::state::{AppState, InputMode, PopupState};
use crate::config::Config;
use crate::source::{DataSource, SourceError};
use crate::source::resource::canonical_kind;
use crate::tunnel::{TcpForwarder, TunnelEvent, TunnelRegistry};
use crate::view::{ResourceViewer, ViewContext, ViewOutcome, start_forward, viewer_for};

/// Main TUI application.
pub struct App {
    source: Box<dyn DataSource>,
    config: Config,
    viewer: Box<dyn ResourceViewer>,
    events: EventHandler,
    registry: TunnelRegistry,
    forwarder: TcpForwarder,
    state: AppState,
    selector: AppliedSelector,
    should_quit: bool,
}

/// Label selector last handed to the data source.
#[derive(Debug, Default)]
struct AppliedSelector(Option<String>);

impl AppliedSelector {
    /// Passes `selector` to `source` if it differs from the applied one.
    /// Returns true when the source now serves a different row set.
    fn apply(
        &mut self,
        source: &mut dyn DataSource,
        selector: Option<&str>,
    ) -> Result<bool, SourceError> {
        let selector = selector.map(str::trim).filter(|s| !s.is_empty());
        if self.0.as_deref() == selector {
            return Ok(false);
        }
        source.set_label_selector(selector)?;
        self.0 = selector.map(str::to_string);
        Ok(true)
    }
}

impl App {
    /// Creates the app for the source's current kind and namespace.
    pub fn new(source: Box<dyn DataSource>, config: Config) -> Self {
        let events = EventHandler::new(config.refresh_interval());

        // Tunnel sessions report back through the UI event queue.
        let tx = events.sender();
        let registry = TunnelRegistry::new(move |ev| {
            if tx.send(Event::Tunnel(ev)).is_err() {
                debug!("event queue closed, dropping tunnel event");
            }
        });

        let mut viewer = viewer_for(source.kind(), &config);
        viewer.table_mut().set_metrics(source.has_metrics());

        Self {
            forwarder: TcpForwarder::new(config.forward.upstream_host.clone()),
            source,
            config,
            viewer,
            events,
            registry,
            state: AppState::new(),
            selector: AppliedSelector::default(),
            should_quit: false,
        }
    }

    /// Runs the TUI application.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        info!(kind = %self.source.kind(), ns = %self.source.namespace(), "starting UI");
        self.reload();

        let result = self.event_loop(&mut terminal);

        self.registry.stop_all();

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        loop {
            let tunnels = self.registry.list();
            let screen = Screen {
                viewer: self.viewer.as_ref(),
                namespace: self.source.namespace(),
                tunnels: &tunnels,
            };
            terminal.draw(|frame| render(frame, &mut self.state, &screen))?;

            match self.events.next() {
                Ok(Event::Tick) => {
                    self.state.expire_flash(Instant::now());
                    self.reload();
                }
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.on_key(key),
                Ok(Event::Key(_)) | Ok(Event::Resize(..)) => {}
                Ok(Event::Tunnel(ev)) => self.on_tunnel_event(ev),
                Err(_) => self.should_quit = true,
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Fetches a fresh snapshot into the viewer.
    fn reload(&mut self) {
        self.source.refresh(self.viewer.table_mut());
        self.viewer.refresh_actions();
        self.report_table_error();
    }

    fn report_table_error(&mut self) {
        if let Some(err) = self.viewer.table_mut().take_error() {
            self.state.error(err);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match handle_key(&mut self.state, self.viewer.table_mut(), key) {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Dispatch(binding) => {
                let ctx = ViewContext {
                    source: self.source.as_ref(),
                    config: &self.config,
                };
                match self.viewer.dispatch(binding, &ctx) {
                    None => {}
                    Some(Ok(outcome)) => self.apply_outcome(outcome),
                    Some(Err(e)) => {
                        warn!(key = %binding, error = %e, "view action failed");
                        self.state.error(e.to_string());
                    }
                }
            }
            KeyAction::FilterChanged { commit } => self.apply_selector(commit),
            KeyAction::StartForward => self.start_forward(),
            KeyAction::StopTunnel(index) => self.stop_tunnel(index),
        }
        self.report_table_error();
    }

    fn apply_outcome(&mut self, outcome: ViewOutcome) {
        match outcome {
            ViewOutcome::Done => {}
            ViewOutcome::Flash(msg) => self.state.info(msg),
            ViewOutcome::StartFilter => self.state.input_mode = InputMode::Filter,
            ViewOutcome::ShowTunnels => self.state.popup = PopupState::Tunnels { selected: 0 },
            ViewOutcome::OpenPortForward(dialog) => {
                self.state.popup = PopupState::PortForward(dialog)
            }
            ViewOutcome::Goto(kind) => self.switch_kind(&kind),
        }
    }

    /// Hands a changed label query to the source. Other queries filter the
    /// current snapshot only. Partial selectors are reported once the query
    /// is committed.
    fn apply_selector(&mut self, commit: bool) {
        let selector = self.viewer.table().label_selector().map(str::to_string);
        match self.selector.apply(self.source.as_mut(), selector.as_deref()) {
            Ok(true) => self.reload(),
            Ok(false) => {}
            Err(e) if commit => self.state.error(e.to_string()),
            Err(e) => debug!(error = %e, "incomplete label selector"),
        }
    }

    fn switch_kind(&mut self, alias: &str) {
        let Some(kind) = canonical_kind(alias) else {
            self.state.error(format!("unknown resource kind {alias:?}"));
            return;
        };
        if let Err(e) = self.source.set_kind(kind) {
            self.state.error(e.to_string());
            return;
        }
        if let Err(e) = self.selector.apply(self.source.as_mut(), None) {
            debug!(error = %e, "clearing label selector failed");
        }
        info!(kind, "switching view");
        self.viewer = viewer_for(kind, &self.config);
        self.viewer.table_mut().set_metrics(self.source.has_metrics());
        self.state.input_mode = InputMode::Normal;
        self.reload();
    }

    fn start_forward(&mut self) {
        let PopupState::PortForward(dialog) = std::mem::take(&mut self.state.popup) else {
            return;
        };
        match start_forward(&self.registry, &self.forwarder, &dialog) {
            Ok(id) => self.state.info(format!("Starting port-forward on {id}")),
            Err(e) => self.state.error(e.to_string()),
        }
    }

    fn stop_tunnel(&mut self, index: usize) {
        let Some(tunnel) = self.registry.list().into_iter().nth(index) else {
            return;
        };
        match self.registry.stop(&tunnel.id) {
            Ok(()) => self.state.info(format!("Stopping port-forward {}", tunnel.id)),
            Err(e) => self.state.error(e.to_string()),
        }
    }

    fn on_tunnel_event(&mut self, ev: TunnelEvent) {
        match ev {
            TunnelEvent::Activated { id, spec } => {
                self.state
                    .info(format!("PortForward activated {id} on {}", spec.local_addr()));
            }
            // A clean close is silent.
            TunnelEvent::Stopped { id } => debug!(tunnel = %id, "port-forward closed"),
            TunnelEvent::Failed { id, message } => {
                self.state
                    .error(format!("PortForward failed for {id}: {message}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    use crate::model::TableData;
    use crate::source::resource::Resource;
    use crate::source::{MockCluster, TableListener};
    use crate::table::TableController;

    /// Counts snapshot fetches of the wrapped source.
    struct CountingSource {
        inner: MockCluster,
        refreshes: usize,
    }

    impl DataSource for CountingSource {
        fn kind(&self) -> &str {
            self.inner.kind()
        }

        fn namespace(&self) -> &str {
            self.inner.namespace()
        }

        fn has_metrics(&self) -> bool {
            self.inner.has_metrics()
        }

        fn set_kind(&mut self, kind: &str) -> Result<(), SourceError> {
            self.inner.set_kind(kind)
        }

        fn set_namespace(&mut self, ns: &str) {
            self.inner.set_namespace(ns)
        }

        fn set_label_selector(&mut self, selector: Option<&str>) -> Result<(), SourceError> {
            self.inner.set_label_selector(selector)
        }

        fn peek(&self) -> TableData {
            self.inner.peek()
        }

        fn refresh(&mut self, listener: &mut dyn TableListener) {
            self.refreshes += 1;
            self.inner.refresh(listener)
        }

        fn get(
            &self,
            kind: &str,
            path: &str,
            selector: Option<&str>,
        ) -> Result<Resource, SourceError> {
            self.inner.get(kind, path, selector)
        }
    }

    fn counting() -> CountingSource {
        CountingSource {
            inner: MockCluster::typical_cluster().with_churn(true),
            refreshes: 0,
        }
    }

    /// Feeds `text` to the filter prompt, syncing the selector the way the
    /// app does after each key.
    fn type_query(
        text: &str,
        source: &mut CountingSource,
        table: &mut TableController,
        applied: &mut AppliedSelector,
    ) {
        let mut state = AppState::new();
        state.input_mode = InputMode::Filter;
        table.activate_filter();
        for c in text.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            if let KeyAction::FilterChanged { .. } = handle_key(&mut state, table, key) {
                if matches!(applied.apply(source, table.label_selector()), Ok(true)) {
                    source.refresh(table);
                }
            }
        }
    }

    #[test]
    fn test_regex_typing_does_not_refetch() {
        let mut source = counting();
        let mut table = TableController::new("pods");
        let mut applied = AppliedSelector::default();
        source.refresh(&mut table);
        let rows = table.data().len();

        type_query("apiserver", &mut source, &mut table, &mut applied);

        assert_eq!(source.refreshes, 1);
        assert_eq!(table.data().len(), rows);
        assert_eq!(table.query(), "apiserver");
    }

    #[test]
    fn test_fuzzy_typing_does_not_refetch() {
        let mut source = counting();
        let mut table = TableController::new("pods");
        let mut applied = AppliedSelector::default();
        source.refresh(&mut table);

        type_query("-f ngx", &mut source, &mut table, &mut applied);

        assert_eq!(source.refreshes, 1);
    }

    #[test]
    fn test_selector_applied_only_when_changed() {
        let mut source = counting();
        let mut applied = AppliedSelector::default();

        assert!(!applied.apply(&mut source, None).unwrap());
        assert!(!applied.apply(&mut source, Some("  ")).unwrap());
        assert!(applied.apply(&mut source, Some("app=api")).unwrap());
        assert!(!applied.apply(&mut source, Some("app=api ")).unwrap());
        assert!(applied.apply(&mut source, Some("app=nginx")).unwrap());
        assert!(applied.apply(&mut source, None).unwrap());
        assert!(!applied.apply(&mut source, None).unwrap());
        assert_eq!(source.refreshes, 0);
    }
}
