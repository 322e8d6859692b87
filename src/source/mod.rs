//! Data source contract and the per-kind row renderers.
//!
//! A [`DataSource`] produces [`TableData`] snapshots for one resource kind
//! and scope and pushes them to a [`TableListener`]. Rows are built by a
//! per-kind [`Renderer`]. [`MockCluster`] is an in-memory source with
//! simulated churn.

mod mock;
mod node;
mod pod;
pub mod resource;

pub use mock::MockCluster;
pub use node::NodeRenderer;
pub use pod::PodRenderer;
pub use resource::{LabelSelector, Node, NODE_KIND, POD_KIND, Pod, PodPhase, Resource};

use crate::model::{Header, Row, TableData};
use crate::table::{ColorerFn, default_colorer};

/// Errors raised by a data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unknown resource kind {0:?}")]
    UnknownKind(String),
    #[error("{kind} {path:?} not found")]
    NotFound { kind: String, path: String },
    #[error("invalid label selector {0:?}")]
    InvalidSelector(String),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors raised while turning an object into a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("expecting {expected} but got {got}")]
    UnexpectedKind {
        expected: &'static str,
        got: &'static str,
    },
}

/// Receives snapshots from a data source.
pub trait TableListener {
    fn table_data_changed(&mut self, data: TableData);
    fn table_load_failed(&mut self, err: &SourceError);
}

/// Builds rows for one resource kind.
pub trait Renderer {
    fn header(&self, ns: &str) -> Header;

    /// Fills `row` from `o`. Fails if `o` is of another kind.
    fn render(&self, o: &Resource, ns: &str, row: &mut Row) -> Result<(), RenderError>;

    fn colorer(&self) -> ColorerFn {
        default_colorer
    }
}

/// Returns the renderer for a canonical kind.
pub fn renderer_for(kind: &str) -> Option<&'static dyn Renderer> {
    match kind {
        POD_KIND => Some(&PodRenderer),
        NODE_KIND => Some(&NodeRenderer),
        _ => None,
    }
}

/// Live source of table snapshots.
pub trait DataSource {
    /// Canonical kind currently served.
    fn kind(&self) -> &str;

    /// Scope of the served snapshots: a namespace, `all` or `-`.
    fn namespace(&self) -> &str;

    /// True when rows from every namespace are served.
    fn cluster_wide(&self) -> bool {
        crate::model::scope::is_all_namespaces(self.namespace())
    }

    fn has_metrics(&self) -> bool;

    fn set_kind(&mut self, kind: &str) -> Result<(), SourceError>;

    fn set_namespace(&mut self, ns: &str);

    /// Restricts rows to those matching `selector`; `None` clears it.
    fn set_label_selector(&mut self, selector: Option<&str>) -> Result<(), SourceError>;

    /// Latest snapshot, without fetching.
    fn peek(&self) -> TableData;

    /// Fetches a fresh snapshot and hands it to `listener`.
    fn refresh(&mut self, listener: &mut dyn TableListener);

    /// Looks up a single object.
    fn get(&self, kind: &str, path: &str, selector: Option<&str>)
    -> Result<Resource, SourceError>;
}
