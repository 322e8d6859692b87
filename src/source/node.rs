//! Node rows.

use chrono::Utc;

use super::resource::Resource;
use super::{RenderError, Renderer};
use crate::model::{Align, Header, HeaderColumn, Row};
use crate::util::to_age;

pub struct NodeRenderer;

impl Renderer for NodeRenderer {
    fn header(&self, _ns: &str) -> Header {
        Header::new(vec![
            HeaderColumn::new("NAME"),
            HeaderColumn::new("STATUS"),
            HeaderColumn::new("ROLES"),
            HeaderColumn::new("VERSION"),
            HeaderColumn::new("CPU").align(Align::Right).mx(),
            HeaderColumn::new("MEM").align(Align::Right).mx(),
            HeaderColumn::new("LABELS").wide(),
            HeaderColumn::new("VALID").wide(),
            HeaderColumn::new("AGE").time(),
        ])
    }

    fn render(&self, o: &Resource, _ns: &str, row: &mut Row) -> Result<(), RenderError> {
        let Resource::Node(node) = o else {
            return Err(RenderError::UnexpectedKind {
                expected: "nodes",
                got: o.kind(),
            });
        };

        let roles = if node.roles.is_empty() {
            "<none>".to_string()
        } else {
            node.roles.join(",")
        };
        let labels = node
            .labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");

        row.id = node.name.clone();
        row.fields = vec![
            node.name.clone(),
            if node.ready { "Ready" } else { "NotReady" }.to_string(),
            roles,
            node.version.clone(),
            node.cpu_milli.map(|c| format!("{c}m")).unwrap_or_default(),
            node.mem_bytes
                .map(|b| format!("{}Mi", b / (1024 * 1024)))
                .unwrap_or_default(),
            labels,
            if node.ready { "" } else { "node not ready" }.to_string(),
            to_age(node.created, Utc::now()),
        ];
        Ok(())
    }
}
