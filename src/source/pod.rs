//! Pod rows.

use chrono::Utc;

use super::resource::{Pod, PodPhase, Resource};
use super::{RenderError, Renderer};
use crate::model::{Align, Header, HeaderColumn, Row, RowEvent};
use crate::table::{ColorerFn, RowColor, default_colorer};
use crate::util::to_age;

const STATUS_COL: &str = "STATUS";

pub struct PodRenderer;

impl Renderer for PodRenderer {
    fn header(&self, _ns: &str) -> Header {
        Header::new(vec![
            HeaderColumn::new("NAMESPACE"),
            HeaderColumn::new("NAME"),
            HeaderColumn::new("READY"),
            HeaderColumn::new("RESTARTS").align(Align::Right),
            HeaderColumn::new(STATUS_COL),
            HeaderColumn::new("CPU").align(Align::Right).mx(),
            HeaderColumn::new("MEM").align(Align::Right).mx(),
            HeaderColumn::new("IP").wide(),
            HeaderColumn::new("NODE").wide(),
            HeaderColumn::new("VALID").wide(),
            HeaderColumn::new("AGE").time(),
        ])
    }

    fn render(&self, o: &Resource, _ns: &str, row: &mut Row) -> Result<(), RenderError> {
        let Resource::Pod(pod) = o else {
            return Err(RenderError::UnexpectedKind {
                expected: "pods",
                got: o.kind(),
            });
        };

        row.id = pod.path();
        row.fields = vec![
            pod.namespace.clone(),
            pod.name.clone(),
            format!("{}/{}", pod.ready, pod.containers.len()),
            pod.restarts.to_string(),
            status(pod).to_string(),
            pod.cpu_milli.map(|c| format!("{c}m")).unwrap_or_default(),
            pod.mem_bytes.map(to_mi).unwrap_or_default(),
            pod.ip.clone().unwrap_or_default(),
            pod.node.clone().unwrap_or_default(),
            diagnose(pod),
            to_age(pod.created, Utc::now()),
        ];
        Ok(())
    }

    fn colorer(&self) -> ColorerFn {
        pod_colorer
    }
}

fn to_mi(bytes: u64) -> String {
    format!("{}Mi", bytes / (1024 * 1024))
}

fn status(pod: &Pod) -> &'static str {
    match pod.phase {
        PodPhase::Pending if pod.node.is_some() => "ContainerCreating",
        PodPhase::Pending => "Pending",
        PodPhase::Running => "Running",
        PodPhase::Succeeded => "Completed",
        PodPhase::Failed => "Error",
    }
}

/// Reason a pod is unhealthy, empty if it is fine.
fn diagnose(pod: &Pod) -> String {
    let total = pod.containers.len() as u32;
    match pod.phase {
        PodPhase::Failed => "pod failed".to_string(),
        PodPhase::Running if pod.ready < total => {
            format!("container ready check failed: {} of {}", pod.ready, total)
        }
        _ => String::new(),
    }
}

/// Unhealthy pods first, then lifecycle, then diff kind.
fn pod_colorer(ns: &str, h: &Header, re: &RowEvent) -> RowColor {
    let field = |idx: Option<usize>| idx.and_then(|i| re.row.fields.get(i)).map(String::as_str);

    if field(h.valid_col_index()).is_some_and(|v| !v.is_empty()) {
        return RowColor::Error;
    }
    match field(h.index_of(STATUS_COL, true)) {
        Some("Completed") => RowColor::Completed,
        Some("Pending" | "ContainerCreating") => RowColor::Pending,
        Some("Error") => RowColor::Error,
        _ => default_colorer(ns, h, re),
    }
}
