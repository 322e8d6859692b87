//! In-memory cluster with deterministic churn.
//!
//! Serves pods and nodes through [`DataSource`], computing row deltas
//! against the previous snapshot the way a watch-backed source would.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error};

use super::resource::{
    LabelSelector, NODE_KIND, Node, POD_KIND, Pod, PodPhase, Resource, canonical_kind,
    is_cluster_scoped_kind,
};
use super::{DataSource, Renderer, SourceError, TableListener, renderer_for};
use crate::model::scope::{self, CLUSTER_SCOPE, NAMESPACE_ALL};
use crate::model::{Row, RowEvent, TableData};
use crate::tunnel::{Container, ContainerPort, Protocol};

/// Simulated cluster.
#[derive(Debug, Clone)]
pub struct MockCluster {
    pods: Vec<Pod>,
    nodes: Vec<Node>,
    kind: &'static str,
    namespace: String,
    selector: LabelSelector,
    metrics: bool,
    churn: bool,
    step: u64,
    /// Rows of the last snapshot by ID, for delta computation.
    previous: HashMap<String, Row>,
    latest: TableData,
}

impl MockCluster {
    pub fn new(pods: Vec<Pod>, nodes: Vec<Node>) -> Self {
        Self {
            pods,
            nodes,
            kind: POD_KIND,
            namespace: NAMESPACE_ALL.to_string(),
            selector: LabelSelector::default(),
            metrics: true,
            churn: false,
            step: 0,
            previous: HashMap::new(),
            latest: TableData::default(),
        }
    }

    /// Enables or disables CPU/MEM readings.
    pub fn with_metrics(mut self, metrics: bool) -> Self {
        self.metrics = metrics;
        if !metrics {
            self.strip_metrics();
        }
        self
    }

    /// Advances the simulation on every refresh.
    pub fn with_churn(mut self, churn: bool) -> Self {
        self.churn = churn;
        self
    }

    /// A small cluster: two namespaces, a few workloads, three nodes.
    pub fn typical_cluster() -> Self {
        let now = Utc::now();
        let ago = |minutes: i64| Some(now - TimeDelta::minutes(minutes));

        let nodes = vec![
            node("control-plane-1", &["control-plane"], ago(60 * 24 * 40), 850, 2900),
            node("worker-1", &[], ago(60 * 24 * 12), 1430, 6100),
            node("worker-2", &[], ago(60 * 24 * 12), 610, 3300),
        ];

        let pods = vec![
            pod("default", "nginx-7c5ddbdf54-x8f9q", "worker-1", ago(95))
                .labels(&[("app", "nginx"), ("tier", "frontend")])
                .container("nginx", &[("http", 80), ("https", 443)])
                .usage(12, 48),
            pod("default", "api-6d8f7b9c4-k2m4n", "worker-2", ago(60 * 26))
                .labels(&[("app", "api"), ("tier", "backend")])
                .container("api", &[("http", 8080)])
                .container("envoy", &[("admin", 9901)])
                .usage(180, 256),
            pod("default", "redis-0", "worker-1", ago(60 * 24 * 3))
                .labels(&[("app", "redis"), ("tier", "backend")])
                .container("redis", &[("", 6379)])
                .usage(40, 96),
            pod("default", "migrate-28461230-zq7xv", "worker-2", ago(7))
                .labels(&[("job-name", "migrate")])
                .container("migrate", &[])
                .phase(PodPhase::Succeeded, 0),
            pod("kube-system", "coredns-5d78c9869d-9xk2l", "control-plane-1", ago(60 * 24 * 40))
                .labels(&[("k8s-app", "kube-dns")])
                .container_udp("coredns", &[("dns", 53)])
                .usage(3, 18),
            pod("kube-system", "metrics-server-6d94bc8694-tl7wz", "worker-1", ago(60 * 24 * 12))
                .labels(&[("k8s-app", "metrics-server")])
                .container("metrics-server", &[("https", 10250)])
                .usage(5, 22),
        ]
        .into_iter()
        .map(PodBuilder::build)
        .collect();

        Self::new(pods, nodes)
    }

    fn strip_metrics(&mut self) {
        for p in &mut self.pods {
            p.cpu_milli = None;
            p.mem_bytes = None;
        }
        for n in &mut self.nodes {
            n.cpu_milli = None;
            n.mem_bytes = None;
        }
    }

    /// Moves the simulation one step forward.
    pub fn advance(&mut self) {
        self.step += 1;
        let step = self.step;
        let now = Utc::now();

        if self.metrics {
            for (i, p) in self.pods.iter_mut().enumerate() {
                if let Some(cpu) = p.cpu_milli.as_mut() {
                    let wobble = (step * 37 + i as u64 * 11) % 40;
                    *cpu = (*cpu / 10) * 10 + wobble;
                }
            }
        }

        // redis restarts every third step.
        if step % 3 == 0 {
            if let Some(p) = self.pods.iter_mut().find(|p| p.name == "redis-0") {
                p.restarts += 1;
            }
        }

        // The api pod flaps between ready and not ready.
        if let Some(p) = self.pods.iter_mut().find(|p| p.name.starts_with("api-")) {
            let total = p.containers.len() as u32;
            p.ready = if step % 4 == 2 { total - 1 } else { total };
        }

        // A backup job every fifth step: pending, running, then completed.
        for p in self.pods.iter_mut().filter(|p| p.name.starts_with("backup-")) {
            p.phase = match p.phase {
                PodPhase::Pending => {
                    p.ready = 1;
                    p.ip = Some(format!("10.244.1.{}", 100 + step % 100));
                    PodPhase::Running
                }
                PodPhase::Running => {
                    p.ready = 0;
                    PodPhase::Succeeded
                }
                other => other,
            };
        }
        if step % 5 == 0 {
            let job = pod("default", &format!("backup-{step}"), "worker-2", Some(now))
                .labels(&[("job-name", "backup")])
                .container("backup", &[])
                .phase(PodPhase::Pending, 0)
                .build();
            self.pods.push(job);
            // Keep the two most recent backups.
            let mut backups = self.pods.iter().filter(|p| p.name.starts_with("backup-")).count();
            self.pods.retain(|p| {
                if backups > 2 && p.name.starts_with("backup-") {
                    backups -= 1;
                    return false;
                }
                true
            });
        }
        debug!(step, pods = self.pods.len(), "simulated cluster advanced");
    }

    fn resources(&self) -> Vec<Resource> {
        if self.kind == NODE_KIND {
            return self
                .nodes
                .iter()
                .filter(|n| self.selector.matches(&n.labels))
                .cloned()
                .map(Resource::Node)
                .collect();
        }

        let all = scope::is_all_namespaces(&self.namespace);
        self.pods
            .iter()
            .filter(|p| all || p.namespace == self.namespace)
            .filter(|p| self.selector.matches(&p.labels))
            .cloned()
            .map(Resource::Pod)
            .collect()
    }

    fn snapshot(&mut self) -> Result<TableData, SourceError> {
        let renderer: &dyn Renderer =
            renderer_for(self.kind).ok_or_else(|| SourceError::UnknownKind(self.kind.into()))?;
        let ns = self.namespace().to_string();

        let mut rows = Vec::new();
        for o in self.resources() {
            let mut row = Row::default();
            if let Err(e) = renderer.render(&o, &ns, &mut row) {
                error!(kind = self.kind, path = %o.path(), error = %e, "render failed, row omitted");
                continue;
            }
            rows.push(row);
        }

        let header = renderer.header(&ns);
        let events: Vec<RowEvent> = rows
            .iter()
            .map(|row| RowEvent::diff(&header, self.previous.get(&row.id), row.clone()))
            .collect();
        self.previous = rows.into_iter().map(|r| (r.id.clone(), r)).collect();

        Ok(TableData::new(header, events, ns))
    }
}

impl DataSource for MockCluster {
    fn kind(&self) -> &str {
        self.kind
    }

    fn namespace(&self) -> &str {
        if is_cluster_scoped_kind(self.kind) {
            return CLUSTER_SCOPE;
        }
        &self.namespace
    }

    fn has_metrics(&self) -> bool {
        self.metrics
    }

    fn set_kind(&mut self, kind: &str) -> Result<(), SourceError> {
        let kind = canonical_kind(kind).ok_or_else(|| SourceError::UnknownKind(kind.into()))?;
        if kind != self.kind {
            self.kind = kind;
            self.selector = LabelSelector::default();
            self.previous.clear();
            self.latest = TableData::default();
        }
        Ok(())
    }

    fn set_namespace(&mut self, ns: &str) {
        let ns = if scope::is_all_namespaces(ns) { NAMESPACE_ALL } else { ns };
        if ns != self.namespace {
            self.namespace = ns.to_string();
            self.previous.clear();
        }
    }

    fn set_label_selector(&mut self, selector: Option<&str>) -> Result<(), SourceError> {
        self.selector = match selector {
            Some(sel) => LabelSelector::parse(sel)?,
            None => LabelSelector::default(),
        };
        Ok(())
    }

    fn peek(&self) -> TableData {
        self.latest.clone()
    }

    fn refresh(&mut self, listener: &mut dyn TableListener) {
        if self.churn {
            self.advance();
        }
        match self.snapshot() {
            Ok(data) => {
                self.latest = data.clone();
                listener.table_data_changed(data);
            }
            Err(e) => listener.table_load_failed(&e),
        }
    }

    fn get(
        &self,
        kind: &str,
        path: &str,
        selector: Option<&str>,
    ) -> Result<Resource, SourceError> {
        let canonical = canonical_kind(kind).ok_or_else(|| SourceError::UnknownKind(kind.into()))?;
        let selector = selector.map(LabelSelector::parse).transpose()?.unwrap_or_default();
        let not_found = || SourceError::NotFound {
            kind: canonical.to_string(),
            path: path.to_string(),
        };

        let found = match canonical {
            POD_KIND => {
                let (ns, name) = scope::namespaced(path);
                self.pods
                    .iter()
                    .find(|p| p.namespace == ns && p.name == name)
                    .cloned()
                    .map(Resource::Pod)
            }
            _ => self
                .nodes
                .iter()
                .find(|n| n.name == path)
                .cloned()
                .map(Resource::Node),
        };
        found
            .filter(|o| selector.matches(o.labels()))
            .ok_or_else(not_found)
    }
}

fn node(
    name: &str,
    roles: &[&str],
    created: Option<DateTime<Utc>>,
    cpu_milli: u64,
    mem_mi: u64,
) -> Node {
    Node {
        name: name.to_string(),
        labels: [("kubernetes.io/hostname".to_string(), name.to_string())].into(),
        ready: true,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        version: "v1.30.2".to_string(),
        cpu_milli: Some(cpu_milli),
        mem_bytes: Some(mem_mi * 1024 * 1024),
        created,
    }
}

fn pod(ns: &str, name: &str, node: &str, created: Option<DateTime<Utc>>) -> PodBuilder {
    PodBuilder(Pod {
        namespace: ns.to_string(),
        name: name.to_string(),
        labels: Default::default(),
        phase: PodPhase::Running,
        ready: 0,
        restarts: 0,
        ip: Some(format!("10.244.0.{}", name.len() * 7 % 250)),
        node: Some(node.to_string()),
        containers: Vec::new(),
        cpu_milli: None,
        mem_bytes: None,
        created,
    })
}

struct PodBuilder(Pod);

impl PodBuilder {
    fn labels(mut self, kv: &[(&str, &str)]) -> Self {
        self.0.labels = kv
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    fn container(self, name: &str, ports: &[(&str, u16)]) -> Self {
        self.add_container(name, ports, Protocol::Tcp)
    }

    fn container_udp(self, name: &str, ports: &[(&str, u16)]) -> Self {
        self.add_container(name, ports, Protocol::Udp)
    }

    fn add_container(mut self, name: &str, ports: &[(&str, u16)], protocol: Protocol) -> Self {
        self.0.containers.push(Container {
            name: name.to_string(),
            ports: ports
                .iter()
                .map(|(n, p)| ContainerPort {
                    name: n.to_string(),
                    port: *p,
                    protocol,
                })
                .collect(),
        });
        if self.0.phase == PodPhase::Running {
            self.0.ready = self.0.containers.len() as u32;
        }
        self
    }

    fn usage(mut self, cpu_milli: u64, mem_mi: u64) -> Self {
        self.0.cpu_milli = Some(cpu_milli);
        self.0.mem_bytes = Some(mem_mi * 1024 * 1024);
        self
    }

    fn phase(mut self, phase: PodPhase, ready: u32) -> Self {
        self.0.phase = phase;
        self.0.ready = ready;
        self
    }

    fn build(self) -> Pod {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiffKind;

    #[derive(Default)]
    struct Recorder {
        data: Vec<TableData>,
        errors: Vec<String>,
    }

    impl TableListener for Recorder {
        fn table_data_changed(&mut self, data: TableData) {
            self.data.push(data);
        }

        fn table_load_failed(&mut self, err: &SourceError) {
            self.errors.push(err.to_string());
        }
    }

    #[test]
    fn serves_pods_by_namespace() {
        let mut c = MockCluster::typical_cluster();
        let mut rec = Recorder::default();

        c.refresh(&mut rec);
        assert_eq!(rec.data[0].len(), 6);
        assert_eq!(rec.data[0].namespace, "all");
        assert!(c.cluster_wide());

        c.set_namespace("kube-system");
        c.refresh(&mut rec);
        assert_eq!(rec.data[1].len(), 2);
        assert_eq!(rec.data[1].namespace, "kube-system");
        assert_eq!(c.peek(), rec.data[1]);
        assert!(rec.errors.is_empty());
    }

    #[test]
    fn label_selector_filters_rows() {
        let mut c = MockCluster::typical_cluster();
        let mut rec = Recorder::default();

        c.set_label_selector(Some("tier=backend")).unwrap();
        c.refresh(&mut rec);
        let mut ids = rec.data[0].ids();
        ids.sort();
        assert_eq!(ids, vec!["default/api-6d8f7b9c4-k2m4n", "default/redis-0"]);

        assert!(c.set_label_selector(Some("=oops")).is_err());
    }

    #[test]
    fn deltas_against_previous_snapshot() {
        let mut c = MockCluster::typical_cluster();
        let mut rec = Recorder::default();

        c.refresh(&mut rec);
        assert!(rec.data[0].rows.iter().all(|re| re.kind == DiffKind::New));

        c.refresh(&mut rec);
        assert!(rec.data[1].rows.iter().all(|re| re.kind == DiffKind::Unchanged));

        // Step 3 restarts redis.
        for _ in 0..3 {
            c.advance();
        }
        c.refresh(&mut rec);
        let redis = rec.data[2].find("default/redis-0").unwrap();
        assert_eq!(redis.kind, DiffKind::Modified);
        assert_eq!(redis.deltas.get(3), Some("0"));
        assert_eq!(redis.row.fields[3], "1");
    }

    #[test]
    fn churn_adds_and_completes_jobs() {
        let mut c = MockCluster::typical_cluster();
        for _ in 0..5 {
            c.advance();
        }
        let backup = c.get("pods", "default/backup-5", None).unwrap();
        let Resource::Pod(p) = backup else {
            panic!("expected a pod");
        };
        assert_eq!(p.phase, PodPhase::Pending);

        c.advance();
        c.advance();
        let Resource::Pod(p) = c.get("po", "default/backup-5", None).unwrap() else {
            panic!("expected a pod");
        };
        assert_eq!(p.phase, PodPhase::Succeeded);

        for _ in 0..10 {
            c.advance();
        }
        let backups = c.pods.iter().filter(|p| p.name.starts_with("backup-")).count();
        assert_eq!(backups, 2);
    }

    #[test]
    fn nodes_are_cluster_scoped() {
        let mut c = MockCluster::typical_cluster();
        let mut rec = Recorder::default();
        c.set_kind("no").unwrap();
        c.refresh(&mut rec);

        assert_eq!(c.namespace(), "-");
        assert!(!c.cluster_wide());
        assert_eq!(rec.data[0].namespace, "-");
        assert_eq!(rec.data[0].len(), 3);
        assert!(c.set_kind("deployments").is_err());
    }

    #[test]
    fn get_lookups() {
        let c = MockCluster::typical_cluster();
        assert!(matches!(c.get("pods", "default/redis-0", None), Ok(Resource::Pod(_))));
        assert!(matches!(c.get("nodes", "worker-1", None), Ok(Resource::Node(_))));
        assert!(matches!(
            c.get("pods", "default/nope", None),
            Err(SourceError::NotFound { .. })
        ));
        assert!(matches!(
            c.get("pods", "default/redis-0", Some("app=nginx")),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn without_metrics() {
        let mut c = MockCluster::typical_cluster().with_metrics(false);
        let mut rec = Recorder::default();
        c.refresh(&mut rec);
        assert!(!c.has_metrics());
        let cpu = rec.data[0].header.index_of("CPU", true).unwrap();
        assert!(rec.data[0].rows.iter().all(|re| re.row.fields[cpu].is_empty()));
    }
}
