//! Domain objects served by a data source.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SourceError;
use crate::model::scope;
use crate::tunnel::Container;

pub const POD_KIND: &str = "pods";
pub const NODE_KIND: &str = "nodes";

/// Resolves a kind alias (`po`, `pod`, `pods`, ...) to its canonical name.
pub fn canonical_kind(alias: &str) -> Option<&'static str> {
    match alias.trim().to_ascii_lowercase().as_str() {
        "po" | "pod" | "pods" => Some(POD_KIND),
        "no" | "node" | "nodes" => Some(NODE_KIND),
        _ => None,
    }
}

/// Returns true for kinds without a namespace.
pub fn is_cluster_scoped_kind(kind: &str) -> bool {
    kind == NODE_KIND
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub phase: PodPhase,
    /// Ready containers.
    pub ready: u32,
    pub restarts: u32,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
    pub containers: Vec<Container>,
    /// CPU usage in millicores.
    #[serde(default)]
    pub cpu_milli: Option<u64>,
    #[serde(default)]
    pub mem_bytes: Option<u64>,
    pub created: Option<DateTime<Utc>>,
}

impl Pod {
    pub fn path(&self) -> String {
        scope::fqn(&self.namespace, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub ready: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    pub version: String,
    #[serde(default)]
    pub cpu_milli: Option<u64>,
    #[serde(default)]
    pub mem_bytes: Option<u64>,
    pub created: Option<DateTime<Utc>>,
}

/// Any object a data source can hand out.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Pod(Pod),
    Node(Node),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Pod(_) => POD_KIND,
            Resource::Node(_) => NODE_KIND,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Resource::Pod(p) => p.path(),
            Resource::Node(n) => n.name.clone(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Resource::Pod(p) => &p.namespace,
            Resource::Node(_) => scope::CLUSTER_SCOPE,
        }
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        match self {
            Resource::Pod(p) => &p.labels,
            Resource::Node(n) => &n.labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    NotExists(String),
}

/// Label selector: comma-separated `k=v`, `k==v`, `k!=v`, `k` or `!k`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector(Vec<Requirement>);

impl LabelSelector {
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let invalid = || SourceError::InvalidSelector(input.to_string());

        let mut reqs = Vec::new();
        for term in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let req = if let Some((k, v)) = term.split_once("!=") {
                Requirement::NotEquals(k.trim().to_string(), v.trim().to_string())
            } else if let Some((k, v)) = term.split_once("==").or_else(|| term.split_once('=')) {
                Requirement::Equals(k.trim().to_string(), v.trim().to_string())
            } else if let Some(k) = term.strip_prefix('!') {
                Requirement::NotExists(k.trim().to_string())
            } else {
                Requirement::Exists(term.to_string())
            };

            let key = match &req {
                Requirement::Equals(k, _)
                | Requirement::NotEquals(k, _)
                | Requirement::Exists(k)
                | Requirement::NotExists(k) => k,
            };
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(invalid());
            }
            reqs.push(req);
        }
        Ok(Self(reqs))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.0.iter().all(|req| match req {
            Requirement::Equals(k, v) => labels.get(k) == Some(v),
            Requirement::NotEquals(k, v) => labels.get(k) != Some(v),
            Requirement::Exists(k) => labels.contains_key(k),
            Requirement::NotExists(k) => !labels.contains_key(k),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(kv: &[(&str, &str)]) -> BTreeMap<String, String> {
        kv.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn kind_aliases() {
        assert_eq!(canonical_kind("po"), Some(POD_KIND));
        assert_eq!(canonical_kind(" Pods "), Some(POD_KIND));
        assert_eq!(canonical_kind("no"), Some(NODE_KIND));
        assert_eq!(canonical_kind("deploy"), None);
        assert!(is_cluster_scoped_kind(NODE_KIND));
    }

    #[test]
    fn selector_matching() {
        let l = labels(&[("app", "web"), ("tier", "frontend")]);

        assert!(LabelSelector::parse("app=web").unwrap().matches(&l));
        assert!(LabelSelector::parse("app==web, tier").unwrap().matches(&l));
        assert!(LabelSelector::parse("app!=db").unwrap().matches(&l));
        assert!(LabelSelector::parse("!canary").unwrap().matches(&l));
        assert!(!LabelSelector::parse("app=web,tier=backend").unwrap().matches(&l));
        assert!(!LabelSelector::parse("release").unwrap().matches(&l));
        assert!(LabelSelector::parse("").unwrap().is_empty());
    }

    #[test]
    fn selector_errors() {
        assert!(LabelSelector::parse("=web").is_err());
        assert!(LabelSelector::parse("my app=web").is_err());
    }
}
