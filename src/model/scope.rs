//! Namespace scope helpers.

/// Label used for an all-namespaces view.
pub const NAMESPACE_ALL: &str = "all";
/// Namespace marker for cluster-scoped resources.
pub const CLUSTER_SCOPE: &str = "-";

/// Returns true if `ns` designates every namespace.
pub fn is_all_namespaces(ns: &str) -> bool {
    ns.is_empty() || ns == NAMESPACE_ALL
}

/// Returns true if `ns` designates a cluster-scoped resource.
pub fn is_cluster_scoped(ns: &str) -> bool {
    ns == CLUSTER_SCOPE
}

/// Builds a fully qualified `ns/name` path.
pub fn fqn(ns: &str, name: &str) -> String {
    if ns.is_empty() || is_cluster_scoped(ns) {
        return name.to_string();
    }
    format!("{ns}/{name}")
}

/// Splits a path into `(namespace, name)`. Paths without a namespace
/// are cluster-scoped.
pub fn namespaced(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((ns, name)) => (ns, name),
        None => (CLUSTER_SCOPE, path),
    }
}
