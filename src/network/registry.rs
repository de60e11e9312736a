use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{LedgerError, Result};

/// A peer, identified by its base URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(String);

impl Node {
    /// Normalize `url` into a node address: surrounding whitespace and
    /// trailing slashes are dropped, and `http://` is assumed when no
    /// scheme is given.
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, host) = url.trim().split_once("://").unwrap_or(("http", url.trim()));
        let host = host.trim_end_matches('/');
        if scheme.is_empty() || host.is_empty() {
            return Err(LedgerError::validation(format!("invalid node url: {url:?}")));
        }
        Ok(Self(format!("{scheme}://{host}")))
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Manually registered peers. Grows only.
#[derive(Debug, Default, Clone)]
pub struct NodeRegistry {
    nodes: BTreeSet<Node>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer. Returns `false` if it was already known.
    pub fn register(&mut self, url: &str) -> Result<bool> {
        let node = Node::parse(url)?;
        Ok(self.insert(node))
    }

    pub fn insert(&mut self, node: Node) -> bool {
        self.nodes.insert(node)
    }

    /// Snapshot of every known peer.
    pub fn all(&self) -> Vec<Node> {
        self.nodes.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<Node> for NodeRegistry {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut reg = NodeRegistry::new();
        assert!(reg.register("http://127.0.0.1:5001").unwrap());
        assert!(!reg.register("http://127.0.0.1:5001").unwrap());
        assert!(!reg.register(" http://127.0.0.1:5001/ ").unwrap());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn bare_host_gets_http_scheme() {
        let node = Node::parse("192.168.0.5:5000").unwrap();
        assert_eq!(node.url(), "http://192.168.0.5:5000");

        let mut reg = NodeRegistry::new();
        reg.register("192.168.0.5:5000").unwrap();
        assert!(!reg.register("http://192.168.0.5:5000").unwrap());
    }

    #[test]
    fn distinct_urls_are_distinct_nodes() {
        let mut reg = NodeRegistry::new();
        reg.register("http://a:5000").unwrap();
        reg.register("http://a:5001").unwrap();
        reg.register("https://a:5000").unwrap();
        assert_eq!(reg.all().len(), 3);
    }

    #[test]
    fn empty_url_is_rejected() {
        let mut reg = NodeRegistry::new();
        assert!(matches!(reg.register("  "), Err(LedgerError::Validation(_))));
        assert!(matches!(reg.register("/"), Err(LedgerError::Validation(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn scheme_without_host_is_rejected() {
        for url in ["http://", "https:///", " http:// ", "://peer:5000"] {
            assert!(
                matches!(Node::parse(url), Err(LedgerError::Validation(_))),
                "accepted {url:?}"
            );
        }
        assert_eq!(Node::parse("https://peer/").unwrap().url(), "https://peer");
    }

    #[test]
    fn serializes_as_plain_url() {
        let node = Node::parse("http://x:1").unwrap();
        assert_eq!(serde_json::to_string(&node).unwrap(), r#""http://x:1""#);
    }
}
