//! File-backed snapshots of node state, one set of files per server port.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blockchain::{Block, Ledger, Transaction};
use crate::error::Result;
use crate::network::{Node, NodeRegistry};

/// Saved form of the ledger and the peer list.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub chain: Vec<Block>,
    pub pending: Vec<Transaction>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    chain: &'a [Block],
    pending: &'a [Transaction],
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    port: u16,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            dir: dir.into(),
            port,
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.dir.join(format!("blockchain-{}.json", self.port))
    }

    pub fn node_id_path(&self) -> PathBuf {
        self.dir.join(format!("node-id-{}", self.port))
    }

    /// Read the saved snapshot, if one exists.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let path = self.ledger_path();
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        debug!(
            "loaded snapshot from {} ({} blocks, {} pending)",
            path.display(),
            snapshot.chain.len(),
            snapshot.pending.len()
        );
        Ok(Some(snapshot))
    }

    pub fn save(&self, ledger: &Ledger, nodes: &NodeRegistry) -> Result<()> {
        let snapshot = SnapshotRef {
            chain: ledger.chain(),
            pending: ledger.pending(),
            nodes: nodes.all(),
        };
        let raw = serde_json::to_vec_pretty(&snapshot)?;
        write_atomic(&self.ledger_path(), &raw)
    }

    /// Identifier this node mines under. Generated on first start and kept
    /// for later runs on the same port.
    pub fn load_or_create_node_id(&self) -> Result<String> {
        let path = self.node_id_path();
        match fs::read_to_string(&path) {
            Ok(id) if !id.trim().is_empty() => return Ok(id.trim().to_string()),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let id = Uuid::new_v4().simple().to_string();
        write_atomic(&path, id.as_bytes())?;
        Ok(id)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 5000);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn snapshot_restores_chain_pool_and_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested"), 5000);

        let mut ledger = Ledger::new(2);
        ledger.new_transaction("a", "b", 10).unwrap();
        ledger.mine("m").unwrap();
        ledger.new_transaction("c", "d", 1).unwrap();
        let mut nodes = NodeRegistry::new();
        nodes.register("http://peer:5001").unwrap();

        store.save(&ledger, &nodes).unwrap();
        let snap = store.load().unwrap().unwrap();

        assert_eq!(snap.chain, ledger.chain());
        assert_eq!(snap.pending, ledger.pending());
        assert_eq!(snap.nodes, nodes.all());
        let restored = Ledger::from_parts(snap.chain, snap.pending, 2).unwrap();
        assert_eq!(restored.last_block().unwrap().hash(), ledger.last_block().unwrap().hash());
    }

    #[test]
    fn files_are_keyed_by_port() {
        let dir = tempfile::tempdir().unwrap();
        let a = Store::new(dir.path(), 5000);
        let b = Store::new(dir.path(), 5001);

        a.save(&Ledger::new(2), &NodeRegistry::new()).unwrap();
        assert!(a.load().unwrap().is_some());
        assert!(b.load().unwrap().is_none());
        assert_ne!(a.load_or_create_node_id().unwrap(), b.load_or_create_node_id().unwrap());
    }

    #[test]
    fn node_id_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 5000);
        let id = store.load_or_create_node_id().unwrap();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
        assert_eq!(store.load_or_create_node_id().unwrap(), id);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 5000);
        fs::write(store.ledger_path(), b"{not json").unwrap();
        assert!(matches!(store.load(), Err(LedgerError::Serialization(_))));
    }
}
