use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::blockchain::{Block, ChainValidator, Ledger, Transaction};
use crate::config::NodeConfig;
use crate::error::Result;
use crate::network::{ConsensusResolver, HttpChainFetcher, Node, NodeRegistry};
use crate::storage::Store;

/// Shared application state: the ledger, the peer list and what is needed
/// to persist them and talk to peers.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub nodes: Mutex<NodeRegistry>,
    pub node_id: String,
    pub config: NodeConfig,
    pub store: Store,
    pub resolver: ConsensusResolver<HttpChainFetcher>,
}

impl AppState {
    /// Load the saved state for `config.port`, or start a fresh ledger.
    pub fn restore(config: NodeConfig) -> Result<Self> {
        let store = Store::new(config.storage_dir.clone(), config.port);
        let node_id = store.load_or_create_node_id()?;

        let (ledger, nodes): (Ledger, NodeRegistry) = match store.load() {
            Ok(Some(snap)) => match Ledger::from_parts(snap.chain, snap.pending, config.difficulty) {
                Ok(ledger) => {
                    info!("restored ledger with {} blocks", ledger.len());
                    (ledger, snap.nodes.into_iter().collect())
                }
                Err(e) => {
                    warn!("discarding saved ledger: {e}");
                    (Ledger::new(config.difficulty), NodeRegistry::new())
                }
            },
            Ok(None) => (Ledger::new(config.difficulty), NodeRegistry::new()),
            Err(e) => {
                warn!("could not read saved ledger: {e}");
                (Ledger::new(config.difficulty), NodeRegistry::new())
            }
        };

        let resolver = ConsensusResolver::new(
            HttpChainFetcher::new(config.peer_timeout),
            ChainValidator::new(config.difficulty),
        );

        Ok(Self {
            ledger: Mutex::new(ledger),
            nodes: Mutex::new(nodes),
            node_id,
            config,
            store,
            resolver,
        })
    }

    /// Write the current state back to disk. Failures are logged only; the
    /// in-memory state stays authoritative.
    pub fn persist(&self) {
        let ledger = self.ledger.lock().expect("mutex poisoned");
        let nodes = self.nodes.lock().expect("mutex poisoned");
        if let Err(e) = self.store.save(&ledger, &nodes) {
            warn!("failed to save ledger snapshot: {e}");
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub chain: &'a [Block],
    pub length: usize,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

/* ---------- TX API Models ---------- */

/// Fields are optional so that every missing one can be reported.
#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<u64>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<Node>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_chain: Option<Vec<Block>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<Block>>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}
