use std::sync::Mutex;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{Node, NodeRegistry};
use crate::blockchain::{Block, ChainValidator, Ledger};
use crate::error::{LedgerError, Result};

/// Upper bound on a peer's `/chain` body.
const MAX_CHAIN_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Body of `GET <node>/chain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// Retrieves the chain a peer currently holds.
#[allow(async_fn_in_trait)]
pub trait ChainFetcher {
    async fn fetch_chain(&self, node: &Node) -> Result<PeerChain>;
}

/// Fetches peer chains over HTTP with awc.
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    timeout: Duration,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, node: &Node) -> Result<PeerChain> {
        let fetch_err = |reason: String| LedgerError::Fetch {
            node: node.to_string(),
            reason,
        };

        let client = awc::Client::builder().timeout(self.timeout).finish();
        let url = format!("{}/chain", node.url());
        let mut resp = client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_err(format!("status {}", resp.status())));
        }

        resp.json::<PeerChain>()
            .limit(MAX_CHAIN_BODY_BYTES)
            .await
            .map_err(|e| fetch_err(e.to_string()))
    }
}

/// Longest-valid-chain reconciliation against every registered peer.
#[derive(Debug, Clone)]
pub struct ConsensusResolver<F> {
    fetcher: F,
    validator: ChainValidator,
}

impl<F: ChainFetcher> ConsensusResolver<F> {
    pub fn new(fetcher: F, validator: ChainValidator) -> Self {
        Self { fetcher, validator }
    }

    /// Ask every peer for its chain and adopt the longest valid one if it
    /// is strictly longer than ours. Returns whether the local chain was
    /// replaced.
    ///
    /// All peers are fetched concurrently and every fetch finishes before
    /// the decision. Unreachable peers and invalid chains are skipped.
    /// No lock is held while waiting on the network.
    pub async fn resolve(&self, ledger: &Mutex<Ledger>, registry: &Mutex<NodeRegistry>) -> bool {
        let local_len = ledger.lock().expect("mutex poisoned").len();
        let peers = registry.lock().expect("mutex poisoned").all();
        debug!("resolving against {} peers (local len {local_len})", peers.len());

        let fetches = peers.iter().map(|peer| self.fetcher.fetch_chain(peer));
        let results = join_all(fetches).await;

        let Some(winner) = self.longest_valid(local_len, peers.iter().zip(results)) else {
            return false;
        };

        let mut ledger = ledger.lock().expect("mutex poisoned");
        if winner.len() <= ledger.len() {
            info!(
                "local chain grew to {} while resolving; keeping it",
                ledger.len()
            );
            return false;
        }
        ledger.replace_chain(winner);
        true
    }

    /// Pick the longest chain that beats `local_len` and passes validation.
    fn longest_valid<'a>(
        &self,
        local_len: usize,
        results: impl Iterator<Item = (&'a Node, Result<PeerChain>)>,
    ) -> Option<Vec<Block>> {
        let mut max_len = local_len;
        let mut winner = None;

        for (peer, result) in results {
            let fetched = match result {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("skipping peer {peer}: {e}");
                    continue;
                }
            };

            debug!("peer {peer} reports length {}", fetched.length);
            if fetched.length <= max_len {
                continue;
            }
            if let Err(e) = self.check(&fetched) {
                warn!("discarding chain from {peer}: {e}");
                continue;
            }

            max_len = fetched.length;
            winner = Some(fetched.chain);
        }

        winner
    }

    fn check(&self, fetched: &PeerChain) -> Result<()> {
        if fetched.length != fetched.chain.len() {
            return Err(LedgerError::InvalidChain(format!(
                "reported length {} but carries {} blocks",
                fetched.length,
                fetched.chain.len()
            )));
        }
        self.validator.validate(&fetched.chain)
    }
}
