//! A small proof-of-work ledger node: an append-only chain of blocks, a
//! brute-force puzzle for sealing new ones, and longest-valid-chain
//! reconciliation with manually registered peers, served over HTTP.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;

pub use blockchain::{Block, ChainValidator, Ledger, Transaction};
pub use config::NodeConfig;
pub use error::{LedgerError, Result};
pub use network::{ChainFetcher, ConsensusResolver, HttpChainFetcher, Node, NodeRegistry};
