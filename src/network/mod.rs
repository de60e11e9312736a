pub mod consensus;
pub mod registry;

pub use consensus::{ChainFetcher, ConsensusResolver, HttpChainFetcher, PeerChain};
pub use registry::{Node, NodeRegistry};
