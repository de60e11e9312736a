pub mod block;
pub mod model;
pub mod pow;
pub mod validator;

pub use block::{Block, Transaction};
pub use model::{Ledger, MiningJob};
pub use validator::ChainValidator;

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Difficulty bounds accepted from configuration (keep low to avoid endless searches)
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 6;
