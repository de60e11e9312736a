use std::time::Instant;

use super::block::hash_hex;

/// How many candidates to try between deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 4096;

/// Check whether `proof` solves the puzzle posed by `last_proof`: the
/// SHA-256 of the two decimal strings concatenated must start with
/// `difficulty` hex zeros. A difficulty past the 64-digit digest is never met.
pub fn valid_proof(last_proof: u64, proof: u64, difficulty: u32) -> bool {
    let guess = format!("{last_proof}{proof}");
    let digest = hash_hex(guess.as_bytes());
    let zeros = difficulty as usize;
    digest.len() >= zeros && digest.bytes().take(zeros).all(|b| b == b'0')
}

/// Find the smallest proof for `last_proof`, trying 0, 1, 2, ... in order.
/// Blocks until a solution is found.
pub fn solve(last_proof: u64, difficulty: u32) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof, difficulty) {
        proof += 1;
    }
    proof
}

/// Same search as [`solve`], but gives up once `deadline` has passed.
/// Returns `None` when abandoned; the partial search is thrown away.
pub fn solve_until(last_proof: u64, difficulty: u32, deadline: Instant) -> Option<u64> {
    let mut proof = 0u64;
    loop {
        if valid_proof(last_proof, proof, difficulty) {
            return Some(proof);
        }
        proof += 1;
        if proof % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
            return None;
        }
    }
}
