//! Protocol constants used when assembling transactions.

/// Minimal fee amount (0.001 ERG).
pub const MIN_FEE: u64 = 1_000_000;

/// Change below this amount is folded into the miner fee.
pub const MIN_CHANGE_VALUE: u64 = 1_000_000;

/// Number of last headers in a state context. One more is fetched for the
/// pre-header.
pub const NUM_LAST_HEADERS: usize = 10;
