//! Like Ledger - In-memory Like Counts with Per-Identity Deduplication
//!
//! Tracks how many distinct anonymized identities have liked each symbol.
//! Two maps are kept under a single mutex:
//! - symbol → like count
//! - anonymized identity → symbols it has already liked
//!
//! A symbol is in an identity's set if and only if that (identity, symbol)
//! pair has been credited in the count map. Both maps only grow.
//!
//! The lock is never held across an `.await`; every operation is a short
//! synchronous critical section, so the check-then-increment in
//! `register_like` cannot interleave with another request.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::anonymizer::AnonymizedIp;
use super::symbol::Symbol;

#[derive(Debug, Default)]
struct LedgerState {
    counts: HashMap<Symbol, u64>,
    liked_by: HashMap<AnonymizedIp, HashSet<Symbol>>,
}

impl LedgerState {
    fn count(&self, symbol: &Symbol) -> u64 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    fn credit(&mut self, symbol: &Symbol, liker: &AnonymizedIp) -> u64 {
        let newly_liked = self
            .liked_by
            .entry(liker.clone())
            .or_default()
            .insert(symbol.clone());

        let count = self.counts.entry(symbol.clone()).or_insert(0);
        if newly_liked {
            *count += 1;
        }
        *count
    }
}

/// Process-wide like store, shared by handle across requests.
#[derive(Debug, Default)]
pub struct LikeLedger {
    state: Mutex<LedgerState>,
}

impl LikeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current like count for a symbol (0 if never liked).
    pub fn peek(&self, symbol: &Symbol) -> u64 {
        self.lock().count(symbol)
    }

    /// Credit a like from `liker` unless it already liked `symbol`.
    ///
    /// Returns the count after the call. Repeating the call with the same
    /// arguments returns the same count and changes nothing.
    pub fn register_like(&self, symbol: &Symbol, liker: &AnonymizedIp) -> u64 {
        self.lock().credit(symbol, liker)
    }

    /// `peek` for several symbols from one consistent view.
    pub fn peek_many(&self, symbols: &[Symbol]) -> Vec<u64> {
        let state = self.lock();
        symbols.iter().map(|s| state.count(s)).collect()
    }

    /// `register_like` for several symbols under a single lock acquisition.
    ///
    /// A symbol repeated in `symbols` is credited at most once.
    pub fn register_likes(&self, symbols: &[Symbol], liker: &AnonymizedIp) -> Vec<u64> {
        let mut state = self.lock();
        symbols.iter().map(|s| state.credit(s, liker)).collect()
    }

    /// Sum of like counts across all symbols.
    pub fn total_likes(&self) -> u64 {
        self.lock().counts.values().sum()
    }

    /// Number of distinct anonymized identities that have liked anything.
    pub fn liker_count(&self) -> usize {
        self.lock().liked_by.len()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // No critical section can panic between the two map updates.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
