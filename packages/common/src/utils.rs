/// Seconds that passed between `since` and `now`.
///
/// A ledger timestamp never goes backwards, but a position restored from an older
/// snapshot may carry a `since` in the future; that reads as nothing elapsed.
pub fn elapsed_since(now: u64, since: u64) -> u64 {
    now.saturating_sub(since)
}

/// Whether at least `period` seconds have passed since `since`.
pub fn has_elapsed(now: u64, since: u64, period: u64) -> bool {
    elapsed_since(now, since) >= period
}
