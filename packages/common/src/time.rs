//! Wall-clock durations in seconds, as reported by `env.ledger().timestamp()`.

pub const ONE_DAY: u64 = 24 * 60 * 60;
pub const SEVEN_DAYS: u64 = 7 * ONE_DAY;
/// A calendar year without the leap day. Annual rates are spread over this many seconds.
pub const ONE_YEAR: u64 = 365 * ONE_DAY;
