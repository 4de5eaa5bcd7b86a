// Ledgers close roughly every five seconds.
pub const DAY_IN_LEDGERS: u32 = 17280;

// Instance entries (config, owner, counters) are bumped back to a week of ledgers
// whenever their remaining TTL drops under six days.
pub const INSTANCE_TARGET_TTL: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_RENEWAL_THRESHOLD: u32 = INSTANCE_TARGET_TTL - DAY_IN_LEDGERS;

// Per-account stake positions live in persistent storage. Every read and write renews
// them to 30 days; a list left untouched for longer is archived and has to be restored
// before its owner can claim or unstake.
pub const PERSISTENT_TARGET_TTL: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_RENEWAL_THRESHOLD: u32 = PERSISTENT_TARGET_TTL - DAY_IN_LEDGERS;
