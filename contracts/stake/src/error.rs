use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 500,
    Unauthorized = 501,
    StakingPaused = 502,
    UnstakingPaused = 503,
    InvalidLockDuration = 504,
    InvalidIndex = 505,
    ClaimDelayNotExpired = 506,
    LockNotExpired = 507,
    InsufficientBalance = 508,
    TransferFailed = 509,
    InvalidAmount = 510,
    InvalidParameter = 511,
    SameOwner = 512,
    NoOwnershipTransferInPlace = 513,
    ContractMathError = 514,
    ConfigNotSet = 515,
    OwnerNotSet = 516,
}
