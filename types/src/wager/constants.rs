/// Maximum symbol length for registered assets
pub const MAX_SYMBOL_LENGTH: usize = 16;

/// Maximum length of a rejection message carried in events
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 256;

/// Number of distinct values a score can take (scores are in `0..SCORE_MODULUS`)
pub const SCORE_MODULUS: u64 = 10;

/// Domain separators for the two scores derived from one block's entropy
pub const BANKER_LABEL: &[u8] = b"banker";
pub const PLAYER_LABEL: &[u8] = b"player";

/// How many recent blocks keep their entropy available for resolution.
pub const DEFAULT_RANDOMNESS_WINDOW: u64 = 256;

/// Default stake cap for new deployments
pub const DEFAULT_MAX_BET: u64 = 1_000;

/// Default banker commission (percent of the gross payout)
pub const DEFAULT_HOUSE_EDGE_PERCENT: u8 = 5;

/// Default floor for the banker commission
pub const DEFAULT_MIN_HOUSE_CUT: u64 = 1;

/// Upper bound (inclusive) for the house edge percentage
pub const MAX_HOUSE_EDGE_PERCENT: u8 = 100;

/// Error codes for Rejected events
pub const ERROR_INVALID_AMOUNT: u8 = 1;
pub const ERROR_STAKE_ABOVE_MAXIMUM: u8 = 2;
pub const ERROR_TOKEN_NOT_ALLOWED: u8 = 3;
pub const ERROR_UNKNOWN_TOKEN: u8 = 4;
pub const ERROR_FRACTIONAL_TOKEN: u8 = 5;
pub const ERROR_TOKEN_ALREADY_ALLOWED: u8 = 6;
pub const ERROR_INSUFFICIENT_BALANCE: u8 = 7;
pub const ERROR_INSUFFICIENT_EXTERNAL_BALANCE: u8 = 8;
pub const ERROR_WAGER_PENDING: u8 = 9;
pub const ERROR_NO_PENDING_WAGER: u8 = 10;
pub const ERROR_INVALID_HOUSE_EDGE: u8 = 11;
pub const ERROR_TOO_EARLY: u8 = 12;
pub const ERROR_RANDOMNESS_EXPIRED: u8 = 13;
pub const ERROR_WAGER_NOT_EXPIRED: u8 = 14;
pub const ERROR_RESERVE_INSUFFICIENT: u8 = 15;
pub const ERROR_RANDOMNESS_UNAVAILABLE: u8 = 16;
pub const ERROR_WAGER_ALREADY_RESOLVED: u8 = 17;
pub const ERROR_OVERFLOW: u8 = 18;
pub const ERROR_ACCOUNTING_MISMATCH: u8 = 19;
pub const ERROR_UNAUTHORIZED: u8 = 20;
pub const ERROR_PAUSED: u8 = 21;
pub const ERROR_NOT_PAUSED: u8 = 22;
pub const ERROR_NOT_CONFIGURED: u8 = 23;
