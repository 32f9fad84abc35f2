use thiserror::Error as ThisError;

use super::constants::*;
use super::TokenId;

/// Broad classes of rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Timing,
    Invariant,
    Authorization,
    Lifecycle,
}

/// Reasons an instruction is rejected. A rejected instruction leaves no
/// state behind except its nonce increment.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum WagerError {
    #[error("amount must be greater than zero")]
    InvalidAmount,
    #[error("stake {stake} exceeds maximum {max_bet}")]
    StakeAboveMaximum { stake: u64, max_bet: u64 },
    #[error("token {0} is not allowed")]
    TokenNotAllowed(TokenId),
    #[error("token {0} is not registered")]
    UnknownToken(TokenId),
    #[error("token {0} has {1} decimals")]
    FractionalToken(TokenId, u8),
    #[error("token {0} is already allowed")]
    TokenAlreadyAllowed(TokenId),
    #[error("insufficient balance (have={have}, need={need})")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("insufficient external balance (have={have}, need={need})")]
    InsufficientExternalBalance { have: u64, need: u64 },
    #[error("a wager is already pending")]
    WagerPending,
    #[error("no pending wager")]
    NoPendingWager,
    #[error("house edge {percent}% outside 1..=100")]
    InvalidHouseEdge { percent: u8 },

    #[error("wager committed at {commitment} cannot resolve at {height}")]
    TooEarly { commitment: u64, height: u64 },
    #[error("randomness for wager committed at {commitment} expired at {deadline}")]
    RandomnessExpired { commitment: u64, deadline: u64 },
    #[error("wager committed at {commitment} is recoverable after {deadline}")]
    WagerNotExpired { commitment: u64, deadline: u64 },

    #[error("house reserve {reserve} cannot cover {needed}")]
    ReserveInsufficient { reserve: u64, needed: u64 },
    #[error("entropy for height {0} is unavailable")]
    RandomnessUnavailable(u64),
    #[error("wager already resolved")]
    WagerAlreadyResolved,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("custody accounting mismatch for {0}")]
    AccountingMismatch(TokenId),
    #[error("system is not configured")]
    NotConfigured,

    #[error("caller is not the administrator")]
    Unauthorized,

    #[error("system is paused")]
    Paused,
    #[error("system is not paused")]
    NotPaused,
}

impl WagerError {
    /// Stable code carried by `Event::Rejected`.
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidAmount => ERROR_INVALID_AMOUNT,
            Self::StakeAboveMaximum { .. } => ERROR_STAKE_ABOVE_MAXIMUM,
            Self::TokenNotAllowed(_) => ERROR_TOKEN_NOT_ALLOWED,
            Self::UnknownToken(_) => ERROR_UNKNOWN_TOKEN,
            Self::FractionalToken(..) => ERROR_FRACTIONAL_TOKEN,
            Self::TokenAlreadyAllowed(_) => ERROR_TOKEN_ALREADY_ALLOWED,
            Self::InsufficientBalance { .. } => ERROR_INSUFFICIENT_BALANCE,
            Self::InsufficientExternalBalance { .. } => ERROR_INSUFFICIENT_EXTERNAL_BALANCE,
            Self::WagerPending => ERROR_WAGER_PENDING,
            Self::NoPendingWager => ERROR_NO_PENDING_WAGER,
            Self::InvalidHouseEdge { .. } => ERROR_INVALID_HOUSE_EDGE,
            Self::TooEarly { .. } => ERROR_TOO_EARLY,
            Self::RandomnessExpired { .. } => ERROR_RANDOMNESS_EXPIRED,
            Self::WagerNotExpired { .. } => ERROR_WAGER_NOT_EXPIRED,
            Self::ReserveInsufficient { .. } => ERROR_RESERVE_INSUFFICIENT,
            Self::RandomnessUnavailable(_) => ERROR_RANDOMNESS_UNAVAILABLE,
            Self::WagerAlreadyResolved => ERROR_WAGER_ALREADY_RESOLVED,
            Self::Overflow => ERROR_OVERFLOW,
            Self::AccountingMismatch(_) => ERROR_ACCOUNTING_MISMATCH,
            Self::NotConfigured => ERROR_NOT_CONFIGURED,
            Self::Unauthorized => ERROR_UNAUTHORIZED,
            Self::Paused => ERROR_PAUSED,
            Self::NotPaused => ERROR_NOT_PAUSED,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount
            | Self::StakeAboveMaximum { .. }
            | Self::TokenNotAllowed(_)
            | Self::UnknownToken(_)
            | Self::FractionalToken(..)
            | Self::TokenAlreadyAllowed(_)
            | Self::InsufficientBalance { .. }
            | Self::InsufficientExternalBalance { .. }
            | Self::WagerPending
            | Self::NoPendingWager
            | Self::InvalidHouseEdge { .. } => ErrorKind::Validation,
            Self::TooEarly { .. }
            | Self::RandomnessExpired { .. }
            | Self::WagerNotExpired { .. } => ErrorKind::Timing,
            Self::ReserveInsufficient { .. }
            | Self::RandomnessUnavailable(_)
            | Self::WagerAlreadyResolved
            | Self::Overflow
            | Self::AccountingMismatch(_)
            | Self::NotConfigured => ErrorKind::Invariant,
            Self::Unauthorized => ErrorKind::Authorization,
            Self::Paused | Self::NotPaused => ErrorKind::Lifecycle,
        }
    }

    /// Only an early resolution can succeed by resubmitting the same
    /// instruction later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TooEarly { .. })
    }
}
