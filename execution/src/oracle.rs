//! Delayed randomness.
//!
//! A wager committed at height `c` is decided by the entropy of block `c + 1`,
//! which does not exist when the wager is placed. That entropy stays
//! retrievable for `randomness_window` blocks after the commitment.

use anyhow::Result;
use banco_types::{
    execution::{Key, Value},
    wager::{Scores, WagerError, BANKER_LABEL, PLAYER_LABEL, SCORE_MODULUS},
};
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_utils::modulo;

use crate::State;

fn score(entropy: &Digest, label: &[u8]) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(entropy.as_ref());
    hasher.update(label);
    modulo(hasher.finalize().as_ref(), SCORE_MODULUS) as u8
}

pub fn derive_scores(entropy: &Digest) -> Scores {
    Scores {
        banker: score(entropy, BANKER_LABEL),
        player: score(entropy, PLAYER_LABEL),
    }
}

/// Result of asking for the scores of a commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reveal {
    Ready(Scores),
    NotYetAvailable,
    Expired { deadline: u64 },
    /// Inside the window but the entropy is missing from state.
    Unavailable { height: u64 },
}

impl Reveal {
    pub fn into_scores(self, commitment: u64, height: u64) -> Result<Scores, WagerError> {
        match self {
            Self::Ready(scores) => Ok(scores),
            Self::NotYetAvailable => Err(WagerError::TooEarly { commitment, height }),
            Self::Expired { deadline } => Err(WagerError::RandomnessExpired {
                commitment,
                deadline,
            }),
            Self::Unavailable { height } => Err(WagerError::RandomnessUnavailable(height)),
        }
    }
}

/// Whether `height` is inside the resolution window of `commitment`.
pub fn check_window(commitment: u64, height: u64, window: u64) -> Option<Reveal> {
    if height <= commitment {
        return Some(Reveal::NotYetAvailable);
    }
    let deadline = commitment.saturating_add(window);
    if height > deadline {
        return Some(Reveal::Expired { deadline });
    }
    None
}

/// Look up the scores for a wager committed at `commitment`, as seen at `height`.
pub async fn reveal<S: State>(
    state: &S,
    commitment: u64,
    height: u64,
    window: u64,
) -> Result<Reveal> {
    if let Some(reveal) = check_window(commitment, height, window) {
        return Ok(reveal);
    }
    let source = commitment + 1;
    Ok(match state.get(&Key::Entropy(source)).await? {
        Some(Value::Entropy(entropy)) => Reveal::Ready(derive_scores(&entropy)),
        _ => Reveal::Unavailable { height: source },
    })
}
