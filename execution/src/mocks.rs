//! Helpers for tests and simulations.

use crate::{oracle::derive_scores, payout::determine_outcome, state_transition, Memory};
use banco_types::{
    execution::{Block, Event, Output, Transaction},
    genesis::{Allocation, AssetSpec, Funding},
    wager::{Outcome, TokenId},
    Genesis,
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::{Digest, Sha256},
    Hasher, Signer,
};

pub const TEST_TOKEN: &str = "CHIP";
/// Declared with decimals and never wagerable
pub const FRACTIONAL_TOKEN: &str = "USDC";
/// Registered whole-unit asset that starts off the allow-list
pub const SPARE_TOKEN: &str = "GEM";

pub const TEST_WALLET: u64 = 10_000;
pub const TEST_RESERVE: u64 = 5_000;
pub const TEST_MAX_BET: u64 = 1_000;
pub const TEST_HOUSE_EDGE: u8 = 5;
pub const TEST_MIN_HOUSE_CUT: u64 = 1;
pub const TEST_WINDOW: u64 = 256;

/// Creates an account keypair for Ed25519 signatures used by users
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

pub fn chip() -> TokenId {
    TokenId::from_symbol(TEST_TOKEN)
}

pub fn spare() -> TokenId {
    TokenId::from_symbol(SPARE_TOKEN)
}

pub fn fractional() -> TokenId {
    TokenId::from_symbol(FRACTIONAL_TOKEN)
}

/// Genesis where `admin` and each of `players` hold `TEST_WALLET` chips and
/// the house starts with `TEST_RESERVE`.
pub fn test_genesis(admin: &PublicKey, players: &[PublicKey]) -> Genesis {
    let mut allocations = Vec::new();
    for account in std::iter::once(admin).chain(players) {
        for symbol in [TEST_TOKEN, SPARE_TOKEN] {
            allocations.push(Allocation {
                account: account.clone(),
                symbol: symbol.to_string(),
                amount: TEST_WALLET,
            });
        }
    }

    Genesis {
        admin: admin.clone(),
        assets: vec![
            AssetSpec {
                symbol: TEST_TOKEN.to_string(),
                decimals: 0,
                allowed: true,
            },
            AssetSpec {
                symbol: FRACTIONAL_TOKEN.to_string(),
                decimals: 6,
                allowed: false,
            },
            AssetSpec {
                symbol: SPARE_TOKEN.to_string(),
                decimals: 0,
                allowed: false,
            },
        ],
        max_bet: TEST_MAX_BET,
        house_edge_percent: TEST_HOUSE_EDGE,
        min_house_cut: TEST_MIN_HOUSE_CUT,
        randomness_window: TEST_WINDOW,
        allocations,
        treasury: vec![Funding {
            symbol: TEST_TOKEN.to_string(),
            amount: TEST_RESERVE,
        }],
    }
}

/// In-memory state initialized from `genesis`.
pub async fn setup_state(genesis: &Genesis) -> Memory {
    let mut state = Memory::default();
    crate::init_genesis(&mut state, genesis)
        .await
        .expect("failed to initialize genesis");
    state
}

/// Deterministic beacon for `height` with no particular outcome.
pub fn create_entropy(height: u64) -> Digest {
    Sha256::hash(&height.to_be_bytes())
}

/// Find a beacon that draws exactly `banker` and `player`.
pub fn entropy_with_scores(banker: u8, player: u8) -> Digest {
    (0u64..)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(b"mock-entropy");
            hasher.update(&i.to_be_bytes());
            hasher.finalize()
        })
        .find(|entropy| {
            let scores = derive_scores(entropy);
            scores.banker == banker && scores.player == player
        })
        .expect("scores must be in 0..10")
}

/// Find a beacon that produces `outcome`.
pub fn entropy_for_outcome(outcome: Outcome) -> Digest {
    (0u64..)
        .map(|i| Sha256::hash(&i.to_be_bytes()))
        .find(|e| determine_outcome(derive_scores(e)) == outcome)
        .expect("every outcome is reachable")
}

pub fn create_block(parent: Digest, height: u64, entropy: Digest, txs: Vec<Transaction>) -> Block {
    Block::new(parent, height, entropy, txs)
}

/// Execute one block and return its outputs.
pub async fn execute(
    state: &mut Memory,
    height: u64,
    entropy: Digest,
    txs: Vec<Transaction>,
) -> Vec<Output> {
    state_transition::execute_state_transition(state, height, entropy, txs)
        .await
        .expect("state transition failed")
        .outputs
}

pub fn events(outputs: &[Output]) -> Vec<Event> {
    outputs
        .iter()
        .filter_map(|output| match output {
            Output::Event(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}
