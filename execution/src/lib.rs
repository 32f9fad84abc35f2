//! Banco execution layer.
//!
//! This crate contains the deterministic transaction execution logic
//! ([`Layer`]) for the wagering ledger: balances in custody, single pending
//! wagers per account, delayed-randomness resolution and the house reserve.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution.
//! - The only randomness is the entropy carried by each block.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use banco_execution::{init_genesis, state_transition::execute_block, Memory};
//! use banco_types::{execution::Block, Genesis};
//!
//! # async fn example(genesis: Genesis, block: Block) -> anyhow::Result<()> {
//! let mut state = Memory::default();
//! init_genesis(&mut state, &genesis).await?;
//! // Height must be exactly `committed_height + 1`.
//! let result = execute_block(&mut state, &block).await?;
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod oracle;
pub mod payout;
pub mod query;
pub mod state_transition;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod genesis;
mod layer;
mod state;

#[cfg(test)]
mod wager_tests;

pub use audit::{audit_solvency, SolvencyReport};
pub use genesis::init_genesis;
pub use layer::Layer;
pub use state::{nonce, PrepareError, State, Status};

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
