//! Apply a block's transactions to state.
//!
//! Blocks must arrive in height order. Re-submitting an executed height is a
//! no-op and skipping a height is an error.

use crate::{query, Layer, State};
use anyhow::{anyhow, Context as _};
use banco_types::execution::{Block, Key, Output, Transaction, Value};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of executing a block's state transition
#[derive(Debug, Default)]
pub struct StateTransitionResult {
    /// Events and included transactions in execution order, ending with the
    /// commit marker. Empty when the height was already executed.
    pub outputs: Vec<Output>,
    /// Map of public keys to their next expected nonce after processing
    pub processed_nonces: BTreeMap<PublicKey, u64>,
}

/// Execute state transition for a block at `height` with beacon `entropy`.
pub async fn execute_state_transition<S: State>(
    state: &mut S,
    height: u64,
    entropy: Digest,
    transactions: Vec<Transaction>,
) -> anyhow::Result<StateTransitionResult> {
    let state_height = query::committed_height(state)
        .await
        .context("read committed height")?;

    if height <= state_height {
        debug!(height, state_height, "height already executed; skipping");
        return Ok(StateTransitionResult::default());
    }

    let expected_next_height = state_height.saturating_add(1);
    if height != expected_next_height {
        return Err(anyhow!(
            "non-sequential height: state_height={state_height}, expected={expected_next_height}, requested={height}"
        ));
    }

    let mut layer = Layer::new(state, height, entropy);
    let (mut outputs, processed_nonces) = layer
        .execute(transactions)
        .await
        .with_context(|| format!("execute layer (height={height})"))?;
    let changes = layer.commit();

    state
        .apply(changes)
        .await
        .with_context(|| format!("apply state changes (height={height})"))?;
    state
        .insert(Key::Commit, Value::Commit { height })
        .await
        .with_context(|| format!("commit state (height={height})"))?;
    outputs.push(Output::Commit { height });

    Ok(StateTransitionResult {
        outputs,
        processed_nonces,
    })
}

pub async fn execute_block<S: State>(
    state: &mut S,
    block: &Block,
) -> anyhow::Result<StateTransitionResult> {
    execute_state_transition(
        state,
        block.height,
        block.entropy,
        block.transactions.clone(),
    )
    .await
}
