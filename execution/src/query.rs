//! Read-only views over committed (or staged) state.

use anyhow::Result;
use banco_types::{
    execution::{Key, Value},
    wager::{AssetMetadata, CustodyState, SystemConfig, TokenId, Wager},
};
use commonware_cryptography::ed25519::PublicKey;

use crate::State;

pub use crate::state::nonce;

pub async fn config<S: State>(state: &S) -> Result<Option<SystemConfig>> {
    Ok(match state.get(&Key::Config).await? {
        Some(Value::Config(config)) => Some(config),
        _ => None,
    })
}

pub async fn balance<S: State>(state: &S, account: &PublicKey, token: &TokenId) -> Result<u64> {
    Ok(
        match state.get(&Key::Balance(account.clone(), *token)).await? {
            Some(Value::Balance(amount)) => amount,
            _ => 0,
        },
    )
}

/// Balance held outside custody.
pub async fn wallet<S: State>(state: &S, account: &PublicKey, token: &TokenId) -> Result<u64> {
    Ok(
        match state.get(&Key::Wallet(account.clone(), *token)).await? {
            Some(Value::Wallet(amount)) => amount,
            _ => 0,
        },
    )
}

pub async fn reserve<S: State>(state: &S, token: &TokenId) -> Result<u64> {
    Ok(match state.get(&Key::Reserve(*token)).await? {
        Some(Value::Reserve(amount)) => amount,
        _ => 0,
    })
}

pub async fn custody<S: State>(state: &S, token: &TokenId) -> Result<CustodyState> {
    Ok(match state.get(&Key::Custody(*token)).await? {
        Some(Value::Custody(custody)) => custody,
        _ => CustodyState::default(),
    })
}

pub async fn asset<S: State>(state: &S, token: &TokenId) -> Result<Option<AssetMetadata>> {
    Ok(match state.get(&Key::Asset(*token)).await? {
        Some(Value::Asset(asset)) => Some(asset),
        _ => None,
    })
}

pub async fn is_allowed<S: State>(state: &S, token: &TokenId) -> Result<bool> {
    Ok(matches!(
        state.get(&Key::AllowedToken(*token)).await?,
        Some(Value::Allowed)
    ))
}

pub async fn pending_wager<S: State>(state: &S, account: &PublicKey) -> Result<Option<Wager>> {
    Ok(match state.get(&Key::Wager(account.clone())).await? {
        Some(Value::Wager(wager)) => Some(wager),
        _ => None,
    })
}

/// Height of the last executed block (0 before the first block).
pub async fn committed_height<S: State>(state: &S) -> Result<u64> {
    Ok(match state.get(&Key::Commit).await? {
        Some(Value::Commit { height }) => height,
        _ => 0,
    })
}
